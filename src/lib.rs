//! Hotel room-rate scout: renders each travel agency's booking page in
//! headless Chrome, asks a language model for the allow-listed rooms and
//! prices, and parses the answer into a room -> price mapping per site.

pub mod config;
pub mod error;
pub mod extractor;
pub mod links;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scrapers;

pub use config::{Settings, SiteProfile};
pub use error::{Error, Result};
pub use links::{build_links, SiteLinks};
pub use llm::{ChatCompletion, LlmError, OpenAiChat};
pub use models::{DateRange, Diagnostic, Occupancy, ResultSet, Site, SiteOutcome};
pub use parser::parse_answer;
pub use pipeline::Pipeline;
pub use scrapers::{ChromeFetcher, FetchOptions, FetchedPages, PageFetcher};
