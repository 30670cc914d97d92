pub mod browser;
pub mod text;
pub mod traits;
pub mod types;

pub use browser::ChromeFetcher;
pub use traits::PageFetcher;
pub use types::{FetchOptions, FetchedPages};
