use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::extractor::Extractor;
use crate::links::{build_links_for, SiteLinks};
use crate::llm::ChatCompletion;
use crate::models::{DateRange, ResultSet, SiteOutcome};
use crate::parser::parse_answer;
use crate::scrapers::PageFetcher;

/// One fetch -> extract -> parse run over every configured site.
///
/// Both capabilities are injected so each owns its own session or credential.
pub struct Pipeline<F: PageFetcher> {
    fetcher: F,
    extractor: Extractor,
    settings: Settings,
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(fetcher: F, model: Arc<dyn ChatCompletion>, settings: Settings) -> Self {
        let extractor = Extractor::new(model, settings.catalog.clone(), settings.temperature);
        Self {
            fetcher,
            extractor,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the links for `range` and runs every site
    pub async fn run(&self, range: &DateRange) -> Result<ResultSet> {
        let links = build_links_for(range, &self.settings)?;
        Ok(self.run_links(&links).await)
    }

    /// Runs already-built links. Never fails: per-site problems become outcomes.
    pub async fn run_links(&self, links: &SiteLinks) -> ResultSet {
        info!(
            "Scraping {} sites with {}...",
            links.len(),
            self.fetcher.backend_name()
        );
        let mut fetched = self.fetcher.fetch_all(links).await;
        info!("Scraping complete. Running extraction...");

        let mut results = ResultSet::new();
        for site in links.keys().copied() {
            let outcome = if let Some(text) = fetched.pages.remove(&site) {
                match self.extractor.extract(site, &text).await {
                    Ok(answer) => SiteOutcome::from_prices(parse_answer(&answer)),
                    Err(e) => SiteOutcome::ExtractFailed(e.to_string()),
                }
            } else {
                let reason = fetched
                    .failures
                    .remove(&site)
                    .unwrap_or_else(|| "no page text captured".to_string());
                SiteOutcome::FetchFailed(reason)
            };

            match &outcome {
                SiteOutcome::Success(prices) => info!(%site, "Extracted {} room prices", prices.len()),
                SiteOutcome::EmptyResult => info!(%site, "No results found"),
                _ => {
                    if let Some(diagnostic) = outcome.diagnostic(site) {
                        warn!(%site, stage = ?diagnostic.stage, "{}", diagnostic);
                    }
                }
            }
            results.insert(site, outcome);
        }

        results
    }
}
