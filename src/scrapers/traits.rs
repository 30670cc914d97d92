use async_trait::async_trait;

use crate::links::SiteLinks;
use crate::scrapers::types::FetchedPages;

/// Renders each link and captures its visible text.
/// Implementations visit sites in the iteration order of `links` and never
/// let one site's failure stop the others.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_all(&self, links: &SiteLinks) -> FetchedPages;

    /// Get the name of the fetcher backend
    fn backend_name(&self) -> &'static str;
}
