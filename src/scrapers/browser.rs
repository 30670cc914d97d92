use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::util::Wait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::links::SiteLinks;
use crate::scrapers::text::visible_text;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{FetchOptions, FetchedPages};

/// Set on the outgoing document so a stale `readyState` is never mistaken for the new page's
const MARK_OUTGOING: &str = "window.__rateScoutOutgoing = true";

/// True once the navigated-to document has fired `load`
const LOAD_COMPLETE: &str =
    "window.__rateScoutOutgoing !== true && document.readyState === 'complete'";

const LOAD_POLL: Duration = Duration::from_millis(250);

fn is_load_complete(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Page fetcher backed by a headless Chrome session.
///
/// Each `fetch_all` call launches its own browser and reuses a single tab for
/// every site, so concurrent runs never share a session.
pub struct ChromeFetcher {
    options: FetchOptions,
}

impl ChromeFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    fn launch(options: &FetchOptions) -> Result<Browser> {
        info!("Launching headless Chrome...");

        // Keep the browser alive through a full navigation plus settle period
        let idle = options.nav_timeout + options.settle_delay + Duration::from_secs(30);
        let launch_options = LaunchOptions::default_builder()
            .headless(options.headless)
            .idle_browser_timeout(idle)
            .build()
            .context("Failed to build launch options")?;

        Browser::new(launch_options).context("Failed to launch Chrome browser")
    }

    /// Visits every link in order on one tab. Blocks the calling thread.
    fn fetch_blocking(options: &FetchOptions, links: &SiteLinks) -> FetchedPages {
        let mut fetched = FetchedPages::default();

        let session = Self::launch(options).and_then(|browser| {
            let tab = browser.new_tab().context("Failed to open browser tab")?;
            tab.set_default_timeout(options.nav_timeout);
            Ok((browser, tab))
        });

        let (browser, tab) = match session {
            Ok(session) => session,
            Err(e) => {
                warn!("Browser unavailable: {:#}", e);
                for site in links.keys() {
                    fetched
                        .failures
                        .insert(*site, format!("browser unavailable: {:#}", e));
                }
                return fetched;
            }
        };

        for (site, url) in links {
            info!(%site, "Opening booking page...");
            debug!(%site, %url, "Navigating");

            let result = Self::capture(&tab, url, options);
            match &result {
                Ok(text) => info!(%site, "Captured {} chars of page text", text.len()),
                Err(e) => warn!(%site, stage = "scrape", "Failed to capture page: {:#}", e),
            }
            fetched.record(*site, result);
        }

        debug!("Closing browser");
        drop(tab);
        drop(browser);

        fetched
    }

    /// Polls until the new document reaches `readyState === "complete"`,
    /// i.e. its `load` event has fired. Evaluation errors mid-navigation count as not ready.
    fn wait_for_load(tab: &Tab, nav_timeout: Duration) -> Result<()> {
        Wait::new(nav_timeout, LOAD_POLL)
            .until(|| {
                tab.evaluate(LOAD_COMPLETE, false)
                    .ok()
                    .filter(|object| is_load_complete(object.value.as_ref()))
                    .map(|_| ())
            })
            .with_context(|| format!("Page did not fire load within {:?}", nav_timeout))
    }

    fn capture(tab: &Tab, url: &str, options: &FetchOptions) -> Result<String> {
        if let Err(e) = tab.evaluate(MARK_OUTGOING, false) {
            debug!("Could not mark outgoing document: {:#}", e);
        }
        tab.navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Self::wait_for_load(tab, options.nav_timeout)?;

        // Let client-side rendering populate the page
        thread::sleep(options.settle_delay);

        let inner = tab
            .evaluate("document.body.innerText", false)
            .context("Failed to read page text")?;
        if let Some(text) = inner.value.as_ref().and_then(|v| v.as_str()) {
            return Ok(text.to_string());
        }

        debug!("innerText unavailable, falling back to document HTML");
        let html = tab
            .evaluate("document.documentElement.outerHTML", false)
            .context("Failed to read page HTML")?;
        let html = html
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Page returned no text"))?;

        Ok(visible_text(html))
    }
}

impl Default for ChromeFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch_all(&self, links: &SiteLinks) -> FetchedPages {
        let options = self.options.clone();
        let owned_links = links.clone();

        // headless_chrome is synchronous; drive it on a blocking thread
        let task =
            tokio::task::spawn_blocking(move || Self::fetch_blocking(&options, &owned_links));
        match task.await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Browser task aborted: {}", e);
                let mut fetched = FetchedPages::default();
                for site in links.keys() {
                    fetched
                        .failures
                        .insert(*site, format!("browser task aborted: {}", e));
                }
                fetched
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "headless_chrome"
    }
}
