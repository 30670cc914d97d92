use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Settings;
use crate::models::Site;

/// Browser session parameters for one fetch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Upper bound on waiting for `document.readyState === "complete"` (the `load` event)
    pub nav_timeout: Duration,
    /// Pause after load so client-side rendering can finish
    pub settle_delay: Duration,
    pub headless: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(90),
            settle_delay: Duration::from_secs(5),
            headless: true,
        }
    }
}

impl From<&Settings> for FetchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            nav_timeout: settings.nav_timeout,
            settle_delay: settings.settle_delay,
            ..Self::default()
        }
    }
}

/// Captured page text per site, plus the reason each failed site was dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPages {
    pub pages: BTreeMap<Site, String>,
    pub failures: BTreeMap<Site, String>,
}

impl FetchedPages {
    pub fn record(&mut self, site: Site, result: anyhow::Result<String>) {
        match result {
            Ok(text) => {
                self.pages.insert(site, text);
            }
            Err(e) => {
                self.failures.insert(site, format!("{:#}", e));
            }
        }
    }
}
