use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::models::{ResultSet, SiteOutcome};

/// Human-readable summary: one section per site, failures attributed
pub fn render_text(results: &ResultSet) -> String {
    let mut lines = vec![
        "📊 Extracted Hotel Prices".to_string(),
        "==========================".to_string(),
    ];

    for (site, outcome) in results.outcomes() {
        lines.push(String::new());
        lines.push(site.title().to_string());

        match outcome {
            SiteOutcome::Success(prices) => {
                lines.extend(prices.iter().map(|(room, price)| format!("- {}: {}", room, price)));
            }
            SiteOutcome::EmptyResult => lines.push("No results found.".to_string()),
            SiteOutcome::FetchFailed(_) | SiteOutcome::ExtractFailed(_) => {
                lines.push("No results found.".to_string());
                lines.extend(outcome.diagnostic(site).map(|diagnostic| diagnostic.to_string()));
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Saves the result set as pretty JSON
pub async fn write_json(path: &Path, results: &ResultSet) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved results to {}", path.display());
    Ok(())
}
