use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{SiteCatalog, SiteProfile};
use crate::error::{Error, Result};
use crate::llm::ChatCompletion;
use crate::models::Site;

/// Line format the model is asked to answer in
pub const ANSWER_FORMAT: &str = "Room Name – ₹Price";

pub fn system_prompt(profile: &SiteProfile) -> String {
    format!(
        "You extract hotel room names and prices from {} page text.",
        profile.label
    )
}

/// Instruction, allow-list, answer format, then the page text verbatim
pub fn build_prompt(profile: &SiteProfile, page_text: &str) -> String {
    let allow_list = profile
        .vocabulary
        .iter()
        .map(|room| format!("- {}", room))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "From the {} page text, extract room names and INR prices.\n\n\
         Only extract rooms matching:\n{}\n\n\
         Format:\n{}\n\n{}\n",
        profile.source, allow_list, ANSWER_FORMAT, page_text
    )
}

/// Asks the model for the allow-listed rooms on one page.
/// Returns the raw answer; parsing happens elsewhere.
pub struct Extractor {
    model: Arc<dyn ChatCompletion>,
    catalog: SiteCatalog,
    temperature: f32,
}

impl Extractor {
    pub fn new(model: Arc<dyn ChatCompletion>, catalog: SiteCatalog, temperature: f32) -> Self {
        Self {
            model,
            catalog,
            temperature,
        }
    }

    pub async fn extract(&self, site: Site, page_text: &str) -> Result<String> {
        let profile = self
            .catalog
            .get(&site)
            .ok_or_else(|| Error::Config(format!("No profile configured for {}", site)))?;

        let prompt = build_prompt(profile, page_text);
        debug!(%site, prompt_len = prompt.len(), "Built extraction prompt");

        let answer = self
            .model
            .complete(&system_prompt(profile), &prompt, self.temperature)
            .await?;

        info!(%site, "Model answered with {} lines", answer.lines().count());
        Ok(answer)
    }
}
