//! Chat-completion capability and its OpenAI implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or blank credential, bad base URL
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response (auth, quota, bad request)
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Anything that can answer a single system + user prompt pair
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> LlmResult<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls the trimmed first-choice content out of a chat-completions body
fn first_choice_content(body: &str) -> LlmResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Parse(format!("Failed to decode response: {}", e)))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("No choices in response".into()))?;
    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

/// OpenAI chat-completions client
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("OPENAI_API_KEY is empty".into()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Create from `OPENAI_API_KEY` (and optional `OPENAI_BASE_URL`)
    pub fn from_env(model: impl Into<String>) -> LlmResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".into()))?;
        let chat = Self::new(api_key, model)?;
        match std::env::var("OPENAI_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Ok(chat.with_base_url(url.trim())),
            _ => Ok(chat),
        }
    }

    /// Set a custom base URL (for proxies or compatible providers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> LlmResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            temperature,
        };

        debug!(model = %self.model, prompt_len = user.len(), "Sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        first_choice_content(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_messages_in_order() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![Message::system("sys"), Message::user("hi")],
            temperature: 0.3,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn decodes_and_trims_first_choice() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  Deluxe King Room – ₹4500\n"}}]}"#;
        assert_eq!(first_choice_content(body).unwrap(), "Deluxe King Room – ₹4500");
    }

    #[test]
    fn missing_choices_is_parse_error() {
        assert!(matches!(
            first_choice_content(r#"{"choices":[]}"#),
            Err(LlmError::Parse(_))
        ));
        assert!(matches!(first_choice_content("not json"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn null_content_is_empty_answer() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(first_choice_content(body).unwrap(), "");
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(matches!(OpenAiChat::new("  ", "gpt-3.5-turbo"), Err(LlmError::Config(_))));
        let chat = OpenAiChat::new("sk-test", "gpt-3.5-turbo")
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(chat.base_url, "http://localhost:8080/v1");
        assert_eq!(chat.model(), "gpt-3.5-turbo");
    }
}
