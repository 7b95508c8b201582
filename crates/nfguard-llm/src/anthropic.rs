//! Anthropic messages validator backend

use crate::guidelines::GuidelineStore;
use crate::provider::LlmConfigError;
use crate::{client, content, prompt, verdict};
use nfguard_core::{Component, ComponentReport, Validator, ValidatorError};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const RETRIEVAL_K: usize = 5;

/// Validator backed by the Anthropic messages API
pub struct AnthropicValidator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    store: GuidelineStore,
}

impl AnthropicValidator {
    /// Create a backend with the default model and endpoint
    ///
    /// # Errors
    /// [`LlmConfigError::Http`] when the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, store: GuidelineStore) -> Result<Self, LlmConfigError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            store,
        })
    }

    /// With a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With an endpoint override (proxies, tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl Validator for AnthropicValidator {
    async fn validate(&self, component: &Component) -> Result<ComponentReport, ValidatorError> {
        let content_text = content::render_component(component).await?;
        let passages = self
            .store
            .relevant(&prompt::retrieval_query(component, &content_text), RETRIEVAL_K);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "system": prompt::SYSTEM_PROMPT,
            "messages": [
                { "role": "user", "content": prompt::user_prompt(component, &content_text, &passages) },
            ],
        });

        tracing::debug!(
            component = %component.file_name(),
            model = %self.model,
            passages = passages.len(),
            "requesting compliance verdict"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| ValidatorError::Transport(err.to_string()))?;

        let raw = client::read_success_body(response).await?;
        let payload: MessagesResponse = serde_json::from_str(&raw)
            .map_err(|err| ValidatorError::MalformedVerdict(err.to_string()))?;
        let text = payload
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| {
                ValidatorError::MalformedVerdict("response carried no text block".to_string())
            })?;

        verdict::parse_verdict(component, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_response_shape_parses() {
        let raw = r#"{"content": [{"type": "text", "text": "{\"requirements\": []}"}], "model": "claude"}"#;
        let payload: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.content.len(), 1);
        assert_eq!(payload.content[0].kind, "text");
    }

    #[test]
    fn non_text_blocks_are_skipped() {
        let raw = r#"{"content": [{"type": "thinking"}, {"type": "text", "text": "{}"}]}"#;
        let payload: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = payload
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text);
        assert_eq!(text.as_deref(), Some("{}"));
    }

    #[test]
    fn builder_overrides() {
        let backend = AnthropicValidator::new("key", GuidelineStore::empty())
            .unwrap()
            .with_model("claude-sonnet-4-20250514")
            .with_base_url("http://localhost:9999/");
        assert_eq!(backend.model, "claude-sonnet-4-20250514");
        assert_eq!(backend.base_url, "http://localhost:9999");
    }
}
