//! OpenAI chat-completions validator backend

use crate::guidelines::GuidelineStore;
use crate::provider::LlmConfigError;
use crate::{client, content, prompt, verdict};
use nfguard_core::{Component, ComponentReport, Validator, ValidatorError};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const RETRIEVAL_K: usize = 5;

/// Validator backed by the OpenAI chat-completions API
pub struct OpenAiValidator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    store: GuidelineStore,
}

impl OpenAiValidator {
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
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait::async_trait]
impl Validator for OpenAiValidator {
    async fn validate(&self, component: &Component) -> Result<ComponentReport, ValidatorError> {
        let content_text = content::render_component(component).await?;
        let passages = self
            .store
            .relevant(&prompt::retrieval_query(component, &content_text), RETRIEVAL_K);

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
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
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ValidatorError::Transport(err.to_string()))?;

        let raw = client::read_success_body(response).await?;
        let payload: ChatResponse = serde_json::from_str(&raw)
            .map_err(|err| ValidatorError::MalformedVerdict(err.to_string()))?;
        let text = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ValidatorError::MalformedVerdict("response carried no choices".to_string())
            })?;

        verdict::parse_verdict(component, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let backend = OpenAiValidator::new("sk-test", GuidelineStore::empty())
            .unwrap()
            .with_base_url("http://127.0.0.1:8089/");
        assert_eq!(backend.base_url, "http://127.0.0.1:8089");
    }

    #[test]
    fn model_override() {
        let backend = OpenAiValidator::new("sk-test", GuidelineStore::empty())
            .unwrap()
            .with_model("gpt-4.1-mini");
        assert_eq!(backend.model, "gpt-4.1-mini");
    }

    #[test]
    fn chat_response_shape_parses() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}]}"#;
        let payload: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.choices.len(), 1);
        assert_eq!(payload.choices[0].message.content, "{}");
    }
}
