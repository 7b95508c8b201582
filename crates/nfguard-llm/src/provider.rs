//! Backend provider selection
//!
//! One polymorphic validator interface with variant implementations per
//! backend, selected once at construction via [`LlmConfig`]. Call sites
//! hold an `Arc<dyn Validator>` and never branch on the provider again.

use crate::anthropic::AnthropicValidator;
use crate::guidelines::GuidelineStore;
use crate::openai::OpenAiValidator;
use nfguard_core::Validator;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// OpenAI chat-completions API
    #[default]
    OpenAi,
    /// Anthropic messages API
    Anthropic,
}

impl Provider {
    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable consulted for the API key
    #[inline]
    #[must_use]
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = LlmConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(LlmConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend construction settings
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Which backend to build
    pub provider: Provider,
    /// Explicit API key; falls back to the provider's environment variable
    pub api_key: Option<String>,
    /// Model override
    pub model: Option<String>,
    /// Endpoint override (proxies, tests)
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Configuration for the given provider
    #[inline]
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// With an explicit API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// With a model override
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// With an endpoint override
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Configuration errors raised at backend construction
#[derive(Debug, thiserror::Error)]
pub enum LlmConfigError {
    /// Provider name not recognized
    #[error("unsupported model provider: {0} (choose 'openai' or 'anthropic')")]
    UnknownProvider(String),

    /// No API key available for the selected provider
    #[error("api key is required for {provider} (set {env_var} or pass it directly)")]
    MissingApiKey {
        /// The selected provider
        provider: Provider,
        /// Environment variable that was consulted
        env_var: &'static str,
    },

    /// HTTP client construction failed
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the validator selected by the configuration
///
/// # Errors
/// [`LlmConfigError::MissingApiKey`] when neither the configuration nor
/// the provider's environment variable supplies a key.
pub fn build_validator(
    config: LlmConfig,
    store: GuidelineStore,
) -> Result<Arc<dyn Validator>, LlmConfigError> {
    let api_key = resolve_api_key(&config)?;
    tracing::info!(provider = %config.provider, "building validator backend");

    match config.provider {
        Provider::OpenAi => {
            let mut backend = OpenAiValidator::new(api_key, store)?;
            if let Some(model) = config.model {
                backend = backend.with_model(model);
            }
            if let Some(base_url) = config.base_url {
                backend = backend.with_base_url(base_url);
            }
            Ok(Arc::new(backend))
        }
        Provider::Anthropic => {
            let mut backend = AnthropicValidator::new(api_key, store)?;
            if let Some(model) = config.model {
                backend = backend.with_model(model);
            }
            if let Some(base_url) = config.base_url {
                backend = backend.with_base_url(base_url);
            }
            Ok(Arc::new(backend))
        }
    }
}

fn resolve_api_key(config: &LlmConfig) -> Result<String, LlmConfigError> {
    if let Some(key) = config.api_key.as_deref() {
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }
    env::var(config.provider.api_key_env())
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or(LlmConfigError::MissingApiKey {
            provider: config.provider,
            env_var: config.provider.api_key_env(),
        })
}
