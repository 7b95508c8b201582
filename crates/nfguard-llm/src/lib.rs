//! nfguard LLM - switchable validator backends
//!
//! Variant implementations of the core validator capability:
//! - OpenAI chat-completions backend
//! - Anthropic messages backend
//!
//! The backend is selected once at construction via [`LlmConfig`];
//! guideline context comes from a lexical [`GuidelineStore`]. Upstream
//! rate limiting and API failures are mapped into the structured core
//! error taxonomy, so the orchestrator never inspects error text.
//!
//! # Example
//!
//! ```rust,ignore
//! use nfguard_llm::{build_validator, GuidelineStore, LlmConfig, Provider};
//!
//! let store = GuidelineStore::load("./guidelines".as_ref())?;
//! let validator = build_validator(LlmConfig::new(Provider::Anthropic), store)?;
//! ```

// Backends
pub mod anthropic;
pub mod openai;

// Selection and retrieval
pub mod guidelines;
pub mod provider;

// Shared plumbing
mod client;
mod content;
mod prompt;
mod verdict;

// Re-exports for convenience
pub use anthropic::AnthropicValidator;
pub use guidelines::{GuidelinePassage, GuidelineStore};
pub use openai::OpenAiValidator;
pub use provider::{build_validator, LlmConfig, LlmConfigError, Provider};
