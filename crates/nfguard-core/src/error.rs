//! Error types for nfguard Core
//!
//! Two independent vocabularies:
//! - [`ScanError`]: configuration and discovery failures, raised before
//!   any validation work starts
//! - [`ValidatorError`]: the per-component failure vocabulary reported by
//!   validator backends and branched on by the orchestrator

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised before scanning begins
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Pipeline root path does not exist (configuration error)
    #[error("pipeline path does not exist: {}", .0.display())]
    PipelineNotFound(PathBuf),

    /// Filesystem walk failed during discovery
    #[error("failed to walk pipeline tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Filesystem read failed during discovery
    #[error("io error during discovery: {0}")]
    Io(#[from] io::Error),
}

/// Failure vocabulary for validator backends
///
/// The orchestrator branches on structure, not message text: a
/// [`ValidatorError::RateLimited`] value triggers the single backoff
/// retry; every other variant is terminal for the component.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// Upstream service signaled temporary unavailability
    ///
    /// Carries the upstream-suggested wait when one was present in the
    /// response; the orchestrator falls back to a fixed wait otherwise.
    #[error("rate limit reached")]
    RateLimited {
        /// Suggested wait before retrying
        retry_after: Option<Duration>,
    },

    /// Upstream API rejected the request
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Upstream error message
        message: String,
    },

    /// Response could not be parsed into requirement outcomes
    #[error("malformed verdict: {0}")]
    MalformedVerdict(String),

    /// Component content could not be read
    #[error("failed to read {}: {source}", .path.display())]
    ContentUnreadable {
        /// Component path
        path: PathBuf,
        /// Underlying filesystem error
        source: io::Error,
    },

    /// Network-level failure talking to the upstream service
    #[error("transport error: {0}")]
    Transport(String),

    /// Validator implementation fault (panic or internal bug)
    #[error("internal validator error: {0}")]
    Internal(String),
}

impl ValidatorError {
    /// Whether this failure is the recoverable rate-limit condition
    #[inline]
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Upstream-suggested wait, if any
    #[inline]
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
