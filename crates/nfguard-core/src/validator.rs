//! Validator capability seam
//!
//! The orchestrator drives an opaque validation capability: component in,
//! structured requirement outcomes out. Backend implementations live in
//! other crates and are selected once at construction; the orchestrator
//! never branches on which backend it is talking to.

use crate::component::Component;
use crate::error::ValidatorError;
use crate::report::ComponentReport;

/// Validation capability for a single pipeline component
///
/// Implementations own their network round trips, timeouts, and content
/// handling. Latency is unspecified; calls are expected to be I/O-bound.
#[async_trait::async_trait]
pub trait Validator: Send + Sync {
    /// Judge one component against the guidelines
    ///
    /// # Errors
    /// [`ValidatorError::RateLimited`] when the upstream service asks for
    /// a delayed retry; any other variant is terminal for the component.
    async fn validate(&self, component: &Component) -> Result<ComponentReport, ValidatorError>;
}
