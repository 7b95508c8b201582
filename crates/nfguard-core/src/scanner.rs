//! Concurrent compliance scan orchestrator
//!
//! Drives the validator capability over all discovered components:
//! - Semaphore-gated task launch; at most `max_workers` calls in flight
//! - A single inline retry after an upstream rate-limit signal
//! - Per-component failure isolation; the scan always runs to completion
//! - Completion-ordered, append-only result collection
//!
//! The orchestrator holds no shared mutable state beyond the results
//! collection, which only the collection loop touches. Cancellation is
//! not supported: a scan runs to completion or the caller drops it.

use crate::component::Component;
use crate::error::ValidatorError;
use crate::report::{ComponentReport, ComponentResult, ScanReport};
use crate::validator::Validator;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum validator calls in flight; the sole admission-control knob
    pub max_workers: usize,
    /// Cooldown a worker holds its slot for after each call, throttling
    /// the start of the next queued component
    pub pacing: Duration,
    /// Wait applied when a rate-limit signal carries no suggested duration
    pub rate_limit_fallback: Duration,
    /// Safety margin added on top of the suggested wait
    pub retry_buffer: Duration,
}

impl ScanConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a worker limit (clamped to at least 1)
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// With an inter-component pacing delay
    #[inline]
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            pacing: Duration::from_millis(500),
            rate_limit_fallback: Duration::from_secs(15),
            retry_buffer: Duration::from_secs(1),
        }
    }
}

/// Concurrent scan orchestrator
///
/// See the module docs for the scheduling and failure-handling model.
#[derive(Debug, Clone)]
pub struct ScanOrchestrator {
    config: ScanConfig,
}

impl ScanOrchestrator {
    /// Create an orchestrator with the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Validate every component and assemble the aggregate report
    ///
    /// All components are submitted up front; the semaphore guarantees at
    /// most `max_workers` validator calls execute concurrently, with no
    /// ordering guarantee beyond slot availability. Results are collected
    /// in completion order, one entry per submitted component. The scan
    /// itself never fails: zero usable outcomes is a valid result with a
    /// compliance score of 0.
    pub async fn scan(
        &self,
        pipeline_path: impl Into<PathBuf>,
        components: Vec<Component>,
        validator: Arc<dyn Validator>,
    ) -> ScanReport {
        let pipeline_path = pipeline_path.into();
        let total = components.len();
        tracing::info!(
            pipeline = %pipeline_path.display(),
            components = total,
            max_workers = self.config.max_workers,
            "starting compliance scan"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks: JoinSet<(Component, Result<ComponentReport, ValidatorError>)> =
            JoinSet::new();

        for component in components {
            let semaphore = Arc::clone(&semaphore);
            let validator = Arc::clone(&validator);
            let pacing = self.config.pacing;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore closed");
                let outcome = run_validator(validator.as_ref(), &component).await;
                // The permit is held through the cooldown so the next
                // queued component starts no sooner.
                tokio::time::sleep(pacing).await;
                (component, outcome)
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            let Ok((component, outcome)) = joined else {
                // Workers convert panics into outcomes; a join error here
                // means the task was aborted externally.
                continue;
            };
            let result = match outcome {
                Ok(report) => {
                    tracing::info!(
                        component = %component.file_name(),
                        score = report.summary.compliance_score,
                        "component validated"
                    );
                    ComponentResult::Validated(report)
                }
                Err(err) if err.is_rate_limited() => {
                    self.retry_rate_limited(&component, &err, validator.as_ref())
                        .await
                }
                Err(err) => {
                    tracing::error!(
                        component = %component.file_name(),
                        error = %err,
                        "component validation failed"
                    );
                    ComponentResult::failed(component.path(), err.to_string())
                }
            };
            results.push(result);
        }

        let report = ScanReport::assemble(pipeline_path, results);
        tracing::info!(
            total_requirements = report.summary.total_requirements,
            passed_requirements = report.summary.passed_requirements,
            score = report.summary.compliance_score,
            "scan complete"
        );
        report
    }

    /// Back off for the suggested wait, then retry the component exactly
    /// once, inline, outside the worker pool
    ///
    /// Only the retried component's path pauses; in-flight siblings keep
    /// running and their completions queue up behind this wait.
    async fn retry_rate_limited(
        &self,
        component: &Component,
        err: &ValidatorError,
        validator: &dyn Validator,
    ) -> ComponentResult {
        let wait =
            err.retry_after().unwrap_or(self.config.rate_limit_fallback) + self.config.retry_buffer;
        tracing::warn!(
            component = %component.file_name(),
            wait_secs = wait.as_secs_f64(),
            "rate limited, backing off before retry"
        );
        tokio::time::sleep(wait).await;

        match run_validator(validator, component).await {
            Ok(report) => {
                tracing::info!(
                    component = %component.file_name(),
                    score = report.summary.compliance_score,
                    "component validated on retry"
                );
                ComponentResult::Validated(report)
            }
            Err(retry_err) => {
                tracing::error!(
                    component = %component.file_name(),
                    error = %retry_err,
                    "retry failed"
                );
                ComponentResult::failed(component.path(), retry_err.to_string())
            }
        }
    }
}

impl Default for ScanOrchestrator {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// Invoke the validator, converting panics into an error outcome so a
/// faulty backend cannot lose a component's result entry
async fn run_validator(
    validator: &dyn Validator,
    component: &Component,
) -> Result<ComponentReport, ValidatorError> {
    AssertUnwindSafe(validator.validate(component))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ValidatorError::Internal(panic_message(&panic))))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "validator panicked".to_string()
    }
}
