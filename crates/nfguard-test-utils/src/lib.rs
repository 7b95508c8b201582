//! Testing utilities for the nfguard workspace
//!
//! Shared validator doubles and fixture helpers.

#![allow(missing_docs)]

use nfguard_core::{
    Component, ComponentReport, ComponentType, RequirementOutcome, RequirementStatus, Validator,
    ValidatorError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted validator response
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Succeed with `passed` passing and `failed` failing requirements
    Verdict { passed: usize, failed: usize },
    /// Fail with a rate-limit signal carrying the given suggested wait
    RateLimited(Option<Duration>),
    /// Fail terminally with a transport error message
    Fail(String),
    /// Panic mid-call
    Panic(String),
}

/// Scripted validator double
///
/// Responses are queued per component path and popped in order; calls
/// for unscripted paths succeed with a single passing requirement. The
/// double also records call counts and the in-flight high-water mark so
/// tests can assert the orchestrator's concurrency ceiling.
#[derive(Debug, Default)]
pub struct ScriptedValidator {
    scripts: Mutex<HashMap<PathBuf, Vec<Scripted>>>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// With a simulated per-call latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a response for the given path
    pub fn script(&self, path: impl Into<PathBuf>, outcome: Scripted) {
        self.scripts
            .lock()
            .expect("script table poisoned")
            .entry(path.into())
            .or_default()
            .push(outcome);
    }

    /// Total validate() invocations observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent validate() calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_scripted(&self, path: &PathBuf) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().expect("script table poisoned");
        let queue = scripts.get_mut(path)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

#[async_trait::async_trait]
impl Validator for ScriptedValidator {
    async fn validate(&self, component: &Component) -> Result<ComponentReport, ValidatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self.next_scripted(&component.path().to_path_buf());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match scripted {
            None => Ok(ComponentReport::for_component(
                component,
                vec![passed("NF-DEFAULT")],
            )),
            Some(Scripted::Verdict {
                passed: pass_count,
                failed: fail_count,
            }) => {
                let mut requirements = Vec::with_capacity(pass_count + fail_count);
                for i in 0..pass_count {
                    requirements.push(passed(&format!("NF-P{i}")));
                }
                for i in 0..fail_count {
                    requirements.push(failed(&format!("NF-F{i}")));
                }
                Ok(ComponentReport::for_component(component, requirements))
            }
            Some(Scripted::RateLimited(retry_after)) => {
                Err(ValidatorError::RateLimited { retry_after })
            }
            Some(Scripted::Fail(message)) => Err(ValidatorError::Transport(message)),
            Some(Scripted::Panic(message)) => panic!("{message}"),
        }
    }
}

/// A passing requirement outcome
pub fn passed(id: &str) -> RequirementOutcome {
    RequirementOutcome::new(id, format!("requirement {id}"), RequirementStatus::Passed)
}

/// A failing requirement outcome with a canned fix
pub fn failed(id: &str) -> RequirementOutcome {
    RequirementOutcome::new(id, format!("requirement {id}"), RequirementStatus::Failed)
        .with_fix(format!("address {id}"))
}

/// A file component with a synthetic path
pub fn component(path: &str) -> Component {
    Component::new(path, ComponentType::OtherFile)
}

/// File components for each of the given paths
pub fn components(paths: &[&str]) -> Vec<Component> {
    paths.iter().map(|p| component(p)).collect()
}
