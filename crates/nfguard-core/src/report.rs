//! Compliance report model
//!
//! Append-only result structures produced by the scan orchestrator:
//! - Per-requirement outcomes (pass/fail plus an optional fix)
//! - Per-component reports with a recomputed summary
//! - The whole-scan report with the aggregate compliance score

use crate::component::{Component, ComponentType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome status for a single requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    /// Requirement is satisfied
    Passed,
    /// Requirement is violated
    Failed,
}

impl RequirementStatus {
    /// Whether the requirement passed
    #[inline]
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// One guideline requirement checked against a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementOutcome {
    /// Requirement identifier
    pub id: String,
    /// Human-readable requirement description
    pub description: String,
    /// Pass/fail verdict
    pub status: RequirementStatus,
    /// Suggested fix for failed requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl RequirementOutcome {
    /// Create a new outcome
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        status: RequirementStatus,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status,
            fix: None,
        }
    }

    /// With a fix suggestion
    #[inline]
    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Pass/fail tallies for a single component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Requirements passed
    pub passed: usize,
    /// Requirements failed
    pub failed: usize,
    /// Percentage of requirements passed, rounded to 2 decimals
    pub compliance_score: f64,
}

impl ComponentSummary {
    /// Tally outcomes into a summary
    #[must_use]
    pub fn from_outcomes(outcomes: &[RequirementOutcome]) -> Self {
        let passed = outcomes.iter().filter(|o| o.status.is_passed()).count();
        Self {
            passed,
            failed: outcomes.len() - passed,
            compliance_score: compliance_score(passed, outcomes.len()),
        }
    }
}

/// Validated component with its requirement outcomes
///
/// The summary is always recomputed from the outcomes, never taken on
/// trust from the validator backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    /// Component path
    pub path: PathBuf,
    /// Classified component type
    pub component_type: ComponentType,
    /// Ordered requirement outcomes
    pub requirements: Vec<RequirementOutcome>,
    /// Pass/fail tallies
    pub summary: ComponentSummary,
}

impl ComponentReport {
    /// Build a report, recomputing the summary from the outcomes
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        component_type: ComponentType,
        requirements: Vec<RequirementOutcome>,
    ) -> Self {
        let summary = ComponentSummary::from_outcomes(&requirements);
        Self {
            path: path.into(),
            component_type,
            requirements,
            summary,
        }
    }

    /// Build a report for a discovered component
    #[inline]
    #[must_use]
    pub fn for_component(component: &Component, requirements: Vec<RequirementOutcome>) -> Self {
        Self::new(component.path(), component.component_type(), requirements)
    }
}

/// Component that could not be validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFailure {
    /// Terminal error message
    pub error: String,
    /// Component path
    pub path: PathBuf,
}

/// Result entry for a single submitted component
///
/// Every submitted component produces exactly one entry: a validated
/// report or a failure record, never both, never neither. Serialized
/// untagged so failure entries keep the `{ "error": ..., "path": ... }`
/// shape consumers distinguish by field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentResult {
    /// Component was validated; requirements may still have failed
    Validated(ComponentReport),
    /// Component could not be evaluated at all
    Failed(ComponentFailure),
}

impl ComponentResult {
    /// Create a failure entry
    #[inline]
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self::Failed(ComponentFailure {
            error: error.into(),
            path: path.into(),
        })
    }

    /// Component path for either variant
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Validated(report) => &report.path,
            Self::Failed(failure) => &failure.path,
        }
    }

    /// Whether this entry records an evaluation failure
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Validated report, if any
    #[inline]
    #[must_use]
    pub fn report(&self) -> Option<&ComponentReport> {
        match self {
            Self::Validated(report) => Some(report),
            Self::Failed(_) => None,
        }
    }
}

/// Aggregate scan statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Components submitted to the scan
    pub total_components: usize,
    /// Requirements evaluated across all validated components
    pub total_requirements: usize,
    /// Requirements passed across all validated components
    pub passed_requirements: usize,
    /// Percentage of requirements passed, rounded to 2 decimals
    pub compliance_score: f64,
}

/// Full pipeline scan report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Scanned pipeline root
    pub pipeline_path: PathBuf,
    /// One entry per component, in completion order
    pub components: Vec<ComponentResult>,
    /// Aggregate statistics
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Assemble the report from completion-ordered results
    ///
    /// Failure entries contribute to `total_components` only; requirement
    /// totals cover validated entries alone.
    #[must_use]
    pub fn assemble(pipeline_path: impl Into<PathBuf>, components: Vec<ComponentResult>) -> Self {
        let mut total_requirements = 0;
        let mut passed_requirements = 0;
        for result in &components {
            if let Some(report) = result.report() {
                total_requirements += report.requirements.len();
                passed_requirements += report.summary.passed;
            }
        }
        let summary = ScanSummary {
            total_components: components.len(),
            total_requirements,
            passed_requirements,
            compliance_score: compliance_score(passed_requirements, total_requirements),
        };
        Self {
            pipeline_path: pipeline_path.into(),
            components,
            summary,
        }
    }

    /// Overall compliance score
    #[inline]
    #[must_use]
    pub fn compliance_score(&self) -> f64 {
        self.summary.compliance_score
    }
}

/// Percentage of requirements passed, rounded to 2 decimals
///
/// A zero denominator yields 0 rather than a division error; zero valid
/// data is a valid (if uninformative) outcome.
#[must_use]
pub fn compliance_score(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(passed as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
