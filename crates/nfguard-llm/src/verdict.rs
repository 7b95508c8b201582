//! LLM verdict parsing
//!
//! Backends hand over raw model output; this module extracts the JSON
//! object (models like to wrap it in code fences or prose) and converts
//! it into a component report with a recomputed summary.

use nfguard_core::{
    Component, ComponentReport, RequirementOutcome, RequirementStatus, ValidatorError,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    requirements: Vec<RawRequirement>,
}

#[derive(Debug, Deserialize)]
struct RawRequirement {
    id: String,
    description: String,
    status: RawStatus,
    #[serde(default)]
    fix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawStatus {
    Passed,
    Failed,
}

/// Parse raw model output into a component report
///
/// The per-component summary is recomputed from the outcomes; any
/// tallies the model volunteered are ignored.
///
/// # Errors
/// [`ValidatorError::MalformedVerdict`] when no JSON object is present
/// or it does not match the verdict contract.
pub(crate) fn parse_verdict(
    component: &Component,
    raw: &str,
) -> Result<ComponentReport, ValidatorError> {
    let json = extract_json(raw).ok_or_else(|| {
        ValidatorError::MalformedVerdict("no JSON object in model output".to_string())
    })?;
    let verdict: RawVerdict =
        serde_json::from_str(json).map_err(|err| ValidatorError::MalformedVerdict(err.to_string()))?;

    let requirements = verdict
        .requirements
        .into_iter()
        .map(|raw| {
            let status = match raw.status {
                RawStatus::Passed => RequirementStatus::Passed,
                RawStatus::Failed => RequirementStatus::Failed,
            };
            let mut outcome = RequirementOutcome::new(raw.id, raw.description, status);
            if let Some(fix) = raw.fix.filter(|f| !f.trim().is_empty()) {
                outcome = outcome.with_fix(fix);
            }
            outcome
        })
        .collect();

    Ok(ComponentReport::for_component(component, requirements))
}

/// Slice from the first `{` to the last `}`, stripping fences and prose
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}
