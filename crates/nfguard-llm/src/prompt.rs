//! Prompt assembly for compliance judgment
//!
//! The system prompt pins the JSON verdict contract; the user prompt
//! carries the component, its (already truncated) content, and the
//! retrieved guideline passages.

use crate::content;
use crate::guidelines::GuidelinePassage;
use nfguard_core::Component;

pub(crate) const SYSTEM_PROMPT: &str = "\
You are an nf-core pipeline compliance expert. Analyze the provided \
pipeline component against the official nf-core guidelines.

Steps:
1. Check the component against every relevant requirement for its type
2. Mark each requirement passed or failed
3. For failed requirements, provide a specific fix

Respond with JSON only, in exactly this shape:
{
  \"requirements\": [
    {
      \"id\": \"requirement_id\",
      \"description\": \"requirement_description\",
      \"status\": \"passed|failed\",
      \"fix\": \"suggestion_if_failed\"
    }
  ]
}

Be thorough and check against ALL relevant requirements for the \
component type.";

/// Query string used to retrieve guideline passages for a component
pub(crate) fn retrieval_query(component: &Component, content_text: &str) -> String {
    format!(
        "{} {} {}",
        component.component_type(),
        component.file_name(),
        content::truncate_chars(content_text, 500)
    )
}

/// Assemble the user prompt
pub(crate) fn user_prompt(
    component: &Component,
    content_text: &str,
    passages: &[&GuidelinePassage],
) -> String {
    let mut prompt = format!(
        "Component Path: {}\nComponent Type: {}\n\nComponent Content:\n```\n{}\n```\n",
        component.path().display(),
        component.component_type(),
        content_text,
    );
    if !passages.is_empty() {
        prompt.push_str("\nRelevant Guidelines:\n");
        for passage in passages {
            if let Some(heading) = passage.heading() {
                prompt.push_str(heading);
                prompt.push('\n');
            }
            prompt.push_str(passage.body());
            prompt.push('\n');
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfguard_core::ComponentType;

    #[test]
    fn retrieval_query_names_type_and_file() {
        let component = Component::new("/p/modules/fastqc/main.nf", ComponentType::Module);
        let query = retrieval_query(&component, "process FASTQC {}");
        assert!(query.starts_with("module main.nf"));
        assert!(query.contains("FASTQC"));
    }

    #[test]
    fn user_prompt_includes_content_and_guidelines() {
        let component = Component::new("/p/main.nf", ComponentType::MainWorkflow);
        let store = crate::guidelines::GuidelineStore::empty();
        let none = store.relevant("anything", 5);
        let prompt = user_prompt(&component, "workflow {}", &none);
        assert!(prompt.contains("Component Path: /p/main.nf"));
        assert!(prompt.contains("Component Type: main_workflow"));
        assert!(prompt.contains("workflow {}"));
        assert!(!prompt.contains("Relevant Guidelines"));
    }
}
