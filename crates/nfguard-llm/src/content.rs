//! Component content rendering
//!
//! Files are truncated to stay inside prompt limits; directories are
//! rendered as an indented listing of their tree.

use nfguard_core::{Component, ValidatorError};
use walkdir::WalkDir;

/// Maximum characters of file content forwarded to the LLM
const MAX_CONTENT_CHARS: usize = 8000;
/// Maximum characters of a directory listing
const MAX_LISTING_CHARS: usize = 7500;

/// Render the component's content for prompting
///
/// # Errors
/// [`ValidatorError::ContentUnreadable`] when the file cannot be read.
pub(crate) async fn render_component(component: &Component) -> Result<String, ValidatorError> {
    if component.path().is_dir() {
        return Ok(render_listing(component));
    }
    let text = tokio::fs::read_to_string(component.path())
        .await
        .map_err(|source| ValidatorError::ContentUnreadable {
            path: component.path().to_path_buf(),
            source,
        })?;
    Ok(truncate_chars(&text, MAX_CONTENT_CHARS).to_string())
}

/// Indented tree listing, truncated once it exceeds the listing cap
fn render_listing(component: &Component) -> String {
    let mut listing = String::from("Directory structure:\n");
    for entry in WalkDir::new(component.path())
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let indent = "    ".repeat(entry.depth());
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            listing.push_str(&format!("{indent}{name}/\n"));
        } else {
            listing.push_str(&format!("{indent}{name}\n"));
        }
        if listing.len() > MAX_LISTING_CHARS {
            listing.push_str("... (directory listing truncated)");
            break;
        }
    }
    listing
}

/// Truncate on a character boundary
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfguard_core::ComponentType;
    use std::fs;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters must not be split
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[tokio::test]
    async fn file_content_is_read_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.nf");
        fs::write(&path, "process FASTQC {}\n".repeat(1000)).unwrap();

        let component = Component::new(&path, ComponentType::Module);
        let rendered = render_component(&component).await.unwrap();
        assert_eq!(rendered.chars().count(), MAX_CONTENT_CHARS);
        assert!(rendered.starts_with("process FASTQC"));
    }

    #[tokio::test]
    async fn unreadable_file_maps_to_content_error() {
        let component = Component::new("/no/such/file.nf", ComponentType::OtherFile);
        let err = render_component(&component).await.unwrap_err();
        assert!(matches!(err, ValidatorError::ContentUnreadable { .. }));
    }

    #[tokio::test]
    async fn directory_renders_as_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/sample.csv"), "a,b\n").unwrap();
        fs::write(dir.path().join("nextflow.test.config"), "").unwrap();

        let component = Component::new(dir.path(), ComponentType::TestData);
        let rendered = render_component(&component).await.unwrap();
        assert!(rendered.starts_with("Directory structure:"));
        assert!(rendered.contains("data/"));
        assert!(rendered.contains("sample.csv"));
        assert!(rendered.contains("nextflow.test.config"));
    }
}
