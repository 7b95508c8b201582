//! Pipeline component discovery
//!
//! Enumerates the files and directories of an nf-core pipeline checkout
//! that are subject to compliance checks. Discovery happens once, up
//! front; the component list is fixed for the lifetime of a scan.

use crate::component::Component;
use crate::error::ScanError;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Pipeline-level files validated when present
const PIPELINE_FILES: [&str; 6] = [
    "nextflow.config",
    "nextflow_schema.json",
    "README.md",
    "CHANGELOG.md",
    "LICENSE",
    "CITATIONS.md",
];

/// Enumerate all components of the pipeline rooted at `pipeline_root`
///
/// Collects, in discovery order: module entry points
/// (`modules/**/main.nf`), workflow and subworkflow files, the root
/// `main.nf`, pipeline-level files, `conf/*.config`, and the `tests/`
/// directory itself. Duplicate paths are not filtered.
///
/// # Errors
/// [`ScanError::PipelineNotFound`] when the root does not exist; walk and
/// read errors propagate as [`ScanError::Walk`] / [`ScanError::Io`].
pub fn discover_components(pipeline_root: &Path) -> Result<Vec<Component>, ScanError> {
    if !pipeline_root.exists() {
        return Err(ScanError::PipelineNotFound(pipeline_root.to_path_buf()));
    }

    let mut components = Vec::new();

    let modules = pipeline_root.join("modules");
    if modules.is_dir() {
        for entry in WalkDir::new(&modules).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name() == "main.nf" {
                components.push(Component::from_fs(entry.into_path()));
            }
        }
    }

    push_nf_files(&pipeline_root.join("workflows"), &mut components)?;
    push_nf_files(&pipeline_root.join("subworkflows"), &mut components)?;

    let main_workflow = pipeline_root.join("main.nf");
    if main_workflow.is_file() {
        components.push(Component::from_fs(main_workflow));
    }

    for name in PIPELINE_FILES {
        let path = pipeline_root.join(name);
        if path.exists() {
            components.push(Component::from_fs(path));
        }
    }

    let conf = pipeline_root.join("conf");
    if conf.is_dir() {
        for path in sorted_entries(&conf)? {
            if path.is_file() && path.extension().is_some_and(|e| e == "config") {
                components.push(Component::from_fs(path));
            }
        }
    }

    let tests = pipeline_root.join("tests");
    if tests.is_dir() {
        components.push(Component::from_fs(tests));
    }

    tracing::debug!(
        pipeline = %pipeline_root.display(),
        components = components.len(),
        "discovery complete"
    );

    Ok(components)
}

/// Push top-level `*.nf` files of `dir`, if it exists
fn push_nf_files(dir: &Path, components: &mut Vec<Component>) -> Result<(), ScanError> {
    if !dir.is_dir() {
        return Ok(());
    }
    for path in sorted_entries(dir)? {
        if path.is_file() && path.extension().is_some_and(|e| e == "nf") {
            components.push(Component::from_fs(path));
        }
    }
    Ok(())
}

/// Directory entries in stable name order
fn sorted_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>, ScanError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        paths.push(entry?.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "// fixture").unwrap();
    }

    fn fixture_pipeline() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("modules/local/fastqc/main.nf"));
        touch(&root.join("modules/nf-core/multiqc/main.nf"));
        touch(&root.join("workflows/rnaseq.nf"));
        touch(&root.join("subworkflows/align.nf"));
        touch(&root.join("main.nf"));
        touch(&root.join("nextflow.config"));
        touch(&root.join("nextflow_schema.json"));
        touch(&root.join("README.md"));
        touch(&root.join("conf/base.config"));
        touch(&root.join("conf/igenomes.config"));
        fs::create_dir_all(root.join("tests")).unwrap();
        dir
    }

    #[test]
    fn missing_root_is_a_configuration_error() {
        let err = discover_components(Path::new("/definitely/not/a/pipeline")).unwrap_err();
        assert!(matches!(err, ScanError::PipelineNotFound(_)));
    }

    #[test]
    fn discovers_all_component_kinds() {
        let dir = fixture_pipeline();
        let components = discover_components(dir.path()).unwrap();

        let count = |t: ComponentType| {
            components
                .iter()
                .filter(|c| c.component_type() == t)
                .count()
        };
        assert_eq!(count(ComponentType::Module), 2);
        assert_eq!(count(ComponentType::Workflow), 1);
        assert_eq!(count(ComponentType::Subworkflow), 1);
        assert_eq!(count(ComponentType::MainWorkflow), 1);
        assert_eq!(count(ComponentType::NextflowConfig), 1);
        assert_eq!(count(ComponentType::SchemaFile), 1);
        assert_eq!(count(ComponentType::DocumentationFile), 1);
        assert_eq!(count(ComponentType::ConfigFile), 2);
        assert_eq!(count(ComponentType::TestData), 1);
        assert_eq!(components.len(), 11);
    }

    #[test]
    fn empty_pipeline_discovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let components = discover_components(dir.path()).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn modules_walk_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("modules/a/b/c/d/main.nf"));
        // Helper scripts next to the entry point are not components
        touch(&dir.path().join("modules/a/b/c/d/helper.py"));
        let components = discover_components(dir.path()).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].component_type(), ComponentType::Module);
    }
}
