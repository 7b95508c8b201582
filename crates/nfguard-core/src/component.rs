//! Pipeline component model
//!
//! A component is a single file or directory within a pipeline that is
//! subject to compliance checks. Its type is a pure function of path and
//! name patterns, mirroring the layout conventions of nf-core pipelines.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Classified component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Module entry point (`modules/**/main.nf`)
    Module,
    /// Named workflow (`workflows/*.nf`)
    Workflow,
    /// Subworkflow (`subworkflows/*.nf`)
    Subworkflow,
    /// Pipeline entry point (root `main.nf`)
    MainWorkflow,
    /// Root `nextflow.config`
    NextflowConfig,
    /// Additional configuration file (`*.config`)
    ConfigFile,
    /// Parameter schema (`nextflow_schema.json`)
    SchemaFile,
    /// Pipeline documentation (README, CHANGELOG, CITATIONS, LICENSE)
    DocumentationFile,
    /// Test data directory
    TestData,
    /// Other directory
    Directory,
    /// Anything else
    OtherFile,
}

impl ComponentType {
    /// Classify a path, with directoriness supplied by the caller
    ///
    /// Pattern checks happen in the same precedence order the pipeline
    /// layout implies: module entry points win over subworkflow and
    /// workflow files, which win over the root `main.nf`.
    #[must_use]
    pub fn from_path(path: &Path, is_dir: bool) -> Self {
        if is_dir {
            if file_name(path) == "tests" {
                return Self::TestData;
            }
            return Self::Directory;
        }

        let name = file_name(path);
        let is_nf = name.ends_with(".nf");

        if name == "main.nf" && under(path, "modules") {
            Self::Module
        } else if is_nf && under(path, "subworkflows") {
            Self::Subworkflow
        } else if is_nf && under(path, "workflows") {
            Self::Workflow
        } else if name == "main.nf" {
            Self::MainWorkflow
        } else if name == "nextflow.config" {
            Self::NextflowConfig
        } else if name.ends_with(".config") {
            Self::ConfigFile
        } else if name == "nextflow_schema.json" {
            Self::SchemaFile
        } else if matches!(name, "README.md" | "CHANGELOG.md" | "CITATIONS.md" | "LICENSE") {
            Self::DocumentationFile
        } else {
            Self::OtherFile
        }
    }

    /// Stable snake_case name, matching the serialized form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Workflow => "workflow",
            Self::Subworkflow => "subworkflow",
            Self::MainWorkflow => "main_workflow",
            Self::NextflowConfig => "nextflow_config",
            Self::ConfigFile => "config_file",
            Self::SchemaFile => "schema_file",
            Self::DocumentationFile => "documentation_file",
            Self::TestData => "test_data",
            Self::Directory => "directory",
            Self::OtherFile => "other_file",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file or directory subject to compliance checks
///
/// Immutable once discovered; the type is derived at discovery time and
/// never re-evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    path: PathBuf,
    component_type: ComponentType,
}

impl Component {
    /// Create a component with an explicit type
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, component_type: ComponentType) -> Self {
        Self {
            path: path.into(),
            component_type,
        }
    }

    /// Classify a discovered path against the filesystem
    #[must_use]
    pub fn from_fs(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let component_type = ComponentType::from_path(&path, path.is_dir());
        Self {
            path,
            component_type,
        }
    }

    /// Component path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Classified type
    #[inline]
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Final path segment, for logging
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }

    /// Whether the component refers to a directory
    #[inline]
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(
            self.component_type,
            ComponentType::TestData | ComponentType::Directory
        )
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Whether any ancestor path segment equals `segment`
fn under(path: &Path, segment: &str) -> bool {
    path.parent()
        .map(|parent| parent.components().any(|c| c.as_os_str() == segment))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str) -> ComponentType {
        ComponentType::from_path(Path::new(path), false)
    }

    #[test]
    fn module_entry_point() {
        assert_eq!(
            classify("/pipeline/modules/local/fastqc/main.nf"),
            ComponentType::Module
        );
    }

    #[test]
    fn workflow_and_subworkflow_files() {
        assert_eq!(
            classify("/pipeline/workflows/rnaseq.nf"),
            ComponentType::Workflow
        );
        assert_eq!(
            classify("/pipeline/subworkflows/align.nf"),
            ComponentType::Subworkflow
        );
    }

    #[test]
    fn subworkflow_wins_over_workflow_main() {
        // A main.nf nested under subworkflows/ is not a module
        assert_eq!(
            classify("/pipeline/subworkflows/align/main.nf"),
            ComponentType::Subworkflow
        );
    }

    #[test]
    fn root_main_workflow() {
        assert_eq!(classify("/pipeline/main.nf"), ComponentType::MainWorkflow);
    }

    #[test]
    fn config_files() {
        assert_eq!(
            classify("/pipeline/nextflow.config"),
            ComponentType::NextflowConfig
        );
        assert_eq!(
            classify("/pipeline/conf/base.config"),
            ComponentType::ConfigFile
        );
    }

    #[test]
    fn schema_and_documentation() {
        assert_eq!(
            classify("/pipeline/nextflow_schema.json"),
            ComponentType::SchemaFile
        );
        assert_eq!(
            classify("/pipeline/README.md"),
            ComponentType::DocumentationFile
        );
        assert_eq!(
            classify("/pipeline/LICENSE"),
            ComponentType::DocumentationFile
        );
    }

    #[test]
    fn fallback_is_other_file() {
        assert_eq!(classify("/pipeline/bin/helper.py"), ComponentType::OtherFile);
    }

    #[test]
    fn directories() {
        let tests = Path::new("/pipeline/tests");
        assert_eq!(
            ComponentType::from_path(tests, true),
            ComponentType::TestData
        );
        let assets = Path::new("/pipeline/assets");
        assert_eq!(
            ComponentType::from_path(assets, true),
            ComponentType::Directory
        );
    }

    #[test]
    fn serialized_names_are_snake_case() {
        let json = serde_json::to_string(&ComponentType::MainWorkflow).unwrap();
        assert_eq!(json, "\"main_workflow\"");
        let json = serde_json::to_string(&ComponentType::DocumentationFile).unwrap();
        assert_eq!(json, "\"documentation_file\"");
    }

    #[test]
    fn component_accessors() {
        let component = Component::new("/p/modules/a/main.nf", ComponentType::Module);
        assert_eq!(component.file_name(), "main.nf");
        assert_eq!(component.component_type(), ComponentType::Module);
        assert!(!component.is_directory());
    }
}
