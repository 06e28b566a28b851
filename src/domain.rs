//! Domain types shared by discovery, validation, batching and reporting

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A manifest file selected for validation
///
/// Identity is the filesystem path; the display path is what the report shows
/// (relative to the repository root in repository mode).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestFile {
    path: PathBuf,
    display_path: String,
}

impl ManifestFile {
    /// Create a manifest file whose display path is the path itself
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_path = normalize_separators(&path);
        Self { path, display_path }
    }

    /// Create a manifest file displayed relative to `root`
    pub fn relative_to(path: impl Into<PathBuf>, root: &Path) -> Self {
        let path = path.into();
        let display_path = path
            .strip_prefix(root)
            .map_or_else(|_| normalize_separators(&path), normalize_separators);
        Self { path, display_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_path(&self) -> &str {
        &self.display_path
    }
}

fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External validation tool that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tool {
    #[serde(rename = "kubeconform")]
    Kubeconform,
    #[serde(rename = "kube-linter")]
    KubeLinter,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Kubeconform => "kubeconform",
            Tool::KubeLinter => "kube-linter",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue category, assigned by keyword matching against the issue message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Schema Validation")]
    SchemaValidation,
    #[serde(rename = "API Version")]
    ApiVersion,
    #[serde(rename = "Resource Kind")]
    ResourceKind,
    #[serde(rename = "Metadata")]
    Metadata,
    #[serde(rename = "Specification")]
    Specification,
    #[serde(rename = "Missing Required Fields")]
    MissingRequiredFields,
    #[serde(rename = "Format/Syntax")]
    FormatSyntax,
    #[serde(rename = "Timeout")]
    Timeout,
    #[serde(rename = "File Not Found")]
    FileNotFound,
    #[serde(rename = "Security")]
    Security,
    #[serde(rename = "Health Probes")]
    HealthProbes,
    #[serde(rename = "Resource Limits")]
    ResourceLimits,
    #[serde(rename = "Other")]
    Other,
}

/// Keyword rules, checked in order; the first rule with a matching keyword wins
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["schema", "validation"], Category::SchemaValidation),
    (&["apiversion"], Category::ApiVersion),
    (&["kind"], Category::ResourceKind),
    (&["metadata"], Category::Metadata),
    (&["spec"], Category::Specification),
    (&["required", "missing"], Category::MissingRequiredFields),
    (&["format", "syntax"], Category::FormatSyntax),
    (&["timeout"], Category::Timeout),
    (&["not found"], Category::FileNotFound),
    (
        &["privilege", "root", "capabilit", "security"],
        Category::Security,
    ),
    (&["probe"], Category::HealthProbes),
    (&["cpu", "memory", "resource"], Category::ResourceLimits),
];

impl Category {
    /// Categorize a message with the fixed keyword rule
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(Category::Other, |(_, category)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::SchemaValidation => "Schema Validation",
            Category::ApiVersion => "API Version",
            Category::ResourceKind => "Resource Kind",
            Category::Metadata => "Metadata",
            Category::Specification => "Specification",
            Category::MissingRequiredFields => "Missing Required Fields",
            Category::FormatSyntax => "Format/Syntax",
            Category::Timeout => "Timeout",
            Category::FileNotFound => "File Not Found",
            Category::Security => "Security",
            Category::HealthProbes => "Health Probes",
            Category::ResourceLimits => "Resource Limits",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding reported by a validation tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub file: ManifestFile,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub tool: Tool,
}

impl ValidationIssue {
    /// Create an issue, categorizing it from its message
    pub fn new(file: ManifestFile, severity: Severity, tool: Tool, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            category: Category::from_message(&message),
            file,
            severity,
            message,
            tool,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_display_path() {
        let file = ManifestFile::relative_to("/tmp/checkout/k8s/app.yaml", Path::new("/tmp/checkout"));
        assert_eq!(file.display_path(), "k8s/app.yaml");
        assert_eq!(file.path(), Path::new("/tmp/checkout/k8s/app.yaml"));
    }

    #[test]
    fn test_relative_display_path_outside_root() {
        let file = ManifestFile::relative_to("/srv/app.yaml", Path::new("/tmp/checkout"));
        assert_eq!(file.display_path(), "/srv/app.yaml");
    }

    #[test]
    fn test_category_first_match_wins() {
        // "schema" outranks "kind"
        assert_eq!(
            Category::from_message("could not find schema for kind Foo"),
            Category::SchemaValidation
        );
        assert_eq!(
            Category::from_message("schema validation failed for apiVersion"),
            Category::SchemaValidation
        );
        assert_eq!(
            Category::from_message("unknown apiVersion apps/v1beta1"),
            Category::ApiVersion
        );
    }

    #[test]
    fn test_category_keywords_are_case_insensitive() {
        assert_eq!(
            Category::from_message("Missing property 'containers'"),
            Category::MissingRequiredFields
        );
        assert_eq!(
            Category::from_message("no-read-only-root-fs: container has no read-only root"),
            Category::Security
        );
        assert_eq!(
            Category::from_message("no-liveness-probe: container \"app\" does not have a liveness PROBE"),
            Category::HealthProbes
        );
        assert_eq!(
            Category::from_message("unset-cpu-requirements: container has cpu request 0"),
            Category::ResourceLimits
        );
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(Category::from_message("something odd happened"), Category::Other);
    }

    #[test]
    fn test_issue_is_categorized_on_creation() {
        let issue = ValidationIssue::new(
            ManifestFile::new("a.yaml"),
            Severity::Error,
            Tool::Kubeconform,
            "metadata.name: Required value",
        );
        assert_eq!(issue.category, Category::Metadata);
        assert!(issue.is_error());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }
}
