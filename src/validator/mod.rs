//! External validator invocation
//!
//! This module handles:
//! - The [`Validator`] capability implemented by each external tool
//! - Running every configured validator over one batch of files
//! - Degrading unparseable tool output into "unknown issue" entries
//!
//! Validators only see files that exist; missing files are reported as
//! issues up front instead of being passed to the tools.

use std::collections::HashMap;
use std::path::Path;

use crate::config::ToolSettings;
use crate::domain::{ManifestFile, Severity, Tool, ValidationIssue};
use crate::error::{Result, ValidateError};

pub mod kube_linter;
pub mod kubeconform;
pub mod process;

pub use kube_linter::KubeLinter;
pub use kubeconform::Kubeconform;

/// An external validation tool
pub trait Validator {
    /// Tool that findings are attributed to
    fn tool(&self) -> Tool;

    /// Fail with [`crate::error::ValidateError::ToolUnavailable`] when the tool cannot run
    fn check_available(&self) -> Result<()>;

    /// Validate files, returning every finding
    ///
    /// Findings (including a non-zero tool exit) are `Ok`; `Err` means the
    /// tool could not be run at all.
    fn validate(&self, files: &[&ManifestFile]) -> Result<Vec<ValidationIssue>>;
}

/// Maps paths printed by a tool back to the batch's manifest files
pub(crate) struct BatchFiles<'a> {
    by_path: HashMap<&'a Path, &'a ManifestFile>,
}

impl<'a> BatchFiles<'a> {
    pub(crate) fn new(files: &'a [&'a ManifestFile]) -> Self {
        Self {
            by_path: files.iter().map(|f| (f.path(), *f)).collect(),
        }
    }

    /// The batch file a tool-reported path refers to
    pub(crate) fn resolve(&self, reported: &str) -> ManifestFile {
        self.by_path
            .get(Path::new(reported))
            .map_or_else(|| ManifestFile::new(reported), |f| (*f).clone())
    }
}

/// One error-severity "unknown issue" per file for output that could not be parsed
pub(crate) fn unparseable_output(tool: Tool, files: &[&ManifestFile], err: &ValidateError) -> Vec<ValidationIssue> {
    tracing::warn!(%tool, error = %err, files = files.len(), "unparseable tool output");
    files
        .iter()
        .map(|f| ValidationIssue::new((*f).clone(), Severity::Error, tool, format!("unknown issue: {err}")))
        .collect()
}

/// Wrap a parse failure of `tool` output
pub(crate) fn parse_error(tool: Tool, reason: impl Into<String>) -> ValidateError {
    ValidateError::ToolOutputParse {
        tool: tool.to_string(),
        reason: reason.into(),
    }
}

/// Runs every validator over a batch of files
pub struct ValidatorInvoker {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorInvoker {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self { validators }
    }

    /// kubeconform followed by kube-linter
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self::new(vec![
            Box::new(Kubeconform::new(settings)),
            Box::new(KubeLinter::new(settings)),
        ])
    }

    /// Probe every validator; the first unavailable one is returned as the error
    pub fn check_available(&self) -> Result<()> {
        self.validators.iter().try_for_each(|v| v.check_available())
    }

    /// Validate one batch with every tool, in order
    pub fn invoke(&self, files: &[ManifestFile]) -> Result<Vec<ValidationIssue>> {
        let (present, missing): (Vec<&ManifestFile>, Vec<&ManifestFile>) =
            files.iter().partition(|f| f.path().is_file());

        let mut issues: Vec<ValidationIssue> = missing
            .into_iter()
            .map(|f| {
                ValidationIssue::new(
                    f.clone(),
                    Severity::Error,
                    self.validators.first().map_or(Tool::Kubeconform, |v| v.tool()),
                    "File not found",
                )
            })
            .collect();

        if present.is_empty() {
            return Ok(issues);
        }
        for validator in &self.validators {
            let found = validator.validate(&present)?;
            tracing::debug!(tool = %validator.tool(), issues = found.len(), "validator finished");
            issues.extend(found);
        }
        Ok(issues)
    }
}
