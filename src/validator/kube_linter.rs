//! kube-linter best-practices checks

use std::path::PathBuf;

use serde::Deserialize;

use super::process::{check_version, run_tool};
use super::{BatchFiles, Validator, parse_error, unparseable_output};
use crate::config::ToolSettings;
use crate::domain::{ManifestFile, Severity, Tool, ValidationIssue};
use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LintOutput {
    #[serde(default)]
    reports: Option<Vec<LintReport>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LintReport {
    #[serde(default)]
    check: String,
    #[serde(default)]
    diagnostic: Diagnostic,
    #[serde(default)]
    object: LintObject,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Diagnostic {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LintObject {
    #[serde(default)]
    metadata: ObjectMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ObjectMetadata {
    #[serde(default)]
    file_path: String,
}

/// Best-practice linting through the `kube-linter` binary
#[derive(Debug, Clone)]
pub struct KubeLinter {
    bin: PathBuf,
    config: Option<PathBuf>,
}

impl KubeLinter {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            bin: settings.kube_linter_bin.clone(),
            config: settings.kube_linter_config.clone(),
        }
    }

    fn args(&self, files: &[&ManifestFile]) -> Vec<String> {
        let mut args = vec!["lint".to_string(), "--format".to_string(), "json".to_string()];
        if let Some(config) = &self.config {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
        args.extend(files.iter().map(|f| f.path().to_string_lossy().into_owned()));
        args
    }
}

/// Parse kube-linter JSON output into warnings
pub(super) fn parse_output(stdout: &str, files: &BatchFiles<'_>) -> Result<Vec<ValidationIssue>> {
    let output: LintOutput = serde_json::from_str(stdout).map_err(|e| parse_error(Tool::KubeLinter, e.to_string()))?;
    Ok(output
        .reports
        .unwrap_or_default()
        .into_iter()
        .map(|report| {
            let message = if report.check.is_empty() {
                report.diagnostic.message
            } else {
                format!("{}: {}", report.check, report.diagnostic.message)
            };
            ValidationIssue::new(
                files.resolve(&report.object.metadata.file_path),
                Severity::Warning,
                Tool::KubeLinter,
                message,
            )
        })
        .collect())
}

impl Validator for KubeLinter {
    fn tool(&self) -> Tool {
        Tool::KubeLinter
    }

    fn check_available(&self) -> Result<()> {
        check_version(Tool::KubeLinter, &self.bin, ["version"])
    }

    fn validate(&self, files: &[&ManifestFile]) -> Result<Vec<ValidationIssue>> {
        let batch = BatchFiles::new(files);
        let output = run_tool(Tool::KubeLinter, &self.bin, self.args(files))?;

        if output.stdout.trim().is_empty() {
            if output.success() {
                return Ok(Vec::new());
            }
            let err = parse_error(Tool::KubeLinter, output.stderr_summary());
            return Ok(unparseable_output(Tool::KubeLinter, files, &err));
        }
        match parse_output(&output.stdout, &batch) {
            Ok(issues) => Ok(issues),
            Err(err) => Ok(unparseable_output(Tool::KubeLinter, files, &err)),
        }
    }
}
