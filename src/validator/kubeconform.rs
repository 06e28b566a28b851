//! kubeconform schema validation

use std::path::PathBuf;

use serde::Deserialize;

use super::process::{check_version, run_tool};
use super::{BatchFiles, Validator, parse_error, unparseable_output};
use crate::config::ToolSettings;
use crate::domain::{ManifestFile, Severity, Tool, ValidationIssue};
use crate::error::Result;

const STATUS_INVALID: &str = "statusInvalid";
const STATUS_ERROR: &str = "statusError";

#[derive(Debug, Deserialize)]
struct KubeconformOutput {
    #[serde(default)]
    resources: Vec<ResourceResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceResult {
    filename: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    validation_errors: Vec<SchemaError>,
}

#[derive(Debug, Deserialize)]
struct SchemaError {
    #[serde(default)]
    path: String,
    #[serde(default)]
    msg: String,
}

/// Schema validation through the `kubeconform` binary
#[derive(Debug, Clone)]
pub struct Kubeconform {
    bin: PathBuf,
    schema_location: Option<String>,
}

impl Kubeconform {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            bin: settings.kubeconform_bin.clone(),
            schema_location: settings.schema_location.clone(),
        }
    }

    fn args(&self, files: &[&ManifestFile]) -> Vec<String> {
        let mut args = vec![
            "-output".to_string(),
            "json".to_string(),
            "-summary=false".to_string(),
        ];
        if let Some(location) = &self.schema_location {
            // keep the default registry as fallback for core resources
            args.extend([
                "-schema-location".to_string(),
                "default".to_string(),
                "-schema-location".to_string(),
                location.clone(),
            ]);
        }
        args.extend(files.iter().map(|f| f.path().to_string_lossy().into_owned()));
        args
    }
}

fn resource_issues(resource: ResourceResult, files: &BatchFiles<'_>) -> Vec<ValidationIssue> {
    let severity = match resource.status.as_str() {
        STATUS_INVALID | STATUS_ERROR => Severity::Error,
        _ => return Vec::new(),
    };
    let file = files.resolve(&resource.filename);

    if resource.validation_errors.is_empty() {
        let message = if resource.msg.is_empty() {
            format!("{} reported {}", Tool::Kubeconform, resource.status)
        } else {
            resource.msg
        };
        return vec![ValidationIssue::new(file, severity, Tool::Kubeconform, message)];
    }

    resource
        .validation_errors
        .into_iter()
        .map(|e| {
            let message = if e.path.is_empty() {
                e.msg
            } else {
                format!("{}: {}", e.path, e.msg)
            };
            ValidationIssue::new(file.clone(), severity, Tool::Kubeconform, message)
        })
        .collect()
}

/// Parse kubeconform JSON output into issues
pub(super) fn parse_output(stdout: &str, files: &BatchFiles<'_>) -> Result<Vec<ValidationIssue>> {
    let output: KubeconformOutput =
        serde_json::from_str(stdout).map_err(|e| parse_error(Tool::Kubeconform, e.to_string()))?;
    Ok(output
        .resources
        .into_iter()
        .flat_map(|r| resource_issues(r, files))
        .collect())
}

impl Validator for Kubeconform {
    fn tool(&self) -> Tool {
        Tool::Kubeconform
    }

    fn check_available(&self) -> Result<()> {
        check_version(Tool::Kubeconform, &self.bin, ["-v"])
    }

    fn validate(&self, files: &[&ManifestFile]) -> Result<Vec<ValidationIssue>> {
        let batch = BatchFiles::new(files);
        let output = run_tool(Tool::Kubeconform, &self.bin, self.args(files))?;

        if output.stdout.trim().is_empty() {
            if output.success() {
                return Ok(Vec::new());
            }
            let err = parse_error(Tool::Kubeconform, output.stderr_summary());
            return Ok(unparseable_output(Tool::Kubeconform, files, &err));
        }
        match parse_output(&output.stdout, &batch) {
            Ok(issues) => Ok(issues),
            Err(err) => Ok(unparseable_output(Tool::Kubeconform, files, &err)),
        }
    }
}
