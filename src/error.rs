//! Error types and handling for k8s-validate
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors fall into two groups:
//! - fatal errors that abort the run before (or instead of) producing a report,
//!   see [`ValidateError::exit_code`]
//! - degraded conditions (unparseable tool output, a failed batch, an AI outage)
//!   that are captured into the report instead of being raised

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::Tool;

/// Exit status for a clean run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for configuration and setup failures
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when no manifest files were found
pub const EXIT_NO_FILES: i32 = 2;
/// Exit status when validation issues were found
pub const EXIT_ISSUES_FOUND: i32 = 3;

/// Main error type for k8s-validate operations
#[derive(Error, Diagnostic, Debug)]
pub enum ValidateError {
    // Configuration errors
    #[error("Invalid batch size: {value}")]
    #[diagnostic(
        code(k8s_validate::config::batch_size),
        help("Batch size must be a positive integer, e.g. --batch-size 10")
    )]
    InvalidBatchSize { value: i64 },

    #[error("Invalid value for {key}: '{value}'")]
    #[diagnostic(code(k8s_validate::config::invalid_value), help("{expected}"))]
    InvalidConfigValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Nothing to validate")]
    #[diagnostic(
        code(k8s_validate::config::no_target),
        help("Pass --files <FILE>..., pass --repo <URL>, or set REPO_URL in the environment")
    )]
    NoValidationTarget,

    // Fetch errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(k8s_validate::fetch::clone_failed),
        help("Check that the URL is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Branch '{branch}' not found in {url}")]
    #[diagnostic(
        code(k8s_validate::fetch::branch_not_found),
        help("Pass an existing branch with --branch")
    )]
    BranchNotFound { url: String, branch: String },

    #[error("No Kubernetes manifest files found in {location}")]
    #[diagnostic(code(k8s_validate::fetch::no_files))]
    NoManifestFiles { location: String },

    // Tool errors
    #[error("Validator '{tool}' is not available: {reason}")]
    #[diagnostic(
        code(k8s_validate::tool::unavailable),
        help("Install the tool or point {env_var} at the binary")
    )]
    ToolUnavailable {
        tool: String,
        env_var: String,
        reason: String,
    },

    #[error("Validator '{tool}' run failed: {reason}")]
    #[diagnostic(code(k8s_validate::tool::invocation_failed))]
    ToolInvocationFailed { tool: Tool, reason: String },

    #[error("Could not parse {tool} output: {reason}")]
    #[diagnostic(code(k8s_validate::tool::parse_failed))]
    ToolOutputParse { tool: String, reason: String },

    // AI service errors
    #[error("AI service request failed: {reason}")]
    #[diagnostic(code(k8s_validate::ai::request_failed))]
    AiServiceFailed { reason: String },

    // File system errors
    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(k8s_validate::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(k8s_validate::fs::io_error))]
    IoError { message: String },
}

impl ValidateError {
    /// Process exit status for a fatal error
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::NoManifestFiles { .. } => EXIT_NO_FILES,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<std::io::Error> for ValidateError {
    fn from(err: std::io::Error) -> Self {
        ValidateError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ValidateError {
    fn from(err: serde_json::Error) -> Self {
        ValidateError::IoError {
            message: format!("JSON serialization failed: {err}"),
        }
    }
}

impl From<reqwest::Error> for ValidateError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else if let Some(status) = err.status() {
            format!("HTTP {status}")
        } else {
            err.to_string()
        };
        ValidateError::AiServiceFailed { reason }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ValidateError>;
