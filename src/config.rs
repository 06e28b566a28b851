//! Run configuration
//!
//! All environment-sourced settings are read once at startup into [`Config`],
//! which is then passed by reference to every component. Nothing else in the
//! crate reads the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Severity;
use crate::error::{Result, ValidateError};

/// Default number of files per batch
pub const DEFAULT_BATCH_SIZE: i64 = 10;
/// Default branch when neither --branch nor DEFAULT_BRANCH is set
pub const DEFAULT_BRANCH: &str = "main";
/// Default number of files in the "most affected" ranking
pub const DEFAULT_TOP_FILES: usize = 10;

const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Report rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ValidateError::InvalidConfigValue {
                key: "OUTPUT_FORMAT".to_string(),
                value: s.to_string(),
                expected: "Use 'text' or 'json'".to_string(),
            }),
        }
    }
}

/// Connection settings for the AI narrative service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Paths and options for the external validators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub kubeconform_bin: PathBuf,
    pub kube_linter_bin: PathBuf,
    pub schema_location: Option<String>,
    pub kube_linter_config: Option<PathBuf>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            kubeconform_bin: PathBuf::from("kubeconform"),
            kube_linter_bin: PathBuf::from("kube-linter"),
            schema_location: None,
            kube_linter_config: None,
        }
    }
}

/// Configuration value object constructed once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` when any of API_KEY, API_URL or MODEL_NAME is missing
    pub ai: Option<AiSettings>,
    pub tools: ToolSettings,
    pub default_repo_url: Option<String>,
    pub default_branch: String,
    pub default_output_format: OutputFormat,
    /// Findings below this severity are left out of the findings listing
    pub min_severity: Severity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: None,
            tools: ToolSettings::default(),
            default_repo_url: None,
            default_branch: DEFAULT_BRANCH.to_string(),
            default_output_format: OutputFormat::Text,
            min_severity: Severity::Warning,
        }
    }
}

impl Config {
    /// Build configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first; values already
    /// present in the environment win.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai = match (get("API_KEY"), get("API_URL"), get("MODEL_NAME")) {
            (Some(api_key), Some(api_url), Some(model)) => Some(AiSettings {
                api_key,
                api_url,
                model,
                timeout: parse_timeout(get("AI_TIMEOUT_SECS"))?,
            }),
            _ => None,
        };

        let defaults = ToolSettings::default();
        let tools = ToolSettings {
            kubeconform_bin: get("KUBECONFORM_BIN").map_or(defaults.kubeconform_bin, PathBuf::from),
            kube_linter_bin: get("KUBE_LINTER_BIN").map_or(defaults.kube_linter_bin, PathBuf::from),
            schema_location: get("KUBECONFORM_SCHEMA_LOCATION"),
            kube_linter_config: get("KUBE_LINTER_CONFIG").map(PathBuf::from),
        };

        let default_output_format = get("OUTPUT_FORMAT")
            .map(|v| v.parse::<OutputFormat>())
            .transpose()?
            .unwrap_or_default();

        let min_severity = get("REPORT_SEVERITY_LEVEL")
            .map(|v| parse_severity(&v))
            .transpose()?
            .unwrap_or(Severity::Warning);

        Ok(Self {
            ai,
            tools,
            default_repo_url: get("REPO_URL"),
            default_branch: get("DEFAULT_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            default_output_format,
            min_severity,
        })
    }
}

fn parse_timeout(raw: Option<String>) -> Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS));
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ValidateError::InvalidConfigValue {
            key: "AI_TIMEOUT_SECS".to_string(),
            value: raw,
            expected: "Use a positive number of seconds".to_string(),
        }),
    }
}

fn parse_severity(raw: &str) -> Result<Severity> {
    match raw.trim().to_lowercase().as_str() {
        "warning" | "warn" | "info" | "low" => Ok(Severity::Warning),
        "error" | "high" => Ok(Severity::Error),
        _ => Err(ValidateError::InvalidConfigValue {
            key: "REPORT_SEVERITY_LEVEL".to_string(),
            value: raw.to_string(),
            expected: "Use 'error' or 'warning'".to_string(),
        }),
    }
}
