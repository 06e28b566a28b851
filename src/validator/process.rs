//! Blocking subprocess execution for validator binaries

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::domain::Tool;
use crate::error::{Result, ValidateError};

/// Captured result of one tool process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First non-empty stderr line, for error messages
    pub fn stderr_summary(&self) -> &str {
        self.stderr
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
    }
}

/// Environment variable that overrides a tool's binary path
pub fn bin_env_var(tool: Tool) -> &'static str {
    match tool {
        Tool::Kubeconform => "KUBECONFORM_BIN",
        Tool::KubeLinter => "KUBE_LINTER_BIN",
    }
}

/// Run `program` with `args` and wait for it to exit
///
/// A binary that is missing or not executable is [`ValidateError::ToolUnavailable`];
/// any other failure to run the process to completion (including termination
/// by a signal) is [`ValidateError::ToolInvocationFailed`].
pub fn run_tool<I, S>(tool: Tool, program: &Path, args: I) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program).args(args).output().map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => ValidateError::ToolUnavailable {
            tool: tool.to_string(),
            env_var: bin_env_var(tool).to_string(),
            reason: format!("{}: {e}", program.display()),
        },
        _ => ValidateError::ToolInvocationFailed {
            tool,
            reason: e.to_string(),
        },
    })?;

    let Some(exit_code) = output.status.code() else {
        return Err(ValidateError::ToolInvocationFailed {
            tool,
            reason: format!("terminated without exit code ({})", output.status),
        });
    };

    tracing::debug!(%tool, exit_code, stdout_bytes = output.stdout.len(), "tool exited");
    Ok(ToolOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Probe a tool with a version command before any batch runs
pub fn check_version<I, S>(tool: Tool, program: &Path, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_tool(tool, program, args)?;
    if !output.success() {
        return Err(ValidateError::ToolUnavailable {
            tool: tool.to_string(),
            env_var: bin_env_var(tool).to_string(),
            reason: format!(
                "version check exited with status {}: {}",
                output.exit_code,
                output.stderr_summary()
            ),
        });
    }
    tracing::debug!(%tool, version = output.stdout.trim(), "validator available");
    Ok(())
}
