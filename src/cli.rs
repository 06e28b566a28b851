//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_TOP_FILES, OutputFormat};

/// k8s-validate - Kubernetes manifest batch validator
///
/// Runs kubeconform and kube-linter over local files or a git repository in
/// batches and produces an aggregated report.
#[derive(Parser, Debug)]
#[command(
    name = "k8s-validate",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Batch-validate Kubernetes manifests with kubeconform and kube-linter",
    long_about = "Validates Kubernetes manifests from local files or a git repository branch \
                  with kubeconform (schema) and kube-linter (best practices), in batches, and \
                  writes an aggregated text or JSON report with an optional AI-written analysis.",
    after_help = "EXIT STATUS:\n    \
                  0  no issues found\n    \
                  1  configuration or setup error\n    \
                  2  no manifest files found\n    \
                  3  validation issues found\n\n\
                  EXAMPLES:\n    \
                  k8s-validate --files deploy/web.yaml deploy/db.yaml\n    \
                  k8s-validate --repo https://github.com/acme/deploy --branch prod\n    \
                  k8s-validate --repo git@github.com:acme/deploy.git --format json -o report.json"
)]
pub struct Cli {
    /// Validate these local files
    #[arg(long, short = 'f', num_args = 1.., value_name = "FILE", conflicts_with = "repo")]
    pub files: Vec<PathBuf>,

    /// Validate a git repository (falls back to REPO_URL)
    #[arg(long, short = 'r', value_name = "URL")]
    pub repo: Option<String>,

    /// Branch to validate in repository mode (falls back to DEFAULT_BRANCH, then main)
    #[arg(long, short = 'b', value_name = "NAME")]
    pub branch: Option<String>,

    /// Number of files per batch
    #[arg(long, value_name = "N", default_value_t = DEFAULT_BATCH_SIZE, allow_negative_numbers = true)]
    pub batch_size: i64,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format (falls back to OUTPUT_FORMAT, then text)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Validate only the first batch of files
    #[arg(long)]
    pub single_batch: bool,

    /// Number of most-affected files listed in the report
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_FILES)]
    pub top: usize,

    /// Skip the AI-written analysis even when API settings are present
    #[arg(long)]
    pub no_ai: bool,

    /// Do not show progress
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
