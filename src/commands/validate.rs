//! Validate command: wires fetching, batching, reporting and the exit status

use std::fs;
use std::path::{Path, PathBuf};

use crate::ai;
use crate::batch::{BatchCoordinator, BatchSize};
use crate::cli::Cli;
use crate::config::{Config, OutputFormat};
use crate::discovery::local_manifests;
use crate::domain::ManifestFile;
use crate::error::{EXIT_ISSUES_FOUND, EXIT_SUCCESS, Result, ValidateError};
use crate::fetcher::{self, RepoCheckout, RepoSource};
use crate::git;
use crate::report::{Narrative, Report, ReportOptions, ReportSource};
use crate::ui;
use crate::validator::ValidatorInvoker;

/// What the run validates
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Files(Vec<PathBuf>),
    Repository(RepoSource),
}

impl Target {
    /// Explicit files win; otherwise --repo, then REPO_URL
    fn resolve(args: &Cli, config: &Config) -> Result<Self> {
        if !args.files.is_empty() {
            return Ok(Target::Files(args.files.clone()));
        }
        let url = args
            .repo
            .clone()
            .or_else(|| config.default_repo_url.clone())
            .ok_or(ValidateError::NoValidationTarget)?;
        let branch = args
            .branch
            .clone()
            .unwrap_or_else(|| config.default_branch.clone());
        Ok(Target::Repository(RepoSource::new(url, branch)))
    }
}

/// Files to validate plus the checkout that must outlive validation
struct Selection {
    files: Vec<ManifestFile>,
    source: ReportSource,
    _checkout: Option<RepoCheckout>,
}

fn select(target: Target) -> Result<Selection> {
    match target {
        Target::Files(paths) => {
            let files = local_manifests(&paths);
            Ok(Selection {
                source: ReportSource::Files { count: files.len() },
                files,
                _checkout: None,
            })
        }
        Target::Repository(source) => {
            let checkout = fetcher::fetch(&source)?;
            let files = checkout.manifests()?;
            tracing::info!(files = files.len(), "discovered manifest files");
            Ok(Selection {
                files,
                source: ReportSource::Repository {
                    url: git::url::display_url(&source.url).to_string(),
                    branch: source.branch,
                },
                _checkout: Some(checkout),
            })
        }
    }
}

/// Run validation and return the process exit status
pub fn run(args: &Cli, config: &Config) -> Result<i32> {
    let batch_size = BatchSize::try_from(args.batch_size)?;
    let target = Target::resolve(args, config)?;
    let selection = select(target)?;

    let invoker = ValidatorInvoker::from_settings(&config.tools);
    invoker.check_available()?;

    let mut observer = ui::observer(args.quiet);
    let aggregate = BatchCoordinator::new(&invoker, batch_size)
        .single_batch(args.single_batch)
        .run(&selection.files, observer.as_mut())?;

    let report = Report::build(
        &aggregate,
        &ReportOptions {
            source: selection.source,
            top_files: args.top,
            min_severity: config.min_severity,
        },
    );
    let narrative = if args.no_ai {
        Narrative::Disabled
    } else {
        match ai::provider(config.ai.as_ref()) {
            Ok(provider) => ai::narrative(provider.as_deref(), &report),
            Err(e) => {
                tracing::warn!(error = %e, "could not set up AI client");
                Narrative::Unavailable(e.to_string())
            }
        }
    };
    let report = report.with_narrative(narrative);

    let format = args.format.unwrap_or(config.default_output_format);
    emit(&report, format, args.output.as_deref())?;

    Ok(if aggregate.has_issues() {
        EXIT_ISSUES_FOUND
    } else {
        EXIT_SUCCESS
    })
}

/// Write the report to `output`, or to stdout when no path is given
fn emit(report: &Report, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let rendered = report.render(format, false)?;
            fs::write(path, rendered).map_err(|e| ValidateError::FileWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let styled = format == OutputFormat::Text && console::Term::stdout().is_term();
            print!("{}", report.render(format, styled)?);
        }
    }
    Ok(())
}
