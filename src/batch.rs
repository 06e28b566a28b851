//! Batch coordination
//!
//! The coordinator splits the file list into fixed-size, order-preserving
//! batches, runs the validators once per batch and folds every
//! [`BatchResult`] into a single [`AggregateResult`]. Progress goes to a
//! [`BatchObserver`]; it is never part of the returned value.

use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;

use serde::Serialize;

use crate::domain::{Category, ManifestFile, Severity, Tool, ValidationIssue};
use crate::error::{Result, ValidateError};
use crate::validator::ValidatorInvoker;

/// Issues kept per batch for the batch details
const BATCH_HIGHLIGHTS: usize = 3;

/// Number of files per batch, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Number of batches needed for `files` files
    pub fn batch_count(self, files: usize) -> usize {
        files.div_ceil(self.get())
    }
}

impl TryFrom<i64> for BatchSize {
    type Error = ValidateError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(BatchSize)
            .ok_or(ValidateError::InvalidBatchSize { value })
    }
}

/// Pass/fail state of one file after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Passed,
    Failed,
}

/// Outcome of validating one batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Zero-based position of the batch
    pub index: usize,
    pub files: Vec<ManifestFile>,
    pub issues: Vec<ValidationIssue>,
    /// Set when the validators could not complete for this batch
    pub failure: Option<String>,
}

impl BatchResult {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    /// Per-file status; a file fails iff it has an error-severity issue
    pub fn file_statuses(&self) -> Vec<(&ManifestFile, FileStatus)> {
        let failed: HashSet<&ManifestFile> = self
            .issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| &i.file)
            .collect();
        self.files
            .iter()
            .map(|f| {
                let status = if failed.contains(f) {
                    FileStatus::Failed
                } else {
                    FileStatus::Passed
                };
                (f, status)
            })
            .collect()
    }
}

/// A batch whose validator run could not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBatch {
    /// One-based batch number, as shown to users
    pub batch: usize,
    pub files: usize,
    pub reason: String,
}

/// One issue quoted in a batch summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchHighlight {
    pub file: String,
    pub severity: Severity,
    pub message: String,
}

/// Per-batch outcome, kept in batch order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// One-based batch number
    pub batch: usize,
    pub files: Vec<String>,
    pub errors: usize,
    pub warnings: usize,
    /// First issues of the batch, in validator order
    pub highlights: Vec<BatchHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BatchSummary {
    fn of(batch: &BatchResult) -> Self {
        Self {
            batch: batch.index + 1,
            files: batch.files.iter().map(|f| f.display_path().to_string()).collect(),
            errors: batch.error_count(),
            warnings: batch.warning_count(),
            highlights: batch
                .issues
                .iter()
                .take(BATCH_HIGHLIGHTS)
                .map(|i| BatchHighlight {
                    file: i.file.display_path().to_string(),
                    severity: i.severity,
                    message: i.message.clone(),
                })
                .collect(),
            failure: batch.failure.clone(),
        }
    }
}

/// Run-wide accumulation of every batch result
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    batch_size: usize,
    total_files: usize,
    invalid: HashSet<ManifestFile>,
    issues: Vec<ValidationIssue>,
    categories: BTreeMap<Category, usize>,
    batches_total: usize,
    failed_batches: Vec<FailedBatch>,
    batches: Vec<BatchSummary>,
    not_analyzed: usize,
}

impl AggregateResult {
    pub fn new(size: BatchSize) -> Self {
        Self {
            batch_size: size.get(),
            ..Self::default()
        }
    }

    /// Fold a completed batch into the running totals
    pub fn absorb(&mut self, batch: BatchResult) {
        self.batches_total += 1;
        self.batches.push(BatchSummary::of(&batch));
        self.total_files += batch.files.len();
        if let Some(reason) = batch.failure {
            self.failed_batches.push(FailedBatch {
                batch: batch.index + 1,
                files: batch.files.len(),
                reason,
            });
        }
        for issue in batch.issues {
            *self.categories.entry(issue.category).or_default() += 1;
            if issue.is_error() {
                self.invalid.insert(issue.file.clone());
            }
            self.issues.push(issue);
        }
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn invalid_files(&self) -> usize {
        self.invalid.len()
    }

    pub fn valid_files(&self) -> usize {
        self.total_files.saturating_sub(self.invalid.len())
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count_severity(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_severity(Severity::Warning)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn category_counts(&self) -> &BTreeMap<Category, usize> {
        &self.categories
    }

    /// Valid files over total files, 0.0 when nothing was validated
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.valid_files() as f64 / self.total_files as f64;
        rate
    }

    pub fn batches_total(&self) -> usize {
        self.batches_total
    }

    pub fn failed_batches(&self) -> &[FailedBatch] {
        &self.failed_batches
    }

    pub fn batches(&self) -> &[BatchSummary] {
        &self.batches
    }

    /// Configured files per batch, 0 when no coordinator produced this aggregate
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Discovered files left out by single-batch mode
    pub fn not_analyzed(&self) -> usize {
        self.not_analyzed
    }
}

/// Progress snapshot sent after each batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress<'a> {
    /// One-based batch number
    pub batch: usize,
    pub total_batches: usize,
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub failure: Option<&'a str>,
}

/// Receives progress notifications while batches run
pub trait BatchObserver {
    fn on_start(&mut self, total_batches: usize, total_files: usize);

    fn on_batch_complete(&mut self, progress: &BatchProgress<'_>);

    fn on_finish(&mut self, aggregate: &AggregateResult);
}

/// Splits files into batches and validates them in sequence
pub struct BatchCoordinator<'a> {
    invoker: &'a ValidatorInvoker,
    size: BatchSize,
    single_batch: bool,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(invoker: &'a ValidatorInvoker, size: BatchSize) -> Self {
        Self {
            invoker,
            size,
            single_batch: false,
        }
    }

    /// Validate only the first batch and count the rest as not analyzed
    #[must_use]
    pub fn single_batch(mut self, enabled: bool) -> Self {
        self.single_batch = enabled;
        self
    }

    /// Validate every batch, folding results as each one completes
    ///
    /// A batch whose validators fail to run is recorded against all of its
    /// files and processing continues. An unavailable validator aborts the run.
    pub fn run(&self, files: &[ManifestFile], observer: &mut dyn BatchObserver) -> Result<AggregateResult> {
        let selected = if self.single_batch {
            &files[..files.len().min(self.size.get())]
        } else {
            files
        };
        let total_batches = self.size.batch_count(selected.len());

        let mut aggregate = AggregateResult {
            not_analyzed: files.len() - selected.len(),
            ..AggregateResult::new(self.size)
        };
        tracing::info!(
            files = selected.len(),
            batches = total_batches,
            batch_size = self.size.get(),
            "starting validation"
        );
        observer.on_start(total_batches, selected.len());

        for (index, chunk) in selected.chunks(self.size.get()).enumerate() {
            let result = self.run_batch(index, chunk)?;
            for (file, status) in result.file_statuses() {
                tracing::debug!(file = file.display_path(), ?status, "file validated");
            }
            observer.on_batch_complete(&BatchProgress {
                batch: index + 1,
                total_batches,
                files: chunk.len(),
                errors: result.error_count(),
                warnings: result.warning_count(),
                failure: result.failure.as_deref(),
            });
            aggregate.absorb(result);
        }

        observer.on_finish(&aggregate);
        Ok(aggregate)
    }

    fn run_batch(&self, index: usize, chunk: &[ManifestFile]) -> Result<BatchResult> {
        let files = chunk.to_vec();
        match self.invoker.invoke(chunk) {
            Ok(issues) => Ok(BatchResult {
                index,
                files,
                issues,
                failure: None,
            }),
            Err(err @ ValidateError::ToolUnavailable { .. }) => Err(err),
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(batch = index + 1, %reason, "batch failed");
                let tool = match err {
                    ValidateError::ToolInvocationFailed { tool, .. } => tool,
                    _ => Tool::Kubeconform,
                };
                let issues = files
                    .iter()
                    .map(|f| {
                        ValidationIssue::new(
                            f.clone(),
                            Severity::Error,
                            tool,
                            format!("batch {} failed: {reason}", index + 1),
                        )
                    })
                    .collect();
                Ok(BatchResult {
                    index,
                    files,
                    issues,
                    failure: Some(reason),
                })
            }
        }
    }
}
