//! UI/Progress presentation layer
//!
//! This module handles:
//! - Batch progress bars using indicatif
//! - Silent progress for quiet mode and tests
//!
//! All progress reporting goes through the [`BatchObserver`] trait, so the
//! coordinator never knows whether anything is drawn.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::batch::{AggregateResult, BatchObserver, BatchProgress};

/// Interactive progress reporter drawing one bar over all batches
///
/// The bar is drawn to stderr so a report written to stdout stays clean.
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchObserver for ConsoleProgress {
    fn on_start(&mut self, total_batches: usize, total_files: usize) {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::with_draw_target(Some(total_batches as u64), ProgressDrawTarget::stderr());
        bar.set_style(style);
        bar.set_message(format!("({total_files} files)"));
        self.bar = Some(bar);
    }

    fn on_batch_complete(&mut self, progress: &BatchProgress<'_>) {
        let Some(bar) = &self.bar else {
            return;
        };
        let msg = match progress.failure {
            Some(_) => format!("batch {}/{} failed", progress.batch, progress.total_batches),
            None => format!(
                "batch {}/{}: {} files, {} errors, {} warnings",
                progress.batch, progress.total_batches, progress.files, progress.errors, progress.warnings
            ),
        };
        bar.set_message(msg);
        bar.inc(1);
    }

    fn on_finish(&mut self, aggregate: &AggregateResult) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(format!(
                "{} files, {} errors, {} warnings",
                aggregate.total_files(),
                aggregate.error_count(),
                aggregate.warning_count()
            ));
        }
    }
}

/// Silent progress reporter for quiet mode
///
/// No-op implementation that does not display anything.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl BatchObserver for SilentProgress {
    fn on_start(&mut self, _total_batches: usize, _total_files: usize) {
        // No-op for silent mode
    }

    fn on_batch_complete(&mut self, _progress: &BatchProgress<'_>) {
        // No-op for silent mode
    }

    fn on_finish(&mut self, _aggregate: &AggregateResult) {
        // No-op for silent mode
    }
}

/// Pick the observer for the current run
pub fn observer(quiet: bool) -> Box<dyn BatchObserver> {
    if shows_progress(quiet, console::Term::stderr().is_term()) {
        Box::new(ConsoleProgress::new())
    } else {
        Box::new(SilentProgress)
    }
}

/// A bar is drawn only for interactive, non-quiet runs
fn shows_progress(quiet: bool, interactive: bool) -> bool {
    !quiet && interactive
}
