//! Human-readable report rendering

use std::fmt::Write as _;

use console::Style;

use super::{Narrative, Report, ReportSource, RiskLevel};
use crate::domain::Severity;

const RULE_WIDTH: usize = 60;
const SECTION_RULE_WIDTH: usize = 30;

/// Renders a [`Report`] as plain text
///
/// Styling is only applied when the report goes to a terminal; files always
/// get plain text.
pub struct TextFormatter {
    styled: bool,
}

impl TextFormatter {
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.styled)
    }

    fn section(&self, out: &mut String, title: &str) {
        let _ = writeln!(out, "{}", self.style(Style::new().bold()).apply_to(title));
        let _ = writeln!(out, "{}", "-".repeat(SECTION_RULE_WIDTH));
    }

    pub fn format(&self, report: &Report) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);
        let bold = self.style(Style::new().bold());

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", bold.apply_to("KUBERNETES VALIDATION REPORT"));
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        match &report.source {
            ReportSource::Repository { url, branch } => {
                let _ = writeln!(out, "Repository: {url}");
                let _ = writeln!(out, "Branch: {branch}");
            }
            ReportSource::Files { count } => {
                let _ = writeln!(out, "Local files: {count}");
            }
        }
        out.push('\n');

        self.write_summary(&mut out, report);
        self.write_categories(&mut out, report);
        self.write_top_files(&mut out, report);
        self.write_findings(&mut out, report);
        self.write_recommendations(&mut out, report);
        self.write_batch_details(&mut out, report);
        self.write_processing_notes(&mut out, report);
        self.write_narrative(&mut out, &report.narrative);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "End of Report");
        let _ = writeln!(out, "{rule}");
        out
    }

    fn write_summary(&self, out: &mut String, report: &Report) {
        let s = &report.summary;
        let risk_style = match s.risk_level {
            RiskLevel::High => Style::new().red().bold(),
            RiskLevel::Medium => Style::new().yellow().bold(),
            RiskLevel::Low => Style::new().green().bold(),
        };

        self.section(out, "VALIDATION SUMMARY");
        let _ = writeln!(out, "Total Files:     {}", s.total_files);
        let _ = writeln!(out, "Valid Files:     {}", s.valid_files);
        let _ = writeln!(out, "Invalid Files:   {}", s.invalid_files);
        let _ = writeln!(out, "Errors:          {}", s.error_count);
        let _ = writeln!(out, "Warnings:        {}", s.warning_count);
        let _ = writeln!(out, "Success Rate:    {:.1}%", s.success_rate);
        let _ = writeln!(
            out,
            "Risk Level:      {}",
            self.style(risk_style).apply_to(s.risk_level.label())
        );
        let _ = writeln!(out, "Batch Size:      {}", s.batch_size);
        let _ = writeln!(out, "Batches:         {}", s.batches_total);
        out.push('\n');
    }

    fn write_categories(&self, out: &mut String, report: &Report) {
        if report.categories.is_empty() {
            return;
        }
        self.section(out, "ERROR BREAKDOWN");
        for entry in &report.categories {
            let _ = writeln!(out, "{}: {}", entry.category, entry.count);
        }
        out.push('\n');
    }

    fn write_top_files(&self, out: &mut String, report: &Report) {
        if report.top_files.is_empty() {
            return;
        }
        self.section(out, "MOST AFFECTED FILES");
        for entry in &report.top_files {
            let _ = writeln!(out, "{:>4}  {}", entry.issues, entry.file);
        }
        out.push('\n');
    }

    fn write_findings(&self, out: &mut String, report: &Report) {
        if report.findings.is_empty() {
            return;
        }
        let error = self.style(Style::new().red());
        let warning = self.style(Style::new().yellow());

        self.section(out, "FINDINGS");
        for finding in &report.findings {
            let label = match finding.severity {
                Severity::Error => error.apply_to("ERROR  "),
                Severity::Warning => warning.apply_to("WARNING"),
            };
            let _ = writeln!(
                out,
                "{label} {} [{}] {}",
                finding.file, finding.tool, finding.message
            );
        }
        out.push('\n');
    }

    fn write_recommendations(&self, out: &mut String, report: &Report) {
        if report.recommendations.is_empty() {
            return;
        }
        self.section(out, "IMMEDIATE RECOMMENDATIONS");
        for rec in &report.recommendations {
            let _ = writeln!(out, "• {rec}");
        }
        out.push('\n');
    }

    fn write_batch_details(&self, out: &mut String, report: &Report) {
        if report.batches.is_empty() {
            return;
        }
        let total = report.batches.len();
        self.section(out, "BATCH DETAILS");
        for batch in &report.batches {
            let _ = writeln!(out, "Batch {}/{total}: {}", batch.batch, batch.files.join(", "));
            if let Some(reason) = &batch.failure {
                let _ = writeln!(out, "  Failed: {reason}");
                continue;
            }
            if batch.errors == 0 && batch.warnings == 0 {
                let _ = writeln!(out, "  No issues found in this batch");
                continue;
            }
            let _ = writeln!(out, "  Errors: {}  Warnings: {}", batch.errors, batch.warnings);
            for highlight in &batch.highlights {
                let _ = writeln!(out, "  - {}: {}", highlight.file, highlight.message);
            }
            let hidden = batch.errors + batch.warnings - batch.highlights.len();
            if hidden > 0 {
                let _ = writeln!(out, "  ... and {hidden} more");
            }
        }
        out.push('\n');
    }

    fn write_processing_notes(&self, out: &mut String, report: &Report) {
        let not_analyzed = report.summary.not_analyzed_files;
        if report.failed_batches.is_empty() && not_analyzed == 0 {
            return;
        }
        self.section(out, "PROCESSING NOTES");
        for failed in &report.failed_batches {
            let _ = writeln!(
                out,
                "- Batch {} ({} files) failed: {}",
                failed.batch, failed.files, failed.reason
            );
        }
        if not_analyzed > 0 {
            let _ = writeln!(out, "- {not_analyzed} discovered files were not analyzed (single-batch mode)");
        }
        out.push('\n');
    }

    fn write_narrative(&self, out: &mut String, narrative: &Narrative) {
        self.section(out, "DETAILED ANALYSIS");
        match narrative {
            Narrative::Available(text) => {
                let _ = writeln!(out, "{}", text.trim_end());
            }
            Narrative::Unavailable(reason) => {
                let _ = writeln!(out, "AI analysis unavailable: {reason}");
            }
            Narrative::Disabled => {
                let _ = writeln!(out, "AI analysis not configured");
            }
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{AggregateResult, BatchResult, BatchSize};
    use crate::domain::ManifestFile;
    use crate::report::tests::{sample_aggregate, sample_options};
    use chrono::{TimeZone, Utc};

    fn report() -> Report {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        Report::build_at(&sample_aggregate(), &sample_options(), at)
    }

    #[test]
    fn test_sections_in_order() {
        let text = TextFormatter::new(false).format(&report());
        let positions: Vec<usize> = [
            "KUBERNETES VALIDATION REPORT",
            "Generated: 2026-03-01 12:30:00 UTC",
            "Repository: https://github.com/acme/deploy",
            "VALIDATION SUMMARY",
            "ERROR BREAKDOWN",
            "MOST AFFECTED FILES",
            "FINDINGS",
            "IMMEDIATE RECOMMENDATIONS",
            "BATCH DETAILS",
            "DETAILED ANALYSIS",
            "End of Report",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("Success Rate:    75.0%"));
        assert!(text.contains("Health Probes: 3"));
        assert!(text.contains("Batch Size:      2"));
        assert!(!text.contains("PROCESSING NOTES"));
    }

    #[test]
    fn test_batch_details() {
        let text = TextFormatter::new(false).format(&report());
        assert!(text.contains("Batch 1/2: a.yaml, b.yaml\n  Errors: 1  Warnings: 2\n  - a.yaml: missing property 'name'\n"));
        assert!(text.contains("Batch 2/2: c.yaml, d.yaml\n"));
    }

    #[test]
    fn test_batch_details_clean_and_failed_batches() {
        let size = BatchSize::try_from(1).unwrap();
        let mut aggregate = AggregateResult::new(size);
        aggregate.absorb(BatchResult {
            index: 0,
            files: vec![ManifestFile::new("ok.yaml")],
            issues: Vec::new(),
            failure: None,
        });
        aggregate.absorb(BatchResult {
            index: 1,
            files: vec![ManifestFile::new("boom.yaml")],
            issues: Vec::new(),
            failure: Some("terminated by signal".to_string()),
        });
        let text = TextFormatter::new(false).format(&Report::build(&aggregate, &sample_options()));
        assert!(text.contains("Batch 1/2: ok.yaml\n  No issues found in this batch\n"));
        assert!(text.contains("Batch 2/2: boom.yaml\n  Failed: terminated by signal\n"));
    }

    #[test]
    fn test_unstyled_output_has_no_escape_codes() {
        let text = TextFormatter::new(false).format(&report());
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_unavailable_narrative_keeps_summary() {
        let report = report().with_narrative(Narrative::Unavailable("connection refused".to_string()));
        let text = TextFormatter::new(false).format(&report);
        assert!(text.contains("AI analysis unavailable: connection refused"));
        assert!(text.contains("Total Files:     4"));
    }

    #[test]
    fn test_narrative_included_verbatim() {
        let report = report().with_narrative(Narrative::Available("## Executive Summary\nAll good.\n".to_string()));
        let text = TextFormatter::new(false).format(&report);
        assert!(text.contains("## Executive Summary\nAll good.\n"));
    }
}
