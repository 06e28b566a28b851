//! Prompt construction for the AI narrative
//!
//! Only aggregate statistics and a bounded sample of issue messages are sent;
//! manifest contents never leave the machine.

use std::fmt::Write as _;

use crate::report::{Report, ReportSource};

pub const SYSTEM_PROMPT: &str = "You are a Kubernetes expert analyzing validation results. \
Provide detailed insights, prioritized recommendations, and actionable advice.";

/// Maximum number of findings quoted in the prompt
const SAMPLE_FINDINGS: usize = 10;

/// Build the user message for a finished report
pub fn build(report: &Report) -> String {
    let s = &report.summary;
    let mut out = String::from(
        "Please analyze these Kubernetes validation results and provide a comprehensive report:\n\n",
    );

    if let ReportSource::Repository { url, branch } = &report.source {
        let _ = writeln!(out, "REPOSITORY: {url} (branch {branch})\n");
    }

    let _ = writeln!(out, "VALIDATION SUMMARY:");
    let _ = writeln!(out, "- Total files checked: {}", s.total_files);
    let _ = writeln!(out, "- Valid files: {}", s.valid_files);
    let _ = writeln!(out, "- Invalid files: {}", s.invalid_files);
    let _ = writeln!(out, "- Schema errors: {}", s.error_count);
    let _ = writeln!(out, "- Best practice warnings: {}", s.warning_count);
    let _ = writeln!(out, "- Success rate: {:.1}%", s.success_rate);
    out.push('\n');

    let _ = writeln!(out, "ISSUE BREAKDOWN:");
    if report.categories.is_empty() {
        let _ = writeln!(out, "- none");
    }
    for entry in &report.categories {
        let _ = writeln!(out, "- {}: {}", entry.category, entry.count);
    }
    out.push('\n');

    if !report.top_files.is_empty() {
        let _ = writeln!(out, "MOST AFFECTED FILES:");
        for entry in &report.top_files {
            let _ = writeln!(out, "- {} ({} issues)", entry.file, entry.issues);
        }
        out.push('\n');
    }

    if !report.findings.is_empty() {
        let _ = writeln!(out, "SAMPLE FINDINGS:");
        for finding in report.findings.iter().take(SAMPLE_FINDINGS) {
            let _ = writeln!(
                out,
                "- [{}] {} ({}): {}",
                finding.severity, finding.file, finding.tool, finding.message
            );
        }
        out.push('\n');
    }

    out.push_str(
        "Please provide:\n\
         1. Executive Summary (2-3 sentences)\n\
         2. Key Issues Identified (prioritized list)\n\
         3. Security Implications (if any)\n\
         4. Performance Impact Assessment\n\
         5. Specific Remediation Steps\n\
         6. Best Practices Recommendations\n\
         7. Risk Assessment (High/Medium/Low)\n\n\
         Format your response in clear sections with actionable insights.\n",
    );
    out
}
