//! Report generation
//!
//! This module handles:
//! - Deriving the statistical view of a run from an [`AggregateResult`]
//! - Category ranking, most-affected files, recommendations and risk level
//! - Rendering that view as text or JSON
//!
//! A [`Report`] is fully computed when it is built (including its timestamp),
//! so rendering the same report twice yields identical output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::{AggregateResult, BatchSummary, FailedBatch};
use crate::config::OutputFormat;
use crate::domain::{Category, Severity, Tool};
use crate::error::Result;

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Total issue count above which risk is high
const HIGH_RISK_ISSUES: usize = 20;
/// Total issue count above which risk is medium
const MEDIUM_RISK_ISSUES: usize = 5;
/// Total issue count above which pre-commit validation is recommended
const PRE_COMMIT_ISSUES: usize = 10;

/// What was validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReportSource {
    Files { count: usize },
    Repository { url: String, branch: String },
}

/// Overall risk derived from the total issue count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_issue_count(issues: usize) -> Self {
        if issues > HIGH_RISK_ISSUES {
            RiskLevel::High
        } else if issues > MEDIUM_RISK_ISSUES {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

/// AI narrative state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    /// Narrative text returned by the AI service, included verbatim
    Available(String),
    /// The AI service failed; the reason is shown in place of the narrative
    Unavailable(String),
    /// No AI service configured, or `--no-ai`
    Disabled,
}

impl Narrative {
    pub fn status(&self) -> &'static str {
        match self {
            Narrative::Available(_) => "available",
            Narrative::Unavailable(_) => "unavailable",
            Narrative::Disabled => "disabled",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Narrative::Available(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Headline counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_count: usize,
    pub warning_count: usize,
    /// Percentage of valid files, one decimal place
    pub success_rate: f64,
    pub risk_level: RiskLevel,
    pub batch_size: usize,
    pub batches_total: usize,
    pub batches_failed: usize,
    pub not_analyzed_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssueCount {
    pub file: String,
    pub issues: usize,
}

/// One issue as listed in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub file: String,
    pub severity: Severity,
    pub category: Category,
    pub tool: Tool,
    pub message: String,
}

/// Inputs to report building besides the aggregate
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub source: ReportSource,
    /// Number of most-affected files to list
    pub top_files: usize,
    /// Findings below this severity are not listed
    pub min_severity: Severity,
}

/// Read-only view over a finished run
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: ReportSource,
    pub summary: Summary,
    pub categories: Vec<CategoryCount>,
    pub top_files: Vec<FileIssueCount>,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
    pub batches: Vec<BatchSummary>,
    pub failed_batches: Vec<FailedBatch>,
    pub narrative: Narrative,
}

impl Report {
    /// Compute every report section from the aggregate
    pub fn build(aggregate: &AggregateResult, options: &ReportOptions) -> Self {
        Self::build_at(aggregate, options, Utc::now())
    }

    pub fn build_at(aggregate: &AggregateResult, options: &ReportOptions, generated_at: DateTime<Utc>) -> Self {
        let categories = rank_categories(aggregate);
        let total_issues = aggregate.issues().len();

        let summary = Summary {
            total_files: aggregate.total_files(),
            valid_files: aggregate.valid_files(),
            invalid_files: aggregate.invalid_files(),
            error_count: aggregate.error_count(),
            warning_count: aggregate.warning_count(),
            success_rate: (aggregate.success_rate() * 1000.0).round() / 10.0,
            risk_level: RiskLevel::from_issue_count(total_issues),
            batch_size: aggregate.batch_size(),
            batches_total: aggregate.batches_total(),
            batches_failed: aggregate.failed_batches().len(),
            not_analyzed_files: aggregate.not_analyzed(),
        };

        let findings = aggregate
            .issues()
            .iter()
            .filter(|i| i.severity >= options.min_severity)
            .map(|i| Finding {
                file: i.file.display_path().to_string(),
                severity: i.severity,
                category: i.category,
                tool: i.tool,
                message: i.message.clone(),
            })
            .collect();

        Self {
            generated_at,
            source: options.source.clone(),
            recommendations: recommendations(&categories, total_issues),
            top_files: most_affected_files(aggregate, options.top_files),
            categories,
            summary,
            findings,
            batches: aggregate.batches().to_vec(),
            failed_batches: aggregate.failed_batches().to_vec(),
            narrative: Narrative::Disabled,
        }
    }

    #[must_use]
    pub fn with_narrative(mut self, narrative: Narrative) -> Self {
        self.narrative = narrative;
        self
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat, styled: bool) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(TextFormatter::new(styled).format(self)),
            OutputFormat::Json => JsonFormatter.format(self),
        }
    }
}

/// Category table: count descending, then name ascending
fn rank_categories(aggregate: &AggregateResult) -> Vec<CategoryCount> {
    let mut categories: Vec<CategoryCount> = aggregate
        .category_counts()
        .iter()
        .map(|(category, count)| CategoryCount {
            category: *category,
            count: *count,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.label().cmp(b.category.label()))
    });
    categories
}

/// Files with the most issues: count descending, then path ascending
fn most_affected_files(aggregate: &AggregateResult, limit: usize) -> Vec<FileIssueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for issue in aggregate.issues() {
        *counts.entry(issue.file.display_path()).or_default() += 1;
    }
    let mut files: Vec<FileIssueCount> = counts
        .into_iter()
        .map(|(file, issues)| FileIssueCount {
            file: file.to_string(),
            issues,
        })
        .collect();
    files.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.file.cmp(&b.file)));
    files.truncate(limit);
    files
}

const CATEGORY_RECOMMENDATIONS: &[(Category, &str)] = &[
    (
        Category::ApiVersion,
        "Update API versions to current Kubernetes standards",
    ),
    (
        Category::MissingRequiredFields,
        "Add missing required fields in resource definitions",
    ),
    (
        Category::SchemaValidation,
        "Review and fix schema validation errors",
    ),
    (Category::FormatSyntax, "Fix YAML format and syntax issues"),
    (
        Category::Security,
        "Harden pod and container security contexts (non-root, read-only root filesystem, dropped capabilities)",
    ),
    (
        Category::HealthProbes,
        "Add liveness and readiness probes to long-running containers",
    ),
    (
        Category::ResourceLimits,
        "Set CPU and memory requests and limits for every container",
    ),
];

fn recommendations(categories: &[CategoryCount], total_issues: usize) -> Vec<String> {
    let mut out: Vec<String> = CATEGORY_RECOMMENDATIONS
        .iter()
        .filter(|(category, _)| categories.iter().any(|c| c.category == *category))
        .map(|(_, text)| (*text).to_string())
        .collect();
    if total_issues > PRE_COMMIT_ISSUES {
        out.push("Consider implementing pre-commit hooks for validation".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchResult, BatchSize};
    use crate::domain::{ManifestFile, ValidationIssue};

    fn issue(file: &str, severity: Severity, message: &str) -> ValidationIssue {
        let tool = if severity == Severity::Error {
            Tool::Kubeconform
        } else {
            Tool::KubeLinter
        };
        ValidationIssue::new(ManifestFile::new(file), severity, tool, message)
    }

    pub(super) fn sample_aggregate() -> AggregateResult {
        let files: Vec<ManifestFile> = ["a.yaml", "b.yaml", "c.yaml", "d.yaml"]
            .into_iter()
            .map(ManifestFile::new)
            .collect();
        let mut aggregate = AggregateResult::new(BatchSize::try_from(2).unwrap());
        aggregate.absorb(BatchResult {
            index: 0,
            files: files[..2].to_vec(),
            issues: vec![
                issue("a.yaml", Severity::Error, "missing property 'name'"),
                issue("a.yaml", Severity::Warning, "no liveness probe"),
                issue("b.yaml", Severity::Warning, "no liveness probe"),
            ],
            failure: None,
        });
        aggregate.absorb(BatchResult {
            index: 1,
            files: files[2..].to_vec(),
            issues: vec![
                issue("c.yaml", Severity::Warning, "container runs as root"),
                issue("d.yaml", Severity::Warning, "no readiness probe"),
            ],
            failure: None,
        });
        aggregate
    }

    pub(super) fn sample_options() -> ReportOptions {
        ReportOptions {
            source: ReportSource::Repository {
                url: "https://github.com/acme/deploy".to_string(),
                branch: "main".to_string(),
            },
            top_files: 10,
            min_severity: Severity::Warning,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = Report::build(&sample_aggregate(), &sample_options());
        let s = &report.summary;
        assert_eq!(s.total_files, 4);
        assert_eq!(s.invalid_files, 1);
        assert_eq!(s.valid_files, 3);
        assert_eq!(s.error_count, 1);
        assert_eq!(s.warning_count, 4);
        assert!((s.success_rate - 75.0).abs() < f64::EPSILON);
        assert_eq!(s.risk_level, RiskLevel::Low);
        assert_eq!(s.batch_size, 2);
        assert_eq!(s.batches_total, 2);
    }

    #[test]
    fn test_batch_summaries_in_order() {
        let report = Report::build(&sample_aggregate(), &sample_options());
        let batches: Vec<(usize, usize, usize)> =
            report.batches.iter().map(|b| (b.batch, b.errors, b.warnings)).collect();
        assert_eq!(batches, vec![(1, 1, 2), (2, 0, 2)]);
        assert_eq!(report.batches[0].files, vec!["a.yaml", "b.yaml"]);
        assert_eq!(report.batches[0].highlights[0].message, "missing property 'name'");
    }

    #[test]
    fn test_category_ranking_breaks_ties_by_name() {
        let report = Report::build(&sample_aggregate(), &sample_options());
        let ranked: Vec<(Category, usize)> = report.categories.iter().map(|c| (c.category, c.count)).collect();
        assert_eq!(
            ranked,
            vec![
                (Category::HealthProbes, 3),
                (Category::MissingRequiredFields, 1),
                (Category::Security, 1),
            ]
        );
    }

    #[test]
    fn test_top_files_ordering_and_limit() {
        let options = ReportOptions {
            top_files: 2,
            ..sample_options()
        };
        let report = Report::build(&sample_aggregate(), &options);
        assert_eq!(
            report.top_files,
            vec![
                FileIssueCount {
                    file: "a.yaml".to_string(),
                    issues: 2
                },
                FileIssueCount {
                    file: "b.yaml".to_string(),
                    issues: 1
                },
            ]
        );
    }

    #[test]
    fn test_min_severity_filters_findings_only() {
        let options = ReportOptions {
            min_severity: Severity::Error,
            ..sample_options()
        };
        let report = Report::build(&sample_aggregate(), &options);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.summary.warning_count, 4);
    }

    #[test]
    fn test_recommendations_follow_categories() {
        let report = Report::build(&sample_aggregate(), &sample_options());
        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations[0].starts_with("Add missing required fields"));
        assert!(report.recommendations.iter().all(|r| !r.contains("pre-commit")));
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_issue_count(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_issue_count(5), RiskLevel::Low);
        assert_eq!(RiskLevel::from_issue_count(6), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_issue_count(20), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_issue_count(21), RiskLevel::High);
    }

    #[test]
    fn test_render_twice_is_identical() {
        let report = Report::build(&sample_aggregate(), &sample_options())
            .with_narrative(Narrative::Unavailable("timed out".to_string()));
        for format in [OutputFormat::Text, OutputFormat::Json] {
            assert_eq!(
                report.render(format, false).unwrap(),
                report.render(format, false).unwrap()
            );
        }
    }
}
