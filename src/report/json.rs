//! Structured report rendering

use serde::Serialize;

use super::{CategoryCount, FileIssueCount, Finding, Narrative, Report, ReportSource, Summary};
use crate::batch::{BatchSummary, FailedBatch};
use crate::error::Result;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    source: &'a ReportSource,
    summary: &'a Summary,
    categories: &'a [CategoryCount],
    top_files: &'a [FileIssueCount],
    findings: &'a [Finding],
    recommendations: &'a [String],
    batches: &'a [BatchSummary],
    failed_batches: &'a [FailedBatch],
    narrative: Option<&'a str>,
    narrative_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative_error: Option<&'a str>,
}

/// Renders a [`Report`] as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(&self, report: &Report) -> Result<String> {
        let view = JsonReport {
            generated_at: report.generated_at.to_rfc3339(),
            source: &report.source,
            summary: &report.summary,
            categories: &report.categories,
            top_files: &report.top_files,
            findings: &report.findings,
            recommendations: &report.recommendations,
            batches: &report.batches,
            failed_batches: &report.failed_batches,
            narrative: report.narrative.text(),
            narrative_status: report.narrative.status(),
            narrative_error: match &report.narrative {
                Narrative::Unavailable(reason) => Some(reason.as_str()),
                _ => None,
            },
        };
        let mut out = serde_json::to_string_pretty(&view)?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{sample_aggregate, sample_options};
    use serde_json::Value;

    fn render(narrative: Narrative) -> Value {
        let report = Report::build(&sample_aggregate(), &sample_options()).with_narrative(narrative);
        serde_json::from_str(&JsonFormatter.format(&report).unwrap()).unwrap()
    }

    #[test]
    fn test_json_shape() {
        let json = render(Narrative::Disabled);
        assert_eq!(json["summary"]["total_files"], 4);
        assert_eq!(json["summary"]["invalid_files"], 1);
        assert_eq!(json["summary"]["risk_level"], "low");
        assert_eq!(json["source"]["mode"], "repository");
        assert_eq!(json["categories"][0]["category"], "Health Probes");
        assert_eq!(json["categories"][0]["count"], 3);
        assert_eq!(json["top_files"][0]["file"], "a.yaml");
        assert_eq!(json["findings"][0]["severity"], "error");
        assert_eq!(json["findings"][0]["tool"], "kubeconform");
        assert_eq!(json["summary"]["batch_size"], 2);
        assert_eq!(json["batches"].as_array().unwrap().len(), 2);
        assert_eq!(json["batches"][0]["batch"], 1);
        assert_eq!(json["batches"][0]["files"][1], "b.yaml");
        assert_eq!(json["batches"][0]["errors"], 1);
        assert_eq!(json["batches"][0]["warnings"], 2);
        assert_eq!(json["batches"][0]["highlights"][0]["severity"], "error");
        assert!(json["batches"][0].get("failure").is_none());
        assert!(json["narrative"].is_null());
        assert_eq!(json["narrative_status"], "disabled");
        assert!(json.get("narrative_error").is_none());
    }

    #[test]
    fn test_json_unavailable_narrative() {
        let json = render(Narrative::Unavailable("request timed out".to_string()));
        assert!(json["narrative"].is_null());
        assert_eq!(json["narrative_status"], "unavailable");
        assert_eq!(json["narrative_error"], "request timed out");
        assert_eq!(json["summary"]["error_count"], 1);
    }

    #[test]
    fn test_json_available_narrative() {
        let json = render(Narrative::Available("Looks fine".to_string()));
        assert_eq!(json["narrative"], "Looks fine");
        assert_eq!(json["narrative_status"], "available");
    }
}
