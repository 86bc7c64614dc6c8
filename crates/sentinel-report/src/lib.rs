#![warn(missing_docs)]
//! # sentinel-report
//!
//! ## Purpose
//! Exports one evaluation as a print-ready HTML report.
//!
//! ## Responsibilities
//! - Lay out header metadata, executive summary, benchmark table, and threat
//!   table.
//! - Color the risk score by tier and threat rows by severity.
//! - Write the document to `SentinelLLM_Report_<id>.html`.
//!
//! ## Data flow
//! [`ModelEvaluation`] -> [`render_report_html`] -> [`export_report`] ->
//! file on disk.
//!
//! ## Error model
//! Rendering is infallible. Writing returns [`ReportError`].
//!
//! ## Security and privacy notes
//! All evaluation text originates from user input or the provider and is
//! HTML-escaped before it is embedded.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};
use sentinel_core::{ModelEvaluation, RiskTier, Severity};
use thiserror::Error;

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; color: #1e293b; margin: 2rem; }
h1 { font-size: 1.8rem; margin-bottom: 0.2rem; }
h2 { font-size: 1.2rem; color: #0f172a; margin-top: 2rem; }
.muted { color: #64748b; font-size: 0.85rem; margin: 0.1rem 0; }
.meta { border: 1px solid #e2e8f0; background: #f8fafc; padding: 0.8rem 1.2rem; }
.meta dt { font-weight: bold; color: #475569; }
.meta dd { margin: 0 0 0.4rem 0; }
.risk { font-size: 1.4rem; font-weight: bold; }
.risk-low { color: #10b981; }
.risk-medium { color: #eab308; }
.risk-high { color: #ef4444; }
table { width: 100%; border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #e2e8f0; padding: 0.4rem; text-align: left; vertical-align: top; }
th { color: #ffffff; }
.benchmarks th { background: #4f46e5; }
.threats th { background: #1e293b; }
.threats tbody tr:nth-child(even) { background: #f1f5f9; }
.sev-critical { color: #ef4444; font-weight: bold; }
.sev-high { color: #f97316; font-weight: bold; }
.sev-medium { color: #eab308; font-weight: bold; }
.sev-other { font-weight: bold; }
section { page-break-inside: avoid; }
tr { page-break-inside: avoid; }
@media print { body { margin: 0; } .threats { page-break-before: always; } }
";

/// File name of the report for one evaluation id.
pub fn report_file_name(id: &str) -> String {
    format!("SentinelLLM_Report_{id}.html")
}

/// Renders the full HTML document.
pub fn render_report_html(evaluation: &ModelEvaluation) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>SentinelLLM Report {}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n",
        encode_text(&evaluation.id)
    );

    let _ = write!(
        html,
        "<header>\n<h1>SentinelLLM Report</h1>\n\
         <p class=\"muted\">Generated: {}</p>\n<p class=\"muted\">Ref ID: {}</p>\n</header>\n",
        encode_text(&evaluation.timestamp),
        encode_text(&evaluation.id)
    );

    let _ = write!(
        html,
        "<dl class=\"meta\">\n<dt>Target Model:</dt><dd>{}</dd>\n\
         <dt>Architecture:</dt><dd>{}</dd>\n<dt>Primary Use Case:</dt><dd>{}</dd>\n</dl>\n",
        encode_text(&evaluation.model_name),
        encode_text(&evaluation.architecture),
        encode_text(&evaluation.use_case)
    );

    let _ = write!(
        html,
        "<section class=\"summary\">\n<h2>Executive Summary</h2>\n\
         <p>Overall Risk Score: <span class=\"risk {}\">{}/100</span></p>\n\
         <p>Total Threats Identified: {}</p>\n<p>Critical Vulnerabilities: {}</p>\n</section>\n",
        risk_class(evaluation.risk_tier()),
        evaluation.overall_risk_score,
        evaluation.threats.len(),
        evaluation.critical_count()
    );

    html.push_str(
        "<section>\n<h2>Benchmark Scores</h2>\n<table class=\"benchmarks\">\n\
         <thead><tr><th>Category</th><th>Score</th><th>Details</th></tr></thead>\n<tbody>\n",
    );
    for score in &evaluation.scores {
        let _ = writeln!(
            html,
            "<tr><td><strong>{}</strong></td><td>{}%</td><td>{}</td></tr>",
            encode_text(&score.category),
            score.score,
            encode_text(&score.details)
        );
    }
    html.push_str("</tbody>\n</table>\n</section>\n");

    html.push_str(
        "<section>\n<h2>Detailed Threat Analysis</h2>\n<table class=\"threats\">\n\
         <thead><tr><th>Severity</th><th>Title</th><th>Mitigation</th></tr></thead>\n<tbody>\n",
    );
    for threat in &evaluation.threats {
        let _ = writeln!(
            html,
            "<tr><td class=\"{}\" title=\"{}\">{}</td><td><strong>{}</strong></td><td>{}</td></tr>",
            severity_class(&threat.severity),
            encode_double_quoted_attribute(&threat.category),
            encode_text(threat.severity.label()),
            encode_text(&threat.title),
            encode_text(&threat.mitigation)
        );
    }
    html.push_str("</tbody>\n</table>\n</section>\n</body>\n</html>\n");

    html
}

/// Writes the report into `dir` and returns the file path.
///
/// # Errors
/// Returns [`ReportError::Io`] when the directory cannot be created or the
/// file cannot be written.
pub fn export_report(evaluation: &ModelEvaluation, dir: &Path) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(report_file_name(&evaluation.id));
    fs::write(&path, render_report_html(evaluation)).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(id = %evaluation.id, path = %path.display(), "report exported");
    Ok(path)
}

fn risk_class(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => "risk-low",
        RiskTier::Medium => "risk-medium",
        RiskTier::High => "risk-high",
    }
}

fn severity_class(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "sev-critical",
        Severity::High => "sev-high",
        Severity::Medium => "sev-medium",
        Severity::Low | Severity::Other(_) => "sev-other",
    }
}

/// Report export errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("failed to write report at {path}: {source}")]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> ModelEvaluation {
        ModelEvaluation {
            id: "k3x9a0zq".to_string(),
            model_name: "GPT-4o <wrapper>".to_string(),
            architecture: "Public API + RAG".to_string(),
            use_case: "Support bot".to_string(),
            timestamp: "2026-10-15T09:00:00Z".to_string(),
            threats: Vec::new(),
            scores: Vec::new(),
            overall_risk_score: 30.0,
        }
    }

    #[test]
    fn file_name_uses_id() {
        assert_eq!(report_file_name("abc123"), "SentinelLLM_Report_abc123.html");
    }

    #[test]
    fn escapes_user_text() {
        let html = render_report_html(&evaluation());
        assert!(html.contains("GPT-4o &lt;wrapper&gt;"));
        assert!(!html.contains("<wrapper>"));
    }

    #[test]
    fn empty_collections_render_empty_tables() {
        let html = render_report_html(&evaluation());
        assert!(html.contains("<tbody>\n</tbody>"));
        assert!(html.contains("Total Threats Identified: 0"));
        assert!(html.contains("class=\"risk risk-low\">30/100"));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(
            render_report_html(&evaluation()),
            render_report_html(&evaluation())
        );
    }
}
