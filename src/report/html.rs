use quick_xml::escape::escape;
use std::fmt::Write;

use super::ReportDocument;
use crate::core::{TestResult, TestStatus};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%;margin-bottom:1.5rem}\
th,td{border:1px solid #ccc;padding:.4rem .6rem;text-align:left;vertical-align:top}\
th{background:#f3f3f3}.passed{color:#1a7f37}.failed{color:#cf222e}\
.error{color:#9a6700}.skipped{color:#57606a}ul{margin:0;padding-left:1.2rem}";

/// Render a self-contained HTML document
pub(super) fn render(document: &ReportDocument) -> String {
    let mut html = String::new();
    let summary = &document.summary;

    // writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>FHIR Test Report</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>FHIR Test Report</h1>\n<p>Generated at {}</p>\n\
         <table class=\"summary\"><tr><th>Total</th><th>Passed</th><th>Failed</th>\
         <th>Errors</th><th>Skipped</th></tr>\n\
         <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></table>\n",
        document.generated_at.to_rfc3339(),
        summary.total,
        summary.passed,
        summary.failed,
        summary.errors,
        summary.skipped,
    );

    for entry in &document.tests {
        let _ = write!(
            html,
            "<section class=\"test\" id=\"{id}\">\n<h2>{name} <small>({id})</small></h2>\n\
             <p>Latest: <span class=\"{status}\">{status}</span>, {time} ms at {timestamp}</p>\n\
             <table><tr><th>Run</th><th>Status</th><th>Execution time (ms)</th>\
             <th>Timestamp</th><th>Details</th></tr>\n",
            id = escape(entry.id.as_str()),
            name = escape(entry.name.as_str()),
            status = entry.status,
            time = entry.execution_time,
            timestamp = entry.timestamp.to_rfc3339(),
        );
        for result in &entry.results {
            render_result(&mut html, result);
        }
        html.push_str("</table>\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_result(html: &mut String, result: &TestResult) {
    let _ = write!(
        html,
        "<tr><td>{}</td><td class=\"{status}\">{status}</td><td>{}</td><td>{}</td><td>",
        result.run_id,
        result.execution_time,
        result.timestamp.to_rfc3339(),
        status = result.status,
    );

    let details = &result.details;
    if let Some(reason) = &details.failure_reason {
        let _ = write!(html, "<p>{}</p>", escape(reason.as_str()));
    }

    if !details.validation_errors.is_empty() {
        html.push_str("<ul class=\"validation-errors\">");
        for violation in &details.validation_errors {
            let actual = violation
                .actual
                .as_ref()
                .map_or_else(|| "undefined".to_string(), |v| v.to_string());
            let _ = write!(
                html,
                "<li><code>{}</code>: expected {}, actual {}</li>",
                escape(violation.path.as_str()),
                escape(&violation.expected.to_string()),
                escape(&actual),
            );
        }
        html.push_str("</ul>");
    }

    if !details.performance_metrics.is_empty() {
        html.push_str("<ul class=\"performance-metrics\">");
        for metric in &details.performance_metrics {
            let threshold = metric
                .threshold
                .map(|t| format!(" (threshold {t} {})", metric.unit))
                .unwrap_or_default();
            let class = if metric.passed {
                TestStatus::Passed
            } else {
                TestStatus::Failed
            };
            let _ = write!(
                html,
                "<li class=\"{class}\">{}: {} {}{}</li>",
                escape(metric.metric.as_str()),
                metric.value,
                escape(metric.unit.as_str()),
                escape(&threshold),
            );
        }
        html.push_str("</ul>");
    }

    html.push_str("</td></tr>\n");
}
