use crate::reporting::model::{Finding, ScanReport, Severity};
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    scan_metadata: ScanMetadata,
    summary: Summary,
    findings: &'a [Finding],
    log: &'a [String],
}

#[derive(Serialize)]
struct ScanMetadata {
    tool: String,
    version: String,
    target: String,
    scan_date: String,
    report_format: String,
    cancelled: bool,
}

#[derive(Serialize)]
struct Summary {
    total_findings: usize,
    high: usize,
    medium: usize,
    pages_crawled: usize,
    parameters_tested: usize,
    requests_sent: usize,
}

pub fn render(report: &ScanReport) -> anyhow::Result<String> {
    let findings = &report.findings;
    let summary = Summary {
        total_findings: findings.len(),
        high: findings.iter().filter(|f| matches!(f.severity, Severity::High)).count(),
        medium: findings.iter().filter(|f| matches!(f.severity, Severity::Medium)).count(),
        pages_crawled: report.pages_crawled,
        parameters_tested: report.parameters_tested,
        requests_sent: report.requests_sent,
    };

    let out = Report {
        scan_metadata: ScanMetadata {
            tool: "xsscout".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            target: report.target.clone(),
            scan_date: chrono::Utc::now().to_rfc3339(),
            report_format: "application/json".to_string(),
            cancelled: report.cancelled,
        },
        summary,
        findings,
        log: &report.log,
    };

    let json = serde_json::to_string_pretty(&out)?;
    Ok(json)
}
