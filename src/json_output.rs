use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::types::{
    CheckReport, DemoCheck, DemoProgram, Finding, Severity, SeverityCounts, Summary,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the self-check report from per-demo results.
/// A missing demo source fails the report; uncatalogued files are only listed.
pub fn build_report(
    demos: Vec<DemoCheck>,
    missing_sources: Vec<PathBuf>,
    uncatalogued: Vec<PathBuf>,
) -> CheckReport {
    let pass = missing_sources.is_empty() && demos.iter().all(|d| d.pass);

    let all_findings: Vec<&Finding> = demos.iter().flat_map(|d| d.findings.iter()).collect();
    let summary = build_summary(&all_findings);

    CheckReport {
        version: VERSION.to_owned(),
        pass,
        demos,
        missing_sources,
        uncatalogued,
        summary,
    }
}

/// Build summary statistics from all findings
fn build_summary(findings: &[&Finding]) -> Summary {
    let mut counts = SeverityCounts::default();

    for finding in findings {
        match finding.severity {
            Severity::Critical => counts.critical = counts.critical.saturating_add(1),
            Severity::High => counts.high = counts.high.saturating_add(1),
            Severity::Medium => counts.medium = counts.medium.saturating_add(1),
            Severity::Low => counts.low = counts.low.saturating_add(1),
            Severity::Info => counts.info = counts.info.saturating_add(1),
        }
    }

    Summary {
        total_findings: findings.len(),
        by_severity: counts,
    }
}

/// Serialize the report to a JSON string
pub fn to_json(report: &CheckReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Print a human-readable summary to stderr
pub fn print_summary(report: &CheckReport, verbose: bool) {
    let status = if report.pass { "PASS" } else { "FAIL" };
    eprintln!();
    eprintln!("=== demo-check v{} - {} ===", report.version, status);
    eprintln!();

    for demo in &report.demos {
        let demo_status = if demo.pass { "PASS" } else { "FAIL" };
        eprintln!(
            "{:<30} {} | findings: {}",
            demo.demo,
            demo_status,
            demo.findings.len()
        );
        for routine in &demo.routines {
            if routine.pass && !verbose {
                continue;
            }
            let mark = if routine.pass { "ok" } else { "MISMATCH" };
            eprintln!(
                "  {:<8} {:<22} expected: {:<20} observed: {}",
                mark,
                routine.routine,
                routine.expected.as_deref().unwrap_or("-"),
                if routine.observed.is_empty() {
                    "-".to_string()
                } else {
                    routine.observed.join(", ")
                }
            );
        }
    }

    for missing in &report.missing_sources {
        eprintln!("Missing demo source: {}", missing.display());
    }
    for extra in &report.uncatalogued {
        eprintln!("Not in catalog: {}", extra.display());
    }

    eprintln!();
    eprintln!(
        "Total findings: {} (critical: {}, high: {}, medium: {}, low: {}, info: {})",
        report.summary.total_findings,
        report.summary.by_severity.critical,
        report.summary.by_severity.high,
        report.summary.by_severity.medium,
        report.summary.by_severity.low,
        report.summary.by_severity.info,
    );

    if verbose {
        print_findings_detail(report);
    }

    eprintln!();
}

/// Print detailed findings when verbose mode is on
fn print_findings_detail(report: &CheckReport) {
    for demo in &report.demos {
        if demo.findings.is_empty() {
            continue;
        }
        eprintln!();
        eprintln!("--- {} ---", demo.demo);
        for f in &demo.findings {
            print_finding(f);
        }
    }
}

fn print_finding(f: &Finding) {
    eprintln!(
        "  [{severity}] {check} in {function} at {file}:{line}:{col}",
        severity = f.severity,
        check = f.check_name,
        function = f.function.as_deref().unwrap_or("<top-level>"),
        file = f.file.display(),
        line = f.line,
        col = f.col,
    );
    eprintln!("    {}", f.message);
    if !f.snippet.is_empty() {
        eprintln!("    > {}", f.snippet);
    }
    if !f.fix.is_empty() {
        eprintln!("    fix: {}", f.fix);
    }
}

/// Print the harness checklist: each demo, how to enable its tool, and what it must report.
pub fn print_catalog(demos: &[DemoProgram]) {
    for demo in demos {
        println!("{} [{}]", demo.name, demo.tool.display_name());
        println!("  source: {}", demo.source.display());
        println!("  enable: {}", demo.tool.rustc_flag());
        for expected in &demo.expected {
            let marker = if expected.active { "expect" } else { "silent" };
            println!("  {:<6} {:<28} at {}", marker, expected.kind, expected.location);
        }
        println!();
    }
}

/// Serialize the catalog to a JSON string
pub fn catalog_to_json(demos: &[DemoProgram]) -> Result<String> {
    serde_json::to_string_pretty(demos).context("Failed to serialize catalog")
}
