//! Shared output formatting for lint results.

use anyhow::Result;
use flexlint_core::{LintResult, Severity, ViolationDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Rich => print_rich(result),
    }
    Ok(())
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Blocker | Severity::Critical => "\x1b[31m",
        Severity::Major => "\x1b[33m",
        Severity::Minor => "\x1b[36m",
        Severity::Info => "\x1b[34m",
    }
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!(
            "  {}{}\x1b[0m: {}",
            severity_color(violation.severity),
            violation.severity,
            violation.message
        );
        println!();
    }

    print_problems(result);

    let summary_color = match result.violations.iter().map(|v| v.severity).max() {
        Some(severity) => severity_color(severity),
        None => "\x1b[32m",
    };
    println!("{}{}\x1b[0m", summary_color, result.summary());
}

/// Analyzer diagnostics and unreadable files, which are not violations.
fn print_problems(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!("\x1b[35mnote\x1b[0m: {diagnostic}");
    }
    for failure in &result.failures {
        println!(
            "\x1b[35mskipped\x1b[0m: {}: {}",
            failure.file.display(),
            failure.message
        );
    }
    if !result.diagnostics.is_empty() || !result.failures.is_empty() {
        println!();
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_rich(result: &LintResult) {
    for violation in &result.violations {
        let report = miette::Report::new(ViolationDiagnostic::from(violation));
        println!("{report:?}");
    }
    print_problems(result);
    println!("{}", result.summary());
}
