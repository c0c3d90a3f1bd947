//! Per-file accumulation of violations and tool diagnostics.

use crate::types::{FileReport, Location, Severity, ToolDiagnostic, ToolDiagnosticKind, Violation};
use std::path::{Path, PathBuf};

/// Collects what the checks report during one file's traversal.
///
/// A sink is created fresh for every file and turned into a [`FileReport`]
/// once traversal is over. Entries keep insertion order, which is document
/// order because the dispatcher reports while walking the tree.
#[derive(Debug)]
pub struct ViolationSink {
    file: PathBuf,
    violations: Vec<Violation>,
    diagnostics: Vec<ToolDiagnostic>,
}

impl ViolationSink {
    /// Creates an empty sink for `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            violations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Returns the file this sink collects for.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Records a violation.
    pub fn push_violation(
        &mut self,
        code: &str,
        rule: &str,
        severity: Severity,
        line: usize,
        column: usize,
        message: String,
    ) {
        self.violations.push(Violation::new(
            code,
            rule,
            severity,
            Location::new(self.file.clone(), line, column),
            message,
        ));
    }

    /// Records a tool diagnostic.
    pub fn push_diagnostic(
        &mut self,
        code: &str,
        kind: ToolDiagnosticKind,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ToolDiagnostic {
            code: code.to_string(),
            kind,
            location: Location::new(self.file.clone(), line, column),
            message: message.into(),
        });
    }

    /// Hands the collected findings over.
    #[must_use]
    pub fn into_report(self) -> FileReport {
        FileReport {
            file: self.file,
            violations: self.violations,
            diagnostics: self.diagnostics,
        }
    }
}

/// Substitutes positional `{n}` placeholders in a message template.
///
/// Placeholders without a matching argument, and braces that do not enclose
/// a plain index, are copied verbatim.
///
/// ```
/// use flexlint_core::format_message;
///
/// assert_eq!(
///     format_message("Remove this event dispatch from the {0} constructor", &["Foo"]),
///     "Remove this event dispatch from the Foo constructor"
/// );
/// ```
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
