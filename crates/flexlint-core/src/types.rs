//! Core types for violations, tool diagnostics and results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity level of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Minor issue.
    Minor,
    /// Major issue.
    Major,
    /// Critical issue.
    Critical,
    /// Must be fixed before release.
    Blocker,
}

impl Severity {
    /// Every level, lowest first.
    pub const ALL: [Self; 5] = [
        Self::Info,
        Self::Minor,
        Self::Major,
        Self::Critical,
        Self::Blocker,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
            Self::Critical => write!(f, "critical"),
            Self::Blocker => write!(f, "blocker"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file path.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

/// A rule match found during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule key (e.g., "S1467").
    pub code: String,
    /// Rule name (e.g., "constructor-calls-dispatch-event").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Location of the violation.
    pub location: Location,
    /// Message with arguments substituted.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
        }
    }

    /// Returns the 1-based source line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Wraps a [`Violation`] as a miette diagnostic for rich terminal display.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    code: String,
    severity: Severity,
    help: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: v.message.clone(),
            code: format!("{}({})", v.code, v.rule),
            severity: v.severity,
            help: format!(
                "at {}:{}:{}",
                v.location.file.display(),
                v.location.line,
                v.location.column
            ),
        }
    }
}

impl miette::Diagnostic for ViolationDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Info => miette::Severity::Advice,
            Severity::Minor | Severity::Major => miette::Severity::Warning,
            Severity::Critical | Severity::Blocker => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.help))
    }
}

/// Category of a tool-internal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolDiagnosticKind {
    /// A check callback returned an error or panicked.
    CheckFailed,
    /// A check met a tree shape it could not interpret.
    MalformedTree,
}

impl fmt::Display for ToolDiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckFailed => write!(f, "check-failed"),
            Self::MalformedTree => write!(f, "malformed-tree"),
        }
    }
}

/// A problem of the analyzer itself, reported separately from violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDiagnostic {
    /// Key of the rule that hit the problem.
    pub code: String,
    /// Category.
    pub kind: ToolDiagnosticKind,
    /// Where it happened.
    pub location: Location,
    /// Description.
    pub message: String,
}

impl fmt::Display for ToolDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.kind,
            self.code,
            self.message
        )
    }
}

/// Findings for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Analyzed file.
    pub file: PathBuf,
    /// Violations in detection order.
    pub violations: Vec<Violation>,
    /// Tool diagnostics in detection order.
    pub diagnostics: Vec<ToolDiagnostic>,
}

/// A file that could not be analyzed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// File path.
    pub file: PathBuf,
    /// Reason.
    pub message: String,
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Tool diagnostics from all files.
    pub diagnostics: Vec<ToolDiagnostic>,
    /// Files that could not be read or loaded.
    pub failures: Vec<FileFailure>,
    /// Number of files checked.
    pub files_checked: usize,
    /// True if the run was cancelled before all files were analyzed.
    #[serde(default)]
    pub cancelled: bool,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file's findings.
    pub fn add_report(&mut self, report: FileReport) {
        self.violations.extend(report.violations);
        self.diagnostics.extend(report.diagnostics);
        self.files_checked += 1;
    }

    /// Records a file that could not be analyzed.
    pub fn add_failure(&mut self, file: &Path, message: impl Into<String>) {
        self.failures.push(FileFailure {
            file: file.to_path_buf(),
            message: message.into(),
        });
    }

    /// Counts violations of one severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// One-line summary, highest severity first.
    #[must_use]
    pub fn summary(&self) -> String {
        let counts = Severity::ALL
            .iter()
            .rev()
            .map(|&s| format!("{} {s}", self.count(s)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut summary = format!("Found {counts} in {} file(s)", self.files_checked);
        if !self.diagnostics.is_empty() {
            summary.push_str(&format!(
                "; {} analyzer diagnostic(s)",
                self.diagnostics.len()
            ));
        }
        if !self.failures.is_empty() {
            summary.push_str(&format!("; {} file(s) failed", self.failures.len()));
        }
        if self.cancelled {
            summary.push_str("; cancelled");
        }
        summary
    }

    /// Adds findings from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.diagnostics.extend(other.diagnostics);
        self.failures.extend(other.failures);
        self.files_checked += other.files_checked;
        self.cancelled |= other.cancelled;
    }
}
