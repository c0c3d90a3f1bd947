//! Context handed to check callbacks.

use crate::check::Check;
use crate::sink::{format_message, ViolationSink};
use crate::tree::Node;
use crate::types::{Severity, ToolDiagnosticKind};
use std::path::Path;

/// Reporting handle for one check during one callback.
///
/// Carries the identity of the check being called (key, name, message
/// template, effective severity) so visitors only supply the node and the
/// message arguments.
pub struct CheckContext<'a> {
    sink: &'a mut ViolationSink,
    check: &'a dyn Check,
    severity: Severity,
}

impl<'a> CheckContext<'a> {
    /// Creates a context reporting into `sink` on behalf of `check`.
    #[must_use]
    pub fn new(sink: &'a mut ViolationSink, check: &'a dyn Check, severity: Severity) -> Self {
        Self {
            sink,
            check,
            severity,
        }
    }

    /// Key of the check being called.
    #[must_use]
    pub fn key(&self) -> &str {
        self.check.key()
    }

    /// Effective severity of the check.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// File being analyzed.
    #[must_use]
    pub fn file(&self) -> &Path {
        self.sink.file()
    }

    /// Reports a violation at `node`, filling the check's message template.
    pub fn report(&mut self, node: Node<'_>, args: &[&str]) {
        let message = format_message(self.check.message(), args);
        self.report_message(node, message);
    }

    /// Reports a violation at `node` with a fully formed message.
    pub fn report_message(&mut self, node: Node<'_>, message: impl Into<String>) {
        self.sink.push_violation(
            self.check.key(),
            self.check.name(),
            self.severity,
            node.line(),
            node.column(),
            message.into(),
        );
    }

    /// Notes a node whose shape the check could not interpret.
    ///
    /// Recorded as a tool diagnostic, never as a violation.
    pub fn malformed(&mut self, node: Node<'_>, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(
            rule = self.check.key(),
            file = %self.sink.file().display(),
            line = node.line(),
            "Skipping malformed {}: {}",
            node.kind(),
            detail
        );
        self.sink.push_diagnostic(
            self.check.key(),
            ToolDiagnosticKind::MalformedTree,
            node.line(),
            node.column(),
            format!("{}: {detail}", node.kind()),
        );
    }
}
