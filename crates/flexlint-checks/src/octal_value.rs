//! Rule to forbid octal literals.
//!
//! A leading zero silently switches a numeric literal to base 8, so `010`
//! reads as ten but means eight.

use flexlint_core::{Check, CheckContext, CheckError, CheckVisitor, Node, NodeKind, Severity};

/// Rule code for octal-value.
pub const CODE: &str = "S1314";

/// Rule name for octal-value.
pub const NAME: &str = "octal-value";

/// Forbids octal literals.
#[derive(Debug, Clone)]
pub struct OctalValue {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for OctalValue {
    fn default() -> Self {
        Self::new()
    }
}

impl OctalValue {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Major,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Check for OctalValue {
    fn key(&self) -> &str {
        CODE
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Forbids octal numeric literals"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn message(&self) -> &str {
        "Use decimal rather than octal values."
    }

    fn subscriptions(&self) -> &[NodeKind] {
        &[NodeKind::Octal]
    }

    fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
        Box::new(OctalVisitor)
    }
}

struct OctalVisitor;

impl CheckVisitor for OctalVisitor {
    fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        ctx.report(node, &[]);
        Ok(())
    }
}
