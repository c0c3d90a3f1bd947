//! Check traits for defining rules over syntax trees.

use crate::context::CheckContext;
use crate::tree::{Node, NodeKind};
use crate::types::Severity;
use thiserror::Error;

/// A rule that observes selected node kinds during traversal.
///
/// A check is created once and shared by every file and worker thread, so it
/// holds configuration only. Traversal state lives in the [`CheckVisitor`]
/// returned by [`start_file`](Check::start_file), which the dispatcher calls
/// before each file. A fresh visitor per file means nothing leaks from one
/// file into the next.
///
/// # Example
///
/// ```
/// use flexlint_core::{Check, CheckContext, CheckError, CheckVisitor, Node, NodeKind};
///
/// struct NoHexLiterals;
///
/// impl Check for NoHexLiterals {
///     fn key(&self) -> &str { "X0001" }
///     fn name(&self) -> &str { "no-hex-literals" }
///     fn message(&self) -> &str { "Avoid hexadecimal literals." }
///     fn subscriptions(&self) -> &[NodeKind] { &[NodeKind::HexLiteral] }
///
///     fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
///         Box::new(HexVisitor)
///     }
/// }
///
/// struct HexVisitor;
///
/// impl CheckVisitor for HexVisitor {
///     fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
///         ctx.report(node, &[]);
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the stable rule key (e.g., "S1467").
    fn key(&self) -> &str;

    /// Returns the kebab-case name of this rule (e.g., "octal-value").
    fn name(&self) -> &str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Major
    }

    /// Returns the message template; `{0}`, `{1}`... are positional arguments.
    fn message(&self) -> &str;

    /// Node kinds this check wants to be notified about.
    fn subscriptions(&self) -> &[NodeKind];

    /// Whether the check also wants leave events for its subscribed kinds.
    fn visits_leave(&self) -> bool {
        false
    }

    /// Creates the traversal state for one file.
    fn start_file(&self) -> Box<dyn CheckVisitor + '_>;
}

/// Type alias for boxed Check trait objects.
pub type CheckBox = Box<dyn Check>;

/// Per-file traversal state of a [`Check`].
pub trait CheckVisitor {
    /// Called when traversal first reaches a subscribed node.
    ///
    /// # Errors
    ///
    /// An error suspends this check for the rest of the file.
    fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError>;

    /// Called after all children of a subscribed node were visited.
    ///
    /// Only invoked when [`Check::visits_leave`] returns true.
    ///
    /// # Errors
    ///
    /// An error suspends this check for the rest of the file.
    fn leave(&mut self, _node: Node<'_>, _ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        Ok(())
    }
}

/// Failure inside a check callback.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The check cannot go on with this file.
    #[error("{0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCheck;

    impl Check for TestCheck {
        fn key(&self) -> &str {
            "TEST001"
        }
        fn name(&self) -> &str {
            "test-check"
        }
        fn message(&self) -> &str {
            "Test violation"
        }
        fn subscriptions(&self) -> &[NodeKind] {
            &[NodeKind::Block]
        }
        fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
            Box::new(NoopVisitor)
        }
    }

    struct NoopVisitor;

    impl CheckVisitor for NoopVisitor {
        fn enter(&mut self, _node: Node<'_>, _ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
            Ok(())
        }
    }

    #[test]
    fn test_check_defaults() {
        let check = TestCheck;
        assert_eq!(check.key(), "TEST001");
        assert_eq!(check.name(), "test-check");
        assert_eq!(check.description(), "");
        assert_eq!(check.default_severity(), Severity::Major);
        assert!(!check.visits_leave());
    }
}
