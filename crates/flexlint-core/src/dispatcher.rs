//! Subscription-based traversal dispatcher.
//!
//! The dispatcher walks a [`SyntaxTree`] once, depth-first and left to
//! right, and forwards enter/leave events to the checks subscribed to each
//! node's kind. Subscriptions are resolved once, at build time, into two
//! lookup tables (`NodeKind` → check indices), so per-node dispatch is a
//! single hash lookup.
//!
//! A check whose callback returns an error or panics is suspended for the
//! rest of the file and a [`ToolDiagnosticKind::CheckFailed`] diagnostic is
//! recorded. Other checks keep running.

use crate::check::{Check, CheckBox, CheckVisitor};
use crate::context::CheckContext;
use crate::sink::ViolationSink;
use crate::tree::{Node, NodeId, NodeKind, SyntaxTree};
use crate::types::{FileReport, Severity, ToolDiagnosticKind};

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors detected while registering checks.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Two checks share a rule key.
    #[error("Duplicate rule key: {key}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// A check subscribes to nothing.
    #[error("Rule {key} subscribes to no node kinds")]
    EmptySubscriptions {
        /// Key of the check.
        key: String,
    },

    /// A check lists the same kind twice.
    #[error("Rule {key} subscribes to {kind} more than once")]
    DuplicateSubscription {
        /// Key of the check.
        key: String,
        /// The repeated kind.
        kind: NodeKind,
    },
}

struct Registered {
    check: CheckBox,
    severity: Severity,
}

/// Builder for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    checks: Vec<(CheckBox, Option<Severity>)>,
}

impl DispatcherBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check.
    #[must_use]
    pub fn check<C: Check + 'static>(self, check: C) -> Self {
        self.check_box(Box::new(check))
    }

    /// Registers a boxed check.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push((check, None));
        self
    }

    /// Registers a boxed check, overriding its default severity.
    #[must_use]
    pub fn check_with_severity(mut self, check: CheckBox, severity: Option<Severity>) -> Self {
        self.checks.push((check, severity));
        self
    }

    /// Validates the registrations and builds the lookup tables.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate rule keys, empty subscription lists,
    /// or a kind listed twice by the same check.
    pub fn build(self) -> Result<Dispatcher, RegistrationError> {
        let mut keys = HashSet::new();
        let mut on_enter: HashMap<NodeKind, Vec<usize>> = HashMap::new();
        let mut on_leave: HashMap<NodeKind, Vec<usize>> = HashMap::new();
        let mut checks = Vec::with_capacity(self.checks.len());

        for (index, (check, severity)) in self.checks.into_iter().enumerate() {
            let key = check.key().to_string();
            if !keys.insert(key.clone()) {
                return Err(RegistrationError::DuplicateKey { key });
            }

            let kinds = check.subscriptions();
            if kinds.is_empty() {
                return Err(RegistrationError::EmptySubscriptions { key });
            }

            let mut seen = HashSet::new();
            for &kind in kinds {
                if !seen.insert(kind) {
                    return Err(RegistrationError::DuplicateSubscription { key, kind });
                }
                on_enter.entry(kind).or_default().push(index);
                if check.visits_leave() {
                    on_leave.entry(kind).or_default().push(index);
                }
            }

            debug!("Registered {} ({}) on {:?}", key, check.name(), kinds);
            let severity = severity.unwrap_or_else(|| check.default_severity());
            checks.push(Registered { check, severity });
        }

        Ok(Dispatcher {
            checks,
            on_enter,
            on_leave,
        })
    }
}

#[derive(Clone, Copy)]
enum Event {
    Enter,
    Leave,
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

type Visitors<'v> = Vec<Option<Box<dyn CheckVisitor + 'v>>>;

/// Drives checks over syntax trees.
///
/// The dispatcher is immutable after [`build`](DispatcherBuilder::build) and
/// can be shared across threads; every [`run`](Self::run) creates its own
/// visitors and sink.
pub struct Dispatcher {
    checks: Vec<Registered>,
    on_enter: HashMap<NodeKind, Vec<usize>>,
    on_leave: HashMap<NodeKind, Vec<usize>>,
}

impl Dispatcher {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Runs every registered check over `tree` and returns what they found.
    ///
    /// Violations are reported against `file`.
    #[must_use]
    pub fn run(&self, tree: &SyntaxTree, file: &Path) -> FileReport {
        let mut sink = ViolationSink::new(file);
        let mut visitors = self.start_file(tree.root(), &mut sink);

        let mut stack = vec![Step::Enter(tree.root().id())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let node = tree.node(id);
                    self.notify(Event::Enter, node, &mut visitors, &mut sink);
                    if self.on_leave.contains_key(&node.kind()) {
                        stack.push(Step::Leave(id));
                    }
                    stack.extend(node.children().rev().map(|c| Step::Enter(c.id())));
                }
                Step::Leave(id) => {
                    self.notify(Event::Leave, tree.node(id), &mut visitors, &mut sink);
                }
            }
        }

        sink.into_report()
    }

    fn start_file(&self, root: Node<'_>, sink: &mut ViolationSink) -> Visitors<'_> {
        self.checks
            .iter()
            .map(|registered| {
                match panic::catch_unwind(AssertUnwindSafe(|| registered.check.start_file())) {
                    Ok(visitor) => Some(visitor),
                    Err(payload) => {
                        let message = format!("panicked: {}", panic_message(payload.as_ref()));
                        suspend(registered.check.as_ref(), root, sink, &message);
                        None
                    }
                }
            })
            .collect()
    }

    fn notify<'v>(
        &'v self,
        event: Event,
        node: Node<'_>,
        visitors: &mut Visitors<'v>,
        sink: &mut ViolationSink,
    ) {
        let table = match event {
            Event::Enter => &self.on_enter,
            Event::Leave => &self.on_leave,
        };
        let Some(indices) = table.get(&node.kind()) else {
            return;
        };

        for &index in indices {
            let Some(visitor) = visitors[index].as_mut() else {
                continue;
            };
            let registered = &self.checks[index];
            let mut ctx = CheckContext::new(sink, registered.check.as_ref(), registered.severity);

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| match event {
                Event::Enter => visitor.enter(node, &mut ctx),
                Event::Leave => visitor.leave(node, &mut ctx),
            }));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
            };

            if let Some(message) = failure {
                suspend(registered.check.as_ref(), node, sink, &message);
                visitors[index] = None;
            }
        }
    }
}

fn suspend(check: &dyn Check, node: Node<'_>, sink: &mut ViolationSink, message: &str) {
    warn!(
        rule = check.key(),
        file = %sink.file().display(),
        line = node.line(),
        "Check failed, skipping it for the rest of the file: {}",
        message
    );
    sink.push_diagnostic(
        check.key(),
        ToolDiagnosticKind::CheckFailed,
        node.line(),
        node.column(),
        message,
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckError;
    use crate::tree::TreeBuilder;
    use crate::types::Violation;

    /// Reports every event it sees as a violation whose message is
    /// `"<enter|leave> <KIND> <token>"`.
    struct Recorder {
        key: &'static str,
        kinds: &'static [NodeKind],
        leave: bool,
    }

    impl Check for Recorder {
        fn key(&self) -> &str {
            self.key
        }
        fn name(&self) -> &str {
            "recorder"
        }
        fn message(&self) -> &str {
            "{0} {1} {2}"
        }
        fn subscriptions(&self) -> &[NodeKind] {
            self.kinds
        }
        fn visits_leave(&self) -> bool {
            self.leave
        }
        fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
            Box::new(RecorderVisitor)
        }
    }

    struct RecorderVisitor;

    impl CheckVisitor for RecorderVisitor {
        fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
            ctx.report(node, &["enter", node.kind().as_str(), node.token_value().unwrap_or("-")]);
            Ok(())
        }

        fn leave(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
            ctx.report(node, &["leave", node.kind().as_str(), node.token_value().unwrap_or("-")]);
            Ok(())
        }
    }

    /// Numbers its findings; the count must restart with every file.
    struct Counter;

    impl Check for Counter {
        fn key(&self) -> &str {
            "COUNT"
        }
        fn name(&self) -> &str {
            "counter"
        }
        fn message(&self) -> &str {
            "octal #{0}"
        }
        fn subscriptions(&self) -> &[NodeKind] {
            &[NodeKind::Octal]
        }
        fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
            Box::new(CounterVisitor { seen: 0 })
        }
    }

    struct CounterVisitor {
        seen: usize,
    }

    impl CheckVisitor for CounterVisitor {
        fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
            self.seen += 1;
            let seen = self.seen.to_string();
            ctx.report(node, &[seen.as_str()]);
            Ok(())
        }
    }

    /// Fails on the octal literal with the given token.
    struct Fragile {
        fail_on: &'static str,
        panic: bool,
    }

    impl Check for Fragile {
        fn key(&self) -> &str {
            "FRAGILE"
        }
        fn name(&self) -> &str {
            "fragile"
        }
        fn message(&self) -> &str {
            "saw {0}"
        }
        fn subscriptions(&self) -> &[NodeKind] {
            &[NodeKind::Octal]
        }
        fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
            Box::new(FragileVisitor { check: self })
        }
    }

    struct FragileVisitor<'a> {
        check: &'a Fragile,
    }

    impl CheckVisitor for FragileVisitor<'_> {
        fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
            let token = node.token().unwrap_or_default();
            if token == self.check.fail_on {
                if self.check.panic {
                    panic!("cannot handle {token}");
                }
                return Err(CheckError::Internal(format!("cannot handle {token}")));
            }
            ctx.report(node, &[token]);
            Ok(())
        }
    }

    /// `CU { CLASS_DEF { IDENTIFIER Foo, BLOCK { OCTAL 01, OCTAL 02 } }, OCTAL 03 }`
    fn sample() -> SyntaxTree {
        TreeBuilder::new()
            .open(NodeKind::CompilationUnit, 1)
            .open(NodeKind::ClassDef, 1)
            .leaf(NodeKind::Identifier, "Foo", 1)
            .open(NodeKind::Block, 2)
            .leaf(NodeKind::Octal, "01", 3)
            .leaf(NodeKind::Octal, "02", 4)
            .close()
            .close()
            .leaf(NodeKind::Octal, "03", 6)
            .close()
            .finish()
            .expect("sample tree")
    }

    fn messages(violations: &[Violation], code: &str) -> Vec<String> {
        violations
            .iter()
            .filter(|v| v.code == code)
            .map(|v| v.message.clone())
            .collect()
    }

    #[test]
    fn test_enter_and_leave_follow_document_order() {
        let dispatcher = Dispatcher::builder()
            .check(Recorder {
                key: "REC",
                kinds: &[NodeKind::ClassDef, NodeKind::Block, NodeKind::Octal],
                leave: true,
            })
            .build()
            .expect("dispatcher");

        let report = dispatcher.run(&sample(), Path::new("Foo.as"));
        assert_eq!(
            messages(&report.violations, "REC"),
            [
                "enter CLASS_DEF Foo",
                "enter BLOCK 01",
                "enter OCTAL 01",
                "leave OCTAL 01",
                "enter OCTAL 02",
                "leave OCTAL 02",
                "leave BLOCK 01",
                "leave CLASS_DEF Foo",
                "enter OCTAL 03",
                "leave OCTAL 03",
            ]
        );
    }

    #[test]
    fn test_only_subscribed_kinds_and_enter_only_checks() {
        let dispatcher = Dispatcher::builder()
            .check(Recorder {
                key: "REC",
                kinds: &[NodeKind::Block],
                leave: false,
            })
            .build()
            .expect("dispatcher");

        let report = dispatcher.run(&sample(), Path::new("Foo.as"));
        assert_eq!(messages(&report.violations, "REC"), ["enter BLOCK 01"]);
        assert_eq!(report.violations[0].line(), 2);
        assert_eq!(report.file, Path::new("Foo.as"));
    }

    #[test]
    fn test_state_restarts_for_each_file() {
        let dispatcher = Dispatcher::builder().check(Counter).build().expect("dispatcher");
        let tree = sample();

        let first = dispatcher.run(&tree, Path::new("A.as"));
        let second = dispatcher.run(&tree, Path::new("B.as"));
        assert_eq!(
            messages(&first.violations, "COUNT"),
            ["octal #1", "octal #2", "octal #3"]
        );
        assert_eq!(
            messages(&second.violations, "COUNT"),
            messages(&first.violations, "COUNT")
        );
    }

    #[test]
    fn test_runs_are_idempotent() {
        let dispatcher = Dispatcher::builder()
            .check(Counter)
            .check(Recorder {
                key: "REC",
                kinds: &[NodeKind::ClassDef, NodeKind::Octal],
                leave: true,
            })
            .build()
            .expect("dispatcher");
        let tree = sample();

        let first = dispatcher.run(&tree, Path::new("A.as"));
        let second = dispatcher.run(&tree, Path::new("A.as"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_failing_check_is_isolated() {
        let dispatcher = Dispatcher::builder()
            .check(Fragile {
                fail_on: "02",
                panic: false,
            })
            .check(Counter)
            .build()
            .expect("dispatcher");

        let report = dispatcher.run(&sample(), Path::new("Foo.as"));

        // Findings before the failure are kept, nothing after it.
        assert_eq!(messages(&report.violations, "FRAGILE"), ["saw 01"]);
        // The other check saw the whole file.
        assert_eq!(messages(&report.violations, "COUNT").len(), 3);

        assert_eq!(report.diagnostics.len(), 1);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.code, "FRAGILE");
        assert_eq!(diag.kind, ToolDiagnosticKind::CheckFailed);
        assert_eq!(diag.location.line, 4);
        assert_eq!(diag.message, "cannot handle 02");
    }

    #[test]
    fn test_panicking_check_is_isolated() {
        let dispatcher = Dispatcher::builder()
            .check(Counter)
            .check(Fragile {
                fail_on: "01",
                panic: true,
            })
            .build()
            .expect("dispatcher");

        let report = dispatcher.run(&sample(), Path::new("Foo.as"));
        assert!(messages(&report.violations, "FRAGILE").is_empty());
        assert_eq!(messages(&report.violations, "COUNT").len(), 3);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].message, "panicked: cannot handle 01");

        // The failure does not carry over to the next file.
        let again = dispatcher.run(&sample(), Path::new("Foo.as"));
        assert_eq!(again.diagnostics.len(), 1);
    }

    #[test]
    fn test_severity_override() {
        let dispatcher = Dispatcher::builder()
            .check_with_severity(Box::new(Counter), Some(Severity::Blocker))
            .build()
            .expect("dispatcher");
        let report = dispatcher.run(&sample(), Path::new("Foo.as"));
        assert!(report
            .violations
            .iter()
            .all(|v| v.severity == Severity::Blocker));
    }

    #[test]
    fn test_registration_errors() {
        let duplicate = Dispatcher::builder().check(Counter).check(Counter).build();
        assert!(matches!(
            duplicate,
            Err(RegistrationError::DuplicateKey { ref key }) if key == "COUNT"
        ));

        let empty = Dispatcher::builder()
            .check(Recorder {
                key: "REC",
                kinds: &[],
                leave: false,
            })
            .build();
        assert!(matches!(
            empty,
            Err(RegistrationError::EmptySubscriptions { .. })
        ));

        let repeated = Dispatcher::builder()
            .check(Recorder {
                key: "REC",
                kinds: &[NodeKind::Octal, NodeKind::Octal],
                leave: false,
            })
            .build();
        assert!(matches!(
            repeated,
            Err(RegistrationError::DuplicateSubscription {
                kind: NodeKind::Octal,
                ..
            })
        ));
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut builder = TreeBuilder::new();
        let depth = 50_000;
        for line in 1..=depth {
            builder.open(NodeKind::Block, line);
        }
        builder.leaf(NodeKind::Octal, "07", depth + 1);
        for _ in 0..depth {
            builder.close();
        }
        let tree = builder.finish().expect("deep tree");

        let dispatcher = Dispatcher::builder().check(Counter).build().expect("dispatcher");
        let report = dispatcher.run(&tree, Path::new("deep.as"));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].line(), depth + 1);
    }
}
