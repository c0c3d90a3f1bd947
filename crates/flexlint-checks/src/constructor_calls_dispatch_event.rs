//! Rule to forbid event dispatch from class constructors.
//!
//! # Rationale
//!
//! An event dispatched while the object is still being constructed cannot be
//! observed by listeners, because none can be registered before the
//! constructor returns.
//!
//! # Detected Patterns
//!
//! - `dispatchEvent(event)` called directly in the body of a constructor,
//!   i.e. a function named like its enclosing class
//!
//! # Allowed Patterns
//!
//! - `dispatchEvent()` without arguments
//! - Dispatch from any other method
//! - Dispatch after the constructor body has ended
//!
//! # Configuration
//!
//! - `call_name`: Name of the dispatch function (default: `dispatchEvent`)

use flexlint_core::{
    Check, CheckContext, CheckError, CheckVisitor, Node, NodeId, NodeKind, RuleConfig,
    ScopeStack, Severity,
};

/// Rule code for constructor-calls-dispatch-event.
pub const CODE: &str = "S1467";

/// Rule name for constructor-calls-dispatch-event.
pub const NAME: &str = "constructor-calls-dispatch-event";

const MESSAGE: &str = "Remove this event dispatch from the {0} constructor";

const SUBSCRIPTIONS: &[NodeKind] = &[
    NodeKind::ClassDef,
    NodeKind::FunctionDef,
    NodeKind::PrimaryExpr,
];

/// Forbids dispatching events from constructors.
#[derive(Debug, Clone)]
pub struct ConstructorCallsDispatchEvent {
    /// Name of the dispatch function.
    pub call_name: String,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ConstructorCallsDispatchEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructorCallsDispatchEvent {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            call_name: "dispatchEvent".to_string(),
            severity: Severity::Blocker,
        }
    }

    /// Creates the rule from its `[rules.constructor-calls-dispatch-event]` table.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        match config {
            Some(config) => {
                let rule = Self::new();
                let call_name = config.get_str("call_name", &rule.call_name).to_string();
                rule.call_name(call_name)
            }
            None => Self::new(),
        }
    }

    /// Sets the name of the dispatch function.
    #[must_use]
    pub fn call_name(mut self, name: impl Into<String>) -> Self {
        self.call_name = name.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether `primary` calls the dispatch function with at least one argument.
    fn is_dispatch_call(&self, primary: Node<'_>) -> bool {
        primary.token_value() == Some(self.call_name.as_str())
            && primary
                .next_sibling()
                .filter(|next| next.is(NodeKind::Arguments))
                .and_then(|args| args.first_child_of(NodeKind::ListExpression))
                .is_some()
    }
}

impl Check for ConstructorCallsDispatchEvent {
    fn key(&self) -> &str {
        CODE
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Forbids dispatching events from class constructors"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn message(&self) -> &str {
        MESSAGE
    }

    fn subscriptions(&self) -> &[NodeKind] {
        SUBSCRIPTIONS
    }

    fn visits_leave(&self) -> bool {
        true
    }

    fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
        Box::new(DispatchVisitor {
            rule: self,
            classes: ScopeStack::new(),
        })
    }
}

/// One open class definition.
#[derive(Debug)]
struct ClassScope {
    /// `None` when the class name could not be read from the tree.
    name: Option<String>,
    /// The function definition currently recognized as the constructor.
    constructor: Option<NodeId>,
}

struct DispatchVisitor<'a> {
    rule: &'a ConstructorCallsDispatchEvent,
    classes: ScopeStack<ClassScope>,
}

impl DispatchVisitor<'_> {
    fn enter_class(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) {
        let name = class_name(node).map(String::from);
        if name.is_none() {
            ctx.malformed(node, "class name not found");
        }
        self.classes.push(ClassScope {
            name,
            constructor: None,
        });
    }

    fn enter_function(&mut self, node: Node<'_>) {
        let Some(class) = self.classes.top_mut() else {
            return;
        };
        if class.constructor.is_some() {
            return;
        }
        let Some(class_name) = class.name.as_deref() else {
            return;
        };
        let function_name = node
            .first_child_of(NodeKind::FunctionName)
            .and_then(|n| n.token_value());
        if function_name == Some(class_name) {
            class.constructor = Some(node.id());
        }
    }

    fn enter_primary(&self, node: Node<'_>, ctx: &mut CheckContext<'_>) {
        let Some(class) = self.classes.top() else {
            return;
        };
        if class.constructor.is_none() || !self.rule.is_dispatch_call(node) {
            return;
        }
        if let Some(name) = class.name.as_deref() {
            ctx.report(node, &[name]);
        }
    }
}

impl CheckVisitor for DispatchVisitor<'_> {
    fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        match node.kind() {
            NodeKind::ClassDef => self.enter_class(node, ctx),
            NodeKind::FunctionDef => self.enter_function(node),
            NodeKind::PrimaryExpr => self.enter_primary(node, ctx),
            _ => {}
        }
        Ok(())
    }

    fn leave(&mut self, node: Node<'_>, _ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        match node.kind() {
            NodeKind::ClassDef => {
                self.classes.pop();
            }
            NodeKind::FunctionDef => {
                if let Some(class) = self.classes.top_mut() {
                    if class.constructor == Some(node.id()) {
                        class.constructor = None;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// `CLASS_DEF / CLASS_NAME / CLASS_IDENTIFIERS`, last child's token value.
fn class_name<'t>(class_def: Node<'t>) -> Option<&'t str> {
    class_def
        .first_child_of(NodeKind::ClassName)?
        .first_child_of(NodeKind::ClassIdentifiers)?
        .last_child()?
        .token_value()
}
