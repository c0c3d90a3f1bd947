//! Single-node rules declared in configuration.
//!
//! ```toml
//! [[node-rules]]
//! key = "X0001"
//! name = "no-hex-literals"
//! kind = "HEX_LITERAL"
//! message = "Avoid hexadecimal literals such as {0}."
//! severity = "minor"
//! ```
//!
//! Each entry becomes a [`NodeRule`] reporting every node of `kind`. The
//! message may use `{0}`, which is replaced by the node's token value.

use crate::check::{Check, CheckBox, CheckError, CheckVisitor};
use crate::config::{Config, ConfigError, NodeRuleConfig};
use crate::context::CheckContext;
use crate::tree::{Node, NodeKind};
use crate::types::Severity;

/// Reports every node of one kind.
#[derive(Debug, Clone)]
pub struct NodeRule {
    key: String,
    name: String,
    message: String,
    severity: Severity,
    kinds: [NodeKind; 1],
}

impl NodeRule {
    /// Creates a rule reporting every `kind` node.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            message: message.into(),
            severity: Severity::Major,
            kinds: [kind],
        }
    }

    /// Sets the default severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Builds a rule from its configuration entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNodeKind`] if `kind` names no node kind.
    pub fn from_config(entry: &NodeRuleConfig) -> Result<Self, ConfigError> {
        let kind = entry
            .kind
            .parse::<NodeKind>()
            .map_err(|_| ConfigError::UnknownNodeKind {
                rule: entry.key.clone(),
                kind: entry.kind.clone(),
            })?;
        let rule = Self::new(&*entry.key, &*entry.name, kind, &*entry.message);
        Ok(match entry.severity {
            Some(severity) => rule.severity(severity),
            None => rule,
        })
    }
}

impl Check for NodeRule {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Rule declared in configuration"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn subscriptions(&self) -> &[NodeKind] {
        &self.kinds
    }

    fn start_file(&self) -> Box<dyn CheckVisitor + '_> {
        Box::new(NodeRuleVisitor)
    }
}

struct NodeRuleVisitor;

impl CheckVisitor for NodeRuleVisitor {
    fn enter(&mut self, node: Node<'_>, ctx: &mut CheckContext<'_>) -> Result<(), CheckError> {
        ctx.report(node, &[node.token_value().unwrap_or_default()]);
        Ok(())
    }
}

/// Creates the checks for every `[[node-rules]]` entry of `config`.
///
/// # Errors
///
/// Returns an error on the first entry with an unknown node kind.
pub fn load_node_rules(config: &Config) -> Result<Vec<CheckBox>, ConfigError> {
    config
        .node_rules
        .iter()
        .map(|entry| NodeRule::from_config(entry).map(|rule| Box::new(rule) as CheckBox))
        .collect()
}
