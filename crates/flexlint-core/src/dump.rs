//! JSON tree dumps written by the external grammar.
//!
//! A dump is one object per source file, holding its nodes as a flat list in
//! pre-order. Each node records how many direct children follow it:
//!
//! ```json
//! {
//!   "source": "src/com/acme/Foo.as",
//!   "nodes": [
//!     { "kind": "COMPILATION_UNIT", "line": 1, "children": 1 },
//!     { "kind": "OCTAL", "token": "017", "line": 3, "column": 9 }
//!   ]
//! }
//! ```
//!
//! `token`, `column` (default 1) and `children` (default 0) are optional.
//! The format has no nesting, so tree depth is not limited by the JSON parser.

use crate::tree::{Node, NodeKind, SyntaxTree, TreeBuilder, TreeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A serialized syntax tree plus the path of the file it was parsed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDump {
    /// Path of the original source file, if the grammar recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Nodes in pre-order; the first one is the root.
    pub nodes: Vec<DumpNode>,
}

/// One serialized node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpNode {
    /// Node kind.
    pub kind: NodeKind,
    /// Token text, for token nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    #[serde(default = "default_column")]
    pub column: usize,
    /// Number of direct children, which follow this node in the list.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub children: usize,
}

fn default_column() -> usize {
    1
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl TreeDump {
    /// Parses a dump from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Json`] if the text is not a valid dump.
    pub fn parse(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes a tree into a dump.
    #[must_use]
    pub fn from_tree(tree: &SyntaxTree, source: Option<&Path>) -> Self {
        Self {
            source: source.map(Path::to_path_buf),
            nodes: tree.iter().map(to_dump_node).collect(),
        }
    }

    /// Builds the in-memory tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a node has line 0, child counts
    /// leave nodes open or describe more than one root, or the tree is too
    /// large.
    pub fn to_tree(&self) -> Result<SyntaxTree, TreeError> {
        let mut builder = TreeBuilder::new();
        // Children still expected by each open node, innermost last.
        let mut pending: Vec<usize> = Vec::new();
        for node in &self.nodes {
            if let Some(remaining) = pending.last_mut() {
                *remaining -= 1;
            }
            builder.open_at(node.kind, node.token.clone(), node.line, node.column);
            pending.push(node.children);
            while pending.last() == Some(&0) {
                pending.pop();
                builder.close();
            }
        }
        builder.finish()
    }
}

fn to_dump_node(node: Node<'_>) -> DumpNode {
    DumpNode {
        kind: node.kind(),
        token: node.token().map(String::from),
        line: node.line(),
        column: node.column(),
        children: node.child_count(),
    }
}
