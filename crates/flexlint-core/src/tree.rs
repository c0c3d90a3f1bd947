//! Immutable syntax trees handed over by the external grammar.
//!
//! Nodes live in a flat arena owned by [`SyntaxTree`] and are addressed by
//! [`NodeId`]. Parent links are plain ids, so the tree has a single owner and
//! no reference cycles. The arena is filled in document (pre-order) order:
//! the root is always the first node, and a node's id is smaller than the ids
//! of all its descendants.
//!
//! Trees are built with [`TreeBuilder`] or loaded from a JSON dump
//! (see [`crate::dump`]). Navigation goes through the copyable [`Node`]
//! handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Syntactic category of a tree node.
///
/// The set is closed and defined by the grammar. The engine only compares
/// and hashes kinds; their meaning belongs to the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Root of a source file.
    CompilationUnit,
    /// `package a.b { ... }`
    PackageDecl,
    /// `import a.b.C;`
    ImportDirective,
    /// Metadata tag such as `[Event(name="x")]`.
    Metadata,
    /// Class definition.
    ClassDef,
    /// Declared class name subtree.
    ClassName,
    /// Dotted identifiers inside a class name.
    ClassIdentifiers,
    /// `extends` / `implements` clause.
    Inheritance,
    /// Interface definition.
    InterfaceDef,
    /// `{ ... }` block.
    Block,
    /// Function definition.
    FunctionDef,
    /// Declared function name subtree.
    FunctionName,
    /// Formal parameter list.
    Parameters,
    /// Single formal parameter.
    Parameter,
    /// `var` / `const` definition.
    VariableDef,
    /// Generic statement.
    Statement,
    /// Expression statement.
    ExpressionStmt,
    /// Assignment expression.
    AssignmentExpr,
    /// Primary expression (identifier, literal, `this`, ...).
    PrimaryExpr,
    /// Call argument list, including parentheses.
    Arguments,
    /// Comma separated expression list.
    ListExpression,
    /// Plain identifier.
    Identifier,
    /// Any keyword token.
    Keyword,
    /// Punctuation token.
    Punctuator,
    /// String literal.
    StringLiteral,
    /// Decimal numeric literal.
    DecimalLiteral,
    /// Hexadecimal numeric literal.
    HexLiteral,
    /// Octal numeric literal.
    Octal,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 28] = [
        Self::CompilationUnit,
        Self::PackageDecl,
        Self::ImportDirective,
        Self::Metadata,
        Self::ClassDef,
        Self::ClassName,
        Self::ClassIdentifiers,
        Self::Inheritance,
        Self::InterfaceDef,
        Self::Block,
        Self::FunctionDef,
        Self::FunctionName,
        Self::Parameters,
        Self::Parameter,
        Self::VariableDef,
        Self::Statement,
        Self::ExpressionStmt,
        Self::AssignmentExpr,
        Self::PrimaryExpr,
        Self::Arguments,
        Self::ListExpression,
        Self::Identifier,
        Self::Keyword,
        Self::Punctuator,
        Self::StringLiteral,
        Self::DecimalLiteral,
        Self::HexLiteral,
        Self::Octal,
    ];

    /// Returns the grammar name of this kind (e.g. `CLASS_DEF`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompilationUnit => "COMPILATION_UNIT",
            Self::PackageDecl => "PACKAGE_DECL",
            Self::ImportDirective => "IMPORT_DIRECTIVE",
            Self::Metadata => "METADATA",
            Self::ClassDef => "CLASS_DEF",
            Self::ClassName => "CLASS_NAME",
            Self::ClassIdentifiers => "CLASS_IDENTIFIERS",
            Self::Inheritance => "INHERITANCE",
            Self::InterfaceDef => "INTERFACE_DEF",
            Self::Block => "BLOCK",
            Self::FunctionDef => "FUNCTION_DEF",
            Self::FunctionName => "FUNCTION_NAME",
            Self::Parameters => "PARAMETERS",
            Self::Parameter => "PARAMETER",
            Self::VariableDef => "VARIABLE_DEF",
            Self::Statement => "STATEMENT",
            Self::ExpressionStmt => "EXPRESSION_STMT",
            Self::AssignmentExpr => "ASSIGNMENT_EXPR",
            Self::PrimaryExpr => "PRIMARY_EXPR",
            Self::Arguments => "ARGUMENTS",
            Self::ListExpression => "LIST_EXPRESSION",
            Self::Identifier => "IDENTIFIER",
            Self::Keyword => "KEYWORD",
            Self::Punctuator => "PUNCTUATOR",
            Self::StringLiteral => "STRING_LITERAL",
            Self::DecimalLiteral => "DECIMAL_LITERAL",
            Self::HexLiteral => "HEX_LITERAL",
            Self::Octal => "OCTAL",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown node kind name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown node kind: {0}")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    token: Option<String>,
    line: usize,
    column: usize,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
}

/// Errors raised while building a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// No node was added.
    #[error("Syntax tree is empty")]
    Empty,

    /// A second top-level node was opened after the root was closed.
    #[error("Syntax tree has more than one root ({kind} at line {line})")]
    MultipleRoots {
        /// Kind of the offending node.
        kind: NodeKind,
        /// Line of the offending node.
        line: usize,
    },

    /// `close()` called with no open node.
    #[error("close() called with no open node")]
    UnbalancedClose,

    /// Nodes were still open when the tree was finished.
    #[error("{0} node(s) left open")]
    Unclosed(usize),

    /// Lines are 1-based.
    #[error("Node {kind} has line 0; lines are 1-based")]
    ZeroLine {
        /// Kind of the offending node.
        kind: NodeKind,
    },

    /// Too many nodes for the arena index type.
    #[error("Syntax tree exceeds {} nodes", u32::MAX)]
    TooLarge,

    /// Malformed JSON dump.
    #[error("Invalid tree dump: {0}")]
    Json(#[from] serde_json::Error),
}

/// An immutable syntax tree for one source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.index() < self.nodes.len(), "node id out of range");
        Node { tree: self, id }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| Node {
            tree: self,
            id: NodeId(u32::try_from(i).unwrap_or(u32::MAX)),
        })
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Borrowed handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    fn at(&self, id: NodeId) -> Node<'t> {
        Node {
            tree: self.tree,
            id,
        }
    }

    /// Returns this node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns this node's kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Returns true if this node has the given kind.
    #[must_use]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    /// Returns the token text carried by this node itself, if any.
    #[must_use]
    pub fn token(&self) -> Option<&'t str> {
        self.data().token.as_deref()
    }

    /// Returns the text of the first token at or below this node.
    ///
    /// For a leaf this is its own token; for an inner node it is the first
    /// token found in document order (e.g. the callee of a call expression).
    #[must_use]
    pub fn token_value(&self) -> Option<&'t str> {
        if let Some(token) = self.token() {
            return Some(token);
        }
        // Descendants occupy the contiguous id range after this node.
        let end = self.subtree_end();
        self.tree.nodes[self.id.index() + 1..end]
            .iter()
            .find_map(|n| n.token.as_deref())
    }

    /// Returns the 1-based source line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.data().line
    }

    /// Returns the 1-based source column.
    #[must_use]
    pub fn column(&self) -> usize {
        self.data().column
    }

    /// Returns the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Iterates over the children in document order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Node<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Returns the number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// Returns true if this node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.data().children.is_empty()
    }

    /// Returns the first child.
    #[must_use]
    pub fn first_child(&self) -> Option<Node<'t>> {
        self.data().children.first().map(|&id| self.at(id))
    }

    /// Returns the last child.
    #[must_use]
    pub fn last_child(&self) -> Option<Node<'t>> {
        self.data().children.last().map(|&id| self.at(id))
    }

    /// Returns the first child of the given kind.
    #[must_use]
    pub fn first_child_of(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.is(kind))
    }

    /// Returns the sibling that follows this node under the same parent.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.data().parent?;
        let siblings = &self.tree.data(parent).children;
        siblings
            .get(self.data().index_in_parent + 1)
            .map(|&id| self.at(id))
    }

    /// One past the id of the last descendant.
    fn subtree_end(&self) -> usize {
        let mut node = *self;
        while let Some(last) = node.last_child() {
            node = last;
        }
        node.id.index() + 1
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("token", &self.token())
            .field("line", &self.line())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

/// Incremental builder for [`SyntaxTree`]s.
///
/// Nodes are added in document order: [`open`](Self::open) starts an inner
/// node, [`leaf`](Self::leaf) adds a token node under the currently open one,
/// and [`close`](Self::close) finishes the innermost open node. Errors are
/// deferred until [`finish`](Self::finish).
///
/// ```
/// use flexlint_core::{NodeKind, TreeBuilder};
///
/// let tree = TreeBuilder::new()
///     .open(NodeKind::CompilationUnit, 1)
///     .leaf(NodeKind::Octal, "017", 2)
///     .close()
///     .finish()
///     .unwrap();
/// assert_eq!(tree.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
    error: Option<TreeError>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an inner node at column 1.
    pub fn open(&mut self, kind: NodeKind, line: usize) -> &mut Self {
        self.open_at(kind, None, line, 1)
    }

    /// Opens an inner node with explicit token and position.
    pub fn open_at(
        &mut self,
        kind: NodeKind,
        token: Option<String>,
        line: usize,
        column: usize,
    ) -> &mut Self {
        if let Some(id) = self.push(kind, token, line, column) {
            self.open.push(id);
        }
        self
    }

    /// Adds a token node at column 1.
    pub fn leaf(&mut self, kind: NodeKind, token: impl Into<String>, line: usize) -> &mut Self {
        self.leaf_at(kind, token, line, 1)
    }

    /// Adds a token node with explicit position.
    pub fn leaf_at(
        &mut self,
        kind: NodeKind,
        token: impl Into<String>,
        line: usize,
        column: usize,
    ) -> &mut Self {
        self.push(kind, Some(token.into()), line, column);
        self
    }

    /// Closes the innermost open node.
    pub fn close(&mut self) -> &mut Self {
        if self.open.pop().is_none() {
            self.fail(TreeError::UnbalancedClose);
        }
        self
    }

    /// Finishes the tree.
    ///
    /// # Errors
    ///
    /// Returns the first structural error recorded while building, or an
    /// error if the tree is empty or nodes are still open.
    pub fn finish(&mut self) -> Result<SyntaxTree, TreeError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if self.nodes.is_empty() {
            return Err(TreeError::Empty);
        }
        if !self.open.is_empty() {
            return Err(TreeError::Unclosed(self.open.len()));
        }
        Ok(SyntaxTree {
            nodes: std::mem::take(&mut self.nodes),
        })
    }

    fn push(
        &mut self,
        kind: NodeKind,
        token: Option<String>,
        line: usize,
        column: usize,
    ) -> Option<NodeId> {
        if self.error.is_some() {
            return None;
        }
        if line == 0 {
            self.fail(TreeError::ZeroLine { kind });
            return None;
        }
        let parent = self.open.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            self.fail(TreeError::MultipleRoots { kind, line });
            return None;
        }
        let Ok(raw) = u32::try_from(self.nodes.len()) else {
            self.fail(TreeError::TooLarge);
            return None;
        };
        let id = NodeId(raw);
        let index_in_parent = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p.index()].children;
                siblings.push(id);
                siblings.len() - 1
            }
            None => 0,
        };
        self.nodes.push(NodeData {
            kind,
            token,
            line,
            column,
            parent,
            index_in_parent,
            children: Vec::new(),
        });
        Some(id)
    }

    fn fail(&mut self, error: TreeError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
