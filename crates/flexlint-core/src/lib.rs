//! # flexlint-core
//!
//! Core engine for rule-based analysis of syntax trees produced by an
//! external grammar.
//!
//! This crate provides the foundational traits and types for building
//! checks. It includes:
//!
//! - [`SyntaxTree`] and [`TreeBuilder`] for arena-backed trees
//! - [`Check`] / [`CheckVisitor`] for rules with per-file state
//! - [`Dispatcher`] for subscription-based traversal
//! - [`ScopeStack`] for explicit scope tracking
//! - [`Analyzer`] for orchestrating lint execution over tree dumps
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use flexlint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./build/ast")
//!     .check(MyCheck::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod check;
mod config;
mod context;
mod declarative;
mod dispatcher;
mod dump;
mod scope;
mod sink;
mod tree;
mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use check::{Check, CheckBox, CheckError, CheckVisitor};
pub use config::{AnalyzerConfig, Config, ConfigError, NodeRuleConfig, RuleConfig};
pub use context::CheckContext;
pub use declarative::{load_node_rules, NodeRule};
pub use dispatcher::{Dispatcher, DispatcherBuilder, RegistrationError};
pub use dump::{DumpNode, TreeDump};
pub use scope::ScopeStack;
pub use sink::{format_message, ViolationSink};
pub use tree::{Node, NodeId, NodeKind, SyntaxTree, TreeBuilder, TreeError, UnknownNodeKind};
pub use types::{
    FileFailure, FileReport, LintResult, Location, Severity, ToolDiagnostic, ToolDiagnosticKind,
    Violation, ViolationDiagnostic,
};
