//! Tree builders shaped like the grammar's output, for check tests.

use flexlint_core::{Check, Dispatcher, FileReport, NodeKind, SyntaxTree, TreeBuilder};
use std::path::Path;

/// Runs one check over `tree`.
pub fn run<C: Check + 'static>(check: C, tree: &SyntaxTree) -> FileReport {
    Dispatcher::builder()
        .check(check)
        .build()
        .expect("dispatcher")
        .run(tree, Path::new("Test.as"))
}

/// `class <name> {` up to the opening of the class block.
pub fn open_class(b: &mut TreeBuilder, name: &str, line: usize) {
    b.open(NodeKind::ClassDef, line)
        .leaf(NodeKind::Keyword, "class", line)
        .open(NodeKind::ClassName, line)
        .open(NodeKind::ClassIdentifiers, line)
        .leaf(NodeKind::Identifier, name, line)
        .close()
        .close()
        .open(NodeKind::Block, line);
}

pub fn close_class(b: &mut TreeBuilder) {
    b.close().close();
}

/// `function <name>() {` up to the opening of the body.
pub fn open_function(b: &mut TreeBuilder, name: &str, line: usize) {
    b.open(NodeKind::FunctionDef, line)
        .leaf(NodeKind::Keyword, "function", line)
        .open(NodeKind::FunctionName, line)
        .leaf(NodeKind::Identifier, name, line)
        .close()
        .open(NodeKind::Parameters, line)
        .close()
        .open(NodeKind::Block, line);
}

pub fn close_function(b: &mut TreeBuilder) {
    b.close().close();
}

/// `<name>(<arg>);` as a statement.
pub fn call(b: &mut TreeBuilder, name: &str, arg: Option<&str>, line: usize) {
    b.open(NodeKind::Statement, line)
        .open(NodeKind::ExpressionStmt, line)
        .open(NodeKind::PrimaryExpr, line)
        .leaf(NodeKind::Identifier, name, line)
        .close()
        .open(NodeKind::Arguments, line)
        .leaf(NodeKind::Punctuator, "(", line);
    if let Some(arg) = arg {
        b.open(NodeKind::ListExpression, line)
            .leaf(NodeKind::Identifier, arg, line)
            .close();
    }
    b.leaf(NodeKind::Punctuator, ")", line)
        .close()
        .close()
        .close();
}

/// A class with calls placed in its constructor and methods.
pub struct ClassSpec {
    name: &'static str,
    constructor_calls: Vec<(usize, Option<&'static str>)>,
    method_calls: Vec<(&'static str, usize, Option<&'static str>)>,
}

impl ClassSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            constructor_calls: Vec::new(),
            method_calls: Vec::new(),
        }
    }

    /// `dispatchEvent(<arg>)` at `line`, inside the constructor.
    pub fn constructor_call(mut self, line: usize, arg: Option<&'static str>) -> Self {
        self.constructor_calls.push((line, arg));
        self
    }

    /// `dispatchEvent(<arg>)` at `line`, inside method `method`.
    pub fn method_call(mut self, method: &'static str, line: usize, arg: Option<&'static str>) -> Self {
        self.method_calls.push((method, line, arg));
        self
    }
}

/// Adds the class described by `spec` under the currently open node.
pub fn push_class(b: &mut TreeBuilder, spec: &ClassSpec) {
    open_class(b, spec.name, 1);
    if !spec.constructor_calls.is_empty() {
        open_function(b, spec.name, 2);
        for &(line, arg) in &spec.constructor_calls {
            call(b, "dispatchEvent", arg, line);
        }
        close_function(b);
    }
    for &(method, line, arg) in &spec.method_calls {
        open_function(b, method, line);
        call(b, "dispatchEvent", arg, line);
        close_function(b);
    }
    close_class(b);
}

/// A compilation unit holding the single class described by `spec`.
pub fn class(spec: ClassSpec) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::CompilationUnit, 1);
    push_class(&mut b, &spec);
    b.close();
    b.finish().expect("fixture tree")
}
