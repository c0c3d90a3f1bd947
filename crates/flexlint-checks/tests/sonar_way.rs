//! Integration test: the sonar-way preset over whole compilation units.

use flexlint_checks::{rules_for_config, Preset};
use flexlint_core::{Config, Dispatcher, FileReport, NodeKind, SyntaxTree, TreeBuilder};
use std::path::Path;

fn dispatcher() -> Dispatcher {
    let mut builder = Dispatcher::builder();
    for rule in rules_for_config(&Config::default()).expect("rules") {
        builder = builder.check_box(rule);
    }
    builder.build().expect("dispatcher")
}

/// ```text
/// 1 package {
/// 2   class Widget {
/// 3     function Widget() {
/// 4       var mode = 0755;
/// 5       dispatchEvent(new Event("created"));
/// 6       dispatchEvent();
/// 7     }
/// 8     function show() { dispatchEvent(ev); }
/// 9   }
/// 10 }
/// ```
fn widget() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::CompilationUnit, 1)
        .open(NodeKind::PackageDecl, 1)
        .open(NodeKind::ClassDef, 2)
        .open(NodeKind::ClassName, 2)
        .open(NodeKind::ClassIdentifiers, 2)
        .leaf(NodeKind::Identifier, "Widget", 2)
        .close()
        .close()
        .open(NodeKind::Block, 2);

    b.open(NodeKind::FunctionDef, 3)
        .open(NodeKind::FunctionName, 3)
        .leaf(NodeKind::Identifier, "Widget", 3)
        .close()
        .open(NodeKind::Block, 3);
    b.open(NodeKind::VariableDef, 4)
        .leaf(NodeKind::Identifier, "mode", 4)
        .leaf(NodeKind::Octal, "0755", 4)
        .close();
    call(&mut b, 5, true);
    call(&mut b, 6, false);
    b.close().close();

    b.open(NodeKind::FunctionDef, 8)
        .open(NodeKind::FunctionName, 8)
        .leaf(NodeKind::Identifier, "show", 8)
        .close()
        .open(NodeKind::Block, 8);
    call(&mut b, 8, true);
    b.close().close();

    b.close().close().close().close();
    b.finish().expect("widget tree")
}

fn call(b: &mut TreeBuilder, line: usize, with_argument: bool) {
    b.open(NodeKind::ExpressionStmt, line)
        .open(NodeKind::PrimaryExpr, line)
        .leaf(NodeKind::Identifier, "dispatchEvent", line)
        .close()
        .open(NodeKind::Arguments, line);
    if with_argument {
        b.open(NodeKind::ListExpression, line)
            .leaf(NodeKind::Identifier, "ev", line)
            .close();
    }
    b.close().close();
}

/// A file without classes that calls `dispatchEvent(ev)` at line 1.
fn script() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.open(NodeKind::CompilationUnit, 1);
    call(&mut b, 1, true);
    b.close();
    b.finish().expect("script tree")
}

fn summary(report: &FileReport) -> Vec<(&str, usize)> {
    report
        .violations
        .iter()
        .map(|v| (v.code.as_str(), v.line()))
        .collect()
}

#[test]
fn reports_both_rules_in_document_order() {
    let report = dispatcher().run(&widget(), Path::new("Widget.as"));
    assert_eq!(summary(&report), [("S1314", 4), ("S1467", 5)]);
    assert!(report.diagnostics.is_empty());
    assert_eq!(
        report.violations[1].message,
        "Remove this event dispatch from the Widget constructor"
    );
}

#[test]
fn repeated_runs_are_identical() {
    let dispatcher = dispatcher();
    let tree = widget();
    let first = dispatcher.run(&tree, Path::new("Widget.as"));
    let second = dispatcher.run(&tree, Path::new("Widget.as"));
    assert_eq!(first, second);
}

#[test]
fn no_state_carries_over_between_files() {
    let dispatcher = dispatcher();
    let _ = dispatcher.run(&widget(), Path::new("Widget.as"));
    let report = dispatcher.run(&script(), Path::new("script.as"));
    assert!(report.violations.is_empty());
}

#[test]
fn one_dispatcher_serves_many_threads() {
    let dispatcher = dispatcher();
    let tree = widget();
    let expected = dispatcher.run(&tree, Path::new("Widget.as"));

    let (dispatcher, tree) = (&dispatcher, &tree);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || dispatcher.run(tree, Path::new("Widget.as"))))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("worker"), expected);
        }
    });
}

#[test]
fn all_preset_matches_sonar_way() {
    let config = Config::default();
    let names: Vec<String> = Preset::All
        .rules(&config)
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, ["constructor-calls-dispatch-event", "octal-value"]);
}
