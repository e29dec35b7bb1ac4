//! Tests for failure modes: cancellation, stale snapshots, unresolved findings
//! and conflicts found after rewriting.

use omni_ast::{Program, SemanticModel, SymbolKind};
use omni_edit::{FixError, PlanError, ReferenceRewriter, RenamePlan, RenamePlanner, RewriteError, TypeNameFix};
use omni_lint::{Analyzer, Finding};
use tokio_util::sync::CancellationToken;

const SOURCE: &str = "class A { void @int() { } void M() { @int(); } }";

fn first_finding(program: &Program) -> Finding {
    Analyzer::default().analyze(program).findings.remove(0)
}

fn manual_plan(model: &SemanticModel, name: &str, new_name: &str) -> RenamePlan {
    let symbol = model.symbols().iter().find(|s| s.name == name).unwrap();
    RenamePlan {
        symbol: symbol.id,
        kind: symbol.kind,
        old_name: symbol.name.clone(),
        new_name: new_name.to_string(),
        revision: model.revision(),
        file: symbol.file,
        name_span: symbol.name_span,
    }
}

#[test]
fn test_cancelled_before_planning() {
    let program = Program::from_sources([("a.cs", SOURCE)]);
    let model = SemanticModel::build(&program);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = RenamePlanner::new(&model)
        .plan(&first_finding(&program), &cancel)
        .unwrap_err();
    assert_eq!(err, PlanError::Cancelled);
}

#[test]
fn test_cancelled_before_apply() {
    let program = Program::from_sources([("a.cs", SOURCE)]);
    let model = SemanticModel::build(&program);
    let plan = RenamePlanner::new(&model)
        .plan(&first_finding(&program), &CancellationToken::new())
        .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = ReferenceRewriter::new(&model).apply(&plan, &cancel).unwrap_err();
    assert_eq!(err, RewriteError::Cancelled);
    assert_eq!(program.files()[0].text(), SOURCE);
}

#[test]
fn test_plan_from_other_snapshot_is_stale() {
    let program = Program::from_sources([("a.cs", SOURCE)]);
    let model = SemanticModel::build(&program);
    let plan = RenamePlanner::new(&model)
        .plan(&first_finding(&program), &CancellationToken::new())
        .unwrap();

    let edit = ReferenceRewriter::new(&model)
        .apply(&plan, &CancellationToken::new())
        .unwrap();
    let next = SemanticModel::build(edit.program());
    let err = ReferenceRewriter::new(&next)
        .apply(&plan, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, RewriteError::StaleSnapshot { expected, .. } if expected == program.revision()));
}

#[test]
fn test_finding_that_no_longer_matches_is_unresolved() {
    let old = Program::from_sources([("a.cs", "class A { void @int() { } }")]);
    let finding = first_finding(&old);
    let changed = Program::from_sources([("a.cs", "class A { void foo() { } }")]);
    let model = SemanticModel::build(&changed);

    let err = RenamePlanner::new(&model)
        .plan(&finding, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, PlanError::UnresolvedSymbol { .. }));
}

#[test]
fn test_other_rules_are_not_fixable() {
    let program = Program::from_sources([("a.cs", SOURCE)]);
    let model = SemanticModel::build(&program);
    let mut finding = first_finding(&program);
    finding.id = "CA1715";

    let err = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap_err();
    assert_eq!(err, FixError::NotFixable("CA1715".to_string()));
}

#[test]
fn test_new_violation_is_rejected_after_rewrite() {
    let program = Program::from_sources([("a.cs", "class A { void foo() { } void M() { foo(); } }")]);
    let model = SemanticModel::build(&program);
    let plan = manual_plan(&model, "foo", "string");

    let err = ReferenceRewriter::new(&model)
        .apply(&plan, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, RewriteError::CrossFileConflict { ref path, .. } if path == "a.cs"));
}

#[test]
fn test_changed_resolution_is_rejected_after_rewrite() {
    let program = Program::from_sources([
        ("a.cs", "class A { int bar; void foo() { } void M() { foo(); } }"),
        ("b.cs", "class B { void N(A a) { a.foo(); } }"),
    ]);
    let model = SemanticModel::build(&program);
    let plan = manual_plan(&model, "foo", "bar");
    assert_eq!(plan.kind, SymbolKind::Method);

    let err = ReferenceRewriter::new(&model)
        .apply(&plan, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, RewriteError::CrossFileConflict { .. }));
    assert_eq!(
        program.files()[0].text(),
        "class A { int bar; void foo() { } void M() { foo(); } }"
    );
}

#[test]
fn test_symbol_from_another_model_is_unresolved() {
    let program = Program::from_sources([("a.cs", SOURCE)]);
    let model = SemanticModel::build(&program);
    let other = SemanticModel::build(&Program::from_sources([(
        "b.cs",
        "class B { int a; int b; int c; int d; int e; int f; int g; void @int() { } }",
    )]));
    let foreign = other.symbols().last().unwrap().id;
    assert!(model.symbol(foreign).is_none());

    let err = RenamePlanner::new(&model)
        .plan_symbol(foreign, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, PlanError::UnresolvedSymbol { ref path, .. } if path == "<unknown>"));
}
