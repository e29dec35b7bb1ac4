//! Tests for the analysis driver - ordering, fault isolation, directory loading.

use std::fs;

use omni_ast::{LoadConfig, Program, SourceFile, SyntaxKind, SyntaxNode};
use omni_lint::{Analyzer, Finding, IdentifierRule, NodeRule};

/// Panics on every method, otherwise defers to the real rule.
struct ExplodingRule(IdentifierRule<'static>);

impl NodeRule for ExplodingRule {
    fn evaluate(&self, file: &SourceFile, node: &SyntaxNode) -> Option<Finding> {
        assert!(node.kind() != SyntaxKind::METHOD_DECL, "boom");
        self.0.evaluate(file, node)
    }
}

#[test]
fn test_findings_sorted_by_file_and_offset() {
    let program = Program::from_sources([
        ("a.cs", "class A { void M(int ptr, int obj) { } }"),
        ("b.cs", "class String { }"),
    ]);
    let report = Analyzer::default().analyze(&program);
    let order: Vec<(&str, &str)> = report
        .findings
        .iter()
        .map(|f| (f.location.path.as_str(), f.identifier.as_str()))
        .collect();
    assert_eq!(order, vec![("a.cs", "ptr"), ("a.cs", "obj"), ("b.cs", "String")]);
    assert_eq!(report.files_scanned, 2);
}

#[test]
fn test_panicking_node_becomes_fault_and_pass_continues() {
    let program = Program::from_sources([("a.cs", "class Int { void M(int ptr) { } }")]);
    let report = Analyzer::new(ExplodingRule(IdentifierRule::default())).analyze(&program);

    assert_eq!(report.faults.len(), 1);
    assert!(report.faults[0].message.contains("boom"));
    let names: Vec<&str> = report.findings.iter().map(|f| f.identifier.as_str()).collect();
    assert_eq!(names, vec!["Int", "ptr"]);
    assert!(!report.is_clean());
}

#[test]
fn test_analyze_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.cs"), "class Pointer { }").unwrap();
    fs::write(dir.path().join("two.cs"), "class Fine { }").unwrap();

    let (program, report) = Analyzer::default()
        .analyze_dir(dir.path(), &LoadConfig::default())
        .unwrap();
    assert_eq!(program.files().len(), 2);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].location.line, 1);
}

#[test]
fn test_report_serializes() {
    let program = Program::from_sources([("a.cs", "class A { long Float => 1; }")]);
    let report = Analyzer::default().analyze(&program);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["findings"][0]["category"], "property");
    assert_eq!(json["findings"][0]["severity"], "error");
    assert_eq!(json["findings"][0]["id"], "CA1720");
}
