//! Tests for the identifier rule - banned names across categories and casings.

use omni_ast::Program;
use omni_lint::{Analyzer, Category, IdentifierRule, RuleConfig, TYPE_NAMES};

fn casings(name: &str) -> Vec<String> {
    let mut first_upper = name.to_string();
    if let Some(first) = first_upper.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    vec![name.to_string(), name.to_uppercase(), first_upper]
}

#[test]
fn test_every_banned_name_in_every_casing_is_flagged_once() {
    let analyzer = Analyzer::default();
    for name in TYPE_NAMES {
        for spelled in casings(name) {
            let source = format!("class Holder {{ void Run(int @{spelled}) {{ }} }}");
            let program = Program::from_sources([("a.cs", source.as_str())]);
            let report = analyzer.analyze(&program);
            assert_eq!(report.findings.len(), 1, "{spelled}");
            assert_eq!(report.findings[0].category, Category::Parameter);
            assert_eq!(report.findings[0].identifier, spelled);
        }
    }
}

#[test]
fn test_every_banned_name_in_every_casing_and_category() {
    let analyzer = Analyzer::default();
    for name in TYPE_NAMES {
        for spelled in casings(name) {
            let source = format!(
                "class @{spelled} {{ }}\n\
                 class MethodHolder {{ void @{spelled}() {{ }} }}\n\
                 class PropertyHolder {{ int @{spelled} {{ get; }} }}\n\
                 class ParameterHolder {{ void Run(int @{spelled}) {{ }} }}"
            );
            let program = Program::from_sources([("a.cs", source.as_str())]);
            let report = analyzer.analyze(&program);
            let categories: Vec<Category> = report.findings.iter().map(|f| f.category).collect();
            assert_eq!(
                categories,
                vec![
                    Category::Member,
                    Category::Method,
                    Category::Property,
                    Category::Parameter
                ],
                "{spelled}"
            );
            assert!(report.findings.iter().all(|f| f.identifier == spelled), "{spelled}");
            assert!(
                report
                    .findings
                    .iter()
                    .all(|f| f.message.contains(&format!("'{spelled}'"))),
                "{spelled}"
            );
        }
    }
}

#[test]
fn test_names_outside_the_set_are_not_flagged() {
    let source = "class Integers { int Count { get; } void intValue(int strings, int pointer2) { } }";
    let program = Program::from_sources([("a.cs", source)]);
    assert!(Analyzer::default().analyze(&program).findings.is_empty());
}

#[test]
fn test_categories_and_messages() {
    let source = r"
struct Guid { }
class Holder {
    long Single { get; set; }
    void @int(string str) { }
    void Use(object obj) { }
}";
    let program = Program::from_sources([("a.cs", source)]);
    let report = Analyzer::default().analyze(&program);
    let messages: Vec<&str> = report.findings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Member 'Guid' contains type name",
            "Property 'Single' contains type name",
            "Method 'int' contains type name",
            "Parameter 'obj' contains type name",
        ]
    );
    assert_eq!(report.findings[0].title(), "Member name contains type name");
    assert!(report.findings.iter().all(|f| f.id == "CA1720"));
}

#[test]
fn test_method_scenario_yields_exactly_one_method_finding() {
    let program = Program::from_sources([("a.cs", "class A { void @int(string str) { } }")]);
    let report = Analyzer::default().analyze(&program);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].category, Category::Method);
}

#[test]
fn test_parameters_only_variant() {
    let rule = IdentifierRule::new(RuleConfig::parameters_only(), omni_lint::BannedNameSet::standard());
    let program = Program::from_sources([("a.cs", "class Double { void @int(string @str, int ptr) { } }")]);
    let report = Analyzer::new(rule).analyze(&program);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].identifier, "ptr");
}
