//! Tests for the parser - tree shape and lossless recovery.

use omni_ast::{SyntaxKind, parse};

fn count(source: &str, kind: SyntaxKind) -> usize {
    parse(source)
        .syntax_node()
        .descendants()
        .filter(|n| n.kind() == kind)
        .count()
}

fn assert_clean(source: &str) {
    let parse = parse(source);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    assert_eq!(parse.syntax_node().text().to_string(), source);
}

#[test]
fn test_verbatim_keywords_are_names() {
    let source = "class Int32 { long @float; void @string(int @int) { } }";
    assert_clean(source);
    assert_eq!(count(source, SyntaxKind::NAME), 4);
}

#[test]
fn test_namespaces_and_usings() {
    let source = "using System.Text;\nusing static System.Math;\nnamespace App.Core { public class A { } struct B { } }";
    assert_clean(source);
    assert_eq!(count(source, SyntaxKind::USING_DIRECTIVE), 2);
    assert_eq!(count(source, SyntaxKind::NAMESPACE_DECL), 1);
    assert_eq!(count(source, SyntaxKind::CLASS_DECL), 1);
    assert_eq!(count(source, SyntaxKind::STRUCT_DECL), 1);
}

#[test]
fn test_statements_and_expressions() {
    let source = r#"
class A {
    int M(ref int a, out string b, params int[] rest) {
        var total = 0;
        while (total < 10) { total = total + a * 2; }
        if (!Done(total)) { return -1; } else { b = "x"; }
        foreach (var item in rest) { total += item; }
        return new Counter(total).Value;
    }
}"#;
    assert_clean(source);
    assert_eq!(count(source, SyntaxKind::PARAM), 3);
    assert_eq!(count(source, SyntaxKind::FOREACH_STMT), 1);
    assert_eq!(count(source, SyntaxKind::NEW_EXPR), 1);
    assert_eq!(count(source, SyntaxKind::CALL_EXPR), 1);
}

#[test]
fn test_interface_members_attributes_and_constraints() {
    let source = r#"
[Serializable]
public interface IStore<T> where T : class, new()
{
    [Obsolete("old")]
    T Load(int key);
    void Save(T value);
    int Count { get; }
    event System.EventHandler Changed;
}"#;
    assert_clean(source);
    assert_eq!(count(source, SyntaxKind::INTERFACE_DECL), 1);
    assert_eq!(count(source, SyntaxKind::METHOD_DECL), 2);
    assert_eq!(count(source, SyntaxKind::PROPERTY_DECL), 1);
    assert_eq!(count(source, SyntaxKind::CONSTRAINT_CLAUSE), 1);
    assert_eq!(count(source, SyntaxKind::ATTRIBUTE_LIST), 2);
}

#[test]
fn test_records_delegates_and_explicit_implementations() {
    let source = r#"
public record Point(int X, int Y);
public delegate int Combine(int left, int right);
class Store : IStore<string>
{
    string IStore<string>.Load(int key) => key.ToString();
}"#;
    assert_clean(source);
    assert_eq!(count(source, SyntaxKind::RECORD_DECL), 1);
    assert_eq!(count(source, SyntaxKind::DELEGATE_DECL), 1);
    assert_eq!(count(source, SyntaxKind::EXPLICIT_IFACE), 1);
    assert_eq!(count(source, SyntaxKind::PARAM), 5);
}

#[test]
fn test_preprocessor_branches_keep_both_arms() {
    let source = "class A {\n#if DEBUG\n    void Trace() { }\n#else\n    void Quiet() { }\n#endif\n}";
    let parse = parse(source);
    assert_eq!(parse.syntax_node().text().to_string(), source);
    assert_eq!(count(source, SyntaxKind::METHOD_DECL), 2);
}

#[test]
fn test_unterminated_input_round_trips() {
    let source = "class A { void M( { \"open";
    let parse = parse(source);
    assert!(!parse.errors().is_empty());
    assert_eq!(parse.syntax_node().text().to_string(), source);
}
