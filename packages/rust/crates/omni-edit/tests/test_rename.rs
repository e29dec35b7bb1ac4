//! Tests for whole-program renames produced by the type-name fix.

use omni_ast::{Program, SemanticModel, Span, SymbolKind};
use omni_edit::{FIX_TITLE, FixError, PlanError, TypeNameFix};
use omni_lint::{Analyzer, Category, Finding};
use tokio_util::sync::CancellationToken;

fn findings(program: &Program) -> Vec<Finding> {
    Analyzer::default().analyze(program).findings
}

fn only_finding(program: &Program, category: Category) -> Finding {
    findings(program)
        .into_iter()
        .find(|f| f.category == category)
        .unwrap()
}

#[test]
fn test_method_named_int_is_renamed_at_every_call() {
    let program = Program::from_sources([
        (
            "calc.cs",
            "class Calc {\n    void @int(string str) { }\n    void Run() { @int(\"a\"); this.@int(\"b\"); }\n}\n",
        ),
        ("other.cs", "class Other { void Go(Calc c) { c.@int(\"x\"); } }"),
    ]);
    let all = findings(&program);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].category, Category::Method);

    let model = SemanticModel::build(&program);
    let edit = TypeNameFix.fix(&model, &all[0], &CancellationToken::new()).unwrap();

    assert_eq!(
        edit.program().files()[0].text(),
        "class Calc {\n    void intValue(string str) { }\n    void Run() { intValue(\"a\"); this.intValue(\"b\"); }\n}\n"
    );
    assert_eq!(
        edit.program().files()[1].text(),
        "class Other { void Go(Calc c) { c.intValue(\"x\"); } }"
    );
    assert_eq!(edit.occurrences(), 4);
    assert_eq!(edit.plan.new_name, "intValue");
    assert!(findings(edit.program()).is_empty());
}

#[test]
fn test_type_rename_keeps_reference_count_and_leaves_no_old_bindings() {
    let program = Program::from_sources([
        (
            "int.cs",
            "class Int { Int(int seed) { } public static Int Parse(string s) { return new Int(1); } }",
        ),
        (
            "user.cs",
            "class User { Int value; Int Make() { var x = Int.Parse(\"1\"); return x; } }",
        ),
        ("untouched.cs", "class Untouched { }"),
    ]);
    let model = SemanticModel::build(&program);
    let class = model
        .symbols()
        .iter()
        .find(|s| s.kind == SymbolKind::Class && s.name == "Int")
        .unwrap()
        .id;
    let before = model.references_to(class).count();
    assert_eq!(before, 6);

    let finding = only_finding(&program, Category::Member);
    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();

    let after_model = SemanticModel::build(edit.program());
    let renamed = after_model
        .symbols()
        .iter()
        .find(|s| s.kind == SymbolKind::Class && s.name == "intValue")
        .unwrap()
        .id;
    assert_eq!(after_model.references_to(renamed).count(), before);
    assert!(after_model.references_named("Int").all(|r| r.target.is_none()));
    assert!(after_model.symbols().iter().all(|s| s.name != "Int"));

    assert!(edit.program().files()[1].text().contains("intValue.Parse"));
    assert_eq!(edit.changes.len(), 2);
}

#[test]
fn test_original_program_is_shared_and_unchanged() {
    let sources = [
        ("a.cs", "class A { long Single { get; } long M() { return this.Single; } }"),
        ("b.cs", "class B { }"),
    ];
    let program = Program::from_sources(sources);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Property);

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();

    for (file, (_, text)) in program.files().iter().zip(sources) {
        assert_eq!(file.text(), text);
    }
    assert!(std::ptr::eq::<omni_ast::GreenNodeData>(
        &**program.files()[1].green(),
        &**edit.program().files()[1].green()
    ));
    assert_ne!(edit.program().revision(), program.revision());
    assert!(edit.program().files()[0].text().contains("this.singleValue"));
}

#[test]
fn test_parameter_rename_stays_inside_its_method() {
    let program = Program::from_sources([(
        "a.cs",
        "class A { void M(int ptr) { Use(ptr); } void N(int p) { Use(p); } }",
    )]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Parameter);

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    assert_eq!(
        edit.program().files()[0].text(),
        "class A { void M(int ptrValue) { Use(ptrValue); } void N(int p) { Use(p); } }"
    );
}

#[test]
fn test_relocates_declaration_from_drifted_span() {
    let source = "class A { public void @int() { } }";
    let program = Program::from_sources([("a.cs", source)]);
    let model = SemanticModel::build(&program);
    let mut finding = only_finding(&program, Category::Method);
    let name_start = u32::try_from(source.find("@int()").unwrap()).unwrap();
    finding.location.span = Span {
        start: name_start,
        end: finding.location.span.end,
    };

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    assert_eq!(edit.program().files()[0].text(), "class A { public void intValue() { } }");
}

#[test]
fn test_diff_preview_and_metadata() {
    let program = Program::from_sources([("src/a.cs", "class A {\n    void @double() { }\n}\n")]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Method);

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    let diff = edit.diff();
    assert!(diff.contains("--- a/src/a.cs"));
    assert!(diff.contains("-    void @double() { }"));
    assert!(diff.contains("+    void doubleValue() { }"));
    assert_eq!(edit.changes[0].edits[0].line, 2);
    assert_eq!(edit.changes[0].edits[0].column, 10);

    assert_eq!(TypeNameFix.fixable_ids(), &["CA1720"]);
    assert_eq!(TypeNameFix.title(), FIX_TITLE);
    let json = serde_json::to_value(&edit).unwrap();
    assert_eq!(json["plan"]["new_name"], "doubleValue");
}

#[test]
fn test_namespace_qualified_type_is_renamed_across_files() {
    let program = Program::from_sources([
        (
            "lib.cs",
            "namespace Lib\n{\n    public class Int\n    {\n        public static Int Parse(string s) { return new Int(); }\n    }\n}\n",
        ),
        (
            "app.cs",
            "using Lib;\nclass App\n{\n    Lib.Int first;\n    Int second;\n    void Run() { var a = new Lib.Int(); var b = Lib.Int.Parse(\"1\"); }\n}\n",
        ),
    ]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Member);

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    assert_eq!(
        edit.program().files()[0].text(),
        "namespace Lib\n{\n    public class intValue\n    {\n        public static intValue Parse(string s) { return new intValue(); }\n    }\n}\n"
    );
    assert_eq!(
        edit.program().files()[1].text(),
        "using Lib;\nclass App\n{\n    Lib.intValue first;\n    intValue second;\n    void Run() { var a = new Lib.intValue(); var b = Lib.intValue.Parse(\"1\"); }\n}\n"
    );
    assert_eq!(edit.occurrences(), 7);
    assert!(findings(edit.program()).is_empty());
}

#[test]
fn test_only_the_flagged_overload_is_renamed() {
    let program = Program::from_sources([(
        "a.cs",
        "class Calc { void @int() { } void Twice(string s) { } void Run() { @int(); Twice(\"a\"); } }",
    )]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Method);
    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    assert!(edit.program().files()[0].text().contains("intValue();"));

    let overloaded = Program::from_sources([(
        "a.cs",
        "class Calc { void @int() { } void @int(string s) { } void Run() { @int(); @int(\"a\"); } }",
    )]);
    let model = SemanticModel::build(&overloaded);
    let first = only_finding(&overloaded, Category::Method);
    let edit = TypeNameFix.fix(&model, &first, &CancellationToken::new()).unwrap();
    assert_eq!(
        edit.program().files()[0].text(),
        "class Calc { void intValue() { } void @int(string s) { } void Run() { intValue(); @int(\"a\"); } }"
    );
    assert_eq!(edit.occurrences(), 2);
}

#[test]
fn test_call_matching_several_overloads_is_refused() {
    let program = Program::from_sources([(
        "a.cs",
        "class Calc { void @int(int a) { } void @int(int a, int b = 0) { } void Run() { @int(1); } }",
    )]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Method);

    let err = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap_err();
    assert!(matches!(
        err,
        FixError::Plan(PlanError::AmbiguousReference { ref name, .. }) if name == "int"
    ));
}

#[test]
fn test_interface_type_and_implementing_base_list() {
    let program = Program::from_sources([
        ("shape.cs", "public interface Single { double Area(); }"),
        ("square.cs", "public class Square : Single { public double Area() { return 1; } }"),
    ]);
    let model = SemanticModel::build(&program);
    let finding = only_finding(&program, Category::Member);

    let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
    assert_eq!(
        edit.program().files()[0].text(),
        "public interface singleValue { double Area(); }"
    );
    assert_eq!(
        edit.program().files()[1].text(),
        "public class Square : singleValue { public double Area() { return 1; } }"
    );
}

#[test]
fn test_interface_member_and_its_implementation_are_not_renamed_alone() {
    let program = Program::from_sources([
        ("shape.cs", "public interface IShape { double Double(); }"),
        ("square.cs", "public class Square : IShape { public double Double() { return 1; } }"),
    ]);
    let model = SemanticModel::build(&program);
    let all = findings(&program);
    assert_eq!(all.len(), 2);

    for finding in &all {
        let err = TypeNameFix.fix(&model, finding, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, FixError::Plan(PlanError::LinkedMember { .. })), "{err}");
    }
}
