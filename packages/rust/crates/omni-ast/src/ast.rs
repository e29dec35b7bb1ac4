//! Typed views over untyped syntax nodes.
//!
//! Each wrapper is a zero-cost newtype around [`SyntaxNode`]; `cast` checks
//! the kind once so accessors can assume the shape the parser produces.

use std::fmt;

use serde::Serialize;

use crate::syntax_kind::{SyntaxKind, SyntaxKind::*, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:pat) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            /// Wrap `node` if it has the matching kind.
            #[must_use]
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                if matches!(node.kind(), $kind) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            /// Underlying syntax node.
            #[must_use]
            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// Class, struct, interface, record, enum or delegate declaration.
    TypeDecl,
    CLASS_DECL | STRUCT_DECL | INTERFACE_DECL | RECORD_DECL | ENUM_DECL | DELEGATE_DECL
);
ast_node!(
    /// `namespace N { }` or `namespace N;`.
    NamespaceDecl,
    NAMESPACE_DECL
);
ast_node!(
    /// `using N;`, `using static T;` or `using A = T;`.
    UsingDirective,
    USING_DIRECTIVE
);
ast_node!(
    /// Method declaration.
    MethodDecl,
    METHOD_DECL
);
ast_node!(
    /// Constructor declaration; its name refers to the enclosing type.
    ConstructorDecl,
    CONSTRUCTOR_DECL
);
ast_node!(
    /// Property declaration.
    PropertyDecl,
    PROPERTY_DECL
);
ast_node!(
    /// Field or field-like event declaration.
    FieldDecl,
    FIELD_DECL
);
ast_node!(
    /// Enum member.
    EnumMember,
    ENUM_MEMBER
);
ast_node!(
    /// Method, constructor, delegate, lambda or indexer parameter.
    Param,
    PARAM
);
ast_node!(
    /// Local variable declaration statement.
    LocalDecl,
    LOCAL_DECL
);
ast_node!(
    /// `T a = 1, b` shared by fields and locals.
    VarDecl,
    VAR_DECL
);
ast_node!(
    /// One `name = value` inside a [`VarDecl`].
    Declarator,
    DECLARATOR
);
ast_node!(
    /// Declared identifier.
    Name,
    NAME
);
ast_node!(
    /// Identifier in a referencing position.
    NameRef,
    NAME_REF
);
ast_node!(
    /// Written type, e.g. `Outer.Inner[]`.
    TypeRef,
    TYPE_REF
);
ast_node!(
    /// `receiver.name`.
    MemberAccessExpr,
    MEMBER_ACCESS_EXPR
);
ast_node!(
    /// `callee(args)`.
    CallExpr,
    CALL_EXPR
);
ast_node!(
    /// `new T(args) { init }` or target-typed `new(args)`.
    NewExpr,
    NEW_EXPR
);
ast_node!(
    /// One call or creation argument, possibly `name: value`.
    Arg,
    ARG
);

/// Flavor of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `record` or `record struct`
    Record,
    /// `enum`
    Enum,
    /// `delegate`
    Delegate,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Record => "record",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        })
    }
}

fn child<T>(node: &SyntaxNode, cast: fn(SyntaxNode) -> Option<T>) -> Option<T> {
    node.children().find_map(cast)
}

fn has_keyword(node: &SyntaxNode, keyword: &str) -> bool {
    node.children_with_tokens()
        .filter_map(rowan::NodeOrToken::into_token)
        .any(|t| t.kind() == KEYWORD && t.text() == keyword)
}

fn list_items(node: &SyntaxNode, list: SyntaxKind) -> impl Iterator<Item = SyntaxNode> {
    node.children()
        .filter(move |n| n.kind() == list)
        .flat_map(|list| list.children())
}

impl TypeDecl {
    /// Declared type name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Which kind of type this declares.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self.0.kind() {
            STRUCT_DECL => TypeKind::Struct,
            INTERFACE_DECL => TypeKind::Interface,
            RECORD_DECL => TypeKind::Record,
            ENUM_DECL => TypeKind::Enum,
            DELEGATE_DECL => TypeKind::Delegate,
            _ => TypeKind::Class,
        }
    }

    /// `partial` among the modifiers.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        has_keyword(&self.0, "partial")
    }

    /// Generic parameters, e.g. `T` in `class Box<T>`.
    pub fn type_params(&self) -> impl Iterator<Item = Name> {
        list_items(&self.0, TYPE_PARAM_LIST).filter_map(|p| child(&p, Name::cast))
    }

    /// Primary constructor or delegate parameters.
    pub fn params(&self) -> impl Iterator<Item = Param> {
        params_of(&self.0)
    }

    /// Return type of a delegate.
    #[must_use]
    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// Base types listed after `:`.
    pub fn base_types(&self) -> impl Iterator<Item = TypeRef> {
        list_items(&self.0, BASE_LIST).filter_map(TypeRef::cast)
    }

    /// Member nodes of a class, struct, interface or record body.
    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> {
        list_items(&self.0, MEMBER_LIST)
    }

    /// Members of an enum body.
    pub fn enum_members(&self) -> impl Iterator<Item = EnumMember> {
        list_items(&self.0, ENUM_MEMBER_LIST).filter_map(EnumMember::cast)
    }
}

impl NamespaceDecl {
    /// Dotted name; `N.M` yields `N` then `M`.
    pub fn segments(&self) -> impl Iterator<Item = NameRef> {
        self.0
            .children()
            .filter_map(TypeRef::cast)
            .take(1)
            .flat_map(|ty| ty.segments().collect::<Vec<_>>())
    }

    /// Declarations inside the namespace body.
    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> {
        list_items(&self.0, MEMBER_LIST)
    }
}

impl UsingDirective {
    /// Alias name of `using A = T;`.
    #[must_use]
    pub fn alias(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Imported namespace or type.
    #[must_use]
    pub fn target(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// `using static T;`
    #[must_use]
    pub fn is_static(&self) -> bool {
        has_keyword(&self.0, "static")
    }

    /// `global using N;`
    #[must_use]
    pub fn is_global(&self) -> bool {
        has_keyword(&self.0, "global")
    }
}

impl MethodDecl {
    /// Method name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Declared return type.
    #[must_use]
    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// Parameters in order.
    pub fn params(&self) -> impl Iterator<Item = Param> {
        params_of(&self.0)
    }

    /// `Interface.Method` explicit implementation.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.0.children().any(|n| n.kind() == EXPLICIT_IFACE)
    }
}

impl ConstructorDecl {
    /// The constructor's name, a reference to its type.
    #[must_use]
    pub fn name_ref(&self) -> Option<NameRef> {
        child(&self.0, NameRef::cast)
    }

    /// Parameters in order.
    pub fn params(&self) -> impl Iterator<Item = Param> {
        params_of(&self.0)
    }
}

fn params_of(node: &SyntaxNode) -> impl Iterator<Item = Param> {
    list_items(node, PARAM_LIST).filter_map(Param::cast)
}

impl PropertyDecl {
    /// Property name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Property type.
    #[must_use]
    pub fn ty(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }
}

impl FieldDecl {
    /// Declared variable group.
    #[must_use]
    pub fn var_decl(&self) -> Option<VarDecl> {
        child(&self.0, VarDecl::cast)
    }
}

impl VarDecl {
    /// Written type; `None` for `var`.
    #[must_use]
    pub fn ty(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// Declarators in order.
    pub fn declarators(&self) -> impl Iterator<Item = Declarator> {
        self.0.children().filter_map(Declarator::cast)
    }
}

impl Declarator {
    /// Declared name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Value after `=`.
    #[must_use]
    pub fn initializer(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_expr())
    }
}

impl EnumMember {
    /// Member name.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }
}

impl Param {
    /// Parameter name; absent in malformed parameter lists.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        child(&self.0, Name::cast)
    }

    /// Parameter type; `None` for implicitly typed lambda parameters.
    #[must_use]
    pub fn ty(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// `params T[] rest` or a default value makes the parameter optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.is_params()
            || self
                .0
                .children_with_tokens()
                .any(|e| e.kind() == EQ)
    }

    /// `params T[] rest`.
    #[must_use]
    pub fn is_params(&self) -> bool {
        self.0
            .children_with_tokens()
            .any(|e| e.kind() == PARAMS_KW)
    }
}

impl LocalDecl {
    /// Declared variable group.
    #[must_use]
    pub fn var_decl(&self) -> Option<VarDecl> {
        child(&self.0, VarDecl::cast)
    }
}

/// Identifier text without the verbatim `@` prefix.
fn unescaped(token: Option<SyntaxToken>) -> String {
    token
        .map(|t| {
            let text = t.text();
            text.strip_prefix('@').unwrap_or(text).to_string()
        })
        .unwrap_or_default()
}

impl Name {
    /// The identifier token.
    #[must_use]
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        ident_of(&self.0)
    }

    /// Identifier text, `@int` read as `int`; empty when the token is missing.
    #[must_use]
    pub fn text(&self) -> String {
        unescaped(self.ident_token())
    }
}

impl NameRef {
    /// The identifier token.
    #[must_use]
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        ident_of(&self.0)
    }

    /// Identifier text, `@int` read as `int`; empty when the token is missing.
    #[must_use]
    pub fn text(&self) -> String {
        unescaped(self.ident_token())
    }
}

fn ident_of(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(rowan::NodeOrToken::into_token)
        .find(|t| t.kind() == IDENT)
}

impl TypeRef {
    /// Dotted path segments, generics excluded.
    pub fn segments(&self) -> impl Iterator<Item = NameRef> {
        self.0.children().filter_map(NameRef::cast)
    }

    /// Dotted path as written, e.g. `Outer.Inner`.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments()
            .map(|s| s.text())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Keyword type such as `int`.
    #[must_use]
    pub fn predefined(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(rowan::NodeOrToken::into_token)
            .find(|t| t.kind() == PREDEFINED_TYPE)
    }

    /// `T[]`, `T?`, `T*` and tuples have no members of `T`.
    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        self.0.children_with_tokens().any(|e| {
            matches!(e.kind(), L_BRACK | QUESTION | L_PAREN) || (e.kind() == PUNCT && e.as_token().is_some_and(|t| t.text() == "*"))
        })
    }
}

impl MemberAccessExpr {
    /// Expression left of the dot.
    #[must_use]
    pub fn receiver(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_expr() || n.kind() == TYPE_REF)
    }

    /// Member name right of the dot.
    #[must_use]
    pub fn name_ref(&self) -> Option<NameRef> {
        child(&self.0, NameRef::cast)
    }
}

impl CallExpr {
    /// Called expression.
    #[must_use]
    pub fn callee(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_expr())
    }

    /// Arguments in order.
    pub fn args(&self) -> impl Iterator<Item = Arg> {
        list_items(&self.0, ARG_LIST).filter_map(Arg::cast)
    }
}

impl NewExpr {
    /// Constructed type; `None` for target-typed `new(...)`.
    #[must_use]
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0, TypeRef::cast)
    }

    /// Constructor arguments; `None` for `new T { ... }`.
    #[must_use]
    pub fn arg_count(&self) -> Option<usize> {
        self.0
            .children()
            .find(|n| n.kind() == ARG_LIST)
            .map(|list| list.children().filter(|n| n.kind() == ARG).count())
    }

    /// Object initializer `{ A = 1 }`.
    #[must_use]
    pub fn initializer(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == INITIALIZER_EXPR)
    }
}

impl Arg {
    /// `name` of a named argument `name: value`.
    #[must_use]
    pub fn name_ref(&self) -> Option<NameRef> {
        child(&self.0, NameRef::cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_type_decl_accessors() {
        let root = parse("public partial struct Point : IShape { int X; } enum Color { Red, Green = 2 }")
            .syntax_node();
        let decls: Vec<TypeDecl> = root.descendants().filter_map(TypeDecl::cast).collect();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].kind(), TypeKind::Struct);
        assert!(decls[0].is_partial());
        assert_eq!(decls[0].name().map(|n| n.text()).as_deref(), Some("Point"));
        assert_eq!(decls[0].base_types().next().map(|t| t.path()).as_deref(), Some("IShape"));
        assert_eq!(decls[0].members().count(), 1);
        assert_eq!(decls[1].kind(), TypeKind::Enum);
        assert!(!decls[1].is_partial());
        let names: Vec<String> = decls[1]
            .enum_members()
            .filter_map(|m| m.name())
            .map(|n| n.text())
            .collect();
        assert_eq!(names, vec!["Red", "Green"]);
    }

    #[test]
    fn test_interface_record_and_delegate_kinds() {
        let root = parse(
            "interface IRun<T> where T : class { void Run(T item); }\n\
             record Pair(int Left, int Right);\n\
             delegate int Op(int a, int b);",
        )
        .syntax_node();
        let decls: Vec<TypeDecl> = root.descendants().filter_map(TypeDecl::cast).collect();
        let kinds: Vec<TypeKind> = decls.iter().map(TypeDecl::kind).collect();
        assert_eq!(kinds, vec![TypeKind::Interface, TypeKind::Record, TypeKind::Delegate]);
        let type_params: Vec<String> = decls[0].type_params().map(|n| n.text()).collect();
        assert_eq!(type_params, vec!["T"]);
        assert_eq!(decls[1].params().count(), 2);
        assert_eq!(decls[2].params().count(), 2);
        assert!(decls[2].return_type().and_then(|t| t.predefined()).is_some());
    }

    #[test]
    fn test_method_and_params() {
        let root = parse("class A { Outer.Inner Get(int a, string[] b, int c = 0) { return null; } }")
            .syntax_node();
        let method = root
            .descendants()
            .find_map(MethodDecl::cast)
            .expect("method");
        assert_eq!(method.return_type().map(|t| t.path()).as_deref(), Some("Outer.Inner"));
        let params: Vec<Param> = method.params().collect();
        assert_eq!(params.len(), 3);
        assert!(params[1].ty().is_some_and(|t| t.is_wrapped()));
        assert!(!params[0].is_optional());
        assert!(params[2].is_optional());
    }

    #[test]
    fn test_verbatim_identifier_text() {
        let root = parse("class A { void @int(string @string) { } }").syntax_node();
        let names: Vec<String> = root
            .descendants()
            .filter_map(Name::cast)
            .map(|n| n.text())
            .collect();
        assert_eq!(names, vec!["A", "int", "string"]);
        let raw = root
            .descendants()
            .filter_map(Name::cast)
            .nth(1)
            .and_then(|n| n.ident_token())
            .map(|t| t.text().to_string());
        assert_eq!(raw.as_deref(), Some("@int"));
    }

    #[test]
    fn test_member_access_parts() {
        let root = parse("class A { void M() { this.Run(); } }").syntax_node();
        let access = root
            .descendants()
            .find_map(MemberAccessExpr::cast)
            .expect("member access");
        assert_eq!(access.receiver().map(|r| r.kind()), Some(THIS_EXPR));
        assert_eq!(access.name_ref().map(|n| n.text()).as_deref(), Some("Run"));
    }

    #[test]
    fn test_field_declarators() {
        let root = parse("class A { int a = 1, b; }").syntax_node();
        let field = root.descendants().find_map(FieldDecl::cast).expect("field");
        let var = field.var_decl().expect("variables");
        let names: Vec<String> = var
            .declarators()
            .filter_map(|d| d.name())
            .map(|n| n.text())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(var.declarators().next().and_then(|d| d.initializer()).is_some());
    }
}
