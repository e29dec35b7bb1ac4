//! C# parsing: tree-sitter's C# grammar lowered into a lossless `rowan` tree.
//!
//! tree-sitter produces the concrete tree; the lowering walks it with field
//! names and folds the grammar into the smaller [`SyntaxKind`] set that name
//! resolution reads. Bytes between tree-sitter tokens become whitespace
//! tokens, so the tree text always equals the input. Parsing never fails:
//! `ERROR` and missing nodes are kept as [`ParseError`]s.

use rowan::{GreenNode, GreenNodeBuilder};
use serde::Serialize;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::syntax_kind::{SyntaxKind, SyntaxKind::*, SyntaxNode};

/// A recoverable syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Byte offset of the offending syntax.
    pub offset: u32,
}

/// Result of parsing one source text.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Immutable green tree (cheap to clone, shareable across threads).
    #[must_use]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Fresh red-tree root for traversal.
    #[must_use]
    pub fn syntax_node(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Errors recovered during parsing.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Split into the tree and its errors.
    #[must_use]
    pub fn into_parts(self) -> (GreenNode, Vec<ParseError>) {
        (self.green, self.errors)
    }
}

/// Parse a complete source file.
#[must_use]
pub fn parse(text: &str) -> Parse {
    let mut lowering = Lowering::new(text);
    match parse_tree(text) {
        Some(tree) => lowering.source_file(tree.root_node()),
        None => lowering.unparsed(),
    }
    lowering.finish()
}

fn parse_tree(text: &str) -> Option<Tree> {
    let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&language) {
        tracing::warn!(error = %err, "tree-sitter rejected the C# grammar");
        return None;
    }
    parser.parse(text, None)
}

/// Field tag for `#if` directive pieces hoisted out of conditional blocks.
const DIRECTIVE: &str = "#directive";

/// Declarations whose `name` field introduces a new name.
const DECLARING: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "delegate_declaration",
    "method_declaration",
    "property_declaration",
    "event_declaration",
    "enum_member_declaration",
    "parameter",
    "type_parameter",
    "variable_declarator",
    "local_function_statement",
    "catch_declaration",
    "declaration_expression",
    "declaration_pattern",
    "recursive_pattern",
    "var_pattern",
    "tuple_pattern",
    "parenthesized_variable_designation",
    "from_clause",
    "let_clause",
    "join_clause",
    "join_into_clause",
    "query_continuation",
    "using_directive",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Declared name.
    Decl,
    /// Name resolved against something else (member, type, parameter).
    Ref,
    /// Bare token, never resolved.
    Token,
    /// Simple name expression.
    Value,
}

fn name_role(parent: &str, field: Option<&str>) -> Role {
    match (parent, field) {
        (
            "constructor_declaration"
            | "destructor_declaration"
            | "member_access_expression"
            | "member_binding_expression"
            | "argument",
            Some("name"),
        ) => Role::Ref,
        ("accessor_declaration" | "extern_alias_directive" | "tuple_element" | "attribute_argument", _)
        | ("alias_qualified_name", Some("alias"))
        | ("labeled_statement" | "goto_statement", None) => Role::Token,
        ("foreach_statement", Some("left")) => Role::Decl,
        (parent, Some("name")) if DECLARING.contains(&parent) => Role::Decl,
        _ => Role::Value,
    }
}

/// Whether `kind` sits where the grammar expects a type.
fn is_type_position(parent: &str, field: Option<&str>, kind: &str) -> bool {
    if matches!(
        kind,
        "predefined_type"
            | "array_type"
            | "nullable_type"
            | "pointer_type"
            | "tuple_type"
            | "ref_type"
            | "scoped_type"
            | "function_pointer_type"
            | "implicit_type"
            | "alias_qualified_name"
    ) {
        return true;
    }
    match (parent, field) {
        (_, Some("type" | "returns"))
        | ("as_expression" | "is_expression", Some("right"))
        | ("attribute" | "namespace_declaration" | "file_scoped_namespace_declaration", Some("name")) => true,
        ("base_list", None) => !matches!(kind, "argument_list" | "primary_constructor_base_type"),
        ("type_argument_list" | "explicit_interface_specifier", None) => true,
        ("type_parameter_constraints_clause", None) => kind == "identifier",
        ("using_directive", field) => field != Some("name"),
        _ => false,
    }
}

/// Lowered kind of a tree-sitter node; `None` lowers only its children.
fn node_kind(kind: &str) -> Option<SyntaxKind> {
    let lowered = match kind {
        "modifier" | "catch_declaration" | "primary_constructor_base_type" | "type_parameter_constraint" => {
            return None;
        }
        "compilation_unit" => SOURCE_FILE,
        "using_directive" => USING_DIRECTIVE,
        "namespace_declaration" | "file_scoped_namespace_declaration" => NAMESPACE_DECL,
        "class_declaration" => CLASS_DECL,
        "struct_declaration" => STRUCT_DECL,
        "interface_declaration" => INTERFACE_DECL,
        "record_declaration" => RECORD_DECL,
        "enum_declaration" => ENUM_DECL,
        "delegate_declaration" => DELEGATE_DECL,
        "attribute_list" | "global_attribute" => ATTRIBUTE_LIST,
        "attribute" => ATTRIBUTE,
        "type_argument_list" => TYPE_ARG_LIST,
        "type_parameter_list" => TYPE_PARAM_LIST,
        "type_parameter" => TYPE_PARAM,
        "type_parameter_constraints_clause" => CONSTRAINT_CLAUSE,
        "base_list" => BASE_LIST,
        "declaration_list" => MEMBER_LIST,
        "enum_member_declaration_list" => ENUM_MEMBER_LIST,
        "enum_member_declaration" => ENUM_MEMBER,
        "method_declaration" => METHOD_DECL,
        "constructor_declaration" => CONSTRUCTOR_DECL,
        "destructor_declaration" => DESTRUCTOR_DECL,
        "operator_declaration" | "conversion_operator_declaration" => OPERATOR_DECL,
        "property_declaration" => PROPERTY_DECL,
        "indexer_declaration" => INDEXER_DECL,
        "event_declaration" => EVENT_DECL,
        "field_declaration" | "event_field_declaration" => FIELD_DECL,
        "accessor_list" => ACCESSOR_LIST,
        "accessor_declaration" => ACCESSOR,
        "explicit_interface_specifier" => EXPLICIT_IFACE,
        "constructor_initializer" => CTOR_INITIALIZER,
        "parameter" => PARAM,
        "arrow_expression_clause" => EXPR_BODY,
        "block" | "switch_body" => BLOCK,
        "local_declaration_statement" => LOCAL_DECL,
        "variable_declaration" => VAR_DECL,
        "variable_declarator" => DECLARATOR,
        "local_function_statement" => LOCAL_FUNCTION,
        "for_statement" => FOR_STMT,
        "foreach_statement" => FOREACH_STMT,
        "using_statement" | "fixed_statement" => USING_STMT,
        "catch_clause" => CATCH_CLAUSE,
        "object_creation_expression" | "implicit_object_creation_expression" => NEW_EXPR,
        "initializer_expression" => INITIALIZER_EXPR,
        "parenthesized_expression" => PAREN_EXPR,
        "cast_expression" | "as_expression" => CAST_EXPR,
        "member_access_expression" => MEMBER_ACCESS_EXPR,
        "member_binding_expression" => MEMBER_BINDING_EXPR,
        "conditional_access_expression" => CONDITIONAL_ACCESS_EXPR,
        "invocation_expression" => CALL_EXPR,
        "argument_list" | "bracketed_argument_list" => ARG_LIST,
        "argument" => ARG,
        "assignment_expression" | "with_initializer" => ASSIGN_EXPR,
        "with_expression" => WITH_EXPR,
        "lambda_expression" | "anonymous_method_expression" => LAMBDA_EXPR,
        "interpolated_string_expression" => LITERAL,
        kind if kind.ends_with("_literal") => LITERAL,
        kind if kind.ends_with("_statement") => STMT,
        kind if kind.ends_with("_pattern")
            || kind.ends_with("pattern_clause")
            || kind == "subpattern"
            || kind == "parenthesized_variable_designation" =>
        {
            PATTERN
        }
        kind if kind.ends_with("_expression") => EXPR,
        _ => CLAUSE,
    };
    Some(lowered)
}

/// Kind of a leaf token.
fn token_kind(node: Node<'_>) -> SyntaxKind {
    let kind = node.kind();
    match kind {
        "identifier" => IDENT,
        "predefined_type" => PREDEFINED_TYPE,
        "implicit_type" | "var" => VAR_KW,
        "this" => THIS_KW,
        "base" => BASE_KW,
        "params" => PARAMS_KW,
        "." => DOT,
        "," => COMMA,
        ";" => SEMICOLON,
        ":" => COLON,
        "(" => L_PAREN,
        ")" => R_PAREN,
        "[" => L_BRACK,
        "]" => R_BRACK,
        "{" => L_CURLY,
        "}" => R_CURLY,
        "<" => L_ANGLE,
        ">" => R_ANGLE,
        "=" => EQ,
        "?" => QUESTION,
        "=>" => FAT_ARROW,
        "discard" => PUNCT,
        "modifier" => KEYWORD,
        _ if node.is_named() => LITERAL_TOKEN,
        _ if kind.starts_with(|c: char| c.is_ascii_alphabetic()) => KEYWORD,
        _ => PUNCT,
    }
}

/// `this` and `base` are expressions everywhere except these parents.
fn is_value_position(parent: &str) -> bool {
    !matches!(
        parent,
        "constructor_initializer" | "indexer_declaration" | "parameter" | "modifier"
    )
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn is_conditional(kind: &str) -> bool {
    matches!(kind, "preproc_if" | "preproc_elif" | "preproc_else")
}

/// Children with their field names. `#if` blocks are flattened: their content
/// stays in place and each directive piece is tagged [`DIRECTIVE`].
fn children<'a>(node: Node<'a>) -> Vec<(Node<'a>, Option<&'static str>)> {
    let mut out = Vec::new();
    collect(node, false, &mut out);
    out
}

fn collect<'a>(node: Node<'a>, in_directive: bool, out: &mut Vec<(Node<'a>, Option<&'static str>)>) {
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        let field = cursor.field_name();
        if is_conditional(child.kind()) {
            collect(child, true, out);
        } else if in_directive && (!child.is_named() || field == Some("condition")) {
            out.push((child, Some(DIRECTIVE)));
        } else {
            out.push((child, field));
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

struct Lowering<'t> {
    text: &'t str,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'t> Lowering<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // ------------------------------------------------------------------
    // Builder plumbing
    // ------------------------------------------------------------------

    fn error(&mut self, message: String, offset: usize) {
        self.errors.push(ParseError {
            message,
            offset: u32::try_from(offset).unwrap_or(u32::MAX),
        });
    }

    /// Emit the bytes up to `upto` that no tree-sitter token covers.
    fn gap(&mut self, upto: usize) {
        if upto <= self.pos {
            return;
        }
        let text = self.text;
        let Some(gap) = text.get(self.pos..upto) else {
            return;
        };
        let kind = if gap.chars().all(is_blank) {
            WHITESPACE
        } else {
            self.error("unexpected text".to_string(), self.pos);
            ERROR_TOKEN
        };
        self.builder.token(kind.into(), gap);
        self.pos = upto;
    }

    fn token(&mut self, kind: SyntaxKind, node: Node<'_>) {
        self.gap(node.start_byte());
        let end = node.end_byte();
        if end <= self.pos {
            return;
        }
        let text = self.text;
        let Some(slice) = text.get(self.pos..end) else {
            return;
        };
        self.builder.token(kind.into(), slice);
        self.pos = end;
    }

    fn start(&mut self, kind: SyntaxKind, at: usize) {
        self.gap(at);
        self.builder.start_node(kind.into());
    }

    fn end(&mut self) {
        self.builder.finish_node();
    }

    fn wrap(&mut self, kind: SyntaxKind, ident: Node<'_>) {
        self.start(kind, ident.start_byte());
        self.token(IDENT, ident);
        self.end();
    }

    // ------------------------------------------------------------------
    // Roots
    // ------------------------------------------------------------------

    fn source_file(&mut self, root: Node<'_>) {
        self.builder.start_node(SOURCE_FILE.into());
        let items = children(root);
        let mut iter = items.into_iter();
        while let Some((child, field)) = iter.next() {
            if child.kind() != "file_scoped_namespace_declaration" || child.is_error() {
                self.child(root.kind(), child, field);
                continue;
            }
            // `namespace N;` owns every item after it.
            self.start(NAMESPACE_DECL, child.start_byte());
            self.children_of(child);
            let rest: Vec<_> = iter.by_ref().collect();
            if let Some((first, _)) = rest.first() {
                self.start(MEMBER_LIST, first.start_byte());
                for (item, field) in rest {
                    self.child(root.kind(), item, field);
                }
                self.end();
            }
            self.end();
        }
        self.gap(self.text.len());
        self.end();
    }

    fn unparsed(&mut self) {
        self.builder.start_node(SOURCE_FILE.into());
        if !self.text.is_empty() {
            self.builder.start_node(ERROR.into());
            self.builder.token(ERROR_TOKEN.into(), self.text);
            self.builder.finish_node();
            self.error("source could not be parsed".to_string(), 0);
        }
        self.pos = self.text.len();
        self.end();
    }

    // ------------------------------------------------------------------
    // General lowering
    // ------------------------------------------------------------------

    fn children_of(&mut self, node: Node<'_>) {
        let parent = node.kind();
        for (child, field) in children(node) {
            self.child(parent, child, field);
        }
    }

    fn child(&mut self, parent: &str, child: Node<'_>, field: Option<&str>) {
        if field == Some(DIRECTIVE) {
            self.token(PREPROC, child);
        } else if child.is_missing() {
            self.error(format!("expected `{}`", child.kind()), child.start_byte());
        } else if child.is_error() {
            self.error_node(child);
        } else if child.is_extra() {
            let kind = if child.kind() == "comment" { COMMENT } else { PREPROC };
            self.token(kind, child);
        } else if !child.is_named() {
            self.anonymous(parent, child);
        } else if is_type_position(parent, field, child.kind()) {
            self.ty(child);
        } else if child.kind() == "identifier" {
            self.identifier(parent, child, field);
        } else if child.kind() == "generic_name" && name_role(parent, field) == Role::Ref {
            self.generic_ref(child);
        } else {
            self.lower(child);
        }
    }

    fn lower(&mut self, node: Node<'_>) {
        let kind = node.kind();
        match kind {
            "identifier" => self.value_name(node),
            "implicit_parameter" => {
                self.start(PARAM, node.start_byte());
                self.wrap(NAME, node);
                self.end();
            }
            "qualified_name" => self.qualified_value(node),
            "generic_name" => {
                self.start(PATH_EXPR, node.start_byte());
                self.generic_ref(node);
                self.end();
            }
            "parameter_list" | "bracketed_parameter_list" => self.parameter_list(node),
            "comment" => self.token(COMMENT, node),
            _ if kind.starts_with("preproc") => self.token(PREPROC, node),
            _ if node.child_count() == 0 => self.leaf(node),
            _ => match node_kind(kind) {
                Some(lowered) => {
                    self.start(lowered, node.start_byte());
                    self.children_of(node);
                    self.end();
                }
                None => self.children_of(node),
            },
        }
    }

    fn leaf(&mut self, node: Node<'_>) {
        if node.kind().ends_with("_literal") {
            self.start(LITERAL, node.start_byte());
            self.token(LITERAL_TOKEN, node);
            self.end();
        } else {
            self.token(token_kind(node), node);
        }
    }

    fn error_node(&mut self, node: Node<'_>) {
        self.error("unexpected syntax".to_string(), node.start_byte());
        self.start(ERROR, node.start_byte());
        if node.child_count() == 0 {
            self.token(ERROR_TOKEN, node);
        } else {
            self.children_of(node);
        }
        self.end();
    }

    fn anonymous(&mut self, parent: &str, node: Node<'_>) {
        let wrapper = match node.kind() {
            "this" if is_value_position(parent) => Some(THIS_EXPR),
            "base" if is_value_position(parent) => Some(BASE_EXPR),
            _ => None,
        };
        match wrapper {
            Some(kind) => {
                self.start(kind, node.start_byte());
                self.token(token_kind(node), node);
                self.end();
            }
            None => self.token(token_kind(node), node),
        }
    }

    fn identifier(&mut self, parent: &str, node: Node<'_>, field: Option<&str>) {
        let member_label = parent == "anonymous_object_creation_expression"
            && node.next_sibling().is_some_and(|next| next.kind() == "=");
        match name_role(parent, field) {
            _ if member_label => self.token(IDENT, node),
            Role::Decl => self.wrap(NAME, node),
            Role::Ref => self.wrap(NAME_REF, node),
            Role::Token => self.token(IDENT, node),
            Role::Value => self.value_name(node),
        }
    }

    fn value_name(&mut self, node: Node<'_>) {
        self.start(PATH_EXPR, node.start_byte());
        self.wrap(NAME_REF, node);
        self.end();
    }

    /// `A.B` outside a type position is a member access chain.
    fn qualified_value(&mut self, node: Node<'_>) {
        self.start(MEMBER_ACCESS_EXPR, node.start_byte());
        for (child, field) in children(node) {
            match field {
                Some("qualifier") => self.child("member_access_expression", child, Some("expression")),
                Some("name") => self.child("member_access_expression", child, Some("name")),
                _ => self.child("qualified_name", child, field),
            }
        }
        self.end();
    }

    /// `params T[] name` has no node of its own in the grammar.
    fn parameter_list(&mut self, node: Node<'_>) {
        self.start(PARAM_LIST, node.start_byte());
        let mut open = false;
        for (child, field) in children(node) {
            if !child.is_named() && child.kind() == "params" {
                self.start(PARAM, child.start_byte());
                open = true;
            }
            let parent = if open { "parameter" } else { node.kind() };
            self.child(parent, child, field);
            if open && field == Some("name") {
                self.end();
                open = false;
            }
        }
        if open {
            self.end();
        }
        self.end();
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn ty(&mut self, node: Node<'_>) {
        if node.is_error() {
            self.error_node(node);
            return;
        }
        if node.kind() == "implicit_type" {
            self.token(VAR_KW, node);
            return;
        }
        self.start(TYPE_REF, node.start_byte());
        self.type_parts(node);
        self.end();
    }

    /// Flatten a written type into `NAME_REF` segments inside one `TYPE_REF`.
    fn type_parts(&mut self, node: Node<'_>) {
        let kind = node.kind();
        match kind {
            "identifier" => self.wrap(NAME_REF, node),
            "predefined_type" => self.token(PREDEFINED_TYPE, node),
            "generic_name" => self.generic_ref(node),
            "tuple_type" => {
                for (child, field) in children(node) {
                    if child.kind() == "tuple_element" {
                        for (part, part_field) in children(child) {
                            self.child("tuple_element", part, part_field);
                        }
                    } else {
                        self.child(kind, child, field);
                    }
                }
            }
            "qualified_name" | "alias_qualified_name" | "array_type" | "nullable_type" | "pointer_type"
            | "ref_type" | "scoped_type" => {
                for (child, field) in children(node) {
                    let plain = child.is_named() && !child.is_extra() && !child.is_error() && !child.is_missing();
                    if !plain || field == Some(DIRECTIVE) {
                        self.child(kind, child, field);
                    } else if kind == "alias_qualified_name" && field == Some("alias") {
                        self.token(IDENT, child);
                    } else if child.kind() == "array_rank_specifier" {
                        self.children_of(child);
                    } else {
                        self.type_parts(child);
                    }
                }
            }
            _ => self.lower(node),
        }
    }

    /// `Name<T>`: the name as a `NAME_REF`, then its type arguments.
    fn generic_ref(&mut self, node: Node<'_>) {
        for (child, field) in children(node) {
            match child.kind() {
                "identifier" if child.is_named() && !child.is_missing() => self.wrap(NAME_REF, child),
                "type_argument_list" => self.type_args(child),
                _ => self.child("generic_name", child, field),
            }
        }
    }

    fn type_args(&mut self, node: Node<'_>) {
        self.start(TYPE_ARG_LIST, node.start_byte());
        for (child, field) in children(node) {
            let plain = child.is_named() && !child.is_extra() && !child.is_error() && !child.is_missing();
            if plain && field != Some(DIRECTIVE) {
                self.ty(child);
            } else {
                self.child("type_argument_list", child, field);
            }
        }
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        parse(source).syntax_node().descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_tree_text_equals_input() {
        let source = "// head\nusing System;\r\n\nnamespace N {\n  class A { /* c */ int x = 1; }\n}\n";
        let parse = parse(source);
        assert!(parse.errors().is_empty(), "{:?}", parse.errors());
        assert_eq!(parse.syntax_node().text().to_string(), source);
    }

    #[test]
    fn test_qualified_type_flattens_into_segments() {
        let root = parse("class B { N.Inner<List<int>>[] x; }").syntax_node();
        let type_ref = root
            .descendants()
            .find(|n| n.kind() == TYPE_REF)
            .expect("type ref");
        let segments: Vec<String> = type_ref
            .children()
            .filter(|n| n.kind() == NAME_REF)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(segments, vec!["N", "Inner"]);
        assert!(type_ref.children().any(|n| n.kind() == TYPE_ARG_LIST));
    }

    #[test]
    fn test_this_in_expressions_only() {
        let found = kinds("class A { A() : this(1) { } void M() { this.M(); } }");
        assert_eq!(found.iter().filter(|k| **k == THIS_EXPR).count(), 1);
        assert_eq!(found.iter().filter(|k| **k == CTOR_INITIALIZER).count(), 1);
    }

    #[test]
    fn test_params_array_is_one_parameter() {
        let found = kinds("class A { void M(int a, params int[] rest) { } }");
        assert_eq!(found.iter().filter(|k| **k == PARAM).count(), 2);
    }

    #[test]
    fn test_file_scoped_namespace_owns_following_items() {
        let root = parse("namespace N;\nclass A { }\nclass B { }\n").syntax_node();
        let namespace = root
            .children()
            .find(|n| n.kind() == NAMESPACE_DECL)
            .expect("namespace");
        let types = namespace
            .descendants()
            .filter(|n| n.kind() == CLASS_DECL)
            .count();
        assert_eq!(types, 2);
    }

    #[test]
    fn test_errors_are_recorded_not_fatal() {
        let source = "class A { void M( { \"open";
        let parse = parse(source);
        assert!(!parse.errors().is_empty());
        assert_eq!(parse.syntax_node().text().to_string(), source);
    }
}
