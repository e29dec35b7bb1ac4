//! Declaration classification.
//!
//! Maps a syntax node to the declaration category the rule inspects and the
//! identifier it declares. Any other node kind is skipped, never an error.

use omni_ast::ast::{MethodDecl, Name, Param, PropertyDecl, TypeDecl};
use omni_ast::{SourceFile, Span, SyntaxNode, TextSize, TypeKind};
use serde::Serialize;

/// Declaration categories the rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Type declaration of any kind.
    Type(TypeKind),
    /// Method.
    Method,
    /// Property.
    Property,
    /// Parameter of a method, constructor, delegate, indexer or lambda.
    Parameter,
}

/// A syntax node the rule can inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationNode {
    /// Type declaration.
    Type(TypeDecl),
    /// Method declaration.
    Method(MethodDecl),
    /// Property declaration.
    Property(PropertyDecl),
    /// Parameter.
    Parameter(Param),
}

impl DeclarationNode {
    /// Wrap `node` if it is one of the inspected kinds.
    #[must_use]
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        if let Some(decl) = TypeDecl::cast(node.clone()) {
            return Some(Self::Type(decl));
        }
        if let Some(decl) = MethodDecl::cast(node.clone()) {
            return Some(Self::Method(decl));
        }
        if let Some(decl) = PropertyDecl::cast(node.clone()) {
            return Some(Self::Property(decl));
        }
        Param::cast(node).map(Self::Parameter)
    }

    /// Category of this declaration.
    #[must_use]
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Type(decl) => DeclarationKind::Type(decl.kind()),
            Self::Method(_) => DeclarationKind::Method,
            Self::Property(_) => DeclarationKind::Property,
            Self::Parameter(_) => DeclarationKind::Parameter,
        }
    }

    /// Declared name node, if present.
    #[must_use]
    pub fn name(&self) -> Option<Name> {
        match self {
            Self::Type(decl) => decl.name(),
            Self::Method(decl) => decl.name(),
            Self::Property(decl) => decl.name(),
            Self::Parameter(decl) => decl.name(),
        }
    }

    /// Underlying syntax node.
    #[must_use]
    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Type(decl) => decl.syntax(),
            Self::Method(decl) => decl.syntax(),
            Self::Property(decl) => decl.syntax(),
            Self::Parameter(decl) => decl.syntax(),
        }
    }
}

/// Result of classifying one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Category.
    pub kind: DeclarationKind,
    /// Declared identifier; empty when the name token is missing.
    pub identifier: String,
    /// Whole declaration span.
    pub span: Span,
}

/// Stateless classifier; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationClassifier;

impl DeclarationClassifier {
    /// Classify `node`; `None` for kinds the rule does not inspect.
    #[must_use]
    pub fn classify(&self, node: &SyntaxNode) -> Option<Classified> {
        let decl = DeclarationNode::cast(node.clone())?;
        Some(Classified {
            kind: decl.kind(),
            identifier: decl.name().map(|n| n.text()).unwrap_or_default(),
            span: Span::from(node.text_range()),
        })
    }

    /// Find the declaration of `kind` that starts at `span` in `file`.
    ///
    /// Walks up from the token at the span start, so a span that drifted
    /// inside the declaration still finds the nearest enclosing match.
    #[must_use]
    pub fn relocate(&self, file: &SourceFile, span: Span, kind: DeclarationKind) -> Option<DeclarationNode> {
        let root = file.syntax();
        if span.start > u32::from(root.text_range().end()) {
            return None;
        }
        let token = root.token_at_offset(TextSize::from(span.start)).right_biased()?;
        let mut candidates = token
            .parent_ancestors()
            .filter_map(DeclarationNode::cast)
            .filter(|decl| decl.kind() == kind);
        let first = candidates.next()?;
        if Span::from(first.syntax().text_range()) == span {
            return Some(first);
        }
        candidates
            .find(|decl| Span::from(decl.syntax().text_range()) == span)
            .or(Some(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_ast::{Program, SyntaxKind};

    fn classify_all(source: &str) -> Vec<Classified> {
        let program = Program::from_sources([("a.cs", source)]);
        program.files()[0]
            .syntax()
            .descendants()
            .filter_map(|n| DeclarationClassifier.classify(&n))
            .collect()
    }

    #[test]
    fn test_classify_each_category() {
        let found = classify_all("class A { int X { get; } void M(int p) { } int f; }");
        let kinds: Vec<DeclarationKind> = found.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DeclarationKind::Type(TypeKind::Class),
                DeclarationKind::Property,
                DeclarationKind::Method,
                DeclarationKind::Parameter,
            ]
        );
        let identifiers: Vec<&str> = found.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["A", "X", "M", "p"]);
    }

    #[test]
    fn test_method_span_covers_whole_declaration() {
        let source = "class A { public void Run() { } }";
        let found = classify_all(source);
        let method = &found[1];
        assert_eq!(method.span.start as usize, source.find("public").unwrap_or_default());
        assert_eq!(method.span.end as usize, source.len() - 2);
    }

    #[test]
    fn test_other_nodes_are_skipped() {
        let program = Program::from_sources([("a.cs", "class A { int f = 1; }")]);
        let root = program.files()[0].syntax();
        let field = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::FIELD_DECL)
            .expect("field");
        assert!(DeclarationClassifier.classify(&field).is_none());
        assert!(DeclarationClassifier.classify(&root).is_none());
    }

    #[test]
    fn test_relocate_from_span() {
        let program = Program::from_sources([("a.cs", "class A { void @int(string str) { } }")]);
        let file = &program.files()[0];
        let method = classify_all(file.text().as_str())
            .into_iter()
            .find(|c| c.kind == DeclarationKind::Method)
            .expect("method");
        let node = DeclarationClassifier
            .relocate(file, method.span, DeclarationKind::Method)
            .expect("relocated");
        assert_eq!(node.name().map(|n| n.text()).as_deref(), Some("int"));
        assert!(
            DeclarationClassifier
                .relocate(file, method.span, DeclarationKind::Property)
                .is_none()
        );
    }
}
