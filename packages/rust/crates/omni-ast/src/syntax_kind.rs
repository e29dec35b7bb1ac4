//! Syntax kinds of the lowered C# tree.
//!
//! Tokens and nodes share one enum so they can live in the same `rowan` tree.
//! The set is coarser than the tree-sitter grammar: only the shapes name
//! resolution cares about get their own kind.

use rowan::Language;

/// Every token and node kind the lowering can produce.
#[allow(non_camel_case_types, missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Trivia
    WHITESPACE = 0,
    COMMENT,
    PREPROC,

    // Tokens
    IDENT,
    KEYWORD,
    PREDEFINED_TYPE,
    LITERAL_TOKEN,
    THIS_KW,
    BASE_KW,
    VAR_KW,
    PARAMS_KW,

    // Punctuation
    DOT,
    COMMA,
    SEMICOLON,
    COLON,
    L_PAREN,
    R_PAREN,
    L_BRACK,
    R_BRACK,
    L_CURLY,
    R_CURLY,
    L_ANGLE,
    R_ANGLE,
    EQ,
    QUESTION,
    FAT_ARROW,
    PUNCT,
    ERROR_TOKEN,

    // Declarations
    SOURCE_FILE,
    USING_DIRECTIVE,
    NAMESPACE_DECL,
    CLASS_DECL,
    STRUCT_DECL,
    INTERFACE_DECL,
    RECORD_DECL,
    ENUM_DECL,
    DELEGATE_DECL,
    ATTRIBUTE_LIST,
    ATTRIBUTE,
    NAME,
    NAME_REF,
    TYPE_REF,
    TYPE_ARG_LIST,
    TYPE_PARAM_LIST,
    TYPE_PARAM,
    CONSTRAINT_CLAUSE,
    BASE_LIST,
    MEMBER_LIST,
    ENUM_MEMBER_LIST,
    ENUM_MEMBER,
    METHOD_DECL,
    CONSTRUCTOR_DECL,
    DESTRUCTOR_DECL,
    OPERATOR_DECL,
    PROPERTY_DECL,
    INDEXER_DECL,
    EVENT_DECL,
    ACCESSOR_LIST,
    ACCESSOR,
    FIELD_DECL,
    EXPLICIT_IFACE,
    CTOR_INITIALIZER,
    PARAM_LIST,
    PARAM,

    // Statements
    EXPR_BODY,
    BLOCK,
    LOCAL_DECL,
    VAR_DECL,
    DECLARATOR,
    LOCAL_FUNCTION,
    FOR_STMT,
    FOREACH_STMT,
    USING_STMT,
    CATCH_CLAUSE,
    STMT,
    CLAUSE,
    PATTERN,

    // Expressions
    PATH_EXPR,
    LITERAL,
    THIS_EXPR,
    BASE_EXPR,
    NEW_EXPR,
    INITIALIZER_EXPR,
    PAREN_EXPR,
    CAST_EXPR,
    MEMBER_ACCESS_EXPR,
    MEMBER_BINDING_EXPR,
    CONDITIONAL_ACCESS_EXPR,
    CALL_EXPR,
    ARG_LIST,
    ARG,
    ASSIGN_EXPR,
    WITH_EXPR,
    LAMBDA_EXPR,
    EXPR,
    ERROR,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Whitespace, comments and preprocessor lines.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | COMMENT | PREPROC)
    }

    /// Type declaration nodes.
    #[must_use]
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            CLASS_DECL | STRUCT_DECL | INTERFACE_DECL | RECORD_DECL | ENUM_DECL | DELEGATE_DECL
        )
    }

    /// Expression nodes.
    #[must_use]
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            PATH_EXPR
                | LITERAL
                | THIS_EXPR
                | BASE_EXPR
                | NEW_EXPR
                | INITIALIZER_EXPR
                | PAREN_EXPR
                | CAST_EXPR
                | MEMBER_ACCESS_EXPR
                | MEMBER_BINDING_EXPR
                | CONDITIONAL_ACCESS_EXPR
                | CALL_EXPR
                | ASSIGN_EXPR
                | WITH_EXPR
                | LAMBDA_EXPR
                | EXPR
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Marker type binding [`SyntaxKind`] to `rowan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharpLanguage {}

impl Language for CSharpLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        // Discriminants are dense from 0 to ERROR.
        ALL_KINDS.get(usize::from(raw.0)).copied().unwrap_or(ERROR)
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

const ALL_KINDS: [SyntaxKind; ERROR as usize + 1] = [
    WHITESPACE,
    COMMENT,
    PREPROC,
    IDENT,
    KEYWORD,
    PREDEFINED_TYPE,
    LITERAL_TOKEN,
    THIS_KW,
    BASE_KW,
    VAR_KW,
    PARAMS_KW,
    DOT,
    COMMA,
    SEMICOLON,
    COLON,
    L_PAREN,
    R_PAREN,
    L_BRACK,
    R_BRACK,
    L_CURLY,
    R_CURLY,
    L_ANGLE,
    R_ANGLE,
    EQ,
    QUESTION,
    FAT_ARROW,
    PUNCT,
    ERROR_TOKEN,
    SOURCE_FILE,
    USING_DIRECTIVE,
    NAMESPACE_DECL,
    CLASS_DECL,
    STRUCT_DECL,
    INTERFACE_DECL,
    RECORD_DECL,
    ENUM_DECL,
    DELEGATE_DECL,
    ATTRIBUTE_LIST,
    ATTRIBUTE,
    NAME,
    NAME_REF,
    TYPE_REF,
    TYPE_ARG_LIST,
    TYPE_PARAM_LIST,
    TYPE_PARAM,
    CONSTRAINT_CLAUSE,
    BASE_LIST,
    MEMBER_LIST,
    ENUM_MEMBER_LIST,
    ENUM_MEMBER,
    METHOD_DECL,
    CONSTRUCTOR_DECL,
    DESTRUCTOR_DECL,
    OPERATOR_DECL,
    PROPERTY_DECL,
    INDEXER_DECL,
    EVENT_DECL,
    ACCESSOR_LIST,
    ACCESSOR,
    FIELD_DECL,
    EXPLICIT_IFACE,
    CTOR_INITIALIZER,
    PARAM_LIST,
    PARAM,
    EXPR_BODY,
    BLOCK,
    LOCAL_DECL,
    VAR_DECL,
    DECLARATOR,
    LOCAL_FUNCTION,
    FOR_STMT,
    FOREACH_STMT,
    USING_STMT,
    CATCH_CLAUSE,
    STMT,
    CLAUSE,
    PATTERN,
    PATH_EXPR,
    LITERAL,
    THIS_EXPR,
    BASE_EXPR,
    NEW_EXPR,
    INITIALIZER_EXPR,
    PAREN_EXPR,
    CAST_EXPR,
    MEMBER_ACCESS_EXPR,
    MEMBER_BINDING_EXPR,
    CONDITIONAL_ACCESS_EXPR,
    CALL_EXPR,
    ARG_LIST,
    ARG,
    ASSIGN_EXPR,
    WITH_EXPR,
    LAMBDA_EXPR,
    EXPR,
    ERROR,
];

/// Syntax node of the analyzed language.
pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
/// Syntax token of the analyzed language.
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
/// Either a node or a token.
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;
