//! omni-ast - Lossless syntax trees and semantic model for C# sources
//!
//! This crate parses source files with tree-sitter's C# grammar, lowers the
//! concrete trees into `rowan` green trees, groups them into
//! immutable [`Program`] snapshots, and resolves every identifier to the
//! symbol it names.
//!
//! ## Architecture
//!
//! ```text
//! omni-ast/src/
//! ├── lib.rs           # Re-exports (entry point)
//! ├── syntax_kind.rs   # SyntaxKind enum and rowan Language
//! ├── parser.rs        # tree-sitter C# -> rowan lowering
//! ├── ast.rs           # Typed node wrappers
//! ├── line_index.rs    # Span, offset -> line/column
//! ├── program.rs       # FileId, SourceFile, Program snapshots
//! ├── semantic.rs      # Symbols, scopes, references
//! └── error.rs         # AstError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use omni_ast::{Program, SemanticModel, SymbolKind};
//!
//! let program = Program::from_sources([("a.cs", "class A { void Run() { Run(); } }")]);
//! let model = SemanticModel::build(&program);
//! let run = model.symbols().iter().find(|s| s.kind == SymbolKind::Method).unwrap();
//! assert_eq!(model.references_to(run.id).count(), 1);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod ast;
mod error;
mod line_index;
mod parser;
mod program;
mod semantic;
mod syntax_kind;

// ============================================================================
// Public Re-exports
// ============================================================================

// Syntax layer
pub use parser::{Parse, ParseError, parse};
pub use syntax_kind::{CSharpLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

// Typed nodes
pub use ast::TypeKind;

// Snapshots
pub use line_index::{LineCol, LineIndex, Span};
pub use program::{FileId, LoadConfig, Program, SourceFile};

// Semantic model
pub use semantic::{
    GLOBAL_SCOPE, Hypothetical, Reference, ReferenceKind, Resolution, Scope, ScopeId, ScopeKind,
    SemanticModel, Symbol, SymbolId, SymbolKind,
};

// Error types
pub use error::AstError;

// rowan types callers need to rewrite trees
pub use rowan::{GreenNode, GreenNodeData, GreenToken, TextRange, TextSize};
