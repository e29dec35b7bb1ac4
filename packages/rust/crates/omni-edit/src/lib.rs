//! omni-edit - Whole-program rename fix for type-name findings
//!
//! Turns a CA1720 finding into a [`ProgramEdit`]: the flagged declaration and
//! every reference to it, in every file, renamed to `<name>Value`.
//!
//! # Features
//!
//! - **Planning**: resolve the declared symbol and reject names that would
//!   collide with, shadow or capture another binding
//! - **Rewriting**: replace identifier tokens on new green trees; the old
//!   program snapshot stays valid and untouched
//! - **Re-validation**: re-analyze the result and refuse renames that change
//!   how any name resolves
//! - **Diff Preview**: unified diffs of every changed file
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-edit/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # PlanError, RewriteError, FixError (thiserror)
//! ├── types.rs     # RenamePlan, ProgramEdit, FileChange, TextEdit
//! ├── diff.rs      # Diff generation utilities
//! ├── planner.rs   # RenamePlanner
//! ├── rewriter.rs  # ReferenceRewriter
//! └── fix.rs       # TypeNameFix (plan + apply)
//! ```
//!
//! # Example
//!
//! ```rust
//! use omni_ast::{Program, SemanticModel};
//! use omni_edit::TypeNameFix;
//! use omni_lint::Analyzer;
//! use tokio_util::sync::CancellationToken;
//!
//! let program = Program::from_sources([("a.cs", "class A { void int() { } void M() { int(); } }")]);
//! let finding = Analyzer::default().analyze(&program).findings.remove(0);
//! let model = SemanticModel::build(&program);
//!
//! let edit = TypeNameFix.fix(&model, &finding, &CancellationToken::new()).unwrap();
//! assert_eq!(
//!     edit.program().files()[0].text(),
//!     "class A { void intValue() { } void M() { intValue(); } }"
//! );
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod diff;
mod error;
mod fix;
mod planner;
mod rewriter;
mod types;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::{FixError, PlanError, RewriteError};
pub use fix::{FIX_TITLE, TypeNameFix};
pub use planner::{RenamePlanner, replacement_name};
pub use rewriter::ReferenceRewriter;
pub use types::{FileChange, ProgramEdit, RenamePlan, TextEdit};

// Re-export diff utility for external use
pub use diff::generate_unified_diff;
