//! Error types for planning and applying renames.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_ast::Span;
use thiserror::Error;

/// Failure to produce a [`crate::RenamePlan`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// No symbol is declared at the finding's location.
    #[error("Unresolved symbol at {path}:{}..{}", span.start, span.end)]
    UnresolvedSymbol {
        /// File path of the finding.
        path: String,
        /// Declaration span of the finding.
        span: Span,
    },

    /// The replacement name is already bound where the symbol is visible.
    #[error("Name collision: '{new_name}' conflicts with {conflict}")]
    NameCollision {
        /// Proposed name.
        new_name: String,
        /// Description of the existing binding.
        conflict: String,
    },

    /// A use of the name could bind to the symbol or to another overload.
    #[error("Ambiguous reference to '{name}' at {path}:{offset}")]
    AmbiguousReference {
        /// Name being renamed.
        name: String,
        /// File of the use.
        path: String,
        /// Byte offset of the use.
        offset: u32,
    },

    /// The member overrides, implements or hides a same-named member.
    #[error("'{name}' is linked to {other}; rename the whole hierarchy instead")]
    LinkedMember {
        /// Name being renamed.
        name: String,
        /// Description of the linked member.
        other: String,
    },

    /// The request was cancelled.
    #[error("Rename planning cancelled")]
    Cancelled,
}

/// Failure to apply a [`crate::RenamePlan`]. The program is never changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The renamed program would carry a new violation or resolve differently.
    #[error("Cross-file conflict in {path}: {reason}")]
    CrossFileConflict {
        /// File where the conflict shows up.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The plan was made against a different program snapshot.
    #[error("Stale snapshot: plan targets revision {expected}, model is at {found}")]
    StaleSnapshot {
        /// Revision recorded in the plan.
        expected: u64,
        /// Revision of the model given to the rewriter.
        found: u64,
    },

    /// The request was cancelled.
    #[error("Rename cancelled")]
    Cancelled,
}

/// Failure of the code fix as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    /// The finding does not belong to a rule this fix handles.
    #[error("Not fixable: {0}")]
    NotFixable(String),

    /// Planning failed.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Applying failed.
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),
}
