//! Core types for rename planning and application.

use omni_ast::{FileId, Program, Span, SymbolId, SymbolKind};
use serde::Serialize;

use crate::diff::generate_unified_diff;

/// A validated, not yet applied rename of one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    /// Symbol being renamed.
    pub symbol: SymbolId,
    /// What the symbol declares.
    pub kind: SymbolKind,
    /// Current name.
    pub old_name: String,
    /// Replacement name.
    pub new_name: String,
    /// Revision of the program the plan was made against.
    pub revision: u64,
    /// Declaring file.
    pub file: FileId,
    /// Name token of the declaration.
    pub name_span: Span,
}

/// One identifier replacement, in pre-edit coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Replaced range.
    pub span: Span,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Text before the edit.
    pub old_text: String,
    /// Text after the edit.
    pub new_text: String,
}

/// All edits made to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    /// File id (stable across the edit).
    pub file: FileId,
    /// File path.
    pub path: String,
    /// Content before the rename.
    pub original: String,
    /// Content after the rename.
    pub modified: String,
    /// Edits in ascending offset order.
    pub edits: Vec<TextEdit>,
}

/// Result of applying a [`RenamePlan`]: a new program snapshot.
///
/// The snapshot the plan was made against is untouched; untouched files share
/// their trees with it.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramEdit {
    #[serde(skip)]
    program: Program,
    /// Plan that was applied.
    pub plan: RenamePlan,
    /// Per-file changes, in file order.
    pub changes: Vec<FileChange>,
}

impl ProgramEdit {
    pub(crate) fn new(program: Program, plan: RenamePlan, changes: Vec<FileChange>) -> Self {
        Self {
            program,
            plan,
            changes,
        }
    }

    /// The renamed program.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Consume into the renamed program.
    #[must_use]
    pub fn into_program(self) -> Program {
        self.program
    }

    /// Total number of replaced occurrences.
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.changes.iter().map(|c| c.edits.len()).sum()
    }

    /// Unified diff of every changed file.
    #[must_use]
    pub fn diff(&self) -> String {
        self.changes
            .iter()
            .map(|c| generate_unified_diff(&c.path, &c.original, &c.modified))
            .collect()
    }
}
