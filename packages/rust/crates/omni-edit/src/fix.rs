//! Code fix for type-name findings: rename the declaration everywhere.

use omni_ast::SemanticModel;
use omni_lint::{Finding, RULE_ID};
use tokio_util::sync::CancellationToken;

use crate::error::FixError;
use crate::planner::RenamePlanner;
use crate::rewriter::ReferenceRewriter;
use crate::types::ProgramEdit;

/// Title offered for the fix.
pub const FIX_TITLE: &str = "Remove type name";

/// Renames a flagged declaration to `<name>Value` across the whole program.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNameFix;

impl TypeNameFix {
    /// Rule ids this fix handles.
    #[must_use]
    pub fn fixable_ids(&self) -> &'static [&'static str] {
        &[RULE_ID]
    }

    /// Title offered for the fix.
    #[must_use]
    pub fn title(&self) -> &'static str {
        FIX_TITLE
    }

    /// Plan and apply the rename for `finding` against `model`.
    ///
    /// # Errors
    ///
    /// [`FixError::NotFixable`] for findings of other rules, otherwise the
    /// planning or rewriting failure. No edit is produced on error.
    pub fn fix(
        &self,
        model: &SemanticModel,
        finding: &Finding,
        cancel: &CancellationToken,
    ) -> Result<ProgramEdit, FixError> {
        if !self.fixable_ids().contains(&finding.id) {
            return Err(FixError::NotFixable(finding.id.to_string()));
        }
        let plan = RenamePlanner::new(model).plan(finding, cancel)?;
        let edit = ReferenceRewriter::new(model).apply(&plan, cancel)?;
        Ok(edit)
    }
}
