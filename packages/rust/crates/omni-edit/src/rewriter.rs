//! Whole-program application of a [`RenamePlan`].
//!
//! Every occurrence (declaration and resolved references in all files) is
//! replaced on new green trees; the input program is never touched, so a
//! failure at any point leaves nothing behind. The result is re-analyzed and
//! rejected if the rename changed what any name resolves to.

use std::collections::BTreeMap;

use omni_ast::{
    FileId, GreenNode, GreenToken, Program, SemanticModel, SourceFile, Span, SymbolId, SyntaxKind,
    SyntaxNode, TextRange,
};
use omni_lint::BannedNameSet;
use tokio_util::sync::CancellationToken;

use crate::error::RewriteError;
use crate::types::{FileChange, ProgramEdit, RenamePlan, TextEdit};

/// Applies rename plans made against one semantic model.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRewriter<'m> {
    model: &'m SemanticModel,
}

impl<'m> ReferenceRewriter<'m> {
    /// Rewriter over `model`.
    #[must_use]
    pub fn new(model: &'m SemanticModel) -> Self {
        Self { model }
    }

    /// Apply `plan`, producing a new program.
    ///
    /// # Errors
    ///
    /// [`RewriteError::StaleSnapshot`] if the plan does not match the model,
    /// [`RewriteError::CrossFileConflict`] if the renamed program would carry
    /// a new violation or resolve any name differently,
    /// [`RewriteError::Cancelled`] on cancellation.
    pub fn apply(&self, plan: &RenamePlan, cancel: &CancellationToken) -> Result<ProgramEdit, RewriteError> {
        self.apply_with(plan, cancel, |_| Ok(()))
    }

    /// [`Self::apply`] with a hook run before each file is rewritten.
    fn apply_with(
        &self,
        plan: &RenamePlan,
        cancel: &CancellationToken,
        mut before_file: impl FnMut(FileId) -> Result<(), RewriteError>,
    ) -> Result<ProgramEdit, RewriteError> {
        check(cancel)?;
        self.check_fresh(plan)?;

        let sites = self.sites(plan);
        let program = self.model.program();
        let mut trees = Vec::with_capacity(sites.len());
        let mut changes = Vec::with_capacity(sites.len());
        for (file_id, spans) in &sites {
            check(cancel)?;
            before_file(*file_id)?;
            let file = program.file(*file_id).ok_or_else(|| self.stale(plan))?;
            let (green, change) = self.rewrite_file(plan, file, spans)?;
            trees.push((*file_id, green));
            changes.push(change);
        }

        let renamed = program.with_trees(trees);
        check(cancel)?;
        self.verify(plan, &sites, &renamed)?;

        tracing::debug!(
            old_name = %plan.old_name,
            new_name = %plan.new_name,
            files = changes.len(),
            occurrences = changes.iter().map(|c| c.edits.len()).sum::<usize>(),
            revision = renamed.revision(),
            "applied rename"
        );
        Ok(ProgramEdit::new(renamed, plan.clone(), changes))
    }

    fn check_fresh(&self, plan: &RenamePlan) -> Result<(), RewriteError> {
        if plan.revision != self.model.revision() {
            return Err(self.stale(plan));
        }
        let symbol = self.model.symbol(plan.symbol).ok_or_else(|| self.stale(plan))?;
        if symbol.name != plan.old_name || symbol.file != plan.file || symbol.name_span != plan.name_span {
            return Err(self.stale(plan));
        }
        Ok(())
    }

    fn stale(&self, plan: &RenamePlan) -> RewriteError {
        RewriteError::StaleSnapshot {
            expected: plan.revision,
            found: self.model.revision(),
        }
    }

    /// Declaration plus every resolved reference, grouped by file, ascending.
    fn sites(&self, plan: &RenamePlan) -> BTreeMap<FileId, Vec<Span>> {
        let mut sites: BTreeMap<FileId, Vec<Span>> = BTreeMap::new();
        sites.entry(plan.file).or_default().push(plan.name_span);
        for reference in self.model.references_to(plan.symbol) {
            sites.entry(reference.file).or_default().push(reference.span);
        }
        for spans in sites.values_mut() {
            spans.sort_unstable();
            spans.dedup();
        }
        sites
    }

    fn rewrite_file(
        &self,
        plan: &RenamePlan,
        file: &SourceFile,
        spans: &[Span],
    ) -> Result<(GreenNode, FileChange), RewriteError> {
        let mut green = file.green().clone();
        let mut old_texts = Vec::with_capacity(spans.len());
        // Back to front, so earlier offsets stay valid.
        for span in spans.iter().rev() {
            let root = SyntaxNode::new_root(green);
            let token = root
                .covering_element(TextRange::from(*span))
                .into_token()
                .filter(|t| t.kind() == SyntaxKind::IDENT && unescaped(t.text()) == plan.old_name)
                .ok_or_else(|| self.stale(plan))?;
            old_texts.push(token.text().to_string());
            green = token.replace_with(GreenToken::new(SyntaxKind::IDENT.into(), &plan.new_name));
        }

        let edits = spans
            .iter()
            .zip(old_texts.into_iter().rev())
            .map(|(span, old_text)| {
                let pos = file.line_index().line_col(span.start);
                TextEdit {
                    span: *span,
                    line: pos.line,
                    column: pos.column,
                    old_text,
                    new_text: plan.new_name.clone(),
                }
            })
            .collect();
        let change = FileChange {
            file: file.id(),
            path: file.path().to_string(),
            original: file.text(),
            modified: SyntaxNode::new_root(green.clone()).text().to_string(),
            edits,
        };
        Ok((green, change))
    }

    /// Re-analyze the renamed program: every reference must still be found
    /// at its shifted position and bind to the same declaration as before.
    fn verify(&self, plan: &RenamePlan, sites: &BTreeMap<FileId, Vec<Span>>, renamed: &Program) -> Result<(), RewriteError> {
        let path_of = |file: FileId| {
            renamed
                .file(file)
                .map_or_else(String::new, |f| f.path().to_string())
        };
        let conflict = |file: FileId, reason: String| {
            let path = path_of(file);
            tracing::warn!(path = %path, reason = %reason, "rename rejected after rewrite");
            RewriteError::CrossFileConflict { path, reason }
        };

        if BannedNameSet::standard().contains(&plan.new_name) {
            return Err(conflict(
                plan.file,
                format!("'{}' is itself a type name", plan.new_name),
            ));
        }

        let after = SemanticModel::build(renamed);
        let shift = Shift::new(sites, &plan.new_name);
        let renamed_symbol = after
            .symbol_at_name(plan.file, shift.map(plan.file, plan.name_span))
            .filter(|id| after.symbol(*id).is_some_and(|s| s.name == plan.new_name))
            .ok_or_else(|| conflict(plan.file, "renamed declaration not found".to_string()))?;

        let expected_target = |target: SymbolId| -> Option<SymbolId> {
            if target == plan.symbol {
                return Some(renamed_symbol);
            }
            let symbol = self.model.symbol(target)?;
            after.symbol_at_name(symbol.file, shift.map(symbol.file, symbol.name_span))
        };

        for reference in self.model.references() {
            let span = shift.map(reference.file, reference.span);
            let Some(found) = after.reference_at(reference.file, span) else {
                return Err(conflict(
                    reference.file,
                    format!("use of '{}' at offset {} is gone", reference.name, reference.span.start),
                ));
            };
            let expected = reference.target.and_then(expected_target);
            if found.target != expected || (reference.target.is_some() && expected.is_none()) {
                return Err(conflict(
                    reference.file,
                    format!(
                        "use of '{}' at offset {} binds to a different declaration",
                        reference.name, reference.span.start
                    ),
                ));
            }
        }
        if after.references().len() != self.model.references().len() {
            return Err(conflict(
                plan.file,
                format!(
                    "expected {} references, found {}",
                    self.model.references().len(),
                    after.references().len()
                ),
            ));
        }
        Ok(())
    }
}

/// Maps spans of the original program onto the renamed one: renamed
/// identifiers take the new length, everything after them moves.
struct Shift<'a> {
    sites: &'a BTreeMap<FileId, Vec<Span>>,
    new_len: u32,
}

impl<'a> Shift<'a> {
    fn new(sites: &'a BTreeMap<FileId, Vec<Span>>, new_name: &str) -> Self {
        Self {
            sites,
            new_len: u32::try_from(new_name.len()).unwrap_or(u32::MAX),
        }
    }

    fn map(&self, file: FileId, span: Span) -> Span {
        let sites = self.sites.get(&file).map(Vec::as_slice).unwrap_or_default();
        let delta: i64 = sites
            .iter()
            .filter(|site| site.start < span.start)
            .map(|site| i64::from(self.new_len) - i64::from(site.len()))
            .sum();
        let start = u32::try_from(i64::from(span.start) + delta).unwrap_or(u32::MAX);
        let len = if sites.contains(&span) { self.new_len } else { span.len() };
        Span {
            start,
            end: start.saturating_add(len),
        }
    }
}

/// Identifier text with a verbatim `@` removed.
fn unescaped(text: &str) -> &str {
    text.strip_prefix('@').unwrap_or(text)
}

fn check(cancel: &CancellationToken) -> Result<(), RewriteError> {
    if cancel.is_cancelled() {
        Err(RewriteError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::RenamePlanner;
    use omni_ast::SymbolKind;

    fn program() -> Program {
        Program::from_sources([
            ("a.cs", "class A { void @int() { } void M() { @int(); } }"),
            ("b.cs", "class B { void N(A a) { a.@int(); } }"),
        ])
    }

    fn plan_for(model: &SemanticModel) -> RenamePlan {
        let method = model
            .symbols()
            .iter()
            .find(|s| s.kind == SymbolKind::Method && s.name == "int")
            .map(|s| s.id)
            .expect("method");
        RenamePlanner::new(model)
            .plan_symbol(method, &CancellationToken::new())
            .expect("plan")
    }

    #[test]
    fn test_failure_mid_rewrite_leaves_program_untouched() {
        let program = program();
        let texts: Vec<String> = program.files().iter().map(SourceFile::text).collect();
        let model = SemanticModel::build(&program);
        let plan = plan_for(&model);

        let mut seen = 0;
        let result = ReferenceRewriter::new(&model).apply_with(&plan, &CancellationToken::new(), |_| {
            seen += 1;
            if seen == 2 {
                Err(RewriteError::Cancelled)
            } else {
                Ok(())
            }
        });

        assert_eq!(result.unwrap_err(), RewriteError::Cancelled);
        let after: Vec<String> = program.files().iter().map(SourceFile::text).collect();
        assert_eq!(after, texts);
        assert_eq!(model.revision(), program.revision());
        assert!(ReferenceRewriter::new(&model).apply(&plan, &CancellationToken::new()).is_ok());
    }

    #[test]
    fn test_verbatim_identifiers_are_replaced_whole() {
        let program = program();
        let model = SemanticModel::build(&program);
        let edit = ReferenceRewriter::new(&model)
            .apply(&plan_for(&model), &CancellationToken::new())
            .expect("rename");
        let a = edit.program().files()[0].text();
        assert_eq!(a, "class A { void intValue() { } void M() { intValue(); } }");
        assert!(edit.changes.iter().flat_map(|c| &c.edits).all(|e| e.old_text == "@int"));
    }

    #[test]
    fn test_shift_maps_spans_past_renamed_sites() {
        let mut sites = BTreeMap::new();
        sites.insert(
            FileId(0),
            vec![Span { start: 5, end: 9 }, Span { start: 20, end: 23 }, Span { start: 30, end: 33 }],
        );
        let shift = Shift::new(&sites, "intValue");
        assert_eq!(shift.map(FileId(0), Span { start: 20, end: 23 }), Span { start: 24, end: 32 });
        assert_eq!(shift.map(FileId(0), Span { start: 12, end: 14 }), Span { start: 16, end: 18 });
        assert_eq!(shift.map(FileId(0), Span { start: 40, end: 41 }), Span { start: 54, end: 55 });
        assert_eq!(shift.map(FileId(1), Span { start: 40, end: 41 }), Span { start: 40, end: 41 });
    }
}
