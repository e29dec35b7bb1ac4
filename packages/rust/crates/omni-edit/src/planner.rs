//! Rename planning: resolve the flagged declaration and validate its new name.

use omni_ast::{FileId, Hypothetical, Reference, Resolution, SemanticModel, Span, Symbol, SymbolId, SymbolKind};
use omni_lint::{DeclarationClassifier, Finding};
use tokio_util::sync::CancellationToken;

use crate::error::PlanError;
use crate::types::RenamePlan;

/// `Int` -> `intValue`: first character lower-cased, then `Value`.
#[must_use]
pub fn replacement_name(identifier: &str) -> String {
    let mut chars = identifier.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    name.push_str("Value");
    name
}

/// Plans renames against one semantic model.
#[derive(Debug, Clone, Copy)]
pub struct RenamePlanner<'m> {
    model: &'m SemanticModel,
}

impl<'m> RenamePlanner<'m> {
    /// Planner over `model`.
    #[must_use]
    pub fn new(model: &'m SemanticModel) -> Self {
        Self { model }
    }

    /// Plan the rename that fixes `finding`.
    ///
    /// # Errors
    ///
    /// [`PlanError::UnresolvedSymbol`] if no symbol is declared at the finding,
    /// [`PlanError::NameCollision`] if the new name is already taken where the
    /// symbol is visible, [`PlanError::Cancelled`] on cancellation, and the
    /// errors of [`Self::plan_symbol`].
    pub fn plan(&self, finding: &Finding, cancel: &CancellationToken) -> Result<RenamePlan, PlanError> {
        check(cancel)?;
        let symbol = self.resolve(finding)?;
        self.plan_symbol(symbol, cancel)
    }

    fn resolve(&self, finding: &Finding) -> Result<SymbolId, PlanError> {
        let location = &finding.location;
        let unresolved = || PlanError::UnresolvedSymbol {
            path: location.path.clone(),
            span: location.span,
        };
        let file = self.model.program().file(location.file).ok_or_else(unresolved)?;
        let decl_span = match self.model.declared_symbol(file.id(), location.span) {
            Some(_) => location.span,
            None => DeclarationClassifier
                .relocate(file, location.span, finding.kind)
                .map(|node| Span::from(node.syntax().text_range()))
                .ok_or_else(unresolved)?,
        };
        let symbol = self
            .model
            .declared_symbol(file.id(), decl_span)
            .ok_or_else(unresolved)?;
        if self.model.symbol(symbol).map(|s| s.name.as_str()) != Some(finding.identifier.as_str()) {
            return Err(unresolved());
        }
        Ok(symbol)
    }

    /// Plan renaming `symbol` to its replacement name.
    ///
    /// # Errors
    ///
    /// [`PlanError::UnresolvedSymbol`] if `symbol` does not belong to the
    /// model, [`PlanError::AmbiguousReference`] if a call could bind to it or
    /// to an overload, [`PlanError::LinkedMember`] if it overrides or
    /// implements a member elsewhere; otherwise see [`Self::plan`].
    pub fn plan_symbol(&self, symbol: SymbolId, cancel: &CancellationToken) -> Result<RenamePlan, PlanError> {
        let target = self.model.symbol(symbol).ok_or_else(|| PlanError::UnresolvedSymbol {
            path: "<unknown>".to_string(),
            span: Span { start: 0, end: 0 },
        })?;
        let new_name = replacement_name(&target.name);
        self.check_ambiguous_uses(target, cancel)?;
        self.check_linked_members(target)?;
        self.check_collisions(target, &new_name, cancel)?;

        tracing::debug!(
            symbol = %target.name,
            new_name = %new_name,
            kind = target.kind.label(),
            references = self.model.references_to(symbol).count(),
            "planned rename"
        );
        Ok(RenamePlan {
            symbol,
            kind: target.kind,
            old_name: target.name.clone(),
            new_name,
            revision: self.model.revision(),
            file: target.file,
            name_span: target.name_span,
        })
    }

    /// Uses left unbound because several overloads fit might mean `target`.
    fn check_ambiguous_uses(&self, target: &Symbol, cancel: &CancellationToken) -> Result<(), PlanError> {
        for reference in self.model.references_named(&target.name) {
            check(cancel)?;
            if reference.target.is_none() && self.model.candidates(reference).contains(&target.id) {
                let path = self.path_of(reference.file);
                tracing::warn!(name = %target.name, path, offset = reference.span.start, "rename rejected: ambiguous use");
                return Err(PlanError::AmbiguousReference {
                    name: target.name.clone(),
                    path: path.to_string(),
                    offset: reference.span.start,
                });
            }
        }
        Ok(())
    }

    /// Members sharing a name across a type hierarchy override or implement
    /// each other; renaming one alone would break that link.
    fn check_linked_members(&self, target: &Symbol) -> Result<(), PlanError> {
        if !matches!(target.kind, SymbolKind::Method | SymbolKind::Property | SymbolKind::Event) {
            return Ok(());
        }
        let Some(owner) = target.container else {
            return Ok(());
        };
        let model = self.model;
        let mut related = Vec::new();
        let mut pending = vec![owner];
        while let Some(ty) = pending.pop() {
            let next: Vec<SymbolId> = model
                .base_types(ty)
                .iter()
                .copied()
                .chain(model.derived_types(ty))
                .filter(|t| *t != owner && !related.contains(t))
                .collect();
            related.extend(next.iter().copied());
            pending.extend(next);
        }
        let linked = related
            .iter()
            .flat_map(|ty| model.members_named(*ty, &target.name))
            .find_map(|id| model.symbol(id));
        match linked {
            Some(other) => {
                let path = self.path_of(other.file);
                tracing::warn!(name = %target.name, path, "rename rejected: linked member");
                Err(PlanError::LinkedMember {
                    name: target.name.clone(),
                    other: format!("{} '{}' in {path}", other.kind.label(), other.name),
                })
            }
            None => Ok(()),
        }
    }

    fn check_collisions(&self, target: &Symbol, new_name: &str, cancel: &CancellationToken) -> Result<(), PlanError> {
        let model = self.model;
        let symbol = target.id;
        let hypothetical = Some(Hypothetical {
            symbol,
            name: new_name,
        });

        // Bindings already visible at the declaration, own scope included.
        check(cancel)?;
        match model.resolve_name(target.scope, new_name, false, None) {
            Resolution::Unique(existing) | Resolution::Ambiguous(existing, _) => {
                return Err(self.collision(new_name, existing));
            }
            Resolution::Unresolved => {}
        }

        // Bindings in nested scopes that would shadow the renamed symbol.
        for scope in model.scopes_within(target.scope) {
            if let Some(existing) = model.scope(scope).and_then(|s| s.symbols_named(new_name).first().copied()) {
                return Err(self.collision(new_name, existing));
            }
        }

        // Every use must still reach the symbol under its new name.
        for reference in model.references_to(symbol) {
            check(cancel)?;
            match model.re_resolve(reference, hypothetical) {
                Resolution::Unique(id) if id == symbol => {}
                resolution => return Err(self.capture(new_name, reference, resolution)),
            }
        }

        // Existing uses of the new name must keep their meaning.
        for reference in model.references_named(new_name) {
            check(cancel)?;
            let after = model.re_resolve(reference, hypothetical);
            if after.symbol() != reference.target || matches!(after, Resolution::Ambiguous(..)) {
                return Err(self.capture(new_name, reference, after));
            }
        }
        Ok(())
    }

    fn path_of(&self, file: FileId) -> &'m str {
        self.model.program().file(file).map_or("<unknown>", |f| f.path())
    }

    fn collision(&self, new_name: &str, existing: SymbolId) -> PlanError {
        let conflict = match self.model.symbol(existing) {
            Some(existing) => {
                let path = self.path_of(existing.file);
                tracing::warn!(new_name, existing = %existing.name, path, "rename rejected: name collision");
                format!("{} '{}' in {path}", existing.kind.label(), existing.name)
            }
            None => "an unknown symbol".to_string(),
        };
        PlanError::NameCollision {
            new_name: new_name.to_string(),
            conflict,
        }
    }

    fn capture(&self, new_name: &str, reference: &Reference, resolution: Resolution) -> PlanError {
        match resolution {
            Resolution::Unique(id) | Resolution::Ambiguous(id, _) => self.collision(new_name, id),
            Resolution::Unresolved => {
                let path = self.path_of(reference.file);
                tracing::warn!(new_name, path, "rename rejected: reference would no longer resolve");
                PlanError::NameCollision {
                    new_name: new_name.to_string(),
                    conflict: format!(
                        "a use of '{}' in {path} at offset {}",
                        reference.name, reference.span.start
                    ),
                }
            }
        }
    }
}

fn check(cancel: &CancellationToken) -> Result<(), PlanError> {
    if cancel.is_cancelled() {
        Err(PlanError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_name() {
        assert_eq!(replacement_name("Int"), "intValue");
        assert_eq!(replacement_name("int"), "intValue");
        assert_eq!(replacement_name("UInt64"), "uInt64Value");
        assert_eq!(replacement_name("String"), "stringValue");
    }
}
