//! The type-name identifier rule.
//!
//! One rule parameterized by which categories are enabled; the parameter-only
//! variant is just a narrower [`RuleConfig`].

use omni_ast::{SourceFile, SyntaxNode};

use crate::banned::BannedNameSet;
use crate::classify::DeclarationClassifier;
use crate::finding::{Category, Finding, Location, RULE_ID, Severity, message};

/// Per-node check driven by [`crate::Analyzer`].
///
/// Implementations must be pure: the analyzer calls them from many threads.
pub trait NodeRule: Sync {
    /// Inspect one node; `None` when it is not a violation.
    fn evaluate(&self, file: &SourceFile, node: &SyntaxNode) -> Option<Finding>;
}

/// Which categories are checked and how findings are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConfig {
    /// Enabled categories.
    pub categories: Vec<Category>,
    /// Severity attached to findings.
    pub severity: Severity,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            severity: Severity::Error,
        }
    }
}

impl RuleConfig {
    /// Only parameter names are checked.
    #[must_use]
    pub fn parameters_only() -> Self {
        Self {
            categories: vec![Category::Parameter],
            ..Self::default()
        }
    }

    /// Whether `category` is checked.
    #[must_use]
    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Flags declarations whose identifier is a banned type name.
#[derive(Debug, Clone)]
pub struct IdentifierRule<'a> {
    config: RuleConfig,
    banned: &'a BannedNameSet,
    classifier: DeclarationClassifier,
}

impl Default for IdentifierRule<'static> {
    fn default() -> Self {
        Self::new(RuleConfig::default(), BannedNameSet::standard())
    }
}

impl<'a> IdentifierRule<'a> {
    /// Rule over `banned` with `config`.
    #[must_use]
    pub fn new(config: RuleConfig, banned: &'a BannedNameSet) -> Self {
        Self {
            config,
            banned,
            classifier: DeclarationClassifier,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Banned names in use.
    #[must_use]
    pub fn banned(&self) -> &BannedNameSet {
        self.banned
    }

    /// Whether `identifier` alone would be flagged.
    #[must_use]
    pub fn is_violation(&self, identifier: &str) -> bool {
        let trimmed = identifier.trim();
        !trimmed.is_empty() && self.banned.contains(trimmed)
    }
}

impl NodeRule for IdentifierRule<'_> {
    fn evaluate(&self, file: &SourceFile, node: &SyntaxNode) -> Option<Finding> {
        let classified = self.classifier.classify(node)?;
        let category = Category::of(classified.kind);
        if !self.config.is_enabled(category) || !self.is_violation(&classified.identifier) {
            return None;
        }
        let pos = file.line_index().line_col(classified.span.start);
        Some(Finding {
            id: RULE_ID,
            category,
            kind: classified.kind,
            location: Location {
                file: file.id(),
                path: file.path().to_string(),
                span: classified.span,
                line: pos.line,
                column: pos.column,
            },
            message: message(category, &classified.identifier),
            identifier: classified.identifier,
            severity: self.config.severity,
        })
    }
}
