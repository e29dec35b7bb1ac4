//! Finding records reported by the rule.

use std::fmt;

use omni_ast::{FileId, Span};
use serde::{Deserialize, Serialize};

use crate::classify::DeclarationKind;

/// Stable rule identifier.
pub const RULE_ID: &str = "CA1720";

/// Rule description shown alongside findings.
pub const RULE_DESCRIPTION: &str = "Identifiers should not contain type names";

/// Reporting category; each has its own title and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Type names.
    Member,
    /// Method names.
    Method,
    /// Property names.
    Property,
    /// Parameter names.
    Parameter,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; 4] = [
        Category::Member,
        Category::Method,
        Category::Property,
        Category::Parameter,
    ];

    /// Category for a declaration kind.
    #[must_use]
    pub fn of(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Type(_) => Category::Member,
            DeclarationKind::Method => Category::Method,
            DeclarationKind::Property => Category::Property,
            DeclarationKind::Parameter => Category::Parameter,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Member => "Member",
            Category::Method => "Method",
            Category::Property => "Property",
            Category::Parameter => "Parameter",
        }
    }

    /// `"<Category> name contains type name"`.
    #[must_use]
    pub fn title(self) -> String {
        format!("{} name contains type name", self.label())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a finding is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Not shown.
    Hidden,
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

/// Where a finding points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// File id in the analyzed program.
    pub file: FileId,
    /// File path.
    pub path: String,
    /// Declaration span.
    pub span: Span,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// One reported violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Rule id (`CA1720`).
    pub id: &'static str,
    /// Reporting category.
    pub category: Category,
    /// Declaration kind that triggered it.
    pub kind: DeclarationKind,
    /// Declaration location.
    pub location: Location,
    /// Offending identifier as written.
    pub identifier: String,
    /// `"<Category> '<identifier>' contains type name"`.
    pub message: String,
    /// Configured severity.
    pub severity: Severity,
}

impl Finding {
    /// Title of the category this finding belongs to.
    #[must_use]
    pub fn title(&self) -> String {
        self.category.title()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}",
            self.location.path, self.location.line, self.location.column, self.id, self.message
        )
    }
}

/// Message text for a category and identifier.
#[must_use]
pub fn message(category: Category, identifier: &str) -> String {
    format!("{} '{identifier}' contains type name", category.label())
}
