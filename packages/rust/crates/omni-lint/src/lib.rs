//! omni-lint - Type-name identifier rule (CA1720)
//!
//! Flags type, method, property and parameter declarations whose name is a
//! primitive or common type name such as `int`, `string` or `pointer`.
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-lint/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # LintError enum (thiserror)
//! ├── banned.rs     # BannedNameSet (process-wide, immutable)
//! ├── classify.rs   # DeclarationClassifier, DeclarationNode
//! ├── finding.rs    # Finding, Category, Severity, Location
//! ├── rule.rs       # IdentifierRule, RuleConfig, NodeRule
//! ├── settings.rs   # YAML settings -> RuleConfig
//! └── analyzer.rs   # Parallel driver with per-node fault isolation
//! ```
//!
//! # Example
//!
//! ```rust
//! use omni_ast::Program;
//! use omni_lint::Analyzer;
//!
//! let program = Program::from_sources([("a.cs", "class A { void int(string str) { } }")]);
//! let report = Analyzer::default().analyze(&program);
//! assert_eq!(report.findings.len(), 1);
//! assert_eq!(report.findings[0].message, "Method 'int' contains type name");
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod analyzer;
mod banned;
mod classify;
mod error;
mod finding;
mod rule;
mod settings;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use analyzer::{AnalysisReport, Analyzer, Fault};
pub use banned::{BannedNameSet, TYPE_NAMES};
pub use classify::{Classified, DeclarationClassifier, DeclarationKind, DeclarationNode};
pub use error::LintError;
pub use finding::{Category, Finding, Location, RULE_DESCRIPTION, RULE_ID, Severity, message};
pub use rule::{IdentifierRule, NodeRule, RuleConfig};
pub use settings::{LintSettings, TypeNameSettings};
