//! Analysis driver - runs a [`NodeRule`] over every node of a program.
//!
//! Files are processed in parallel with rayon. A panic inside the rule costs
//! only the node it happened on: it is recorded as a [`Fault`] and the pass
//! continues.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use omni_ast::{FileId, LoadConfig, Program, SourceFile, Span};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::LintError;
use crate::finding::Finding;
use crate::rule::{IdentifierRule, NodeRule};

/// Internal failure while evaluating one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    /// File of the node.
    pub file: FileId,
    /// File path.
    pub path: String,
    /// Node span.
    pub span: Span,
    /// Panic message.
    pub message: String,
}

/// Outcome of one analysis pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// Findings sorted by file then offset.
    pub findings: Vec<Finding>,
    /// Per-node faults, kept apart from findings.
    pub faults: Vec<Fault>,
    /// Number of files visited.
    pub files_scanned: usize,
}

impl AnalysisReport {
    /// No findings and no faults.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.faults.is_empty()
    }
}

/// Drives a rule over programs.
#[derive(Debug, Clone)]
pub struct Analyzer<R> {
    rule: R,
}

impl Default for Analyzer<IdentifierRule<'static>> {
    fn default() -> Self {
        Self::new(IdentifierRule::default())
    }
}

impl<R: NodeRule> Analyzer<R> {
    /// Analyzer for `rule`.
    pub fn new(rule: R) -> Self {
        Self { rule }
    }

    /// The rule being applied.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Analyze every file of `program`.
    pub fn analyze(&self, program: &Program) -> AnalysisReport {
        let per_file: Vec<(Vec<Finding>, Vec<Fault>)> = program
            .files()
            .par_iter()
            .map(|file| self.analyze_file(file))
            .collect();

        let mut report = AnalysisReport {
            files_scanned: per_file.len(),
            ..AnalysisReport::default()
        };
        for (findings, faults) in per_file {
            report.findings.extend(findings);
            report.faults.extend(faults);
        }
        report
            .findings
            .sort_by_key(|f| (f.location.file, f.location.span.start));

        tracing::debug!(
            revision = program.revision(),
            files = report.files_scanned,
            findings = report.findings.len(),
            faults = report.faults.len(),
            "analysis complete"
        );
        report
    }

    /// Load `root` and analyze it.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::Program`] when loading fails.
    pub fn analyze_dir(&self, root: &Path, config: &LoadConfig) -> Result<(Program, AnalysisReport), LintError> {
        let program = Program::load_dir(root, config)?;
        let report = self.analyze(&program);
        Ok((program, report))
    }

    /// Analyze one file, nodes in preorder.
    pub fn analyze_file(&self, file: &SourceFile) -> (Vec<Finding>, Vec<Fault>) {
        let mut findings = Vec::new();
        let mut faults = Vec::new();
        for node in file.syntax().descendants() {
            match panic::catch_unwind(AssertUnwindSafe(|| self.rule.evaluate(file, &node))) {
                Ok(Some(finding)) => findings.push(finding),
                Ok(None) => {}
                Err(payload) => {
                    let message = if let Some(s) = payload.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic".to_string()
                    };
                    let span = Span::from(node.text_range());
                    tracing::warn!(
                        path = file.path(),
                        start = span.start,
                        error = %message,
                        "rule evaluation failed; skipping node"
                    );
                    faults.push(Fault {
                        file: file.id(),
                        path: file.path().to_string(),
                        span,
                        message,
                    });
                }
            }
        }
        (findings, faults)
    }
}
