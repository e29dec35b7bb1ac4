//! Error types for analysis and settings.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_ast::AstError;
use thiserror::Error;

/// Error types for lint operations.
#[derive(Error, Debug)]
pub enum LintError {
    /// Reading a settings file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid YAML for [`crate::LintSettings`].
    #[error("Settings error: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// Loading the program to analyze failed.
    #[error("Program error: {0}")]
    Program(#[from] AstError),
}
