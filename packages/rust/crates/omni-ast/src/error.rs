//! Error types for loading programs.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for program loading.
#[derive(Error, Debug)]
pub enum AstError {
    /// Low-level I/O error while reading a source file.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Source file exceeds the configured size limit.
    #[error("File too large: {path} ({size} bytes, limit: {limit})")]
    TooLarge {
        /// Offending path.
        path: String,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Source file is not valid UTF-8.
    #[error("UTF-8 decoding error: {0}")]
    Encoding(String),
}
