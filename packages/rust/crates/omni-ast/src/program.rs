//! Immutable program snapshots.
//!
//! A [`Program`] is a set of parsed source files tagged with a process-unique
//! revision. Snapshots are never mutated: [`Program::with_trees`] returns a
//! new snapshot that shares every untouched file's green tree with the old one.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rowan::GreenNode;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::AstError;
use crate::line_index::LineIndex;
use crate::parser::{ParseError, parse};
use crate::syntax_kind::SyntaxNode;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Index of a file within its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub u32);

/// One parsed source file. Cloning is cheap: all payloads are shared.
#[derive(Debug, Clone)]
pub struct SourceFile {
    id: FileId,
    path: Arc<str>,
    green: GreenNode,
    errors: Arc<[ParseError]>,
    line_index: Arc<LineIndex>,
}

impl SourceFile {
    fn parse(id: FileId, path: &str, text: &str) -> Self {
        let (green, errors) = parse(text).into_parts();
        Self {
            id,
            path: path.into(),
            green,
            errors: errors.into(),
            line_index: Arc::new(LineIndex::new(text)),
        }
    }

    fn with_green(&self, green: GreenNode) -> Self {
        let text = SyntaxNode::new_root(green.clone()).text().to_string();
        // Error offsets are recomputed only when there is something to move.
        let errors = if self.errors.is_empty() {
            Arc::clone(&self.errors)
        } else {
            parse(&text).into_parts().1.into()
        };
        Self {
            id: self.id,
            path: Arc::clone(&self.path),
            green,
            errors,
            line_index: Arc::new(LineIndex::new(&text)),
        }
    }

    /// File id within the owning program.
    #[must_use]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Path as given when the program was built.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Green tree root (thread-safe, cheap to clone).
    #[must_use]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Fresh red-tree root for traversal on the current thread.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Full source text.
    #[must_use]
    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    /// Recovered parse errors.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Offset to line/column table.
    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// Options for [`Program::load_dir`].
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extensions to include (without the dot).
    pub extensions: Vec<String>,
    /// Maximum file size in bytes (default 1MB).
    pub max_file_size: u64,
    /// Directory names to skip.
    pub skip_dirs: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["cs".to_string()],
            max_file_size: 1024 * 1024,
            skip_dirs: vec![".git".to_string(), "bin".to_string(), "obj".to_string()],
        }
    }
}

/// Immutable snapshot of every analyzed source file.
#[derive(Debug, Clone)]
pub struct Program {
    revision: u64,
    files: Arc<[SourceFile]>,
}

impl Program {
    /// Parse in-memory sources; file ids follow iteration order.
    pub fn from_sources<I, P, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let files: Vec<SourceFile> = sources
            .into_iter()
            .enumerate()
            .map(|(idx, (path, text))| {
                let id = FileId(u32::try_from(idx).unwrap_or(u32::MAX));
                SourceFile::parse(id, path.as_ref(), text.as_ref())
            })
            .collect();
        tracing::debug!(files = files.len(), "parsed program");
        Self {
            revision: next_revision(),
            files: files.into(),
        }
    }

    /// Load every matching file under `root`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`AstError`] when traversal or reading fails, or a file is too
    /// large or not UTF-8.
    pub fn load_dir(root: &Path, config: &LoadConfig) -> Result<Self, AstError> {
        let mut sources = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && config
                        .skip_dirs
                        .iter()
                        .any(|skip| entry.file_name().to_string_lossy() == *skip))
            });
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .map(|e| e.to_string_lossy())
                .is_some_and(|ext| config.extensions.iter().any(|want| *want == ext));
            if !matches_ext {
                continue;
            }
            let display = path.display().to_string();
            let size = entry.metadata()?.len();
            if size > config.max_file_size {
                return Err(AstError::TooLarge {
                    path: display,
                    size,
                    limit: config.max_file_size,
                });
            }
            let bytes = std::fs::read(path).map_err(|source| AstError::Io {
                path: display.clone(),
                source,
            })?;
            let text = String::from_utf8(bytes).map_err(|_| AstError::Encoding(display.clone()))?;
            sources.push((display, text));
        }
        Ok(Self::from_sources(sources))
    }

    /// Process-unique snapshot revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All files in id order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// File by id.
    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    /// File by the path it was loaded with.
    #[must_use]
    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path() == path)
    }

    /// New snapshot where the listed files carry new trees. Files not listed
    /// keep sharing their trees with `self`; `self` is left untouched.
    #[must_use]
    pub fn with_trees(&self, trees: Vec<(FileId, GreenNode)>) -> Self {
        let mut files: Vec<SourceFile> = self.files.to_vec();
        for (id, green) in trees {
            if let Some(slot) = files.get_mut(id.0 as usize) {
                *slot = slot.with_green(green);
            }
        }
        Self {
            revision: next_revision(),
            files: files.into(),
        }
    }
}
