//! Source files of a translation run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::{FileId, LineIndex};
use crate::hir::Diagnostic;

/// Assigns stable [`FileId`]s to paths and keeps each file's text together
/// with its [`LineIndex`].
///
/// Shared by reference between the per-file resolution jobs, so all access
/// goes through one lock.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    ids: IndexMap<PathBuf, FileId>,
    paths: IndexMap<FileId, PathBuf>,
    sources: IndexMap<FileId, SourceText>,
    next_id: u32,
}

#[derive(Debug, Clone)]
struct SourceText {
    text: Arc<str>,
    lines: LineIndex,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of `path`, assigning the next free one on first sight.
    pub fn file_id(&self, path: &Path) -> FileId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.ids.get(path) {
                return id;
            }
        }

        let mut inner = self.inner.write();
        // another writer may have won the race
        if let Some(&id) = inner.ids.get(path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.ids.insert(path.to_owned(), id);
        inner.paths.insert(id, path.to_owned());
        id
    }

    /// Get the path a file was registered under.
    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().paths.get(&file).cloned()
    }

    /// Replace the text of `file` and re-index its lines.
    pub fn set_contents(&self, file: FileId, contents: impl Into<Arc<str>>) {
        let text: Arc<str> = contents.into();
        let lines = LineIndex::new(&text);
        self.inner
            .write()
            .sources
            .insert(file, SourceText { text, lines });
    }

    /// Get the text of a file, if it was set.
    pub fn contents(&self, file: FileId) -> Option<Arc<str>> {
        self.inner.read().sources.get(&file).map(|s| s.text.clone())
    }

    /// Text of `line` (0-indexed) without its terminator.
    pub fn line_text(&self, file: FileId, line: u32) -> Option<String> {
        let inner = self.inner.read();
        let source = inner.sources.get(&file)?;
        let range = source.lines.line_range(line)?;
        Some(source.text[range].trim_end_matches('\r').to_string())
    }

    /// Render a diagnostic against the file's path, or its id when unknown.
    ///
    /// When the file's text is known, the offending line follows with a
    /// caret under the column:
    ///
    /// ```text
    /// src/App.java:3:5: error[E0102]: ...
    ///   |     forbidden.pkg.Thing t;
    ///   |     ^
    /// ```
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let path = self
            .path(diagnostic.file)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| diagnostic.file.to_string());
        let head = diagnostic.render(&path);
        match self.line_text(diagnostic.file, diagnostic.line) {
            Some(line) => {
                let caret = format!("{:>width$}", "^", width = diagnostic.col as usize + 1);
                format!("{head}\n  | {line}\n  | {caret}")
            }
            None => head,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All ids in assignment order.
    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().paths.keys().copied().collect()
    }
}
