//! Multi-file driver: resolves every compilation unit of a run in parallel.
//!
//! Files are independent once their scope trees are built, so each one gets
//! its own [`NameResolver`](crate::hir::NameResolver) on the rayon pool. A
//! hard error aborts only the file it occurred in; the other files' results
//! are kept and the error is reported as a [`Diagnostic`].

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::base::FileId;
use crate::hir::{
    Diagnostic, DiagnosticCollector, Resolution, ResolutionPolicy, ResolveError, ScopeTree,
    resolve_file,
};
use crate::syntax::Node;
use super::files::FileSet;

/// One compilation unit ready for resolution.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub file: FileId,
    pub syntax: Node,
    pub scopes: ScopeTree,
}

/// The files of a run and their pre-built inputs.
#[derive(Debug, Default)]
pub struct Workspace {
    files: FileSet,
    units: IndexMap<FileId, SourceUnit>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Register `path` with its syntax and scope trees. Adding a path twice
    /// replaces the earlier unit.
    pub fn add(&mut self, path: impl AsRef<Path>, syntax: Node, scopes: ScopeTree) -> FileId {
        let file = self.files.file_id(path.as_ref());
        self.units.insert(file, SourceUnit { file, syntax, scopes });
        file
    }

    /// As [`add`](Self::add), also keeping the source text for diagnostics.
    pub fn add_source(
        &mut self,
        path: impl AsRef<Path>,
        contents: impl Into<Arc<str>>,
        syntax: Node,
        scopes: ScopeTree,
    ) -> FileId {
        let file = self.add(path, syntax, scopes);
        self.files.set_contents(file, contents);
        file
    }

    /// Get the unit registered for `file`.
    pub fn unit(&self, file: FileId) -> Option<&SourceUnit> {
        self.units.get(&file)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolve every unit against `policy`. Results keep registration order.
    pub fn resolve_all(&self, policy: &ResolutionPolicy) -> WorkspaceResolution {
        let units: Vec<&SourceUnit> = self.units.values().collect();
        let outcomes: Vec<(FileId, Result<Resolution, ResolveError>)> = units
            .par_iter()
            .map(|unit| (unit.file, resolve_file(unit.file, &unit.syntax, &unit.scopes, policy)))
            .collect();

        let mut result = WorkspaceResolution::default();
        for (file, outcome) in outcomes {
            match outcome {
                Ok(resolution) => {
                    result.outcomes.insert(file, Ok(resolution));
                }
                Err(err) => {
                    warn!("{}: resolution aborted: {}", file, err);
                    result.diagnostics.add_error(&err);
                    result.outcomes.insert(file, Err(err));
                }
            }
        }
        debug!(
            "resolved {} file(s), {} aborted",
            result.outcomes.len(),
            result.diagnostics.error_count()
        );
        result
    }
}

/// Per-file outcomes of [`Workspace::resolve_all`].
#[derive(Debug, Default)]
pub struct WorkspaceResolution {
    outcomes: IndexMap<FileId, Result<Resolution, ResolveError>>,
    diagnostics: DiagnosticCollector,
}

impl WorkspaceResolution {
    /// Results of a file whose pass completed.
    pub fn resolution(&self, file: FileId) -> Option<&Resolution> {
        self.outcomes.get(&file)?.as_ref().ok()
    }

    /// The error that aborted a file.
    pub fn error(&self, file: FileId) -> Option<&ResolveError> {
        self.outcomes.get(&file)?.as_ref().err()
    }

    /// Every file's outcome in registration order.
    pub fn outcomes(&self) -> impl Iterator<Item = (FileId, &Result<Resolution, ResolveError>)> {
        self.outcomes.iter().map(|(file, outcome)| (*file, outcome))
    }

    /// One error diagnostic per aborted file.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    /// No file was aborted.
    pub fn is_clean(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
