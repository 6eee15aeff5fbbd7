//! Diagnostics: resolution errors and how they are reported.
//!
//! Name resolution has one soft outcome (a name that resolves to nothing is
//! simply not recorded) and a handful of hard ones, all modelled by
//! [`ResolveError`]. Any hard error aborts the current file's pass. The
//! [`Diagnostic`] form is what the driver hands to presentation layers.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{FileId, SourcePosition};

// ============================================================================
// RESOLUTION ERRORS
// ============================================================================

/// Which kind of outer-instance member was reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OuterAccess {
    Method,
    Field,
}

impl fmt::Display for OuterAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OuterAccess::Method => f.write_str("methods"),
            OuterAccess::Field => f.write_str("fields"),
        }
    }
}

/// A hard failure of the resolution pass.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A name reachable only through an enclosing instance.
    #[error(
        "`{name}`: in JavaScript you cannot access {access} of the outer type from a nested \
         scope. Define a local alias outside the nested function (`var that = this;`) and \
         access the {access} through it"
    )]
    TranslationIncompatible {
        position: SourcePosition,
        name: SmolStr,
        access: OuterAccess,
    },

    /// A fully-qualified name outside the allowed namespaces.
    #[error("the qualified name `{name}` is not part of the allowed packages")]
    PolicyViolation { position: SourcePosition, name: SmolStr },

    /// The walk entered more contours than the scope tree has children.
    #[error(
        "scope tree out of sync with the syntax walk: \
         scope `{scope}` has only {children} child scope(s)"
    )]
    ScopeDesync {
        position: SourcePosition,
        scope: SmolStr,
        children: usize,
    },

    /// Two resolutions recorded for one occurrence.
    #[error("position resolved twice: `{existing}`, then `{name}`")]
    DuplicatePosition {
        position: SourcePosition,
        existing: SmolStr,
        name: SmolStr,
    },
}

impl ResolveError {
    /// Where the offending occurrence starts.
    pub fn position(&self) -> SourcePosition {
        match self {
            ResolveError::TranslationIncompatible { position, .. }
            | ResolveError::PolicyViolation { position, .. }
            | ResolveError::ScopeDesync { position, .. }
            | ResolveError::DuplicatePosition { position, .. } => *position,
        }
    }

    /// Defects in the build/walk contract rather than in user input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ResolveError::ScopeDesync { .. } | ResolveError::DuplicatePosition { .. }
        )
    }

    /// The stable diagnostic code, see [`codes`].
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::TranslationIncompatible { .. } => codes::TRANSLATION_INCOMPATIBLE,
            ResolveError::PolicyViolation { .. } => codes::POLICY_VIOLATION,
            ResolveError::ScopeDesync { .. } => codes::SCOPE_DESYNC,
            ResolveError::DuplicatePosition { .. } => codes::DUPLICATE_POSITION,
        }
    }

    /// Convert to an error diagnostic at the same position.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let position = self.position();
        Diagnostic::error(position.file, position.line(), position.col(), self.to_string())
            .with_code(self.code())
    }
}

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A located message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    /// 0-indexed.
    pub line: u32,
    /// 0-indexed.
    pub col: u32,
    pub severity: Severity,
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            line,
            col,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, line, col, message)
        }
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// `path:line:col: error[CODE]: message`, 1-indexed.
    pub fn render(&self, path: &str) -> String {
        let code = self
            .code
            .as_deref()
            .map(|code| format!("[{code}]"))
            .unwrap_or_default();
        format!(
            "{}:{}:{}: {}{}: {}",
            path,
            self.line + 1,
            self.col + 1,
            self.severity,
            code,
            self.message
        )
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// Member reachable only through an enclosing instance.
    pub const TRANSLATION_INCOMPATIBLE: &str = "E0101";
    /// Qualified name outside the allowed namespaces.
    pub const POLICY_VIOLATION: &str = "E0102";

    /// Scope tree and syntax walk disagree on the number of contours.
    pub const SCOPE_DESYNC: &str = "E0901";
    /// A position was resolved twice.
    pub const DUPLICATE_POSITION: &str = "E0902";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics across a run.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add the error diagnostic for a hard resolution failure.
    pub fn add_error(&mut self, error: &ResolveError) {
        self.add(error.to_diagnostic());
    }

    /// Get all diagnostics in the order they were added.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Count of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check if any errors were collected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
