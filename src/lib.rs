//! # scopebridge
//!
//! Name resolution for translating class-based, nested-scope programs into
//! prototype-based, function-scoped JavaScript.
//!
//! Every method call, identifier and field access in a type-checked syntax
//! tree is mapped to the fully-qualified name it refers to, keyed by its
//! source position. Constructs that have no faithful JavaScript rendering
//! (implicit access to an enclosing instance from a nested type) and names
//! outside the configured library surface are rejected.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → multi-file driver (FileSet, parallel Workspace pass)
//!   ↓
//! hir     → scopes, cursor, policy, resolver, canonical names
//!   ↓
//! syntax  → typed syntax tree consumed by the resolver
//!   ↓
//! base    → primitives (FileId, LineCol, SourcePosition)
//! ```

/// Foundation types: FileId, positions, line index
pub mod base;

/// Semantic model: scope tree and name resolution
pub mod hir;

/// File set and multi-file driver
pub mod project;

/// Typed syntax tree shape
pub mod syntax;

pub use base::{FileId, LineCol, LineIndex, SourcePosition, TextRange, TextSize};
pub use hir::{
    CanonicalNames, Diagnostic, QualifiedName, Resolution, ResolutionPolicy, ResolveError,
    ScopeOrigin, ScopeTree, ScopeTreeBuilder, resolve_file,
};
pub use project::{FileSet, Workspace, WorkspaceResolution};
pub use syntax::{Node, NodeKind};
