//! Semantic model: scopes, name resolution and canonical naming.
//!
//! [`ScopeTreeBuilder`] produces the per-file [`ScopeTree`] upstream of the
//! walk; [`resolve_file`] pairs it with the syntax tree and yields a
//! [`Resolution`]. [`CanonicalNames`] is the emitter-facing half: it turns
//! declared types into their output names.

pub mod canonical;
pub mod cursor;
pub mod diagnostics;
pub mod names;
pub mod policy;
pub mod resolve;
pub mod scope;

pub use canonical::{CanonicalNames, ResolvedType, ResolvedTypes, TypeDecl, TypeId, TypeTable};
pub use cursor::ScopeCursor;
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, OuterAccess, ResolveError, Severity, codes,
};
pub use names::{
    IdentifierName, MethodName, NameKind, NameType, QualifiedName, ScopeOrigin, TypeName,
};
pub use policy::{DEFAULT_BASE_CLASSES, DEFAULT_BASE_NAMESPACE, PolicyBuilder, ResolutionPolicy};
pub use resolve::{NameResolver, Resolution, resolve_file};
pub use scope::{DeclKind, Declaration, ScopeData, ScopeId, ScopeKind, ScopeTree, ScopeTreeBuilder};
