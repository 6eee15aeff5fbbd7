//! Canonical output names for (possibly nested) types.
//!
//! A nested type `Outer.Inner` whose root `Outer` is emitted into namespace
//! `ns` is addressed as `ns.Outer.Inner` in generated code. Computing a name
//! also records the root type so the emitter knows which types the file
//! depends on. That record is an explicit value, [`ResolvedTypes`], handed
//! back by [`CanonicalNames::finish`].

use std::fmt;

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::trace;

use super::policy::DEFAULT_BASE_NAMESPACE;

/// Index of a type in a [`TypeTable`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeId(u32);

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// A declared class, interface or enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub simple_name: SmolStr,
    /// Source package; only meaningful on root types.
    pub package: Option<SmolStr>,
    pub enclosing: Option<TypeId>,
    /// Output namespace; only meaningful on root types.
    pub namespace: Option<SmolStr>,
}

/// Declared types known to the compilation, shared read-only across files.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeDecl>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(decl);
        id
    }

    /// A top-level type.
    pub fn add_root(
        &mut self,
        package: Option<&str>,
        simple_name: &str,
        namespace: Option<&str>,
    ) -> TypeId {
        self.push(TypeDecl {
            simple_name: simple_name.into(),
            package: package.map(SmolStr::from),
            enclosing: None,
            namespace: namespace.map(SmolStr::from),
        })
    }

    /// A member type of `enclosing`.
    pub fn add_nested(&mut self, enclosing: TypeId, simple_name: &str) -> TypeId {
        self.push(TypeDecl {
            simple_name: simple_name.into(),
            package: None,
            enclosing: Some(enclosing),
            namespace: None,
        })
    }

    /// Get a declaration by id.
    pub fn get(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `id`, then each enclosing type outward.
    pub fn enclosing_chain(&self, id: TypeId) -> impl Iterator<Item = (TypeId, &TypeDecl)> + '_ {
        std::iter::successors(self.get(id).map(|decl| (id, decl)), move |(_, decl)| {
            let outer = decl.enclosing?;
            self.get(outer).map(|odecl| (outer, odecl))
        })
    }

    /// The outermost type enclosing `id` (or `id` itself).
    pub fn root_of(&self, id: TypeId) -> Option<TypeId> {
        self.enclosing_chain(id).last().map(|(root, _)| root)
    }

    /// Dotted name in the source language: `package.Outer.Inner`.
    pub fn source_name(&self, id: TypeId) -> Option<String> {
        let (path, root) = self.nesting_path(id)?;
        Some(match &root.package {
            Some(package) => format!("{package}.{path}"),
            None => path,
        })
    }

    /// `Outer.Inner` plus the root's declaration.
    fn nesting_path(&self, id: TypeId) -> Option<(String, &TypeDecl)> {
        let mut chain: Vec<&TypeDecl> = self.enclosing_chain(id).map(|(_, decl)| decl).collect();
        let root = *chain.last()?;
        chain.reverse();
        let path = chain
            .iter()
            .map(|decl| decl.simple_name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        Some((path, root))
    }
}

/// A type as the emitter sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedType {
    Declared(TypeId),
    /// Primitives, arrays and anything else printed verbatim.
    Other(SmolStr),
}

/// Distinct root types referenced by a run, by source name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedTypes {
    roots: IndexSet<SmolStr>,
}

impl ResolvedTypes {
    /// Check if a root type was referenced, by its source name.
    pub fn contains(&self, source_name: &str) -> bool {
        self.roots.contains(source_name)
    }

    /// Source names in first-reference order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Add every root of `other`.
    pub fn extend(&mut self, other: ResolvedTypes) {
        self.roots.extend(other.roots);
    }
}

/// Computes canonical names and collects the root types they touch.
#[derive(Debug)]
pub struct CanonicalNames<'t> {
    types: &'t TypeTable,
    base_namespace: SmolStr,
    resolved: ResolvedTypes,
}

impl<'t> CanonicalNames<'t> {
    pub fn new(types: &'t TypeTable) -> Self {
        Self::with_base_namespace(types, DEFAULT_BASE_NAMESPACE)
    }

    /// Roots inside `base_namespace` are never registered.
    pub fn with_base_namespace(types: &'t TypeTable, base_namespace: &str) -> Self {
        Self {
            types,
            base_namespace: base_namespace.into(),
            resolved: ResolvedTypes::default(),
        }
    }

    /// `namespace.Outer.Inner`, or `Outer.Inner` when the root has no output
    /// namespace. `None` for an id from another table.
    pub fn canonical_name(&mut self, ty: TypeId) -> Option<String> {
        let (path, root) = self.types.nesting_path(ty)?;
        let name = match &root.namespace {
            Some(namespace) => format!("{namespace}.{path}"),
            None => path,
        };

        if let Some(root_id) = self.types.root_of(ty) {
            self.register(root_id);
        }
        trace!("canonical name of {:?}: {}", ty, name);
        Some(name)
    }

    /// Canonical name of a declared type; any other type is printed as is.
    pub fn canonical_type_name(&mut self, ty: &ResolvedType) -> Option<String> {
        match ty {
            ResolvedType::Declared(id) => self.canonical_name(*id),
            ResolvedType::Other(text) => Some(text.to_string()),
        }
    }

    fn register(&mut self, root: TypeId) {
        let Some(source_name) = self.types.source_name(root) else {
            return;
        };
        let in_base = source_name
            .strip_prefix(self.base_namespace.as_str())
            .is_some_and(|rest| rest.starts_with('.'));
        if !in_base {
            self.resolved.roots.insert(source_name.into());
        }
    }

    /// Roots registered so far.
    pub fn resolved_types(&self) -> &ResolvedTypes {
        &self.resolved
    }

    /// Consume the builder, returning every root it registered.
    pub fn finish(self) -> ResolvedTypes {
        self.resolved
    }
}
