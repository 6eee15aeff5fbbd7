//! The pre-built lexical scope tree.
//!
//! Scopes live in a flat arena indexed by [`ScopeId`]; parents are plain
//! indices so the tree has no ownership cycles and can be dumped or compared
//! in tests. Index 0 is the root, which holds the implicitly visible
//! base-library types. The compilation unit scope is its first child.
//!
//! ## Lookup
//!
//! Lookups are chain-of-responsibility: the scope's own declarations, then
//! its parent's, up to the root. The nearest declaration wins. A field or
//! method found in a type scope other than the innermost type enclosing the
//! lookup is reported with [`ScopeOrigin::Enclosing`] unless it is static.
//!
//! The tree is produced by the scope-building phase with
//! [`ScopeTreeBuilder`]; its shape must match the contours the resolver
//! advances through (see [`ScopeCursor`](super::ScopeCursor)).

use std::fmt;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::SourcePosition;
use super::names::{IdentifierName, MethodName, NameKind, QualifiedName, ScopeOrigin, TypeName};

// ============================================================================
// SCOPE DATA
// ============================================================================

/// Index of a scope in its [`ScopeTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// What introduced a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Implicit base-library declarations.
    Root,
    /// Package-level types and imports of one file.
    CompilationUnit,
    /// Members a class inherits from its superclass.
    Inherited,
    /// Members declared by a class, interface, enum or anonymous body.
    Members,
    /// Parameters of a method or constructor.
    Callable,
    /// Block, loop or catch clause.
    Block,
}

impl ScopeKind {
    pub fn is_type_scope(self) -> bool {
        matches!(self, ScopeKind::Inherited | ScopeKind::Members)
    }
}

/// What a declared name denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Local variable, parameter, loop or catch variable.
    Variable,
    Field,
    Method,
    Type,
}

/// A name declared in a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: SmolStr,
    /// Dotted output name the occurrence resolves to.
    pub qualified: SmolStr,
    pub kind: DeclKind,
    pub is_static: bool,
}

impl Declaration {
    /// Members are the only declarations bound to an instance.
    fn needs_instance(&self) -> bool {
        matches!(self.kind, DeclKind::Field | DeclKind::Method) && !self.is_static
    }
}

#[derive(Copy, Clone, Debug)]
enum Table {
    Identifiers,
    Methods,
    Types,
}

/// One node of the scope tree.
#[derive(Clone, Debug)]
pub struct ScopeData {
    name: SmolStr,
    kind: ScopeKind,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    /// Qualified name of the type owning an `Inherited`/`Members` scope.
    owner: Option<SmolStr>,
    identifiers: FxHashMap<SmolStr, Declaration>,
    methods: FxHashMap<SmolStr, Declaration>,
    types: FxHashMap<SmolStr, Declaration>,
}

impl ScopeData {
    fn new(
        name: SmolStr,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        owner: Option<SmolStr>,
    ) -> Self {
        Self {
            name,
            kind,
            parent,
            children: Vec::new(),
            owner,
            identifiers: FxHashMap::default(),
            methods: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Declarations of this scope only, any table.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.identifiers
            .values()
            .chain(self.methods.values())
            .chain(self.types.values())
    }

    fn table(&self, table: Table) -> &FxHashMap<SmolStr, Declaration> {
        match table {
            Table::Identifiers => &self.identifiers,
            Table::Methods => &self.methods,
            Table::Types => &self.types,
        }
    }

    fn table_mut(&mut self, kind: DeclKind) -> &mut FxHashMap<SmolStr, Declaration> {
        match kind {
            DeclKind::Variable | DeclKind::Field => &mut self.identifiers,
            DeclKind::Method => &mut self.methods,
            DeclKind::Type => &mut self.types,
        }
    }
}

// ============================================================================
// SCOPE TREE
// ============================================================================

/// Arena of scopes for one compilation unit.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    /// Get the root scope holding the base library and imports.
    pub fn root(&self) -> ScopeId {
        ScopeId::ROOT
    }

    /// Get a scope by id; `None` for an id from another tree.
    pub fn get(&self, id: ScopeId) -> Option<&ScopeData> {
        self.scopes.get(id.index())
    }

    /// Child scopes of `id` in document order.
    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        self.get(id).map(ScopeData::children).unwrap_or_default()
    }

    /// Name of a scope, empty for an unknown id.
    pub fn name(&self, id: ScopeId) -> &str {
        self.get(id).map(ScopeData::name).unwrap_or_default()
    }

    /// Number of scopes, root included.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// `id` followed by each parent up to the root.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = (ScopeId, &ScopeData)> + '_ {
        std::iter::successors(self.get(id).map(|data| (id, data)), move |(_, data)| {
            let parent = data.parent?;
            self.get(parent).map(|pdata| (parent, pdata))
        })
    }

    /// Qualified name of the innermost type enclosing `id`.
    pub fn innermost_type(&self, id: ScopeId) -> Option<&str> {
        self.ancestors(id).find_map(|(_, data)| data.owner())
    }

    /// Look up a variable, parameter or field visible from `id`.
    ///
    /// `this.x` is looked up among the innermost type's members only. A
    /// non-static member found in a type scope other than the innermost one
    /// is reported with [`ScopeOrigin::Enclosing`].
    pub fn resolve_identifier(
        &self,
        id: ScopeId,
        pos: SourcePosition,
        name: &str,
    ) -> Option<QualifiedName<IdentifierName>> {
        if let Some(member) = name.strip_prefix("this.") {
            return self.resolve_own_field(id, pos, member);
        }
        self.lookup(id, pos, Table::Identifiers, name)
    }

    /// Look up a method visible from `id`, under the same enclosing rule as
    /// [`resolve_identifier`](Self::resolve_identifier).
    pub fn resolve_method(
        &self,
        id: ScopeId,
        pos: SourcePosition,
        name: &str,
    ) -> Option<QualifiedName<MethodName>> {
        self.lookup(id, pos, Table::Methods, name)
    }

    /// Look up a simple type name visible from `id`.
    pub fn resolve_type(
        &self,
        id: ScopeId,
        pos: SourcePosition,
        name: &str,
    ) -> Option<QualifiedName<TypeName>> {
        self.lookup(id, pos, Table::Types, name)
    }

    fn lookup<K: NameKind>(
        &self,
        id: ScopeId,
        pos: SourcePosition,
        table: Table,
        name: &str,
    ) -> Option<QualifiedName<K>> {
        let mut innermost_owner: Option<&str> = None;

        for (scope_id, scope) in self.ancestors(id) {
            if let Some(owner) = scope.owner() {
                innermost_owner.get_or_insert(owner);
            }
            let Some(decl) = scope.table(table).get(name) else {
                continue;
            };

            let through_outer_instance = scope.owner().is_some()
                && scope.owner() != innermost_owner
                && decl.needs_instance();
            let origin = if through_outer_instance {
                ScopeOrigin::Enclosing
            } else {
                ScopeOrigin::Scope(scope.name.clone())
            };

            trace!(
                "{}: '{}' found in {:?} '{}' -> {}",
                pos,
                name,
                scope_id,
                scope.name,
                decl.qualified
            );
            return Some(QualifiedName::new(decl.qualified.clone(), origin));
        }

        None
    }

    /// `this.<member>`: only the innermost type's own and inherited members.
    fn resolve_own_field(
        &self,
        id: ScopeId,
        pos: SourcePosition,
        member: &str,
    ) -> Option<QualifiedName<IdentifierName>> {
        let field = member.split('.').next().unwrap_or(member);
        let owner = self.innermost_type(id)?;

        self.ancestors(id)
            .skip_while(|(_, scope)| scope.owner().is_none())
            .take_while(|(_, scope)| scope.owner() == Some(owner))
            .find_map(|(_, scope)| {
                let decl = scope.identifiers.get(field)?;
                trace!("{}: 'this.{}' found in '{}'", pos, field, scope.name);
                Some(QualifiedName::new(
                    decl.qualified.clone(),
                    ScopeOrigin::Scope(scope.name.clone()),
                ))
            })
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds a [`ScopeTree`] depth-first, mirroring the syntax walk.
///
/// ```
/// use scopebridge::hir::{ScopeKind, ScopeTreeBuilder};
///
/// let mut builder = ScopeTreeBuilder::new();
/// builder
///     .enter(ScopeKind::CompilationUnit, "app")
///     .declare_type("Main", "app.Main")
///     .enter_members("Main", "app.Main")
///     .declare_field("count", false)
///     .exit()
///     .exit();
/// let tree = builder.finish();
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug)]
pub struct ScopeTreeBuilder {
    scopes: Vec<ScopeData>,
    stack: Vec<ScopeId>,
}

impl Default for ScopeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTreeBuilder {
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData::new("<root>".into(), ScopeKind::Root, None, None)],
            stack: vec![ScopeId::ROOT],
        }
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::ROOT)
    }

    fn push(&mut self, name: SmolStr, kind: ScopeKind, owner: Option<SmolStr>) -> &mut Self {
        let parent = self.current();
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData::new(name, kind, Some(parent), owner));
        self.scopes[parent.index()].children.push(id);
        self.stack.push(id);
        self
    }

    /// Open a child scope of the current scope.
    pub fn enter(&mut self, kind: ScopeKind, name: impl Into<SmolStr>) -> &mut Self {
        self.push(name.into(), kind, None)
    }

    /// Open the member scope of type `owner` (its qualified name).
    pub fn enter_members(
        &mut self,
        name: impl Into<SmolStr>,
        owner: impl Into<SmolStr>,
    ) -> &mut Self {
        self.push(name.into(), ScopeKind::Members, Some(owner.into()))
    }

    /// Open the scope holding what `owner` inherits from its superclass.
    pub fn enter_inherited(
        &mut self,
        name: impl Into<SmolStr>,
        owner: impl Into<SmolStr>,
    ) -> &mut Self {
        self.push(name.into(), ScopeKind::Inherited, Some(owner.into()))
    }

    /// Close the current scope. The root is never closed.
    pub fn exit(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// Add a declaration to the current scope, replacing one of the same name
    /// and table.
    pub fn declare(&mut self, decl: Declaration) -> &mut Self {
        let current = self.current().index();
        self.scopes[current]
            .table_mut(decl.kind)
            .insert(decl.name.clone(), decl);
        self
    }

    fn member_name(&self, name: &str) -> SmolStr {
        match self.scopes[self.current().index()].owner() {
            Some(owner) => format!("{owner}.{name}").into(),
            None => name.into(),
        }
    }

    pub fn declare_variable(&mut self, name: &str) -> &mut Self {
        self.declare(Declaration {
            name: name.into(),
            qualified: name.into(),
            kind: DeclKind::Variable,
            is_static: false,
        })
    }

    /// A field of the current type; qualified as `<owner>.<name>`.
    pub fn declare_field(&mut self, name: &str, is_static: bool) -> &mut Self {
        let qualified = self.member_name(name);
        self.declare(Declaration {
            name: name.into(),
            qualified,
            kind: DeclKind::Field,
            is_static,
        })
    }

    /// A method of the current type, or a local function inside a block.
    pub fn declare_method(&mut self, name: &str, is_static: bool) -> &mut Self {
        let qualified = self.member_name(name);
        self.declare(Declaration {
            name: name.into(),
            qualified,
            kind: DeclKind::Method,
            is_static,
        })
    }

    pub fn declare_type(&mut self, name: &str, qualified: &str) -> &mut Self {
        self.declare(Declaration {
            name: name.into(),
            qualified: qualified.into(),
            kind: DeclKind::Type,
            is_static: true,
        })
    }

    /// A single-type import: `a.b.C` makes `C` visible as `a.b.C`.
    pub fn import(&mut self, qualified: &str) -> &mut Self {
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);
        self.declare_type(simple, qualified)
    }

    pub fn finish(self) -> ScopeTree {
        ScopeTree { scopes: self.scopes }
    }
}
