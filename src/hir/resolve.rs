//! Name resolution: mapping every occurrence to its qualified name.
//!
//! The resolver walks the typed syntax tree depth-first together with a
//! [`ScopeCursor`]. Nodes that open a lexical contour advance the cursor;
//! names, calls, field accesses and type references are resolved against the
//! cursor's scope and recorded by [`SourcePosition`].
//!
//! ## Contours
//!
//! | Node | Cursor |
//! |---|---|
//! | compilation unit, block, catch, method, constructor, for, for-each | one child |
//! | class | inherited-members child (superclass, non-interface only), then its member child |
//! | object creation with anonymous body | one child |
//! | enum | none |
//!
//! ## Outcomes
//!
//! A name that resolves to nothing is skipped silently. Names reachable only
//! through an enclosing instance, qualified names outside the
//! [`ResolutionPolicy`], and any disagreement between walk and scope tree
//! abort the file with a [`ResolveError`]; nothing recorded so far is kept.

use indexmap::IndexMap;
use indexmap::map::Entry;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::base::{FileId, SourcePosition};
use crate::syntax::{Node, NodeKind};
use super::cursor::ScopeCursor;
use super::diagnostics::{OuterAccess, ResolveError};
use super::names::{IdentifierName, MethodName, NameKind, QualifiedName};
use super::policy::ResolutionPolicy;
use super::scope::ScopeTree;

// ============================================================================
// RESULT SET
// ============================================================================

/// The position-keyed resolutions of one file, in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    methods: IndexMap<SourcePosition, QualifiedName<MethodName>>,
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    identifiers: IndexMap<SourcePosition, QualifiedName<IdentifierName>>,
}

impl Resolution {
    /// Calls without an explicit receiver, keyed by the call's position.
    pub fn methods(&self) -> &IndexMap<SourcePosition, QualifiedName<MethodName>> {
        &self.methods
    }

    /// Names and the leftmost variable of field accesses.
    pub fn identifiers(&self) -> &IndexMap<SourcePosition, QualifiedName<IdentifierName>> {
        &self.identifiers
    }

    /// Get the method resolved at `pos`.
    pub fn method_at(&self, pos: SourcePosition) -> Option<&QualifiedName<MethodName>> {
        self.methods.get(&pos)
    }

    /// Get the identifier resolved at `pos`.
    pub fn identifier_at(&self, pos: SourcePosition) -> Option<&QualifiedName<IdentifierName>> {
        self.identifiers.get(&pos)
    }

    /// Total entries across both tables.
    pub fn len(&self) -> usize {
        self.methods.len() + self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.identifiers.is_empty()
    }
}

/// Insert unless the position is already resolved.
fn record<K: NameKind>(
    map: &mut IndexMap<SourcePosition, QualifiedName<K>>,
    pos: SourcePosition,
    qname: QualifiedName<K>,
) -> Result<(), ResolveError> {
    match map.entry(pos) {
        Entry::Occupied(existing) => Err(ResolveError::DuplicatePosition {
            position: pos,
            existing: existing.get().name().into(),
            name: qname.name().into(),
        }),
        Entry::Vacant(slot) => {
            trace!("{}: {:?}", pos, qname);
            slot.insert(qname);
            Ok(())
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolve one file.
///
/// `root` must be the compilation unit and `scopes` the tree built for the
/// same file.
pub fn resolve_file(
    file: FileId,
    root: &Node,
    scopes: &ScopeTree,
    policy: &ResolutionPolicy,
) -> Result<Resolution, ResolveError> {
    NameResolver::new(file, policy).resolve(root, scopes)
}

/// The single-file traversal. One instance per file; consumed by
/// [`resolve`](Self::resolve).
#[derive(Debug)]
pub struct NameResolver<'p> {
    file: FileId,
    policy: &'p ResolutionPolicy,
    resolution: Resolution,
}

impl<'p> NameResolver<'p> {
    /// Create a resolver for `file` checking names against `policy`.
    pub fn new(file: FileId, policy: &'p ResolutionPolicy) -> Self {
        Self {
            file,
            policy,
            resolution: Resolution::default(),
        }
    }

    /// Walk `root` in document order alongside `scopes`. The first hard
    /// error aborts the walk.
    pub fn resolve(mut self, root: &Node, scopes: &ScopeTree) -> Result<Resolution, ResolveError> {
        let mut cursor = ScopeCursor::new(scopes);
        self.visit(root, &mut cursor)?;
        debug!(
            "{}: resolved {} method(s), {} identifier(s)",
            self.file,
            self.resolution.methods.len(),
            self.resolution.identifiers.len()
        );
        Ok(self.resolution)
    }

    fn position(&self, node: &Node) -> SourcePosition {
        SourcePosition::new(self.file, node.start)
    }

    fn visit(&mut self, node: &Node, cursor: &mut ScopeCursor<'_>) -> Result<(), ResolveError> {
        let pos = self.position(node);
        match &node.kind {
            NodeKind::CompilationUnit
            | NodeKind::Block
            | NodeKind::CatchClause
            | NodeKind::MethodDecl { .. }
            | NodeKind::ConstructorDecl
            | NodeKind::For
            | NodeKind::ForEach
            | NodeKind::ObjectCreation {
                anonymous_body: true,
            } => {
                let mut inner = cursor.descend(pos)?;
                self.visit_children(node, &mut inner)
            }
            NodeKind::ClassDecl {
                is_interface,
                has_superclass,
                ..
            } => {
                let mut members = if *has_superclass && !*is_interface {
                    cursor.descend(pos)?.descend(pos)?
                } else {
                    cursor.descend(pos)?
                };
                self.visit_children(node, &mut members)
            }
            // TODO: enum bodies open no contour here, unlike every other
            // body-bearing declaration; keep in step with the scope builder
            // until both sides change together.
            NodeKind::EnumDecl { .. } => self.visit_children(node, cursor),
            NodeKind::MethodCall {
                name,
                has_receiver: false,
            } => {
                self.resolve_call(pos, name, cursor)?;
                self.visit_children(node, cursor)
            }
            NodeKind::FieldAccess { .. } => self.resolve_field_access(node, pos, cursor),
            NodeKind::Name(ident) => {
                self.resolve_name(pos, ident, cursor)?;
                self.visit_children(node, cursor)
            }
            NodeKind::TypeRef { segments } => {
                self.check_type_ref(pos, segments, cursor)?;
                self.visit_children(node, cursor)
            }
            NodeKind::MethodCall {
                name,
                has_receiver: true,
            } => {
                self.check_call_receiver(node, pos, name, cursor)?;
                self.visit_children(node, cursor)
            }
            NodeKind::ObjectCreation { .. }
            | NodeKind::This { .. }
            | NodeKind::Primitive(_)
            | NodeKind::Other(_) => self.visit_children(node, cursor),
        }
    }

    fn visit_children(
        &mut self,
        node: &Node,
        cursor: &mut ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        node.children
            .iter()
            .try_for_each(|child| self.visit(child, cursor))
    }

    /// A call without receiver.
    fn resolve_call(
        &mut self,
        pos: SourcePosition,
        name: &str,
        cursor: &ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        let Some(qname) = cursor.resolve_method(pos, name) else {
            debug!("{}: method '{}' not resolved", pos, name);
            return Ok(());
        };
        if qname.is_enclosing() {
            return Err(ResolveError::TranslationIncompatible {
                position: pos,
                name: name.into(),
                access: OuterAccess::Method,
            });
        }
        record(&mut self.resolution.methods, pos, qname)
    }

    fn resolve_name(
        &mut self,
        pos: SourcePosition,
        ident: &str,
        cursor: &ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        match cursor.resolve_identifier(pos, ident) {
            Some(qname) => self.record_identifier(pos, ident, qname),
            None => {
                debug!("{}: identifier '{}' not resolved", pos, ident);
                Ok(())
            }
        }
    }

    fn record_identifier(
        &mut self,
        pos: SourcePosition,
        text: &str,
        qname: QualifiedName<IdentifierName>,
    ) -> Result<(), ResolveError> {
        if qname.is_enclosing() {
            return Err(ResolveError::TranslationIncompatible {
                position: pos,
                name: text.into(),
                access: OuterAccess::Field,
            });
        }
        record(&mut self.resolution.identifiers, pos, qname)
    }

    /// `a.b.c`: variable member, static member, or fully-qualified path.
    ///
    /// The qualifier chain is not walked further; only the leftmost qualifier
    /// decides what the whole expression is.
    fn resolve_field_access(
        &mut self,
        node: &Node,
        pos: SourcePosition,
        cursor: &mut ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        let Some(leftmost) = node.leftmost_qualifier() else {
            return Ok(());
        };
        let first = match &leftmost.kind {
            NodeKind::Name(ident) => ident.clone(),
            NodeKind::This { qualifier: None } => SmolStr::new_static("this"),
            NodeKind::This {
                qualifier: Some(outer),
            } => return self.resolve_outer_this(node, pos, outer, cursor),
            // member of a computed value: only the value itself has names
            _ => return self.visit(leftmost, cursor),
        };

        if let Some(qname) = cursor.resolve_identifier(pos, &first) {
            return self.record_identifier(pos, &first, qname);
        }
        if cursor.resolve_type(pos, &first).is_some() {
            trace!("{}: static member access through type '{}'", pos, first);
            return Ok(());
        }

        let Some(text) = node.text() else {
            return Ok(());
        };
        if first != "this" {
            let qualifier = node.qualifier().and_then(Node::text).unwrap_or_default();
            self.policy.check(&qualifier, pos)?;
        }
        match cursor.resolve_identifier(pos, &text) {
            Some(qname) => self.record_identifier(pos, &text, qname),
            None => {
                debug!("{}: '{}' left unresolved", pos, text);
                Ok(())
            }
        }
    }

    /// `Outer.this.method()` is only translatable on the innermost instance.
    fn check_call_receiver(
        &mut self,
        node: &Node,
        pos: SourcePosition,
        name: &str,
        cursor: &ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        let Some(NodeKind::This {
            qualifier: Some(outer),
        }) = node.children.first().map(|receiver| &receiver.kind)
        else {
            return Ok(());
        };
        if names_outer_instance(pos, outer, cursor) == Some(true) {
            return Err(ResolveError::TranslationIncompatible {
                position: pos,
                name: format!("{outer}.this.{name}").into(),
                access: OuterAccess::Method,
            });
        }
        Ok(())
    }

    /// `Outer.this.member`.
    fn resolve_outer_this(
        &mut self,
        node: &Node,
        pos: SourcePosition,
        outer: &str,
        cursor: &ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        let text = node.text().unwrap_or_default();
        let Some(foreign) = names_outer_instance(pos, outer, cursor) else {
            return Ok(());
        };
        if foreign {
            return Err(ResolveError::TranslationIncompatible {
                position: pos,
                name: text.into(),
                access: OuterAccess::Field,
            });
        }

        // the innermost type's own `this`
        let prefix = format!("{outer}.");
        let own = text.strip_prefix(prefix.as_str()).unwrap_or(&text);
        match cursor.resolve_identifier(pos, own) {
            Some(qname) => self.record_identifier(pos, own, qname),
            None => Ok(()),
        }
    }

    /// Rebuild the dotted type name and validate it against the policy.
    ///
    /// Only an unqualified name is looked up in scope; a qualified one is
    /// checked exactly as written.
    fn check_type_ref(
        &mut self,
        pos: SourcePosition,
        segments: &[SmolStr],
        cursor: &ScopeCursor<'_>,
    ) -> Result<(), ResolveError> {
        let full = match segments {
            [] => return Ok(()),
            [simple] => match cursor.resolve_type(pos, simple) {
                Some(local) => local.name().to_string(),
                None => simple.to_string(),
            },
            _ => segments.join("."),
        };
        self.policy.check(&full, pos)
    }
}

/// Whether `Outer.this` designates an instance other than the innermost one.
/// `None` when `outer` names no visible type.
fn names_outer_instance(
    pos: SourcePosition,
    outer: &str,
    cursor: &ScopeCursor<'_>,
) -> Option<bool> {
    let Some(outer_type) = cursor.resolve_type(pos, outer) else {
        debug!("{}: '{}' names no visible type", pos, outer);
        return None;
    };
    Some(cursor.innermost_type() != Some(outer_type.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;
    use crate::hir::names::ScopeOrigin;
    use crate::hir::scope::{ScopeKind, ScopeTreeBuilder};

    fn at(line: u32, col: u32) -> LineCol {
        LineCol::new(line, col)
    }

    fn pos(line: u32, col: u32) -> SourcePosition {
        SourcePosition::new(FileId::new(0), at(line, col))
    }

    fn policy() -> ResolutionPolicy {
        ResolutionPolicy::builder()
            .allow_namespace("app")
            .allow_base_classes(["String", "Math"])
            .build()
    }

    /// `class App { int count; void run(int n) { count; n; log(n); } void log(int v) {} }`
    fn simple_file() -> (Node, ScopeTree) {
        let syntax = Node::compilation_unit(vec![Node::class(
            at(0, 0),
            "App",
            false,
            vec![
                Node::method(
                    at(1, 2),
                    "run",
                    vec![Node::block(
                        at(1, 18),
                        vec![
                            Node::name(at(2, 4), "count"),
                            Node::name(at(3, 4), "n"),
                            Node::call(at(4, 4), "log", vec![Node::name(at(4, 8), "n")]),
                            Node::name(at(5, 4), "unknown"),
                        ],
                    )],
                ),
                Node::method(at(7, 2), "log", vec![Node::block(at(7, 18), Vec::new())]),
            ],
        )]);

        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "app")
            .declare_type("App", "app.App")
            .enter_members("App", "app.App")
            .declare_field("count", false)
            .declare_method("run", false)
            .declare_method("log", false)
            .enter(ScopeKind::Callable, "run")
            .declare_variable("n")
            .enter(ScopeKind::Block, "run#0")
            .exit()
            .exit()
            .enter(ScopeKind::Callable, "log")
            .declare_variable("v")
            .enter(ScopeKind::Block, "log#0");
        (syntax, b.finish())
    }

    #[test]
    fn test_records_names_and_calls_in_traversal_order() {
        let (syntax, scopes) = simple_file();
        let resolution = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap();

        let identifiers: Vec<_> = resolution
            .identifiers()
            .iter()
            .map(|(p, q)| (*p, q.name().to_string()))
            .collect();
        assert_eq!(
            identifiers,
            [
                (pos(2, 4), "app.App.count".to_string()),
                (pos(3, 4), "n".to_string()),
                (pos(4, 8), "n".to_string()),
            ]
        );

        let log = resolution.method_at(pos(4, 4)).unwrap();
        assert_eq!(log.name(), "app.App.log");
        assert_eq!(log.scope_name(), Some("App"));
        assert_eq!(resolution.len(), 4);
    }

    #[test]
    fn test_missing_contour_is_desync() {
        let (syntax, _) = simple_file();
        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "app")
            .enter_members("App", "app.App")
            .enter(ScopeKind::Callable, "run");
        let scopes = b.finish();

        let err = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(err, ResolveError::ScopeDesync { ref scope, .. } if scope == "run"));
    }

    #[test]
    fn test_duplicate_position_is_rejected() {
        let mut map = IndexMap::new();
        let first = QualifiedName::<IdentifierName>::new("a", ScopeOrigin::Scope("s".into()));
        record(&mut map, pos(1, 1), first.clone()).unwrap();

        let err = record(&mut map, pos(1, 1), first).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicatePosition { .. }));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_enum_body_shares_the_enclosing_scope() {
        let syntax = Node::compilation_unit(vec![Node::enumeration(
            at(0, 0),
            "Color",
            vec![Node::name(at(1, 2), "RED")],
        )]);
        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "app")
            .declare_variable("RED");
        let scopes = b.finish();

        let resolution = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap();
        assert_eq!(resolution.identifier_at(pos(1, 2)).unwrap().scope_name(), Some("app"));
    }

    #[test]
    fn test_simple_type_refs_resolve_through_scope() {
        let syntax = Node::compilation_unit(vec![
            Node::type_ref(at(0, 0), "App"),
            Node::type_ref(at(1, 0), "String"),
            Node::type_ref(at(2, 0), "app.App.Inner"),
            Node::primitive(at(3, 0), "int"),
        ]);
        let mut b = ScopeTreeBuilder::new();
        b.import("java.lang.String")
            .enter(ScopeKind::CompilationUnit, "app")
            .declare_type("App", "app.App");
        let scopes = b.finish();

        let resolution = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap();
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_qualified_type_ref_is_checked_as_written() {
        let syntax = Node::compilation_unit(vec![Node::type_ref(at(4, 2), "App.Inner")]);
        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "app")
            .declare_type("App", "app.App");
        let scopes = b.finish();

        let err = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::PolicyViolation {
                position: pos(4, 2),
                name: "App.Inner".into(),
            }
        );
    }

    #[test]
    fn test_computed_qualifier_visits_receiver_only() {
        let (_, scopes) = simple_file();
        let access = Node::field(
            at(2, 4),
            Node::call(at(2, 4), "log", vec![Node::name(at(2, 8), "n")]),
            "length",
        );
        let syntax = Node::compilation_unit(vec![Node::class(
            at(0, 0),
            "App",
            false,
            vec![Node::method(at(1, 2), "run", vec![Node::block(at(1, 18), vec![access])])],
        )]);

        let resolution = resolve_file(FileId::new(0), &syntax, &scopes, &policy()).unwrap();
        assert_eq!(resolution.method_at(pos(2, 4)).unwrap().name(), "app.App.log");
        assert_eq!(resolution.identifier_at(pos(2, 8)).unwrap().name(), "n");
        assert_eq!(resolution.identifiers().len(), 1);
    }
}
