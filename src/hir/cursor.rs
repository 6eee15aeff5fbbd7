//! Live position in the scope tree during the syntax walk.

use tracing::trace;

use crate::base::SourcePosition;
use super::diagnostics::ResolveError;
use super::names::{IdentifierName, MethodName, QualifiedName, TypeName};
use super::scope::{ScopeId, ScopeTree};

/// Pairs the walk with one scope of a [`ScopeTree`].
///
/// Each lexical contour calls [`descend`](Self::descend) on the cursor it was
/// handed and walks its subtree with the returned child cursor. Sibling
/// contours share the parent cursor, so they receive consecutive child scopes
/// in document order.
#[derive(Clone, Debug)]
pub struct ScopeCursor<'t> {
    tree: &'t ScopeTree,
    scope: ScopeId,
    next_child: usize,
}

impl<'t> ScopeCursor<'t> {
    /// A cursor on the root scope.
    pub fn new(tree: &'t ScopeTree) -> Self {
        Self::at(tree, tree.root())
    }

    /// A cursor on `scope`, for resuming a walk below the root.
    pub fn at(tree: &'t ScopeTree, scope: ScopeId) -> Self {
        Self {
            tree,
            scope,
            next_child: 0,
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn tree(&self) -> &'t ScopeTree {
        self.tree
    }

    /// Advance to the next pre-built child scope.
    ///
    /// Running out of children means the scope tree and the walk disagree
    /// about the contours; that is reported as [`ResolveError::ScopeDesync`]
    /// and must abort the pass.
    pub fn descend(&mut self, at: SourcePosition) -> Result<ScopeCursor<'t>, ResolveError> {
        let children = self.tree.children(self.scope);
        let Some(&child) = children.get(self.next_child) else {
            return Err(ResolveError::ScopeDesync {
                position: at,
                scope: self.tree.name(self.scope).into(),
                children: children.len(),
            });
        };
        self.next_child += 1;
        trace!(
            "{}: enter scope '{}' ({:?})",
            at,
            self.tree.name(child),
            child
        );
        Ok(ScopeCursor::at(self.tree, child))
    }

    /// Qualified name of the innermost type enclosing the cursor.
    pub fn innermost_type(&self) -> Option<&'t str> {
        self.tree.innermost_type(self.scope)
    }

    pub fn resolve_identifier(
        &self,
        pos: SourcePosition,
        name: &str,
    ) -> Option<QualifiedName<IdentifierName>> {
        self.tree.resolve_identifier(self.scope, pos, name)
    }

    pub fn resolve_method(
        &self,
        pos: SourcePosition,
        name: &str,
    ) -> Option<QualifiedName<MethodName>> {
        self.tree.resolve_method(self.scope, pos, name)
    }

    pub fn resolve_type(&self, pos: SourcePosition, name: &str) -> Option<QualifiedName<TypeName>> {
        self.tree.resolve_type(self.scope, pos, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, LineCol};
    use crate::hir::scope::{ScopeKind, ScopeTreeBuilder};

    fn pos() -> SourcePosition {
        SourcePosition::new(FileId::new(0), LineCol::new(2, 4))
    }

    fn two_blocks() -> ScopeTree {
        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "unit")
            .enter(ScopeKind::Block, "first")
            .declare_variable("a")
            .exit()
            .enter(ScopeKind::Block, "second")
            .declare_variable("b");
        b.finish()
    }

    #[test]
    fn test_siblings_get_consecutive_children() {
        let tree = two_blocks();
        let mut root = ScopeCursor::new(&tree);
        let mut unit = root.descend(pos()).unwrap();

        let first = unit.descend(pos()).unwrap();
        let second = unit.descend(pos()).unwrap();

        assert_eq!(tree.name(first.scope()), "first");
        assert_eq!(tree.name(second.scope()), "second");
        assert!(first.resolve_identifier(pos(), "a").is_some());
        assert!(second.resolve_identifier(pos(), "a").is_none());
    }

    #[test]
    fn test_descend_past_last_child_is_desync() {
        let tree = two_blocks();
        let mut unit = ScopeCursor::new(&tree).descend(pos()).unwrap();
        unit.descend(pos()).unwrap();
        unit.descend(pos()).unwrap();

        let err = unit.descend(pos()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ScopeDesync {
                position: pos(),
                scope: "unit".into(),
                children: 2,
            }
        );
    }

    #[test]
    fn test_leaf_scope_has_no_children() {
        let tree = two_blocks();
        let mut leaf = ScopeCursor::new(&tree)
            .descend(pos())
            .and_then(|mut unit| unit.descend(pos()))
            .unwrap();

        assert!(matches!(
            leaf.descend(pos()),
            Err(ResolveError::ScopeDesync { children: 0, .. })
        ));
    }
}
