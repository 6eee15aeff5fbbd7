//! The typed syntax tree consumed by name resolution.
//!
//! Parsing and type-checking happen upstream; this module only fixes the
//! shape the resolver walks. Every node carries the start of its source text
//! and an ordered list of children. Node kinds form a closed set so the
//! resolver can dispatch with a single `match`.
//!
//! Child conventions:
//! - `FieldAccess`: `children[0]` is the qualifier.
//! - `MethodCall { has_receiver: true }`: `children[0]` is the receiver,
//!   the remaining children are arguments.
//! - `TypeRef`: children are type arguments.
//! - declarations, statements and `ObjectCreation`: children in document order.

use smol_str::SmolStr;

use crate::base::LineCol;

/// The tag and per-kind payload of a [`Node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    ClassDecl {
        name: SmolStr,
        is_interface: bool,
        /// `extends` names a superclass (interfaces never count).
        has_superclass: bool,
    },
    EnumDecl {
        name: SmolStr,
    },
    MethodDecl {
        name: SmolStr,
    },
    ConstructorDecl,
    Block,
    CatchClause,
    For,
    ForEach,
    ObjectCreation {
        anonymous_body: bool,
    },
    MethodCall {
        name: SmolStr,
        has_receiver: bool,
    },
    FieldAccess {
        field: SmolStr,
    },
    Name(SmolStr),
    /// `this`, or `Outer.this` when `qualifier` is set.
    This {
        qualifier: Option<SmolStr>,
    },
    /// A class or interface type, `segments` as written (`a.b.C` → 3).
    TypeRef {
        segments: Vec<SmolStr>,
    },
    Primitive(SmolStr),
    /// Any construct with no resolution role (literals, operators, plain
    /// statements). Only its children are visited.
    Other(SmolStr),
}

/// A node of the typed syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub start: LineCol,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, start: LineCol, children: Vec<Node>) -> Self {
        Self {
            kind,
            start,
            children,
        }
    }

    pub fn compilation_unit(children: Vec<Node>) -> Self {
        Self::new(NodeKind::CompilationUnit, LineCol::default(), children)
    }

    pub fn class(start: LineCol, name: &str, has_superclass: bool, members: Vec<Node>) -> Self {
        let kind = NodeKind::ClassDecl {
            name: name.into(),
            is_interface: false,
            has_superclass,
        };
        Self::new(kind, start, members)
    }

    pub fn interface(start: LineCol, name: &str, members: Vec<Node>) -> Self {
        let kind = NodeKind::ClassDecl {
            name: name.into(),
            is_interface: true,
            has_superclass: false,
        };
        Self::new(kind, start, members)
    }

    pub fn enumeration(start: LineCol, name: &str, members: Vec<Node>) -> Self {
        Self::new(NodeKind::EnumDecl { name: name.into() }, start, members)
    }

    pub fn method(start: LineCol, name: &str, children: Vec<Node>) -> Self {
        Self::new(NodeKind::MethodDecl { name: name.into() }, start, children)
    }

    pub fn constructor(start: LineCol, children: Vec<Node>) -> Self {
        Self::new(NodeKind::ConstructorDecl, start, children)
    }

    pub fn block(start: LineCol, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Block, start, children)
    }

    pub fn name(start: LineCol, ident: &str) -> Self {
        Self::new(NodeKind::Name(ident.into()), start, Vec::new())
    }

    pub fn this(start: LineCol, qualifier: Option<&str>) -> Self {
        let kind = NodeKind::This {
            qualifier: qualifier.map(SmolStr::from),
        };
        Self::new(kind, start, Vec::new())
    }

    pub fn field(start: LineCol, qualifier: Node, field: &str) -> Self {
        Self::new(
            NodeKind::FieldAccess {
                field: field.into(),
            },
            start,
            vec![qualifier],
        )
    }

    /// Field access chain from dotted text: `a.b.c` → `(a.b).c`, every link
    /// starting at `start`.
    pub fn path(start: LineCol, dotted: &str) -> Self {
        let mut segments = dotted.split('.');
        let first = segments.next().unwrap_or_default();
        let head = if first == "this" {
            Self::this(start, None)
        } else {
            Self::name(start, first)
        };
        segments.fold(head, |qualifier, segment| {
            if segment == "this" {
                let outer = qualifier.text().unwrap_or_default();
                Self::this(start, Some(outer.as_str()))
            } else {
                Self::field(start, qualifier, segment)
            }
        })
    }

    /// A call without an explicit receiver.
    pub fn call(start: LineCol, name: &str, args: Vec<Node>) -> Self {
        let kind = NodeKind::MethodCall {
            name: name.into(),
            has_receiver: false,
        };
        Self::new(kind, start, args)
    }

    pub fn call_on(start: LineCol, receiver: Node, name: &str, args: Vec<Node>) -> Self {
        let kind = NodeKind::MethodCall {
            name: name.into(),
            has_receiver: true,
        };
        let mut children = Vec::with_capacity(args.len() + 1);
        children.push(receiver);
        children.extend(args);
        Self::new(kind, start, children)
    }

    pub fn type_ref(start: LineCol, dotted: &str) -> Self {
        let segments = dotted.split('.').map(SmolStr::from).collect();
        Self::new(NodeKind::TypeRef { segments }, start, Vec::new())
    }

    pub fn primitive(start: LineCol, name: &str) -> Self {
        Self::new(NodeKind::Primitive(name.into()), start, Vec::new())
    }

    /// `new T(args) { body }`; `body` is `None` for a plain instantiation.
    pub fn new_object(start: LineCol, ty: Node, args: Vec<Node>, body: Option<Vec<Node>>) -> Self {
        let anonymous_body = body.is_some();
        let mut children = vec![ty];
        children.extend(args);
        children.extend(body.into_iter().flatten());
        Self::new(NodeKind::ObjectCreation { anonymous_body }, start, children)
    }

    pub fn other(start: LineCol, label: &str, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Other(label.into()), start, children)
    }

    /// Replace the children, keeping kind and position.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Dotted source text of a name-like expression (`a`, `this`,
    /// `Outer.this`, `a.b.c`). `None` for anything computed.
    pub fn text(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Name(ident) => Some(ident.to_string()),
            NodeKind::This { qualifier: None } => Some("this".to_string()),
            NodeKind::This {
                qualifier: Some(outer),
            } => Some(format!("{outer}.this")),
            NodeKind::FieldAccess { field } => {
                let qualifier = self.children.first()?.text()?;
                Some(format!("{qualifier}.{field}"))
            }
            NodeKind::TypeRef { segments } => Some(segments.join(".")),
            _ => None,
        }
    }

    /// The qualifier of a field access (`children[0]`).
    pub fn qualifier(&self) -> Option<&Node> {
        match self.kind {
            NodeKind::FieldAccess { .. } => self.children.first(),
            _ => None,
        }
    }

    /// Innermost qualifier of a field access chain: `a` in `a.b.c`.
    pub fn leftmost_qualifier(&self) -> Option<&Node> {
        let mut current = self.qualifier()?;
        while let Some(next) = current.qualifier() {
            current = next;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, col: u32) -> LineCol {
        LineCol::new(line, col)
    }

    #[test]
    fn test_path_builds_nested_field_access() {
        let node = Node::path(at(1, 4), "a.b.c");

        assert_eq!(node.text().as_deref(), Some("a.b.c"));
        assert_eq!(node.qualifier().and_then(Node::text).as_deref(), Some("a.b"));
        assert_eq!(
            node.leftmost_qualifier().map(|n| n.kind.clone()),
            Some(NodeKind::Name("a".into()))
        );
    }

    #[test]
    fn test_path_with_qualified_this() {
        let node = Node::path(at(0, 0), "Outer.this.type");

        assert_eq!(node.text().as_deref(), Some("Outer.this.type"));
        assert_eq!(
            node.leftmost_qualifier().map(|n| n.kind.clone()),
            Some(NodeKind::This {
                qualifier: Some("Outer".into())
            })
        );
    }

    #[test]
    fn test_computed_qualifier_has_no_text() {
        let call = Node::call(at(0, 0), "make", Vec::new());
        let node = Node::field(at(0, 0), call, "size");

        assert_eq!(node.text(), None);
        assert!(matches!(
            node.leftmost_qualifier().map(|n| &n.kind),
            Some(NodeKind::MethodCall { .. })
        ));
    }

    #[test]
    fn test_call_on_puts_receiver_first() {
        let call = Node::call_on(
            at(2, 0),
            Node::name(at(2, 0), "list"),
            "add",
            vec![Node::name(at(2, 9), "x")],
        );
        assert_eq!(call.children.len(), 2);
        assert_eq!(call.children[0].text().as_deref(), Some("list"));
    }

    #[test]
    fn test_new_object_marks_anonymous_body() {
        let plain = Node::new_object(at(0, 0), Node::type_ref(at(0, 4), "A"), Vec::new(), None);
        let anon = Node::new_object(
            at(0, 0),
            Node::type_ref(at(0, 4), "Runnable"),
            Vec::new(),
            Some(vec![Node::method(at(1, 2), "run", Vec::new())]),
        );

        assert_eq!(plain.kind, NodeKind::ObjectCreation { anonymous_body: false });
        assert_eq!(anon.kind, NodeKind::ObjectCreation { anonymous_body: true });
        assert_eq!(anon.children.len(), 2);
    }
}
