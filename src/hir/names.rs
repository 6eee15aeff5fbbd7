//! Resolved names and where they were found.

use std::fmt;
use std::marker::PhantomData;

use smol_str::SmolStr;

/// The scope a name was found in.
///
/// `Enclosing` marks a member reachable only through an enclosing instance:
/// the source language allows it implicitly, the target language's closures
/// cannot express it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeOrigin {
    Scope(SmolStr),
    Enclosing,
}

impl ScopeOrigin {
    pub fn is_enclosing(&self) -> bool {
        matches!(self, ScopeOrigin::Enclosing)
    }

    /// Name of the ordinary scope, `None` for [`ScopeOrigin::Enclosing`].
    pub fn scope_name(&self) -> Option<&str> {
        match self {
            ScopeOrigin::Scope(name) => Some(name),
            ScopeOrigin::Enclosing => None,
        }
    }
}

impl fmt::Display for ScopeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeOrigin::Scope(name) => f.write_str(name),
            ScopeOrigin::Enclosing => f.write_str("<enclosing instance>"),
        }
    }
}

/// The three things a name can denote.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameType {
    Method,
    Identifier,
    Type,
}

mod sealed {
    pub trait Sealed {}
}

/// Compile-time tag of a [`QualifiedName`].
pub trait NameKind: sealed::Sealed + Copy + fmt::Debug + Eq + std::hash::Hash + Send + Sync {
    const TYPE: NameType;
}

macro_rules! name_kind {
    ($($(#[$doc:meta])* $kind:ident => $tag:ident,)*) => {$(
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $kind;

        impl sealed::Sealed for $kind {}

        impl NameKind for $kind {
            const TYPE: NameType = NameType::$tag;
        }
    )*};
}

name_kind! {
    /// A method invoked without an explicit receiver.
    MethodName => Method,
    /// A variable, parameter or field.
    IdentifierName => Identifier,
    /// A class, interface or enum.
    TypeName => Type,
}

/// The resolved, canonical dotted name of one occurrence.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName<K: NameKind> {
    name: SmolStr,
    origin: ScopeOrigin,
    #[cfg_attr(feature = "serde", serde(skip))]
    kind: PhantomData<K>,
}

impl<K: NameKind> QualifiedName<K> {
    pub fn new(name: impl Into<SmolStr>, origin: ScopeOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
            kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &ScopeOrigin {
        &self.origin
    }

    /// `None` when the name came from an enclosing instance.
    pub fn scope_name(&self) -> Option<&str> {
        self.origin.scope_name()
    }

    pub fn is_enclosing(&self) -> bool {
        self.origin.is_enclosing()
    }

    pub fn name_type(&self) -> NameType {
        K::TYPE
    }
}

impl<K: NameKind> fmt::Debug for QualifiedName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({} in {})", K::TYPE, self.name, self.origin)
    }
}

impl<K: NameKind> fmt::Display for QualifiedName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tag_follows_marker() {
        let method = QualifiedName::<MethodName>::new("A.run", ScopeOrigin::Scope("A".into()));
        let ident = QualifiedName::<IdentifierName>::new("x", ScopeOrigin::Scope("block".into()));

        assert_eq!(method.name_type(), NameType::Method);
        assert_eq!(ident.name_type(), NameType::Identifier);
        assert_eq!(format!("{method:?}"), "Method(A.run in A)");
    }

    #[test]
    fn test_enclosing_origin_has_no_scope_name() {
        let name = QualifiedName::<IdentifierName>::new("Outer.type", ScopeOrigin::Enclosing);

        assert!(name.is_enclosing());
        assert_eq!(name.scope_name(), None);
        assert_eq!(name.to_string(), "Outer.type");
    }
}
