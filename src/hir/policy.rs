//! Resolution policy: the library surface a translated program may use.
//!
//! A fully-qualified name is accepted when it is the literal `this`, when it
//! names an allowed class of the base-library namespace (`java.lang.String`
//! with `String` allowed), or when it lies inside an allowed namespace.
//! Namespace matching is by whole segments: `a.b` admits `a.b` and `a.b.C`
//! but not `a.bc`.

use indexmap::IndexSet;
use smol_str::SmolStr;

use crate::base::SourcePosition;
use super::diagnostics::ResolveError;

/// Namespace of the source language's implicitly imported base library.
pub const DEFAULT_BASE_NAMESPACE: &str = "java.lang";

/// Base-library classes the JavaScript runtime bridge provides.
pub const DEFAULT_BASE_CLASSES: &[&str] = &[
    "Object",
    "String",
    "Number",
    "Boolean",
    "Byte",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "Character",
    "CharSequence",
    "Math",
    "Iterable",
    "Comparable",
    "Runnable",
    "Void",
    "Throwable",
    "Exception",
    "RuntimeException",
    "Error",
    "IllegalArgumentException",
    "IllegalStateException",
    "UnsupportedOperationException",
    "IndexOutOfBoundsException",
    "NullPointerException",
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
];

/// The allow-lists checked for every name the scope tree cannot vouch for.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ResolutionPolicy {
    base_namespace: SmolStr,
    allowed_base_classes: IndexSet<SmolStr>,
    allowed_namespaces: Vec<SmolStr>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            base_namespace: DEFAULT_BASE_NAMESPACE.into(),
            allowed_base_classes: IndexSet::new(),
            allowed_namespaces: Vec::new(),
        }
    }
}

impl ResolutionPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Load a policy from its JSON form:
    ///
    /// ```json
    /// { "baseNamespace": "java.lang",
    ///   "allowedBaseClasses": ["String", "Math"],
    ///   "allowedNamespaces": ["org.example"] }
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn base_namespace(&self) -> &str {
        &self.base_namespace
    }

    pub fn allowed_base_classes(&self) -> impl Iterator<Item = &str> {
        self.allowed_base_classes.iter().map(SmolStr::as_str)
    }

    pub fn allowed_namespaces(&self) -> impl Iterator<Item = &str> {
        self.allowed_namespaces.iter().map(SmolStr::as_str)
    }

    /// Whether `name` belongs to the base-library namespace at all.
    pub fn is_base_library(&self, name: &str) -> bool {
        strip_namespace(name, &self.base_namespace).is_some()
    }

    pub fn accepts(&self, name: &str) -> bool {
        if name == "this" {
            return true;
        }
        if let Some(class) = strip_namespace(name, &self.base_namespace) {
            if self.allowed_base_classes.contains(class) {
                return true;
            }
        }
        self.allowed_namespaces.iter().any(|namespace| {
            name == namespace.as_str() || strip_namespace(name, namespace).is_some()
        })
    }

    /// Validate a fully-qualified name seen at `position`.
    pub fn check(&self, name: &str, position: SourcePosition) -> Result<(), ResolveError> {
        if self.accepts(name) {
            Ok(())
        } else {
            Err(ResolveError::PolicyViolation {
                position,
                name: name.into(),
            })
        }
    }
}

/// `a.b.C` minus namespace `a.b` is `C`.
fn strip_namespace<'n>(name: &'n str, namespace: &str) -> Option<&'n str> {
    name.strip_prefix(namespace)?
        .strip_prefix('.')
        .filter(|rest| !rest.is_empty())
}

/// Builder for [`ResolutionPolicy`].
#[derive(Clone, Debug, Default)]
pub struct PolicyBuilder {
    policy: ResolutionPolicy,
}

impl PolicyBuilder {
    pub fn base_namespace(mut self, namespace: &str) -> Self {
        self.policy.base_namespace = namespace.trim_end_matches('.').into();
        self
    }

    pub fn allow_namespace(mut self, namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches('.');
        let known = self.policy.allowed_namespaces.iter().any(|ns| ns == namespace);
        if !namespace.is_empty() && !known {
            self.policy.allowed_namespaces.push(namespace.into());
        }
        self
    }

    pub fn allow_namespaces<'a>(self, namespaces: impl IntoIterator<Item = &'a str>) -> Self {
        namespaces
            .into_iter()
            .fold(self, |builder, namespace| builder.allow_namespace(namespace))
    }

    pub fn allow_base_class(mut self, class: &str) -> Self {
        self.policy.allowed_base_classes.insert(class.into());
        self
    }

    pub fn allow_base_classes<'a>(self, classes: impl IntoIterator<Item = &'a str>) -> Self {
        classes
            .into_iter()
            .fold(self, |builder, class| builder.allow_base_class(class))
    }

    pub fn with_default_base_classes(self) -> Self {
        self.allow_base_classes(DEFAULT_BASE_CLASSES.iter().copied())
    }

    pub fn build(self) -> ResolutionPolicy {
        self.policy
    }
}
