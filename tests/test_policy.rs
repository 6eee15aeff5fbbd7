//! Policy acceptance tables.

use rstest::rstest;
use scopebridge::base::{FileId, LineCol, SourcePosition};
use scopebridge::hir::{DEFAULT_BASE_CLASSES, ResolutionPolicy, ResolveError};

fn policy() -> ResolutionPolicy {
    ResolutionPolicy::builder()
        .allow_namespaces(["allowed.pkg", "org.example.ui"])
        .with_default_base_classes()
        .build()
}

#[rstest]
#[case::this("this")]
#[case::base_string("java.lang.String")]
#[case::base_math("java.lang.Math")]
#[case::namespace_itself("allowed.pkg")]
#[case::namespace_member("allowed.pkg.Thing")]
#[case::namespace_nested("allowed.pkg.sub.Deep")]
#[case::second_namespace("org.example.ui.Button")]
fn test_accepted(#[case] name: &str) {
    assert!(policy().accepts(name), "{name} should be accepted");
}

#[rstest]
#[case::unlisted_base_class("java.lang.Thread")]
#[case::base_namespace_alone("java.lang")]
#[case::base_subpackage("java.lang.reflect.Method")]
#[case::sibling_prefix("allowed.pkgx.Thing")]
#[case::parent_namespace("allowed")]
#[case::other_package("forbidden.pkg.Thing")]
#[case::empty("")]
fn test_rejected(#[case] name: &str) {
    assert!(!policy().accepts(name), "{name} should be rejected");
}

#[rstest]
#[case(0, 0)]
#[case(12, 3)]
fn test_violation_carries_position(#[case] line: u32, #[case] col: u32) {
    let position = SourcePosition::new(FileId::new(2), LineCol::new(line, col));

    let err = policy().check("java.util.List", position).unwrap_err();
    assert_eq!(err.position(), position);
    assert!(matches!(
        err,
        ResolveError::PolicyViolation { ref name, .. } if name == "java.util.List"
    ));
}

#[test]
fn test_default_policy_only_accepts_this() {
    let policy = ResolutionPolicy::default();

    assert!(policy.accepts("this"));
    assert!(!policy.accepts("java.lang.String"));
    assert_eq!(policy.allowed_base_classes().count(), 0);
}

#[test]
fn test_default_base_classes_are_all_accepted() {
    let policy = policy();
    for class in DEFAULT_BASE_CLASSES {
        assert!(policy.accepts(&format!("java.lang.{class}")), "{class}");
    }
}
