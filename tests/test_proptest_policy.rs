//! Property-based checks of policy closure, shadowing and resolver determinism.
#![cfg(feature = "proptest")]

use proptest::prelude::*;
use scopebridge::base::{FileId, LineCol, SourcePosition};
use scopebridge::hir::{ResolutionPolicy, ScopeKind, ScopeTreeBuilder, resolve_file};
use scopebridge::syntax::Node;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

fn arb_segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn arb_path(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_segment(), 1..=max)
}

const DECLARED: &[&str] = &["alpha", "beta", "gamma"];

fn arb_identifier() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("alpha"),
        Just("beta"),
        Just("gamma"),
        Just("delta"),
        Just("omega"),
    ]
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_names_inside_allowed_namespace_are_accepted(
        namespace in arb_path(3),
        rest in arb_path(3),
    ) {
        let namespace = namespace.join(".");
        let policy = ResolutionPolicy::builder().allow_namespace(&namespace).build();

        prop_assert!(policy.accepts(&namespace));
        let name = format!("{namespace}.{}", rest.join("."));
        prop_assert!(policy.accepts(&name));
    }

    #[test]
    fn prop_names_outside_every_namespace_are_rejected(
        namespace in arb_path(3),
        rest in arb_path(3),
    ) {
        let namespace = namespace.join(".");
        let policy = ResolutionPolicy::builder()
            .allow_namespace(&namespace)
            .with_default_base_classes()
            .build();

        // a leading uppercase segment can never match a lowercase namespace
        let outside = format!("Zz.{}", rest.join("."));
        prop_assert!(!policy.accepts(&outside));
        // nor can a namespace whose last segment merely starts the same way
        let name = format!("{namespace}x.{}", rest.join("."));
        prop_assert!(!policy.accepts(&name));
    }

    #[test]
    fn prop_innermost_declaration_shadows(
        declared_at in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        // one nested block per entry, `x` declared where the flag is set
        let depth = declared_at.len();
        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "unit");
        for (level, declares) in declared_at.iter().enumerate() {
            b.enter(ScopeKind::Block, format!("level{level}"));
            if *declares {
                b.declare_variable("x");
            }
        }
        let scopes = b.finish();

        let mut syntax = Node::name(LineCol::new(depth as u32, 0), "x");
        for level in (0..depth).rev() {
            syntax = Node::block(LineCol::new(level as u32, 0), vec![syntax]);
        }
        let syntax = Node::compilation_unit(vec![syntax]);

        let resolution =
            resolve_file(FileId::new(0), &syntax, &scopes, &ResolutionPolicy::default()).unwrap();
        let found = resolution
            .identifier_at(SourcePosition::new(FileId::new(0), LineCol::new(depth as u32, 0)))
            .and_then(|q| q.scope_name().map(str::to_string));
        let expected = declared_at.iter().rposition(|d| *d).map(|level| format!("level{level}"));
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_resolution_is_deterministic(names in prop::collection::vec(arb_identifier(), 0..24)) {
        let body: Vec<Node> = names
            .iter()
            .enumerate()
            .map(|(line, name)| Node::name(LineCol::new(line as u32 + 1, 4), name))
            .collect();
        let syntax = Node::compilation_unit(vec![Node::block(LineCol::new(0, 0), body)]);

        let mut b = ScopeTreeBuilder::new();
        b.enter(ScopeKind::CompilationUnit, "unit").enter(ScopeKind::Block, "block");
        for name in DECLARED {
            b.declare_variable(name);
        }
        let scopes = b.finish();
        let policy = ResolutionPolicy::default();

        let first = resolve_file(FileId::new(0), &syntax, &scopes, &policy).unwrap();
        let second = resolve_file(FileId::new(0), &syntax, &scopes, &policy).unwrap();
        prop_assert_eq!(&first, &second);

        let expected: Vec<SourcePosition> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| DECLARED.contains(*name))
            .map(|(line, _)| SourcePosition::new(FileId::new(0), LineCol::new(line as u32 + 1, 4)))
            .collect();
        prop_assert_eq!(first.identifiers().keys().copied().collect::<Vec<_>>(), expected);
    }
}
