mod common;

use common::{find, login_page_with_signup, nth_tag, signup_button, tree};
use locus_engine::common::{DetachedNodeError, NodeSnapshot};
use locus_engine::config::ResolverConfig;
use locus_engine::resolution::SearchScope;
use locus_engine::strategy::BuiltinLocator;
use locus_engine::{
    Attempt, AttributePredicate, DocumentTree, LocatorSpec, NodeId, PageSnapshot, Resolver,
    ResolverError, StrategyChain, StrategyId, TextMatch,
};
use std::sync::Mutex;

fn attempt(strategy: StrategyId, candidates: usize, anchored: bool) -> Attempt {
    Attempt {
        strategy,
        candidates,
        anchored,
    }
}

fn resolve(resolver: &Resolver, tree: &DocumentTree, spec: &LocatorSpec) -> locus_engine::ResolutionOutcome {
    resolver.resolve(spec, tree.root().unwrap())
}

#[test]
fn test_username_by_placeholder_uses_generic_attribute() {
    let tree = tree();
    let spec = LocatorSpec::new("input", AttributePredicate::equals("placeholder", "Username"));

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, nth_tag(&tree, "input", 0));
    assert_eq!(resolved.strategy, StrategyId::GenericAttribute);
    assert_eq!(
        resolved.attempts,
        vec![attempt(StrategyId::GenericAttribute, 1, false)]
    );
}

#[test]
fn test_id_wins_over_lower_priority_strategies() {
    let tree = tree();
    let spec = LocatorSpec::new("button", AttributePredicate::equals("id", "signup")).nth(0);

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, find(&tree, "id", "signup"));
    assert_eq!(resolved.strategy, StrategyId::Id);
    assert_eq!(resolved.attempts, vec![attempt(StrategyId::Id, 1, false)]);
}

#[test]
fn test_ambiguous_inputs_without_anchor_or_index() {
    let tree = tree();
    let spec = LocatorSpec::new("input", AttributePredicate::present("placeholder"));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    match err {
        ResolverError::AmbiguousMatch {
            count,
            candidates,
            attempts,
            ancestor,
            ..
        } => {
            assert_eq!(count, 2);
            assert_eq!(
                candidates,
                vec![nth_tag(&tree, "input", 0), nth_tag(&tree, "input", 1)]
            );
            assert_eq!(attempts, vec![attempt(StrategyId::GenericAttribute, 2, false)]);
            assert!(ancestor.is_none());
        }
        other => panic!("expected AmbiguousMatch, got {:?}", other),
    }
}

#[test]
fn test_removed_id_downgrades_to_no_match() {
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"));
    let resolver = Resolver::default();

    let before = tree();
    assert!(resolve(&resolver, &before, &spec).is_ok());

    let after = DocumentTree::from_snapshot(&login_page_with_signup(
        signup_button().without_attr("id"),
    ));
    let err = resolve(&resolver, &after, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert_eq!(err.attempts(), &[attempt(StrategyId::Id, 0, false)]);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_ancestor_disambiguates_shared_attribute() {
    let tree = tree();
    let resolver = Resolver::default();

    let bare = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"));
    let err = resolve(&resolver, &tree, &bare).unwrap_err();
    assert!(matches!(err, ResolverError::AmbiguousMatch { count: 2, .. }));

    let signup = bare.clone().within(LocatorSpec::new(
        "form",
        AttributePredicate::equals("id", "signup-form"),
    ));
    let resolved = resolve(&resolver, &tree, &signup).unwrap();
    assert_eq!(resolved.node, find(&tree, "id", "signup"));
    assert_eq!(resolved.strategy, StrategyId::GenericAttribute);
    assert_eq!(
        resolved.attempts,
        vec![attempt(StrategyId::GenericAttribute, 1, true)]
    );

    let login = bare.within(LocatorSpec::new(
        "form",
        AttributePredicate::equals("id", "login-form"),
    ));
    let resolved = resolve(&resolver, &tree, &login).unwrap();
    assert_eq!(resolved.node, nth_tag(&tree, "button", 0));
}

#[test]
fn test_resolution_is_idempotent() {
    let tree = tree();
    let resolver = Resolver::default();
    let specs = [
        LocatorSpec::new("input", AttributePredicate::equals("placeholder", "Username")),
        LocatorSpec::new("input", AttributePredicate::present("placeholder")),
        LocatorSpec::any(AttributePredicate::equals("id", "missing")),
    ];

    for spec in &specs {
        let first = resolve(&resolver, &tree, spec);
        let second = resolve(&resolver, &tree, spec);
        assert_eq!(first, second, "outcome changed for {}", spec);
    }
}

#[test]
fn test_test_attribute_and_name_strategies() {
    let tree = tree();
    let resolver = Resolver::default();
    let email = find(&tree, "name", "email");

    let by_test_id = LocatorSpec::any(AttributePredicate::equals("data-testid", "signup-email"));
    let resolved = resolve(&resolver, &tree, &by_test_id).unwrap();
    assert_eq!((resolved.node, resolved.strategy), (email, StrategyId::TestAttribute));

    let by_name = LocatorSpec::new("input", AttributePredicate::equals("name", "email"));
    let resolved = resolve(&resolver, &tree, &by_name).unwrap();
    assert_eq!((resolved.node, resolved.strategy), (email, StrategyId::Name));
}

#[test]
fn test_builtin_text_locator_runs_first() {
    let tree = tree();
    let spec = LocatorSpec::new("a", AttributePredicate::present("href"))
        .with_text(TextMatch::Equals("need help?".into()));

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, find(&tree, "href", "/help"));
    assert_eq!(resolved.strategy, StrategyId::ToolBuiltin);
}

#[test]
fn test_builtin_text_hit_must_match_attribute() {
    let tree = tree();
    // Right id, wrong text: the text locator finds nothing and id decides.
    let spec = LocatorSpec::new("button", AttributePredicate::equals("id", "signup"))
        .with_text(TextMatch::Equals("Log in".into()));

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, find(&tree, "id", "signup"));
    assert_eq!(resolved.strategy, StrategyId::Id);
    assert_eq!(
        resolved.attempts,
        vec![
            attempt(StrategyId::ToolBuiltin, 0, false),
            attempt(StrategyId::Id, 1, false),
        ]
    );
}

#[test]
fn test_builtin_does_not_rescue_removed_id() {
    let tree = DocumentTree::from_snapshot(&login_page_with_signup(
        signup_button().without_attr("id"),
    ));
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"))
        .with_text(TextMatch::Equals("Sign up".into()));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert_eq!(
        err.attempts(),
        &[
            attempt(StrategyId::ToolBuiltin, 0, false),
            attempt(StrategyId::Id, 0, false),
        ]
    );
}

#[test]
fn test_ambiguous_builtin_falls_through() {
    let tree = tree();
    let spec = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"))
        .with_text(TextMatch::Contains("".into()));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::AmbiguousMatch { count: 2, .. }));
    assert_eq!(
        err.attempts(),
        &[
            attempt(StrategyId::ToolBuiltin, 2, false),
            attempt(StrategyId::GenericAttribute, 2, false),
        ]
    );
}

#[test]
fn test_index_is_last_resort() {
    let tree = tree();
    let spec = LocatorSpec::new("input", AttributePredicate::present("placeholder")).nth(1);

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, nth_tag(&tree, "input", 1));
    assert_eq!(resolved.strategy, StrategyId::IndexedPath);
    assert_eq!(
        resolved.attempts,
        vec![
            attempt(StrategyId::GenericAttribute, 2, false),
            attempt(StrategyId::IndexedPath, 1, false),
        ]
    );
}

#[test]
fn test_index_out_of_range_keeps_ambiguity() {
    let tree = tree();
    let spec = LocatorSpec::new("input", AttributePredicate::present("placeholder")).nth(5);

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::AmbiguousMatch { count: 2, .. }));
    assert_eq!(err.attempts().last(), Some(&attempt(StrategyId::IndexedPath, 0, false)));
}

#[test]
fn test_index_within_anchor() {
    let tree = tree();
    let spec = LocatorSpec::any(AttributePredicate::present("type"))
        .within(LocatorSpec::any(AttributePredicate::equals("id", "signup-form")))
        .nth(1);

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, find(&tree, "id", "signup"));
    assert_eq!(resolved.strategy, StrategyId::IndexedPath);
}

#[test]
fn test_unresolved_ancestor_is_reported() {
    let tree = tree();
    let spec = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"))
        .within(LocatorSpec::new("form", AttributePredicate::equals("id", "missing")));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert_eq!(
        err.attempts(),
        &[
            attempt(StrategyId::GenericAttribute, 0, false),
            attempt(StrategyId::AnchoredPath, 0, false),
        ]
    );
    let ancestor = err.ancestor().expect("ancestor failure attached");
    assert!(matches!(ancestor, ResolverError::NoMatch { .. }));
    assert_eq!(ancestor.attempts(), &[attempt(StrategyId::Id, 0, false)]);
}

#[test]
fn test_unique_match_outside_ancestor_is_rejected() {
    let tree = tree();
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"))
        .within(LocatorSpec::new("form", AttributePredicate::equals("id", "login-form")));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert_eq!(
        err.attempts(),
        &[
            attempt(StrategyId::Id, 0, true),
            attempt(StrategyId::AnchoredPath, 0, true),
        ]
    );
    assert!(err.ancestor().is_none());
}

#[test]
fn test_unique_match_inside_ancestor_is_anchored() {
    let tree = tree();
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"))
        .within(LocatorSpec::new("form", AttributePredicate::equals("id", "signup-form")));

    let resolved = resolve(&Resolver::default(), &tree, &spec).unwrap();

    assert_eq!(resolved.node, find(&tree, "id", "signup"));
    assert_eq!(resolved.attempts, vec![attempt(StrategyId::Id, 1, true)]);
}

#[test]
fn test_missing_ancestor_blocks_unique_target() {
    let tree = tree();
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"))
        .within(LocatorSpec::new("form", AttributePredicate::equals("id", "missing")));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert_eq!(
        err.attempts(),
        &[
            attempt(StrategyId::Id, 0, false),
            attempt(StrategyId::AnchoredPath, 0, false),
        ]
    );
    assert!(matches!(err.ancestor(), Some(ResolverError::NoMatch { .. })));
}

#[test]
fn test_ambiguous_ancestor_blocks_target() {
    let tree = tree();
    let spec = LocatorSpec::new("input", AttributePredicate::equals("name", "email"))
        .within(LocatorSpec::new("form", AttributePredicate::present("id")));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
    assert!(matches!(
        err.ancestor(),
        Some(ResolverError::AmbiguousMatch { count: 2, .. })
    ));
}

#[test]
fn test_anchor_itself_is_not_a_candidate() {
    let tree = tree();
    let spec = LocatorSpec::new("form", AttributePredicate::equals("id", "signup-form"))
        .within(LocatorSpec::new("form", AttributePredicate::equals("id", "signup-form")));

    let err = resolve(&Resolver::default(), &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }), "got {:?}", err);
}

fn toolbar_page() -> PageSnapshot {
    let section = |id: &str| {
        NodeSnapshot::element("section").attr("id", id).children([
            NodeSnapshot::element("button").attr("class", "btn").text("Save"),
            NodeSnapshot::element("button").attr("class", "btn").text("Cancel"),
        ])
    };
    PageSnapshot::new(NodeSnapshot::element("main").children([section("a"), section("b")]))
}

#[test]
fn test_anchored_path_uses_full_description() {
    let tree = DocumentTree::from_snapshot(&toolbar_page());
    let resolver = Resolver::from_config(&ResolverConfig {
        builtin_enabled: false,
        ..ResolverConfig::default()
    });
    let spec = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"))
        .with_text(TextMatch::Equals("Save".into()))
        .within(LocatorSpec::new("section", AttributePredicate::equals("id", "b")));

    let resolved = resolve(&resolver, &tree, &spec).unwrap();

    let section_b = find(&tree, "id", "b");
    let save_b = tree.node(section_b).unwrap().children().unwrap()[0].id();
    assert_eq!(resolved.node, save_b);
    assert_eq!(resolved.strategy, StrategyId::AnchoredPath);
    assert_eq!(
        resolved.attempts,
        vec![
            attempt(StrategyId::GenericAttribute, 2, true),
            attempt(StrategyId::AnchoredPath, 1, true),
        ]
    );
}

#[test]
fn test_configured_order_changes_winner() {
    let tree = tree();
    let spec = LocatorSpec::new("button", AttributePredicate::equals("id", "signup"))
        .with_text(TextMatch::Equals("Sign up".into()));

    let default = resolve(&Resolver::default(), &tree, &spec).unwrap();
    assert_eq!(default.strategy, StrategyId::ToolBuiltin);

    let id_first = Resolver::from_config(&ResolverConfig {
        strategy_order: vec![StrategyId::Id, StrategyId::ToolBuiltin],
        ..ResolverConfig::default()
    });
    let resolved = resolve(&id_first, &tree, &spec).unwrap();
    assert_eq!(resolved.strategy, StrategyId::Id);
    assert_eq!(resolved.node, default.node);
}

#[test]
fn test_omitted_strategy_is_never_tried() {
    let tree = tree();
    let resolver = Resolver::from_config(&ResolverConfig {
        strategy_order: vec![StrategyId::Id, StrategyId::Name],
        ..ResolverConfig::default()
    });
    let spec = LocatorSpec::new("input", AttributePredicate::equals("placeholder", "Username"));

    let err = resolve(&resolver, &tree, &spec).unwrap_err();

    assert!(matches!(err, ResolverError::NoMatch { .. }));
    assert!(err.attempts().is_empty());
}

#[test]
fn test_search_is_limited_to_root() {
    let tree = tree();
    let form = tree.node(find(&tree, "id", "login-form")).unwrap();
    let spec = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"));

    let resolved = Resolver::default().resolve(&spec, form).unwrap();

    assert_eq!(resolved.node, nth_tag(&tree, "button", 0));
}

#[test]
fn test_invalidated_tree_is_detached() {
    let tree = tree();
    let root = tree.root().unwrap();
    tree.handle().invalidate();
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"));

    let err = Resolver::default().resolve(&spec, root).unwrap_err();

    assert!(matches!(err, ResolverError::Detached(_)));
    assert!(err.attempts().is_empty());
}

struct InvalidatingLocator {
    handle: Mutex<Option<locus_engine::common::SnapshotHandle>>,
}

impl BuiltinLocator for InvalidatingLocator {
    fn name(&self) -> &str {
        "invalidating"
    }

    fn applies_to(&self, _spec: &LocatorSpec) -> bool {
        true
    }

    fn locate(
        &self,
        _spec: &LocatorSpec,
        _scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.invalidate();
        }
        Ok(Vec::new())
    }
}

#[test]
fn test_page_rerender_mid_resolution_is_fatal() {
    let tree = tree();
    let resolver = Resolver::new(StrategyChain::standard().with_builtin(Box::new(
        InvalidatingLocator {
            handle: Mutex::new(Some(tree.handle())),
        },
    )));
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"));

    let err = resolve(&resolver, &tree, &spec).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 4);
    assert!(matches!(
        err,
        ResolverError::Detached(DetachedNodeError::Invalidated { .. })
    ));
}

/// Host-specific locator keyed on the ARIA role attribute.
struct RoleLocator;

impl BuiltinLocator for RoleLocator {
    fn name(&self) -> &str {
        "role"
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.attribute.name() == "role"
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        let mut found = Vec::new();
        for node in scope.walk()? {
            let node = node?;
            if node.matches(&spec.attribute)? {
                found.push(node.id());
            }
        }
        Ok(found)
    }
}

#[test]
fn test_pluggable_builtin() {
    let page = PageSnapshot::new(
        NodeSnapshot::element("div").children([
            NodeSnapshot::element("div").attr("role", "dialog"),
            NodeSnapshot::element("div").attr("role", "banner"),
        ]),
    );
    let tree = DocumentTree::from_snapshot(&page);
    let chain = StrategyChain::standard().with_builtin(Box::new(RoleLocator));
    let resolver = Resolver::new(chain);
    let spec = LocatorSpec::any(AttributePredicate::equals("role", "dialog"));

    let resolved = resolve(&resolver, &tree, &spec).unwrap();

    assert_eq!(resolved.strategy, StrategyId::ToolBuiltin);
    assert_eq!(resolved.attempts.len(), 1);
}

#[test]
fn test_builtin_disabled_drops_slot() {
    let resolver = Resolver::from_config(&ResolverConfig {
        builtin_enabled: false,
        ..ResolverConfig::default()
    });
    assert!(!resolver.chain().ids().contains(&StrategyId::ToolBuiltin));
    assert_eq!(resolver.chain().len(), 6);
}
