use crate::config::schema::ResolverConfig;
use crate::locator::LocatorSpec;
use crate::resolution::context::SearchScope;
use crate::resolution::result::{Attempt, Resolved, ResolutionOutcome, ResolverError};
use crate::strategy::StrategyChain;

use locus_common::{DetachedNodeError, DocumentTree, NodeId, NodeRef};
use tracing::{debug, trace};

/// Walks the strategy chain for a spec and picks a single node.
///
/// Resolution is a pure function of the tree and the spec: the same inputs
/// always produce the same outcome, and nothing is cached between calls.
pub struct Resolver {
    chain: StrategyChain,
}

/// Memoized ancestor lookup for one resolution call.
enum AnchorState {
    Pending,
    Found(NodeId),
    Failed(Box<ResolverError>),
}

impl Resolver {
    pub fn new(chain: StrategyChain) -> Self {
        Self { chain }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(StrategyChain::from_config(config))
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Resolve `spec` among `root` and its descendants.
    pub fn resolve(&self, spec: &LocatorSpec, root: NodeRef<'_>) -> ResolutionOutcome {
        self.resolve_in(spec, root.tree(), root.id())
    }

    fn resolve_in(&self, spec: &LocatorSpec, tree: &DocumentTree, root: NodeId) -> ResolutionOutcome {
        tree.node(root)?;

        let scope = SearchScope::new(tree, root);
        let mut anchor = AnchorState::Pending;
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut first_ambiguous: Option<Vec<NodeId>> = None;

        for strategy in self.chain.iter() {
            let id = strategy.id();
            if !strategy.applies_to(spec) {
                trace!(strategy = %id, target = %spec, "strategy not applicable");
                continue;
            }

            // With an ancestor constraint nothing outside the anchor is
            // searched, whatever the candidate count.
            let scope = if spec.ancestor.is_some() {
                match self.anchor(spec, &scope, &mut anchor)? {
                    Some(node) => scope.scoped_to(node),
                    None => {
                        debug!(strategy = %id, target = %spec, "ancestor unresolved, skipping");
                        attempts.push(Attempt {
                            strategy: id,
                            candidates: 0,
                            anchored: false,
                        });
                        continue;
                    }
                }
            } else {
                scope
            };

            let nodes = strategy.resolve(spec, &scope)?.nodes;
            let anchored = scope.anchor().is_some();

            debug!(
                strategy = %id,
                target = %spec,
                candidates = nodes.len(),
                anchored,
                "strategy attempted"
            );
            attempts.push(Attempt {
                strategy: id,
                candidates: nodes.len(),
                anchored,
            });

            match nodes.as_slice() {
                [node] => {
                    return Ok(Resolved {
                        node: *node,
                        strategy: id,
                        attempts,
                    });
                }
                [] => {}
                _ => {
                    if first_ambiguous.is_none() {
                        first_ambiguous = Some(nodes);
                    }
                }
            }
        }

        let ancestor = match anchor {
            AnchorState::Failed(err) => Some(err),
            _ => None,
        };

        match first_ambiguous {
            Some(candidates) => Err(ResolverError::AmbiguousMatch {
                target: spec.to_string(),
                count: candidates.len(),
                candidates,
                attempts,
                ancestor,
            }),
            None => Err(ResolverError::NoMatch {
                target: spec.to_string(),
                attempts,
                ancestor,
            }),
        }
    }

    /// Resolve the spec's ancestor once per call.
    ///
    /// The anchor is searched for within the same root as the target.
    /// Returns `Ok(None)` when there is no ancestor constraint or it did not
    /// resolve uniquely; a stale tree is the only error that escapes.
    fn anchor(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
        state: &mut AnchorState,
    ) -> Result<Option<NodeId>, DetachedNodeError> {
        let Some(ancestor) = spec.ancestor.as_deref() else {
            return Ok(None);
        };

        if let AnchorState::Pending = state {
            *state = match self.resolve_in(ancestor, scope.tree(), scope.root()) {
                Ok(resolved) => {
                    debug!(ancestor = %ancestor, node = %resolved.node, via = %resolved.strategy, "anchor resolved");
                    AnchorState::Found(resolved.node)
                }
                Err(ResolverError::Detached(e)) => return Err(e),
                Err(err) => {
                    debug!(ancestor = %ancestor, error = %err, "anchor unresolved");
                    AnchorState::Failed(Box::new(err))
                }
            };
        }

        Ok(match state {
            AnchorState::Found(node) => Some(*node),
            _ => None,
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(StrategyChain::standard())
    }
}
