//! Structural strategies: match the full description (tag, attribute and
//! text hint together) relative to the anchor.

use super::{LocatorStrategy, StrategyId, collect_nodes, matches_full};
use crate::locator::LocatorSpec;
use crate::resolution::context::SearchScope;
use locus_common::{DetachedNodeError, NodeId};

/// Full match among the descendants of the uniquely resolved ancestor.
pub struct AnchoredPathLocator;

impl LocatorStrategy for AnchoredPathLocator {
    fn id(&self) -> StrategyId {
        StrategyId::AnchoredPath
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.ancestor.is_some()
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        if scope.anchor().is_none() {
            return Ok(Vec::new());
        }
        collect_nodes(scope.walk()?, |node| matches_full(node, spec))
    }
}

/// Position among full matches. Last resort: only reached when every
/// earlier strategy found zero or several candidates.
pub struct IndexedPathLocator;

impl LocatorStrategy for IndexedPathLocator {
    fn id(&self) -> StrategyId {
        StrategyId::IndexedPath
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.index.is_some()
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        let Some(index) = spec.index else {
            return Ok(Vec::new());
        };
        let pool = collect_nodes(scope.walk()?, |node| matches_full(node, spec))?;
        Ok(pool.get(index).copied().into_iter().collect())
    }
}
