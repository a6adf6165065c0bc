//! Host-tool locator slot.
//!
//! Automation tools ship their own locator mechanisms (link text, roles,
//! framework component ids). The chain reserves one slot for such a
//! mechanism; hosts plug theirs in through [`BuiltinLocator`].

use super::{LocatorStrategy, StrategyId, collect_nodes, matches_full};
use crate::locator::LocatorSpec;
use crate::resolution::context::SearchScope;
use locus_common::{DetachedNodeError, NodeId};

pub trait BuiltinLocator: Send + Sync {
    fn name(&self) -> &str;

    fn applies_to(&self, spec: &LocatorSpec) -> bool;

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError>;
}

/// Link-text style lookup keyed on the element's own text.
///
/// Only applies when the spec carries a text hint. Tag and attribute
/// predicate must hold as well, so a text hit never overrides the
/// required attribute.
#[derive(Debug, Default)]
pub struct VisibleTextLocator;

impl BuiltinLocator for VisibleTextLocator {
    fn name(&self) -> &str {
        "visible_text"
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.text.is_some()
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        if spec.text.is_none() {
            return Ok(Vec::new());
        }
        collect_nodes(scope.walk()?, |node| matches_full(node, spec))
    }
}

pub struct ToolBuiltinLocator {
    inner: Box<dyn BuiltinLocator>,
}

impl ToolBuiltinLocator {
    pub fn new(inner: Box<dyn BuiltinLocator>) -> Self {
        Self { inner }
    }

    pub fn plugin_name(&self) -> &str {
        self.inner.name()
    }
}

impl Default for ToolBuiltinLocator {
    fn default() -> Self {
        Self::new(Box::new(VisibleTextLocator))
    }
}

impl LocatorStrategy for ToolBuiltinLocator {
    fn id(&self) -> StrategyId {
        StrategyId::ToolBuiltin
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        self.inner.applies_to(spec)
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        self.inner.locate(spec, scope)
    }
}
