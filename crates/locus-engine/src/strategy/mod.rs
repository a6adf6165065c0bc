//! Locator strategies and the ordered chain the resolver walks.

pub mod attribute;
pub mod builtin;
pub mod path;

pub use attribute::{GenericAttributeLocator, IdLocator, NameLocator, TestAttributeLocator};
pub use builtin::{BuiltinLocator, ToolBuiltinLocator, VisibleTextLocator};
pub use path::{AnchoredPathLocator, IndexedPathLocator};

use crate::config::schema::ResolverConfig;
use crate::locator::LocatorSpec;
use crate::resolution::context::SearchScope;
use locus_common::{DetachedNodeError, NodeId, NodeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy identifiers, listed in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    ToolBuiltin,
    Id,
    TestAttribute,
    Name,
    GenericAttribute,
    AnchoredPath,
    IndexedPath,
}

impl StrategyId {
    pub const DEFAULT_ORDER: [StrategyId; 7] = [
        StrategyId::ToolBuiltin,
        StrategyId::Id,
        StrategyId::TestAttribute,
        StrategyId::Name,
        StrategyId::GenericAttribute,
        StrategyId::AnchoredPath,
        StrategyId::IndexedPath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolBuiltin => "tool_builtin",
            Self::Id => "id",
            Self::TestAttribute => "test_attribute",
            Self::Name => "name",
            Self::GenericAttribute => "generic_attribute",
            Self::AnchoredPath => "anchored_path",
            Self::IndexedPath => "indexed_path",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nodes one strategy produced for one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyResult {
    pub strategy: StrategyId,
    pub nodes: Vec<NodeId>,
}

/// One way of turning a [`LocatorSpec`] into candidate nodes.
pub trait LocatorStrategy: Send + Sync {
    fn id(&self) -> StrategyId;

    /// Whether this strategy has anything to say about `spec`.
    /// Strategies that do not apply are skipped without being recorded.
    fn applies_to(&self, spec: &LocatorSpec) -> bool;

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError>;

    fn resolve(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<StrategyResult, DetachedNodeError> {
        Ok(StrategyResult {
            strategy: self.id(),
            nodes: self.locate(spec, scope)?,
        })
    }
}

/// Strategies in the order they are tried.
pub struct StrategyChain {
    strategies: Vec<Box<dyn LocatorStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn LocatorStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn standard() -> Self {
        Self::from_config(&ResolverConfig::default())
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        let strategies = config
            .strategy_order
            .iter()
            .filter(|id| config.builtin_enabled || **id != StrategyId::ToolBuiltin)
            .map(|id| -> Box<dyn LocatorStrategy> {
                match id {
                    StrategyId::ToolBuiltin => Box::new(ToolBuiltinLocator::default()),
                    StrategyId::Id => Box::new(IdLocator),
                    StrategyId::TestAttribute => {
                        Box::new(TestAttributeLocator::new(config.test_attributes.clone()))
                    }
                    StrategyId::Name => Box::new(NameLocator),
                    StrategyId::GenericAttribute => {
                        Box::new(GenericAttributeLocator::new(config.test_attributes.clone()))
                    }
                    StrategyId::AnchoredPath => Box::new(AnchoredPathLocator),
                    StrategyId::IndexedPath => Box::new(IndexedPathLocator),
                }
            })
            .collect();
        Self { strategies }
    }

    /// Swap the host-tool locator plugged into the built-in slot.
    /// No-op when the chain has no built-in slot.
    pub fn with_builtin(mut self, builtin: Box<dyn BuiltinLocator>) -> Self {
        if let Some(slot) = self
            .strategies
            .iter_mut()
            .find(|s| s.id() == StrategyId::ToolBuiltin)
        {
            *slot = Box::new(ToolBuiltinLocator::new(builtin));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn LocatorStrategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    pub fn ids(&self) -> Vec<StrategyId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::standard()
    }
}

/// Collect nodes from a walk that satisfy `keep`, in walk order.
pub(crate) fn collect_nodes<'a, I, F>(walk: I, mut keep: F) -> Result<Vec<NodeId>, DetachedNodeError>
where
    I: Iterator<Item = Result<NodeRef<'a>, DetachedNodeError>>,
    F: FnMut(&NodeRef<'a>) -> Result<bool, DetachedNodeError>,
{
    let mut found = Vec::new();
    for node in walk {
        let node = node?;
        if keep(&node)? {
            found.push(node.id());
        }
    }
    Ok(found)
}

/// Tag, attribute and (when given) text all hold.
pub(crate) fn matches_full(node: &NodeRef<'_>, spec: &LocatorSpec) -> Result<bool, DetachedNodeError> {
    if !node.matches_tag(&spec.tag)? || !node.matches(&spec.attribute)? {
        return Ok(false);
    }
    match &spec.text {
        Some(text) => node.matches_text(text),
        None => Ok(true),
    }
}
