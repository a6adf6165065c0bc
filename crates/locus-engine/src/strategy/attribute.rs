//! Single-attribute strategies.
//!
//! Each one owns a family of attribute names. Exactly one of them applies
//! to any spec, chosen by the name in the spec's predicate.

use super::{LocatorStrategy, StrategyId, collect_nodes};
use crate::locator::LocatorSpec;
use crate::resolution::context::SearchScope;
use locus_common::{DetachedNodeError, NodeId};

fn locate_by_attribute(
    spec: &LocatorSpec,
    scope: &SearchScope<'_>,
) -> Result<Vec<NodeId>, DetachedNodeError> {
    collect_nodes(scope.walk()?, |node| {
        Ok(node.matches_tag(&spec.tag)? && node.matches(&spec.attribute)?)
    })
}

/// `id` attribute.
pub struct IdLocator;

impl LocatorStrategy for IdLocator {
    fn id(&self) -> StrategyId {
        StrategyId::Id
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.attribute.name() == "id"
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        locate_by_attribute(spec, scope)
    }
}

/// Attributes added for automation, such as `data-testid`.
pub struct TestAttributeLocator {
    attributes: Vec<String>,
}

impl TestAttributeLocator {
    pub fn new(attributes: Vec<String>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl LocatorStrategy for TestAttributeLocator {
    fn id(&self) -> StrategyId {
        StrategyId::TestAttribute
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        self.attributes.iter().any(|a| a == spec.attribute.name())
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        locate_by_attribute(spec, scope)
    }
}

/// Form-control `name` attribute.
pub struct NameLocator;

impl LocatorStrategy for NameLocator {
    fn id(&self) -> StrategyId {
        StrategyId::Name
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        spec.attribute.name() == "name"
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        locate_by_attribute(spec, scope)
    }
}

/// Everything else: placeholder, type, class, aria-*, href, ...
pub struct GenericAttributeLocator {
    claimed: Vec<String>,
}

impl GenericAttributeLocator {
    /// `test_attributes` are left to [`TestAttributeLocator`].
    pub fn new(test_attributes: Vec<String>) -> Self {
        let mut claimed: Vec<String> = test_attributes
            .into_iter()
            .map(|a| a.to_ascii_lowercase())
            .collect();
        claimed.push("id".into());
        claimed.push("name".into());
        Self { claimed }
    }
}

impl LocatorStrategy for GenericAttributeLocator {
    fn id(&self) -> StrategyId {
        StrategyId::GenericAttribute
    }

    fn applies_to(&self, spec: &LocatorSpec) -> bool {
        !self.claimed.iter().any(|a| a == spec.attribute.name())
    }

    fn locate(
        &self,
        spec: &LocatorSpec,
        scope: &SearchScope<'_>,
    ) -> Result<Vec<NodeId>, DetachedNodeError> {
        locate_by_attribute(spec, scope)
    }
}
