use crate::strategy::StrategyId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocusConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Priority order of the strategy chain. Strategies left out are never tried.
    #[serde(default = "default_strategy_order")]
    pub strategy_order: Vec<StrategyId>,
    /// Attribute names handled by the test-attribute strategy.
    #[serde(default = "default_test_attributes")]
    pub test_attributes: Vec<String>,
    #[serde(default = "default_builtin_enabled")]
    pub builtin_enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy_order: default_strategy_order(),
            test_attributes: default_test_attributes(),
            builtin_enabled: default_builtin_enabled(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.strategy_order.is_empty() {
            return Err("resolver.strategy_order must name at least one strategy".into());
        }
        for (i, id) in self.strategy_order.iter().enumerate() {
            if self.strategy_order[..i].contains(id) {
                return Err(format!("resolver.strategy_order lists '{}' twice", id));
            }
        }
        if let Some(bad) = self
            .test_attributes
            .iter()
            .find(|a| a.trim().is_empty() || a.eq_ignore_ascii_case("id") || a.eq_ignore_ascii_case("name"))
        {
            return Err(format!("resolver.test_attributes cannot contain {:?}", bad));
        }
        Ok(())
    }
}

fn default_strategy_order() -> Vec<StrategyId> {
    StrategyId::DEFAULT_ORDER.to_vec()
}

fn default_test_attributes() -> Vec<String> {
    vec![
        "data-testid".to_string(),
        "data-test".to_string(),
        "data-test-id".to_string(),
        "data-qa".to_string(),
        "data-cy".to_string(),
    ]
}

fn default_builtin_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Extra field names whose values are masked in outlines.
    #[serde(default)]
    pub sensitive_fields: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            sensitive_fields: Vec::new(),
        }
    }
}
