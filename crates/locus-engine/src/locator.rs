use locus_common::{AttributePredicate, TagFilter, TextMatch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Logical description of the element to find.
///
/// ```yaml
/// tag: button
/// attribute: { name: class, equals: btn }
/// ancestor:
///   tag: form
///   attribute: { name: id, equals: signup-form }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSpec {
    #[serde(default)]
    pub tag: TagFilter,
    pub attribute: AttributePredicate,
    /// Own-text hint, consumed by the built-in locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMatch>,
    /// Search is narrowed to descendants of the node this resolves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor: Option<Box<LocatorSpec>>,
    /// Zero-based position among full matches, used as a last resort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl LocatorSpec {
    pub fn new(tag: impl Into<TagFilter>, attribute: AttributePredicate) -> Self {
        Self {
            tag: tag.into(),
            attribute,
            text: None,
            ancestor: None,
            index: None,
        }
    }

    /// Any tag carrying the attribute.
    pub fn any(attribute: AttributePredicate) -> Self {
        Self::new(TagFilter::Any, attribute)
    }

    pub fn within(mut self, ancestor: LocatorSpec) -> Self {
        self.ancestor = Some(Box::new(ancestor));
        self
    }

    pub fn with_text(mut self, text: TextMatch) -> Self {
        self.text = Some(text);
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Parse a YAML (or JSON) locator document.
    pub fn from_yaml(content: &str) -> Result<Self, LocatorFileError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub async fn load_from(path: &Path) -> Result<Self, LocatorFileError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ancestor) = &self.ancestor {
            write!(f, "{} >> ", ancestor)?;
        }
        write!(f, "{}{}", self.tag, self.attribute)?;
        if let Some(text) = &self.text {
            write!(f, "{}", text)?;
        }
        if let Some(index) = self.index {
            write!(f, ":nth({})", index)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LocatorFileError {
    #[error("Failed to read locator file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse locator file: {0}")]
    Parse(#[from] serde_yaml::Error),
}
