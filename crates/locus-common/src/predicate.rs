//! Typed node predicates.
//!
//! Attribute lookups go through explicit name/value predicates instead of
//! string-built selectors, so every strategy compares nodes the same way.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tag a locator targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagFilter {
    #[default]
    Any,
    Tag(String),
}

impl TagFilter {
    pub fn tag(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Tag(expected) => expected.eq_ignore_ascii_case(tag),
        }
    }
}

impl From<String> for TagFilter {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "*" {
            Self::Any
        } else {
            Self::Tag(trimmed.to_ascii_lowercase())
        }
    }
}

impl From<&str> for TagFilter {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TagFilter> for String {
    fn from(value: TagFilter) -> Self {
        match value {
            TagFilter::Any => "*".to_string(),
            TagFilter::Tag(t) => t,
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Tag(t) => f.write_str(t),
        }
    }
}

/// How an attribute value is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMatch {
    /// Exact value. For `class`, any whitespace-separated token.
    Equals(String),
    /// Substring of the raw value.
    Contains(String),
    /// Attribute exists with any value.
    Present,
}

/// Attribute name plus value comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PredicateRepr", into = "PredicateRepr")]
pub struct AttributePredicate {
    name: String,
    value: ValueMatch,
}

impl AttributePredicate {
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            value: ValueMatch::Equals(value.into()),
        }
    }

    pub fn contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            value: ValueMatch::Contains(value.into()),
        }
    }

    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            value: ValueMatch::Present,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ValueMatch {
        &self.value
    }

    /// Test an attribute list. Names compare ASCII case-insensitively.
    pub fn matches_attributes(&self, attributes: &[(String, String)]) -> bool {
        let Some(actual) = attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(&self.name))
            .map(|(_, v)| v.as_str())
        else {
            return false;
        };

        match &self.value {
            ValueMatch::Present => true,
            ValueMatch::Contains(needle) => actual.contains(needle.as_str()),
            ValueMatch::Equals(expected) if self.name == "class" => {
                actual.split_whitespace().any(|token| token == expected)
            }
            ValueMatch::Equals(expected) => actual == expected,
        }
    }
}

impl fmt::Display for AttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ValueMatch::Equals(v) => write!(f, "[{}={:?}]", self.name, v),
            ValueMatch::Contains(v) => write!(f, "[{}*={:?}]", self.name, v),
            ValueMatch::Present => write!(f, "[{}]", self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PredicateRepr {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
}

impl TryFrom<PredicateRepr> for AttributePredicate {
    type Error = String;

    fn try_from(repr: PredicateRepr) -> Result<Self, Self::Error> {
        if repr.name.trim().is_empty() {
            return Err("attribute name must not be empty".into());
        }
        match (repr.equals, repr.contains) {
            (Some(_), Some(_)) => Err(format!(
                "attribute '{}' sets both 'equals' and 'contains'",
                repr.name
            )),
            (Some(v), None) => Ok(Self::equals(repr.name, v)),
            (None, Some(v)) => Ok(Self::contains(repr.name, v)),
            (None, None) => Ok(Self::present(repr.name)),
        }
    }
}

impl From<AttributePredicate> for PredicateRepr {
    fn from(p: AttributePredicate) -> Self {
        let (equals, contains) = match p.value {
            ValueMatch::Equals(v) => (Some(v), None),
            ValueMatch::Contains(v) => (None, Some(v)),
            ValueMatch::Present => (None, None),
        };
        Self {
            name: p.name,
            equals,
            contains,
        }
    }
}

/// Match against an element's own text, after normalization.
///
/// Serialized as `{ equals: "..." }` or `{ contains: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TextRepr", into = "TextRepr")]
pub enum TextMatch {
    Equals(String),
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, text: Option<&str>) -> bool {
        let Some(text) = text else {
            return false;
        };
        let actual = normalize_text(text);
        match self {
            Self::Equals(expected) => actual == normalize_text(expected),
            Self::Contains(needle) => actual.contains(&normalize_text(needle)),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(t) => write!(f, ":text({:?})", t),
            Self::Contains(t) => write!(f, ":has-text({:?})", t),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TextRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
}

impl TryFrom<TextRepr> for TextMatch {
    type Error = String;

    fn try_from(repr: TextRepr) -> Result<Self, Self::Error> {
        match (repr.equals, repr.contains) {
            (Some(v), None) => Ok(Self::Equals(v)),
            (None, Some(v)) => Ok(Self::Contains(v)),
            (Some(_), Some(_)) => Err("text sets both 'equals' and 'contains'".into()),
            (None, None) => Err("text needs 'equals' or 'contains'".into()),
        }
    }
}

impl From<TextMatch> for TextRepr {
    fn from(t: TextMatch) -> Self {
        match t {
            TextMatch::Equals(v) => Self {
                equals: Some(v),
                contains: None,
            },
            TextMatch::Contains(v) => Self {
                equals: None,
                contains: Some(v),
            },
        }
    }
}

/// Lower-case and collapse whitespace runs.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
