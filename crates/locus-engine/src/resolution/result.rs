use crate::strategy::StrategyId;
use locus_common::{DetachedNodeError, NodeId};
use serde::Serialize;
use thiserror::Error;

/// What one applied strategy found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub strategy: StrategyId,
    pub candidates: usize,
    /// Candidates were restricted to the resolved ancestor's descendants.
    pub anchored: bool,
}

/// A unique match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub node: NodeId,
    pub strategy: StrategyId,
    pub attempts: Vec<Attempt>,
}

pub type ResolutionOutcome = Result<Resolved, ResolverError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("No element matches target: {target}")]
    NoMatch {
        target: String,
        attempts: Vec<Attempt>,
        /// Why the ancestor constraint could not be applied, if it was needed.
        ancestor: Option<Box<ResolverError>>,
    },

    #[error("Ambiguous target '{target}' matches {count} elements: {candidates:?}")]
    AmbiguousMatch {
        target: String,
        count: usize,
        candidates: Vec<NodeId>,
        attempts: Vec<Attempt>,
        ancestor: Option<Box<ResolverError>>,
    },

    #[error("Stale snapshot: {0}")]
    Detached(#[from] DetachedNodeError),
}

impl ResolverError {
    /// Strategies tried, in order. Empty for `Detached`.
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Self::NoMatch { attempts, .. } | Self::AmbiguousMatch { attempts, .. } => attempts,
            Self::Detached(_) => &[],
        }
    }

    pub fn ancestor(&self) -> Option<&ResolverError> {
        match self {
            Self::NoMatch { ancestor, .. } | Self::AmbiguousMatch { ancestor, .. } => {
                ancestor.as_deref()
            }
            Self::Detached(_) => None,
        }
    }

    /// Whether the caller should re-fetch the tree before retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Detached(_))
    }

    /// Process exit code for command-line use.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoMatch { .. } => 2,
            Self::AmbiguousMatch { .. } => 3,
            Self::Detached(_) => 4,
        }
    }
}
