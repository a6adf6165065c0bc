//! Locator resolution over captured page snapshots.
//!
//! A [`LocatorSpec`] describes the element wanted; the [`Resolver`] walks an
//! ordered [`StrategyChain`] and returns the first strategy's match that is
//! unique. An ancestor constraint confines every strategy to the anchor's
//! descendants; index-based selection is the last resort.

pub mod config;
pub mod formatter;
pub mod locator;
pub mod resolution;
pub mod source;
pub mod strategy;

pub use locator::{LocatorFileError, LocatorSpec};
pub use locus_common as common;
pub use locus_common::{AttributePredicate, DocumentTree, NodeId, PageSnapshot, TagFilter, TextMatch};
pub use resolution::{Attempt, Resolved, ResolutionOutcome, Resolver, ResolverError};
pub use source::{FileSnapshotSource, Located, Locator, MemorySnapshotSource, SnapshotSource};
pub use strategy::{StrategyChain, StrategyId};
