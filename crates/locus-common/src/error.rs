use crate::tree::NodeId;
use thiserror::Error;

/// The tree a query ran against no longer reflects the page.
///
/// Raised by every accessor call once the owning snapshot has been
/// invalidated, or when a node handle from another snapshot is used.
/// Callers are expected to fetch a fresh snapshot and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetachedNodeError {
    #[error("Snapshot generation {captured} is stale (page is now at generation {current})")]
    Invalidated { captured: u64, current: u64 },

    #[error("Node {0} does not belong to this snapshot")]
    UnknownNode(NodeId),
}
