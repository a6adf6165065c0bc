pub mod error;
pub mod formatter;
pub mod predicate;
pub mod protocol;
pub mod tree;

pub use error::DetachedNodeError;
pub use predicate::{AttributePredicate, TagFilter, TextMatch, ValueMatch, normalize_text};
pub use protocol::{NodeSnapshot, PageSnapshot};
pub use tree::{Descendants, DocumentTree, NodeId, NodeRef, SnapshotHandle};
