use locus_common::{Descendants, DetachedNodeError, DocumentTree, NodeId};

/// Where a strategy is allowed to look.
#[derive(Debug, Clone, Copy)]
pub struct SearchScope<'a> {
    tree: &'a DocumentTree,
    root: NodeId,
    anchor: Option<NodeId>,
}

impl<'a> SearchScope<'a> {
    pub fn new(tree: &'a DocumentTree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            anchor: None,
        }
    }

    /// Same search root, with a uniquely resolved ancestor attached.
    pub fn scoped_to(&self, anchor: NodeId) -> SearchScope<'a> {
        SearchScope {
            tree: self.tree,
            root: self.root,
            anchor: Some(anchor),
        }
    }

    pub fn tree(&self) -> &'a DocumentTree {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// Nodes a strategy may consider: the anchor's descendants when one is
    /// attached, otherwise the search root and everything below it.
    pub fn walk(&self) -> Result<Descendants<'a>, DetachedNodeError> {
        match self.anchor {
            Some(anchor) => self.tree.descendants(anchor),
            None => self.tree.subtree(self.root),
        }
    }
}
