//! Read-only document tree accessor.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Ids are assigned in
//! depth-first pre-order, so every subtree occupies a contiguous id range;
//! traversal and ancestry checks are range walks over that layout.
//!
//! A tree is immutable once built. The page it was captured from is not:
//! the host holds a [`SnapshotHandle`] and calls
//! [`invalidate`](SnapshotHandle::invalidate) when the page re-renders, after
//! which every traversal or match on the tree fails with
//! [`DetachedNodeError`].

use crate::error::DetachedNodeError;
use crate::predicate::{AttributePredicate, TagFilter, TextMatch};
use crate::protocol::{NodeSnapshot, PageSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle to one node of a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// One past the last id in this node's subtree.
    subtree_end: usize,
}

/// Host-side view of a snapshot's liveness.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    generation: Arc<AtomicU64>,
}

impl SnapshotHandle {
    /// Mark the page as changed. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Immutable, single-rooted snapshot of a page.
#[derive(Debug)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
    url: String,
    title: String,
    captured: u64,
    generation: Arc<AtomicU64>,
}

impl DocumentTree {
    pub fn from_snapshot(page: &PageSnapshot) -> Self {
        let mut tree = Self::from_root(&page.root);
        tree.url = page.url.clone();
        tree.title = page.title.clone();
        tree
    }

    /// Build a tree from a nested node description.
    ///
    /// The snapshot is walked with an explicit stack, so deeply nested pages
    /// do not grow the call stack.
    pub fn from_root(root: &NodeSnapshot) -> Self {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack: Vec<(&NodeSnapshot, Option<NodeId>)> = vec![(root, None)];

        while let Some((snap, parent)) = stack.pop() {
            let id = NodeId(nodes.len());
            nodes.push(NodeData {
                tag: snap.tag.trim().to_ascii_lowercase(),
                attributes: snap.attributes.clone(),
                text: snap.text.clone(),
                parent,
                children: Vec::with_capacity(snap.children.len()),
                subtree_end: id.0 + 1,
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            for child in snap.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        for i in (0..nodes.len()).rev() {
            if let Some(&last) = nodes[i].children.last() {
                nodes[i].subtree_end = nodes[last.0].subtree_end;
            }
        }

        Self {
            nodes,
            url: String::new(),
            title: String::new(),
            captured: 0,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A handle the host keeps to invalidate this snapshot later.
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            generation: Arc::clone(&self.generation),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ensure_live(&self) -> Result<(), DetachedNodeError> {
        let current = self.generation.load(Ordering::Acquire);
        if current == self.captured {
            Ok(())
        } else {
            Err(DetachedNodeError::Invalidated {
                captured: self.captured,
                current,
            })
        }
    }

    pub fn root(&self) -> Result<NodeRef<'_>, DetachedNodeError> {
        self.node(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>, DetachedNodeError> {
        self.ensure_live()?;
        if id.0 < self.nodes.len() {
            Ok(NodeRef { tree: self, id })
        } else {
            Err(DetachedNodeError::UnknownNode(id))
        }
    }

    /// Nodes below `root` in depth-first pre-order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Result<Descendants<'_>, DetachedNodeError> {
        let node = self.node(root)?;
        Ok(Descendants {
            tree: self,
            next: root.0 + 1,
            end: node.data().subtree_end,
            failed: false,
        })
    }

    /// `root` followed by its descendants.
    pub fn subtree(&self, root: NodeId) -> Result<Descendants<'_>, DetachedNodeError> {
        let node = self.node(root)?;
        Ok(Descendants {
            tree: self,
            next: root.0,
            end: node.data().subtree_end,
            failed: false,
        })
    }

    pub fn matches(
        &self,
        id: NodeId,
        predicate: &AttributePredicate,
    ) -> Result<bool, DetachedNodeError> {
        self.node(id)?.matches(predicate)
    }

    /// Whether `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> Result<bool, DetachedNodeError> {
        self.node(id)?;
        let anchor = self.node(ancestor)?;
        Ok(ancestor.0 < id.0 && id.0 < anchor.data().subtree_end)
    }
}

/// Borrowed view of one node.
///
/// Plain data getters do not re-check liveness; traversal and matching do.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DocumentTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a DocumentTree {
        self.tree
    }

    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    pub fn attributes(&self) -> &'a [(String, String)] {
        &self.data().attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    pub fn parent(&self) -> Result<Option<NodeRef<'a>>, DetachedNodeError> {
        self.tree.ensure_live()?;
        Ok(self.data().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        }))
    }

    pub fn children(&self) -> Result<Vec<NodeRef<'a>>, DetachedNodeError> {
        self.tree.ensure_live()?;
        Ok(self
            .data()
            .children
            .iter()
            .map(|&id| NodeRef {
                tree: self.tree,
                id,
            })
            .collect())
    }

    pub fn matches(&self, predicate: &AttributePredicate) -> Result<bool, DetachedNodeError> {
        self.tree.ensure_live()?;
        Ok(predicate.matches_attributes(self.attributes()))
    }

    pub fn matches_tag(&self, tag: &TagFilter) -> Result<bool, DetachedNodeError> {
        self.tree.ensure_live()?;
        Ok(tag.matches(self.tag()))
    }

    pub fn matches_text(&self, text: &TextMatch) -> Result<bool, DetachedNodeError> {
        self.tree.ensure_live()?;
        Ok(text.matches(self.text()))
    }

    /// Compact css-like label, e.g. `input#user.field[placeholder="Username"]`.
    pub fn describe(&self) -> String {
        let mut out = self.tag().to_string();
        if let Some(id) = self.attribute("id") {
            out.push('#');
            out.push_str(id);
        }
        if let Some(class) = self.attribute("class") {
            for token in class.split_whitespace() {
                out.push('.');
                out.push_str(token);
            }
        }
        for key in ["name", "data-testid", "type", "placeholder"] {
            if let Some(value) = self.attribute(key) {
                out.push_str(&format!("[{}={:?}]", key, value));
            }
        }
        out
    }

    /// Labels from the root down to this node, joined by ` > `.
    pub fn path(&self) -> Result<String, DetachedNodeError> {
        self.tree.ensure_live()?;
        let mut labels = vec![self.describe()];
        let mut current = self.data().parent;
        while let Some(id) = current {
            let node = NodeRef {
                tree: self.tree,
                id,
            };
            labels.push(node.describe());
            current = node.data().parent;
        }
        labels.reverse();
        Ok(labels.join(" > "))
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

/// Lazy pre-order walk over a subtree.
///
/// Yields one `Err` and then stops if the snapshot is invalidated mid-walk.
pub struct Descendants<'a> {
    tree: &'a DocumentTree,
    next: usize,
    end: usize,
    failed: bool,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Result<NodeRef<'a>, DetachedNodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.end {
            return None;
        }
        if let Err(e) = self.tree.ensure_live() {
            self.failed = true;
            return Some(Err(e));
        }
        let id = NodeId(self.next);
        self.next += 1;
        Some(Ok(NodeRef {
            tree: self.tree,
            id,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(self.next)))
    }
}
