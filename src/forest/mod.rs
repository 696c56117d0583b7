//! Owned trees of payloads linked through node indices.
//!
//! Every node has an ordered collection of child nodes and at most one
//! parent. Roots, i.e. the nodes without a parent, are not ordered
//! themselves. A node that has never been attached to another node is
//! implicitly a root.
mod linked;
mod traverse;

pub use linked::{AttachError, Children, LinkedForest};
pub use traverse::{Ancestors, BreadthFirst, PostOrder, PreOrder};

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Index;

use crate::memory::Arena;
use crate::NodeIndex;

/// An arena of payloads together with the parent/child links between them.
///
/// The forest exclusively owns every payload. Links are non-owning: a child
/// refers to its parent by index only.
///
/// ```
/// # use arborist::Forest;
/// let mut forest = Forest::new();
/// let h = forest.add_node("h");
/// let d = forest.add_node("d");
/// let a = forest.add_node("a");
/// forest.attach_last(d, h).unwrap();
/// forest.attach_last(a, d).unwrap();
///
/// let root = forest.node(h).unwrap();
/// assert!(root.is_root());
/// assert!(root.pre_order().map(|n| *n.data()).eq(["h", "d", "a"]));
/// ```
#[derive(Debug, Clone)]
pub struct Forest<T> {
    nodes: Arena<NodeIndex, T>,
    layout: LinkedForest<NodeIndex>,
}

impl<T> Forest<T> {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            layout: LinkedForest::new(),
        }
    }

    /// Creates an empty forest with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            layout: LinkedForest::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the forest has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns whether `index` refers to a node of this forest.
    #[inline]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.nodes.contains(index)
    }

    /// Removes every node and link, invalidating all indices.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.layout.clear();
    }

    /// Adds a detached node and returns its index.
    pub fn add_node(&mut self, data: T) -> NodeIndex {
        self.nodes.insert(data)
    }

    /// Attaches `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    ///  - When either index is not part of the forest.
    ///  - When `child` already has a parent.
    ///  - When `child` is `parent` or one of its ancestors.
    pub fn attach_last(&mut self, child: NodeIndex, parent: NodeIndex) -> Result<(), AttachError> {
        if !self.contains(child) || !self.contains(parent) {
            return Err(AttachError::UnknownNode);
        }
        self.layout.attach_last(child, parent)
    }

    /// Like [`Forest::attach_last`] but without the cycle check.
    pub(crate) fn link_last(&mut self, child: NodeIndex, parent: NodeIndex) -> Result<(), AttachError> {
        if !self.contains(child) || !self.contains(parent) {
            return Err(AttachError::UnknownNode);
        }
        self.layout.link_last(child, parent)
    }

    /// Returns a handle to a node.
    pub fn node(&self, index: NodeIndex) -> Option<NodeRef<'_, T>> {
        self.contains(index).then_some(NodeRef {
            forest: self,
            index,
        })
    }

    /// Borrows the payload of a node.
    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&T> {
        self.nodes.get(index)
    }

    /// Returns a node's parent or `None` if it is a root.
    #[inline]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.layout.parent(index)
    }

    /// Returns whether a node has no parent.
    #[inline]
    pub fn is_root(&self, index: NodeIndex) -> bool {
        self.layout.parent(index).is_none()
    }

    /// Iterates over the node's children in link order.
    #[inline]
    pub fn children(&self, index: NodeIndex) -> Children<'_, NodeIndex> {
        self.layout.children(index)
    }

    /// Iterates over all roots in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_, T>> + '_ {
        self.nodes
            .keys()
            .filter(|index| self.is_root(*index))
            .map(|index| NodeRef {
                forest: self,
                index,
            })
    }

    #[inline]
    pub(crate) fn node_unchecked(&self, index: NodeIndex) -> NodeRef<'_, T> {
        NodeRef {
            forest: self,
            index,
        }
    }
}

impl<T> Index<NodeIndex> for Forest<T> {
    type Output = T;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed handle to a node in a [`Forest`].
///
/// The handle stays valid for as long as the forest it came from is
/// borrowed.
pub struct NodeRef<'a, T> {
    forest: &'a Forest<T>,
    index: NodeIndex,
}

impl<'a, T> NodeRef<'a, T> {
    /// The index of the node within its forest.
    #[inline]
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// The payload of the node.
    #[inline]
    pub fn data(&self) -> &'a T {
        &self.forest.nodes[self.index]
    }

    /// The parent of the node, or `None` for a root.
    #[inline]
    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.forest
            .parent(self.index)
            .map(|index| self.forest.node_unchecked(index))
    }

    /// Returns whether the node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.forest.is_root(self.index)
    }

    /// Iterates over the node's children in link order.
    pub fn children(&self) -> NodeChildren<'a, T> {
        NodeChildren {
            forest: self.forest,
            inner: self.forest.children(self.index),
        }
    }

    /// Returns the number of the node's children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.forest.layout.child_count(self.index)
    }

    /// Iterates over the parent chain, nearest first, ending with the root.
    pub fn ancestors(&self) -> Ancestors<'a, T> {
        Ancestors::new(self.forest, self.index)
    }

    /// Iterates over the subtree level by level, starting with this node.
    pub fn breadth_first(&self) -> BreadthFirst<'a, T> {
        BreadthFirst::new(self.forest, self.index)
    }

    /// Iterates over the subtree, visiting every node before its children.
    pub fn pre_order(&self) -> PreOrder<'a, T> {
        PreOrder::new(self.forest, self.index)
    }

    /// Iterates over the subtree, visiting every node after its children.
    pub fn post_order(&self) -> PostOrder<'a, T> {
        PostOrder::new(self.forest, self.index)
    }
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T> PartialEq for NodeRef<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.index == other.index
    }
}

impl<'a, T> Eq for NodeRef<'a, T> {}

impl<'a, T: fmt::Debug> fmt::Debug for NodeRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("data", self.data())
            .finish()
    }
}

/// Iterator created by [`NodeRef::children`].
pub struct NodeChildren<'a, T> {
    forest: &'a Forest<T>,
    inner: Children<'a, NodeIndex>,
}

impl<'a, T> Iterator for NodeChildren<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.inner.next()?;
        Some(self.forest.node_unchecked(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for NodeChildren<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.inner.next_back()?;
        Some(self.forest.node_unchecked(index))
    }
}

impl<'a, T> ExactSizeIterator for NodeChildren<'a, T> {}
impl<'a, T> FusedIterator for NodeChildren<'a, T> {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_handles_follow_links() {
        let mut forest = Forest::new();
        let root = forest.add_node("root");
        let left = forest.add_node("left");
        let right = forest.add_node("right");
        let lone = forest.add_node("lone");
        forest.attach_last(left, root).unwrap();
        forest.attach_last(right, root).unwrap();

        let node = forest.node(right).unwrap();
        assert_eq!(*node.data(), "right");
        assert!(!node.is_root());
        assert_eq!(node.parent().map(|p| p.index()), Some(root));

        let root_ref = forest.node(root).unwrap();
        assert_eq!(root_ref.child_count(), 2);
        assert!(root_ref.children().map(|c| *c.data()).eq(["left", "right"]));
        assert!(forest.roots().map(|r| r.index()).eq([root, lone]));
    }

    #[test]
    fn attach_unknown_node() {
        let mut forest = Forest::new();
        let a = forest.add_node(1);
        let bogus = NodeIndex(17);

        assert_eq!(forest.attach_last(bogus, a), Err(AttachError::UnknownNode));
        assert_eq!(forest.attach_last(a, bogus), Err(AttachError::UnknownNode));
        assert!(forest.node(bogus).is_none());
    }

    #[test]
    fn clear_empties_the_forest() {
        let mut forest = Forest::new();
        let a = forest.add_node(1);
        let b = forest.add_node(2);
        forest.attach_last(b, a).unwrap();
        forest.clear();

        assert!(forest.is_empty());
        let c = forest.add_node(3);
        assert_eq!(c, a);
        assert!(forest.is_root(c));
        assert!(forest.children(c).next().is_none());
    }
}
