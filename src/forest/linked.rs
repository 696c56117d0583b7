use std::iter::FusedIterator;
use std::mem::replace;
use thiserror::Error;

use crate::memory::map::SecondaryMap;
use crate::memory::EntityIndex;

/// Parent and child links between node indices, kept as doubly linked lists.
///
/// The order of child nodes is the order in which they were linked. The
/// structure only stores links; which indices are valid is decided by the
/// owner of the layout.
#[derive(Debug, Clone)]
pub struct LinkedForest<Index> {
    data: SecondaryMap<Index, NodeData<Index>>,
}

impl<Index: EntityIndex> LinkedForest<Index> {
    /// Creates a new empty layout.
    pub fn new() -> Self {
        Self {
            data: SecondaryMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: SecondaryMap::with_capacity(capacity),
        }
    }

    /// Removes every link.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<Index: EntityIndex> Default for LinkedForest<Index> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Index: EntityIndex> LinkedForest<Index> {
    /// Attaches a node as the last child of a parent node.
    ///
    /// # Errors
    ///
    ///  - When the attachment would introduce a cycle.
    ///  - When the node is already attached.
    pub fn attach_last(&mut self, node: Index, parent: Index) -> Result<(), AttachError> {
        if self.data[node].parent.is_some() {
            return Err(AttachError::AlreadyAttached);
        } else if !self.cycle_check(node, parent) {
            return Err(AttachError::Cycle);
        }

        self.push_child(node, parent);
        Ok(())
    }

    /// Attaches a node as the last child of a parent node without looking for
    /// cycles.
    ///
    /// Cycles are only ever closed by inconsistent relationship data and are
    /// reported later, when the roots are collected. Ancestor walks over a
    /// layout built this way must not assume termination.
    ///
    /// # Errors
    ///
    /// When the node is already attached.
    pub(crate) fn link_last(&mut self, node: Index, parent: Index) -> Result<(), AttachError> {
        if self.data[node].parent.is_some() {
            return Err(AttachError::AlreadyAttached);
        }

        self.push_child(node, parent);
        Ok(())
    }

    fn push_child(&mut self, node: Index, parent: Index) {
        self.data[parent].children_count += 1;
        self.data[node].parent = Some(parent);
        self.data[node].siblings[0] = self.data[parent].children[1];

        match replace(&mut self.data[parent].children[1], Some(node)) {
            Some(prev) => self.data[prev].siblings[1] = Some(node),
            None => self.data[parent].children[0] = Some(node),
        }
    }

    /// Ensures that making `node` a child of `parent` would not introduce a cycle.
    ///
    /// Assumes the layout itself is acyclic.
    fn cycle_check(&self, node: Index, mut parent: Index) -> bool {
        if parent == node {
            return false;
        }

        // When `node` does not have any children it can't contain `parent`.
        if self.data[node].children[0].is_none() {
            return true;
        }

        loop {
            if parent == node {
                return false;
            } else if let Some(next) = self.data[parent].parent {
                parent = next;
            } else {
                return true;
            }
        }
    }

    /// Returns a node's parent or `None` if it is a root.
    #[inline]
    pub fn parent(&self, node: Index) -> Option<Index> {
        self.data[node].parent
    }

    /// Returns a node's first child, if any.
    #[inline]
    pub fn first(&self, parent: Index) -> Option<Index> {
        self.data[parent].children[0]
    }

    /// Returns a node's last child, if any.
    #[inline]
    pub fn last(&self, parent: Index) -> Option<Index> {
        self.data[parent].children[1]
    }

    /// Returns the next sibling in the node's parent, if any.
    ///
    /// Also returns `None` if the node is a root.
    #[inline]
    pub fn next(&self, node: Index) -> Option<Index> {
        self.data[node].siblings[1]
    }

    /// Returns the previous sibling in the node's parent, if any.
    ///
    /// Also returns `None` if the node is a root.
    #[inline]
    pub fn prev(&self, node: Index) -> Option<Index> {
        self.data[node].siblings[0]
    }

    /// Iterates over the node's children.
    #[inline]
    pub fn children(&self, node: Index) -> Children<'_, Index> {
        let node_data = &self.data[node];
        Children {
            layout: self,
            next: node_data.children[0],
            prev: node_data.children[1],
            len: node_data.children_count as usize,
        }
    }

    /// Returns the number of the node's children.
    #[inline]
    pub fn child_count(&self, node: Index) -> usize {
        self.data[node].children_count as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData<Index> {
    /// The first and last child of the node, if any.
    children: [Option<Index>; 2],
    /// The number of children
    children_count: u32,
    /// The parent of a node, if any.
    parent: Option<Index>,
    /// The previous and next sibling of a node, if any.
    siblings: [Option<Index>; 2],
}

impl<Index> Default for NodeData<Index> {
    fn default() -> Self {
        Self {
            children: Default::default(),
            children_count: Default::default(),
            parent: Default::default(),
            siblings: Default::default(),
        }
    }
}

/// Iterator created by [`LinkedForest::children`].
#[derive(Debug, Clone)]
pub struct Children<'a, Index> {
    layout: &'a LinkedForest<Index>,
    next: Option<Index>,
    prev: Option<Index>,
    len: usize,
}

impl<'a, Index: EntityIndex> Iterator for Children<'a, Index> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        let current = self.next?;
        self.next = self.layout.next(current);
        Some(current)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, Index: EntityIndex> DoubleEndedIterator for Children<'a, Index> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        let current = self.prev?;
        self.prev = self.layout.prev(current);
        Some(current)
    }
}

impl<'a, Index: EntityIndex> ExactSizeIterator for Children<'a, Index> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, Index: EntityIndex> FusedIterator for Children<'a, Index> {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("the node is already attached")]
    AlreadyAttached,
    #[error("attaching the node would introduce a cycle")]
    Cycle,
    #[error("unknown node")]
    UnknownNode,
}
