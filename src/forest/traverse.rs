//! Walks over the nodes of a [`Forest`].
//!
//! All traversals assume the subtree they start from is acyclic, which holds
//! for every tree built through [`Forest::attach_last`] and for every root
//! returned by a successful
//! [`ForestConstructor::tree_list`](crate::ForestConstructor::tree_list).
use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::{Forest, NodeRef};
use crate::NodeIndex;

/// Iterator created by [`NodeRef::ancestors`].
pub struct Ancestors<'a, T> {
    forest: &'a Forest<T>,
    current: Option<NodeIndex>,
}

impl<'a, T> Ancestors<'a, T> {
    pub(super) fn new(forest: &'a Forest<T>, start: NodeIndex) -> Self {
        Self {
            forest,
            current: forest.parent(start),
        }
    }
}

impl<'a, T> Iterator for Ancestors<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        self.current = self.forest.parent(index);
        Some(self.forest.node_unchecked(index))
    }
}

impl<'a, T> FusedIterator for Ancestors<'a, T> {}

/// Iterator created by [`NodeRef::breadth_first`].
pub struct BreadthFirst<'a, T> {
    forest: &'a Forest<T>,
    queue: VecDeque<NodeIndex>,
}

impl<'a, T> BreadthFirst<'a, T> {
    pub(super) fn new(forest: &'a Forest<T>, start: NodeIndex) -> Self {
        Self {
            forest,
            queue: VecDeque::from([start]),
        }
    }
}

impl<'a, T> Iterator for BreadthFirst<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.queue.pop_front()?;
        self.queue.extend(self.forest.children(index));
        Some(self.forest.node_unchecked(index))
    }
}

impl<'a, T> FusedIterator for BreadthFirst<'a, T> {}

/// Iterator created by [`NodeRef::pre_order`].
pub struct PreOrder<'a, T> {
    forest: &'a Forest<T>,
    stack: Vec<NodeIndex>,
}

impl<'a, T> PreOrder<'a, T> {
    pub(super) fn new(forest: &'a Forest<T>, start: NodeIndex) -> Self {
        Self {
            forest,
            stack: vec![start],
        }
    }
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        // Reversed so that the first child ends up on top of the stack.
        self.stack.extend(self.forest.children(index).rev());
        Some(self.forest.node_unchecked(index))
    }
}

impl<'a, T> FusedIterator for PreOrder<'a, T> {}

/// Iterator created by [`NodeRef::post_order`].
pub struct PostOrder<'a, T> {
    forest: &'a Forest<T>,
    /// Each entry holds a node and the next of its children still to descend into.
    stack: Vec<(NodeIndex, Option<NodeIndex>)>,
}

impl<'a, T> PostOrder<'a, T> {
    pub(super) fn new(forest: &'a Forest<T>, start: NodeIndex) -> Self {
        Self {
            forest,
            stack: vec![(start, forest.layout.first(start))],
        }
    }
}

impl<'a, T> Iterator for PostOrder<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, pending) = self.stack.last_mut()?;
            match *pending {
                Some(child) => {
                    *pending = self.forest.layout.next(child);
                    let grandchild = self.forest.layout.first(child);
                    self.stack.push((child, grandchild));
                }
                None => {
                    let index = *index;
                    self.stack.pop();
                    return Some(self.forest.node_unchecked(index));
                }
            }
        }
    }
}

impl<'a, T> FusedIterator for PostOrder<'a, T> {}
