use std::{
    iter::FusedIterator,
    marker::PhantomData,
    ops::Index,
};

use crate::memory::EntityIndex;

/// An append-only arena of values addressed by stable indices.
///
/// Values are never removed individually; the only way to release them is
/// [`Arena::clear`], which invalidates every index handed out so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena<K, V> {
    data: Vec<V>,
    phantom: PhantomData<K>,
}

impl<K, V> Arena<K, V>
where
    K: EntityIndex,
{
    /// Creates an empty [`Arena<K, V>`].
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            phantom: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            phantom: PhantomData,
        }
    }

    /// Returns the number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether there is no stored value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the index the next inserted value will receive.
    #[inline]
    pub fn next_key(&self) -> K {
        K::new(self.data.len())
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        key.index() < self.data.len()
    }

    pub fn insert(&mut self, value: V) -> K {
        let key = self.next_key();
        self.data.push(value);
        key
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.data.get(key.index())
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> Keys<K> {
        Keys {
            range: 0..self.data.len(),
            phantom: PhantomData,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: self.data.iter().enumerate(),
            phantom: PhantomData,
        }
    }
}

impl<K, V> Index<K> for Arena<K, V>
where
    K: EntityIndex,
{
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        &self.data[key.index()]
    }
}

impl<K, V> Default for Arena<K, V>
where
    K: EntityIndex,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator created by [`Arena::keys`].
#[derive(Debug, Clone)]
pub struct Keys<K> {
    range: std::ops::Range<usize>,
    phantom: PhantomData<K>,
}

impl<K: EntityIndex> Iterator for Keys<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(K::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<K: EntityIndex> ExactSizeIterator for Keys<K> {}
impl<K: EntityIndex> FusedIterator for Keys<K> {}

/// Iterator created by [`Arena::iter`].
pub struct Iter<'a, K, V> {
    entries: std::iter::Enumerate<std::slice::Iter<'a, V>>,
    phantom: PhantomData<K>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, value) = self.entries.next()?;
        Some((K::new(index), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a, K: EntityIndex, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K: EntityIndex, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> IntoIterator for &'a Arena<K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_returns_sequential_keys() {
        let mut arena = Arena::<u32, &str>::new();
        assert!(arena.is_empty());

        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!((a, b), (0, 1));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[b], "b");
        assert!(arena.keys().eq([0, 1]));
        assert!(arena.iter().eq([(0, &"a"), (1, &"b")]));
    }

    #[test]
    fn clear_resets_keys() {
        let mut arena = Arena::<u32, u8>::new();
        arena.insert(1);
        arena.insert(2);
        arena.clear();

        assert!(!arena.contains(0));
        assert_eq!(arena.insert(3), 0);
    }
}
