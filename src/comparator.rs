//! Caller supplied knowledge about how payloads relate to each other.
use std::marker::PhantomData;

use thiserror::Error;

/// Classification of one payload relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// The first payload is the parent of the second.
    Parent,
    /// The first payload is a child of the second.
    Child,
    /// Neither is the parent of the other.
    None,
}

/// Decides parenthood and identity between payloads.
///
/// Implementations must make sure that no payload has more than one parent
/// and that no two payloads are each other's parent.
pub trait RelationshipComparator<T> {
    /// Returns `true` iff `parent` is the parent of `child`.
    fn is_parent(&self, parent: &T, child: &T) -> bool;

    /// Returns `true` iff both payloads represent the same logical entity.
    ///
    /// Must be symmetric. Used to skip items that were already added.
    fn equals(&self, a: &T, b: &T) -> bool;

    /// Classifies `a` relative to `b`.
    ///
    /// # Errors
    ///
    /// When `a` and `b` are each other's parent.
    fn relationship(&self, a: &T, b: &T) -> Result<Relationship, InconsistentRelationship> {
        match (self.is_parent(a, b), self.is_parent(b, a)) {
            (true, true) => Err(InconsistentRelationship),
            (true, false) => Ok(Relationship::Parent),
            (false, true) => Ok(Relationship::Child),
            (false, false) => Ok(Relationship::None),
        }
    }

    /// Extracts the identity of a payload, if it has one.
    ///
    /// Payloads with an identity are linked through hash lookups instead of a
    /// scan over every node. The returned keys must agree with
    /// [`RelationshipComparator::is_parent`]: `a` is the parent of `b` iff
    /// `b`'s parent id equals `a`'s id.
    fn link_key(&self, _data: &T) -> Option<LinkKey> {
        None
    }
}

/// Two payloads claim to be each other's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("each payload claims to be the parent of the other")]
pub struct InconsistentRelationship;

/// Payloads that carry their own id and the id of their parent.
pub trait LinkableData {
    fn id(&self) -> &str;

    /// The id of the parent. A value that matches no other item's id makes
    /// the item a root.
    fn parent_id(&self) -> &str;
}

/// Identity extracted from a payload: its own id and its parent's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub id: String,
    pub parent_id: String,
}

impl LinkKey {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
        }
    }
}

/// The canonical comparator over [`LinkableData`].
///
/// `a` is the parent of `b` iff `b.parent_id() == a.id()`; two payloads are
/// equal iff they are equal by value.
pub struct LinkComparator<T>(PhantomData<fn(&T)>);

impl<T> LinkComparator<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for LinkComparator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LinkComparator<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for LinkComparator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LinkComparator")
    }
}

impl<T: LinkableData + PartialEq> RelationshipComparator<T> for LinkComparator<T> {
    fn is_parent(&self, parent: &T, child: &T) -> bool {
        child.parent_id() == parent.id()
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn link_key(&self, data: &T) -> Option<LinkKey> {
        Some(LinkKey::new(data.id(), data.parent_id()))
    }
}

/// Comparator built from two closures. Payloads are always opaque.
pub struct FnComparator<P, E> {
    is_parent: P,
    equals: E,
}

impl<P, E> FnComparator<P, E> {
    pub fn new(is_parent: P, equals: E) -> Self {
        Self { is_parent, equals }
    }
}

impl<T, P, E> RelationshipComparator<T> for FnComparator<P, E>
where
    P: Fn(&T, &T) -> bool,
    E: Fn(&T, &T) -> bool,
{
    fn is_parent(&self, parent: &T, child: &T) -> bool {
        (self.is_parent)(parent, child)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.equals)(a, b)
    }
}

impl<T, C: RelationshipComparator<T> + ?Sized> RelationshipComparator<T> for &C {
    fn is_parent(&self, parent: &T, child: &T) -> bool {
        (**self).is_parent(parent, child)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (**self).equals(a, b)
    }

    fn relationship(&self, a: &T, b: &T) -> Result<Relationship, InconsistentRelationship> {
        (**self).relationship(a, b)
    }

    fn link_key(&self, data: &T) -> Option<LinkKey> {
        (**self).link_key(data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(&'static str, &'static str);

    impl LinkableData for Item {
        fn id(&self) -> &str {
            self.0
        }

        fn parent_id(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn relationship_both_directions() {
        let cmp = LinkComparator::new();
        let h = Item("h", "");
        let d = Item("d", "h");
        let x = Item("x", "y");

        assert_eq!(cmp.relationship(&h, &d), Ok(Relationship::Parent));
        assert_eq!(cmp.relationship(&d, &h), Ok(Relationship::Child));
        assert_eq!(cmp.relationship(&h, &x), Ok(Relationship::None));
    }

    #[test]
    fn mutual_parents_are_inconsistent() {
        let cmp = LinkComparator::new();
        let a = Item("a", "b");
        let b = Item("b", "a");

        assert_eq!(cmp.relationship(&a, &b), Err(InconsistentRelationship));
    }

    #[test]
    fn closures_have_no_link_key() {
        let cmp = FnComparator::new(|p: &u32, c: &u32| c / 10 == *p, |a: &u32, b: &u32| a == b);

        assert!(cmp.is_parent(&4, &42));
        assert!(!cmp.is_parent(&42, &4));
        assert_eq!(cmp.link_key(&42), None);
        assert_eq!(
            LinkComparator::new().link_key(&Item("d", "h")),
            Some(LinkKey::new("d", "h"))
        );
    }
}
