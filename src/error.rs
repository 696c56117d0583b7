//! Errors raised while constructing a forest.
use thiserror::Error;

use crate::{Location, NodeIndex};

/// Error returned by [`ForestConstructor::add`](crate::ForestConstructor::add)
/// and [`ForestConstructor::tree_list`](crate::ForestConstructor::tree_list).
///
/// Every error is a deterministic function of the items added so far and the
/// answers of the comparator. A failing `add` leaves the constructor as it
/// was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error("the added item and {existing} claim to be each other's parent")]
    InconsistentRelationship { existing: NodeIndex },
    #[error("{child} already has a parent")]
    MultipleParents { child: NodeIndex },
    #[error("the added item would be a child of both {first} and {second}")]
    AmbiguousParent { first: NodeIndex, second: NodeIndex },
    #[error("id {id:?} is already taken by a different item")]
    DuplicateId { id: String },
    #[error("group {location} of {size} nodes has no root")]
    MissingRoot { location: Location, size: usize },
    #[error("group {location} has {roots} roots")]
    MultipleRoots { location: Location, roots: usize },
}
