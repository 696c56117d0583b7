//! Incremental construction of forests from items that arrive in any order.
//!
//! Items do not have to be inserted ancestors first. Each item handed to a
//! [`ForestConstructor`] is linked to whatever parent and children are
//! already present, as decided by a caller supplied
//! [`RelationshipComparator`]. Items that are known to belong to the same
//! tree are tracked as a group, and groups are merged as soon as an item
//! connects them. [`ForestConstructor::tree_list`] then returns one root per
//! group, failing if a group does not resolve to exactly one root.
//!
//! Payloads implementing [`LinkableData`] can use [`LinkComparator`], which
//! also exposes their ids so that related nodes are found through hash
//! lookups instead of a scan over all nodes.
//!
//! Trees can also be assembled by hand through [`Forest`].
#[macro_use]
mod macros;

pub mod comparator;
pub mod constructor;
pub mod error;
pub mod forest;
pub mod memory;

mod group;

pub use comparator::{
    FnComparator, InconsistentRelationship, LinkComparator, LinkKey, LinkableData, Relationship,
    RelationshipComparator,
};
pub use constructor::{Added, ConstructorConfig, ForestConstructor, Strategy};
pub use error::ForestError;
pub use forest::{AttachError, Forest, NodeRef};

make_entity! {
    /// Index of a node within a [`Forest`].
    pub struct NodeIndex(u32);
    /// Identifier of a group of nodes that will end up in the same tree.
    ///
    /// Locations are handed out in increasing order and are never reused
    /// until the constructor is cleared.
    pub struct Location(u32);
}
