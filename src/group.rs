//! Bookkeeping of which nodes will end up in the same tree.
//!
//! A group is a set of nodes known to be connected through parent/child
//! links. Groups are created when a node matches nothing, grow when a node
//! matches exactly one group and are merged when a node bridges several.
//! Merging always keeps the first matched location and remaps the members of
//! the others to it; there is no rank or size heuristic, so the surviving
//! location only depends on the order in which matches were found.
use std::collections::BTreeMap;

use tracing::debug;

use crate::memory::SecondaryMap;
use crate::{Location, NodeIndex};

#[derive(Debug, Clone, Default)]
pub(crate) struct GroupIndex {
    /// Members of every live group, ordered by location.
    groups: BTreeMap<Location, Vec<NodeIndex>>,
    /// The group of every tracked node.
    locations: SecondaryMap<NodeIndex, Option<Location>>,
    /// Next location to hand out. Locations are never reused before `clear`.
    next_location: u32,
}

/// Result of [`GroupIndex::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Merge {
    /// The location all merged groups now share.
    pub canonical: Location,
    /// The locations that no longer exist.
    pub absorbed: Vec<Location>,
    /// The nodes whose location changed.
    pub moved: Vec<NodeIndex>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns the group a node belongs to, if it is tracked.
    #[inline]
    pub fn location(&self, node: NodeIndex) -> Option<Location> {
        self.locations[node]
    }

    /// Opens a new group containing only `node`.
    pub fn create(&mut self, node: NodeIndex) -> Location {
        let location = Location(self.next_location);
        self.next_location += 1;
        self.groups.insert(location, vec![node]);
        self.locations[node] = Some(location);
        debug!(%location, %node, "opened group");
        location
    }

    /// Adds `node` to an existing group.
    ///
    /// Returns `false` and does nothing when there is no such group.
    pub fn insert(&mut self, location: Location, node: NodeIndex) -> bool {
        let Some(members) = self.groups.get_mut(&location) else {
            return false;
        };
        members.push(node);
        self.locations[node] = Some(location);
        true
    }

    /// Merges all `locations` into the first one.
    ///
    /// Duplicates and unknown locations are ignored. Returns `None` when no
    /// location refers to a live group.
    pub fn merge(&mut self, locations: &[Location]) -> Option<Merge> {
        let mut live = locations
            .iter()
            .copied()
            .filter(|location| self.groups.contains_key(location));
        let canonical = live.next()?;
        let rest: Vec<Location> = live.filter(|location| *location != canonical).collect();

        let mut merge = Merge {
            canonical,
            absorbed: Vec::with_capacity(rest.len()),
            moved: Vec::new(),
        };

        for location in rest {
            let Some(members) = self.groups.remove(&location) else {
                // Listed twice; already absorbed.
                continue;
            };
            for &node in &members {
                self.locations[node] = Some(canonical);
            }
            merge.moved.extend_from_slice(&members);
            merge.absorbed.push(location);
        }

        if !merge.moved.is_empty() {
            if let Some(target) = self.groups.get_mut(&canonical) {
                target.extend_from_slice(&merge.moved);
            }
            debug!(
                %canonical,
                absorbed = merge.absorbed.len(),
                moved = merge.moved.len(),
                "merged groups"
            );
        }

        Some(merge)
    }

    /// Iterates over the groups in location order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &[NodeIndex])> + '_ {
        self.groups
            .iter()
            .map(|(location, members)| (*location, members.as_slice()))
    }

    /// Drops every group and restarts location numbering.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.locations.clear();
        self.next_location = 0;
    }
}
