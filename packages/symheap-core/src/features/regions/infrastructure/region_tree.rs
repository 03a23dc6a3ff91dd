//! Persistent Region Tree
//!
//! A forest of `region → (value, subtree)` entries where
//! - siblings are pairwise disjoint,
//! - every child region lies inside its parent's region,
//! - siblings keep insertion order, oldest first.
//!
//! ## Writing
//!
//! ```text
//! write(r, v):   split every entry against r
//!                  Includes   → moves under the new entry
//!                  Disjoint   → stays a sibling
//!                  Intersects → cut in two: (node ∩ r) below, (node \ r) beside
//!                then append  r → (v, included part)
//! ```
//!
//! A `keep` filter runs on every node that lands in either half. A node it
//! rejects disappears and its children take its place.
//!
//! Sibling maps sit behind `Arc`, so a write only copies the maps along the
//! partition frontier. Everything below a moved node is shared with the
//! previous version.

use crate::errors::{Result, SymheapError};
use crate::features::regions::domain::{Region, RegionComparison};
use crate::shared::identity::{structure_id, StructureId};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::Arc;

pub(crate) type Entries<R, V> = IndexMap<R, RegionTreeNode<R, V>, FxBuildHasher>;

/// Payload filed under one region
#[derive(Clone)]
pub struct RegionTreeNode<R, V> {
    pub value: V,
    pub subtree: RegionTree<R, V>,
}

/// Persistent region-indexed tree
pub struct RegionTree<R, V> {
    // None is the empty tree; no allocation until the first write
    entries: Option<Arc<Entries<R, V>>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction & Queries
// ═══════════════════════════════════════════════════════════════════════════

impl<R, V> RegionTree<R, V> {
    pub fn new() -> Self {
        Self { entries: None }
    }

    fn from_entries(entries: Entries<R, V>) -> Self {
        if entries.is_empty() {
            Self::new()
        } else {
            Self {
                entries: Some(Arc::new(entries)),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.as_ref().map_or(true, |e| e.is_empty())
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.len())
    }

    /// Top-level entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = (&R, &RegionTreeNode<R, V>)> {
        self.entries.iter().flat_map(|e| e.iter())
    }

    /// Newest top-level entry
    pub fn last(&self) -> Option<(&R, &RegionTreeNode<R, V>)> {
        self.entries.as_ref().and_then(|e| e.last())
    }

    pub(crate) fn first(&self) -> Option<(&R, &RegionTreeNode<R, V>)> {
        self.entries.as_ref().and_then(|e| e.first())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.entries, &other.entries) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Every `(region, value)` pair, children before their parent and
    /// siblings oldest first
    pub fn iter(&self) -> RegionTreeIter<'_, R, V> {
        RegionTreeIter {
            frames: self.entries.iter().map(|e| e.iter()).collect(),
            parents: Vec::new(),
        }
    }

    /// Post-order walk over the top-level entries after the first one
    pub(crate) fn iter_after_first(&self) -> RegionTreeIter<'_, R, V> {
        let frames = self
            .entries
            .iter()
            .map(|e| {
                let mut siblings = e.iter();
                siblings.next();
                siblings
            })
            .collect();
        RegionTreeIter {
            frames,
            parents: Vec::new(),
        }
    }
}

impl<R, V> RegionTree<R, V>
where
    R: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Structural identity of this version, shared by every clone
    pub fn id(&self) -> StructureId {
        structure_id(&self.entries)
    }
}

impl<R, V> Default for RegionTree<R, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, V> Clone for RegionTree<R, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Partitioning
// ═══════════════════════════════════════════════════════════════════════════

impl<R: Region, V: Clone> RegionTree<R, V> {
    /// Split into the part inside `region` and the part outside it
    ///
    /// Nodes rejected by `keep` are dropped from both halves and replaced
    /// by their children.
    pub fn split<F>(&self, region: &R, keep: &F) -> (Self, Self)
    where
        F: Fn(&V) -> bool,
    {
        let entries = match &self.entries {
            Some(entries) if !entries.is_empty() => entries,
            _ => return (Self::new(), Self::new()),
        };

        if let Some(node) = entries.get(region) {
            // everything else is a sibling of an exact match, hence disjoint
            let included = if keep(&node.value) {
                if entries.len() == 1 {
                    return (self.clone(), Self::new());
                }
                let mut single = Entries::default();
                single.insert(region.clone(), node.clone());
                Self::from_entries(single)
            } else {
                node.subtree.split(region, keep).0
            };
            let mut rest = (**entries).clone();
            rest.shift_remove(region);
            return (included, Self::from_entries(rest));
        }

        let mut included = Entries::default();
        let mut disjoint = Entries::default();
        let mut reshaped = false;

        for (node_region, node) in entries.iter() {
            match region.compare(node_region) {
                RegionComparison::Includes => {
                    reshaped |= !add_with_filter(&mut included, node_region.clone(), node, keep);
                }
                RegionComparison::Disjoint => {
                    reshaped |= !add_with_filter(&mut disjoint, node_region.clone(), node, keep);
                }
                RegionComparison::Intersects => {
                    reshaped = true;
                    let (inside, outside) = node.subtree.split(region, keep);
                    let inside = RegionTreeNode {
                        value: node.value.clone(),
                        subtree: inside,
                    };
                    let outside = RegionTreeNode {
                        value: node.value.clone(),
                        subtree: outside,
                    };
                    add_with_filter(&mut included, node_region.intersect(region), &inside, keep);
                    add_with_filter(&mut disjoint, node_region.subtract(region), &outside, keep);
                }
            }
        }

        if !reshaped {
            // nothing was cut or filtered: one side is this very tree
            if disjoint.is_empty() {
                return (self.clone(), Self::new());
            }
            if included.is_empty() {
                return (Self::new(), self.clone());
            }
        }
        (Self::from_entries(included), Self::from_entries(disjoint))
    }

    /// File `value` under `region`, moving everything it covers below it
    pub fn write<F>(&self, region: R, value: V, keep: &F) -> Self
    where
        F: Fn(&V) -> bool,
    {
        let (included, disjoint) = self.split(&region, keep);
        trace!(
            "region tree write: {} covered, {} beside",
            included.len(),
            disjoint.len()
        );

        let mut entries = disjoint.into_entries();
        entries.insert(
            region,
            RegionTreeNode {
                value,
                subtree: included,
            },
        );
        Self::from_entries(entries)
    }

    /// The part of the tree that can overlap `region`
    pub fn localize<F>(&self, region: &R, keep: &F) -> Self
    where
        F: Fn(&V) -> bool,
    {
        self.split(region, keep).0
    }

    fn into_entries(mut self) -> Entries<R, V> {
        match self.entries.take() {
            None => Entries::default(),
            Some(shared) => Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone()),
        }
    }

    /// Verify sibling disjointness and parent containment at every depth
    pub fn check_invariants(&self) -> Result<()> {
        let mut pending: Vec<(Option<&R>, &Entries<R, V>)> =
            self.entries.iter().map(|e| (None, &**e)).collect();

        while let Some((parent, entries)) = pending.pop() {
            let regions: Vec<&R> = entries.keys().collect();
            for (i, region) in regions.iter().enumerate() {
                if region.is_empty() {
                    return Err(SymheapError::invariant(format!(
                        "node filed under an empty region below {:?}",
                        parent
                    )));
                }
                if let Some(parent) = parent {
                    if !parent.includes(region) {
                        return Err(SymheapError::invariant(format!(
                            "child region {:?} is not contained in parent {:?}",
                            region, parent
                        )));
                    }
                }
                for other in &regions[i + 1..] {
                    if region.compare(other) != RegionComparison::Disjoint {
                        return Err(SymheapError::invariant(format!(
                            "sibling regions {:?} and {:?} overlap",
                            region, other
                        )));
                    }
                }
            }
            for (region, node) in entries.iter() {
                if let Some(children) = &node.subtree.entries {
                    pending.push((Some(region), children));
                }
            }
        }
        Ok(())
    }
}

/// Returns whether the node was kept as is
fn add_with_filter<R, V, F>(
    target: &mut Entries<R, V>,
    region: R,
    node: &RegionTreeNode<R, V>,
    keep: &F,
) -> bool
where
    R: Region,
    V: Clone,
    F: Fn(&V) -> bool,
{
    if keep(&node.value) {
        target.insert(region, node.clone());
        true
    } else {
        for (child_region, child) in node.subtree.entries() {
            target.insert(child_region.clone(), child.clone());
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Traversal
// ═══════════════════════════════════════════════════════════════════════════

/// Left-most post-order iterator with an explicit stack
pub struct RegionTreeIter<'a, R, V> {
    frames: Vec<indexmap::map::Iter<'a, R, RegionTreeNode<R, V>>>,
    // parents[i] owns frames[i + 1]
    parents: Vec<(&'a R, &'a V)>,
}

impl<'a, R, V> Iterator for RegionTreeIter<'a, R, V> {
    type Item = (&'a R, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.frames.last_mut()?;
            match frame.next() {
                Some((region, node)) => match node.subtree.entries.as_deref() {
                    Some(children) if !children.is_empty() => {
                        self.parents.push((region, &node.value));
                        self.frames.push(children.iter());
                    }
                    _ => return Some((region, &node.value)),
                },
                None => {
                    self.frames.pop();
                    if let Some(parent) = self.parents.pop() {
                        return Some(parent);
                    }
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Drop, Debug
// ═══════════════════════════════════════════════════════════════════════════

impl<R, V> Drop for RegionTree<R, V> {
    fn drop(&mut self) {
        // unlink uniquely owned levels one at a time instead of recursing
        let mut pending: Vec<Arc<Entries<R, V>>> = self.entries.take().into_iter().collect();
        while let Some(shared) = pending.pop() {
            if let Ok(entries) = Arc::try_unwrap(shared) {
                for (_, mut node) in entries {
                    if let Some(children) = node.subtree.entries.take() {
                        pending.push(children);
                    }
                }
            }
        }
    }
}

impl<R: fmt::Debug, V: fmt::Debug> fmt::Debug for RegionTree<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().map(|(r, n)| (r, (&n.value, &n.subtree))))
            .finish()
    }
}

impl<R: fmt::Debug, V: fmt::Debug> fmt::Debug for RegionTreeNode<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionTreeNode")
            .field("value", &self.value)
            .field("subtree", &self.subtree)
            .finish()
    }
}
