//! Region contract
//!
//! A region is a possibly infinite set of concrete keys. Region trees only
//! ever use the five operations below, so any lattice of key sets can index
//! a history.

use std::fmt::Debug;
use std::hash::Hash;

/// Result of comparing `self` against another region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionComparison {
    /// No common key
    Disjoint,
    /// Some common keys, but `self` does not cover the other region
    Intersects,
    /// `self` is a superset of the other region
    Includes,
}

/// Set of concrete keys
///
/// Equality must be structural on a canonical form: the region tree files
/// nodes under their region and detects cloned nodes by comparing regions.
pub trait Region: Clone + Debug + PartialEq + Eq + Hash + Send + Sync {
    fn is_empty(&self) -> bool;

    fn intersect(&self, other: &Self) -> Self;

    fn subtract(&self, other: &Self) -> Self;

    fn union(&self, other: &Self) -> Self;

    /// Compare `self` against `other`
    ///
    /// `Includes` wins over `Intersects`; an empty `other` is included by anything.
    fn compare(&self, other: &Self) -> RegionComparison {
        if other.subtract(self).is_empty() {
            RegionComparison::Includes
        } else if self.intersect(other).is_empty() {
            RegionComparison::Disjoint
        } else {
            RegionComparison::Intersects
        }
    }

    fn includes(&self, other: &Self) -> bool {
        self.compare(other) == RegionComparison::Includes
    }
}
