//! Finite and cofinite key sets
//!
//! Suits key spaces without order: heap addresses, field slots. A symbolic
//! key that may alias anything maps to `universe()`, a concrete one to a
//! singleton, and carving concrete keys out of the universe keeps the
//! result cofinite.

use crate::features::regions::domain::Region;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SetRegion<T: Ord> {
    /// Exactly these keys
    Finite(BTreeSet<T>),
    /// Every key except these
    Cofinite(BTreeSet<T>),
}

impl<T: Ord + Clone> SetRegion<T> {
    pub fn empty() -> Self {
        Self::Finite(BTreeSet::new())
    }

    pub fn universe() -> Self {
        Self::Cofinite(BTreeSet::new())
    }

    pub fn singleton(value: T) -> Self {
        Self::Finite(BTreeSet::from([value]))
    }

    pub fn of(values: impl IntoIterator<Item = T>) -> Self {
        Self::Finite(values.into_iter().collect())
    }

    pub fn contains(&self, value: &T) -> bool {
        match self {
            Self::Finite(set) => set.contains(value),
            Self::Cofinite(excluded) => !excluded.contains(value),
        }
    }
}

fn intersection<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.intersection(b).cloned().collect()
}

fn difference<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.difference(b).cloned().collect()
}

fn union<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.union(b).cloned().collect()
}

impl<T> Region for SetRegion<T>
where
    T: Ord + Clone + Hash + fmt::Debug + Send + Sync,
{
    fn is_empty(&self) -> bool {
        // the key space is assumed infinite, so a cofinite set never is
        matches!(self, Self::Finite(set) if set.is_empty())
    }

    fn intersect(&self, other: &Self) -> Self {
        use SetRegion::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Finite(intersection(a, b)),
            (Finite(a), Cofinite(b)) | (Cofinite(b), Finite(a)) => Finite(difference(a, b)),
            (Cofinite(a), Cofinite(b)) => Cofinite(union(a, b)),
        }
    }

    fn subtract(&self, other: &Self) -> Self {
        use SetRegion::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Finite(difference(a, b)),
            (Finite(a), Cofinite(b)) => Finite(intersection(a, b)),
            (Cofinite(a), Finite(b)) => Cofinite(union(a, b)),
            (Cofinite(a), Cofinite(b)) => Finite(difference(b, a)),
        }
    }

    fn union(&self, other: &Self) -> Self {
        use SetRegion::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Finite(union(a, b)),
            (Finite(a), Cofinite(b)) | (Cofinite(b), Finite(a)) => Cofinite(difference(b, a)),
            (Cofinite(a), Cofinite(b)) => Cofinite(intersection(a, b)),
        }
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for SetRegion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(set) => f.debug_set().entries(set).finish(),
            Self::Cofinite(excluded) if excluded.is_empty() => write!(f, "⊤"),
            Self::Cofinite(excluded) => {
                write!(f, "⊤ \\ ")?;
                f.debug_set().entries(excluded).finish()
            }
        }
    }
}
