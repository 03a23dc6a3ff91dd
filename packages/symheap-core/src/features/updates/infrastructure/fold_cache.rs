//! Fold memo
//!
//! Keyed by the identity of a history version (or a sub-tree of one). The
//! key holds the structure alive, so an address is never reused while its
//! entry exists.

use crate::shared::identity::StructureId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;

/// Result of folding one structure
#[derive(Clone)]
pub(crate) struct CachedFold<T> {
    pub(crate) result: T,
    /// Addresses of cloned nodes already visited by this fold
    pub(crate) emitted: Arc<FxHashSet<usize>>,
    /// Stamp of the newest node visited, 0 before any
    pub(crate) newest: u64,
}

impl<T> CachedFold<T> {
    pub(crate) fn new(result: T, emitted: Arc<FxHashSet<usize>>, newest: u64) -> Self {
        Self {
            result,
            emitted,
            newest,
        }
    }
}

/// Memo of chronological folds, valid for a single visitor
#[derive(Clone)]
pub struct FoldCache<T> {
    entries: FxHashMap<StructureId, CachedFold<T>>,
}

impl<T: Clone> FoldCache<T> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn get(&self, id: &StructureId) -> Option<&CachedFold<T>> {
        self.entries.get(id)
    }

    pub(crate) fn insert(&mut self, id: StructureId, fold: CachedFold<T>) {
        self.entries.insert(id, fold);
    }
}

impl<T: Clone> Default for FoldCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FoldCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoldCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
