//! History contract
//!
//! Flat and tree histories implement the same operations. Callers that do
//! not care about the representation hold an `Updates`, which dispatches to
//! one of them at runtime.

use crate::features::expr::{GuardBuilder, GuardedExpr};
use crate::features::updates::domain::{CopyAdapter, KeyInfo, SymbolicValue, UpdateMapper, UpdateNode};
use crate::features::updates::infrastructure::FoldCache;
use crate::shared::identity::StructureId;
use std::fmt::Debug;
use std::sync::Arc;

/// Chronological fold over a history
///
/// Receives the oldest write first. Folds are memoized per history version,
/// so a visitor must be a pure function of its inputs.
pub trait UpdatesVisitor<KI: KeyInfo, V> {
    type Output: Clone;

    fn visit_initial_value(&self) -> Self::Output;

    fn visit_update(&self, previous: Self::Output, update: &UpdateNode<KI, V>) -> Self::Output;
}

/// Persistent log of guarded writes to one symbolic collection
///
/// Every operation leaves `self` untouched and returns the new version.
pub trait CollectionUpdates<KI: KeyInfo, V: SymbolicValue>:
    Clone + Debug + Send + Sync + Sized
{
    /// Same representation over another key space
    type Mapped<KI2: KeyInfo<Guard = KI::Guard>>: CollectionUpdates<KI2, V>;

    fn key_info(&self) -> &Arc<KI>;

    /// Only the writes that may affect `key`
    ///
    /// Returns `self` (same identity) when nothing can be dropped.
    fn read(&self, key: &KI::Key) -> Self;

    fn write(&self, key: KI::Key, value: V, guard: KI::Guard) -> Self;

    /// Append a ranged write reading through `adapter`
    fn copy_range(&self, adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self;

    /// Move every value at `key` satisfying `predicate` into `matching`,
    /// newest first
    ///
    /// On return `guard_builder` holds "no write to `key` remained in the
    /// history". Returns `self` when nothing was removed.
    fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Self;

    /// Rewrite every node with `mapper`, keeping chronological order
    fn filter_map<KI2, M>(&self, mapper: &M, key_info: Arc<KI2>) -> Self::Mapped<KI2>
    where
        KI2: KeyInfo<Guard = KI::Guard>,
        M: UpdateMapper<KI, KI2, V> + ?Sized;

    /// The newest write, if any
    fn last_updated(&self) -> Option<&Arc<UpdateNode<KI, V>>>;

    fn is_empty(&self) -> bool;

    /// Every distinct write, oldest first
    fn iter(&self) -> Box<dyn Iterator<Item = Arc<UpdateNode<KI, V>>> + '_>;

    /// Identity of this version, shared by every clone of it
    fn identity(&self) -> StructureId;

    /// Fold every distinct write, oldest first
    ///
    /// `cache` memoizes intermediate results across calls; reuse it only
    /// with the same visitor.
    fn accept<Vis>(&self, visitor: &Vis, cache: &mut FoldCache<Vis::Output>) -> Vis::Output
    where
        Vis: UpdatesVisitor<KI, V> + ?Sized;
}
