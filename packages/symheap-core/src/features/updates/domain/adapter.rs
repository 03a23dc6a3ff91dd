//! Ranged-write source seam
//!
//! A ranged write copies keys out of another collection through a key
//! translation. The source collection and the translation hide behind this
//! object-safe trait, so a history stays generic over its own key space only.

use super::key_info::KeyInfo;
use crate::features::expr::{ExprComposer, GuardBuilder, GuardedExpr};
use std::fmt::Debug;
use std::sync::Arc;

pub trait CopyAdapter<KI: KeyInfo, V>: Debug + Send + Sync {
    /// Destination keys this copy overwrites
    fn region(&self) -> KI::Region;

    fn includes_concretely(&self, key: &KI::Key) -> bool;

    fn includes_symbolically(&self, key: &KI::Key) -> KI::Guard;

    /// Whether a write covering every key accepted by `covers` overwrites
    /// the whole copied range
    fn is_included_by(&self, covers: &dyn Fn(&KI::Key) -> bool) -> bool;

    /// Value the source holds at the translation of `key`
    fn read(&self, key: &KI::Key) -> V;

    /// Split the source at the translation of `key`
    ///
    /// `None` when the source history did not change.
    fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>>;

    /// Rewrite bounds and source through `composer`
    ///
    /// `None` when nothing changed.
    fn substitute(
        &self,
        composer: &dyn ExprComposer<KI::Key, V, KI::Guard>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>>;
}
