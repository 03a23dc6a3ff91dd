//! Flat history
//!
//! A newest-first cons chain. Writes prepend in O(1); every older version
//! stays reachable through its own head.
//!
//! ```text
//! head ─▶ [w3] ─▶ [w2] ─▶ [w1] ─▶ ∅
//!          ▲
//! fork ───┘ (shares w3..w1)
//! ```
//!
//! Read, split and fold all walk the chain with loops; a chain as long as
//! the longest execution path never recurses.

use crate::features::expr::{Guard, GuardBuilder, GuardedExpr};
use crate::features::updates::domain::{
    CopyAdapter, KeyInfo, SymbolicValue, UpdateMapper, UpdateNode,
};
use crate::features::updates::infrastructure::fold_cache::{CachedFold, FoldCache};
use crate::features::updates::ports::{CollectionUpdates, UpdatesVisitor};
use crate::shared::identity::{structure_id, StructureId};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

struct FlatNode<KI: KeyInfo, V> {
    update: Arc<UpdateNode<KI, V>>,
    next: Option<Arc<FlatNode<KI, V>>>,
}

impl<KI: KeyInfo, V> Drop for FlatNode<KI, V> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut owned) => next = owned.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Linear history, newest write first
pub struct FlatUpdates<KI: KeyInfo, V> {
    head: Option<Arc<FlatNode<KI, V>>>,
    key_info: Arc<KI>,
}

impl<KI: KeyInfo, V: SymbolicValue> FlatUpdates<KI, V> {
    pub fn new(key_info: Arc<KI>) -> Self {
        Self {
            head: None,
            key_info,
        }
    }

    fn with_head(&self, head: Option<Arc<FlatNode<KI, V>>>) -> Self {
        Self {
            head,
            key_info: Arc::clone(&self.key_info),
        }
    }

    fn push(&self, update: Arc<UpdateNode<KI, V>>) -> Self {
        self.with_head(Some(Arc::new(FlatNode {
            update,
            next: self.head.clone(),
        })))
    }

    /// Number of writes in the chain
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head.as_ref();
        while let Some(node) = cursor {
            count += 1;
            cursor = node.next.as_ref();
        }
        count
    }

    /// Writes, newest first
    fn newest_first(&self) -> impl Iterator<Item = &Arc<FlatNode<KI, V>>> {
        std::iter::successors(self.head.as_ref(), |node| node.next.as_ref())
    }
}

impl<KI: KeyInfo, V: SymbolicValue> CollectionUpdates<KI, V> for FlatUpdates<KI, V> {
    type Mapped<KI2: KeyInfo<Guard = KI::Guard>> = FlatUpdates<KI2, V>;

    fn key_info(&self) -> &Arc<KI> {
        &self.key_info
    }

    fn read(&self, key: &KI::Key) -> Self {
        let mut cursor = self.head.as_ref();
        while let Some(node) = cursor {
            if !node.update.includes_symbolically(key).is_false() {
                break;
            }
            cursor = node.next.as_ref();
        }
        match (cursor, &self.head) {
            (Some(found), Some(head)) if Arc::ptr_eq(found, head) => self.clone(),
            _ => self.with_head(cursor.cloned()),
        }
    }

    fn write(&self, key: KI::Key, value: V, guard: KI::Guard) -> Self {
        self.push(Arc::new(UpdateNode::pinpoint(
            key,
            value,
            guard,
            &self.key_info,
        )))
    }

    fn copy_range(&self, adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self {
        self.push(Arc::new(UpdateNode::ranged(adapter, guard)))
    }

    fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Self {
        let mut visited: Vec<(&Arc<FlatNode<KI, V>>, Option<Arc<UpdateNode<KI, V>>>)> =
            Vec::new();
        let mut truncated = false;

        for node in self.newest_first() {
            let split = node.update.split(key, predicate, matching, guard_builder);
            visited.push((node, split));
            if guard_builder.is_false() {
                // a newer write definitely covered the key; older ones are dead
                truncated = node.next.is_some();
                break;
            }
        }

        let unchanged = !truncated
            && visited.iter().all(|(node, split)| {
                split
                    .as_ref()
                    .map_or(false, |update| Arc::ptr_eq(update, &node.update))
            });
        trace!(
            "flat split: {} matching, {} visited, changed: {}",
            matching.len(),
            visited.len(),
            !unchanged
        );
        if unchanged {
            return self.clone();
        }

        // rebuild oldest to newest, sharing the untouched older suffix
        let mut rebuilt: Option<Arc<FlatNode<KI, V>>> = None;
        let mut sharing = !truncated;
        for (node, split) in visited.into_iter().rev() {
            match split {
                Some(update) if sharing && Arc::ptr_eq(&update, &node.update) => {
                    rebuilt = Some(Arc::clone(node));
                }
                Some(update) => {
                    sharing = false;
                    rebuilt = Some(Arc::new(FlatNode {
                        update,
                        next: rebuilt,
                    }));
                }
                None => sharing = false,
            }
        }
        self.with_head(rebuilt)
    }

    fn filter_map<KI2, M>(&self, mapper: &M, key_info: Arc<KI2>) -> FlatUpdates<KI2, V>
    where
        KI2: KeyInfo<Guard = KI::Guard>,
        M: UpdateMapper<KI, KI2, V> + ?Sized,
    {
        let mut result = FlatUpdates::new(Arc::clone(&key_info));
        let mut dropped = 0usize;
        for update in self.iter() {
            match update.map(mapper, &key_info) {
                Some(mapped) => result = result.push(mapped),
                None => dropped += 1,
            }
        }
        debug!("flat filter_map dropped {} writes", dropped);
        result
    }

    fn last_updated(&self) -> Option<&Arc<UpdateNode<KI, V>>> {
        self.head.as_ref().map(|node| &node.update)
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Arc<UpdateNode<KI, V>>> + '_> {
        let mut updates: Vec<_> = self
            .newest_first()
            .map(|node| Arc::clone(&node.update))
            .collect();
        updates.reverse();
        Box::new(updates.into_iter())
    }

    fn identity(&self) -> StructureId {
        structure_id(&self.head)
    }

    fn accept<Vis>(&self, visitor: &Vis, cache: &mut FoldCache<Vis::Output>) -> Vis::Output
    where
        Vis: UpdatesVisitor<KI, V> + ?Sized,
    {
        let no_clones = Arc::new(FxHashSet::default());
        let mut pending = Vec::new();
        let mut cursor = self.head.clone();

        let mut acc = loop {
            let id = structure_id(&cursor);
            if let Some(hit) = cache.get(&id) {
                break hit.result.clone();
            }
            match cursor {
                None => {
                    let initial = visitor.visit_initial_value();
                    cache.insert(
                        id,
                        CachedFold::new(initial.clone(), Arc::clone(&no_clones), 0),
                    );
                    break initial;
                }
                Some(node) => {
                    cursor = node.next.clone();
                    pending.push(node);
                }
            }
        };

        while let Some(node) = pending.pop() {
            acc = visitor.visit_update(acc, &node.update);
            let stamp = node.update.stamp();
            cache.insert(
                structure_id(&Some(node)),
                CachedFold::new(acc.clone(), Arc::clone(&no_clones), stamp),
            );
        }
        acc
    }
}

impl<KI: KeyInfo, V> Clone for FlatUpdates<KI, V> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            key_info: Arc::clone(&self.key_info),
        }
    }
}

impl<KI: KeyInfo, V: fmt::Debug> fmt::Debug for FlatUpdates<KI, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let updates =
            std::iter::successors(self.head.as_ref(), |node| node.next.as_ref()).map(|n| &n.update);
        f.debug_list().entries(updates).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expr::{IteValue, PathCondition, SymbolicExpr};
    use crate::features::updates::infrastructure::IndexKeyInfo;
    use pretty_assertions::assert_eq;

    type Flat = FlatUpdates<IndexKeyInfo, SymbolicExpr>;

    fn empty() -> Flat {
        FlatUpdates::new(Arc::new(IndexKeyInfo))
    }

    fn c(n: i64) -> SymbolicExpr {
        SymbolicExpr::concrete(n)
    }

    /// Ite-chain over one key
    struct ValueAt(SymbolicExpr);

    impl UpdatesVisitor<IndexKeyInfo, SymbolicExpr> for ValueAt {
        type Output = SymbolicExpr;

        fn visit_initial_value(&self) -> SymbolicExpr {
            SymbolicExpr::symbol("init")
        }

        fn visit_update(
            &self,
            previous: SymbolicExpr,
            update: &UpdateNode<IndexKeyInfo, SymbolicExpr>,
        ) -> SymbolicExpr {
            SymbolicExpr::ite(
                &update.includes_symbolically(&self.0),
                update.value(&self.0),
                previous,
            )
        }
    }

    /// Number of visited writes
    struct Count;

    impl UpdatesVisitor<IndexKeyInfo, SymbolicExpr> for Count {
        type Output = usize;

        fn visit_initial_value(&self) -> usize {
            0
        }

        fn visit_update(&self, previous: usize, _: &UpdateNode<IndexKeyInfo, SymbolicExpr>) -> usize {
            previous + 1
        }
    }

    #[test]
    fn test_write_keeps_receiver() {
        let one = empty().write(c(1), c(10), PathCondition::True);
        let two = one.write(c(2), c(20), PathCondition::True);

        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert!(Arc::ptr_eq(
            two.last_updated().unwrap(),
            &two.iter().last().unwrap()
        ));
    }

    #[test]
    fn test_iter_is_oldest_first() {
        let history = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(c(2), c(20), PathCondition::True)
            .write(c(3), c(30), PathCondition::True);
        let values: Vec<_> = history.iter().map(|u| u.value(&c(0))).collect();
        assert_eq!(values, vec![c(10), c(20), c(30)]);
    }

    #[test]
    fn test_read_skips_definitely_missed_writes() {
        let history = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(c(2), c(20), PathCondition::True)
            .write(c(3), c(30), PathCondition::True);

        let narrowed = history.read(&c(1));
        assert_eq!(narrowed.len(), 1);

        let untouched = history.read(&c(3));
        assert_eq!(untouched.identity(), history.identity());
    }

    #[test]
    fn test_read_stops_at_symbolic_key() {
        let history = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(SymbolicExpr::symbol("i"), c(20), PathCondition::True)
            .write(c(3), c(30), PathCondition::True);
        assert_eq!(history.read(&c(1)).len(), 2);
    }

    #[test]
    fn test_fold_builds_ite_chain() {
        let g = PathCondition::var("g");
        let history = empty()
            .write(c(1), SymbolicExpr::symbol("a"), PathCondition::True)
            .write(c(1), SymbolicExpr::symbol("b"), g.clone());

        let value = history.accept(&ValueAt(c(1)), &mut FoldCache::new());
        let expected = SymbolicExpr::ite(&g, SymbolicExpr::symbol("b"), SymbolicExpr::symbol("a"));
        assert_eq!(value, expected);
    }

    #[test]
    fn test_fold_reuses_shared_suffix() {
        let base = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(c(2), c(20), PathCondition::True);
        let left = base.write(c(3), c(30), PathCondition::True);
        let right = base.write(c(4), c(40), PathCondition::True);

        let mut cache = FoldCache::new();
        assert_eq!(left.accept(&Count, &mut cache), 3);
        let cached = cache.len();
        assert_eq!(right.accept(&Count, &mut cache), 3);
        // only the new head was folded
        assert_eq!(cache.len(), cached + 1);
    }

    #[test]
    fn test_split_removes_matching_and_shares_suffix() {
        let history = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(SymbolicExpr::symbol("i"), c(99), PathCondition::True)
            .write(c(2), c(20), PathCondition::True);

        let mut matching = Vec::new();
        let mut gb = GuardBuilder::default();
        let rest = history.split(&c(5), &|v| *v == c(99), &mut matching, &mut gb);

        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].expr, c(99));
        assert_eq!(rest.len(), 2);
        let values: Vec<_> = rest.iter().map(|u| u.value(&c(0))).collect();
        assert_eq!(values, vec![c(10), c(20)]);
    }

    #[test]
    fn test_split_without_match_returns_same_version() {
        let history = empty()
            .write(SymbolicExpr::symbol("i"), c(10), PathCondition::True)
            .write(c(2), c(20), PathCondition::True);
        let mut matching = Vec::new();
        let mut gb = GuardBuilder::default();

        let rest = history.split(&c(5), &|_| false, &mut matching, &mut gb);
        assert!(matching.is_empty());
        assert_eq!(rest.identity(), history.identity());
    }

    #[test]
    fn test_split_stops_at_definite_overwrite() {
        let history = empty()
            .write(c(1), c(10), PathCondition::True)
            .write(c(1), c(20), PathCondition::True);
        let mut matching = Vec::new();
        let mut gb = GuardBuilder::default();

        let rest = history.split(&c(1), &|_| false, &mut matching, &mut gb);
        assert!(gb.is_false());
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.last_updated().unwrap().value(&c(1)), c(20));
    }

    #[test]
    fn test_deep_chain_fold_and_drop() {
        let mut history = empty();
        for i in 0..100_000 {
            history = history.write(c(i % 7), c(i), PathCondition::True);
        }
        assert_eq!(history.accept(&Count, &mut FoldCache::new()), 100_000);
        drop(history);
    }
}
