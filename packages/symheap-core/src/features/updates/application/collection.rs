//! Symbolic collections
//!
//! A named collection is a base value per key plus the history of writes
//! on top of it. Reading folds the history into an if-then-else chain
//! whose innermost branch is the base value.

use crate::features::expr::{
    ExprComposer, Guard, GuardBuilder, GuardedExpr, IteValue, SymbolicExpr,
};
use crate::features::updates::domain::{
    Composition, CopyAdapter, KeyInfo, SymbolicValue, UpdateNode,
};
use crate::features::updates::infrastructure::{FoldCache, Updates};
use crate::features::updates::ports::{CollectionUpdates, UpdatesVisitor};
use std::fmt;
use std::sync::Arc;

type BaseValue<KI, V> = Arc<dyn Fn(&<KI as KeyInfo>::Key) -> V + Send + Sync>;

/// Builds the value of one key, oldest write innermost
pub struct ReadFolder<'a, KI: KeyInfo, V> {
    key: &'a KI::Key,
    initial: V,
}

impl<'a, KI: KeyInfo, V> ReadFolder<'a, KI, V> {
    pub fn new(key: &'a KI::Key, initial: V) -> Self {
        Self { key, initial }
    }
}

impl<'a, KI, V> UpdatesVisitor<KI, V> for ReadFolder<'a, KI, V>
where
    KI: KeyInfo,
    V: SymbolicValue + IteValue<KI::Guard>,
{
    type Output = V;

    fn visit_initial_value(&self) -> V {
        self.initial.clone()
    }

    fn visit_update(&self, previous: V, update: &UpdateNode<KI, V>) -> V {
        V::ite(
            &update.includes_symbolically(self.key),
            update.value(self.key),
            previous,
        )
    }
}

/// A named collection: base values plus a persistent write history
pub struct SymbolicCollection<KI: KeyInfo, V> {
    name: Arc<str>,
    base: BaseValue<KI, V>,
    updates: Updates<KI, V>,
}

impl<KI: KeyInfo, V> SymbolicCollection<KI, V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn updates(&self) -> &Updates<KI, V> {
        &self.updates
    }
}

impl<KI, V> SymbolicCollection<KI, V>
where
    KI: KeyInfo,
    V: SymbolicValue + IteValue<KI::Guard>,
{
    pub fn new(
        name: impl Into<Arc<str>>,
        base: impl Fn(&KI::Key) -> V + Send + Sync + 'static,
        updates: Updates<KI, V>,
    ) -> Self {
        Self {
            name: name.into(),
            base: Arc::new(base),
            updates,
        }
    }

    /// Freshly allocated collection: every key holds `default`
    pub fn allocated(name: impl Into<Arc<str>>, default: V, updates: Updates<KI, V>) -> Self {
        Self::new(name, move |_| default.clone(), updates)
    }

    fn with_updates(&self, updates: Updates<KI, V>) -> Self {
        Self {
            name: Arc::clone(&self.name),
            base: Arc::clone(&self.base),
            updates,
        }
    }

    pub fn key_info(&self) -> &Arc<KI> {
        self.updates.key_info()
    }

    /// Value of `key` before any write
    pub fn base_value(&self, key: &KI::Key) -> V {
        (self.base)(key)
    }

    pub fn write(&self, key: KI::Key, value: V, guard: KI::Guard) -> Self {
        self.with_updates(self.updates.write(key, value, guard))
    }

    pub fn copy_range(&self, adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self {
        self.with_updates(self.updates.copy_range(adapter, guard))
    }

    pub fn read(&self, key: &KI::Key) -> V {
        if self.updates.is_empty() {
            return self.base_value(key);
        }
        let relevant = self.updates.read(key);
        if let Some(last) = relevant.last_updated() {
            if last.includes_symbolically(key).is_true() {
                return last.value(key);
            }
        }
        relevant.accept(
            &ReadFolder::new(key, self.base_value(key)),
            &mut FoldCache::new(),
        )
    }

    /// Collection without the writes at `key` whose value satisfies `predicate`
    pub fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Self {
        let residual = self.updates.split(key, predicate, matching, guard_builder);
        if residual.identity() == self.updates.identity() {
            return self.clone();
        }
        self.with_updates(residual)
    }

    /// Read `key` with every write satisfying `predicate` pulled to the top
    /// of the result, newest outermost
    pub fn splitting_read(&self, key: &KI::Key, predicate: &dyn Fn(&V) -> bool) -> V {
        let mut matching = Vec::new();
        let mut guard_builder = GuardBuilder::default();
        let residual = self.split(key, predicate, &mut matching, &mut guard_builder);

        matching
            .into_iter()
            .rev()
            .fold(residual.read(key), |otherwise, GuardedExpr { expr, guard }| {
                V::ite(&guard, expr, otherwise)
            })
    }

    /// Rewrite every write through `composer`; base values are kept
    pub fn substitute(&self, composer: &dyn ExprComposer<KI::Key, V, KI::Guard>) -> Self {
        if self.updates.is_empty() {
            return self.clone();
        }
        let mapper = Composition::new(composer);
        let updates = self
            .updates
            .filter_map(&mapper, Arc::clone(self.key_info()));
        self.with_updates(updates)
    }
}

impl<KI: KeyInfo<Key = SymbolicExpr>> SymbolicCollection<KI, SymbolicExpr>
where
    SymbolicExpr: IteValue<KI::Guard>,
{
    /// Input collection: unconstrained `name[key]` everywhere
    pub fn input(name: impl Into<Arc<str>>, updates: Updates<KI, SymbolicExpr>) -> Self {
        let name: Arc<str> = name.into();
        let collection = Arc::clone(&name);
        Self::new(
            name,
            move |key: &SymbolicExpr| SymbolicExpr::select(&*collection, key.clone()),
            updates,
        )
    }
}

impl<KI: KeyInfo, V> Clone for SymbolicCollection<KI, V> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            base: Arc::clone(&self.base),
            updates: self.updates.clone(),
        }
    }
}

impl<KI: KeyInfo, V: fmt::Debug> fmt::Debug for SymbolicCollection<KI, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolicCollection")
            .field("name", &self.name)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}
