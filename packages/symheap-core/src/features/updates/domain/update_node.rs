//! Update nodes
//!
//! One write in a history. A pinpoint update stores one value under one
//! key; a ranged update overwrites a key range with values read lazily
//! from another collection.

use super::adapter::CopyAdapter;
use super::key_info::KeyInfo;
use super::mapper::UpdateMapper;
use crate::features::expr::{Guard, GuardBuilder, GuardedExpr};
use crate::features::regions::Region;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Values a history can store
pub trait SymbolicValue: Clone + Debug + PartialEq + Send + Sync + 'static {}

impl<T: Clone + Debug + PartialEq + Send + Sync + 'static> SymbolicValue for T {}

pub struct PinpointUpdate<KI: KeyInfo, V> {
    key: KI::Key,
    value: V,
    guard: KI::Guard,
    region: KI::Region,
    key_info: Arc<KI>,
    stamp: u64,
}

pub struct RangedUpdate<KI: KeyInfo, V> {
    adapter: Arc<dyn CopyAdapter<KI, V>>,
    guard: KI::Guard,
    region: KI::Region,
    stamp: u64,
}

/// A single guarded write
///
/// Nodes are shared by `Arc` across histories and compared by address, so
/// they are deliberately not `Clone`.
pub enum UpdateNode<KI: KeyInfo, V> {
    Pinpoint(PinpointUpdate<KI, V>),
    Ranged(RangedUpdate<KI, V>),
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction & Accessors
// ═══════════════════════════════════════════════════════════════════════════

impl<KI: KeyInfo, V: SymbolicValue> UpdateNode<KI, V> {
    pub fn pinpoint(key: KI::Key, value: V, guard: KI::Guard, key_info: &Arc<KI>) -> Self {
        let region = key_info.key_to_region(&key);
        UpdateNode::Pinpoint(PinpointUpdate {
            key,
            value,
            guard,
            region,
            key_info: Arc::clone(key_info),
            stamp: next_stamp(),
        })
    }

    pub fn ranged(adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self {
        let region = adapter.region();
        UpdateNode::Ranged(RangedUpdate {
            adapter,
            guard,
            region,
            stamp: next_stamp(),
        })
    }

    fn with_stamp(mut self, stamp: u64) -> Self {
        match &mut self {
            UpdateNode::Pinpoint(node) => node.stamp = stamp,
            UpdateNode::Ranged(node) => node.stamp = stamp,
        }
        self
    }

    /// Creation order of the write this node stems from
    ///
    /// Strictly increasing across writes; nodes rebuilt by `split` or
    /// `map` keep the stamp of the node they were rebuilt from.
    pub fn stamp(&self) -> u64 {
        match self {
            UpdateNode::Pinpoint(node) => node.stamp,
            UpdateNode::Ranged(node) => node.stamp,
        }
    }

    pub fn guard(&self) -> &KI::Guard {
        match self {
            UpdateNode::Pinpoint(node) => &node.guard,
            UpdateNode::Ranged(node) => &node.guard,
        }
    }

    /// Region computed when the node was built
    ///
    /// A tree may file the node under a strict subset of it.
    pub fn region(&self) -> &KI::Region {
        match self {
            UpdateNode::Pinpoint(node) => &node.region,
            UpdateNode::Ranged(node) => &node.region,
        }
    }

    pub fn key(&self) -> Option<&KI::Key> {
        match self {
            UpdateNode::Pinpoint(node) => Some(&node.key),
            UpdateNode::Ranged(_) => None,
        }
    }

    pub fn adapter(&self) -> Option<&Arc<dyn CopyAdapter<KI, V>>> {
        match self {
            UpdateNode::Pinpoint(_) => None,
            UpdateNode::Ranged(node) => Some(&node.adapter),
        }
    }

    pub fn is_ranged(&self) -> bool {
        matches!(self, UpdateNode::Ranged(_))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Inclusion
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether this write overwrites `key` in every state where
    /// `precondition` holds
    ///
    /// Only syntactic guard equality is recognised as implication.
    pub fn includes_concretely(&self, key: &KI::Key, precondition: &KI::Guard) -> bool {
        let guard = self.guard();
        let guarded = guard.is_true() || guard == precondition;
        guarded
            && match self {
                UpdateNode::Pinpoint(node) => node.key_info.eq_concrete(&node.key, key),
                UpdateNode::Ranged(node) => node.adapter.includes_concretely(key),
            }
    }

    /// Condition under which this write overwrites `key`; implies the guard
    pub fn includes_symbolically(&self, key: &KI::Key) -> KI::Guard {
        match self {
            UpdateNode::Pinpoint(node) => node
                .key_info
                .eq_symbolic(&node.key, key)
                .conjoin(&node.guard),
            UpdateNode::Ranged(node) => node.adapter.includes_symbolically(key).conjoin(&node.guard),
        }
    }

    /// Whether `update` overwrites everything this write wrote, in every state
    pub fn is_included_by_update_concretely(&self, update: &UpdateNode<KI, V>) -> bool {
        match self {
            UpdateNode::Pinpoint(node) => update.includes_concretely(&node.key, &node.guard),
            UpdateNode::Ranged(node) => node
                .adapter
                .is_included_by(&|key| update.includes_concretely(key, &node.guard)),
        }
    }

    /// Value written at `key`, assuming this write covers it
    pub fn value(&self, key: &KI::Key) -> V {
        match self {
            UpdateNode::Pinpoint(node) => node.value.clone(),
            UpdateNode::Ranged(node) => node.adapter.read(key),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Split & Map
    // ═══════════════════════════════════════════════════════════════════════

    /// Move every value at `key` satisfying `predicate` into `matching`
    ///
    /// Returns the node without those values, `None` when nothing remains.
    /// Pushes "this write misses `key`" onto `guard_builder` in every case.
    pub fn split(
        self: &Arc<Self>,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Option<Arc<Self>> {
        let includes = self.includes_symbolically(key);
        if includes.is_false() {
            return Some(Arc::clone(self));
        }
        let excludes = includes.negate();

        let result = match &**self {
            UpdateNode::Pinpoint(node) => {
                if predicate(&node.value) {
                    matching.push(GuardedExpr::new(
                        node.value.clone(),
                        guard_builder.guarded(&includes),
                    ));
                    None
                } else {
                    Some(Arc::clone(self))
                }
            }
            UpdateNode::Ranged(node) => {
                // the source is only read where this write covers the key
                let mut nested = GuardBuilder::new(guard_builder.guarded(&includes));
                match node.adapter.split(key, predicate, matching, &mut nested) {
                    None => Some(Arc::clone(self)),
                    Some(adapter) => Some(Arc::new(UpdateNode::Ranged(RangedUpdate {
                        adapter,
                        guard: node.guard.clone(),
                        region: node.region.clone(),
                        stamp: node.stamp,
                    }))),
                }
            }
        };

        guard_builder.push(&excludes);
        result
    }

    /// Rewrite this node into another key space
    ///
    /// `None` when the key is dropped by the mapper or the write can no
    /// longer happen.
    pub fn map<KI2, M>(&self, mapper: &M, key_info: &Arc<KI2>) -> Option<Arc<UpdateNode<KI2, V>>>
    where
        KI2: KeyInfo<Guard = KI::Guard>,
        M: UpdateMapper<KI, KI2, V> + ?Sized,
    {
        let guard = mapper.compose_guard(self.guard());
        if guard.is_false() {
            return None;
        }
        let mapped = match self {
            UpdateNode::Pinpoint(node) => {
                let key = mapper.map_key(&node.key)?;
                let value = mapper.compose_value(&node.value);
                UpdateNode::pinpoint(key, value, guard, key_info)
            }
            UpdateNode::Ranged(node) => {
                let adapter = mapper.map_adapter(&node.adapter)?;
                UpdateNode::ranged(adapter, guard)
            }
        };
        if mapped.region().is_empty() {
            return None;
        }
        Some(Arc::new(mapped.with_stamp(self.stamp())))
    }
}

impl<KI: KeyInfo, V: Debug> Debug for UpdateNode<KI, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateNode::Pinpoint(node) => {
                write!(f, "{{{:?} <- {:?}", node.key, node.value)?;
                if !node.guard.is_true() {
                    write!(f, " | {:?}", node.guard)?;
                }
                write!(f, "}}")
            }
            UpdateNode::Ranged(node) => {
                write!(f, "{{{:?} <- {:?}", node.region, node.adapter)?;
                if !node.guard.is_true() {
                    write!(f, " | {:?}", node.guard)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expr::{PathCondition, SymbolicExpr};
    use crate::features::updates::domain::IdentityMapper;
    use crate::features::updates::infrastructure::IndexKeyInfo;
    use pretty_assertions::assert_eq;

    fn node(
        key: SymbolicExpr,
        value: i64,
        guard: PathCondition,
    ) -> Arc<UpdateNode<IndexKeyInfo, SymbolicExpr>> {
        let key_info = Arc::new(IndexKeyInfo);
        Arc::new(UpdateNode::pinpoint(
            key,
            SymbolicExpr::concrete(value),
            guard,
            &key_info,
        ))
    }

    #[test]
    fn test_concrete_inclusion_requires_matching_guard() {
        let g = PathCondition::var("g");
        let update = node(SymbolicExpr::concrete(1), 10, g.clone());

        assert!(update.includes_concretely(&SymbolicExpr::concrete(1), &g));
        assert!(!update.includes_concretely(&SymbolicExpr::concrete(1), &PathCondition::True));
        assert!(!update.includes_concretely(&SymbolicExpr::concrete(2), &g));
    }

    #[test]
    fn test_unguarded_write_overwrites_guarded_one() {
        let older = node(SymbolicExpr::concrete(1), 10, PathCondition::var("g"));
        let newer = node(SymbolicExpr::concrete(1), 20, PathCondition::True);

        assert!(older.is_included_by_update_concretely(&newer));
        assert!(!newer.is_included_by_update_concretely(&older));
    }

    #[test]
    fn test_symbolic_inclusion_conjoins_guard() {
        let g = PathCondition::var("g");
        let update = node(SymbolicExpr::symbol("i"), 10, g.clone());
        let expected =
            PathCondition::equal(SymbolicExpr::symbol("i"), SymbolicExpr::concrete(3)).conjoin(&g);

        assert_eq!(update.includes_symbolically(&SymbolicExpr::concrete(3)), expected);
    }

    #[test]
    fn test_split_moves_matching_value() {
        let update = node(SymbolicExpr::symbol("i"), 10, PathCondition::True);
        let mut matching = Vec::new();
        let mut gb = GuardBuilder::default();

        let rest = update.split(
            &SymbolicExpr::concrete(0),
            &|v| *v == SymbolicExpr::concrete(10),
            &mut matching,
            &mut gb,
        );

        assert!(rest.is_none());
        assert_eq!(matching.len(), 1);
        let includes = PathCondition::equal(SymbolicExpr::symbol("i"), SymbolicExpr::concrete(0));
        assert_eq!(matching[0].guard, includes);
        assert_eq!(gb.non_matching_guard(), &includes.negate());
    }

    #[test]
    fn test_stamps_follow_creation_order() {
        let older = node(SymbolicExpr::concrete(1), 10, PathCondition::True);
        let newer = node(SymbolicExpr::concrete(1), 20, PathCondition::True);
        assert!(older.stamp() < newer.stamp());

        let mapped = older
            .map(&IdentityMapper, &Arc::new(IndexKeyInfo))
            .expect("identity keeps the write");
        assert_eq!(mapped.stamp(), older.stamp());
    }

    #[test]
    fn test_split_skips_definitely_missed_key() {
        let update = node(SymbolicExpr::concrete(1), 10, PathCondition::True);
        let mut matching = Vec::new();
        let mut gb = GuardBuilder::default();

        let rest = update
            .split(&SymbolicExpr::concrete(2), &|_| true, &mut matching, &mut gb)
            .expect("node survives");

        assert!(Arc::ptr_eq(&rest, &update));
        assert!(matching.is_empty());
        assert!(gb.non_matching_guard().is_true());
    }
}
