//! Region-indexed history
//!
//! Writes are filed in a [`RegionTree`] under the region of their key (or of
//! their copied range). A read localizes the tree to the key's region, so it
//! only looks at writes that can overlap the key.
//!
//! ## Cloned nodes
//!
//! A write that cuts an older node's region files the older node twice:
//!
//! ```text
//! A@{1,2}, then B@{1}:      {2} → A          (clone)
//!                           {1} → B
//!                                 └ {1} → A  (clone)
//! ```
//!
//! An occurrence is a clone when the region it is filed under differs from
//! the node's own region. Iteration and folds visit every node once, by
//! address, in stamp order. Post-order alone is not chronological: above,
//! the `{2} → A` clone precedes `B`, and a node older than `A` filed below
//! `{1} → A` would come after it.

use crate::errors::{Result, SymheapError};
use crate::features::expr::{Guard, GuardBuilder, GuardedExpr};
use crate::features::regions::{Region, RegionTree};
use crate::features::updates::domain::{
    CopyAdapter, KeyInfo, OverwriteMode, OverwritePolicy, SymbolicValue, UpdateMapper,
    UpdateNode,
};
use crate::features::updates::infrastructure::fold_cache::{CachedFold, FoldCache};
use crate::features::updates::ports::{CollectionUpdates, UpdatesVisitor};
use crate::shared::identity::{address_of, StructureId};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

type Node<KI, V> = Arc<UpdateNode<KI, V>>;
type Tree<KI, V> = RegionTree<<KI as KeyInfo>::Region, Node<KI, V>>;

/// Persistent region tree of writes
pub struct TreeUpdates<KI: KeyInfo, V, P = OverwriteMode> {
    updates: Tree<KI, V>,
    key_info: Arc<KI>,
    policy: P,
    verify_invariants: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════

impl<KI: KeyInfo, V: SymbolicValue, P: OverwritePolicy + Default> TreeUpdates<KI, V, P> {
    pub fn new(key_info: Arc<KI>) -> Self {
        Self::with_policy(key_info, P::default())
    }
}

impl<KI: KeyInfo, V: SymbolicValue, P: OverwritePolicy> TreeUpdates<KI, V, P> {
    pub fn with_policy(key_info: Arc<KI>, policy: P) -> Self {
        Self {
            updates: RegionTree::new(),
            key_info,
            policy,
            verify_invariants: false,
        }
    }

    /// Check the tree after every mutation and panic on a violation
    pub fn with_verification(mut self, verify_invariants: bool) -> Self {
        self.verify_invariants = verify_invariants;
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn region_tree(&self) -> &Tree<KI, V> {
        &self.updates
    }

    fn with_updates(&self, updates: Tree<KI, V>) -> Self {
        let result = Self {
            updates,
            key_info: Arc::clone(&self.key_info),
            policy: self.policy.clone(),
            verify_invariants: self.verify_invariants,
        };
        if result.verify_invariants {
            if let Err(err) = result.check_invariants() {
                panic!("corrupted update tree: {err}");
            }
        }
        result
    }

    fn empty_like<KI2: KeyInfo>(&self, key_info: Arc<KI2>) -> TreeUpdates<KI2, V, P> {
        TreeUpdates {
            updates: RegionTree::new(),
            key_info,
            policy: self.policy.clone(),
            verify_invariants: self.verify_invariants,
        }
    }

    /// File `node` under its own region, pruning what the policy lets it overwrite
    pub fn insert(&self, node: Node<KI, V>) -> Self {
        let region = node.region().clone();
        if region.is_empty() {
            trace!("tree insert skipped write over an empty region");
            return self.clone();
        }
        let policy = &self.policy;
        let keep = |old: &Node<KI, V>| !policy.is_overwritten(&**old, &*node);
        let updates = self.updates.write(region, Arc::clone(&node), &keep);
        self.with_updates(updates)
    }

    /// Tree invariants, plus every node filed inside its own region
    pub fn check_invariants(&self) -> Result<()> {
        self.updates.check_invariants()?;
        for (region, node) in self.updates.iter() {
            if !node.region().includes(region) {
                return Err(SymheapError::invariant(format!(
                    "{:?} filed under {:?}, outside its region {:?}",
                    node,
                    region,
                    node.region()
                )));
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// History contract
// ═══════════════════════════════════════════════════════════════════════════

impl<KI, V, P> CollectionUpdates<KI, V> for TreeUpdates<KI, V, P>
where
    KI: KeyInfo,
    V: SymbolicValue,
    P: OverwritePolicy,
{
    type Mapped<KI2: KeyInfo<Guard = KI::Guard>> = TreeUpdates<KI2, V, P>;

    fn key_info(&self) -> &Arc<KI> {
        &self.key_info
    }

    fn read(&self, key: &KI::Key) -> Self {
        let region = self.key_info.key_to_region(key);
        let keep = |node: &Node<KI, V>| !node.includes_symbolically(key).is_false();
        let localized = self.updates.localize(&region, &keep);
        if localized.ptr_eq(&self.updates) {
            return self.clone();
        }
        self.with_updates(localized)
    }

    fn write(&self, key: KI::Key, value: V, guard: KI::Guard) -> Self {
        self.insert(Arc::new(UpdateNode::pinpoint(
            key,
            value,
            guard,
            &self.key_info,
        )))
    }

    fn copy_range(&self, adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self {
        self.insert(Arc::new(UpdateNode::ranged(adapter, guard)))
    }

    fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Self {
        let nodes: Vec<Node<KI, V>> = self.iter().collect();
        let mut survivors = Vec::with_capacity(nodes.len());
        let mut changed = false;

        for node in nodes.iter().rev() {
            if guard_builder.is_false() {
                // a newer write definitely covered the key; older ones are dead
                changed = true;
                break;
            }
            match node.split(key, predicate, matching, guard_builder) {
                Some(rest) => {
                    changed |= !Arc::ptr_eq(&rest, node);
                    survivors.push(rest);
                }
                None => changed = true,
            }
        }

        trace!(
            "tree split: {} matching, {} of {} writes survive, changed: {}",
            matching.len(),
            survivors.len(),
            nodes.len(),
            changed
        );
        if !changed {
            return self.clone();
        }

        // refile oldest first so the region invariants are rebuilt from scratch
        survivors
            .into_iter()
            .rev()
            .fold(self.empty_like(Arc::clone(&self.key_info)), |tree, node| {
                tree.insert(node)
            })
    }

    fn filter_map<KI2, M>(&self, mapper: &M, key_info: Arc<KI2>) -> TreeUpdates<KI2, V, P>
    where
        KI2: KeyInfo<Guard = KI::Guard>,
        M: UpdateMapper<KI, KI2, V> + ?Sized,
    {
        let mut result = self.empty_like(Arc::clone(&key_info));
        let mut dropped = 0usize;
        for node in self.iter() {
            match node.map(mapper, &key_info) {
                Some(mapped) => result = result.insert(mapped),
                None => dropped += 1,
            }
        }
        debug!("tree filter_map dropped {} writes", dropped);
        result
    }

    fn last_updated(&self) -> Option<&Arc<UpdateNode<KI, V>>> {
        self.updates
            .entries()
            .map(|(_, entry)| &entry.value)
            .max_by_key(|node| node.stamp())
    }

    fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Arc<UpdateNode<KI, V>>> + '_> {
        let mut clones = FxHashSet::default();
        let nodes = by_age(self.updates.iter(), &FxHashSet::default(), &mut clones);
        Box::new(nodes.into_iter().map(Arc::clone))
    }

    fn identity(&self) -> StructureId {
        self.updates.id()
    }

    fn accept<Vis>(&self, visitor: &Vis, cache: &mut FoldCache<Vis::Output>) -> Vis::Output
    where
        Vis: UpdatesVisitor<KI, V> + ?Sized,
    {
        // left-most chain down to the first cached (or empty) subtree
        let mut chain = Vec::new();
        let mut cursor = &self.updates;
        let mut folded = loop {
            let id = cursor.id();
            if let Some(hit) = cache.get(&id) {
                break hit.clone();
            }
            match cursor.first() {
                None => {
                    let initial = CachedFold::new(
                        visitor.visit_initial_value(),
                        Arc::new(FxHashSet::default()),
                        0,
                    );
                    cache.insert(id, initial.clone());
                    break initial;
                }
                Some((region, entry)) => {
                    chain.push((cursor, region, &entry.value));
                    cursor = &entry.subtree;
                }
            }
        };

        while let Some((tree, region, node)) = chain.pop() {
            folded = fold_level(visitor, tree, (region, node), folded);
            cache.insert(tree.id(), folded.clone());
        }
        folded.result
    }
}

/// Distinct nodes among `occurrences` that are not in `seen`, oldest first
///
/// Addresses of cloned occurrences are added to `clones`.
fn by_age<'a, KI, V>(
    occurrences: impl Iterator<Item = (&'a KI::Region, &'a Node<KI, V>)>,
    seen: &FxHashSet<usize>,
    clones: &mut FxHashSet<usize>,
) -> Vec<&'a Node<KI, V>>
where
    KI: KeyInfo,
    V: SymbolicValue,
{
    let mut listed = FxHashSet::default();
    let mut nodes = Vec::new();
    for (region, node) in occurrences {
        let address = address_of(node);
        if seen.contains(&address) || !listed.insert(address) {
            continue;
        }
        if region != node.region() {
            clones.insert(address);
        }
        nodes.push(node);
    }
    nodes.sort_by_key(|node| node.stamp());
    nodes
}

/// Extend the fold of a level's left-most subtree over the whole level
///
/// The cached prefix is reused only when every other node of the level is
/// newer than all of it; otherwise the level is folded from scratch.
fn fold_level<KI, V, Vis>(
    visitor: &Vis,
    tree: &Tree<KI, V>,
    first: (&KI::Region, &Node<KI, V>),
    below: CachedFold<Vis::Output>,
) -> CachedFold<Vis::Output>
where
    KI: KeyInfo,
    V: SymbolicValue,
    Vis: UpdatesVisitor<KI, V> + ?Sized,
{
    let CachedFold {
        result,
        mut emitted,
        newest,
    } = below;

    let mut clones = FxHashSet::default();
    let rest = by_age(
        std::iter::once(first).chain(tree.iter_after_first()),
        &emitted,
        &mut clones,
    );

    if rest.first().map_or(true, |oldest| oldest.stamp() > newest) {
        if !clones.is_empty() {
            Arc::make_mut(&mut emitted).extend(clones);
        }
        let newest = rest.last().map_or(newest, |node| node.stamp());
        let result = rest
            .into_iter()
            .fold(result, |acc, node| visitor.visit_update(acc, node));
        return CachedFold::new(result, emitted, newest);
    }

    trace!("tree fold: older write beside the left-most subtree, refolding level");
    let mut clones = FxHashSet::default();
    let nodes = by_age(tree.iter(), &FxHashSet::default(), &mut clones);
    let newest = nodes.last().map_or(0, |node| node.stamp());
    let result = nodes
        .into_iter()
        .fold(visitor.visit_initial_value(), |acc, node| {
            visitor.visit_update(acc, node)
        });
    CachedFold::new(result, Arc::new(clones), newest)
}

impl<KI: KeyInfo, V, P: Clone> Clone for TreeUpdates<KI, V, P> {
    fn clone(&self) -> Self {
        Self {
            updates: self.updates.clone(),
            key_info: Arc::clone(&self.key_info),
            policy: self.policy.clone(),
            verify_invariants: self.verify_invariants,
        }
    }
}

impl<KI: KeyInfo, V: fmt::Debug, P: fmt::Debug> fmt::Debug for TreeUpdates<KI, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeUpdates")
            .field("policy", &self.policy)
            .field("updates", &self.updates)
            .finish()
    }
}
