//! Runtime choice of history representation

use super::{FlatUpdates, FoldCache, TreeUpdates};
use crate::config::{Representation, UpdatesConfig};
use crate::features::expr::{GuardBuilder, GuardedExpr};
use crate::features::updates::domain::{
    CopyAdapter, KeyInfo, OverwriteMode, SymbolicValue, UpdateMapper, UpdateNode,
};
use crate::features::updates::ports::{CollectionUpdates, UpdatesVisitor};
use crate::shared::identity::StructureId;
use std::sync::Arc;

/// A flat or tree history, picked once per collection
#[derive(Debug)]
pub enum Updates<KI: KeyInfo, V> {
    Flat(FlatUpdates<KI, V>),
    Tree(TreeUpdates<KI, V, OverwriteMode>),
}

impl<KI: KeyInfo, V: SymbolicValue> Updates<KI, V> {
    pub fn flat(key_info: Arc<KI>) -> Self {
        Updates::Flat(FlatUpdates::new(key_info))
    }

    pub fn tree(key_info: Arc<KI>) -> Self {
        Updates::Tree(TreeUpdates::new(key_info))
    }

    /// Empty history shaped by `config`
    pub fn from_config(key_info: Arc<KI>, config: &UpdatesConfig) -> Self {
        match config.representation {
            Representation::Flat => Self::flat(key_info),
            Representation::Tree => Updates::Tree(
                TreeUpdates::with_policy(key_info, config.overwrite)
                    .with_verification(config.verify_invariants),
            ),
        }
    }

    pub fn representation(&self) -> Representation {
        match self {
            Updates::Flat(_) => Representation::Flat,
            Updates::Tree(_) => Representation::Tree,
        }
    }
}

impl<KI: KeyInfo, V: SymbolicValue> CollectionUpdates<KI, V> for Updates<KI, V> {
    type Mapped<KI2: KeyInfo<Guard = KI::Guard>> = Updates<KI2, V>;

    fn key_info(&self) -> &Arc<KI> {
        match self {
            Updates::Flat(flat) => flat.key_info(),
            Updates::Tree(tree) => tree.key_info(),
        }
    }

    fn read(&self, key: &KI::Key) -> Self {
        match self {
            Updates::Flat(flat) => Updates::Flat(flat.read(key)),
            Updates::Tree(tree) => Updates::Tree(tree.read(key)),
        }
    }

    fn write(&self, key: KI::Key, value: V, guard: KI::Guard) -> Self {
        match self {
            Updates::Flat(flat) => Updates::Flat(flat.write(key, value, guard)),
            Updates::Tree(tree) => Updates::Tree(tree.write(key, value, guard)),
        }
    }

    fn copy_range(&self, adapter: Arc<dyn CopyAdapter<KI, V>>, guard: KI::Guard) -> Self {
        match self {
            Updates::Flat(flat) => Updates::Flat(flat.copy_range(adapter, guard)),
            Updates::Tree(tree) => Updates::Tree(tree.copy_range(adapter, guard)),
        }
    }

    fn split(
        &self,
        key: &KI::Key,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Self {
        match self {
            Updates::Flat(flat) => {
                Updates::Flat(flat.split(key, predicate, matching, guard_builder))
            }
            Updates::Tree(tree) => {
                Updates::Tree(tree.split(key, predicate, matching, guard_builder))
            }
        }
    }

    fn filter_map<KI2, M>(&self, mapper: &M, key_info: Arc<KI2>) -> Updates<KI2, V>
    where
        KI2: KeyInfo<Guard = KI::Guard>,
        M: UpdateMapper<KI, KI2, V> + ?Sized,
    {
        match self {
            Updates::Flat(flat) => Updates::Flat(flat.filter_map(mapper, key_info)),
            Updates::Tree(tree) => Updates::Tree(tree.filter_map(mapper, key_info)),
        }
    }

    fn last_updated(&self) -> Option<&Arc<UpdateNode<KI, V>>> {
        match self {
            Updates::Flat(flat) => flat.last_updated(),
            Updates::Tree(tree) => tree.last_updated(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Updates::Flat(flat) => flat.is_empty(),
            Updates::Tree(tree) => tree.is_empty(),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Arc<UpdateNode<KI, V>>> + '_> {
        match self {
            Updates::Flat(flat) => flat.iter(),
            Updates::Tree(tree) => tree.iter(),
        }
    }

    fn identity(&self) -> StructureId {
        match self {
            Updates::Flat(flat) => flat.identity(),
            Updates::Tree(tree) => tree.identity(),
        }
    }

    fn accept<Vis>(&self, visitor: &Vis, cache: &mut FoldCache<Vis::Output>) -> Vis::Output
    where
        Vis: UpdatesVisitor<KI, V> + ?Sized,
    {
        match self {
            Updates::Flat(flat) => flat.accept(visitor, cache),
            Updates::Tree(tree) => tree.accept(visitor, cache),
        }
    }
}

impl<KI: KeyInfo, V> Clone for Updates<KI, V> {
    fn clone(&self) -> Self {
        match self {
            Updates::Flat(flat) => Updates::Flat(flat.clone()),
            Updates::Tree(tree) => Updates::Tree(tree.clone()),
        }
    }
}
