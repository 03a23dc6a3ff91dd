//! Node mappers for `filter_map`

use super::adapter::CopyAdapter;
use super::key_info::KeyInfo;
use crate::features::expr::ExprComposer;
use std::sync::Arc;

/// Rewrites the parts of an update node, possibly into another key space
///
/// Keys may be dropped (`map_key` / `map_adapter` returning `None`); guards
/// stay in the same boolean theory.
pub trait UpdateMapper<KI: KeyInfo, KI2: KeyInfo<Guard = KI::Guard>, V> {
    fn map_key(&self, key: &KI::Key) -> Option<KI2::Key>;

    fn compose_value(&self, value: &V) -> V;

    fn compose_guard(&self, guard: &KI::Guard) -> KI::Guard;

    fn map_adapter(
        &self,
        adapter: &Arc<dyn CopyAdapter<KI, V>>,
    ) -> Option<Arc<dyn CopyAdapter<KI2, V>>>;
}

/// Same key space, every expression rewritten by a composer
pub struct Composition<'a, K, V, G>(pub &'a dyn ExprComposer<K, V, G>);

impl<'a, K, V, G> Composition<'a, K, V, G> {
    pub fn new(composer: &'a dyn ExprComposer<K, V, G>) -> Self {
        Self(composer)
    }
}

impl<'a, KI, V> UpdateMapper<KI, KI, V> for Composition<'a, KI::Key, V, KI::Guard>
where
    KI: KeyInfo,
{
    fn map_key(&self, key: &KI::Key) -> Option<KI::Key> {
        Some(self.0.compose_key(key))
    }

    fn compose_value(&self, value: &V) -> V {
        self.0.compose_value(value)
    }

    fn compose_guard(&self, guard: &KI::Guard) -> KI::Guard {
        self.0.compose_guard(guard)
    }

    fn map_adapter(
        &self,
        adapter: &Arc<dyn CopyAdapter<KI, V>>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>> {
        Some(
            adapter
                .substitute(self.0)
                .unwrap_or_else(|| Arc::clone(adapter)),
        )
    }
}

/// Leaves every node as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl<KI: KeyInfo, V: Clone> UpdateMapper<KI, KI, V> for IdentityMapper {
    fn map_key(&self, key: &KI::Key) -> Option<KI::Key> {
        Some(key.clone())
    }

    fn compose_value(&self, value: &V) -> V {
        value.clone()
    }

    fn compose_guard(&self, guard: &KI::Guard) -> KI::Guard {
        guard.clone()
    }

    fn map_adapter(
        &self,
        adapter: &Arc<dyn CopyAdapter<KI, V>>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>> {
        Some(Arc::clone(adapter))
    }
}
