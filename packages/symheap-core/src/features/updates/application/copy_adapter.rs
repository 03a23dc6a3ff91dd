//! Array range copy
//!
//! `dst[dst_from ..= dst_to] := src[src_from ..]`, recorded as one ranged
//! write on the destination. Destination key `k` reads the source at
//! `src_from + (k - dst_from)`; nothing is copied eagerly.

use crate::features::expr::{
    ExprComposer, Guard, GuardBuilder, GuardedExpr, IteValue, SymbolicExpr,
};
use crate::features::updates::application::SymbolicCollection;
use crate::features::updates::domain::{CopyAdapter, KeyInfo, SymbolicValue};
use crate::features::updates::ports::CollectionUpdates;
use std::fmt;
use std::sync::Arc;

pub struct IndexCopyAdapter<KI: KeyInfo<Key = SymbolicExpr>, V> {
    src_from: SymbolicExpr,
    dst_from: SymbolicExpr,
    dst_to: SymbolicExpr,
    source: SymbolicCollection<KI, V>,
}

impl<KI, V> IndexCopyAdapter<KI, V>
where
    KI: KeyInfo<Key = SymbolicExpr>,
    V: SymbolicValue + IteValue<KI::Guard>,
{
    pub fn new(
        source: SymbolicCollection<KI, V>,
        src_from: SymbolicExpr,
        dst_from: SymbolicExpr,
        dst_to: SymbolicExpr,
    ) -> Self {
        Self {
            src_from,
            dst_from,
            dst_to,
            source,
        }
    }

    pub fn source(&self) -> &SymbolicCollection<KI, V> {
        &self.source
    }

    /// Source index read for destination index `key`
    pub fn convert(&self, key: &SymbolicExpr) -> SymbolicExpr {
        self.src_from
            .clone()
            .add(key.clone().sub(self.dst_from.clone()))
    }

    fn key_info(&self) -> &Arc<KI> {
        self.source.key_info()
    }

    fn with_source(&self, source: SymbolicCollection<KI, V>) -> Self {
        Self {
            src_from: self.src_from.clone(),
            dst_from: self.dst_from.clone(),
            dst_to: self.dst_to.clone(),
            source,
        }
    }
}

impl<KI, V> CopyAdapter<KI, V> for IndexCopyAdapter<KI, V>
where
    KI: KeyInfo<Key = SymbolicExpr>,
    V: SymbolicValue + IteValue<KI::Guard>,
{
    fn region(&self) -> KI::Region {
        self.key_info().key_range_region(&self.dst_from, &self.dst_to)
    }

    fn includes_concretely(&self, key: &SymbolicExpr) -> bool {
        let key_info = self.key_info();
        key_info.cmp_concrete(&self.dst_from, key) && key_info.cmp_concrete(key, &self.dst_to)
    }

    fn includes_symbolically(&self, key: &SymbolicExpr) -> KI::Guard {
        let key_info = self.key_info();
        key_info
            .cmp_symbolic(&self.dst_from, key)
            .conjoin(&key_info.cmp_symbolic(key, &self.dst_to))
    }

    fn is_included_by(&self, covers: &dyn Fn(&SymbolicExpr) -> bool) -> bool {
        covers(&self.dst_from) && covers(&self.dst_to)
    }

    fn read(&self, key: &SymbolicExpr) -> V {
        self.source.read(&self.convert(key))
    }

    fn split(
        &self,
        key: &SymbolicExpr,
        predicate: &dyn Fn(&V) -> bool,
        matching: &mut Vec<GuardedExpr<V, KI::Guard>>,
        guard_builder: &mut GuardBuilder<KI::Guard>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>> {
        let source = self
            .source
            .split(&self.convert(key), predicate, matching, guard_builder);
        if source.updates().identity() == self.source.updates().identity() {
            return None;
        }
        Some(Arc::new(self.with_source(source)))
    }

    fn substitute(
        &self,
        composer: &dyn ExprComposer<SymbolicExpr, V, KI::Guard>,
    ) -> Option<Arc<dyn CopyAdapter<KI, V>>> {
        let src_from = composer.compose_key(&self.src_from);
        let dst_from = composer.compose_key(&self.dst_from);
        let dst_to = composer.compose_key(&self.dst_to);
        let source = self.source.substitute(composer);

        let unchanged = src_from == self.src_from
            && dst_from == self.dst_from
            && dst_to == self.dst_to
            && source.updates().identity() == self.source.updates().identity();
        if unchanged {
            return None;
        }
        Some(Arc::new(Self {
            src_from,
            dst_from,
            dst_to,
            source,
        }))
    }
}

impl<KI: KeyInfo<Key = SymbolicExpr>, V> fmt::Debug for IndexCopyAdapter<KI, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] from {}[{}..]",
            self.dst_from,
            self.dst_to,
            self.source.name(),
            self.src_from
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expr::PathCondition;
    use crate::features::updates::infrastructure::{IndexKeyInfo, Updates};
    use pretty_assertions::assert_eq;

    type Array = SymbolicCollection<IndexKeyInfo, SymbolicExpr>;

    fn c(n: i64) -> SymbolicExpr {
        SymbolicExpr::concrete(n)
    }

    fn s(name: &str) -> SymbolicExpr {
        SymbolicExpr::symbol(name)
    }

    fn arrays(name: &str) -> Vec<Array> {
        let key_info = Arc::new(IndexKeyInfo);
        vec![
            Array::input(name, Updates::flat(Arc::clone(&key_info))),
            Array::input(name, Updates::tree(key_info)),
        ]
    }

    fn copy(
        source: &Array,
        src_from: i64,
        dst_from: i64,
        dst_to: i64,
    ) -> Arc<dyn CopyAdapter<IndexKeyInfo, SymbolicExpr>> {
        Arc::new(IndexCopyAdapter::new(
            source.clone(),
            c(src_from),
            c(dst_from),
            c(dst_to),
        ))
    }

    #[test]
    fn test_copied_range_reads_through_offset() {
        for (src, dst) in arrays("src").into_iter().zip(arrays("dst")) {
            let src = src.write(c(11), s("x"), PathCondition::True);
            let dst = dst.copy_range(copy(&src, 10, 0, 4), PathCondition::True);

            assert_eq!(dst.read(&c(1)), s("x"));
            assert_eq!(dst.read(&c(2)), SymbolicExpr::select("src", c(12)));
            assert_eq!(dst.read(&c(7)), SymbolicExpr::select("dst", c(7)));
        }
    }

    #[test]
    fn test_later_source_writes_are_not_seen() {
        for (src, dst) in arrays("src").into_iter().zip(arrays("dst")) {
            let dst = dst.copy_range(copy(&src, 0, 0, 3), PathCondition::True);
            let _src = src.write(c(1), s("late"), PathCondition::True);
            assert_eq!(dst.read(&c(1)), SymbolicExpr::select("src", c(1)));
        }
    }

    #[test]
    fn test_point_write_splits_copied_range() {
        for (src, dst) in arrays("src").into_iter().zip(arrays("dst")) {
            let dst = dst
                .copy_range(copy(&src, 1, 1, 2), PathCondition::True)
                .write(c(1), s("b"), PathCondition::True);
            assert_eq!(dst.read(&c(1)), s("b"));
            assert_eq!(dst.read(&c(2)), SymbolicExpr::select("src", c(2)));
        }
    }

    #[test]
    fn test_covering_write_prunes_copy() {
        let key_info = Arc::new(IndexKeyInfo);
        let src = Array::input("src", Updates::tree(Arc::clone(&key_info)));
        let dst = Array::input("dst", Updates::tree(key_info))
            .copy_range(copy(&src, 0, 3, 3), PathCondition::True)
            .write(c(3), s("b"), PathCondition::True);
        assert_eq!(dst.updates().iter().count(), 1);
    }

    #[test]
    fn test_symbolic_bounds_guard_the_read() {
        let src = arrays("src").remove(0);
        let dst = arrays("dst").remove(1);
        let adapter: Arc<dyn CopyAdapter<IndexKeyInfo, SymbolicExpr>> = Arc::new(
            IndexCopyAdapter::new(src, c(0), c(0), s("n")),
        );
        let dst = dst.copy_range(adapter, PathCondition::True);

        let in_range = PathCondition::less_eq(c(2), s("n"));
        let expected = SymbolicExpr::ite(
            &in_range,
            SymbolicExpr::select("src", c(2)),
            SymbolicExpr::select("dst", c(2)),
        );
        assert_eq!(dst.read(&c(2)), expected);
    }

    #[test]
    fn test_splitting_read_reaches_into_source() {
        for (src, dst) in arrays("src").into_iter().zip(arrays("dst")) {
            let src = src.write(s("i"), c(42), PathCondition::True);
            let dst = dst.copy_range(copy(&src, 0, 0, 9), PathCondition::True);

            let mut matching = Vec::new();
            let mut gb = GuardBuilder::default();
            let rest = dst.split(&c(3), &|v| *v == c(42), &mut matching, &mut gb);

            assert_eq!(matching.len(), 1);
            assert_eq!(matching[0].expr, c(42));
            assert_eq!(matching[0].guard, PathCondition::equal(s("i"), c(3)));
            // the copy survives, its source no longer holds the match
            assert_eq!(rest.read(&c(3)), SymbolicExpr::select("src", c(3)));
        }
    }
}
