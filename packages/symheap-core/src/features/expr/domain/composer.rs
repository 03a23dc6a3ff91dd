//! Substitution seam
//!
//! A composer rewrites the expressions stored in a history, typically by
//! substituting a model or the state of a caller into a callee summary.
//! It must be object-safe: ranged writes hand it through `dyn CopyAdapter`.

pub trait ExprComposer<K, V, G> {
    fn compose_key(&self, key: &K) -> K;

    fn compose_value(&self, value: &V) -> V;

    fn compose_guard(&self, guard: &G) -> G;
}
