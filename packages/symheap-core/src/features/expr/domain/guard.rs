//! Guards and guarded values

use std::fmt::Debug;
use std::hash::Hash;

/// Boolean symbolic expression conditioning a write
///
/// `is_true` / `is_false` are static answers: `false` from both means
/// "unknown", never "contradiction".
pub trait Guard: Clone + Debug + PartialEq + Eq + Hash + Send + Sync {
    fn true_expr() -> Self;

    fn false_expr() -> Self;

    fn conjoin(&self, other: &Self) -> Self;

    fn negate(&self) -> Self;

    fn is_true(&self) -> bool;

    fn is_false(&self) -> bool;
}

/// Value that can be selected by a guard
pub trait IteValue<G>: Clone {
    fn ite(guard: &G, then: Self, otherwise: Self) -> Self;
}

/// A value together with the condition under which it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedExpr<V, G> {
    pub expr: V,
    pub guard: G,
}

impl<V, G> GuardedExpr<V, G> {
    pub fn new(expr: V, guard: G) -> Self {
        Self { expr, guard }
    }
}

/// Accumulates "no newer write matched" while a history is split
///
/// Newer writes are visited first. Each visited write pushes the negation
/// of its own inclusion, so `guarded(e)` is `e` plus the proof that every
/// newer write missed the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardBuilder<G> {
    non_matching: G,
}

impl<G: Guard> GuardBuilder<G> {
    pub fn new(initial: G) -> Self {
        Self {
            non_matching: initial,
        }
    }

    pub fn guarded(&self, expr: &G) -> G {
        self.non_matching.conjoin(expr)
    }

    pub fn push(&mut self, expr: &G) {
        self.non_matching = self.guarded(expr);
    }

    pub fn non_matching_guard(&self) -> &G {
        &self.non_matching
    }

    pub fn into_guard(self) -> G {
        self.non_matching
    }

    /// Some newer write definitely covered the key
    pub fn is_false(&self) -> bool {
        self.non_matching.is_false()
    }
}

impl<G: Guard> Default for GuardBuilder<G> {
    fn default() -> Self {
        Self::new(G::true_expr())
    }
}
