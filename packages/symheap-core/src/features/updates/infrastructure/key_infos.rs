//! Reference key spaces
//!
//! - `IndexKeyInfo`: integer array indices, indexed by interval unions
//! - `HeapRefKeyInfo`: object references, indexed by finite/cofinite sets

use crate::features::expr::{ExprComposer, PathCondition, SymbolSubstitution, SymbolicExpr};
use crate::features::regions::{IntervalsRegion, SetRegion};
use crate::features::updates::domain::KeyInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Array indices
// ═══════════════════════════════════════════════════════════════════════════

/// Integer indices; a symbolic index may denote any of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexKeyInfo;

impl KeyInfo for IndexKeyInfo {
    type Key = SymbolicExpr;
    type Region = IntervalsRegion;
    type Guard = PathCondition;

    fn eq_symbolic(&self, left: &SymbolicExpr, right: &SymbolicExpr) -> PathCondition {
        PathCondition::equal(left.clone(), right.clone())
    }

    fn eq_concrete(&self, left: &SymbolicExpr, right: &SymbolicExpr) -> bool {
        left == right
    }

    fn cmp_symbolic(&self, left: &SymbolicExpr, right: &SymbolicExpr) -> PathCondition {
        PathCondition::less_eq(left.clone(), right.clone())
    }

    fn cmp_concrete(&self, left: &SymbolicExpr, right: &SymbolicExpr) -> bool {
        left == right
            || matches!(
                (left.as_concrete(), right.as_concrete()),
                (Some(a), Some(b)) if a <= b
            )
    }

    fn key_to_region(&self, key: &SymbolicExpr) -> IntervalsRegion {
        match key.as_concrete() {
            Some(index) => IntervalsRegion::point(index),
            None => IntervalsRegion::universe(),
        }
    }

    fn key_range_region(&self, from: &SymbolicExpr, to: &SymbolicExpr) -> IntervalsRegion {
        match (from.as_concrete(), to.as_concrete()) {
            (Some(lower), Some(upper)) => IntervalsRegion::closed(lower, upper),
            _ => IntervalsRegion::universe(),
        }
    }

    fn top_region(&self) -> IntervalsRegion {
        IntervalsRegion::universe()
    }

    fn bottom_region(&self) -> IntervalsRegion {
        IntervalsRegion::empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Heap references
// ═══════════════════════════════════════════════════════════════════════════

/// Object reference: an allocated address or an input symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeapRef {
    Concrete(u64),
    Symbolic(String),
}

impl HeapRef {
    pub fn symbolic(name: impl Into<String>) -> Self {
        HeapRef::Symbolic(name.into())
    }

    fn as_expr(&self) -> SymbolicExpr {
        match self {
            HeapRef::Concrete(address) => SymbolicExpr::concrete(*address as i64),
            HeapRef::Symbolic(name) => SymbolicExpr::symbol(name.clone()),
        }
    }

    /// Resolve the symbol through `substitution` when it binds it to an
    /// address or another symbol
    pub fn substitute(&self, substitution: &SymbolSubstitution) -> HeapRef {
        let HeapRef::Symbolic(name) = self else {
            return self.clone();
        };
        match substitution.lookup(name) {
            Some(SymbolicExpr::Concrete(address)) if *address >= 0 => {
                HeapRef::Concrete(*address as u64)
            }
            Some(SymbolicExpr::Symbol(other)) => HeapRef::Symbolic(other.clone()),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapRef::Concrete(address) => write!(f, "0x{address:x}"),
            HeapRef::Symbolic(name) => write!(f, "{name}"),
        }
    }
}

/// Object references; unordered, so they never key a ranged copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapRefKeyInfo;

impl KeyInfo for HeapRefKeyInfo {
    type Key = HeapRef;
    type Region = SetRegion<u64>;
    type Guard = PathCondition;

    fn eq_symbolic(&self, left: &HeapRef, right: &HeapRef) -> PathCondition {
        match (left, right) {
            (HeapRef::Concrete(a), HeapRef::Concrete(b)) => PathCondition::from_bool(a == b),
            _ => PathCondition::equal(left.as_expr(), right.as_expr()),
        }
    }

    fn eq_concrete(&self, left: &HeapRef, right: &HeapRef) -> bool {
        left == right
    }

    fn cmp_symbolic(&self, _left: &HeapRef, _right: &HeapRef) -> PathCondition {
        unreachable!("heap references are not ordered")
    }

    fn cmp_concrete(&self, _left: &HeapRef, _right: &HeapRef) -> bool {
        unreachable!("heap references are not ordered")
    }

    fn key_to_region(&self, key: &HeapRef) -> SetRegion<u64> {
        match key {
            HeapRef::Concrete(address) => SetRegion::singleton(*address),
            HeapRef::Symbolic(_) => SetRegion::universe(),
        }
    }

    fn key_range_region(&self, _from: &HeapRef, _to: &HeapRef) -> SetRegion<u64> {
        unreachable!("heap references have no ranges")
    }

    fn top_region(&self) -> SetRegion<u64> {
        SetRegion::universe()
    }

    fn bottom_region(&self) -> SetRegion<u64> {
        SetRegion::empty()
    }
}

impl ExprComposer<HeapRef, SymbolicExpr, PathCondition> for SymbolSubstitution {
    fn compose_key(&self, key: &HeapRef) -> HeapRef {
        key.substitute(self)
    }

    fn compose_value(&self, value: &SymbolicExpr) -> SymbolicExpr {
        self.apply(value)
    }

    fn compose_guard(&self, guard: &PathCondition) -> PathCondition {
        self.apply_condition(guard)
    }
}
