//! Symbol substitution
//!
//! Binds symbols to expressions and rebuilds terms through the simplifying
//! constructors, so a guard like `i = 3` becomes `false` once `i := 2`.

use crate::features::expr::domain::{ExprComposer, IteValue, PathCondition, SymbolicExpr};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSubstitution {
    bindings: FxHashMap<String, SymbolicExpr>,
}

impl SymbolSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, expr: SymbolicExpr) -> Self {
        self.bindings.insert(name.into(), expr);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolicExpr> {
        self.bindings.get(name)
    }

    pub fn apply(&self, expr: &SymbolicExpr) -> SymbolicExpr {
        match expr {
            SymbolicExpr::Concrete(_) => expr.clone(),
            SymbolicExpr::Symbol(name) => self
                .bindings
                .get(name)
                .cloned()
                .unwrap_or_else(|| expr.clone()),
            SymbolicExpr::Add(a, b) => self.apply(a).add(self.apply(b)),
            SymbolicExpr::Sub(a, b) => self.apply(a).sub(self.apply(b)),
            SymbolicExpr::Mul(a, b) => self.apply(a).mul(self.apply(b)),
            SymbolicExpr::Ite(cond, then, otherwise) => SymbolicExpr::ite(
                &self.apply_condition(cond),
                self.apply(then),
                self.apply(otherwise),
            ),
            SymbolicExpr::Select { collection, key } => {
                SymbolicExpr::select(collection.clone(), self.apply(key))
            }
        }
    }

    pub fn apply_condition(&self, condition: &PathCondition) -> PathCondition {
        match condition {
            PathCondition::True | PathCondition::False => condition.clone(),
            PathCondition::Compare { lhs, op, rhs } => {
                PathCondition::compare(self.apply(lhs), *op, self.apply(rhs))
            }
            PathCondition::And(parts) => {
                PathCondition::and(parts.iter().map(|p| self.apply_condition(p)).collect())
            }
            PathCondition::Or(parts) => {
                PathCondition::or(parts.iter().map(|p| self.apply_condition(p)).collect())
            }
            PathCondition::Not(inner) => self.apply_condition(inner).not(),
        }
    }
}

impl ExprComposer<SymbolicExpr, SymbolicExpr, PathCondition> for SymbolSubstitution {
    fn compose_key(&self, key: &SymbolicExpr) -> SymbolicExpr {
        self.apply(key)
    }

    fn compose_value(&self, value: &SymbolicExpr) -> SymbolicExpr {
        self.apply(value)
    }

    fn compose_guard(&self, guard: &PathCondition) -> PathCondition {
        self.apply_condition(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expr::domain::Guard;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitution_simplifies() {
        let subst = SymbolSubstitution::new().bind("i", SymbolicExpr::concrete(2));
        let guard = PathCondition::equal(SymbolicExpr::symbol("i"), SymbolicExpr::concrete(3));

        assert!(subst.apply_condition(&guard).is_false());
        assert_eq!(
            subst.apply(&SymbolicExpr::symbol("i").add(SymbolicExpr::concrete(1))),
            SymbolicExpr::Concrete(3)
        );
    }

    #[test]
    fn test_unbound_symbols_survive() {
        let subst = SymbolSubstitution::new().bind("i", SymbolicExpr::concrete(2));
        let j = SymbolicExpr::symbol("j");
        assert_eq!(subst.compose_key(&j), j);
        assert!(subst.lookup("j").is_none());
    }

    #[test]
    fn test_select_key_rewritten() {
        let subst = SymbolSubstitution::new().bind("k", SymbolicExpr::concrete(7));
        let read = SymbolicExpr::select("arr", SymbolicExpr::symbol("k"));
        assert_eq!(subst.apply(&read).to_string(), "arr[7]");
    }
}
