//! Reference symbolic vocabulary
//!
//! Integer terms and path conditions with just enough simplification for
//! histories to prune: constant folding, `true`/`false` absorption, double
//! negation, negated comparisons, and `c ∧ ¬c = false`. Anything else stays
//! symbolic and is left to a solver.
//!
//! ```text
//! SymbolicExpr  ::= n | x | e + e | e - e | e * e | ite(φ, e, e) | A[e]
//! PathCondition ::= true | false | e op e | ∧φ | ∨φ | ¬φ
//! ```

use super::guard::{Guard, IteValue};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Terms
// ═══════════════════════════════════════════════════════════════════════════

/// Symbolic integer expression for keys and values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolicExpr {
    /// Concrete value
    Concrete(i64),
    /// Symbolic variable
    Symbol(String),
    /// Addition: e1 + e2
    Add(Box<SymbolicExpr>, Box<SymbolicExpr>),
    /// Subtraction: e1 - e2
    Sub(Box<SymbolicExpr>, Box<SymbolicExpr>),
    /// Multiplication: e1 * e2
    Mul(Box<SymbolicExpr>, Box<SymbolicExpr>),
    /// Conditional: if cond then e1 else e2
    Ite(Box<PathCondition>, Box<SymbolicExpr>, Box<SymbolicExpr>),
    /// Unconstrained content of an input collection at a key
    Select {
        collection: String,
        key: Box<SymbolicExpr>,
    },
}

impl SymbolicExpr {
    pub fn concrete(val: i64) -> Self {
        Self::Concrete(val)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn select(collection: impl Into<String>, key: Self) -> Self {
        Self::Select {
            collection: collection.into(),
            key: Box::new(key),
        }
    }

    pub fn add(self, other: Self) -> Self {
        match (&self, &other) {
            (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a.wrapping_add(*b)),
            (_, Self::Concrete(0)) => self,
            (Self::Concrete(0), _) => other,
            _ => Self::Add(Box::new(self), Box::new(other)),
        }
    }

    pub fn sub(self, other: Self) -> Self {
        match (&self, &other) {
            (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a.wrapping_sub(*b)),
            (_, Self::Concrete(0)) => self,
            _ if self == other => Self::Concrete(0),
            _ => Self::Sub(Box::new(self), Box::new(other)),
        }
    }

    pub fn mul(self, other: Self) -> Self {
        match (&self, &other) {
            (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a.wrapping_mul(*b)),
            (_, Self::Concrete(1)) => self,
            (Self::Concrete(1), _) => other,
            _ => Self::Mul(Box::new(self), Box::new(other)),
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Self::Concrete(_))
    }

    pub fn as_concrete(&self) -> Option<i64> {
        match self {
            Self::Concrete(v) => Some(*v),
            _ => None,
        }
    }

    /// Evaluate under a full assignment of symbols
    ///
    /// `None` when a symbol is unbound or a select is reached.
    pub fn eval(&self, env: &FxHashMap<String, i64>) -> Option<i64> {
        match self {
            Self::Concrete(v) => Some(*v),
            Self::Symbol(name) => env.get(name).copied(),
            Self::Add(a, b) => Some(a.eval(env)?.wrapping_add(b.eval(env)?)),
            Self::Sub(a, b) => Some(a.eval(env)?.wrapping_sub(b.eval(env)?)),
            Self::Mul(a, b) => Some(a.eval(env)?.wrapping_mul(b.eval(env)?)),
            Self::Ite(cond, then, otherwise) => {
                if cond.eval(env)? {
                    then.eval(env)
                } else {
                    otherwise.eval(env)
                }
            }
            Self::Select { .. } => None,
        }
    }
}

impl IteValue<PathCondition> for SymbolicExpr {
    fn ite(guard: &PathCondition, then: Self, otherwise: Self) -> Self {
        if guard.is_true() || then == otherwise {
            then
        } else if guard.is_false() {
            otherwise
        } else {
            Self::Ite(Box::new(guard.clone()), Box::new(then), Box::new(otherwise))
        }
    }
}

impl From<i64> for SymbolicExpr {
    fn from(value: i64) -> Self {
        Self::Concrete(value)
    }
}

impl fmt::Display for SymbolicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(v) => write!(f, "{}", v),
            Self::Symbol(s) => write!(f, "{}", s),
            Self::Add(a, b) => write!(f, "({} + {})", a, b),
            Self::Sub(a, b) => write!(f, "({} - {})", a, b),
            Self::Mul(a, b) => write!(f, "({} * {})", a, b),
            Self::Ite(c, t, e) => write!(f, "ite({}, {}, {})", c, t, e),
            Self::Select { collection, key } => write!(f, "{}[{}]", collection, key),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════════════════════════════════════

/// Path condition for symbolic execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathCondition {
    /// True
    True,
    /// False
    False,
    /// Comparison: e1 op e2
    Compare {
        lhs: SymbolicExpr,
        op: CompareOp,
        rhs: SymbolicExpr,
    },
    /// Logical AND
    And(Vec<PathCondition>),
    /// Logical OR
    Or(Vec<PathCondition>),
    /// Logical NOT
    Not(Box<PathCondition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn negated(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "≠",
            Self::Lt => "<",
            Self::Le => "≤",
            Self::Gt => ">",
            Self::Ge => "≥",
        }
    }
}

impl PathCondition {
    /// Comparison, decided on the spot when both sides allow it
    pub fn compare(lhs: SymbolicExpr, op: CompareOp, rhs: SymbolicExpr) -> Self {
        if let (Some(a), Some(b)) = (lhs.as_concrete(), rhs.as_concrete()) {
            return Self::from_bool(op.holds(a, b));
        }
        if lhs == rhs {
            return Self::from_bool(matches!(op, CompareOp::Eq | CompareOp::Le | CompareOp::Ge));
        }
        Self::Compare { lhs, op, rhs }
    }

    pub fn equal(lhs: SymbolicExpr, rhs: SymbolicExpr) -> Self {
        Self::compare(lhs, CompareOp::Eq, rhs)
    }

    pub fn less_eq(lhs: SymbolicExpr, rhs: SymbolicExpr) -> Self {
        Self::compare(lhs, CompareOp::Le, rhs)
    }

    /// Opaque boolean variable, `b ≠ 0`
    pub fn var(name: impl Into<String>) -> Self {
        Self::compare(SymbolicExpr::symbol(name), CompareOp::Ne, SymbolicExpr::Concrete(0))
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    pub fn and(conditions: Vec<Self>) -> Self {
        let mut flat: Vec<Self> = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let parts = match condition {
                Self::True => continue,
                Self::False => return Self::False,
                Self::And(parts) => parts,
                other => vec![other],
            };
            for part in parts {
                if flat.contains(&part) {
                    continue;
                }
                if flat.iter().any(|existing| is_complement(existing, &part)) {
                    return Self::False;
                }
                flat.push(part);
            }
        }
        match flat.len() {
            0 => Self::True,
            1 => flat.pop().unwrap_or(Self::True),
            _ => Self::And(flat),
        }
    }

    pub fn or(conditions: Vec<Self>) -> Self {
        let mut flat: Vec<Self> = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let parts = match condition {
                Self::False => continue,
                Self::True => return Self::True,
                Self::Or(parts) => parts,
                other => vec![other],
            };
            for part in parts {
                if flat.contains(&part) {
                    continue;
                }
                if flat.iter().any(|existing| is_complement(existing, &part)) {
                    return Self::True;
                }
                flat.push(part);
            }
        }
        match flat.len() {
            0 => Self::False,
            1 => flat.pop().unwrap_or(Self::False),
            _ => Self::Or(flat),
        }
    }

    pub fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            Self::Compare { lhs, op, rhs } => Self::Compare {
                lhs,
                op: op.negated(),
                rhs,
            },
            other => Self::Not(Box::new(other)),
        }
    }

    /// Evaluate under a full assignment of symbols
    pub fn eval(&self, env: &FxHashMap<String, i64>) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Compare { lhs, op, rhs } => Some(op.holds(lhs.eval(env)?, rhs.eval(env)?)),
            Self::And(parts) => {
                let mut result = true;
                for part in parts {
                    result &= part.eval(env)?;
                }
                Some(result)
            }
            Self::Or(parts) => {
                let mut result = false;
                for part in parts {
                    result |= part.eval(env)?;
                }
                Some(result)
            }
            Self::Not(inner) => inner.eval(env).map(|v| !v),
        }
    }
}

fn is_complement(a: &PathCondition, b: &PathCondition) -> bool {
    match (a, b) {
        (PathCondition::Not(inner), other) | (other, PathCondition::Not(inner)) => **inner == *other,
        (
            PathCondition::Compare { lhs, op, rhs },
            PathCondition::Compare {
                lhs: lhs2,
                op: op2,
                rhs: rhs2,
            },
        ) => lhs == lhs2 && rhs == rhs2 && op.negated() == *op2,
        _ => false,
    }
}

impl Guard for PathCondition {
    fn true_expr() -> Self {
        Self::True
    }

    fn false_expr() -> Self {
        Self::False
    }

    fn conjoin(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::True, _) => other.clone(),
            (_, Self::True) => self.clone(),
            _ => Self::and(vec![self.clone(), other.clone()]),
        }
    }

    fn negate(&self) -> Self {
        self.clone().not()
    }

    fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    fn is_false(&self) -> bool {
        matches!(self, Self::False)
    }
}

impl fmt::Display for PathCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, parts: &[PathCondition], sep: &str| {
            write!(f, "(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", part)?;
            }
            write!(f, ")")
        };
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Compare { lhs, op, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Self::And(parts) => join(f, parts, "∧"),
            Self::Or(parts) => join(f, parts, "∨"),
            Self::Not(inner) => write!(f, "¬{}", inner),
        }
    }
}
