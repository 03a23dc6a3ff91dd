//! Symbolic expression contract and reference vocabulary
//!
//! Histories never look inside values or guards. They need exactly what
//! `Guard`, `IteValue` and `ExprComposer` offer. `SymbolicExpr` and
//! `PathCondition` are a small vocabulary implementing those traits, used
//! by the reference key infos, the copy adapter and the tests.
//!
//! ## Architecture
//! ```text
//! domain/
//!   guard.rs            Guard, GuardedExpr, GuardBuilder, IteValue
//!   composer.rs         ExprComposer (substitution seam)
//!   symbolic_expr.rs    SymbolicExpr, PathCondition, CompareOp
//! infrastructure/
//!   substitution.rs     SymbolSubstitution
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CompareOp, ExprComposer, Guard, GuardBuilder, GuardedExpr, IteValue, PathCondition,
    SymbolicExpr,
};
pub use infrastructure::SymbolSubstitution;
