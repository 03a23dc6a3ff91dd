pub mod composer;
pub mod guard;
pub mod symbolic_expr;

pub use composer::ExprComposer;
pub use guard::{Guard, GuardBuilder, GuardedExpr, IteValue};
pub use symbolic_expr::{CompareOp, PathCondition, SymbolicExpr};
