//! Feature modules
//!
//! ```text
//! regions  ← key sets + the persistent region tree
//!    ↑
//! expr     ← guard contract + reference symbolic vocabulary
//!    ↑
//! updates  ← update nodes, flat/tree histories, folds, collections
//! ```

pub mod expr;
pub mod regions;
pub mod updates;
