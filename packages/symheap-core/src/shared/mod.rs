//! Shared module - Common utilities
//!
//! Nothing in here knows about keys, regions or guards.

#[macro_use]
pub mod macros;
pub mod identity;

pub use identity::{structure_id, ByAddress, StructureId};
