//! Symbolic collection update logs
//!
//! The history of writes to one symbolic collection, with keys, values and
//! guards that may all be unresolved expressions.
//!
//! ## Architecture
//! ```text
//! domain/
//!   key_info.rs        KeyInfo (key → region, key equality)
//!   update_node.rs     UpdateNode {Pinpoint, Ranged}: inclusion, split, map
//!   adapter.rs         CopyAdapter (ranged-write source seam)
//!   mapper.rs          UpdateMapper, Composition, IdentityMapper
//!   policy.rs          OverwritePolicy (what a new write may prune)
//! ports/
//!   CollectionUpdates, UpdatesVisitor
//! infrastructure/
//!   fold_cache.rs      identity-keyed memo for chronological folds
//!   flat_updates.rs    newest-first cons chain
//!   tree_updates.rs    region-indexed persistent tree
//!   updates.rs         runtime choice between the two
//!   key_infos.rs       IndexKeyInfo, HeapRefKeyInfo
//! application/
//!   collection.rs      SymbolicCollection: read / splitting read / write
//!   copy_adapter.rs    IndexCopyAdapter (array range copy)
//! ```
//!
//! Every operation returns a new history; the receiver stays valid, so a
//! forked execution state costs one `Arc` clone.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{IndexCopyAdapter, ReadFolder, SymbolicCollection};
pub use domain::{
    Composition, ConcreteOverwrite, CopyAdapter, IdentityMapper, KeyInfo, OverwriteMode,
    OverwritePolicy, PinpointUpdate, RangedUpdate, RetainAll, SymbolicValue, UpdateMapper,
    UpdateNode,
};
pub use infrastructure::{
    FlatUpdates, FoldCache, HeapRef, HeapRefKeyInfo, IndexKeyInfo, TreeUpdates, Updates,
};
pub use ports::{CollectionUpdates, UpdatesVisitor};

pub use crate::features::expr::ExprComposer;
