/*
 * Symheap Core - persistent update logs for symbolic collections
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Tracing macros, identity handles
 * - config/      : Presets + YAML configuration
 * - features/    : Vertical slices (regions → expr → updates)
 *
 * Every history is immutable. Forking an execution state clones an `Arc`,
 * never the history itself.
 */

#![allow(clippy::type_complexity)] // Generic key/value/guard bundles
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared macros and utilities
#[macro_use]
pub mod shared;

/// Configuration system (presets, YAML)
pub mod config;

/// Feature modules (regions, symbolic vocabulary, update logs)
pub mod features;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, ConfigResult, Preset, Representation, UpdatesConfig};
pub use errors::{Result, SymheapError};

pub use features::expr::{
    CompareOp, Guard, GuardBuilder, GuardedExpr, IteValue, PathCondition, SymbolSubstitution,
    SymbolicExpr,
};
pub use features::regions::{IntervalsRegion, Region, RegionComparison, RegionTree, SetRegion};
pub use features::updates::{
    CollectionUpdates, Composition, ConcreteOverwrite, CopyAdapter, ExprComposer, FlatUpdates,
    FoldCache, HeapRef, HeapRefKeyInfo, IdentityMapper, IndexCopyAdapter, IndexKeyInfo, KeyInfo,
    OverwriteMode, OverwritePolicy, RetainAll, SymbolicCollection, TreeUpdates, UpdateMapper,
    UpdateNode, Updates, UpdatesVisitor,
};
