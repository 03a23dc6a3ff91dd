//! Regions: abstract sets of concrete keys
//!
//! ## Architecture
//! ```text
//! domain/
//!   region.rs            Region trait, RegionComparison
//! infrastructure/
//!   set_region.rs        finite / cofinite sets
//!   intervals_region.rs  unions of closed i64 intervals
//!   region_tree.rs       persistent tree indexed by disjoint regions
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{Region, RegionComparison};
pub use infrastructure::{IntervalsRegion, RegionTree, RegionTreeIter, RegionTreeNode, SetRegion};
