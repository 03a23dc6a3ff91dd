pub mod region;

pub use region::{Region, RegionComparison};
