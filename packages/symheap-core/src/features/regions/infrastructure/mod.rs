pub mod intervals_region;
pub mod region_tree;
pub mod set_region;

pub use intervals_region::IntervalsRegion;
pub use region_tree::{RegionTree, RegionTreeIter, RegionTreeNode};
pub use set_region::SetRegion;
