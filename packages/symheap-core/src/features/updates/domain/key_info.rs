//! Per-collection key policy

use crate::features::expr::Guard;
use crate::features::regions::Region;
use std::fmt::Debug;

/// How the keys of one collection relate to each other and to regions
///
/// `*_symbolic` answers build guard expressions; `*_concrete` answers are
/// decided statically and must only say `true` when it holds in every model.
pub trait KeyInfo: Debug + Send + Sync + 'static {
    type Key: Clone + Debug + PartialEq + Send + Sync + 'static;
    type Region: Region + 'static;
    type Guard: Guard + 'static;

    fn eq_symbolic(&self, left: &Self::Key, right: &Self::Key) -> Self::Guard;

    fn eq_concrete(&self, left: &Self::Key, right: &Self::Key) -> bool;

    /// `left ≤ right`
    fn cmp_symbolic(&self, left: &Self::Key, right: &Self::Key) -> Self::Guard;

    /// `left ≤ right` in every model
    fn cmp_concrete(&self, left: &Self::Key, right: &Self::Key) -> bool;

    /// Every concrete key `key` could denote
    fn key_to_region(&self, key: &Self::Key) -> Self::Region;

    /// Every concrete key in `[from, to]`
    fn key_range_region(&self, from: &Self::Key, to: &Self::Key) -> Self::Region;

    fn top_region(&self) -> Self::Region;

    fn bottom_region(&self) -> Self::Region;
}
