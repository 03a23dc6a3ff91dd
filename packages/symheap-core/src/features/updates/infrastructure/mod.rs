pub mod flat_updates;
pub mod fold_cache;
pub mod key_infos;
pub mod tree_updates;
pub mod updates;

pub use flat_updates::FlatUpdates;
pub use fold_cache::FoldCache;
pub use key_infos::{HeapRef, HeapRefKeyInfo, IndexKeyInfo};
pub use tree_updates::TreeUpdates;
pub use updates::Updates;
