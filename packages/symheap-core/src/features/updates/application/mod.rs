pub mod collection;
pub mod copy_adapter;

pub use collection::{ReadFolder, SymbolicCollection};
pub use copy_adapter::IndexCopyAdapter;
