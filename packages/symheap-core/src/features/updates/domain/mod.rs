pub mod adapter;
pub mod key_info;
pub mod mapper;
pub mod policy;
pub mod update_node;

pub use adapter::CopyAdapter;
pub use key_info::KeyInfo;
pub use mapper::{Composition, IdentityMapper, UpdateMapper};
pub use policy::{ConcreteOverwrite, OverwriteMode, OverwritePolicy, RetainAll};
pub use update_node::{PinpointUpdate, RangedUpdate, SymbolicValue, UpdateNode};
