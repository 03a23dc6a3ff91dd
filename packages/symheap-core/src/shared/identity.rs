//! Pointer-identity handles
//!
//! Fold caches and cloned-node deduplication need "the same allocation",
//! not "an equal value". `ByAddress` hashes and compares the `Arc` pointer
//! and keeps the allocation alive, so an address can never be recycled
//! while a cache still refers to it.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased identity of a persistent structure version
///
/// `None` stands for every empty structure.
pub type StructureId = Option<ByAddress<dyn Any + Send + Sync>>;

pub fn structure_id<T: Any + Send + Sync>(root: &Option<Arc<T>>) -> StructureId {
    root.as_ref().map(|shared| {
        let erased: Arc<dyn Any + Send + Sync> = Arc::clone(shared) as _;
        ByAddress(erased)
    })
}

/// `Arc` wrapper compared by address
pub struct ByAddress<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> ByAddress<T> {
    pub fn new(value: &Arc<T>) -> Self {
        Self(Arc::clone(value))
    }

    /// Raw address, usable as a key in identity sets
    pub fn addr(&self) -> usize {
        address_of(&self.0)
    }
}

/// Address of the allocation behind an `Arc`, metadata stripped
pub fn address_of<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as *const () as usize
}

impl<T: ?Sized> Clone for ByAddress<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ByAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for ByAddress<T> {}

impl<T: ?Sized> Hash for ByAddress<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for ByAddress<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByAddress({:#x})", self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_equal_values_distinct_identity() {
        let a = Arc::new(String::from("node"));
        let b = Arc::new(String::from("node"));

        assert_eq!(*a, *b);
        assert_ne!(ByAddress::new(&a), ByAddress::new(&b));
        assert_eq!(ByAddress::new(&a), ByAddress::new(&Arc::clone(&a)));
    }

    #[test]
    fn test_structure_id_survives_erasure() {
        let root = Some(Arc::new(vec![1u8, 2, 3]));
        let copy = root.clone();
        assert_eq!(structure_id(&root), structure_id(&copy));
        assert_ne!(structure_id(&root), structure_id(&Some(Arc::new(vec![1u8, 2, 3]))));
        assert_eq!(structure_id::<Vec<u8>>(&None), None);
    }

    #[test]
    fn test_identity_set() {
        let a = Arc::new(7u32);
        let mut seen = FxHashSet::default();
        assert!(seen.insert(ByAddress::new(&a)));
        assert!(!seen.insert(ByAddress::new(&a)));
        assert!(seen.insert(ByAddress::new(&Arc::new(7u32))));
    }
}
