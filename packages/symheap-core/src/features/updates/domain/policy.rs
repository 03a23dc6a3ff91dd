//! Overwrite policies
//!
//! When a tree history files a new write, every older write it covers is
//! asked whether it is now dead. The policy answers.

use super::key_info::KeyInfo;
use super::update_node::{SymbolicValue, UpdateNode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub trait OverwritePolicy: Clone + Debug + Send + Sync + 'static {
    /// Whether `old` can no longer be observed once `new` is written
    fn is_overwritten<KI: KeyInfo, V: SymbolicValue>(
        &self,
        old: &UpdateNode<KI, V>,
        new: &UpdateNode<KI, V>,
    ) -> bool;
}

/// Prune writes that the new one overwrites in every state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcreteOverwrite;

impl OverwritePolicy for ConcreteOverwrite {
    fn is_overwritten<KI: KeyInfo, V: SymbolicValue>(
        &self,
        old: &UpdateNode<KI, V>,
        new: &UpdateNode<KI, V>,
    ) -> bool {
        old.is_included_by_update_concretely(new)
    }
}

/// Never prune; every write stays visible to folds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetainAll;

impl OverwritePolicy for RetainAll {
    fn is_overwritten<KI: KeyInfo, V: SymbolicValue>(
        &self,
        _old: &UpdateNode<KI, V>,
        _new: &UpdateNode<KI, V>,
    ) -> bool {
        false
    }
}

/// Policy chosen by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteMode {
    #[default]
    Concrete,
    RetainAll,
}

impl OverwritePolicy for OverwriteMode {
    fn is_overwritten<KI: KeyInfo, V: SymbolicValue>(
        &self,
        old: &UpdateNode<KI, V>,
        new: &UpdateNode<KI, V>,
    ) -> bool {
        match self {
            OverwriteMode::Concrete => ConcreteOverwrite.is_overwritten(old, new),
            OverwriteMode::RetainAll => RetainAll.is_overwritten(old, new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expr::{PathCondition, SymbolicExpr};
    use crate::features::updates::infrastructure::IndexKeyInfo;
    use std::sync::Arc;

    fn write(key: i64, guard: PathCondition) -> UpdateNode<IndexKeyInfo, SymbolicExpr> {
        UpdateNode::pinpoint(
            SymbolicExpr::concrete(key),
            SymbolicExpr::concrete(0),
            guard,
            &Arc::new(IndexKeyInfo),
        )
    }

    #[test]
    fn test_concrete_mode_prunes_covered_write() {
        let old = write(1, PathCondition::True);
        let new = write(1, PathCondition::True);
        assert!(OverwriteMode::Concrete.is_overwritten(&old, &new));
        assert!(!OverwriteMode::RetainAll.is_overwritten(&old, &new));
    }

    #[test]
    fn test_guarded_write_does_not_prune() {
        let old = write(1, PathCondition::True);
        let new = write(1, PathCondition::var("g"));
        assert!(!ConcreteOverwrite.is_overwritten(&old, &new));
    }

    #[test]
    fn test_mode_names_in_yaml() {
        let mode: OverwriteMode = serde_yaml::from_str("retain_all").unwrap();
        assert_eq!(mode, OverwriteMode::RetainAll);
        assert_eq!(OverwriteMode::default(), OverwriteMode::Concrete);
    }
}
