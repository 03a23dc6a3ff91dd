//! Property-based tests for update histories
//!
//! Random write/copy histories are replayed on the flat chain and on region
//! trees under both overwrite policies, then read back under random
//! concrete environments and compared with a plain memory interpreter.

mod common;

use common::*;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use symheap_core::features::updates::ReadFolder;
use symheap_core::{
    CollectionUpdates, FoldCache, IdentityMapper, IndexKeyInfo, OverwriteMode, PathCondition,
    Representation, SymbolicExpr, Updates,
};

fn is_even(value: &SymbolicExpr) -> bool {
    value.as_concrete().map_or(false, |n| n % 2 == 0)
}

// ============================================================================
// Reads agree with the concrete interpreter
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_reads_match_memory_model(ops in ops_strategy(), env in env_strategy()) {
        let memory = model(&ops, &env);
        for config in all_configs() {
            let array = build(&ops, &config);
            for key in read_keys() {
                let expected = model_read(&memory, key.eval(&env));
                let actual = eval(&array.read(&key.expr()), &env);
                prop_assert_eq!(
                    actual, expected,
                    "{:?} read {:?} under {:?}", config.representation, key, env
                );
            }
        }
    }

    #[test]
    fn prop_representations_agree(ops in ops_strategy(), envs in prop::collection::vec(env_strategy(), 1..6)) {
        let arrays: Vec<_> = all_configs().iter().map(|config| build(&ops, config)).collect();
        for key in read_keys() {
            let reads: Vec<_> = arrays.iter().map(|array| array.read(&key.expr())).collect();
            for env in &envs {
                let flat = eval(&reads[0], env);
                for read in &reads[1..] {
                    prop_assert_eq!(eval(read, env), flat);
                }
            }
        }
    }
}

// ============================================================================
// Narrowing and splitting
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    /// Folding the narrowed history equals folding the whole history
    #[test]
    fn prop_narrowing_preserves_value(ops in ops_strategy(), env in env_strategy()) {
        for config in all_configs() {
            let array = build(&ops, &config);
            for key in read_keys() {
                let key = key.expr();
                let whole = array.updates().accept(
                    &ReadFolder::new(&key, SymbolicExpr::concrete(0)),
                    &mut FoldCache::new(),
                );
                let narrowed = array.updates().read(&key).accept(
                    &ReadFolder::new(&key, SymbolicExpr::concrete(0)),
                    &mut FoldCache::new(),
                );
                prop_assert_eq!(eval(&narrowed, &env), eval(&whole, &env));
            }
        }
    }

    /// Pulling matching writes out of a history never changes what a read sees
    #[test]
    fn prop_splitting_read_matches_read(ops in ops_strategy(), env in env_strategy()) {
        for config in all_configs() {
            let array = build(&ops, &config);
            for key in read_keys() {
                let key = key.expr();
                let plain = eval(&array.read(&key), &env);
                let split = eval(&array.splitting_read(&key, &is_even), &env);
                prop_assert_eq!(split, plain);
            }
        }
    }
}

// ============================================================================
// Persistence, mapping, emission
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_older_versions_unchanged(
        ops in ops_strategy(),
        later in ops_strategy(),
        env in env_strategy(),
    ) {
        for config in all_configs() {
            let source = source_array(&config);
            let before = build(&ops, &config);
            let snapshot: Vec<_> = read_keys().iter().map(|k| before.read(&k.expr())).collect();

            let after = later.iter().fold(before.clone(), |array, op| apply(&array, &source, op));
            let _ = after.read(&SymbolicExpr::symbol("i"));

            for (key, old) in read_keys().iter().zip(&snapshot) {
                prop_assert_eq!(&before.read(&key.expr()), old);
            }
            let memory = model(&ops, &env);
            for key in read_keys() {
                prop_assert_eq!(
                    eval(&before.read(&key.expr()), &env),
                    model_read(&memory, key.eval(&env))
                );
            }
        }
    }

    #[test]
    fn prop_identity_filter_map_keeps_reads(ops in ops_strategy(), env in env_strategy()) {
        for config in all_configs() {
            let array = build(&ops, &config);
            let mapped = array.updates().filter_map(&IdentityMapper, Arc::new(IndexKeyInfo));
            // refiling may prune further under concrete overwrite
            let retains = config.representation == Representation::Flat
                || config.overwrite == OverwriteMode::RetainAll;
            if retains {
                prop_assert_eq!(mapped.iter().count(), array.updates().iter().count());
            } else {
                prop_assert!(mapped.iter().count() <= array.updates().iter().count());
            }

            for key in read_keys() {
                let key = key.expr();
                let fold = |updates: &Updates<IndexKeyInfo, SymbolicExpr>| {
                    updates.accept(
                        &ReadFolder::new(&key, SymbolicExpr::concrete(0)),
                        &mut FoldCache::new(),
                    )
                };
                prop_assert_eq!(eval(&fold(&mapped), &env), eval(&fold(array.updates()), &env));
            }
        }
    }

    /// With nothing pruned, every write comes back exactly once
    #[test]
    fn prop_each_update_emitted_once(ops in ops_strategy()) {
        let config = config(Representation::Tree, OverwriteMode::RetainAll);
        let array = build(&ops, &config);
        let emitted: Vec<_> = array.updates().iter().collect();
        let distinct: HashSet<_> = emitted.iter().map(|node| Arc::as_ptr(node) as usize).collect();

        prop_assert_eq!(emitted.len(), ops.len());
        prop_assert_eq!(distinct.len(), ops.len());
    }

    /// A guard-false write is recorded but never observed
    #[test]
    fn prop_false_guard_is_invisible(ops in ops_strategy(), env in env_strategy(), value in 0i64..100) {
        for config in all_configs() {
            let array = build(&ops, &config);
            let written = array.write(SymbolicExpr::symbol("i"), SymbolicExpr::concrete(value), PathCondition::False);
            for key in read_keys() {
                prop_assert_eq!(
                    eval(&written.read(&key.expr()), &env),
                    eval(&array.read(&key.expr()), &env)
                );
            }
        }
    }
}
