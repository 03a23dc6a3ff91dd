//! Shared fixtures for update-log integration tests
//!
//! Histories are generated as op lists, replayed on every representation,
//! and checked against a concrete interpreter of the same ops.

#![allow(dead_code)]

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use symheap_core::config::{Representation, UpdatesConfig};
use symheap_core::{
    CopyAdapter, IndexCopyAdapter, IndexKeyInfo, OverwriteMode, PathCondition, Preset,
    SymbolicCollection, SymbolicExpr, Updates,
};

pub type Array = SymbolicCollection<IndexKeyInfo, SymbolicExpr>;

/// Concrete indices are drawn from `0..KEYS`; symbols are bound inside it
pub const KEYS: i64 = 5;
pub const SOURCE_KEYS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    At(i64),
    I,
    J,
}

impl Key {
    pub fn expr(self) -> SymbolicExpr {
        match self {
            Key::At(n) => SymbolicExpr::concrete(n),
            Key::I => SymbolicExpr::symbol("i"),
            Key::J => SymbolicExpr::symbol("j"),
        }
    }

    pub fn eval(self, env: &Env) -> i64 {
        match self {
            Key::At(n) => n,
            Key::I => env.i,
            Key::J => env.j,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Always,
    G,
    H,
}

impl Cond {
    pub fn expr(self) -> PathCondition {
        match self {
            Cond::Always => PathCondition::True,
            Cond::G => PathCondition::var("g"),
            Cond::H => PathCondition::var("h"),
        }
    }

    pub fn eval(self, env: &Env) -> bool {
        match self {
            Cond::Always => true,
            Cond::G => env.g,
            Cond::H => env.h,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Op {
    Write {
        key: Key,
        value: i64,
        guard: Cond,
    },
    /// `dst[dst_from ..= dst_from + len] := src[src_from ..]`
    Copy {
        src_from: i64,
        dst_from: i64,
        len: i64,
        guard: Cond,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Env {
    pub i: i64,
    pub j: i64,
    pub g: bool,
    pub h: bool,
}

impl Env {
    pub fn bindings(&self) -> FxHashMap<String, i64> {
        let mut env = FxHashMap::default();
        env.insert("i".to_string(), self.i);
        env.insert("j".to_string(), self.j);
        env.insert("g".to_string(), self.g as i64);
        env.insert("h".to_string(), self.h as i64);
        env
    }
}

// ============================================================================
// Strategies
// ============================================================================

pub fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        3 => (0..KEYS).prop_map(Key::At),
        1 => Just(Key::I),
        1 => Just(Key::J),
    ]
}

pub fn cond_strategy() -> impl Strategy<Value = Cond> {
    prop_oneof![
        2 => Just(Cond::Always),
        1 => Just(Cond::G),
        1 => Just(Cond::H),
    ]
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key_strategy(), 0i64..100, cond_strategy())
            .prop_map(|(key, value, guard)| Op::Write { key, value, guard }),
        1 => (0..SOURCE_KEYS - 2, 0..KEYS, 0i64..3, cond_strategy()).prop_map(
            |(src_from, dst_from, len, guard)| Op::Copy { src_from, dst_from, len, guard }
        ),
    ]
}

pub fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..16)
}

pub fn env_strategy() -> impl Strategy<Value = Env> {
    (0..KEYS, 0..KEYS, any::<bool>(), any::<bool>()).prop_map(|(i, j, g, h)| Env { i, j, g, h })
}

// ============================================================================
// Builders
// ============================================================================

pub fn config(representation: Representation, overwrite: OverwriteMode) -> UpdatesConfig {
    UpdatesConfig::preset(Preset::Balanced)
        .with_representation(representation)
        .with_overwrite(overwrite)
}

/// Flat, tree with concrete overwrite, tree retaining everything
pub fn all_configs() -> Vec<UpdatesConfig> {
    vec![
        config(Representation::Flat, OverwriteMode::Concrete),
        config(Representation::Tree, OverwriteMode::Concrete),
        config(Representation::Tree, OverwriteMode::RetainAll).with_verification(true),
    ]
}

pub fn empty_array(name: &str, config: &UpdatesConfig) -> Array {
    SymbolicCollection::allocated(
        name,
        SymbolicExpr::concrete(0),
        Updates::from_config(Arc::new(IndexKeyInfo), config),
    )
}

/// Source of every copy: even indices hold `1000 + k`, odd ones hold 0
pub fn source_array(config: &UpdatesConfig) -> Array {
    (0..SOURCE_KEYS)
        .filter(|k| k % 2 == 0)
        .fold(empty_array("src", config), |array, k| {
            array.write(
                SymbolicExpr::concrete(k),
                SymbolicExpr::concrete(source_value(k)),
                PathCondition::True,
            )
        })
}

pub fn source_value(k: i64) -> i64 {
    if k % 2 == 0 && (0..SOURCE_KEYS).contains(&k) {
        1000 + k
    } else {
        0
    }
}

pub fn apply(array: &Array, source: &Array, op: &Op) -> Array {
    match *op {
        Op::Write { key, value, guard } => {
            array.write(key.expr(), SymbolicExpr::concrete(value), guard.expr())
        }
        Op::Copy {
            src_from,
            dst_from,
            len,
            guard,
        } => {
            let adapter: Arc<dyn CopyAdapter<IndexKeyInfo, SymbolicExpr>> =
                Arc::new(IndexCopyAdapter::new(
                    source.clone(),
                    SymbolicExpr::concrete(src_from),
                    SymbolicExpr::concrete(dst_from),
                    SymbolicExpr::concrete(dst_from + len),
                ));
            array.copy_range(adapter, guard.expr())
        }
    }
}

pub fn build(ops: &[Op], config: &UpdatesConfig) -> Array {
    let source = source_array(config);
    ops.iter()
        .fold(empty_array("dst", config), |array, op| apply(&array, &source, op))
}

// ============================================================================
// Concrete interpreter
// ============================================================================

pub fn model(ops: &[Op], env: &Env) -> BTreeMap<i64, i64> {
    let mut memory = BTreeMap::new();
    for op in ops {
        match *op {
            Op::Write { key, value, guard } => {
                if guard.eval(env) {
                    memory.insert(key.eval(env), value);
                }
            }
            Op::Copy {
                src_from,
                dst_from,
                len,
                guard,
            } => {
                if guard.eval(env) {
                    for k in dst_from..=dst_from + len {
                        memory.insert(k, source_value(src_from + k - dst_from));
                    }
                }
            }
        }
    }
    memory
}

pub fn model_read(memory: &BTreeMap<i64, i64>, key: i64) -> i64 {
    memory.get(&key).copied().unwrap_or(0)
}

pub fn eval(value: &SymbolicExpr, env: &Env) -> i64 {
    value
        .eval(&env.bindings())
        .unwrap_or_else(|| panic!("{value} does not evaluate under {env:?}"))
}

/// Every key a read may target
pub fn read_keys() -> Vec<Key> {
    (0..KEYS + 3).map(Key::At).chain([Key::I, Key::J]).collect()
}
