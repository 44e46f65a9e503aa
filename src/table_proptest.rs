#![cfg(test)]

// Property tests for HashTable: state-machine equivalence against
// std::collections::HashMap across random operation sequences.

use crate::{HashTable, KeyNotFound};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Get(usize),
    Pop(usize),
    Contains(String),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            idx.clone().prop_map(OpI::Get),
            idx.prop_map(OpI::Pop),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Invariants checked across random operation sequences:
// - `set` upserts: a following `get` sees the written value.
// - `get`/`pop`/`contains_key` parity with the model, hit and miss.
// - `pop` misses leave the table unchanged.
// - After every op: `load` equals the model's size and
//   `load / capacity <= max_load`.
// - Draining every pool key empties the table.
fn run_scenario<S>(
    mut sut: HashTable<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                sut.set(k.clone(), v);
                model.insert(k.clone(), v);
                prop_assert_eq!(sut.get(&k), Ok(&v));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => prop_assert_eq!(sut.get(k), Ok(v)),
                    None => prop_assert_eq!(sut.get(k), Err(KeyNotFound)),
                }
            }
            OpI::Pop(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(v) => prop_assert_eq!(sut.pop(k), Ok(v)),
                    None => prop_assert_eq!(sut.pop(k), Err(KeyNotFound)),
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
        }

        // Post-conditions after each op.
        prop_assert_eq!(sut.load(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load() as f64 / sut.capacity() as f64 <= sut.max_load());
    }

    // Drain through the table; duplicate pool keys miss on the second pop.
    for k in pool {
        match model.remove(k) {
            Some(v) => prop_assert_eq!(sut.pop(k), Ok(v)),
            None => prop_assert_eq!(sut.pop(k), Err(KeyNotFound)),
        }
    }
    prop_assert!(sut.is_empty());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(HashTable::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress probing: every key
// shares one home slot, the table starts at capacity 1, and the unit
// ceiling lets it fill completely before growing.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = HashTable::with_config_and_hasher(1, 1.0, ConstBuildHasher)
            .expect("config is valid");
        run_scenario(sut, &pool, ops)?;
    }
}
