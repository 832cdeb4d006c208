#![cfg(test)]

// Property tests for ByteMap kept inside the crate so they can call the
// structural invariant checker.

use crate::config::MapConfig;
use crate::{ByteMap, Handle};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, Vec<u8>),
    Delete(usize),
    Get(usize),
    Find(usize),
    Optimize,
    Clear,
    Iterate,
}

// Keys drawn from a tiny alphabet that includes ' ', so digest collisions
// ("a" vs "a ") show up regularly.
fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Op>)> {
    proptest::collection::vec("[ab ]{1,3}", 1..=12).prop_flat_map(|pool| {
        let pool: Vec<Vec<u8>> = pool.into_iter().map(String::into_bytes).collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            6 => (idx.clone(), proptest::collection::vec(any::<u8>(), 0..6))
                .prop_map(|(i, v)| Op::Put(i, v)),
            3 => idx.clone().prop_map(Op::Delete),
            2 => idx.clone().prop_map(Op::Get),
            1 => idx.clone().prop_map(Op::Find),
            1 => Just(Op::Optimize),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap plus
// a Vec modelling insertion order.
// Invariants exercised across random operation sequences:
// - `get` parity with the model; overwrite keeps `len` and moves the key last.
// - `delete` returns the model's value and never changes capacity.
// - Iteration order equals the order model after every step.
// - Handles resolve while their entry lives and never after it is replaced.
// - Chain and order structures agree with each other after every step.
// - Load factor stays under 0.75; capacity never drops below the floor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let cfg = MapConfig::new().with_initial_capacity(1).with_min_capacity(1);
        let mut sut = ByteMap::with_config(cfg).unwrap();
        let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
        let mut order: Vec<Vec<u8>> = Vec::new();
        let mut handles: HashMap<Vec<u8>, Handle> = HashMap::new();
        let mut stale: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let k = &pool[i];
                    let len_before = sut.len();
                    let existed = model.contains_key(k);
                    sut.put(k, &v).unwrap();
                    if existed {
                        prop_assert_eq!(sut.len(), len_before);
                        order.retain(|o| o != k);
                    } else {
                        prop_assert_eq!(sut.len(), len_before + 1);
                    }
                    order.push(k.clone());
                    model.insert(k.clone(), v);
                    if let Some(old) = handles.remove(k) {
                        stale.push(old);
                    }
                }
                Op::Delete(i) => {
                    let k = &pool[i];
                    let cap = sut.capacity();
                    let got = sut.delete(k);
                    let want = model.remove(k);
                    prop_assert_eq!(got.as_deref(), want.as_deref());
                    prop_assert_eq!(sut.capacity(), cap);
                    order.retain(|o| o != k);
                    if let Some(old) = handles.remove(k) {
                        stale.push(old);
                    }
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).map(Vec::as_slice));
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
                }
                Op::Find(i) => {
                    let k = &pool[i];
                    match sut.find(k) {
                        Some(h) => {
                            prop_assert_eq!(h.key(&sut), Some(k.as_slice()));
                            prop_assert_eq!(h.value(&sut), model.get(k).map(Vec::as_slice));
                            if let Some(&prev) = handles.get(k) {
                                prop_assert_eq!(prev, h, "handle must be stable for a live entry");
                            }
                            handles.insert(k.clone(), h);
                        }
                        None => {
                            prop_assert!(!model.contains_key(k));
                        }
                    }
                }
                Op::Optimize => {
                    sut.optimize().unwrap();
                    let cap = sut.capacity();
                    // Fitted: halving again would hit the threshold or the floor.
                    prop_assert!(
                        cap / 2 < sut.min_capacity()
                            || sut.len() as f64 / (cap / 2) as f64 >= 0.75
                    );
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    order.clear();
                    stale.extend(handles.drain().map(|(_, h)| h));
                }
                Op::Iterate => {
                    let pairs: Vec<(Vec<u8>, Vec<u8>)> =
                        sut.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect();
                    let expected: Vec<(Vec<u8>, Vec<u8>)> =
                        order.iter().map(|k| (k.clone(), model[k].clone())).collect();
                    prop_assert_eq!(pairs, expected);
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.load_factor() < 0.75);
            let keys: Vec<&[u8]> = sut.keys().collect();
            let expected: Vec<&[u8]> = order.iter().map(Vec::as_slice).collect();
            prop_assert_eq!(keys, expected);
            for h in &stale {
                prop_assert!(h.value(&sut).is_none(), "stale handle must not resolve");
            }
        }
    }
}

// Property: any sequence of distinct inserts leaves every key retrievable
// with its own value, in insertion order, regardless of how many resizes it
// took to get there.
proptest! {
    #[test]
    fn prop_bulk_insert_retrievable(n in 0usize..400, initial in 1usize..64) {
        let mut m = ByteMap::with_capacity(initial).unwrap();
        for i in 0..n {
            m.put(format!("key-{i}").as_bytes(), format!("value-{i}").as_bytes()).unwrap();
        }
        prop_assert_eq!(m.len(), n);
        if n as f64 / initial as f64 >= 0.75 {
            prop_assert!(m.capacity() > initial);
        }
        for (i, (k, v)) in m.iter().enumerate() {
            let (want_k, want_v) = (format!("key-{i}"), format!("value-{i}"));
            prop_assert_eq!(k, want_k.as_bytes());
            prop_assert_eq!(v, want_v.as_bytes());
        }
        m.assert_invariants();
    }
}
