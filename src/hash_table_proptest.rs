#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can inspect
// chain structure directly.

use crate::entry::Mode;
use crate::error::Error;
use crate::hash_table::HashTable;
use crate::hasher::hash_bytes;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations: indices shrink toward earlier keys/values.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, usize),
    Replace(usize, usize),
    Remove(usize),
    Steal(usize),
    Lookup(usize),
    LookupExtended(usize),
    HasKey(Vec<u8>),
    Resize(usize),
    Cursor,
    Iterate,
}

type Scenario = (Vec<Vec<u8>>, Vec<Vec<u8>>, Vec<Op>);

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    let keys = proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=8);
    let values = proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..4), 1..=4);
    (keys, values).prop_flat_map(|(keys, values)| {
        let ki = 0..keys.len();
        let vi = 0..values.len();
        let op = prop_oneof![
            3 => (ki.clone(), vi.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
            1 => (ki.clone(), vi.clone()).prop_map(|(k, v)| Op::Replace(k, v)),
            2 => ki.clone().prop_map(Op::Remove),
            1 => ki.clone().prop_map(Op::Steal),
            1 => ki.clone().prop_map(Op::Lookup),
            1 => ki.clone().prop_map(Op::LookupExtended),
            1 => proptest::collection::vec(any::<u8>(), 0..6).prop_map(Op::HasKey),
            1 => (1usize..40).prop_map(Op::Resize),
            1 => Just(Op::Cursor),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (keys.clone(), values.clone(), ops))
    })
}

fn arb_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![
        Just(Mode::CopyBoth),
        Just(Mode::CopyKeyBorrowValue),
        Just(Mode::BorrowBoth),
    ]
}

/// Every node sits in the bucket its key hashes to, no key repeats, and the
/// walk count equals `len`.
fn check_structure(t: &HashTable<'_>) -> Result<(), TestCaseError> {
    let mut seen = BTreeSet::new();
    for (i, head) in t.buckets.iter().enumerate() {
        let mut cur = *head;
        while let Some(k) = cur {
            let e = &t.nodes[k];
            prop_assert_eq!(hash_bytes(&e.key, t.bucket_count()), i);
            prop_assert!(seen.insert(e.key.to_vec()), "duplicate key in chains");
            cur = e.next;
        }
    }
    prop_assert_eq!(seen.len(), t.len());
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - insert adds or replaces; replace only succeeds for present keys.
// - remove/steal report NotFound for absent keys and otherwise drop exactly
//   one entry; steal hands back the stored pair.
// - value destructor fires once per notifying release of a borrowed value.
// - resize and growth/shrink never lose or duplicate entries.
// - cursor and borrowing iterator yield exactly the model's key set.
fn run(
    mode: Mode,
    buckets: usize,
    ratio: usize,
    (keys, values, ops): Scenario,
) -> Result<(), TestCaseError> {
    let notified = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&notified);
    let mut sut = HashTable::builder(mode)
        .initial_buckets(buckets)
        .grow_ratio(ratio)
        .value_destructor(move |_| counter.set(counter.get() + 1))
        .build()
        .expect("valid configuration");
    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
    let mut expected_notified = 0usize;
    let borrows_value = !mode.copies_value();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let existed = model.insert(keys[k].clone(), values[v].clone()).is_some();
                prop_assert_eq!(sut.insert(&keys[k], &values[v]), Ok(()));
                if existed && borrows_value {
                    expected_notified += 1;
                }
            }
            Op::Replace(k, v) => {
                let res = sut.replace(&keys[k], &values[v]);
                if let Some(mv) = model.get_mut(&keys[k]) {
                    prop_assert_eq!(res, Ok(()));
                    *mv = values[v].clone();
                } else {
                    prop_assert_eq!(res, Err(Error::NotFound));
                }
            }
            Op::Remove(k) => {
                let res = sut.remove(&keys[k]);
                if model.remove(&keys[k]).is_some() {
                    prop_assert_eq!(res, Ok(()));
                    if borrows_value {
                        expected_notified += 1;
                    }
                } else {
                    prop_assert_eq!(res, Err(Error::NotFound));
                }
            }
            Op::Steal(k) => {
                let res = sut.steal(&keys[k]);
                match model.remove(&keys[k]) {
                    Some(mv) => {
                        let (sk, sv) = res.expect("present key can be stolen");
                        prop_assert_eq!(&*sk, &keys[k][..]);
                        prop_assert_eq!(&*sv, &mv[..]);
                    }
                    None => prop_assert_eq!(res, Err(Error::NotFound)),
                }
            }
            Op::Lookup(k) => {
                prop_assert_eq!(sut.lookup(&keys[k]), model.get(&keys[k]).map(|v| &v[..]));
            }
            Op::LookupExtended(k) => {
                let got = sut.lookup_extended(&keys[k]);
                match model.get(&keys[k]) {
                    Some(mv) => prop_assert_eq!(got, Some((&keys[k][..], &mv[..]))),
                    None => prop_assert!(got.is_none()),
                }
            }
            Op::HasKey(q) => {
                prop_assert_eq!(sut.has_key(&q), model.contains_key(&q));
            }
            Op::Resize(n) => {
                prop_assert_eq!(sut.resize(n), Ok(()));
                prop_assert_eq!(sut.bucket_count(), n);
            }
            Op::Cursor => {
                let mut yielded = Vec::new();
                sut.iter_reset();
                while !sut.iter_is_done() {
                    let k = sut.iter_next();
                    prop_assert!(k.is_some(), "cursor not done but yielded nothing");
                    yielded.extend(k.map(<[u8]>::to_vec));
                }
                let unique: BTreeSet<Vec<u8>> = yielded.iter().cloned().collect();
                prop_assert_eq!(unique.len(), yielded.len(), "cursor repeated a key");
                let m_keys: BTreeSet<Vec<u8>> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
            Op::Iterate => {
                let s_pairs: BTreeSet<(Vec<u8>, Vec<u8>)> =
                    sut.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect();
                let m_pairs: BTreeSet<(Vec<u8>, Vec<u8>)> =
                    model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                prop_assert_eq!(s_pairs, m_pairs);
            }
        }

        // Post-conditions after each op
        prop_assert!(sut.bucket_count() >= 1);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(notified.get(), expected_notified);
        check_structure(&sut)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(mode in arb_mode(), scenario in arb_scenario()) {
        run(mode, 128, 4, scenario)?;
    }

    // Small tables with a ratio of one resize on almost every insert/remove.
    #[test]
    fn prop_state_machine_with_frequent_resize(mode in arb_mode(), scenario in arb_scenario()) {
        run(mode, 2, 1, scenario)?;
    }

    // A single bucket that never grows on its own: until a resize op, every key shares one chain, which
    // stresses length-then-bytes matching and splicing.
    #[test]
    fn prop_state_machine_single_chain(mode in arb_mode(), scenario in arb_scenario()) {
        run(mode, 1, usize::MAX, scenario)?;
    }
}
