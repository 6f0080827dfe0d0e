//! # Round Trip
//!
//! Seeded random trees are encoded, mapped back, and compared node by node
//! against the tree that produced them. Also covers the materialization
//! cache, `copy`, and lifting views into owned trees.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use datamap::{
    Constructed, Data, DataArray, MappedComposite, OwnedRecord, Primitive, Record, RecordList,
    Value, ValueRef,
};

const SEEDS: u64 = 200;
const MAX_DEPTH: u32 = 3;
const MAX_CHILDREN: usize = 4;

fn random_bytes(rng: &mut StdRng, max: usize) -> Vec<u8> {
    let len = rng.random_range(0..=max);
    (0..len).map(|_| rng.random()).collect()
}

fn random_leaf(rng: &mut StdRng) -> Constructed {
    // Long enough now and then to need a two-byte length.
    let max = if rng.random_bool(0.1) { 300 } else { 12 };
    Primitive::new(random_bytes(rng, max)).into()
}

fn random_record(rng: &mut StdRng, depth: u32) -> OwnedRecord {
    let mut record = OwnedRecord::new(random_bytes(rng, 16));
    record.set_value(random_value(rng, depth));
    if rng.random_bool(0.5) {
        record.set_scheme(random_bytes(rng, 8));
    }
    if rng.random_bool(0.5) {
        let nanos = rng.random_range(0..u64::MAX / 2);
        record.set_timestamp(Some(UNIX_EPOCH + Duration::from_nanos(nanos)));
    }
    record
}

/// Containers always hold at least one child: an empty container encodes
/// like nil and would map back as a primitive.
fn random_value(rng: &mut StdRng, depth: u32) -> Constructed {
    if depth == 0 {
        return random_leaf(rng);
    }
    match rng.random_range(0..3) {
        0 => random_leaf(rng),
        1 => {
            let count = rng.random_range(1..=MAX_CHILDREN);
            (0..count)
                .map(|_| random_value(rng, depth - 1))
                .collect::<DataArray>()
                .into()
        }
        _ => {
            let count = rng.random_range(1..=MAX_CHILDREN);
            (0..count)
                .map(|_| random_record(rng, depth - 1))
                .collect::<RecordList>()
                .into()
        }
    }
}

fn assert_equivalent(expected: ValueRef<'_, '_>, actual: ValueRef<'_, '_>, path: &str) {
    if expected.is_nil() {
        assert!(actual.is_nil(), "{path}: expected nil");
        return;
    }
    assert_eq!(expected.variant_name(), actual.variant_name(), "{path}");

    if expected.is_primitive() {
        assert_eq!(expected.raw_bytes(), actual.raw_bytes(), "{path}");
    } else if expected.is_array() {
        assert_eq!(expected.size(), actual.size(), "{path}");
        for i in 0..expected.size() {
            assert_equivalent(
                expected.child_at(i).unwrap(),
                actual.child_at(i).unwrap(),
                &format!("{path}[{i}]"),
            );
        }
    } else {
        assert_eq!(expected.size(), actual.size(), "{path}");
        for i in 0..expected.size() {
            let (e, a) = (expected.record_at(i).unwrap(), actual.record_at(i).unwrap());
            let here = format!("{path}<{i}>");
            assert_equivalent(e.key(), a.key(), &format!("{here}.key"));
            assert_equivalent(e.value(), a.value(), &format!("{here}.value"));
            assert_equivalent(e.scheme(), a.scheme(), &format!("{here}.scheme"));
            assert_eq!(e.timestamp(), a.timestamp(), "{here}.timestamp");
        }
    }
}

fn encoded(value: &mut Constructed) -> Vec<u8> {
    value.encode(false).unwrap().0.to_vec()
}

mod random_trees {
    use super::*;

    #[test]
    fn decode_of_encode_is_structurally_equal() {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tree = random_value(&mut rng, MAX_DEPTH);
            let buf = encoded(&mut tree);

            let view = Value::decode_from(&buf).unwrap();
            assert_equivalent(
                ValueRef::Constructed(&tree),
                view.as_value_ref(),
                &format!("seed {seed}"),
            );
        }
    }

    #[test]
    fn lifted_tree_re_encodes_identically() {
        for seed in 0..SEEDS {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tree = random_value(&mut rng, MAX_DEPTH);
            let buf = encoded(&mut tree);

            let view = MappedComposite::new(&buf).unwrap();
            let mut lifted = view.copy_construct().unwrap();
            assert_eq!(encoded(&mut lifted), buf, "seed {seed}");
        }
    }

    #[test]
    fn mapped_copy_outlives_source_buffer() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut tree = random_value(&mut rng, MAX_DEPTH);
            let copy = {
                let buf = encoded(&mut tree);
                Value::decode_from(&buf).unwrap().copy()
            };
            assert!(copy.is_mapped());
            assert_equivalent(
                ValueRef::Constructed(&tree),
                copy.as_value_ref(),
                &format!("seed {seed}"),
            );
        }
    }

    #[test]
    fn constructed_copy_is_deep() {
        let mut rng = StdRng::seed_from_u64(7);
        let tree = Value::from(random_value(&mut rng, MAX_DEPTH));
        let copy = tree.copy();
        assert!(copy.is_constructed());
        assert_equivalent(tree.as_value_ref(), copy.as_value_ref(), "copy");
    }
}

mod materialization {
    use super::*;

    fn wide_array(n: usize) -> Vec<u8> {
        let mut array: DataArray = (0..n).map(|i| Primitive::new(i.to_be_bytes())).collect();
        array.encode().unwrap().0.to_vec()
    }

    #[test]
    fn child_k_decodes_exactly_prefix() {
        let buf = wide_array(50);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let view = MappedComposite::new(&buf).unwrap();
            let k = rng.random_range(0..50);
            let child = view.child_at(k).unwrap();
            assert_eq!(child.raw_bytes(), Some(&k.to_be_bytes()[..]));
            assert_eq!(view.materialized(), k + 1);

            view.child_at(k).unwrap();
            assert_eq!(view.materialized(), k + 1);
        }
    }

    #[test]
    fn earlier_index_after_later_is_a_cache_hit() {
        let buf = wide_array(10);
        let view = MappedComposite::new(&buf).unwrap();
        let late = view.child_at(8).unwrap() as *const MappedComposite;
        let early = view.child_at(3).unwrap() as *const MappedComposite;
        assert_eq!(view.materialized(), 9);
        assert_eq!(view.child_at(8).unwrap() as *const MappedComposite, late);
        assert_eq!(view.child_at(3).unwrap() as *const MappedComposite, early);
    }

    #[test]
    fn sequential_iteration_fills_every_slot() {
        let buf = wide_array(300);
        let view = MappedComposite::new(&buf).unwrap();
        let visited = view.iter_children().map(|c| c.unwrap()).count();
        assert_eq!(visited, 300);
        assert_eq!(view.materialized(), 300);
    }

    #[test]
    fn concurrent_first_access_agrees_on_one_child() {
        let buf = wide_array(64);
        let view = MappedComposite::new(&buf).unwrap();

        let seen: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| view.child_at(63).unwrap() as *const MappedComposite as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(view.materialized(), 64);
    }
}

mod records {
    use super::*;

    #[test]
    fn timestamps_survive_to_the_nanosecond() {
        let ts = SystemTime::now();
        let mut list = RecordList::new();
        list.append(OwnedRecord::new("k").with_timestamp(ts));
        let mut value = Constructed::from(list);
        let buf = encoded(&mut value);

        let view = MappedComposite::new(&buf).unwrap();
        let record = view.iter_records().next().unwrap().unwrap();
        assert_eq!(record.timestamp(), Some(ts));
    }

    #[test]
    fn lifted_record_can_be_edited_and_re_encoded() {
        let mut list = RecordList::new();
        list.append(OwnedRecord::new("k").with_value("old"));
        let buf = encoded(&mut Constructed::from(list));

        let view = MappedComposite::new(&buf).unwrap();
        let mut lifted = view.copy_construct().unwrap();
        lifted
            .as_record_list_mut()
            .unwrap()
            .record_at_mut(0)
            .unwrap()
            .set_value("new");

        let reread = encoded(&mut lifted);
        let view = Value::decode_from(&reread).unwrap();
        let record = view.record_at(0).unwrap();
        assert_eq!(record.value().raw_bytes(), Some(&b"new"[..]));
    }
}
