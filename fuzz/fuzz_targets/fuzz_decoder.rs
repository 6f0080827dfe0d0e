//! Fuzz testing for the mapped decoder.
//!
//! Decodes arbitrary bytes as a top-level value, walks every child and record
//! it can reach, then lifts the tree into owned form and checks that the
//! re-encoded buffer decodes again. Malformed input must surface as errors,
//! never as panics.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use datamap::{CodecError, Value, ValueRef};

const MAX_DEPTH: usize = 64;

#[derive(Debug, Arbitrary)]
struct DecoderInput {
    data: Vec<u8>,
    /// Index visited first, before the in-order walk.
    random_index: u16,
}

fn walk(node: ValueRef<'_, '_>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    let _ = node.is_nil();
    if node.is_primitive() {
        let _ = node.raw_bytes();
        return;
    }

    for index in 0..node.size() {
        if node.is_array() {
            match node.child_at(index) {
                Ok(child) => walk(child, depth + 1),
                Err(_) => return,
            }
        } else {
            match node.record_at(index) {
                Ok(record) => {
                    walk(record.key(), depth + 1);
                    walk(record.value(), depth + 1);
                    walk(record.scheme(), depth + 1);
                    let _ = record.timestamp();
                }
                Err(_) => return,
            }
        }
    }
}

fuzz_target!(|input: DecoderInput| {
    let Ok(value) = Value::decode_from(&input.data) else {
        return;
    };

    let root = value.as_value_ref();
    if let Err(err) = root.child_at(input.random_index as usize) {
        assert!(err.downcast_ref::<CodecError>().is_some());
    }
    walk(root, 0);

    let Ok(mut owned) = value.copy_construct() else {
        return;
    };
    let Ok((canonical, _)) = owned.encode(false) else {
        return;
    };
    let canonical = canonical.to_vec();
    let again = Value::decode_from(&canonical).expect("encoder output must decode");
    again.copy_construct().expect("encoder output must lift");
});
