//! Fuzz target for digest hashing and encoding
//!
//! This target ensures:
//! 1. Hashing never panics and is deterministic
//! 2. Byte and hex decoding never panic and accept only canonical encodings
//! 3. Ordering agrees with the element-wise comparison
//! 4. Leaf indices never exceed the map depth

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quorum_primitives::Digest;

#[derive(Debug, Arbitrary)]
enum FuzzInput {
    Hash(Vec<u8>),
    Decode(Vec<u8>),
    Hex(String),
    Compare([u64; 4], [u64; 4]),
    LeafIndex([u64; 4], u16),
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Hash(bytes) => {
            let digest = Digest::hash_bytes(&bytes);
            assert_eq!(digest, Digest::hash_bytes(&bytes));
            let decoded = Digest::from_bytes(&digest.to_bytes()).expect("canonical encoding");
            assert_eq!(decoded, digest);
        }
        FuzzInput::Decode(bytes) => {
            if let Ok(digest) = Digest::from_bytes(&bytes) {
                assert_eq!(digest.to_bytes().as_slice(), bytes.as_slice());
            }
        }
        FuzzInput::Hex(text) => {
            if let Ok(digest) = Digest::from_hex(&text) {
                assert_eq!(Digest::from_hex(&digest.to_hex()).ok(), Some(digest));
            }
        }
        FuzzInput::Compare(a, b) => {
            let (a, b) = (Digest::from_u64s(a), Digest::from_u64s(b));
            assert_eq!(a.cmp(&b), a.to_u64s().cmp(&b.to_u64s()));
        }
        FuzzInput::LeafIndex(values, depth) => {
            let depth = usize::from(depth % 257);
            let digest = Digest::from_u64s(values);
            let index = digest.leaf_index(depth);
            for (i, limb) in index.iter().enumerate() {
                let low = i * 64;
                if depth <= low {
                    assert_eq!(*limb, 0);
                } else if depth < low + 64 {
                    assert!(*limb < (1u64 << (depth - low)));
                }
            }
            if depth == 256 {
                assert_eq!(index, digest.to_u64s());
            }
        }
    }
});
