//! Fuzz target for map witnesses
//!
//! This target ensures:
//! 1. Root recomputation never panics for any key, path length or value
//! 2. Leaf updates through a witness are consistent with recomputation

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quorum_aggregation::{apply_leaf_update, LeafUpdate};
use quorum_primitives::Digest;
use quorum_state::MapWitness;

#[derive(Debug, Arbitrary)]
struct WitnessInput {
    key: [u64; 4],
    siblings: Vec<[u64; 4]>,
    root: [u64; 4],
    from: u64,
    to: u64,
}

fn digest(values: [u64; 4]) -> Digest {
    Digest::from_u64s(values)
}

fuzz_target!(|input: WitnessInput| {
    if input.siblings.len() > 256 {
        return;
    }
    let witness = MapWitness {
        key: digest(input.key),
        siblings: input.siblings.into_iter().map(digest).collect(),
    };

    let computed = witness.compute_root(input.from);
    assert_eq!(computed, witness.compute_root(input.from));

    // Checked against its own root the update always applies
    match apply_leaf_update(&witness, &computed, input.from, input.to) {
        LeafUpdate::Applied(root) => assert_eq!(root, witness.compute_root(input.to)),
        other => panic!("update against own root gave {other:?}"),
    }

    let root = digest(input.root);
    if let LeafUpdate::Applied(next) = apply_leaf_update(&witness, &root, input.from, input.to) {
        assert_eq!(root, computed);
        assert_eq!(next, witness.compute_root(input.to));
    }

    if let Ok(json) = serde_json::to_string(&witness) {
        let parsed: MapWitness = serde_json::from_str(&json).expect("parsing our own encoding");
        assert_eq!(parsed, witness);
    }
});
