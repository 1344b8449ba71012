//! Fuzz target for proof envelope parsing
//!
//! This target ensures:
//! 1. Envelope parsing never panics on arbitrary input
//! 2. Opening and verifying a parsed envelope never panics
//! 3. A verified envelope survives re-encoding unchanged

#![no_main]

use libfuzzer_sys::fuzz_target;
use quorum_aggregation::ProofEnvelope;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(envelope) = ProofEnvelope::from_json(json) else {
        return;
    };
    let Ok(proof) = envelope.open() else {
        return;
    };
    let verified = proof.verify();
    let _ = proof.output_json();

    if verified {
        let encoded = envelope.to_json().expect("re-encoding a parsed envelope");
        let reparsed = ProofEnvelope::from_json(&encoded).expect("parsing our own encoding");
        let reopened = reparsed.open().expect("opening our own encoding");
        assert!(reopened.verify());
        assert_eq!(reopened.program(), proof.program());
    }
});
