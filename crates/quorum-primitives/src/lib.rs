//! Quorum Settlement Primitives
//!
//! Building blocks shared by every layer of the settlement protocol:
//! - Field arithmetic using Winterfell's BaseElement (64-bit Goldilocks field)
//! - Rescue-Prime digests with a total order (signer hashes, messages, map nodes)
//! - SHA-256 byte hashing for seals and request descriptors
//! - Ed25519 signer keys and message signatures
//! - Protocol constants (batch capacity, threshold, map depth)

pub mod config;
pub mod digest;
pub mod error;
pub mod field;
pub mod hash;
pub mod keys;

pub use config::{
    threshold_met, ProtocolConfig, BATCH_CAPACITY, MAP_DEPTH, MAX_MAP_DEPTH,
    THRESHOLD_DENOMINATOR, THRESHOLD_NUMERATOR,
};
pub use digest::{Digest, DIGEST_ELEMENTS};
pub use error::PrimitivesError;
pub use field::{
    bytes_to_felts, felt_from_u64, felt_to_u64, felts_to_bytes, Felt, FELT_ONE, FELT_ZERO,
};
pub use hash::Hash256;
pub use keys::{sign_message, signer_hash, verify_message, SignerKey};

// Re-exported so downstream crates name the same key/signature types
pub use ed25519_dalek::{Signature, SigningKey};
