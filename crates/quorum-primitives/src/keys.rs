//! Signer keys and message signatures
//!
//! Committee members sign the canonical 32-byte encoding of a message
//! digest with Ed25519. A signer is identified inside the protocol by the
//! Rescue digest of its verifying key bytes.

use std::sync::OnceLock;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::digest::Digest;
use crate::error::PrimitivesError;
use crate::hash::Hash256;

/// A committee member's public key
pub type SignerKey = VerifyingKey;

const EMPTY_SIGNER_SEED_DOMAIN: &[u8] = b"QUORUM_EMPTY_SIGNER_V1";

/// Identity of a signer inside the membership map and ordering checks
pub fn signer_hash(key: &SignerKey) -> Digest {
    Digest::hash_bytes(key.as_bytes())
}

/// Sign a message digest
pub fn sign_message(signing_key: &SigningKey, message: &Digest) -> Signature {
    signing_key.sign(&message.to_bytes())
}

/// Check a signature over a message digest
pub fn verify_message(key: &SignerKey, message: &Digest, signature: &Signature) -> bool {
    key.verify(&message.to_bytes(), signature).is_ok()
}

/// The sentinel key used to pad batches.
///
/// Derived from a fixed seed; it is never a committee member and the
/// all-zero signature paired with it never verifies.
pub fn empty_signer_key() -> SignerKey {
    static KEY: OnceLock<SignerKey> = OnceLock::new();
    *KEY.get_or_init(|| {
        let seed = Hash256::sha256(EMPTY_SIGNER_SEED_DOMAIN);
        SigningKey::from_bytes(seed.as_bytes()).verifying_key()
    })
}

/// The all-zero signature carried by padding claims
pub fn empty_signature() -> Signature {
    Signature::from_bytes(&[0u8; 64])
}

/// Deterministic signing key from arbitrary seed material
pub fn signing_key_from_seed(seed: &[u8]) -> SigningKey {
    let digest = Hash256::sha256_with_domain(b"QUORUM_SIGNER_SEED_V1", seed);
    SigningKey::from_bytes(digest.as_bytes())
}

pub fn key_to_hex(key: &SignerKey) -> String {
    hex::encode(key.as_bytes())
}

pub fn key_from_hex(data: &str) -> Result<SignerKey, PrimitivesError> {
    let bytes: [u8; 32] = decode_fixed(data)?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))
}

pub fn signing_key_to_hex(key: &SigningKey) -> String {
    hex::encode(key.to_bytes())
}

pub fn signature_to_hex(signature: &Signature) -> String {
    hex::encode(signature.to_bytes())
}

pub fn signature_from_hex(data: &str) -> Result<Signature, PrimitivesError> {
    let bytes: [u8; 64] = decode_fixed(data)?;
    Ok(Signature::from_bytes(&bytes))
}

fn decode_fixed<const N: usize>(data: &str) -> Result<[u8; N], PrimitivesError> {
    let bytes = hex::decode(data.strip_prefix("0x").unwrap_or(data))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
        expected: N,
        actual: len,
    })
}

/// Serde adapter encoding a verifying key as hex
pub mod serde_signer_key {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &SignerKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key_to_hex(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SignerKey, D::Error> {
        let s = String::deserialize(deserializer)?;
        key_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter encoding a signature as hex
pub mod serde_signature {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sig: &Signature, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&signature_to_hex(sig))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Signature, D::Error> {
        let s = String::deserialize(deserializer)?;
        signature_from_hex(&s).map_err(serde::de::Error::custom)
    }
}
