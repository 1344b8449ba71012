//! Rescue-Prime digests
//!
//! All committed values (signer hashes, messages, map nodes) are 4-element
//! digests of Winterfell's `Rp64_256`. Digests are totally ordered
//! lexicographically by canonical element value; this order is what the
//! aggregation protocol means by "greater than".

use std::cmp::Ordering;

use winter_crypto::hashers::Rp64_256;
use winter_crypto::{ElementHasher, Hasher};

use crate::error::PrimitivesError;
use crate::field::{bytes_to_felts, felt_from_u64, felt_to_u64, Felt, FELT_ZERO};

type RpDigest = <Rp64_256 as Hasher>::Digest;

/// Number of field elements in a digest
pub const DIGEST_ELEMENTS: usize = 4;

/// A Rescue-Prime digest: 4 Goldilocks elements (256 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest(pub [Felt; DIGEST_ELEMENTS]);

impl Digest {
    /// The zero digest, used as "no value" (empty leaf, no valid signer)
    pub const ZERO: Digest = Digest([FELT_ZERO; DIGEST_ELEMENTS]);

    pub fn new(elements: [Felt; DIGEST_ELEMENTS]) -> Self {
        Self(elements)
    }

    /// Hash a sequence of field elements
    pub fn hash_elements(elements: &[Felt]) -> Self {
        Self::from_rp(Rp64_256::hash_elements(elements))
    }

    /// Hash raw bytes, injected as u32 limbs
    pub fn hash_bytes(bytes: &[u8]) -> Self {
        Self::hash_elements(&bytes_to_felts(bytes))
    }

    /// 2-to-1 compression for Merkle nodes
    pub fn merge(left: &Digest, right: &Digest) -> Self {
        Self::from_rp(Rp64_256::merge(&[left.to_rp(), right.to_rp()]))
    }

    /// A digest holding a single small value, zero elsewhere
    pub fn from_u64(value: u64) -> Self {
        let mut elements = [FELT_ZERO; DIGEST_ELEMENTS];
        elements[0] = felt_from_u64(value);
        Self(elements)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn elements(&self) -> &[Felt; DIGEST_ELEMENTS] {
        &self.0
    }

    pub fn to_u64s(&self) -> [u64; DIGEST_ELEMENTS] {
        self.0.map(felt_to_u64)
    }

    pub fn from_u64s(values: [u64; DIGEST_ELEMENTS]) -> Self {
        Self(values.map(felt_from_u64))
    }

    /// Canonical 32-byte encoding (little-endian elements)
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, value) in self.to_u64s().iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Parse the canonical encoding, rejecting non-canonical elements
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != 32 {
            return Err(PrimitivesError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut values = [0u64; DIGEST_ELEMENTS];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(chunk);
            let value = u64::from_le_bytes(limb);
            if value >= crate::field::GOLDILOCKS_PRIME {
                return Err(PrimitivesError::NonCanonicalElement(value));
            }
            values[i] = value;
        }
        Ok(Self::from_u64s(values))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Leaf position of this key in a sparse map of the given depth: the
    /// low `depth` bits of the 256-bit little-endian encoding, element 0
    /// lowest. Canonical elements make this injective at depth 256.
    pub fn leaf_index(&self, depth: usize) -> [u64; DIGEST_ELEMENTS] {
        let mut index = self.to_u64s();
        for (i, limb) in index.iter_mut().enumerate() {
            let low = i * 64;
            if depth <= low {
                *limb = 0;
            } else if depth < low + 64 {
                *limb &= (1u64 << (depth - low)) - 1;
            }
        }
        index
    }

    fn to_rp(self) -> RpDigest {
        RpDigest::new(self.0)
    }

    fn from_rp(digest: RpDigest) -> Self {
        let mut elements = [FELT_ZERO; DIGEST_ELEMENTS];
        elements.copy_from_slice(digest.as_elements());
        Self(elements)
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::hash::Hash for Digest {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_u64s().hash(state);
    }
}

impl Ord for Digest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_u64s().cmp(&other.to_u64s())
    }
}

impl PartialOrd for Digest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}…", &self.to_hex()[..16])
    }
}

impl serde::Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
