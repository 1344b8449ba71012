//! Signature claims
//!
//! One committee member's contribution to a batch: their key, their
//! signature over the message and a membership witness for their key.

use serde::{Deserialize, Serialize};

use quorum_primitives::keys::{
    empty_signature, empty_signer_key, serde_signature, serde_signer_key,
};
use quorum_primitives::{signer_hash, verify_message, Digest, Signature, SignerKey};
use quorum_state::MapWitness;

use crate::error::{AggregationError, AggregationResult};

/// A signer's claim to have approved a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureClaim {
    #[serde(with = "serde_signer_key")]
    pub public_key: SignerKey,

    #[serde(with = "serde_signature")]
    pub signature: Signature,

    /// Path for `signer_hash(public_key)` in the membership map
    pub membership_witness: MapWitness,
}

impl SignatureClaim {
    pub fn new(public_key: SignerKey, signature: Signature, membership_witness: MapWitness) -> Self {
        Self {
            public_key,
            signature,
            membership_witness,
        }
    }

    /// The padding claim. Never valid.
    pub fn empty(depth: usize) -> Self {
        Self {
            public_key: empty_signer_key(),
            signature: empty_signature(),
            membership_witness: MapWitness::empty(depth),
        }
    }

    pub fn signer_hash(&self) -> Digest {
        signer_hash(&self.public_key)
    }

    /// Signature verifies over `message` and the witness proves membership
    /// under `membership_root`
    pub fn verify(&self, message: &Digest, membership_root: &Digest) -> bool {
        self.check(message, membership_root).is_ok()
    }

    /// Like [`verify`](Self::verify), reporting the first failed condition
    pub fn check(&self, message: &Digest, membership_root: &Digest) -> AggregationResult<()> {
        let hash = self.signer_hash();
        if !verify_message(&self.public_key, message, &self.signature) {
            return Err(AggregationError::InvalidSignature(hash));
        }
        if self.membership_witness.key != hash
            || self.membership_witness.compute_root(1) != *membership_root
        {
            return Err(AggregationError::NotAMember(hash));
        }
        Ok(())
    }
}
