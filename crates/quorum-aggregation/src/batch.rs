//! Batch signature verifier
//!
//! A batch is exactly `capacity` claims. Evaluation walks the claims in
//! order and counts the leading run of claims that are individually valid
//! and strictly increasing by signer hash. The first failure ends the run;
//! nothing after it is counted.

use serde::{Deserialize, Serialize};

use quorum_primitives::Digest;

use crate::claim::SignatureClaim;
use crate::error::{AggregationError, AggregationResult};

/// Fixed-capacity ordered group of claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    claims: Vec<SignatureClaim>,
}

/// Result of evaluating one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Number of valid positions
    pub count: u64,

    /// Signer hash of the first valid claim (zero if none)
    pub smallest_hash: Digest,

    /// Signer hash of the last valid claim (zero if none)
    pub greatest_hash: Digest,
}

impl Batch {
    /// Wrap exactly `capacity` claims
    pub fn new(claims: Vec<SignatureClaim>, capacity: usize) -> AggregationResult<Self> {
        if claims.len() != capacity {
            return Err(AggregationError::BatchCapacity {
                expected: capacity,
                actual: claims.len(),
            });
        }
        Ok(Self { claims })
    }

    /// Right-pad `claims` with empty claims up to `capacity`
    pub fn padded(
        mut claims: Vec<SignatureClaim>,
        capacity: usize,
        depth: usize,
    ) -> AggregationResult<Self> {
        if claims.len() > capacity {
            return Err(AggregationError::BatchCapacity {
                expected: capacity,
                actual: claims.len(),
            });
        }
        claims.resize_with(capacity, || SignatureClaim::empty(depth));
        Ok(Self { claims })
    }

    pub fn claims(&self) -> &[SignatureClaim] {
        &self.claims
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn evaluate(&self, message: &Digest, membership_root: &Digest) -> BatchOutput {
        evaluate(message, membership_root, &self.claims)
    }
}

/// Count the valid, strictly ascending prefix of `claims`
pub fn evaluate(message: &Digest, membership_root: &Digest, claims: &[SignatureClaim]) -> BatchOutput {
    let mut output = BatchOutput::default();

    for claim in claims {
        let hash = claim.signer_hash();
        let ascending = output.count == 0 || hash > output.greatest_hash;
        if !ascending || !claim.verify(message, membership_root) {
            break;
        }
        if output.count == 0 {
            output.smallest_hash = hash;
        }
        output.greatest_hash = hash;
        output.count += 1;
    }

    output
}
