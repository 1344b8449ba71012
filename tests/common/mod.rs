//! Shared fixtures for integration tests

#![allow(dead_code)]

use quorum_aggregation::{AggregationPipeline, AggregationOutput, SealedProof, SignatureClaim};
use quorum_primitives::keys::signing_key_from_seed;
use quorum_primitives::{
    sign_message, signer_hash, Digest, ProtocolConfig, SigningKey, MAP_DEPTH,
};
use quorum_state::{AuthenticatedMap, MembershipMap};

/// A committee whose signers are sorted by signer hash
pub struct Committee {
    pub signers: Vec<SigningKey>,
    pub map: MembershipMap,
}

impl Committee {
    pub fn new(label: &str, size: usize) -> Self {
        let mut signers: Vec<SigningKey> = (0..size)
            .map(|i| signing_key_from_seed(format!("{label}/{i}").as_bytes()))
            .collect();
        signers.sort_by_key(|s| signer_hash(&s.verifying_key()));
        let keys: Vec<_> = signers.iter().map(|s| s.verifying_key()).collect();
        let map = MembershipMap::from_keys(MAP_DEPTH, &keys).unwrap();
        Self { signers, map }
    }

    pub fn root(&self) -> Digest {
        self.map.root()
    }

    pub fn size(&self) -> u64 {
        self.signers.len() as u64
    }

    pub fn claim(&self, index: usize, message: &Digest) -> SignatureClaim {
        let key = &self.signers[index];
        SignatureClaim::new(
            key.verifying_key(),
            sign_message(key, message),
            self.map.witness(&key.verifying_key()),
        )
    }

    pub fn claims(&self, indices: impl IntoIterator<Item = usize>, message: &Digest) -> Vec<SignatureClaim> {
        indices.into_iter().map(|i| self.claim(i, message)).collect()
    }

    /// Aggregate the signatures of the first `count` signers
    pub fn approve(&self, message: Digest, count: usize) -> SealedProof<AggregationOutput> {
        let pipeline = AggregationPipeline::new(ProtocolConfig::small_batches()).unwrap();
        pipeline
            .aggregate(message, self.root(), self.claims(0..count, &message))
            .unwrap()
    }
}
