//! Recursive signature aggregation
//!
//! Chains batch evaluations for one message into a single proof of the
//! total number of distinct valid signers. The base program seeds the
//! watermark from batch 0; each step verifies the prior proof, evaluates the
//! next batch and requires it to start strictly above the watermark, which
//! is what rules out counting a signer twice across batches.

use serde::{Deserialize, Serialize};
use tracing::debug;
use winter_math::ToElements;

use quorum_primitives::{felt_from_u64, felt_to_u64, Digest, Felt, ProtocolConfig};

use crate::batch::{Batch, BatchOutput};
use crate::error::{AggregationError, AggregationResult};
use crate::proof::{Program, Provable};

/// Public output of signature aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOutput {
    /// Distinct valid signers counted so far
    pub count: u64,

    /// The message being signed
    pub message: Digest,

    /// Membership root the signers were checked against
    pub signers_root: Digest,

    /// Watermark: the greatest signer hash counted so far
    pub greatest_signer_hash: Digest,
}

impl ToElements<Felt> for AggregationOutput {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::with_capacity(13);
        elements.push(felt_from_u64(self.count));
        elements.extend_from_slice(self.message.elements());
        elements.extend_from_slice(self.signers_root.elements());
        elements.extend_from_slice(self.greatest_signer_hash.elements());
        elements
    }
}

impl AggregationOutput {
    /// Rebuild from the field encoding
    pub fn from_elements(elements: &[Felt]) -> AggregationResult<Self> {
        if elements.len() != 13 {
            return Err(AggregationError::DeserializationFailed(format!(
                "aggregation output needs 13 elements, got {}",
                elements.len()
            )));
        }
        let digest = |offset: usize| {
            Digest::new([
                elements[offset],
                elements[offset + 1],
                elements[offset + 2],
                elements[offset + 3],
            ])
        };
        Ok(Self {
            count: felt_to_u64(elements[0]),
            message: digest(1),
            signers_root: digest(5),
            greatest_signer_hash: digest(9),
        })
    }
}

/// Base and step programs of signature aggregation
#[derive(Debug, Clone, Copy)]
pub struct SignatureAggregator {
    config: ProtocolConfig,
}

impl SignatureAggregator {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Base: count batch 0 for `message` against `signers_root`
    pub fn base<P: Provable<AggregationOutput>>(
        &self,
        message: Digest,
        signers_root: Digest,
        batch: &Batch,
    ) -> AggregationResult<P> {
        self.check_capacity(batch)?;
        let output = batch.evaluate(&message, &signers_root);
        Ok(self.base_from_output(message, signers_root, output))
    }

    /// Step: extend `prior` with one more batch
    ///
    /// A batch that counts nobody is accepted and keeps the prior
    /// watermark, so any later batch must still start above every signer
    /// counted so far.
    pub fn step<P: Provable<AggregationOutput>>(
        &self,
        prior: &P,
        batch: &Batch,
    ) -> AggregationResult<P> {
        self.check_capacity(batch)?;
        let head = prior.public_output();
        let output = batch.evaluate(&head.message, &head.signers_root);
        self.step_from_output(prior, output)
    }

    pub(crate) fn base_from_output<P: Provable<AggregationOutput>>(
        &self,
        message: Digest,
        signers_root: Digest,
        output: BatchOutput,
    ) -> P {
        debug!(message = %message, count = output.count, "signature aggregation base");
        P::prove(
            Program::SignatureAggregationBase,
            AggregationOutput {
                count: output.count,
                message,
                signers_root,
                greatest_signer_hash: output.greatest_hash,
            },
            &[],
        )
    }

    pub(crate) fn step_from_output<P: Provable<AggregationOutput>>(
        &self,
        prior: &P,
        output: BatchOutput,
    ) -> AggregationResult<P> {
        if !prior.program().is_signature_aggregation() {
            return Err(AggregationError::InvalidProof(format!(
                "prior proof is a {} proof",
                prior.program()
            )));
        }
        if !prior.verify() {
            return Err(AggregationError::InvalidProof(
                "prior aggregation proof failed verification".to_string(),
            ));
        }

        let head = prior.public_output();

        // An empty batch adds nothing and leaves the watermark in place.
        let greatest_signer_hash = if output.count == 0 {
            head.greatest_signer_hash
        } else {
            if output.smallest_hash <= head.greatest_signer_hash {
                return Err(AggregationError::OrderingViolation {
                    watermark: head.greatest_signer_hash,
                    smallest: output.smallest_hash,
                });
            }
            output.greatest_hash
        };

        let next = AggregationOutput {
            count: head.count.saturating_add(output.count),
            message: head.message,
            signers_root: head.signers_root,
            greatest_signer_hash,
        };
        debug!(message = %next.message, count = next.count, "signature aggregation step");

        Ok(P::prove(
            Program::SignatureAggregationStep,
            next,
            &[prior.commitment()],
        ))
    }

    fn check_capacity(&self, batch: &Batch) -> AggregationResult<()> {
        if batch.len() != self.config.batch_capacity {
            return Err(AggregationError::BatchCapacity {
                expected: self.config.batch_capacity,
                actual: batch.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::SignatureClaim;
    use crate::proof::{MockProof, SealedProof};
    use quorum_primitives::keys::signing_key_from_seed;
    use quorum_primitives::{sign_message, signer_hash, SigningKey};
    use quorum_state::{AuthenticatedMap, MembershipMap};

    const CAPACITY: usize = 4;

    fn committee(n: u32) -> (Vec<SigningKey>, MembershipMap) {
        let mut signers: Vec<SigningKey> = (0..n)
            .map(|i| signing_key_from_seed(format!("agg-{i}").as_bytes()))
            .collect();
        signers.sort_by_key(|s| signer_hash(&s.verifying_key()));
        let keys: Vec<_> = signers.iter().map(|s| s.verifying_key()).collect();
        (signers, MembershipMap::from_keys(32, &keys).unwrap())
    }

    fn batch(
        signers: &[SigningKey],
        committee: &MembershipMap,
        message: &Digest,
    ) -> Batch {
        let claims = signers
            .iter()
            .map(|s| {
                SignatureClaim::new(
                    s.verifying_key(),
                    sign_message(s, message),
                    committee.witness(&s.verifying_key()),
                )
            })
            .collect();
        Batch::padded(claims, CAPACITY, 32).unwrap()
    }

    fn aggregator() -> SignatureAggregator {
        SignatureAggregator::new(ProtocolConfig::default().with_batch_capacity(CAPACITY))
    }

    #[test]
    fn test_two_batches_sum() {
        let (signers, committee) = committee(7);
        let message = Digest::hash_bytes(b"sum");
        let agg = aggregator();

        let b1 = batch(&signers[..4], &committee, &message);
        let b2 = batch(&signers[4..], &committee, &message);

        let base: SealedProof<AggregationOutput> = agg.base(message, committee.root(), &b1).unwrap();
        let step = agg.step(&base, &b2).unwrap();

        let out = step.public_output();
        assert_eq!(out.count, 7);
        assert_eq!(out.greatest_signer_hash, signer_hash(&signers[6].verifying_key()));
        assert!(step.verify());
        assert_eq!(step.premises(), &[base.commitment()]);
    }

    #[test]
    fn test_reversed_batches_rejected() {
        let (signers, committee) = committee(7);
        let message = Digest::hash_bytes(b"reverse");
        let agg = aggregator();

        let low = batch(&signers[..4], &committee, &message);
        let high = batch(&signers[4..], &committee, &message);

        let base: MockProof<AggregationOutput> = agg.base(message, committee.root(), &high).unwrap();
        assert!(matches!(
            agg.step(&base, &low),
            Err(AggregationError::OrderingViolation { .. })
        ));
    }

    #[test]
    fn test_repeated_batch_rejected() {
        let (signers, committee) = committee(3);
        let message = Digest::hash_bytes(b"replay");
        let agg = aggregator();
        let b = batch(&signers, &committee, &message);

        let base: MockProof<AggregationOutput> = agg.base(message, committee.root(), &b).unwrap();
        assert!(agg.step(&base, &b).is_err());
    }

    #[test]
    fn test_empty_step_keeps_watermark() {
        let (signers, committee) = committee(3);
        let message = Digest::hash_bytes(b"empty-step");
        let agg = aggregator();

        let base: MockProof<AggregationOutput> = agg
            .base(message, committee.root(), &batch(&signers, &committee, &message))
            .unwrap();
        let empty = Batch::padded(Vec::new(), CAPACITY, 32).unwrap();
        let step = agg.step(&base, &empty).unwrap();

        assert_eq!(step.public_output().count, 3);
        assert_eq!(
            step.public_output().greatest_signer_hash,
            base.public_output().greatest_signer_hash
        );
    }

    #[test]
    fn test_invalid_prior_rejected() {
        let (signers, committee) = committee(2);
        let message = Digest::hash_bytes(b"invalid-prior");
        let agg = aggregator();
        let b = batch(&signers, &committee, &message);

        let prior = MockProof::invalid(
            Program::SignatureAggregationBase,
            AggregationOutput {
                count: 0,
                message,
                signers_root: committee.root(),
                greatest_signer_hash: Digest::ZERO,
            },
        );
        assert!(matches!(
            agg.step(&prior, &b),
            Err(AggregationError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_wrong_program_rejected() {
        let (signers, committee) = committee(2);
        let message = Digest::hash_bytes(b"wrong-program");
        let prior = MockProof::prove(
            Program::SettlementBase,
            AggregationOutput {
                count: 0,
                message,
                signers_root: committee.root(),
                greatest_signer_hash: Digest::ZERO,
            },
            &[],
        );
        assert!(matches!(
            aggregator().step(&prior, &batch(&signers, &committee, &message)),
            Err(AggregationError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_batch_capacity_checked() {
        let (_, committee) = committee(1);
        let wrong = Batch::padded(Vec::new(), CAPACITY + 1, 32).unwrap();
        let result: AggregationResult<MockProof<AggregationOutput>> =
            aggregator().base(Digest::ZERO, committee.root(), &wrong);
        assert!(matches!(result, Err(AggregationError::BatchCapacity { .. })));
    }

    #[test]
    fn test_output_elements_roundtrip() {
        let output = AggregationOutput {
            count: 12,
            message: Digest::hash_bytes(b"m"),
            signers_root: Digest::hash_bytes(b"r"),
            greatest_signer_hash: Digest::hash_bytes(b"g"),
        };
        let elements = output.to_elements();
        assert_eq!(elements.len(), 13);
        assert_eq!(AggregationOutput::from_elements(&elements).unwrap(), output);
    }
}
