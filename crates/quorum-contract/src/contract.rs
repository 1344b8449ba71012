//! Settlement state machine
//!
//! Holds the authoritative [`ContractState`] and the deployment parameters.
//! Every transition is gated on the caller holding the verifier authority's
//! signing key, checks its preconditions against the current state, builds
//! the successor state off to the side and commits it with one assignment.

use tracing::{info, warn};

use quorum_aggregation::{
    apply_leaf_update, check_aggregation, settle_message, AggregationOutput, LeafUpdate, Provable,
    SettlementOutput,
};
use quorum_primitives::{signer_hash, Digest, ProtocolConfig, SignerKey, SigningKey};
use quorum_state::{MapWitness, SparseMerkleMap};

use crate::error::{ContractError, ContractResult};
use crate::messages::{signer_change_message, SignerChange};
use crate::state::ContractState;

/// The settlement contract
#[derive(Debug, Clone)]
pub struct SettlementContract {
    config: ProtocolConfig,
    state: Option<ContractState>,
}

impl SettlementContract {
    /// Deploy an uninitialized contract with fixed parameters
    pub fn new(config: ProtocolConfig) -> ContractResult<Self> {
        config
            .validate()
            .map_err(|e| ContractError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Current state, if initialized
    pub fn state(&self) -> Option<&ContractState> {
        self.state.as_ref()
    }

    pub fn verifier_authority(&self) -> ContractResult<SignerKey> {
        Ok(self.current()?.verifier_authority)
    }

    pub fn signers_root(&self) -> ContractResult<Digest> {
        Ok(self.current()?.signers_root)
    }

    pub fn signers_count(&self) -> ContractResult<u64> {
        Ok(self.current()?.signers_count)
    }

    pub fn ledger_root(&self) -> ContractResult<Digest> {
        Ok(self.current()?.ledger_root)
    }

    /// One-time setup. The caller becomes the verifier authority.
    ///
    /// An empty committee is refused: a threshold over zero signers would be
    /// met by a proof that counts nobody.
    pub fn initialize(
        &mut self,
        authority: &SigningKey,
        genesis_signers_root: Digest,
        genesis_signers_count: u64,
    ) -> ContractResult<()> {
        if self.state.is_some() {
            warn!("rejected re-initialization");
            return Err(ContractError::AlreadyInitialized);
        }
        if genesis_signers_count == 0 {
            warn!("rejected initialization with an empty committee");
            return Err(ContractError::InvalidConfig(
                "genesis signers count must be at least 1".to_string(),
            ));
        }
        let ledger_root = SparseMerkleMap::empty_root(self.config.map_depth)
            .map_err(|e| ContractError::InvalidConfig(e.to_string()))?;

        self.state = Some(ContractState {
            verifier_authority: authority.verifying_key(),
            signers_root: genesis_signers_root,
            signers_count: genesis_signers_count,
            ledger_root,
        });
        info!(
            signers_root = %genesis_signers_root,
            signers_count = genesis_signers_count,
            "contract initialized"
        );
        Ok(())
    }

    /// Mark one message settled on the strength of one aggregation proof
    pub fn settle<A: Provable<AggregationOutput>>(
        &mut self,
        authority: &SigningKey,
        proof: &A,
        ledger_witness: &MapWitness,
    ) -> ContractResult<Digest> {
        let current = self.authorize(authority)?;
        let signed = self.verified_aggregation(proof, &current)?;

        let ledger_root = settle_message(ledger_witness, &signed.message, &current.ledger_root)
            .map_err(|e| {
                warn!(error = %e, "settle rejected");
                e
            })?;

        self.commit(ContractState {
            ledger_root,
            ..current
        });
        info!(message = %signed.message, count = signed.count, ledger_root = %ledger_root, "message settled");
        Ok(ledger_root)
    }

    /// Apply a folded multi-message ledger transition
    pub fn aggregated_settle<S: Provable<SettlementOutput>>(
        &mut self,
        authority: &SigningKey,
        proof: &S,
    ) -> ContractResult<Digest> {
        let current = self.authorize(authority)?;

        if !proof.program().is_settlement() || !proof.verify() {
            return Err(ContractError::InvalidProof(
                "settlement proof failed verification".to_string(),
            ));
        }
        let folded = proof.public_output();

        if folded.initial_ledger_root != current.ledger_root {
            warn!(
                expected = %current.ledger_root,
                actual = %folded.initial_ledger_root,
                "aggregated settle rejected: stale ledger root"
            );
            return Err(ContractError::StaleState(format!(
                "proof starts at ledger root {}, state is at {}",
                folded.initial_ledger_root, current.ledger_root
            )));
        }
        if folded.signers_root != current.signers_root {
            return Err(ContractError::RootMismatch {
                expected: current.signers_root,
                actual: folded.signers_root,
            });
        }
        if folded.signers_count != current.signers_count {
            return Err(ContractError::StaleState(format!(
                "proof assumes {} signers, state has {}",
                folded.signers_count, current.signers_count
            )));
        }
        if folded.threshold_numerator != self.config.threshold_numerator {
            return Err(ContractError::InvalidProof(format!(
                "proof uses threshold numerator {}, contract requires {}",
                folded.threshold_numerator, self.config.threshold_numerator
            )));
        }

        self.commit(ContractState {
            ledger_root: folded.new_ledger_root,
            ..current
        });
        info!(ledger_root = %folded.new_ledger_root, "folded settlement applied");
        Ok(folded.new_ledger_root)
    }

    /// Add `new_signer` to the committee with the committee's approval
    pub fn add_signer<A: Provable<AggregationOutput>>(
        &mut self,
        authority: &SigningKey,
        proof: &A,
        new_signer: &SignerKey,
        witness: &MapWitness,
    ) -> ContractResult<Digest> {
        self.change_signer(authority, proof, new_signer, witness, SignerChange::Add)
    }

    /// Remove `signer` from the committee with the committee's approval
    pub fn remove_signer<A: Provable<AggregationOutput>>(
        &mut self,
        authority: &SigningKey,
        proof: &A,
        signer: &SignerKey,
        witness: &MapWitness,
    ) -> ContractResult<Digest> {
        self.change_signer(authority, proof, signer, witness, SignerChange::Remove)
    }

    fn change_signer<A: Provable<AggregationOutput>>(
        &mut self,
        authority: &SigningKey,
        proof: &A,
        signer: &SignerKey,
        witness: &MapWitness,
        change: SignerChange,
    ) -> ContractResult<Digest> {
        let current = self.authorize(authority)?;
        let signed = self.verified_aggregation(proof, &current)?;

        let expected = signer_change_message(signer, change);
        if signed.message != expected {
            return Err(ContractError::MessageMismatch {
                expected,
                actual: signed.message,
            });
        }
        let hash = signer_hash(signer);
        if witness.key != hash {
            return Err(ContractError::MessageMismatch {
                expected: hash,
                actual: witness.key,
            });
        }

        let (from, to) = match change {
            SignerChange::Add => (0, 1),
            SignerChange::Remove => (1, 0),
        };
        let signers_root = match apply_leaf_update(witness, &current.signers_root, from, to) {
            LeafUpdate::Applied(root) => root,
            LeafUpdate::AlreadyApplied => {
                return Err(match change {
                    SignerChange::Add => ContractError::AlreadyMember(hash),
                    SignerChange::Remove => ContractError::NotAMember(hash),
                })
            }
            LeafUpdate::Stale => {
                return Err(ContractError::StaleState(format!(
                    "witness does not match signers root {}",
                    current.signers_root
                )))
            }
        };

        self.commit(ContractState {
            signers_root,
            ..current
        });
        info!(signer = %hash, ?change, signers_root = %signers_root, "committee updated");
        Ok(signers_root)
    }

    fn current(&self) -> ContractResult<ContractState> {
        self.state.ok_or(ContractError::NotInitialized)
    }

    /// Snapshot of the state, provided `authority` matches
    fn authorize(&self, authority: &SigningKey) -> ContractResult<ContractState> {
        let current = self.current()?;
        if authority.verifying_key() != current.verifier_authority {
            warn!("rejected transition from unauthorized caller");
            return Err(ContractError::Unauthorized);
        }
        Ok(current)
    }

    fn verified_aggregation<'p, A: Provable<AggregationOutput>>(
        &self,
        proof: &'p A,
        current: &ContractState,
    ) -> ContractResult<&'p AggregationOutput> {
        if !proof.program().is_signature_aggregation() || !proof.verify() {
            return Err(ContractError::InvalidProof(
                "aggregation proof failed verification".to_string(),
            ));
        }
        let signed = proof.public_output();
        check_aggregation(
            signed,
            &current.signers_root,
            current.signers_count,
            self.config.threshold_numerator,
            self.config.threshold_denominator,
        )
        .map_err(|e| {
            warn!(error = %e, "aggregation proof rejected");
            e
        })?;
        Ok(signed)
    }

    fn commit(&mut self, next: ContractState) {
        self.state = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_aggregation::{MockProof, Program, SettlementPipeline};
    use quorum_primitives::keys::signing_key_from_seed;
    use quorum_primitives::MAP_DEPTH;
    use quorum_state::{AuthenticatedMap, MembershipMap, VerifiedMessageLedger};

    struct Harness {
        authority: SigningKey,
        committee: MembershipMap,
        ledger: VerifiedMessageLedger,
        contract: SettlementContract,
    }

    fn harness(members: u32) -> Harness {
        let authority = signing_key_from_seed(b"authority");
        let keys: Vec<SignerKey> = (0..members)
            .map(|i| signing_key_from_seed(&i.to_le_bytes()).verifying_key())
            .collect();
        let committee = MembershipMap::from_keys(MAP_DEPTH, &keys).unwrap();
        let mut contract = SettlementContract::new(ProtocolConfig::default()).unwrap();
        contract
            .initialize(&authority, committee.root(), members as u64)
            .unwrap();
        Harness {
            authority,
            committee,
            ledger: VerifiedMessageLedger::new(MAP_DEPTH).unwrap(),
            contract,
        }
    }

    fn approval(message: Digest, count: u64, signers_root: Digest) -> MockProof<AggregationOutput> {
        MockProof::prove(
            Program::SignatureAggregationStep,
            AggregationOutput {
                count,
                message,
                signers_root,
                greatest_signer_hash: Digest::ZERO,
            },
            &[],
        )
    }

    #[test]
    fn test_uninitialized_contract() {
        let mut contract = SettlementContract::new(ProtocolConfig::default()).unwrap();
        let authority = signing_key_from_seed(b"authority");
        let proof = approval(Digest::ZERO, 1, Digest::ZERO);

        assert_eq!(contract.ledger_root(), Err(ContractError::NotInitialized));
        assert_eq!(
            contract.settle(&authority, &proof, &MapWitness::empty(MAP_DEPTH)),
            Err(ContractError::NotInitialized)
        );
    }

    #[test]
    fn test_initialize_once() {
        let mut h = harness(3);
        let state = *h.contract.state().unwrap();
        assert_eq!(state.ledger_root, SparseMerkleMap::empty_root(MAP_DEPTH).unwrap());
        assert_eq!(state.signers_count, 3);

        let usurper = signing_key_from_seed(b"usurper");
        assert_eq!(
            h.contract.initialize(&usurper, Digest::ZERO, 1),
            Err(ContractError::AlreadyInitialized)
        );
        assert_eq!(h.contract.state(), Some(&state));
    }

    #[test]
    fn test_initialize_rejects_empty_committee() {
        let mut contract = SettlementContract::new(ProtocolConfig::default()).unwrap();
        let authority = signing_key_from_seed(b"authority");

        assert!(matches!(
            contract.initialize(&authority, Digest::ZERO, 0),
            Err(ContractError::InvalidConfig(_))
        ));
        assert_eq!(contract.state(), None);

        // Still deployable afterwards
        contract.initialize(&authority, Digest::ZERO, 1).unwrap();
        assert_eq!(contract.signers_count().unwrap(), 1);
    }

    #[test]
    fn test_settle_then_replay() {
        let mut h = harness(3);
        let message = Digest::hash_bytes(b"eur-usd=1.08");
        let proof = approval(message, 2, h.committee.root());

        let root = h
            .contract
            .settle(&h.authority, &proof, &h.ledger.witness(&message))
            .unwrap();
        assert_eq!(root, h.ledger.mark_settled(&message).unwrap());
        assert_eq!(h.contract.ledger_root().unwrap(), root);

        assert_eq!(
            h.contract
                .settle(&h.authority, &proof, &h.ledger.witness(&message)),
            Err(ContractError::AlreadySettled(message))
        );
    }

    #[test]
    fn test_unauthorized_checked_first() {
        let mut h = harness(3);
        let before = *h.contract.state().unwrap();
        let intruder = signing_key_from_seed(b"intruder");

        // Even an invalid proof reports the authority failure
        let bogus = MockProof::invalid(
            Program::SignatureAggregationBase,
            AggregationOutput {
                count: 0,
                message: Digest::ZERO,
                signers_root: Digest::ZERO,
                greatest_signer_hash: Digest::ZERO,
            },
        );
        assert_eq!(
            h.contract.settle(&intruder, &bogus, &MapWitness::empty(MAP_DEPTH)),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(
            h.contract.add_signer(
                &intruder,
                &bogus,
                &intruder.verifying_key(),
                &MapWitness::empty(MAP_DEPTH)
            ),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(h.contract.state(), Some(&before));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut h = harness(66);
        let message = Digest::hash_bytes(b"boundary");
        let witness = h.ledger.witness(&message);

        assert!(matches!(
            h.contract
                .settle(&h.authority, &approval(message, 43, h.committee.root()), &witness),
            Err(ContractError::ThresholdNotMet { count: 43, signers_count: 66 })
        ));
        assert!(h
            .contract
            .settle(&h.authority, &approval(message, 44, h.committee.root()), &witness)
            .is_ok());
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut h = harness(3);
        let first = Digest::hash_bytes(b"first");
        let second = Digest::hash_bytes(b"second");

        // Both witnesses taken against the same ledger root
        let first_witness = h.ledger.witness(&first);
        let second_witness = h.ledger.witness(&second);

        h.contract
            .settle(&h.authority, &approval(first, 3, h.committee.root()), &first_witness)
            .unwrap();
        let before = *h.contract.state().unwrap();

        let stale = h.contract.settle(
            &h.authority,
            &approval(second, 3, h.committee.root()),
            &second_witness,
        );
        assert!(matches!(stale, Err(ContractError::StaleState(_))));

        let foreign = h.contract.settle(
            &h.authority,
            &approval(second, 3, Digest::hash_bytes(b"other")),
            &second_witness,
        );
        assert!(matches!(foreign, Err(ContractError::RootMismatch { .. })));

        let mismatched = h.contract.settle(
            &h.authority,
            &approval(second, 3, h.committee.root()),
            &first_witness,
        );
        assert!(matches!(mismatched, Err(ContractError::MessageMismatch { .. })));

        assert_eq!(h.contract.state(), Some(&before));
    }

    #[test]
    fn test_invalid_proof_rejected() {
        let mut h = harness(1);
        let message = Digest::hash_bytes(b"invalid");
        let mut proof = approval(message, 1, h.committee.root());
        proof.valid = false;
        assert!(matches!(
            h.contract
                .settle(&h.authority, &proof, &h.ledger.witness(&message)),
            Err(ContractError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_aggregated_settle_matches_sequential() {
        let mut sequential = harness(3);
        let mut folded = harness(3);
        let messages: Vec<Digest> = (0..4u8).map(|i| Digest::hash_bytes(&[i])).collect();

        for message in &messages {
            let witness = sequential.ledger.witness(message);
            sequential
                .contract
                .settle(
                    &sequential.authority,
                    &approval(*message, 2, sequential.committee.root()),
                    &witness,
                )
                .unwrap();
            sequential.ledger.mark_settled(message).unwrap();
        }

        let approvals: Vec<_> = messages
            .iter()
            .map(|m| approval(*m, 2, folded.committee.root()))
            .collect();
        let pipeline = SettlementPipeline::new(ProtocolConfig::default()).unwrap();
        let proof: MockProof<SettlementOutput> = pipeline
            .fold_against_ledger(&mut folded.ledger, folded.committee.root(), 3, &approvals)
            .unwrap();
        folded
            .contract
            .aggregated_settle(&folded.authority, &proof)
            .unwrap();

        assert_eq!(
            folded.contract.ledger_root().unwrap(),
            sequential.contract.ledger_root().unwrap()
        );

        // Replaying the fold against the advanced root is stale
        assert!(matches!(
            folded.contract.aggregated_settle(&folded.authority, &proof),
            Err(ContractError::StaleState(_))
        ));
    }

    #[test]
    fn test_aggregated_settle_checks_committee() {
        let mut h = harness(3);
        let ledger_root = h.contract.ledger_root().unwrap();
        let settled = |signers_root, signers_count, threshold_numerator| {
            MockProof::prove(
                Program::SettlementBase,
                SettlementOutput {
                    initial_ledger_root: ledger_root,
                    signers_root,
                    signers_count,
                    threshold_numerator,
                    new_ledger_root: ledger_root,
                },
                &[],
            )
        };

        let root = h.committee.root();
        assert!(matches!(
            h.contract
                .aggregated_settle(&h.authority, &settled(Digest::ZERO, 3, 6666)),
            Err(ContractError::RootMismatch { .. })
        ));
        assert!(matches!(
            h.contract.aggregated_settle(&h.authority, &settled(root, 2, 6666)),
            Err(ContractError::StaleState(_))
        ));
        assert!(matches!(
            h.contract.aggregated_settle(&h.authority, &settled(root, 3, 1)),
            Err(ContractError::InvalidProof(_))
        ));
        assert!(h
            .contract
            .aggregated_settle(&h.authority, &settled(root, 3, 6666))
            .is_ok());
    }

    #[test]
    fn test_add_and_remove_signer() {
        let mut h = harness(3);
        let candidate = signing_key_from_seed(b"candidate").verifying_key();

        let add = approval(
            signer_change_message(&candidate, SignerChange::Add),
            3,
            h.committee.root(),
        );
        let root = h
            .contract
            .add_signer(&h.authority, &add, &candidate, &h.committee.witness(&candidate))
            .unwrap();
        assert_eq!(root, h.committee.add(&candidate).unwrap());
        assert_eq!(h.contract.signers_count().unwrap(), 3);

        let again = approval(
            signer_change_message(&candidate, SignerChange::Add),
            3,
            h.committee.root(),
        );
        assert_eq!(
            h.contract.add_signer(
                &h.authority,
                &again,
                &candidate,
                &h.committee.witness(&candidate)
            ),
            Err(ContractError::AlreadyMember(signer_hash(&candidate)))
        );

        let remove = approval(
            signer_change_message(&candidate, SignerChange::Remove),
            3,
            h.committee.root(),
        );
        let root = h
            .contract
            .remove_signer(&h.authority, &remove, &candidate, &h.committee.witness(&candidate))
            .unwrap();
        assert_eq!(root, h.committee.remove(&candidate).unwrap());

        let remove_again = approval(
            signer_change_message(&candidate, SignerChange::Remove),
            3,
            h.committee.root(),
        );
        assert_eq!(
            h.contract.remove_signer(
                &h.authority,
                &remove_again,
                &candidate,
                &h.committee.witness(&candidate)
            ),
            Err(ContractError::NotAMember(signer_hash(&candidate)))
        );
    }

    #[test]
    fn test_signer_change_requires_matching_message() {
        let mut h = harness(3);
        let candidate = signing_key_from_seed(b"candidate").verifying_key();

        // Approval of a removal cannot be used to add
        let wrong = approval(
            signer_change_message(&candidate, SignerChange::Remove),
            3,
            h.committee.root(),
        );
        assert!(matches!(
            h.contract.add_signer(
                &h.authority,
                &wrong,
                &candidate,
                &h.committee.witness(&candidate)
            ),
            Err(ContractError::MessageMismatch { .. })
        ));
    }
}
