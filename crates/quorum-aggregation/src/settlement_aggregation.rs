//! Recursive settlement folding
//!
//! Folds many single-message settlements into one proof of a ledger root
//! transition `initial_ledger_root -> new_ledger_root`. Each step consumes
//! one aggregation proof and a ledger witness for its message, applying the
//! same rules the contract applies to a direct settlement.

use serde::{Deserialize, Serialize};
use tracing::debug;
use winter_math::ToElements;

use quorum_primitives::{felt_from_u64, Digest, Felt, ProtocolConfig};
use quorum_state::MapWitness;

use crate::error::{AggregationError, AggregationResult};
use crate::proof::{Program, Provable};
use crate::signature_aggregation::AggregationOutput;
use crate::transition::{check_aggregation, settle_message};

/// Public output of settlement folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutput {
    pub initial_ledger_root: Digest,
    pub signers_root: Digest,
    pub signers_count: u64,
    pub threshold_numerator: u64,
    pub new_ledger_root: Digest,
}

impl ToElements<Felt> for SettlementOutput {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::with_capacity(14);
        elements.extend_from_slice(self.initial_ledger_root.elements());
        elements.extend_from_slice(self.signers_root.elements());
        elements.push(felt_from_u64(self.signers_count));
        elements.push(felt_from_u64(self.threshold_numerator));
        elements.extend_from_slice(self.new_ledger_root.elements());
        elements
    }
}

/// Base and step programs of settlement folding
#[derive(Debug, Clone, Copy)]
pub struct SettlementFolder {
    config: ProtocolConfig,
}

impl SettlementFolder {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Base: the identity transition at `initial_ledger_root`
    pub fn base<S: Provable<SettlementOutput>>(
        &self,
        initial_ledger_root: Digest,
        signers_root: Digest,
        signers_count: u64,
        threshold_numerator: u64,
    ) -> S {
        S::prove(
            Program::SettlementBase,
            SettlementOutput {
                initial_ledger_root,
                signers_root,
                signers_count,
                threshold_numerator,
                new_ledger_root: initial_ledger_root,
            },
            &[],
        )
    }

    /// Step: settle one more message on top of `prior`
    pub fn step<S, A>(
        &self,
        prior: &S,
        aggregation: &A,
        ledger_witness: &MapWitness,
    ) -> AggregationResult<S>
    where
        S: Provable<SettlementOutput>,
        A: Provable<AggregationOutput>,
    {
        if !prior.program().is_settlement() || !prior.verify() {
            return Err(AggregationError::InvalidProof(
                "prior settlement proof failed verification".to_string(),
            ));
        }
        if !aggregation.program().is_signature_aggregation() || !aggregation.verify() {
            return Err(AggregationError::InvalidProof(
                "aggregation proof failed verification".to_string(),
            ));
        }

        let head = prior.public_output();
        let signed = aggregation.public_output();

        check_aggregation(
            signed,
            &head.signers_root,
            head.signers_count,
            head.threshold_numerator,
            self.config.threshold_denominator,
        )?;
        let new_ledger_root = settle_message(ledger_witness, &signed.message, &head.new_ledger_root)?;

        debug!(
            message = %signed.message,
            count = signed.count,
            new_ledger_root = %new_ledger_root,
            "settlement step"
        );

        Ok(S::prove(
            Program::SettlementStep,
            SettlementOutput {
                new_ledger_root,
                ..*head
            },
            &[prior.commitment(), aggregation.commitment()],
        ))
    }
}
