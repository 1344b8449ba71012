//! Settlement rules shared by the folding program and the contract

use quorum_primitives::{threshold_met, Digest};
use quorum_state::MapWitness;

use crate::error::{AggregationError, AggregationResult};
use crate::signature_aggregation::AggregationOutput;

/// Outcome of applying a `from -> to` leaf update through a witness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafUpdate {
    /// The witness showed `from` at the root; this is the new root
    Applied(Digest),

    /// The witness shows `to` already at the root
    AlreadyApplied,

    /// The witness matches the root under neither value
    Stale,
}

/// Flip the leaf at `witness.key` from `from` to `to` under `root`
pub fn apply_leaf_update(witness: &MapWitness, root: &Digest, from: u64, to: u64) -> LeafUpdate {
    if witness.compute_root(from) == *root {
        LeafUpdate::Applied(witness.compute_root(to))
    } else if witness.compute_root(to) == *root {
        LeafUpdate::AlreadyApplied
    } else {
        LeafUpdate::Stale
    }
}

/// The aggregation was built against `signers_root` and reaches the threshold
pub fn check_aggregation(
    output: &AggregationOutput,
    signers_root: &Digest,
    signers_count: u64,
    threshold_numerator: u64,
    threshold_denominator: u64,
) -> AggregationResult<()> {
    if output.signers_root != *signers_root {
        return Err(AggregationError::RootMismatch {
            expected: *signers_root,
            actual: output.signers_root,
        });
    }
    if !threshold_met(
        threshold_numerator,
        threshold_denominator,
        output.count,
        signers_count,
    ) {
        return Err(AggregationError::ThresholdNotMet {
            count: output.count,
            signers_count,
            numerator: threshold_numerator,
            denominator: threshold_denominator,
        });
    }
    Ok(())
}

/// Mark `message` settled in the ledger committed to by `ledger_root`
pub fn settle_message(
    witness: &MapWitness,
    message: &Digest,
    ledger_root: &Digest,
) -> AggregationResult<Digest> {
    if witness.key != *message {
        return Err(AggregationError::MessageMismatch {
            expected: *message,
            actual: witness.key,
        });
    }
    match apply_leaf_update(witness, ledger_root, 0, 1) {
        LeafUpdate::Applied(root) => Ok(root),
        LeafUpdate::AlreadyApplied => Err(AggregationError::AlreadySettled(*message)),
        LeafUpdate::Stale => Err(AggregationError::StaleState(*ledger_root)),
    }
}
