//! Coordinator-side drivers
//!
//! [`AggregationPipeline`] turns an unordered pile of signer responses into
//! one aggregation proof: drop claims that fail on their own, put the rest
//! in canonical order, cut into batches, evaluate the batches in parallel
//! and fold them in index order. [`SettlementPipeline`] folds a list of
//! aggregation proofs into one settlement proof.

use rayon::prelude::*;
use tracing::{info, info_span, warn};

use quorum_primitives::{Digest, ProtocolConfig};
use quorum_state::{AuthenticatedMap, MapWitness, VerifiedMessageLedger};

use crate::batch::{Batch, BatchOutput};
use crate::claim::SignatureClaim;
use crate::error::{AggregationError, AggregationResult};
use crate::proof::Provable;
use crate::settlement_aggregation::{SettlementFolder, SettlementOutput};
use crate::signature_aggregation::{AggregationOutput, SignatureAggregator};

fn validated(config: ProtocolConfig) -> AggregationResult<ProtocolConfig> {
    config
        .validate()
        .map_err(|e| AggregationError::InvalidConfig(e.to_string()))?;
    Ok(config)
}

/// Drives signature aggregation for one message
#[derive(Debug, Clone, Copy)]
pub struct AggregationPipeline {
    aggregator: SignatureAggregator,
}

impl AggregationPipeline {
    pub fn new(config: ProtocolConfig) -> AggregationResult<Self> {
        Ok(Self {
            aggregator: SignatureAggregator::new(validated(config)?),
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        self.aggregator.config()
    }

    /// Sort by signer hash and keep one claim per signer
    pub fn canonicalize(claims: Vec<SignatureClaim>) -> Vec<SignatureClaim> {
        let mut keyed: Vec<(Digest, SignatureClaim)> =
            claims.into_iter().map(|c| (c.signer_hash(), c)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        keyed.into_iter().map(|(_, claim)| claim).collect()
    }

    /// Cut claims into full batches; always yields at least one batch
    pub fn partition(&self, claims: Vec<SignatureClaim>) -> AggregationResult<Vec<Batch>> {
        let config = self.config();
        if claims.is_empty() {
            return Ok(vec![Batch::padded(
                Vec::new(),
                config.batch_capacity,
                config.map_depth,
            )?]);
        }
        let mut batches = Vec::with_capacity(claims.len().div_ceil(config.batch_capacity));
        let mut claims = claims.into_iter().peekable();
        while claims.peek().is_some() {
            let chunk: Vec<SignatureClaim> = claims.by_ref().take(config.batch_capacity).collect();
            batches.push(Batch::padded(chunk, config.batch_capacity, config.map_depth)?);
        }
        Ok(batches)
    }

    /// Aggregate every usable claim for `message` into one proof
    pub fn aggregate<P: Provable<AggregationOutput>>(
        &self,
        message: Digest,
        signers_root: Digest,
        claims: Vec<SignatureClaim>,
    ) -> AggregationResult<P> {
        let span = info_span!("aggregate", message = %message);
        let _guard = span.enter();

        let received = claims.len();
        let usable: Vec<SignatureClaim> = claims
            .into_par_iter()
            .filter(|claim| match claim.check(&message, &signers_root) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "dropping claim");
                    false
                }
            })
            .collect();
        let ordered = Self::canonicalize(usable);
        let batches = self.partition(ordered)?;

        let outputs: Vec<BatchOutput> = batches
            .par_iter()
            .map(|batch| batch.evaluate(&message, &signers_root))
            .collect();

        let mut outputs = outputs.into_iter();
        let first = outputs.next().unwrap_or_default();
        let mut proof: P = self.aggregator.base_from_output(message, signers_root, first);
        for output in outputs {
            proof = self.aggregator.step_from_output(&proof, output)?;
        }

        info!(
            received,
            batches = batches.len(),
            count = proof.public_output().count,
            "signatures aggregated"
        );
        Ok(proof)
    }
}

/// Drives settlement folding over many aggregation proofs
#[derive(Debug, Clone, Copy)]
pub struct SettlementPipeline {
    folder: SettlementFolder,
}

impl SettlementPipeline {
    pub fn new(config: ProtocolConfig) -> AggregationResult<Self> {
        Ok(Self {
            folder: SettlementFolder::new(validated(config)?),
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        self.folder.config()
    }

    /// Fold `(aggregation, ledger witness)` pairs in order on top of
    /// `initial_ledger_root`
    pub fn fold<S, A>(
        &self,
        initial_ledger_root: Digest,
        signers_root: Digest,
        signers_count: u64,
        steps: &[(A, MapWitness)],
    ) -> AggregationResult<S>
    where
        S: Provable<SettlementOutput>,
        A: Provable<AggregationOutput>,
    {
        let span = info_span!("fold", steps = steps.len());
        let _guard = span.enter();

        let mut proof: S = self.folder.base(
            initial_ledger_root,
            signers_root,
            signers_count,
            self.config().threshold_numerator,
        );
        for (aggregation, witness) in steps {
            proof = self.folder.step(&proof, aggregation, witness)?;
        }

        info!(new_ledger_root = %proof.public_output().new_ledger_root, "settlements folded");
        Ok(proof)
    }

    /// Fold `aggregations` against a local ledger mirror, deriving each
    /// witness from it. The mirror is only updated if every step succeeds.
    pub fn fold_against_ledger<S, A>(
        &self,
        ledger: &mut VerifiedMessageLedger,
        signers_root: Digest,
        signers_count: u64,
        aggregations: &[A],
    ) -> AggregationResult<S>
    where
        S: Provable<SettlementOutput>,
        A: Provable<AggregationOutput>,
    {
        let mut mirror = ledger.clone();
        let mut proof: S = self.folder.base(
            mirror.root(),
            signers_root,
            signers_count,
            self.config().threshold_numerator,
        );
        for aggregation in aggregations {
            let message = aggregation.public_output().message;
            let witness = mirror.witness(&message);
            proof = self.folder.step(&proof, aggregation, &witness)?;
            mirror.mark_settled(&message)?;
        }
        *ledger = mirror;
        Ok(proof)
    }
}
