//! Verifier node
//!
//! Coordinates one verification: signs the request, collects committee
//! signatures, fetches the value itself, aggregates the signatures into one
//! proof and settles it on the contract. It keeps local mirrors of the
//! committee and the ledger so it can build witnesses and hand out ledger
//! witnesses for settled values.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

use quorum_aggregation::{
    AggregationOutput, AggregationPipeline, Provable, SealedProof, SettlementOutput,
    SettlementPipeline, SignatureClaim,
};
use quorum_contract::SettlementContract;
use quorum_primitives::{Digest, ProtocolConfig, SignerKey, SigningKey};
use quorum_state::{AuthenticatedMap, MapWitness, MembershipMap, VerifiedMessageLedger};

use crate::committee::SignatureCollector;
use crate::data_source::DataSource;
use crate::error::{ClientError, Result};
use crate::types::{DataRequest, SignedRequest, SignerResponse};

/// Contract handle shared between the verifier node and other readers
pub type SharedContract = Arc<Mutex<SettlementContract>>;

/// Verifier node settings
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifierNodeConfig {
    /// Parameters the contract was deployed with
    pub protocol: ProtocolConfig,
}

impl VerifierNodeConfig {
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }
}

/// Outcome of one verified request
#[derive(Debug, Clone)]
pub struct Verification {
    pub value: u64,
    pub message: Digest,
    pub proof: SealedProof<AggregationOutput>,
    pub ledger_witness: MapWitness,
}

pub struct VerifierNode<D, C> {
    authority: SigningKey,
    committee: MembershipMap,
    ledger: VerifiedMessageLedger,
    contract: SharedContract,
    source: D,
    collector: C,
    aggregation: AggregationPipeline,
    settlement: SettlementPipeline,
}

impl<D: DataSource, C: SignatureCollector> VerifierNode<D, C> {
    pub fn new(
        config: VerifierNodeConfig,
        authority: SigningKey,
        committee: MembershipMap,
        contract: SharedContract,
        source: D,
        collector: C,
    ) -> Result<Self> {
        let protocol = config.protocol;
        if committee.depth() != protocol.map_depth {
            return Err(ClientError::InvalidConfig(format!(
                "committee map depth {} does not match protocol depth {}",
                committee.depth(),
                protocol.map_depth
            )));
        }
        Ok(Self {
            authority,
            committee,
            ledger: VerifiedMessageLedger::new(protocol.map_depth)?,
            contract,
            source,
            collector,
            aggregation: AggregationPipeline::new(protocol)?,
            settlement: SettlementPipeline::new(protocol)?,
        })
    }

    pub fn authority_key(&self) -> SignerKey {
        self.authority.verifying_key()
    }

    pub fn committee(&self) -> &MembershipMap {
        &self.committee
    }

    pub fn ledger(&self) -> &VerifiedMessageLedger {
        &self.ledger
    }

    pub fn is_settled(&self, message: &Digest) -> bool {
        self.ledger.is_settled(message)
    }

    /// Current ledger witness for `message`
    pub fn witness(&self, message: &Digest) -> MapWitness {
        self.ledger.witness(message)
    }

    /// Verify one request end to end and settle it on the contract
    pub async fn verify_data(&mut self, request: DataRequest) -> Result<Verification> {
        let span = info_span!("verify_data", endpoint = %request.endpoint(), field = %request.field);
        async move {
            let (value, message, proof) = self.prove(request).await?;

            let witness = self.ledger.witness(&message);
            self.contract
                .lock()
                .await
                .settle(&self.authority, &proof, &witness)?;
            self.ledger.mark_settled(&message)?;

            info!(value, message = %message, "value settled");
            Ok(Verification {
                value,
                message,
                proof,
                ledger_witness: self.ledger.witness(&message),
            })
        }
        .instrument(span)
        .await
    }

    /// Verify several requests and settle them with one folded proof
    pub async fn verify_data_batch(
        &mut self,
        requests: Vec<DataRequest>,
    ) -> Result<(SealedProof<SettlementOutput>, Vec<Verification>)> {
        let mut proven = Vec::with_capacity(requests.len());
        for request in requests {
            proven.push(self.prove(request).await?);
        }

        let signers_count = self.contract.lock().await.signers_count()?;
        let aggregations: Vec<SealedProof<AggregationOutput>> =
            proven.iter().map(|(_, _, proof)| proof.clone()).collect();

        let mut mirror = self.ledger.clone();
        let folded: SealedProof<SettlementOutput> = self.settlement.fold_against_ledger(
            &mut mirror,
            self.committee.root(),
            signers_count,
            &aggregations,
        )?;
        self.contract
            .lock()
            .await
            .aggregated_settle(&self.authority, &folded)?;
        self.ledger = mirror;
        info!(
            settled = proven.len(),
            ledger_root = %self.ledger.root(),
            "folded settlement applied"
        );

        let verifications = proven
            .into_iter()
            .map(|(value, message, proof)| Verification {
                value,
                message,
                proof,
                ledger_witness: self.ledger.witness(&message),
            })
            .collect();
        Ok((folded, verifications))
    }

    /// Collect, fetch and aggregate; no state changes
    async fn prove(
        &self,
        request: DataRequest,
    ) -> Result<(u64, Digest, SealedProof<AggregationOutput>)> {
        let signed = SignedRequest::sign(request, &self.authority);
        let responses = self.collector.collect(&signed).await?;
        let value = self.source.fetch(&signed.data).await?;
        let message = signed.data.message_for(value);

        let signers_root = self.committee.root();
        let claims = self.claims(responses);
        let proof: SealedProof<AggregationOutput> =
            self.aggregation.aggregate(message, signers_root, claims)?;

        let signers_count = self.contract.lock().await.signers_count()?;
        let count = proof.public_output().count;
        if !self.aggregation.config().threshold_met(count, signers_count) {
            warn!(count, signers_count, "not enough signatures to settle");
            return Err(ClientError::InsufficientSignatures {
                count,
                signers_count,
            });
        }
        Ok((value, message, proof))
    }

    fn claims(&self, responses: Vec<SignerResponse>) -> Vec<SignatureClaim> {
        responses
            .into_iter()
            .map(|response| {
                SignatureClaim::new(
                    response.public_key,
                    response.signature,
                    self.committee.witness(&response.public_key),
                )
            })
            .collect()
    }
}
