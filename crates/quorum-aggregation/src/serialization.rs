//! Proof envelope
//!
//! JSON transport format for sealed proofs: a version byte, the program
//! tag and the proof itself. The program tag tells a reader which output
//! type to decode the proof as.

use serde::{Deserialize, Serialize};

use crate::error::{AggregationError, AggregationResult};
use crate::proof::{Program, Provable, SealedProof};
use crate::settlement_aggregation::SettlementOutput;
use crate::signature_aggregation::AggregationOutput;

/// A sealed proof of either program family, decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeProof {
    Aggregation(SealedProof<AggregationOutput>),
    Settlement(SealedProof<SettlementOutput>),
}

impl EnvelopeProof {
    pub fn program(&self) -> Program {
        match self {
            EnvelopeProof::Aggregation(p) => p.program(),
            EnvelopeProof::Settlement(p) => p.program(),
        }
    }

    pub fn verify(&self) -> bool {
        match self {
            EnvelopeProof::Aggregation(p) => p.verify(),
            EnvelopeProof::Settlement(p) => p.verify(),
        }
    }

    /// Public output as JSON
    pub fn output_json(&self) -> AggregationResult<serde_json::Value> {
        let value = match self {
            EnvelopeProof::Aggregation(p) => serde_json::to_value(p.public_output()),
            EnvelopeProof::Settlement(p) => serde_json::to_value(p.public_output()),
        };
        value.map_err(|e| AggregationError::SerializationFailed(format!("JSON error: {e}")))
    }
}

/// Versioned JSON envelope around a sealed proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofEnvelope {
    /// Format version
    pub version: u8,

    /// Program the proof attests to
    pub program: Program,

    /// The sealed proof
    pub proof: serde_json::Value,
}

impl ProofEnvelope {
    /// Current format version
    pub const VERSION: u8 = 1;

    pub fn from_aggregation(proof: &SealedProof<AggregationOutput>) -> AggregationResult<Self> {
        Self::wrap(proof.program(), proof)
    }

    pub fn from_settlement(proof: &SealedProof<SettlementOutput>) -> AggregationResult<Self> {
        Self::wrap(proof.program(), proof)
    }

    fn wrap<T: Serialize>(program: Program, proof: &T) -> AggregationResult<Self> {
        let proof = serde_json::to_value(proof)
            .map_err(|e| AggregationError::SerializationFailed(format!("JSON error: {e}")))?;
        Ok(Self {
            version: Self::VERSION,
            program,
            proof,
        })
    }

    /// Decode the proof according to the program tag
    pub fn open(&self) -> AggregationResult<EnvelopeProof> {
        let decoded = if self.program.is_signature_aggregation() {
            EnvelopeProof::Aggregation(self.decode()?)
        } else {
            EnvelopeProof::Settlement(self.decode()?)
        };
        if decoded.program() != self.program {
            return Err(AggregationError::DeserializationFailed(format!(
                "envelope labelled {} holds a {} proof",
                self.program,
                decoded.program()
            )));
        }
        Ok(decoded)
    }

    pub fn into_aggregation(self) -> AggregationResult<SealedProof<AggregationOutput>> {
        match self.open()? {
            EnvelopeProof::Aggregation(proof) => Ok(proof),
            EnvelopeProof::Settlement(_) => Err(AggregationError::DeserializationFailed(
                "expected an aggregation proof".to_string(),
            )),
        }
    }

    pub fn into_settlement(self) -> AggregationResult<SealedProof<SettlementOutput>> {
        match self.open()? {
            EnvelopeProof::Settlement(proof) => Ok(proof),
            EnvelopeProof::Aggregation(_) => Err(AggregationError::DeserializationFailed(
                "expected a settlement proof".to_string(),
            )),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(&self) -> AggregationResult<T> {
        serde_json::from_value(self.proof.clone())
            .map_err(|e| AggregationError::DeserializationFailed(format!("JSON error: {e}")))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> AggregationResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AggregationError::SerializationFailed(format!("JSON error: {e}")))
    }

    /// Deserialize from JSON, rejecting unknown versions
    pub fn from_json(json: &str) -> AggregationResult<Self> {
        let envelope: Self = serde_json::from_str(json)
            .map_err(|e| AggregationError::DeserializationFailed(format!("JSON error: {e}")))?;
        if envelope.version != Self::VERSION {
            return Err(AggregationError::DeserializationFailed(format!(
                "Unsupported version: {}",
                envelope.version
            )));
        }
        Ok(envelope)
    }
}
