//! Error types for aggregation and settlement folding

use quorum_primitives::Digest;
use quorum_state::StateError;
use thiserror::Error;

/// Errors that can occur while building or checking proofs
#[derive(Debug, Error)]
pub enum AggregationError {
    /// A premise proof did not verify
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// Claim signature does not verify over the message
    #[error("Invalid signature from signer {0}")]
    InvalidSignature(Digest),

    /// Claim witness does not place the signer in the committee
    #[error("Signer {0} is not a committee member")]
    NotAMember(Digest),

    /// A batch's smallest valid signer is not above the watermark
    #[error("Ordering violation: batch starts at {smallest}, watermark is {watermark}")]
    OrderingViolation { watermark: Digest, smallest: Digest },

    /// Proof was built against a different committee
    #[error("Signers root mismatch: expected {expected}, got {actual}")]
    RootMismatch { expected: Digest, actual: Digest },

    /// Not enough distinct valid signers
    #[error(
        "Threshold not met: {count} of {signers_count} signers, need {numerator}/{denominator}"
    )]
    ThresholdNotMet {
        count: u64,
        signers_count: u64,
        numerator: u64,
        denominator: u64,
    },

    /// Witness key differs from the message being settled
    #[error("Message mismatch: expected {expected}, witness is for {actual}")]
    MessageMismatch { expected: Digest, actual: Digest },

    /// Message is already marked settled
    #[error("Message {0} already settled")]
    AlreadySettled(Digest),

    /// Witness does not match the current root
    #[error("Stale state: witness does not match root {0}")]
    StaleState(Digest),

    /// Batch does not hold exactly the configured number of claims
    #[error("Batch holds {actual} claims, capacity is {expected}")]
    BatchCapacity { expected: usize, actual: usize },

    /// Unusable protocol configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local map mirror rejected an update
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// Result type for aggregation operations
pub type AggregationResult<T> = Result<T, AggregationError>;
