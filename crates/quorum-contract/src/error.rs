//! Error types for the settlement contract

use quorum_aggregation::AggregationError;
use quorum_primitives::Digest;
use thiserror::Error;

/// Reasons a contract transition is rejected. A rejected transition never
/// changes state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("Caller is not the verifier authority")]
    Unauthorized,

    #[error("Contract is not initialized")]
    NotInitialized,

    #[error("Contract is already initialized")]
    AlreadyInitialized,

    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    #[error("Signers root mismatch: state has {expected}, proof has {actual}")]
    RootMismatch { expected: Digest, actual: Digest },

    #[error("Threshold not met: {count} of {signers_count} signers")]
    ThresholdNotMet { count: u64, signers_count: u64 },

    #[error("Message mismatch: expected {expected}, got {actual}")]
    MessageMismatch { expected: Digest, actual: Digest },

    #[error("Message {0} already settled")]
    AlreadySettled(Digest),

    #[error("Signer {0} is already a member")]
    AlreadyMember(Digest),

    #[error("Signer {0} is not a member")]
    NotAMember(Digest),

    /// Proof or witness was built against an out-of-date root
    #[error("Stale state: {0}")]
    StaleState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<AggregationError> for ContractError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::InvalidProof(reason) => ContractError::InvalidProof(reason),
            AggregationError::RootMismatch { expected, actual } => {
                ContractError::RootMismatch { expected, actual }
            }
            AggregationError::ThresholdNotMet {
                count,
                signers_count,
                ..
            } => ContractError::ThresholdNotMet {
                count,
                signers_count,
            },
            AggregationError::MessageMismatch { expected, actual } => {
                ContractError::MessageMismatch { expected, actual }
            }
            AggregationError::AlreadySettled(message) => ContractError::AlreadySettled(message),
            AggregationError::StaleState(root) => {
                ContractError::StaleState(format!("witness does not match ledger root {root}"))
            }
            AggregationError::NotAMember(signer) => ContractError::NotAMember(signer),
            other => ContractError::InvalidProof(other.to_string()),
        }
    }
}

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;
