//! Error types for the committee client

use quorum_aggregation::AggregationError;
use quorum_contract::ContractError;
use quorum_state::StateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Field `{0}` missing from response")]
    FieldMissing(String),

    #[error("Field `{0}` is not an unsigned integer")]
    FieldNotNumeric(String),

    #[error("Not enough signatures: {count} of {signers_count} signers")]
    InsufficientSignatures { count: u64, signers_count: u64 },

    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Settlement rejected: {0}")]
    Contract(#[from] ContractError),

    #[error("Local state error: {0}")]
    State(#[from] StateError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
