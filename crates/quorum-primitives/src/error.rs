//! Error types for primitive encodings

use thiserror::Error;

/// Errors raised while decoding primitives or validating configuration
#[derive(Debug, Error)]
pub enum PrimitivesError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Non-canonical field element: {0}")]
    NonCanonicalElement(u64),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
