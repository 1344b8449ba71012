//! Error types for authenticated map operations

use thiserror::Error;

use quorum_primitives::Digest;

/// Errors that can occur while reading or updating a sparse map
#[derive(Debug, Error)]
pub enum StateError {
    /// Another key already holds a non-zero value in the same leaf; only
    /// possible in maps shallower than the digest width
    #[error("Leaf for {requested} already holds key {existing} at depth {depth}")]
    SlotCollision {
        depth: usize,
        existing: Digest,
        requested: Digest,
    },

    /// Depth outside 1..=256
    #[error("Unsupported map depth {0}")]
    UnsupportedDepth(usize),

    /// Message already settled in the ledger
    #[error("Message {0} already settled")]
    AlreadySettled(Digest),

    /// Signer already in the committee
    #[error("Signer {0} is already a member")]
    AlreadyMember(Digest),

    /// Signer not in the committee
    #[error("Signer {0} is not a member")]
    NotAMember(Digest),
}

/// Result type for map operations
pub type StateResult<T> = Result<T, StateError>;
