//! Quorum Settlement State
//!
//! Sparse authenticated maps backing the protocol:
//! - `SparseMerkleMap`: depth-configurable Rescue Merkle map with default-zero semantics
//! - `MembershipMap`: committee membership keyed by signer hash
//! - `VerifiedMessageLedger`: monotonic record of settled messages
//!
//! Both committee and ledger implement [`AuthenticatedMap`] and hand out
//! [`MapWitness`] paths that the proof programs and the contract check
//! against a root.

pub mod error;
pub mod ledger;
pub mod membership;
pub mod merkle;

pub use error::{StateError, StateResult};
pub use ledger::VerifiedMessageLedger;
pub use membership::MembershipMap;
pub use merkle::{leaf_hash, AuthenticatedMap, MapWitness, SparseMerkleMap};
