//! Quorum Settlement - Threshold multi-signature aggregation and settlement
//!
//! An off-chain committee attests to external data. Once a supermajority of
//! the committee has signed a message, the message is marked verified in an
//! authenticated ledger held by a settlement state machine.
//!
//! # Overview
//!
//! Individual Ed25519 signatures are checked in fixed-capacity batches and
//! chained into one aggregation proof per message. Many aggregation proofs
//! can in turn be folded into one ledger transition proof. The contract
//! accepts either.
//!
//! # Crates
//!
//! - `quorum-primitives`: Field elements, Rescue digests, keys, protocol constants
//! - `quorum-state`: Sparse Merkle map, committee membership, verified-message ledger
//! - `quorum-aggregation`: Batch verifier, signature aggregation, settlement folding
//! - `quorum-contract`: Authority-gated settlement state machine
//! - `quorum-client`: Data sources, signer nodes, verifier node
//!
//! # Example
//!
//! ```no_run
//! use quorum_settlement::aggregation::{AggregationOutput, AggregationPipeline, SealedProof};
//! use quorum_settlement::primitives::{Digest, ProtocolConfig};
//! use quorum_settlement::state::{AuthenticatedMap, MembershipMap};
//!
//! let committee = MembershipMap::new(32).unwrap();
//! let pipeline = AggregationPipeline::new(ProtocolConfig::default()).unwrap();
//! let proof: SealedProof<AggregationOutput> = pipeline
//!     .aggregate(Digest::hash_bytes(b"value"), committee.root(), Vec::new())
//!     .unwrap();
//! ```

// Re-export sub-crates
pub use quorum_aggregation as aggregation;
pub use quorum_client as client;
pub use quorum_contract as contract;
pub use quorum_primitives as primitives;
pub use quorum_state as state;
