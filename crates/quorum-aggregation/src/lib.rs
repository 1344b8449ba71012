//! Quorum Aggregation
//!
//! Proof programs of the settlement protocol.
//!
//! # Architecture
//!
//! - **Batch verifier**: counts the valid, strictly ascending prefix of a
//!   fixed-capacity batch of signature claims
//! - **Signature aggregation**: recursive base/step programs chaining batches
//!   for one message into a single count, with a watermark that forbids
//!   counting a signer twice
//! - **Settlement folding**: recursive base/step programs chaining many
//!   settled messages into one ledger root transition
//! - **Pipelines**: coordinator drivers that order, batch, evaluate in
//!   parallel and fold
//!
//! # Usage
//!
//! ```ignore
//! use quorum_aggregation::{AggregationPipeline, AggregationOutput, SealedProof};
//!
//! let pipeline = AggregationPipeline::new(ProtocolConfig::default())?;
//! let proof: SealedProof<AggregationOutput> =
//!     pipeline.aggregate(message, committee.root(), claims)?;
//! assert!(proof.verify());
//! ```

pub mod batch;
pub mod claim;
pub mod error;
pub mod pipeline;
pub mod proof;
pub mod serialization;
pub mod settlement_aggregation;
pub mod signature_aggregation;
pub mod transition;

pub use batch::{evaluate, Batch, BatchOutput};
pub use claim::SignatureClaim;
pub use error::{AggregationError, AggregationResult};
pub use pipeline::{AggregationPipeline, SettlementPipeline};
pub use proof::{MockProof, Program, Provable, SealedProof};
pub use serialization::{EnvelopeProof, ProofEnvelope};
pub use settlement_aggregation::{SettlementFolder, SettlementOutput};
pub use signature_aggregation::{AggregationOutput, SignatureAggregator};
pub use transition::{apply_leaf_update, check_aggregation, settle_message, LeafUpdate};
