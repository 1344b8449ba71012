//! Quorum Client
//!
//! Off-chain collaborators of the settlement protocol: where values come
//! from, how committee signatures are collected, and the verifier node that
//! turns a data request into a settled ledger entry.
//!
//! # Example
//!
//! ```ignore
//! use quorum_client::{DataRequest, HttpDataSource, LocalCommittee, VerifierNode};
//!
//! let mut node = VerifierNode::new(config, authority, committee, contract, source, collector)?;
//! let verification = node
//!     .verify_data(DataRequest::new("https://api.example.com", "/price", "usd"))
//!     .await?;
//! println!("settled {} as {}", verification.value, verification.message);
//! ```

mod committee;
mod data_source;
mod error;
mod signer;
mod types;
mod verifier;

pub use committee::{LocalCommittee, SignatureCollector};
pub use data_source::{extract_field, DataSource, HttpDataSource, StaticDataSource};
pub use error::{ClientError, Result};
pub use signer::SignerNode;
pub use types::{DataRequest, SignedRequest, SignerResponse};
pub use verifier::{SharedContract, Verification, VerifierNode, VerifierNodeConfig};
