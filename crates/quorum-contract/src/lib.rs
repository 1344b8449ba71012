//! Quorum Settlement Contract
//!
//! The on-chain half of the protocol: a state machine holding the verifier
//! authority, the committee root and size, and the verified-message ledger
//! root. It accepts either one aggregation proof with a ledger witness
//! (`settle`) or a folded settlement proof (`aggregated_settle`), and lets a
//! supermajority of the committee add or remove members.

pub mod contract;
pub mod error;
pub mod messages;
pub mod state;

pub use contract::SettlementContract;
pub use error::{ContractError, ContractResult};
pub use messages::{signer_change_message, SignerChange};
pub use state::ContractState;
