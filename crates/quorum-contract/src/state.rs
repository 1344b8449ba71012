//! Persistent contract state

use serde::{Deserialize, Serialize};

use quorum_primitives::keys::serde_signer_key;
use quorum_primitives::{Digest, SignerKey};

/// The four fields the contract owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Only holder of the matching signing key may submit transitions
    #[serde(with = "serde_signer_key")]
    pub verifier_authority: SignerKey,

    /// Committee membership root
    pub signers_root: Digest,

    /// Committee size used for the threshold
    pub signers_count: u64,

    /// Verified-message ledger root
    pub ledger_root: Digest,
}
