//! Messages the committee signs to change its own membership

use quorum_primitives::{bytes_to_felts, Digest, SignerKey};

const ADDITION_PREFIX: &[u8] = b"signer-node-addition";
const REMOVAL_PREFIX: &[u8] = b"signer-node-removal";

/// Direction of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerChange {
    Add,
    Remove,
}

impl SignerChange {
    fn prefix(&self) -> Digest {
        match self {
            SignerChange::Add => Digest::hash_bytes(ADDITION_PREFIX),
            SignerChange::Remove => Digest::hash_bytes(REMOVAL_PREFIX),
        }
    }
}

/// The message a committee must approve to add or remove `key`
pub fn signer_change_message(key: &SignerKey, change: SignerChange) -> Digest {
    let mut elements = bytes_to_felts(key.as_bytes());
    elements.extend_from_slice(change.prefix().elements());
    Digest::hash_elements(&elements)
}
