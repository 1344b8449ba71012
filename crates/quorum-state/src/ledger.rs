//! Verified-message ledger
//!
//! Maps message digests to a settlement flag. Monotonic: once a message is
//! settled it is never reset by the protocol.

use quorum_primitives::Digest;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::merkle::{AuthenticatedMap, MapWitness, SparseMerkleMap};

/// Authenticated record of settled messages
#[derive(Debug, Clone)]
pub struct VerifiedMessageLedger {
    map: SparseMerkleMap,
}

impl VerifiedMessageLedger {
    pub fn new(depth: usize) -> StateResult<Self> {
        Ok(Self {
            map: SparseMerkleMap::new(depth)?,
        })
    }

    pub fn is_settled(&self, message: &Digest) -> bool {
        self.map.get(message) == 1
    }

    /// Mark a message settled, returning the new root
    pub fn mark_settled(&mut self, message: &Digest) -> StateResult<Digest> {
        if self.is_settled(message) {
            return Err(StateError::AlreadySettled(*message));
        }
        let root = self.map.set(message, 1)?;
        debug!(message = %message, root = %root, "message settled");
        Ok(root)
    }

    /// Number of settled messages
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.map.depth()
    }
}

impl AuthenticatedMap for VerifiedMessageLedger {
    type Key = Digest;
    type Value = bool;

    fn get(&self, message: &Digest) -> bool {
        self.is_settled(message)
    }

    /// Only `true` is accepted: the ledger never un-settles a message.
    fn set(&mut self, message: &Digest, value: bool) -> StateResult<Digest> {
        if !value {
            return match self.is_settled(message) {
                true => Err(StateError::AlreadySettled(*message)),
                false => Ok(self.map.root()),
            };
        }
        self.mark_settled(message)
    }

    fn witness(&self, message: &Digest) -> MapWitness {
        self.map.witness(message)
    }

    fn root(&self) -> Digest {
        self.map.root()
    }
}
