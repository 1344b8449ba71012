//! Committee membership map
//!
//! Maps `signer_hash(key)` to a membership flag. The root is the single
//! commitment to who may sign.

use quorum_primitives::keys::signer_hash;
use quorum_primitives::{Digest, SignerKey};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::merkle::{AuthenticatedMap, MapWitness, SparseMerkleMap};

/// Authenticated set of committee members
#[derive(Debug, Clone)]
pub struct MembershipMap {
    map: SparseMerkleMap,
}

impl MembershipMap {
    pub fn new(depth: usize) -> StateResult<Self> {
        Ok(Self {
            map: SparseMerkleMap::new(depth)?,
        })
    }

    /// Build a committee from a list of keys; duplicates are ignored
    pub fn from_keys<'a>(
        depth: usize,
        keys: impl IntoIterator<Item = &'a SignerKey>,
    ) -> StateResult<Self> {
        let mut committee = Self::new(depth)?;
        for key in keys {
            if !committee.contains(key) {
                committee.add(key)?;
            }
        }
        Ok(committee)
    }

    pub fn contains(&self, key: &SignerKey) -> bool {
        self.map.get(&signer_hash(key)) == 1
    }

    /// Add a member, rejecting existing members
    pub fn add(&mut self, key: &SignerKey) -> StateResult<Digest> {
        let hash = signer_hash(key);
        if self.map.get(&hash) == 1 {
            return Err(StateError::AlreadyMember(hash));
        }
        let root = self.map.set(&hash, 1)?;
        debug!(signer = %hash, root = %root, "committee member added");
        Ok(root)
    }

    /// Remove a member, rejecting non-members
    pub fn remove(&mut self, key: &SignerKey) -> StateResult<Digest> {
        let hash = signer_hash(key);
        if self.map.get(&hash) != 1 {
            return Err(StateError::NotAMember(hash));
        }
        let root = self.map.set(&hash, 0)?;
        debug!(signer = %hash, root = %root, "committee member removed");
        Ok(root)
    }

    /// Number of members
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

impl AuthenticatedMap for MembershipMap {
    type Key = SignerKey;
    type Value = bool;

    fn get(&self, key: &SignerKey) -> bool {
        self.contains(key)
    }

    fn set(&mut self, key: &SignerKey, value: bool) -> StateResult<Digest> {
        self.map.set(&signer_hash(key), u64::from(value))
    }

    fn witness(&self, key: &SignerKey) -> MapWitness {
        self.map.witness(&signer_hash(key))
    }

    fn root(&self) -> Digest {
        self.map.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_primitives::keys::signing_key_from_seed;

    fn member(i: u32) -> SignerKey {
        signing_key_from_seed(&i.to_le_bytes()).verifying_key()
    }

    #[test]
    fn test_from_keys() {
        let keys: Vec<SignerKey> = (0..5).map(member).collect();
        let committee = MembershipMap::from_keys(32, &keys).unwrap();

        assert_eq!(committee.len(), 5);
        assert!(keys.iter().all(|k| committee.contains(k)));
        assert!(!committee.contains(&member(99)));
    }

    #[test]
    fn test_membership_witness() {
        let keys: Vec<SignerKey> = (0..3).map(member).collect();
        let committee = MembershipMap::from_keys(32, &keys).unwrap();

        let witness = committee.witness(&keys[1]);
        assert_eq!(witness.key, signer_hash(&keys[1]));
        assert_eq!(witness.compute_root(1), committee.root());

        let outsider = committee.witness(&member(42));
        assert_ne!(outsider.compute_root(1), committee.root());
        assert_eq!(outsider.compute_root(0), committee.root());
    }

    #[test]
    fn test_add_and_remove() {
        let mut committee = MembershipMap::new(32).unwrap();
        let empty = committee.root();
        committee.add(&member(1)).unwrap();

        assert!(matches!(
            committee.add(&member(1)),
            Err(StateError::AlreadyMember(_))
        ));

        committee.remove(&member(1)).unwrap();
        assert_eq!(committee.root(), empty);
        assert!(matches!(
            committee.remove(&member(1)),
            Err(StateError::NotAMember(_))
        ));
    }
}
