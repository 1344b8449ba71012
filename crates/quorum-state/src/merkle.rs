//! Sparse Rescue-based Merkle map
//!
//! A fixed-depth binary tree in which every key owns one leaf: the low
//! `depth` bits of its 256-bit encoding. At the default depth of 256 no two
//! keys share a leaf. Absent keys read as 0. A zero value is stored as the
//! zero digest; a non-zero value `v` under key `k` is stored as
//! `Rescue(k || v)`, so a witness binds the full key and not only its
//! position. Only non-default nodes are kept in memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use quorum_primitives::{felt_from_u64, Digest, Felt, DIGEST_ELEMENTS, MAX_MAP_DEPTH};

use crate::error::{StateError, StateResult};

/// Key/value store committed to by a single root digest
pub trait AuthenticatedMap {
    /// Key type accepted by the map
    type Key: ?Sized;

    /// Value type stored in the map
    type Value;

    /// Current value under `key` (the default value if absent)
    fn get(&self, key: &Self::Key) -> Self::Value;

    /// Store `value` under `key`, returning the new root
    fn set(&mut self, key: &Self::Key, value: Self::Value) -> StateResult<Digest>;

    /// Authentication path for `key` against the current root
    fn witness(&self, key: &Self::Key) -> MapWitness;

    /// Current root
    fn root(&self) -> Digest;
}

/// Hash of a leaf holding `value` under `key`
pub fn leaf_hash(key: &Digest, value: u64) -> Digest {
    if value == 0 {
        return Digest::ZERO;
    }
    let mut input: Vec<Felt> = Vec::with_capacity(5);
    input.extend_from_slice(key.elements());
    input.push(felt_from_u64(value));
    Digest::hash_elements(&input)
}

/// Node position within one tree level, as a 256-bit little-endian integer
type NodeIndex = [u64; DIGEST_ELEMENTS];

/// Index of the parent level: `index >> 1`
fn parent(index: &NodeIndex) -> NodeIndex {
    let mut out = [0u64; DIGEST_ELEMENTS];
    for i in 0..DIGEST_ELEMENTS {
        out[i] = index[i] >> 1;
        if i + 1 < DIGEST_ELEMENTS {
            out[i] |= index[i + 1] << 63;
        }
    }
    out
}

fn sibling(index: &NodeIndex) -> NodeIndex {
    let mut out = *index;
    out[0] ^= 1;
    out
}

fn is_right(index: &NodeIndex) -> bool {
    index[0] & 1 == 1
}

fn check_depth(depth: usize) -> StateResult<()> {
    if depth == 0 || depth > MAX_MAP_DEPTH {
        return Err(StateError::UnsupportedDepth(depth));
    }
    Ok(())
}

/// Roots of empty subtrees, index = height (0 = leaf)
fn default_nodes(depth: usize) -> Vec<Digest> {
    let mut nodes = Vec::with_capacity(depth + 1);
    nodes.push(Digest::ZERO);
    for level in 0..depth {
        let child = nodes[level];
        nodes.push(Digest::merge(&child, &child));
    }
    nodes
}

/// Authentication path for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWitness {
    /// The key this path authenticates
    pub key: Digest,

    /// Sibling digests from the leaf level up to just below the root
    pub siblings: Vec<Digest>,
}

impl MapWitness {
    /// A path that authenticates nothing useful; pads empty claims
    pub fn empty(depth: usize) -> Self {
        Self {
            key: Digest::ZERO,
            siblings: vec![Digest::ZERO; depth],
        }
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// The key implied by this witness
    pub fn key(&self) -> &Digest {
        &self.key
    }

    /// Root of the tree in which `key` holds `value` and every other node
    /// is as recorded in this path
    pub fn compute_root(&self, value: u64) -> Digest {
        let mut node = leaf_hash(&self.key, value);
        let mut index = self.key.leaf_index(self.depth());
        for sibling in &self.siblings {
            node = if is_right(&index) {
                Digest::merge(sibling, &node)
            } else {
                Digest::merge(&node, sibling)
            };
            index = parent(&index);
        }
        node
    }
}

/// In-memory sparse Merkle map keyed by digests
#[derive(Debug, Clone)]
pub struct SparseMerkleMap {
    depth: usize,

    /// Empty-subtree roots per height
    defaults: Vec<Digest>,

    /// Non-default nodes by (height, index)
    nodes: HashMap<(usize, NodeIndex), Digest>,

    /// Occupied leaves: index -> (key, value)
    leaves: HashMap<NodeIndex, (Digest, u64)>,

    root: Digest,
}

impl SparseMerkleMap {
    /// An empty map of the given depth
    pub fn new(depth: usize) -> StateResult<Self> {
        check_depth(depth)?;
        let defaults = default_nodes(depth);
        let root = defaults[depth];
        Ok(Self {
            depth,
            defaults,
            nodes: HashMap::new(),
            leaves: HashMap::new(),
            root,
        })
    }

    /// Root of an empty map of the given depth
    pub fn empty_root(depth: usize) -> StateResult<Digest> {
        check_depth(depth)?;
        Ok(default_nodes(depth)[depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of keys holding a non-zero value
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Keys holding a non-zero value, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &Digest> {
        self.leaves.values().map(|(key, _)| key)
    }

    fn node(&self, height: usize, index: NodeIndex) -> Digest {
        self.nodes
            .get(&(height, index))
            .copied()
            .unwrap_or(self.defaults[height])
    }

    fn store_node(&mut self, height: usize, index: NodeIndex, node: Digest) {
        if node == self.defaults[height] {
            self.nodes.remove(&(height, index));
        } else {
            self.nodes.insert((height, index), node);
        }
    }
}

impl AuthenticatedMap for SparseMerkleMap {
    type Key = Digest;
    type Value = u64;

    fn get(&self, key: &Digest) -> u64 {
        match self.leaves.get(&key.leaf_index(self.depth)) {
            Some((stored, value)) if stored == key => *value,
            _ => 0,
        }
    }

    fn set(&mut self, key: &Digest, value: u64) -> StateResult<Digest> {
        let leaf = key.leaf_index(self.depth);

        match self.leaves.get(&leaf) {
            Some((existing, _)) if existing != key => {
                if value == 0 {
                    // The key was never stored; it already reads as zero.
                    return Ok(self.root);
                }
                return Err(StateError::SlotCollision {
                    depth: self.depth,
                    existing: *existing,
                    requested: *key,
                });
            }
            _ => {}
        }

        if value == 0 {
            self.leaves.remove(&leaf);
        } else {
            self.leaves.insert(leaf, (*key, value));
        }

        let mut node = leaf_hash(key, value);
        let mut index = leaf;
        for height in 0..self.depth {
            self.store_node(height, index, node);
            let sibling = self.node(height, sibling(&index));
            node = if is_right(&index) {
                Digest::merge(&sibling, &node)
            } else {
                Digest::merge(&node, &sibling)
            };
            index = parent(&index);
        }
        self.root = node;
        Ok(node)
    }

    fn witness(&self, key: &Digest) -> MapWitness {
        let mut index = key.leaf_index(self.depth);
        let mut siblings = Vec::with_capacity(self.depth);
        for height in 0..self.depth {
            siblings.push(self.node(height, sibling(&index)));
            index = parent(&index);
        }
        MapWitness {
            key: *key,
            siblings,
        }
    }

    fn root(&self) -> Digest {
        self.root
    }
}
