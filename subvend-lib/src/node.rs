//! Name identifiers and their keccak-256 derivation.
//!
//! A [`Node`] is the opaque 32-byte identifier the external name registry
//! keys everything on. Child nodes are derived exactly as the registry does
//! it: `subnode = keccak256(parent ++ keccak256(label))`, and a full dotted
//! name folds right-to-left from the zero node ([`namehash`]). Derivation is
//! pure; structural validity of labels (non-emptiness) is enforced at the
//! registration site, not here — an empty label still hashes to a defined
//! value.

use std::fmt;
use std::str::FromStr;

use tiny_keccak::{Hasher, Keccak};

use crate::{Address, Result, VendError};

/// A 32-byte name identifier, printed as 0x-prefixed hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(pub [u8; 32]);

impl Node {
    /// The root node (also the namehash of the empty name).
    pub const ZERO: Node = Node([0u8; 32]);

    /// Create a node from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Whether this is the root node.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Node {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Node {
    type Err = VendError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(raw).map_err(|err| VendError::invalid_data("node", err.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VendError::invalid_data("node", "expected 32 bytes"))?;
        Ok(Self(bytes))
    }
}

impl serde::Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// keccak-256 of the raw label bytes.
pub fn label_hash(label: &str) -> Node {
    Node(keccak256(&[label.as_bytes()]))
}

/// Derive the child node of `parent` named by `label`.
pub fn subnode_of(parent: Node, label: &str) -> Node {
    subnode_of_hash(parent, label_hash(label))
}

/// Derive the child node of `parent` from an already-computed label hash.
pub fn subnode_of_hash(parent: Node, label_hash: Node) -> Node {
    Node(keccak256(&[&parent.0, &label_hash.0]))
}

/// Namehash of a full dotted name ("player1.example.rsk").
///
/// The empty name maps to [`Node::ZERO`]; otherwise labels fold right-to-left
/// so that `namehash("a.b") == subnode_of(namehash("b"), "a")`.
pub fn namehash(name: &str) -> Node {
    let mut node = Node::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        node = subnode_of(node, label);
    }
    node
}

/// Derive a deterministic 20-byte account identifier from a tag and seed
/// material (last 20 bytes of the keccak digest, the usual convention).
///
/// Used for in-process contract and dev-account addresses; there is no key
/// behind these identities.
pub fn derived_address(tag: &str, material: &[u8]) -> Address {
    let digest = keccak256(&[tag.as_bytes(), material]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_hash_vector() {
        // keccak256 of the empty string
        assert_eq!(
            label_hash("").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_namehash_vectors() {
        // EIP-137 reference vectors
        assert_eq!(namehash(""), Node::ZERO);
        assert_eq!(
            namehash("eth").to_string(),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            namehash("foo.eth").to_string(),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_namehash_agrees_with_subnode_derivation() {
        let parent = namehash("example.rsk");
        assert_eq!(namehash("player1.example.rsk"), subnode_of(parent, "player1"));
    }

    #[test]
    fn test_distinct_labels_distinct_subnodes() {
        let parent = Node::new([0xaa; 32]);
        assert_ne!(subnode_of(parent, "alice"), subnode_of(parent, "bob"));
        assert_ne!(subnode_of(parent, "alice"), parent);
    }

    #[test]
    fn test_empty_label_still_derives() {
        // A defined value, distinct from the parent; rejection of empty
        // labels happens in register(), not in the hash.
        let parent = Node::new([0xaa; 32]);
        assert_ne!(subnode_of(parent, ""), parent);
    }

    #[test]
    fn test_node_round_trip() {
        let node = namehash("round.trip.rsk");
        let parsed: Node = node.to_string().parse().unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_derived_address_is_stable_and_tagged() {
        let a = derived_address("devnet:account", b"alice");
        let b = derived_address("devnet:account", b"alice");
        let c = derived_address("devnet:contract", b"alice");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
    }
}
