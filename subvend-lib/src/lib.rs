//! Subvend library.
//!
//! Core state machine for delegated subdomain sales: a per-domain
//! **Vending Machine** (registration, pricing, pause, withdrawal) and a
//! **Factory** (one deployment per parent domain, ownership-gated).
//!
//! The crate intentionally stays ledger-agnostic and delegates all external
//! state to callers through trait-based dependency injection: the name
//! registry, the resolver, and the fungible token ledger are capability
//! traits ([`ledger::NameRegistry`], [`ledger::Resolver`],
//! [`ledger::TokenLedger`]) with in-memory reference implementations in
//! [`ledger::memory`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use subvend_lib::{Address, namehash, VendingMachineFactory};
//! use subvend_lib::ledger::NameRegistry;
//! use subvend_lib::ledger::memory::{InMemoryRegistry, InMemoryTokenLedger};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> subvend_lib::Result<()> {
//! let registry = Arc::new(InMemoryRegistry::new(Address::new([0x10; 20])));
//! let token = Arc::new(InMemoryTokenLedger::new(Address::new([0x20; 20])));
//! let resolver = Address::new([0x30; 20]);
//!
//! let owner = Address::new([0xaa; 20]);
//! let parent = namehash("example.rsk");
//! registry.register_root(parent, owner);
//!
//! let factory = VendingMachineFactory::new(registry.clone(), resolver, token)?;
//! let machine = factory.deploy_vending_machine(parent, 0, owner).await?;
//!
//! // Hand the parent domain to the machine, then anyone can mint.
//! registry.set_owner(owner, parent, machine.address()).await?;
//! let subnode = machine.register(owner, "alice", owner).await?;
//! assert_eq!(registry.owner_of(subnode).await?, owner);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

pub mod errors;
pub mod factory;
pub mod ledger;
pub mod machine;
pub mod node;

pub use errors::{VendError, VendErrorCode};
pub use factory::{VendingMachineDeployed, VendingMachineFactory};
pub use machine::SubdomainVendingMachine;
pub use node::{label_hash, namehash, subnode_of, Node};

/// Common result alias for subvend operations.
pub type Result<T> = std::result::Result<T, VendError>;

/// A 20-byte account identifier, printed as 0x-prefixed hex.
///
/// The all-zero address stands for "no account" throughout the crate: an
/// unowned registry node reports [`Address::ZERO`] as its owner, and the
/// factory rejects zero collaborator addresses at construction.
///
/// # Example
///
/// ```
/// use subvend_lib::Address;
///
/// let addr: Address = "0x0dd350d76a265890b9cfed579dddbb4d343ff747".parse().unwrap();
/// assert!(!addr.is_zero());
/// assert_eq!(addr.to_string().len(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null account.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Whether this is the null account.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::ZERO
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VendError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|err| VendError::invalid_data("address", err.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| VendError::invalid_data("address", "expected 20 bytes"))?;
        Ok(Self(bytes))
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trip() {
        let addr = Address::new([0xab; 20]);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_address_accepts_bare_hex() {
        let with_prefix: Address = "0x0dd350d76a265890b9cfed579dddbb4d343ff747".parse().unwrap();
        let bare: Address = "0dd350d76a265890b9cfed579dddbb4d343ff747".parse().unwrap();
        assert_eq!(with_prefix, bare);
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(err.code(), VendErrorCode::InvalidData);
    }

    #[test]
    fn test_address_serializes_as_hex_string() {
        let addr = Address::new([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::new([1; 20]).is_zero());
    }
}
