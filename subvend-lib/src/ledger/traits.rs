use async_trait::async_trait;

use crate::{Address, Node, Result};

/// The authoritative name registry: node → (owner, resolver).
///
/// Write operations carry the calling account explicitly and are expected to
/// enforce the registry's own access control (only a node's current owner may
/// mutate it, and only a parent's owner may mint children). The core relies
/// on that enforcement instead of re-checking parent ownership on every call.
#[async_trait]
pub trait NameRegistry: Send + Sync {
    /// The registry's own account identifier.
    fn address(&self) -> Address;

    /// Current owner of `node`; [`Address::ZERO`] when unowned.
    async fn owner_of(&self, node: Node) -> Result<Address>;

    /// Resolver configured for `node`; [`Address::ZERO`] when unset.
    async fn resolver_of(&self, node: Node) -> Result<Address>;

    /// Transfer ownership of `node` to `new_owner`. Caller must own `node`.
    async fn set_owner(&self, caller: Address, node: Node, new_owner: Address) -> Result<()>;

    /// Mint or reassign the child of `parent` named by `label_hash`, owned by
    /// `owner`. Caller must own `parent`. Returns the derived child node.
    async fn set_subnode_owner(
        &self,
        caller: Address,
        parent: Node,
        label_hash: Node,
        owner: Address,
    ) -> Result<Node>;

    /// Point `node` at `resolver`. Caller must own `node`.
    async fn set_resolver(&self, caller: Address, node: Node, resolver: Address) -> Result<()>;
}

/// Resolver record store for nodes: address and text records.
///
/// Consumed by subdomain owners directly (and by diagnostics); the vending
/// machine itself only writes the registry's resolver pointer.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// The resolver's own account identifier.
    fn address(&self) -> Address;

    /// Set the address record of `node`. Caller must own `node` in the registry.
    async fn set_addr(&self, caller: Address, node: Node, addr: Address) -> Result<()>;

    /// Set a text record of `node`. Caller must own `node` in the registry.
    async fn set_text(&self, caller: Address, node: Node, key: &str, value: &str) -> Result<()>;

    /// Address record of `node`, if any.
    async fn addr_of(&self, node: Node) -> Result<Option<Address>>;

    /// Text record of `node` under `key`, if any.
    async fn text_of(&self, node: Node, key: &str) -> Result<Option<String>>;
}

/// Standard transferable-balance token ledger.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// The token contract's own account identifier.
    fn address(&self) -> Address;

    /// Balance of `account` in base units.
    async fn balance_of(&self, account: Address) -> Result<u128>;

    /// Pull `amount` units from `from` to `to` on behalf of `caller`,
    /// consuming `caller`'s allowance from `from`.
    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()>;

    /// Move `amount` units from `caller`'s own balance to `to`.
    async fn transfer(&self, caller: Address, to: Address, amount: u128) -> Result<()>;
}
