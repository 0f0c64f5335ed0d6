//! In-memory reference ledger.
//!
//! Simulated registry, resolver, and token implementations backing the test
//! suite and the demo CLI. They enforce the same authorization rules the real
//! external contracts do (owner-gated registry writes, allowance-gated token
//! pulls) so that core failure paths — including post-reclaim registration —
//! exercise realistically. Each piece can be snapshotted to a serde-friendly
//! value and rebuilt, which is how the demo CLI persists its devnet.
//!
//! Not a blockchain: no blocks, no signatures, no gas. Bootstrap helpers
//! (`register_root`, `mint`, `approve`) stand in for the external registrar
//! and token faucet.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ledger::{NameRegistry, Resolver, TokenLedger};
use crate::node::subnode_of_hash;
use crate::{Address, Node, Result, VendError};

#[derive(Clone, Copy, Debug, Default)]
struct NameRecord {
    owner: Address,
    resolver: Address,
}

/// One registry entry in a [`RegistrySnapshot`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub node: Node,
    pub owner: Address,
    pub resolver: Address,
}

/// Serializable registry state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub address: Address,
    pub records: Vec<RegistryEntry>,
}

/// In-memory [`NameRegistry`] with owner-gated writes.
pub struct InMemoryRegistry {
    address: Address,
    records: RwLock<HashMap<Node, NameRecord>>,
}

impl InMemoryRegistry {
    /// Create an empty registry at the given account identifier.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a registry from a snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let records = snapshot
            .records
            .into_iter()
            .map(|entry| {
                (
                    entry.node,
                    NameRecord {
                        owner: entry.owner,
                        resolver: entry.resolver,
                    },
                )
            })
            .collect();
        Self {
            address: snapshot.address,
            records: RwLock::new(records),
        }
    }

    /// Snapshot the current state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = records
            .iter()
            .map(|(node, record)| RegistryEntry {
                node: *node,
                owner: record.owner,
                resolver: record.resolver,
            })
            .collect();
        entries.sort_by_key(|entry| entry.node);
        RegistrySnapshot {
            address: self.address,
            records: entries,
        }
    }

    /// Bootstrap helper: record `owner` as the owner of `node` without any
    /// authorization check. Stands in for the external registrar that sold
    /// the parent domain in the first place.
    pub fn register_root(&self, node: Node, owner: Address) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.entry(node).or_default().owner = owner;
    }

    fn owner(&self, node: Node) -> Address {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(&node).map(|r| r.owner).unwrap_or(Address::ZERO)
    }

    fn require_owner(&self, operation: &'static str, caller: Address, node: Node) -> Result<()> {
        if self.owner(node) != caller {
            return Err(VendError::unauthorized(operation, caller));
        }
        Ok(())
    }
}

#[async_trait]
impl NameRegistry for InMemoryRegistry {
    fn address(&self) -> Address {
        self.address
    }

    async fn owner_of(&self, node: Node) -> Result<Address> {
        Ok(self.owner(node))
    }

    async fn resolver_of(&self, node: Node) -> Result<Address> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .get(&node)
            .map(|r| r.resolver)
            .unwrap_or(Address::ZERO))
    }

    async fn set_owner(&self, caller: Address, node: Node, new_owner: Address) -> Result<()> {
        self.require_owner("registry.set_owner", caller, node)?;
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.entry(node).or_default().owner = new_owner;
        Ok(())
    }

    async fn set_subnode_owner(
        &self,
        caller: Address,
        parent: Node,
        label_hash: Node,
        owner: Address,
    ) -> Result<Node> {
        self.require_owner("registry.set_subnode_owner", caller, parent)?;
        let child = subnode_of_hash(parent, label_hash);
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.entry(child).or_default().owner = owner;
        Ok(child)
    }

    async fn set_resolver(&self, caller: Address, node: Node, resolver: Address) -> Result<()> {
        self.require_owner("registry.set_resolver", caller, node)?;
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.entry(node).or_default().resolver = resolver;
        Ok(())
    }
}

/// One record set in a [`ResolverSnapshot`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverEntry {
    pub node: Node,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<(String, String)>,
}

/// Serializable resolver state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResolverSnapshot {
    pub address: Address,
    pub records: Vec<ResolverEntry>,
}

#[derive(Clone, Debug, Default)]
struct ResolverRecord {
    addr: Option<Address>,
    texts: HashMap<String, String>,
}

/// In-memory [`Resolver`] that defers ownership checks to a registry.
pub struct InMemoryResolver {
    address: Address,
    registry: Arc<InMemoryRegistry>,
    records: RwLock<HashMap<Node, ResolverRecord>>,
}

impl InMemoryResolver {
    /// Create an empty resolver bound to `registry` for authorization.
    pub fn new(address: Address, registry: Arc<InMemoryRegistry>) -> Self {
        Self {
            address,
            registry,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a resolver from a snapshot.
    pub fn from_snapshot(snapshot: ResolverSnapshot, registry: Arc<InMemoryRegistry>) -> Self {
        let records = snapshot
            .records
            .into_iter()
            .map(|entry| {
                (
                    entry.node,
                    ResolverRecord {
                        addr: entry.addr,
                        texts: entry.texts.into_iter().collect(),
                    },
                )
            })
            .collect();
        Self {
            address: snapshot.address,
            registry,
            records: RwLock::new(records),
        }
    }

    /// Snapshot the current state.
    pub fn snapshot(&self) -> ResolverSnapshot {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = records
            .iter()
            .map(|(node, record)| {
                let mut texts: Vec<_> = record
                    .texts
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                texts.sort();
                ResolverEntry {
                    node: *node,
                    addr: record.addr,
                    texts,
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.node);
        ResolverSnapshot {
            address: self.address,
            records: entries,
        }
    }

    fn require_node_owner(&self, operation: &'static str, caller: Address, node: Node) -> Result<()> {
        if self.registry.owner(node) != caller {
            return Err(VendError::unauthorized(operation, caller));
        }
        Ok(())
    }
}

#[async_trait]
impl Resolver for InMemoryResolver {
    fn address(&self) -> Address {
        self.address
    }

    async fn set_addr(&self, caller: Address, node: Node, addr: Address) -> Result<()> {
        self.require_node_owner("resolver.set_addr", caller, node)?;
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.entry(node).or_default().addr = Some(addr);
        Ok(())
    }

    async fn set_text(&self, caller: Address, node: Node, key: &str, value: &str) -> Result<()> {
        self.require_node_owner("resolver.set_text", caller, node)?;
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records
            .entry(node)
            .or_default()
            .texts
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn addr_of(&self, node: Node) -> Result<Option<Address>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(&node).and_then(|r| r.addr))
    }

    async fn text_of(&self, node: Node, key: &str) -> Result<Option<String>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(&node).and_then(|r| r.texts.get(key).cloned()))
    }
}

/// Serializable token state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub address: Address,
    pub balances: Vec<(Address, u128)>,
    pub allowances: Vec<(Address, Address, u128)>,
}

/// In-memory [`TokenLedger`] with allowance-gated pulls.
pub struct InMemoryTokenLedger {
    address: Address,
    balances: RwLock<HashMap<Address, u128>>,
    allowances: RwLock<HashMap<(Address, Address), u128>>,
}

impl InMemoryTokenLedger {
    /// Create an empty token ledger at the given account identifier.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: RwLock::new(HashMap::new()),
            allowances: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a token ledger from a snapshot.
    pub fn from_snapshot(snapshot: TokenSnapshot) -> Self {
        Self {
            address: snapshot.address,
            balances: RwLock::new(snapshot.balances.into_iter().collect()),
            allowances: RwLock::new(
                snapshot
                    .allowances
                    .into_iter()
                    .map(|(owner, spender, amount)| ((owner, spender), amount))
                    .collect(),
            ),
        }
    }

    /// Snapshot the current state.
    pub fn snapshot(&self) -> TokenSnapshot {
        let balances = self.balances.read().unwrap_or_else(|e| e.into_inner());
        let allowances = self.allowances.read().unwrap_or_else(|e| e.into_inner());
        let mut balances: Vec<_> = balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(account, amount)| (*account, *amount))
            .collect();
        balances.sort();
        let mut allowances: Vec<_> = allowances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|((owner, spender), amount)| (*owner, *spender, *amount))
            .collect();
        allowances.sort();
        TokenSnapshot {
            address: self.address,
            balances,
            allowances,
        }
    }

    /// Faucet helper: credit `amount` units to `to` out of thin air.
    /// Saturates at `u128::MAX` rather than overflowing on wild input.
    pub fn mint(&self, to: Address, amount: u128) {
        let mut balances = self.balances.write().unwrap_or_else(|e| e.into_inner());
        let balance = balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Grant `spender` an allowance of `amount` units over `owner`'s balance.
    pub fn approve(&self, owner: Address, spender: Address, amount: u128) {
        let mut allowances = self.allowances.write().unwrap_or_else(|e| e.into_inner());
        allowances.insert((owner, spender), amount);
    }

    /// Remaining allowance of `spender` over `owner`'s balance.
    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        let allowances = self.allowances.read().unwrap_or_else(|e| e.into_inner());
        allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    fn move_balance(&self, from: Address, to: Address, amount: u128) -> Result<()> {
        let mut balances = self.balances.write().unwrap_or_else(|e| e.into_inner());
        let held = balances.get(&from).copied().unwrap_or(0);
        if held < amount {
            return Err(VendError::insufficient_funds(amount, held));
        }
        balances.insert(from, held - amount);
        *balances.entry(to).or_insert(0) += amount;
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, account: Address) -> Result<u128> {
        let balances = self.balances.read().unwrap_or_else(|e| e.into_inner());
        Ok(balances.get(&account).copied().unwrap_or(0))
    }

    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        {
            let mut allowances = self.allowances.write().unwrap_or_else(|e| e.into_inner());
            let granted = allowances.get(&(from, caller)).copied().unwrap_or(0);
            if granted < amount {
                return Err(VendError::payment(
                    amount,
                    format!("allowance is {} units", granted),
                ));
            }
            allowances.insert((from, caller), granted - amount);
        }
        self.move_balance(from, to, amount).map_err(|err| {
            // Failed pulls must not consume allowance; put it back.
            let mut allowances = self.allowances.write().unwrap_or_else(|e| e.into_inner());
            *allowances.entry((from, caller)).or_insert(0) += amount;
            match err {
                VendError::InsufficientFunds { requested, available } => VendError::payment(
                    requested,
                    format!("balance is {} units", available),
                ),
                other => other,
            }
        })
    }

    async fn transfer(&self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.move_balance(caller, to, amount)
    }
}
