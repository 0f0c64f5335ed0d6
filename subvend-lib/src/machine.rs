//! Per-domain subdomain vending machine.
//!
//! One instance controls one parent node. While the machine owns the parent
//! in the name registry it can mint child nodes on demand, charging the
//! configured price in token units per registration. The administrator set at
//! construction is the only account allowed to change the price, toggle the
//! pause flag, withdraw accumulated funds, or hand the parent node back.

use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use crate::ledger::{NameRegistry, TokenLedger};
use crate::node::{self, derived_address};
use crate::{Address, Node, Result, VendError, VendErrorCode};

/// Vends subdomains under a single parent node.
///
/// Collaborators are injected as trait objects; the resolver is held by
/// address only, since registration merely points the registry's resolver
/// slot at it and never writes resolver records itself.
pub struct SubdomainVendingMachine {
    address: Address,
    admin: Address,
    parent_node: Node,
    resolver: Address,
    registry: Arc<dyn NameRegistry>,
    token: Arc<dyn TokenLedger>,
    price: RwLock<u128>,
    paused: RwLock<bool>,
    // Serializes whole registrations so that two concurrent calls for the
    // same label resolve to exactly one winner.
    register_gate: Mutex<()>,
}

impl fmt::Debug for SubdomainVendingMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubdomainVendingMachine")
            .field("address", &self.address)
            .field("parent_node", &self.parent_node)
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl SubdomainVendingMachine {
    /// Create an unpaused machine for `parent_node` administered by `admin`.
    ///
    /// The machine's own account identifier is derived deterministically from
    /// the parent node and the administrator, so rebuilding the same machine
    /// from a deployment record yields the same address.
    pub fn new(
        registry: Arc<dyn NameRegistry>,
        resolver: Address,
        token: Arc<dyn TokenLedger>,
        parent_node: Node,
        initial_price: u128,
        admin: Address,
    ) -> Self {
        let mut material = Vec::with_capacity(52);
        material.extend_from_slice(parent_node.as_bytes());
        material.extend_from_slice(admin.as_bytes());
        Self {
            address: derived_address("vending-machine", &material),
            admin,
            parent_node,
            resolver,
            registry,
            token,
            price: RwLock::new(initial_price),
            paused: RwLock::new(false),
            register_gate: Mutex::new(()),
        }
    }

    /// The machine's own account identifier.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The administrator account.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// The parent node this machine vends under.
    pub fn parent_node(&self) -> Node {
        self.parent_node
    }

    /// The resolver newly minted subnodes are pointed at.
    pub fn resolver(&self) -> Address {
        self.resolver
    }

    /// Account identifier of the backing name registry.
    pub fn registry(&self) -> Address {
        self.registry.address()
    }

    /// Account identifier of the payment token ledger.
    pub fn token(&self) -> Address {
        self.token.address()
    }

    /// Current price in token units per registration.
    pub fn price_per_subdomain(&self) -> u128 {
        *self.price.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether registrations are currently blocked.
    pub fn paused(&self) -> bool {
        *self.paused.read().unwrap_or_else(|e| e.into_inner())
    }

    /// The node `label` maps to under this machine's parent.
    pub fn subnode_of(&self, label: &str) -> Node {
        node::subnode_of(self.parent_node, label)
    }

    /// Whether `label` can still be registered (no current owner).
    pub async fn is_available(&self, label: &str) -> Result<bool> {
        let owner = self.registry.owner_of(self.subnode_of(label)).await?;
        Ok(owner.is_zero())
    }

    /// Register `label` to `recipient`, pulling payment from `caller`.
    ///
    /// The payment pull happens before any registry write, so a failed pull
    /// leaves the registry untouched. The subnode is minted to the machine
    /// first, its resolver slot is set, and only then is ownership handed to
    /// `recipient`, so the recipient never holds a half-configured node.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self), fields(parent = %self.parent_node))
    )]
    pub async fn register(&self, caller: Address, label: &str, recipient: Address) -> Result<Node> {
        let _guard = self.register_gate.lock().await;

        if self.paused() {
            return Err(VendError::Paused);
        }
        if label.is_empty() {
            return Err(VendError::invalid_label("label must not be empty"));
        }
        let subnode = self.subnode_of(label);
        let current_owner = self.registry.owner_of(subnode).await?;
        if !current_owner.is_zero() {
            return Err(VendError::already_registered(label, current_owner));
        }

        let price = self.price_per_subdomain();
        if price > 0 {
            self.token
                .transfer_from(self.address, caller, self.address, price)
                .await
                .map_err(|err| match err.code() {
                    VendErrorCode::Payment => err,
                    _ => VendError::payment(price, err.message()),
                })?;
        }

        match self.mint(label, recipient).await {
            Ok(subnode) => Ok(subnode),
            Err(err) => {
                // Registry write failed after the pull; hand the payment back
                // so the caller is not left out of pocket.
                if price > 0 {
                    if let Err(refund_err) = self.token.transfer(self.address, caller, price).await
                    {
                        return Err(VendError::payment(
                            price,
                            format!(
                                "{}; refund failed: {}",
                                err.message(),
                                refund_err.message()
                            ),
                        ));
                    }
                }
                Err(err)
            }
        }
    }

    async fn mint(&self, label: &str, recipient: Address) -> Result<Node> {
        let subnode = self
            .registry
            .set_subnode_owner(
                self.address,
                self.parent_node,
                node::label_hash(label),
                self.address,
            )
            .await?;
        self.registry
            .set_resolver(self.address, subnode, self.resolver)
            .await?;
        self.registry
            .set_owner(self.address, subnode, recipient)
            .await?;
        Ok(subnode)
    }

    /// Set the price for future registrations. Administrator only.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn set_price(&self, caller: Address, new_price: u128) -> Result<()> {
        self.require_admin("set_price", caller)?;
        *self.price.write().unwrap_or_else(|e| e.into_inner()) = new_price;
        Ok(())
    }

    /// Block registrations. Administrator only; pausing an already-paused
    /// machine succeeds without effect.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn pause(&self, caller: Address) -> Result<()> {
        self.require_admin("pause", caller)?;
        *self.paused.write().unwrap_or_else(|e| e.into_inner()) = true;
        Ok(())
    }

    /// Re-enable registrations. Administrator only; unpausing an active
    /// machine succeeds without effect.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn unpause(&self, caller: Address) -> Result<()> {
        self.require_admin("unpause", caller)?;
        *self.paused.write().unwrap_or_else(|e| e.into_inner()) = false;
        Ok(())
    }

    /// Move `amount` accumulated token units to `to`. Administrator only.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn withdraw(&self, caller: Address, to: Address, amount: u128) -> Result<()> {
        self.require_admin("withdraw", caller)?;
        let held = self.token.balance_of(self.address).await?;
        if held < amount {
            return Err(VendError::insufficient_funds(amount, held));
        }
        self.token.transfer(self.address, to, amount).await
    }

    /// Hand registry ownership of the parent node to `to`. Administrator
    /// only. Works regardless of the pause flag; callers typically pause
    /// first so no registration races the handover. After this the machine
    /// can no longer mint.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn reclaim_parent_node(&self, caller: Address, to: Address) -> Result<()> {
        self.require_admin("reclaim_parent_node", caller)?;
        self.registry.set_owner(self.address, self.parent_node, to).await
    }

    fn require_admin(&self, operation: &'static str, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(VendError::unauthorized(operation, caller));
        }
        Ok(())
    }
}
