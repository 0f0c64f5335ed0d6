//! File-based devnet state.
//!
//! The demo runs the whole vending system in-process against the in-memory
//! ledger and persists everything as a single JSON file between invocations.
//!
//! # Security Warning
//!
//! This storage is **NOT suitable for production use**: no encryption at
//! rest, no atomicity guarantees, no concurrent access protection. It exists
//! so the demo commands can be run one at a time against a lasting devnet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use subvend_lib::ledger::memory::{
    InMemoryRegistry, InMemoryResolver, InMemoryTokenLedger, RegistrySnapshot, ResolverSnapshot,
    TokenSnapshot,
};
use subvend_lib::node::derived_address;
use subvend_lib::{namehash, Address, Node, SubdomainVendingMachine, VendingMachineFactory};

/// A named devnet account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: String,
    pub address: Address,
}

/// One deployed vending machine, as persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub domain: String,
    pub parent_node: Node,
    pub machine: Address,
    pub admin: Address,
    pub price: u128,
    pub paused: bool,
}

/// Everything the devnet remembers between invocations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DevState {
    pub registry: RegistrySnapshot,
    pub resolver: ResolverSnapshot,
    pub token: TokenSnapshot,
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
}

impl DevState {
    /// Fresh devnet with deterministic contract addresses.
    pub fn new() -> Self {
        Self {
            registry: RegistrySnapshot {
                address: derived_address("devnet:contract", b"registry"),
                records: Vec::new(),
            },
            resolver: ResolverSnapshot {
                address: derived_address("devnet:contract", b"resolver"),
                records: Vec::new(),
            },
            token: TokenSnapshot {
                address: derived_address("devnet:contract", b"token"),
                balances: Vec::new(),
                allowances: Vec::new(),
            },
            accounts: Vec::new(),
            deployments: Vec::new(),
        }
    }
}

/// Loads and saves [`DevState`] as pretty JSON.
pub struct DevStore {
    storage_dir: PathBuf,
}

impl DevStore {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.storage_dir.join("devnet.json")
    }

    /// Load saved state, or a fresh devnet when none exists.
    pub fn load_or_init(&self) -> Result<DevState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(DevState::new());
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let state = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(state)
    }

    pub fn save(&self, state: &DevState) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)
            .context("Failed to create storage directory")?;
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(self.state_path(), json)?;
        tracing::debug!(path = %self.state_path().display(), "devnet state saved");
        Ok(())
    }
}

/// The running devnet: live ledger pieces plus the bookkeeping records.
pub struct Devnet {
    pub registry: Arc<InMemoryRegistry>,
    pub resolver: Arc<InMemoryResolver>,
    pub token: Arc<InMemoryTokenLedger>,
    pub factory: VendingMachineFactory,
    pub accounts: Vec<AccountRecord>,
    pub deployments: Vec<DeploymentRecord>,
}

impl Devnet {
    /// Rebuild the runtime from persisted state, restoring every deployed
    /// machine at its recorded address.
    pub fn from_state(state: DevState) -> Result<Self> {
        let resolver_address = state.resolver.address;
        let registry = Arc::new(InMemoryRegistry::from_snapshot(state.registry));
        let resolver = Arc::new(InMemoryResolver::from_snapshot(
            state.resolver,
            registry.clone(),
        ));
        let token = Arc::new(InMemoryTokenLedger::from_snapshot(state.token));
        let factory =
            VendingMachineFactory::new(registry.clone(), resolver_address, token.clone())?;

        for record in &state.deployments {
            let machine = factory.restore(record.parent_node, record.price, record.admin)?;
            if machine.address() != record.machine {
                bail!(
                    "deployment record for '{}' does not match its machine address",
                    record.domain
                );
            }
            if record.paused {
                machine.pause(record.admin)?;
            }
        }

        Ok(Self {
            registry,
            resolver,
            token,
            factory,
            accounts: state.accounts,
            deployments: state.deployments,
        })
    }

    /// Snapshot the runtime back into persistable state. Machine price and
    /// pause flag are read from the live machines so admin changes stick.
    pub fn to_state(&self) -> DevState {
        let deployments = self
            .deployments
            .iter()
            .map(|record| {
                let mut record = record.clone();
                if let Some(machine) = self.factory.get_vending_machine(record.parent_node) {
                    record.price = machine.price_per_subdomain();
                    record.paused = machine.paused();
                }
                record
            })
            .collect();
        DevState {
            registry: self.registry.snapshot(),
            resolver: self.resolver.snapshot(),
            token: self.token.snapshot(),
            accounts: self.accounts.clone(),
            deployments,
        }
    }

    /// Create a named account with a deterministic address.
    pub fn create_account(&mut self, name: &str) -> Result<Address> {
        if name.is_empty() {
            bail!("account name must not be empty");
        }
        if self.accounts.iter().any(|a| a.name == name) {
            bail!("account '{}' already exists", name);
        }
        let address = derived_address("devnet:account", name.as_bytes());
        self.accounts.push(AccountRecord {
            name: name.to_string(),
            address,
        });
        Ok(address)
    }

    /// Resolve an account name to its address.
    pub fn account(&self, name: &str) -> Result<Address> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.address)
            .with_context(|| {
                format!(
                    "unknown account '{}'. Run 'subvend-demo account new {}' first",
                    name, name
                )
            })
    }

    /// Display name for an address, falling back to hex.
    pub fn describe(&self, address: Address) -> String {
        if address.is_zero() {
            return "(none)".to_string();
        }
        for account in &self.accounts {
            if account.address == address {
                return format!("{} ({})", account.name, address);
            }
        }
        for record in &self.deployments {
            if record.machine == address {
                return format!("machine for '{}' ({})", record.domain, address);
            }
        }
        address.to_string()
    }

    /// The deployment record for a domain, if one exists.
    pub fn deployment(&self, domain: &str) -> Option<&DeploymentRecord> {
        self.deployments.iter().find(|d| d.domain == domain)
    }

    /// The live machine for a domain.
    pub fn machine(&self, domain: &str) -> Result<Arc<SubdomainVendingMachine>> {
        let record = self.deployment(domain).with_context(|| {
            format!(
                "no vending machine deployed for '{}'. Run 'subvend-demo deploy' first",
                domain
            )
        })?;
        self.factory
            .get_vending_machine(record.parent_node)
            .with_context(|| format!("machine for '{}' missing from factory", domain))
    }

    /// Deploy a machine for `domain` owned by the named account.
    pub async fn deploy(&mut self, domain: &str, price: u128, owner: &str) -> Result<Address> {
        let admin = self.account(owner)?;
        let parent_node = namehash(domain);
        let machine = self
            .factory
            .deploy_vending_machine(parent_node, price, admin)
            .await?;
        self.deployments.push(DeploymentRecord {
            domain: domain.to_string(),
            parent_node,
            machine: machine.address(),
            admin,
            price,
            paused: false,
        });
        Ok(machine.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subvend_lib::ledger::{NameRegistry, TokenLedger};

    #[tokio::test]
    async fn test_state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = DevStore::new(dir.path());

        let mut devnet = Devnet::from_state(store.load_or_init().unwrap()).unwrap();
        let owner = devnet.create_account("owner").unwrap();
        let user = devnet.create_account("user").unwrap();
        devnet.registry.register_root(namehash("example.rsk"), owner);
        devnet.token.mint(user, 50);
        let machine_addr = devnet.deploy("example.rsk", 10, "owner").await.unwrap();
        devnet
            .registry
            .set_owner(owner, namehash("example.rsk"), machine_addr)
            .await
            .unwrap();
        devnet.machine("example.rsk").unwrap().pause(owner).unwrap();
        store.save(&devnet.to_state()).unwrap();

        let devnet = Devnet::from_state(store.load_or_init().unwrap()).unwrap();
        assert_eq!(devnet.account("owner").unwrap(), owner);
        let machine = devnet.machine("example.rsk").unwrap();
        assert_eq!(machine.address(), machine_addr);
        assert_eq!(machine.price_per_subdomain(), 10);
        assert!(machine.paused());
        assert_eq!(devnet.token.balance_of(user).await.unwrap(), 50);

        // The restored machine still controls the parent and can mint.
        machine.unpause(owner).unwrap();
        devnet.token.approve(user, machine_addr, 10);
        machine.register(user, "alice", user).await.unwrap();
        store.save(&devnet.to_state()).unwrap();
    }

    #[test]
    fn test_fresh_state_has_nonzero_contracts() {
        let state = DevState::new();
        assert!(!state.registry.address.is_zero());
        assert!(!state.resolver.address.is_zero());
        assert!(!state.token.address.is_zero());
        assert_ne!(state.registry.address, state.token.address);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut devnet = Devnet::from_state(DevState::new()).unwrap();
        devnet.create_account("alice").unwrap();
        assert!(devnet.create_account("alice").is_err());
        assert!(devnet.create_account("").is_err());
    }
}
