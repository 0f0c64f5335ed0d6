//! Self-service factory for vending machines.
//!
//! Any domain owner can deploy exactly one machine for their parent node.
//! The mapping is write-once: a second deployment for the same node fails
//! even if the first machine was later paused or abandoned.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::ledger::{NameRegistry, TokenLedger};
use crate::machine::SubdomainVendingMachine;
use crate::{Address, Node, Result, VendError};

/// Record of one successful deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendingMachineDeployed {
    pub parent_node: Node,
    pub vending_machine: Address,
    pub owner: Address,
    pub initial_price: u128,
}

/// Deploys and tracks [`SubdomainVendingMachine`]s, one per parent node.
pub struct VendingMachineFactory {
    registry: Arc<dyn NameRegistry>,
    default_resolver: Address,
    token: Arc<dyn TokenLedger>,
    machines: RwLock<HashMap<Node, Arc<SubdomainVendingMachine>>>,
    deployments: RwLock<Vec<VendingMachineDeployed>>,
}

impl fmt::Debug for VendingMachineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendingMachineFactory")
            .field("registry", &self.registry.address())
            .field("default_resolver", &self.default_resolver)
            .field("token", &self.token.address())
            .finish_non_exhaustive()
    }
}

impl VendingMachineFactory {
    /// Create a factory wired to the given collaborators.
    ///
    /// All three collaborator addresses must be non-zero.
    pub fn new(
        registry: Arc<dyn NameRegistry>,
        default_resolver: Address,
        token: Arc<dyn TokenLedger>,
    ) -> Result<Self> {
        if registry.address().is_zero() {
            return Err(VendError::zero_address("registry"));
        }
        if default_resolver.is_zero() {
            return Err(VendError::zero_address("default_resolver"));
        }
        if token.address().is_zero() {
            return Err(VendError::zero_address("token"));
        }
        Ok(Self {
            registry,
            default_resolver,
            token,
            machines: RwLock::new(HashMap::new()),
            deployments: RwLock::new(Vec::new()),
        })
    }

    /// Account identifier of the backing name registry.
    pub fn registry(&self) -> Address {
        self.registry.address()
    }

    /// Resolver handed to every machine this factory deploys.
    pub fn default_resolver(&self) -> Address {
        self.default_resolver
    }

    /// Account identifier of the payment token ledger.
    pub fn token(&self) -> Address {
        self.token.address()
    }

    /// Deploy a machine for `parent_node`, administered by `owner`.
    ///
    /// `owner` must be the registry-recorded owner of `parent_node` and the
    /// node must not already have a machine. The deployed machine starts
    /// unpaused at `initial_price`; handing it registry control of the
    /// parent node is a separate step the owner performs afterwards.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn deploy_vending_machine(
        &self,
        parent_node: Node,
        initial_price: u128,
        owner: Address,
    ) -> Result<Arc<SubdomainVendingMachine>> {
        if owner.is_zero() {
            return Err(VendError::zero_address("owner"));
        }
        let recorded = self.registry.owner_of(parent_node).await?;
        if recorded != owner {
            return Err(VendError::not_domain_owner(parent_node, recorded));
        }

        let machine = Arc::new(SubdomainVendingMachine::new(
            self.registry.clone(),
            self.default_resolver,
            self.token.clone(),
            parent_node,
            initial_price,
            owner,
        ));

        {
            let mut machines = self.machines.write().unwrap_or_else(|e| e.into_inner());
            if machines.contains_key(&parent_node) {
                return Err(VendError::already_deployed(parent_node));
            }
            machines.insert(parent_node, machine.clone());
        }

        let event = VendingMachineDeployed {
            parent_node,
            vending_machine: machine.address(),
            owner,
            initial_price,
        };
        #[cfg(feature = "tracing")]
        tracing::info!(
            parent_node = %event.parent_node,
            vending_machine = %event.vending_machine,
            owner = %event.owner,
            initial_price = event.initial_price,
            "vending machine deployed"
        );
        self.deployments
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);

        Ok(machine)
    }

    /// The machine deployed for `parent_node`, if any.
    pub fn get_vending_machine(&self, parent_node: Node) -> Option<Arc<SubdomainVendingMachine>> {
        let machines = self.machines.read().unwrap_or_else(|e| e.into_inner());
        machines.get(&parent_node).cloned()
    }

    /// Deployment log, oldest first.
    pub fn deployments(&self) -> Vec<VendingMachineDeployed> {
        self.deployments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Re-register a previously deployed machine from a saved record.
    ///
    /// Skips the ownership check: by the time a machine is persisted the
    /// parent node usually belongs to the machine itself, not to `admin`.
    /// No deployment event is recorded.
    pub fn restore(
        &self,
        parent_node: Node,
        price: u128,
        admin: Address,
    ) -> Result<Arc<SubdomainVendingMachine>> {
        if admin.is_zero() {
            return Err(VendError::zero_address("admin"));
        }
        let machine = Arc::new(SubdomainVendingMachine::new(
            self.registry.clone(),
            self.default_resolver,
            self.token.clone(),
            parent_node,
            price,
            admin,
        ));
        let mut machines = self.machines.write().unwrap_or_else(|e| e.into_inner());
        if machines.contains_key(&parent_node) {
            return Err(VendError::already_deployed(parent_node));
        }
        machines.insert(parent_node, machine.clone());
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::{InMemoryRegistry, InMemoryTokenLedger};
    use crate::node::namehash;
    use crate::VendErrorCode;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    struct Fixture {
        registry: Arc<InMemoryRegistry>,
        factory: VendingMachineFactory,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRegistry::new(addr(0x10)));
        let token = Arc::new(InMemoryTokenLedger::new(addr(0x20)));
        let factory = VendingMachineFactory::new(registry.clone(), addr(0x30), token).unwrap();
        Fixture { registry, factory }
    }

    #[test]
    fn test_rejects_zero_collaborators() {
        let registry = Arc::new(InMemoryRegistry::new(addr(0x10)));
        let token = Arc::new(InMemoryTokenLedger::new(addr(0x20)));
        let err = VendingMachineFactory::new(registry, Address::ZERO, token).unwrap_err();
        assert_eq!(err.code(), VendErrorCode::ZeroAddress);

        let zero_registry = Arc::new(InMemoryRegistry::new(Address::ZERO));
        let token = Arc::new(InMemoryTokenLedger::new(addr(0x20)));
        let err = VendingMachineFactory::new(zero_registry, addr(0x30), token).unwrap_err();
        assert_eq!(err.code(), VendErrorCode::ZeroAddress);
    }

    #[test]
    fn test_debug_shows_collaborator_addresses() {
        let fx = fixture();
        let rendered = format!("{:?}", fx.factory);
        assert!(rendered.contains("VendingMachineFactory"));
        assert!(rendered.contains(&addr(0x10).to_string()));
        assert!(rendered.contains(&addr(0x30).to_string()));
    }

    #[tokio::test]
    async fn test_deploy_requires_domain_ownership() {
        let fx = fixture();
        let parent = namehash("example.rsk");
        fx.registry.register_root(parent, addr(0xaa));

        let err = fx
            .factory
            .deploy_vending_machine(parent, 10, addr(0xbb))
            .await
            .unwrap_err();
        assert_eq!(err.code(), VendErrorCode::NotDomainOwner);

        let err = fx
            .factory
            .deploy_vending_machine(namehash("unowned.rsk"), 10, addr(0xaa))
            .await
            .unwrap_err();
        assert_eq!(err.code(), VendErrorCode::NotDomainOwner);
    }

    #[tokio::test]
    async fn test_deploy_rejects_zero_owner() {
        let fx = fixture();
        let err = fx
            .factory
            .deploy_vending_machine(namehash("example.rsk"), 10, Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.code(), VendErrorCode::ZeroAddress);
    }

    #[tokio::test]
    async fn test_deploy_records_machine_and_event() {
        let fx = fixture();
        let parent = namehash("example.rsk");
        fx.registry.register_root(parent, addr(0xaa));

        let machine = fx
            .factory
            .deploy_vending_machine(parent, 10, addr(0xaa))
            .await
            .unwrap();
        assert_eq!(machine.parent_node(), parent);
        assert_eq!(machine.resolver(), addr(0x30));
        assert_eq!(machine.price_per_subdomain(), 10);
        assert!(!machine.paused());

        let looked_up = fx.factory.get_vending_machine(parent).unwrap();
        assert_eq!(looked_up.address(), machine.address());

        let events = fx.factory.deployments();
        assert_eq!(
            events,
            vec![VendingMachineDeployed {
                parent_node: parent,
                vending_machine: machine.address(),
                owner: addr(0xaa),
                initial_price: 10,
            }]
        );
    }

    #[tokio::test]
    async fn test_mapping_is_write_once() {
        let fx = fixture();
        let parent = namehash("example.rsk");
        fx.registry.register_root(parent, addr(0xaa));
        let machine = fx
            .factory
            .deploy_vending_machine(parent, 10, addr(0xaa))
            .await
            .unwrap();

        // Even after the owner pauses or abandons the machine.
        machine.pause(addr(0xaa)).unwrap();
        let err = fx
            .factory
            .deploy_vending_machine(parent, 0, addr(0xaa))
            .await
            .unwrap_err();
        assert_eq!(err.code(), VendErrorCode::AlreadyDeployed);
        assert_eq!(fx.factory.deployments().len(), 1);
    }

    #[tokio::test]
    async fn test_two_parents_get_distinct_machines() {
        let fx = fixture();
        let a = namehash("a.rsk");
        let b = namehash("b.rsk");
        fx.registry.register_root(a, addr(0xaa));
        fx.registry.register_root(b, addr(0xbb));

        let ma = fx.factory.deploy_vending_machine(a, 1, addr(0xaa)).await.unwrap();
        let mb = fx.factory.deploy_vending_machine(b, 2, addr(0xbb)).await.unwrap();
        assert_ne!(ma.address(), mb.address());
        assert_eq!(fx.factory.deployments().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_rebuilds_same_address_without_event() {
        let fx = fixture();
        let parent = namehash("example.rsk");
        fx.registry.register_root(parent, addr(0xaa));
        let deployed = fx
            .factory
            .deploy_vending_machine(parent, 10, addr(0xaa))
            .await
            .unwrap();
        let deployed_address = deployed.address();

        // Fresh factory, as after a process restart.
        let fx2 = fixture();
        let restored = fx2.factory.restore(parent, 10, addr(0xaa)).unwrap();
        assert_eq!(restored.address(), deployed_address);
        assert!(fx2.factory.deployments().is_empty());
        assert!(fx2.factory.get_vending_machine(parent).is_some());
    }

    #[tokio::test]
    async fn test_unknown_parent_has_no_machine() {
        let fx = fixture();
        assert!(fx.factory.get_vending_machine(namehash("nobody.rsk")).is_none());
    }
}
