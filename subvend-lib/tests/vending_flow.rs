//! End-to-end vending flows against the in-memory ledger.

use std::sync::Arc;

use subvend_lib::ledger::memory::{InMemoryRegistry, InMemoryResolver, InMemoryTokenLedger};
use subvend_lib::ledger::{NameRegistry, Resolver, TokenLedger};
use subvend_lib::{namehash, Address, VendErrorCode, VendingMachineFactory};

fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

struct Devnet {
    registry: Arc<InMemoryRegistry>,
    resolver: Arc<InMemoryResolver>,
    token: Arc<InMemoryTokenLedger>,
    factory: VendingMachineFactory,
}

fn devnet() -> Devnet {
    let registry = Arc::new(InMemoryRegistry::new(addr(0x10)));
    let resolver = Arc::new(InMemoryResolver::new(addr(0x30), registry.clone()));
    let token = Arc::new(InMemoryTokenLedger::new(addr(0x20)));
    let factory =
        VendingMachineFactory::new(registry.clone(), resolver.address(), token.clone()).unwrap();
    Devnet {
        registry,
        resolver,
        token,
        factory,
    }
}

#[tokio::test]
async fn test_full_vending_lifecycle() {
    let net = devnet();
    let owner = addr(0xaa);
    let user = addr(0xbb);
    let parent = namehash("example.rsk");
    net.registry.register_root(parent, owner);
    net.token.mint(user, 10);

    // Owner deploys at price 10 and hands the parent over.
    let machine = net
        .factory
        .deploy_vending_machine(parent, 10, owner)
        .await
        .unwrap();
    net.registry
        .set_owner(owner, parent, machine.address())
        .await
        .unwrap();

    // User approves and mints "alice".
    net.token.approve(user, machine.address(), 10);
    let subnode = machine.register(user, "alice", user).await.unwrap();

    assert_eq!(net.registry.owner_of(subnode).await.unwrap(), user);
    assert_eq!(
        net.registry.resolver_of(subnode).await.unwrap(),
        machine.resolver()
    );
    assert_eq!(net.token.balance_of(machine.address()).await.unwrap(), 10);
    assert_eq!(net.token.balance_of(user).await.unwrap(), 0);

    // Owner drains the proceeds.
    machine.withdraw(owner, owner, 10).await.unwrap();
    assert_eq!(net.token.balance_of(machine.address()).await.unwrap(), 0);
    assert_eq!(net.token.balance_of(owner).await.unwrap(), 10);
}

#[tokio::test]
async fn test_subdomain_owner_controls_resolver_records() {
    let net = devnet();
    let owner = addr(0xaa);
    let user = addr(0xbb);
    let parent = namehash("example.rsk");
    net.registry.register_root(parent, owner);

    let machine = net
        .factory
        .deploy_vending_machine(parent, 0, owner)
        .await
        .unwrap();
    net.registry
        .set_owner(owner, parent, machine.address())
        .await
        .unwrap();
    let subnode = machine.register(user, "alice", user).await.unwrap();

    // The recipient, not the machine, now edits records.
    net.resolver.set_addr(user, subnode, user).await.unwrap();
    net.resolver
        .set_text(user, subnode, "url", "https://alice.example")
        .await
        .unwrap();
    assert_eq!(net.resolver.addr_of(subnode).await.unwrap(), Some(user));

    let err = net
        .resolver
        .set_addr(machine.address(), subnode, machine.address())
        .await
        .unwrap_err();
    assert_eq!(err.code(), VendErrorCode::Unauthorized);
}

#[tokio::test]
async fn test_concurrent_same_label_has_one_winner() {
    let net = devnet();
    let owner = addr(0xaa);
    let parent = namehash("race.rsk");
    net.registry.register_root(parent, owner);

    let machine = net
        .factory
        .deploy_vending_machine(parent, 0, owner)
        .await
        .unwrap();
    net.registry
        .set_owner(owner, parent, machine.address())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let machine = machine.clone();
        let contender = addr(0x40 + i);
        handles.push(tokio::spawn(async move {
            machine.register(contender, "alice", contender).await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => {
                assert_eq!(err.code(), VendErrorCode::AlreadyRegistered);
                losers += 1;
            }
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 7);
}

#[tokio::test]
async fn test_reclaim_ends_vending_but_keeps_minted_names() {
    let net = devnet();
    let owner = addr(0xaa);
    let user = addr(0xbb);
    let parent = namehash("example.rsk");
    net.registry.register_root(parent, owner);

    let machine = net
        .factory
        .deploy_vending_machine(parent, 0, owner)
        .await
        .unwrap();
    net.registry
        .set_owner(owner, parent, machine.address())
        .await
        .unwrap();
    let subnode = machine.register(user, "alice", user).await.unwrap();

    machine.pause(owner).unwrap();
    machine.reclaim_parent_node(owner, owner).await.unwrap();
    machine.unpause(owner).unwrap();

    // Vending is over even though the machine is unpaused again.
    let err = machine.register(user, "bob", user).await.unwrap_err();
    assert_eq!(err.code(), VendErrorCode::Unauthorized);

    // Already-minted subdomains are untouched.
    assert_eq!(net.registry.owner_of(subnode).await.unwrap(), user);
    assert_eq!(net.registry.owner_of(parent).await.unwrap(), owner);
}

#[tokio::test]
async fn test_snapshot_rehydration_preserves_machine_address() {
    let net = devnet();
    let owner = addr(0xaa);
    let parent = namehash("persist.rsk");
    net.registry.register_root(parent, owner);

    let machine = net
        .factory
        .deploy_vending_machine(parent, 5, owner)
        .await
        .unwrap();
    net.registry
        .set_owner(owner, parent, machine.address())
        .await
        .unwrap();

    let registry_snap = net.registry.snapshot();
    let token_snap = net.token.snapshot();

    // Restart: rebuild ledger state, then restore the machine from its
    // deployment record.
    let registry = Arc::new(InMemoryRegistry::from_snapshot(registry_snap));
    let token = Arc::new(InMemoryTokenLedger::from_snapshot(token_snap));
    let factory = VendingMachineFactory::new(registry.clone(), addr(0x30), token).unwrap();
    let restored = factory.restore(parent, 5, owner).unwrap();

    assert_eq!(restored.address(), machine.address());
    assert_eq!(
        registry.owner_of(parent).await.unwrap(),
        restored.address()
    );

    // The restored machine can still mint.
    let user = addr(0xbb);
    restored.register(user, "carol", user).await.unwrap();
}
