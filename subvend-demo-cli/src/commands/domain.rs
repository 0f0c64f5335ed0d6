//! Domain commands - bootstrap parent domains and inspect ownership

use std::path::Path;

use anyhow::{bail, Result};
use subvend_lib::ledger::NameRegistry;
use subvend_lib::namehash;

use crate::ui;

/// Record a parent domain to an account, standing in for the external
/// registrar sale that happens before any vending.
pub async fn register(storage_dir: &Path, domain: &str, owner: &str, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let address = devnet.account(owner)?;
    let node = namehash(domain);

    let current = devnet.registry.owner_of(node).await?;
    if !current.is_zero() {
        bail!(
            "'{}' is already owned by {}",
            domain,
            devnet.describe(current)
        );
    }
    devnet.registry.register_root(node, address);
    store.save(&devnet.to_state())?;

    ui::success(&format!("Registered '{}' to '{}'", domain, owner));
    ui::key_value("Node", &node.to_string());
    ui::key_value("Owner", &address.to_string());
    Ok(())
}

/// Show who controls a domain at the registry layer.
pub async fn check(storage_dir: &Path, domain: &str, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    let node = namehash(domain);
    let owner = devnet.registry.owner_of(node).await?;
    let resolver = devnet.registry.resolver_of(node).await?;

    ui::header(&format!("Domain '{}'", domain));
    ui::key_value("Node", &node.to_string());
    ui::key_value("Owner", &devnet.describe(owner));
    ui::key_value("Resolver", &devnet.describe(resolver));

    match devnet.deployment(domain) {
        Some(record) if owner == record.machine => {
            ui::info("The vending machine controls this domain; minting is live");
        }
        Some(_) => {
            ui::warning("A machine is deployed but does not own the domain yet");
            ui::info("Run 'subvend-demo transfer-parent' to hand it over");
        }
        None => {
            ui::info("No vending machine deployed for this domain");
        }
    }
    Ok(())
}

/// Hand registry ownership of the parent domain to its vending machine.
pub async fn transfer_parent(storage_dir: &Path, domain: &str, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let record = devnet
        .deployment(domain)
        .ok_or_else(|| anyhow::anyhow!("no vending machine deployed for '{}'", domain))?;

    let owner = devnet.registry.owner_of(record.parent_node).await?;
    if owner == record.machine {
        ui::info("The machine already owns this domain");
        return Ok(());
    }

    devnet
        .registry
        .set_owner(owner, record.parent_node, record.machine)
        .await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!(
        "'{}' handed to its vending machine; minting is live",
        domain
    ));
    Ok(())
}
