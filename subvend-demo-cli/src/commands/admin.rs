//! Admin commands - price, pause, withdrawal, and parent reclamation

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::NameRegistry;

use crate::ui;

pub async fn set_price(storage_dir: &Path, domain: &str, price: u128, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;

    machine.set_price(machine.admin(), price)?;
    store.save(&devnet.to_state())?;

    ui::success(&format!(
        "Price for '{}' set to {} units per subdomain",
        domain, price
    ));
    Ok(())
}

pub async fn pause(storage_dir: &Path, domain: &str, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;

    machine.pause(machine.admin())?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("'{}' paused; registrations are blocked", domain));
    Ok(())
}

pub async fn unpause(storage_dir: &Path, domain: &str, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;

    machine.unpause(machine.admin())?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("'{}' unpaused; registrations are open", domain));
    Ok(())
}

pub async fn withdraw(
    storage_dir: &Path,
    domain: &str,
    to: &str,
    amount: u128,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;
    let recipient = devnet.account(to)?;

    machine.withdraw(machine.admin(), recipient, amount).await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Withdrew {} units to '{}'", amount, to));
    Ok(())
}

/// Pause the machine, then hand the parent domain back to `to`. Pausing
/// first means no registration can race the handover.
pub async fn reclaim(
    storage_dir: &Path,
    domain: &str,
    to: &str,
    skip_confirm: bool,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;
    let recipient = devnet.account(to)?;

    if !skip_confirm {
        ui::warning("Reclaiming ends vending for this domain permanently");
        if !ui::confirm(&format!("Reclaim '{}' to '{}'?", domain, to), false)? {
            ui::info("Aborted");
            return Ok(());
        }
    }

    if !machine.paused() {
        machine.pause(machine.admin())?;
        ui::info("Machine paused before handover");
    }
    machine.reclaim_parent_node(machine.admin(), recipient).await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("'{}' reclaimed to '{}'", domain, to));
    ui::key_value(
        "Parent owner",
        &devnet.describe(devnet.registry.owner_of(machine.parent_node()).await?),
    );
    Ok(())
}
