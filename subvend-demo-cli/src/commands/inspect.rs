//! Inspect command - dump vending machine and registry state

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::{NameRegistry, TokenLedger};

use crate::ui;

pub async fn run(storage_dir: &Path, domain: &str, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    let machine = devnet.machine(domain)?;

    let parent_owner = devnet.registry.owner_of(machine.parent_node()).await?;
    let held = devnet.token.balance_of(machine.address()).await?;

    ui::header(&format!("Vending machine for '{}'", domain));
    ui::key_value("Machine", &machine.address().to_string());
    ui::key_value("Parent node", &machine.parent_node().to_string());
    ui::key_value("Administrator", &devnet.describe(machine.admin()));
    ui::key_value(
        "Price",
        &format!("{} units per subdomain", machine.price_per_subdomain()),
    );
    ui::key_value("Paused", if machine.paused() { "yes" } else { "no" });
    ui::key_value("Held balance", &format!("{} units", held));
    ui::separator();
    ui::key_value("Registry", &machine.registry().to_string());
    ui::key_value("Resolver", &machine.resolver().to_string());
    ui::key_value("Token", &machine.token().to_string());
    ui::key_value("Parent owner", &devnet.describe(parent_owner));

    if parent_owner != machine.address() {
        ui::warning("The machine does not control the parent; register calls will fail");
    }
    Ok(())
}
