//! Mint command - register a subdomain through a vending machine

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::NameRegistry;

use crate::ui;

pub async fn run(
    storage_dir: &Path,
    domain: &str,
    label: &str,
    account: &str,
    recipient: Option<&str>,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let caller = devnet.account(account)?;
    let recipient = match recipient {
        Some(name) => devnet.account(name)?,
        None => caller,
    };
    let machine = devnet.machine(domain)?;

    let price = machine.price_per_subdomain();
    if price > 0 {
        ui::info(&format!("Price is {} units, paid by '{}'", price, account));
    }

    let subnode = machine.register(caller, label, recipient).await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Registered '{}.{}'", label, domain));
    ui::key_value("Node", &subnode.to_string());
    ui::key_value(
        "Owner",
        &devnet.describe(devnet.registry.owner_of(subnode).await?),
    );
    ui::key_value(
        "Resolver",
        &devnet.describe(devnet.registry.resolver_of(subnode).await?),
    );
    Ok(())
}
