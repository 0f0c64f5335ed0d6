//! Deploy command - create a vending machine through the factory

use std::path::Path;

use anyhow::Result;

use crate::ui;

pub async fn run(
    storage_dir: &Path,
    domain: &str,
    price: u128,
    owner: &str,
    _verbose: bool,
) -> Result<()> {
    let (store, mut devnet) = super::open(storage_dir)?;
    let machine = devnet.deploy(domain, price, owner).await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Vending machine deployed for '{}'", domain));
    ui::key_value("Machine", &machine.to_string());
    ui::key_value("Price", &format!("{} units per subdomain", price));
    ui::key_value("Administrator", owner);
    ui::separator();
    ui::info("The machine does not own the domain yet");
    ui::info(&format!(
        "Run 'subvend-demo transfer-parent {}' to start vending",
        domain
    ));
    Ok(())
}
