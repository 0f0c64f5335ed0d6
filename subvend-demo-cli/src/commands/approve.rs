//! Approve command - grant a vending machine a token allowance

use std::path::Path;

use anyhow::Result;

use crate::ui;

pub async fn run(
    storage_dir: &Path,
    account: &str,
    domain: &str,
    amount: u128,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let address = devnet.account(account)?;
    let machine = devnet.machine(domain)?;

    devnet.token.approve(address, machine.address(), amount);
    store.save(&devnet.to_state())?;

    ui::success(&format!(
        "'{}' approved {} units for the '{}' machine",
        account, amount, domain
    ));
    ui::key_value("Spender", &machine.address().to_string());
    Ok(())
}
