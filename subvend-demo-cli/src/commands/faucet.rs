//! Faucet command - mint devnet token units to an account

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::TokenLedger;

use crate::ui;

pub async fn run(storage_dir: &Path, account: &str, amount: u128, _verbose: bool) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let address = devnet.account(account)?;

    devnet.token.mint(address, amount);
    let balance = devnet.token.balance_of(address).await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Minted {} units to '{}'", amount, account));
    ui::key_value("New balance", &format!("{} units", balance));
    Ok(())
}
