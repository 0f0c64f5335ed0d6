//! Account commands - create and list devnet accounts

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::TokenLedger;

use crate::ui;

pub async fn create(storage_dir: &Path, name: &str, _verbose: bool) -> Result<()> {
    let (store, mut devnet) = super::open(storage_dir)?;
    let address = devnet.create_account(name)?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Created account '{}'", name));
    ui::key_value("Address", &address.to_string());
    Ok(())
}

pub async fn list(storage_dir: &Path, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    if devnet.accounts.is_empty() {
        ui::info("No accounts yet");
        ui::info("Run 'subvend-demo account new <name>' to create one");
        return Ok(());
    }

    ui::header("Accounts");
    for account in &devnet.accounts {
        let balance = devnet.token.balance_of(account.address).await?;
        println!("  {} - {} ({} units)", account.name, account.address, balance);
    }
    Ok(())
}

pub async fn show(storage_dir: &Path, name: &str, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    let address = devnet.account(name)?;
    let balance = devnet.token.balance_of(address).await?;

    ui::header(&format!("Account '{}'", name));
    ui::key_value("Address", &address.to_string());
    ui::key_value("Token balance", &format!("{} units", balance));

    let administered: Vec<_> = devnet
        .deployments
        .iter()
        .filter(|d| d.admin == address)
        .collect();
    if !administered.is_empty() {
        ui::header("Administered vending machines");
        for record in administered {
            println!("  {} - {}", record.domain, record.machine);
        }
    }
    Ok(())
}
