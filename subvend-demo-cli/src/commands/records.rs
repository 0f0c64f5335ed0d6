//! Records commands - manage resolver records for owned names

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::Resolver;
use subvend_lib::{namehash, Address};

use crate::state::Devnet;
use crate::ui;

fn resolve_target(devnet: &Devnet, value: &str) -> Result<Address> {
    // Account name first, raw hex as a fallback.
    devnet
        .account(value)
        .or_else(|_| value.parse().map_err(Into::into))
}

pub async fn set_addr(
    storage_dir: &Path,
    name: &str,
    account: &str,
    to: Option<&str>,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let caller = devnet.account(account)?;
    let target = match to {
        Some(value) => resolve_target(&devnet, value)?,
        None => caller,
    };

    devnet
        .resolver
        .set_addr(caller, namehash(name), target)
        .await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Address record for '{}' set", name));
    ui::key_value("Points to", &devnet.describe(target));
    Ok(())
}

pub async fn set_text(
    storage_dir: &Path,
    name: &str,
    account: &str,
    key: &str,
    value: &str,
    _verbose: bool,
) -> Result<()> {
    let (store, devnet) = super::open(storage_dir)?;
    let caller = devnet.account(account)?;

    devnet
        .resolver
        .set_text(caller, namehash(name), key, value)
        .await?;
    store.save(&devnet.to_state())?;

    ui::success(&format!("Text record '{}' for '{}' set", key, name));
    Ok(())
}

pub async fn show(storage_dir: &Path, name: &str, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    let node = namehash(name);

    ui::header(&format!("Records for '{}'", name));
    match devnet.resolver.addr_of(node).await? {
        Some(addr) => ui::key_value("addr", &devnet.describe(addr)),
        None => ui::info("No address record"),
    }
    for key in ["url", "email", "description"] {
        if let Some(value) = devnet.resolver.text_of(node, key).await? {
            ui::key_value(key, &value);
        }
    }
    Ok(())
}
