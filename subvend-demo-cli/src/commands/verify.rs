//! Verify command - resolve a full name end to end

use std::path::Path;

use anyhow::Result;
use subvend_lib::ledger::{NameRegistry, Resolver};
use subvend_lib::namehash;

use crate::ui;

pub async fn run(storage_dir: &Path, name: &str, _verbose: bool) -> Result<()> {
    let (_, devnet) = super::open(storage_dir)?;
    let node = namehash(name);

    let owner = devnet.registry.owner_of(node).await?;
    let resolver = devnet.registry.resolver_of(node).await?;

    ui::header(&format!("'{}'", name));
    ui::key_value("Node", &node.to_string());
    ui::key_value("Owner", &devnet.describe(owner));
    ui::key_value("Resolver", &devnet.describe(resolver));

    if owner.is_zero() {
        ui::warning("Name is not registered");
        return Ok(());
    }

    if resolver == devnet.resolver.address() {
        match devnet.resolver.addr_of(node).await? {
            Some(addr) => ui::key_value("Address record", &devnet.describe(addr)),
            None => ui::info("No address record set"),
        }
        if let Some(url) = devnet.resolver.text_of(node, "url").await? {
            ui::key_value("url", &url);
        }
    } else {
        ui::warning("Name points at an unknown resolver; records not readable here");
    }
    Ok(())
}
