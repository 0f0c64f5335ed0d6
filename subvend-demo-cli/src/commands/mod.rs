//! CLI command implementations

pub mod account;
pub mod admin;
pub mod approve;
pub mod deploy;
pub mod domain;
pub mod faucet;
pub mod inspect;
pub mod mint;
pub mod records;
pub mod verify;

use std::path::Path;

use anyhow::Result;

use crate::state::{DevStore, Devnet};

/// Open the persisted devnet for this storage directory.
pub fn open(storage_dir: &Path) -> Result<(DevStore, Devnet)> {
    let store = DevStore::new(storage_dir);
    let devnet = Devnet::from_state(store.load_or_init()?)?;
    Ok((store, devnet))
}
