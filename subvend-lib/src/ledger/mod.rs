//! Ledger collaborator seams.
//!
//! The vending machine and factory never own external state; they talk to the
//! name registry, resolver, and token ledger through the traits defined here.
//! [`memory`] ships in-memory reference implementations used by the tests and
//! the demo CLI.

pub mod memory;
mod traits;

pub use traits::{NameRegistry, Resolver, TokenLedger};
