//! Subvend Demo CLI
//!
//! Command-line devnet for exercising the subdomain vending system end to
//! end: bootstrap accounts and parent domains, deploy vending machines,
//! mint subdomains, and administer deployed machines. State persists as a
//! JSON file between invocations.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod state;
mod ui;

#[derive(Parser)]
#[command(name = "subvend-demo")]
#[command(about = "Subvend Demo CLI - Run a subdomain vending devnet", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom storage directory (can also be set via SUBVEND_DEMO_DIR env var)
    #[arg(long, global = true)]
    storage_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage devnet accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Mint devnet token units to an account
    Faucet {
        /// Account name
        account: String,

        /// Amount in token units
        amount: u128,
    },

    /// Bootstrap a parent domain to an account
    RegisterDomain {
        /// Full domain name (e.g. example.rsk)
        domain: String,

        /// Owning account name
        #[arg(short, long)]
        owner: String,
    },

    /// Deploy a vending machine for a parent domain
    Deploy {
        /// Full domain name
        domain: String,

        /// Price in token units per subdomain
        #[arg(short, long, default_value = "0")]
        price: u128,

        /// Domain owner account name
        #[arg(short, long)]
        owner: String,
    },

    /// Hand registry ownership of a domain to its vending machine
    TransferParent {
        /// Full domain name
        domain: String,
    },

    /// Grant a vending machine a token allowance
    Approve {
        /// Paying account name
        account: String,

        /// Domain whose machine gets the allowance
        domain: String,

        /// Allowance in token units
        amount: u128,
    },

    /// Register a subdomain through a vending machine
    Mint {
        /// Parent domain name
        domain: String,

        /// Subdomain label (e.g. alice)
        label: String,

        /// Paying account name
        #[arg(short, long)]
        account: String,

        /// Recipient account name (defaults to the payer)
        #[arg(short, long)]
        recipient: Option<String>,
    },

    /// Dump vending machine and registry state for a domain
    Inspect {
        /// Full domain name
        domain: String,
    },

    /// Show who controls a domain at the registry layer
    Check {
        /// Full domain name
        domain: String,
    },

    /// Resolve a full name end to end
    Verify {
        /// Full name (e.g. alice.example.rsk)
        name: String,
    },

    /// Manage resolver records for owned names
    Records {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Administer a deployed vending machine
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new named account
    New {
        /// Account name
        name: String,
    },

    /// List all accounts with balances
    List,

    /// Show one account in detail
    Show {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand)]
enum RecordAction {
    /// Set the address record for a name
    SetAddr {
        /// Full name
        name: String,

        /// Owning account (signs the change)
        #[arg(short, long)]
        account: String,

        /// Target account name or 0x address (defaults to the owner)
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Set a text record for a name
    SetText {
        /// Full name
        name: String,

        /// Owning account (signs the change)
        #[arg(short, long)]
        account: String,

        /// Record key (e.g. url)
        key: String,

        /// Record value
        value: String,
    },

    /// Show resolver records for a name
    Show {
        /// Full name
        name: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Set the price per subdomain
    SetPrice {
        /// Full domain name
        domain: String,

        /// New price in token units
        price: u128,
    },

    /// Block registrations
    Pause {
        /// Full domain name
        domain: String,
    },

    /// Re-enable registrations
    Unpause {
        /// Full domain name
        domain: String,
    },

    /// Withdraw accumulated token units
    Withdraw {
        /// Full domain name
        domain: String,

        /// Receiving account name
        #[arg(short, long)]
        to: String,

        /// Amount in token units
        amount: u128,
    },

    /// Pause and hand the parent domain back to an account
    Reclaim {
        /// Full domain name
        domain: String,

        /// Receiving account name
        #[arg(short, long)]
        to: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("subvend_demo_cli=debug,subvend_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("subvend_demo_cli=info,subvend_lib=warn")
            .init();
    }

    // Setup storage directory
    let storage_dir = if let Some(dir) = cli.storage_dir {
        std::path::PathBuf::from(dir)
    } else if let Ok(dir) = std::env::var("SUBVEND_DEMO_DIR") {
        std::path::PathBuf::from(dir)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("subvend-demo")
    };

    // Dispatch commands
    match cli.command {
        Commands::Account { action } => match action {
            AccountAction::New { name } => {
                commands::account::create(&storage_dir, &name, cli.verbose).await?;
            }
            AccountAction::List => {
                commands::account::list(&storage_dir, cli.verbose).await?;
            }
            AccountAction::Show { name } => {
                commands::account::show(&storage_dir, &name, cli.verbose).await?;
            }
        },
        Commands::Faucet { account, amount } => {
            commands::faucet::run(&storage_dir, &account, amount, cli.verbose).await?;
        }
        Commands::RegisterDomain { domain, owner } => {
            commands::domain::register(&storage_dir, &domain, &owner, cli.verbose).await?;
        }
        Commands::Deploy {
            domain,
            price,
            owner,
        } => {
            commands::deploy::run(&storage_dir, &domain, price, &owner, cli.verbose).await?;
        }
        Commands::TransferParent { domain } => {
            commands::domain::transfer_parent(&storage_dir, &domain, cli.verbose).await?;
        }
        Commands::Approve {
            account,
            domain,
            amount,
        } => {
            commands::approve::run(&storage_dir, &account, &domain, amount, cli.verbose).await?;
        }
        Commands::Mint {
            domain,
            label,
            account,
            recipient,
        } => {
            commands::mint::run(
                &storage_dir,
                &domain,
                &label,
                &account,
                recipient.as_deref(),
                cli.verbose,
            )
            .await?;
        }
        Commands::Inspect { domain } => {
            commands::inspect::run(&storage_dir, &domain, cli.verbose).await?;
        }
        Commands::Check { domain } => {
            commands::domain::check(&storage_dir, &domain, cli.verbose).await?;
        }
        Commands::Verify { name } => {
            commands::verify::run(&storage_dir, &name, cli.verbose).await?;
        }
        Commands::Records { action } => match action {
            RecordAction::SetAddr { name, account, to } => {
                commands::records::set_addr(
                    &storage_dir,
                    &name,
                    &account,
                    to.as_deref(),
                    cli.verbose,
                )
                .await?;
            }
            RecordAction::SetText {
                name,
                account,
                key,
                value,
            } => {
                commands::records::set_text(
                    &storage_dir,
                    &name,
                    &account,
                    &key,
                    &value,
                    cli.verbose,
                )
                .await?;
            }
            RecordAction::Show { name } => {
                commands::records::show(&storage_dir, &name, cli.verbose).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::SetPrice { domain, price } => {
                commands::admin::set_price(&storage_dir, &domain, price, cli.verbose).await?;
            }
            AdminAction::Pause { domain } => {
                commands::admin::pause(&storage_dir, &domain, cli.verbose).await?;
            }
            AdminAction::Unpause { domain } => {
                commands::admin::unpause(&storage_dir, &domain, cli.verbose).await?;
            }
            AdminAction::Withdraw { domain, to, amount } => {
                commands::admin::withdraw(&storage_dir, &domain, &to, amount, cli.verbose).await?;
            }
            AdminAction::Reclaim { domain, to, yes } => {
                commands::admin::reclaim(&storage_dir, &domain, &to, yes, cli.verbose).await?;
            }
        },
    }

    Ok(())
}
