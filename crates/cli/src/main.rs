//! Operator CLI for ledgermark ownership verification.
//!
//! Talks to a Horizon-style ledger endpoint; an optional JSON snapshot of
//! registry records stands in for the production index.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgermark_ledger::{HistoryScanner, HorizonClient, OnChainOwnerResolver, TxScope};
use ledgermark_reconcile::ReconciliationService;
use ledgermark_registry::InMemoryRegistryIndex;
use ledgermark_types::{AccountKey, AssetRef, RegistryAsset};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ledgermark")]
#[command(about = "Ownership verification against live ledger state")]
#[command(version)]
struct Cli {
    /// Horizon-style ledger query endpoint
    #[arg(long, default_value = "https://horizon.stellar.org")]
    horizon: String,

    /// JSON file with an array of registry asset records
    #[arg(long)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify an identifier (registry id, account key, or fingerprint)
    Verify { identifier: String },

    /// Verify and reconcile the loaded registry snapshot in memory,
    /// printing the resulting verdict
    Sync {
        identifier: String,

        /// Reference recorded in the verification log
        #[arg(long, default_value = "cli")]
        trigger: String,
    },

    /// Resolve the current on-chain owner of an asset
    Owner {
        /// Asset code
        code: String,
        /// Issuer account key
        issuer: String,
    },

    /// Reconstruct the ownership timeline for a fingerprint
    History {
        /// Content fingerprint (full or 20-character wire prefix)
        fingerprint: String,

        /// Scan one account's history instead of the global stream
        #[arg(long)]
        account: Option<String>,

        /// Page budget for the backward scan
        #[arg(long, default_value = "20")]
        pages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let ledger = Arc::new(HorizonClient::new(cli.horizon.clone())?);
    let index = Arc::new(load_index(cli.registry.as_deref())?);

    match cli.command {
        Command::Verify { identifier } => {
            let service = ReconciliationService::new(ledger, index);
            let outcome = service.verify(&identifier).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Sync {
            identifier,
            trigger,
        } => {
            let service = ReconciliationService::new(ledger, index);
            let outcome = service.sync(&identifier, &trigger).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Owner { code, issuer } => {
            let issuer = AccountKey::parse(&issuer).context("invalid issuer account key")?;
            let resolver = OnChainOwnerResolver::new(ledger);
            let resolution = resolver.current_owner(&AssetRef::new(code, issuer)).await;
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Command::History {
            fingerprint,
            account,
            pages,
        } => {
            let scope = match account {
                Some(account) => TxScope::Account(account),
                None => TxScope::Global,
            };
            let scanner = HistoryScanner::with_page_budget(ledger, pages);
            let scan = scanner
                .history(ledgermark_types::wire_prefix(&fingerprint), &scope)
                .await;
            println!("{}", serde_json::to_string_pretty(&scan)?);
        }
    }

    Ok(())
}

fn load_index(path: Option<&std::path::Path>) -> Result<InMemoryRegistryIndex> {
    let Some(path) = path else {
        return Ok(InMemoryRegistryIndex::new());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry snapshot {}", path.display()))?;
    let assets: Vec<RegistryAsset> =
        serde_json::from_str(&raw).context("registry snapshot is not a JSON array of assets")?;
    tracing::info!(count = assets.len(), "loaded registry snapshot");
    Ok(InMemoryRegistryIndex::seeded(assets))
}
