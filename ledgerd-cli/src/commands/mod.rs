//! CLI command implementations

pub mod account;
pub mod cash;
pub mod outbox;
pub mod transactions;
pub mod transfer;
pub mod user;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerd_core::LedgerContext;
use uuid::Uuid;

/// Get the ledgerd data directory from environment or default
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEDGERD_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .map(|home| home.join(".ledgerd"))
            .unwrap_or_else(|| PathBuf::from(".ledgerd"))
    }
}

/// Get or create the ledger context
pub fn get_context() -> Result<LedgerContext> {
    let data_dir = get_data_dir();

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create ledgerd directory: {data_dir:?}"))?;

    LedgerContext::new(&data_dir).context("Failed to initialize ledgerd context")
}

/// Parse a CLI-supplied UUID argument
pub fn parse_id(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).with_context(|| format!("invalid {what}: {value}"))
}
