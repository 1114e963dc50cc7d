//! Ledgerd Core - the ledger and transfer engine of the ledgerd banking backend
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Account, Transaction, notices)
//! - **ports**: Trait definitions for external dependencies (repositories,
//!   user directory, notifier)
//! - **services**: Business logic orchestration (transfers, deposits,
//!   withdrawals, statements, outbox delivery)
//! - **adapters**: Concrete implementations (DuckDB store + unit of work)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbLedgerStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Account, AccountStatus, Currency, OutboxEntry, Page, PageRequest, Transaction,
    TransactionFilters, TransactionKind, TransferNotice, UserRecord,
};

const DB_FILENAME: &str = "ledgerd.duckdb";

/// Main context for ledgerd operations
///
/// This is the primary entry point for the (excluded) API layer and the
/// CLI. It holds the store, configuration, and all services.
pub struct LedgerContext {
    pub config: Config,
    pub store: Arc<DuckDbLedgerStore>,
    pub account_service: AccountService,
    pub balance_service: BalanceService,
    pub transfer_service: TransferService,
    pub statement_service: StatementService,
    pub outbox_service: OutboxService,
}

impl LedgerContext {
    /// Create a new ledger context: load config, open the database, run
    /// pending migrations, and wire the services.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let db_path = data_dir.join(DB_FILENAME);
        let store = Arc::new(DuckDbLedgerStore::new(&db_path)?);

        store.ensure_schema()?;

        let account_service = AccountService::new(Arc::clone(&store));
        let balance_service = BalanceService::new(Arc::clone(&store));
        let transfer_service = TransferService::new(Arc::clone(&store), config.clone());
        let statement_service = StatementService::new(Arc::clone(&store));
        let outbox_service = OutboxService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            account_service,
            balance_service,
            transfer_service,
            statement_service,
            outbox_service,
        })
    }

    /// Register a user in the directory, returning the record. Seed path for
    /// the CLI and tests; authentication is not this crate's concern.
    pub fn register_user(&self, name: &str, email: &str) -> Result<UserRecord> {
        use crate::ports::UserDirectory;

        let user = UserRecord::new(name, email);
        self.store.unit_of_work(|uow| uow.add_user(&user))?;
        Ok(user)
    }
}
