//! Repository ports - persistence contracts
//!
//! All three traits are implemented on the unit-of-work handle
//! (`adapters::duckdb::LedgerTx`), never on a bare connection: a repository
//! write can only happen inside an open transaction, and commit/rollback is
//! decided by `DuckDbLedgerStore::unit_of_work`. Services stay generic over
//! these traits so the business rules depend on the contracts alone.

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Account, OutboxEntry, Page, PageRequest, Transaction, TransactionFilters};

/// Persistence contract for the account aggregate.
pub trait AccountRepository {
    /// Insert the account when it has never been persisted, otherwise update
    /// it guarded by a compare-and-swap on its version counter. On success
    /// the in-memory version is bumped; a stale version yields
    /// `Error::Conflict` and nothing is written.
    fn save_account(&self, account: &mut Account) -> Result<()>;

    fn find_account(&self, id: Uuid) -> Result<Option<Account>>;

    /// Scoped lookup: the account must belong to `user_id`.
    fn find_account_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Account>>;

    /// Destination resolution for transfers: IBAN plus legal owner name.
    fn find_account_by_iban_and_owner(&self, iban: &str, owner: &str) -> Result<Option<Account>>;

    /// Lookup by IBAN alone (fee-collector resolution).
    fn find_account_by_iban(&self, iban: &str) -> Result<Option<Account>>;

    fn list_accounts_for_user(&self, user_id: Uuid, page: &PageRequest) -> Result<Page<Account>>;
}

/// Persistence contract for ledger entries. Insert-only: the ledger is
/// append-only at the contract level, there is no update or delete.
pub trait TransactionRepository {
    fn append_transaction(&self, entry: &Transaction) -> Result<()>;

    /// Entries where `account_id` is sender or receiver, newest first.
    /// `total` counts all entries touching the account; `filtered_total`
    /// counts those matching `filters`.
    fn filter_transactions(
        &self,
        account_id: Uuid,
        page: &PageRequest,
        filters: &TransactionFilters,
    ) -> Result<Page<Transaction>>;
}

/// Persistence contract for the transactional outbox.
pub trait OutboxRepository {
    fn enqueue_notice(&self, entry: &OutboxEntry) -> Result<()>;

    /// Undelivered entries, oldest first.
    fn pending_notices(&self, limit: i64) -> Result<Vec<OutboxEntry>>;

    fn mark_dispatched(&self, id: Uuid) -> Result<()>;

    fn record_delivery_failure(&self, id: Uuid, error: &str) -> Result<()>;

    /// (pending, dispatched) counts.
    fn outbox_counts(&self) -> Result<(i64, i64)>;
}
