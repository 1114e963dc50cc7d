//! DuckDB ledger store
//!
//! One `Connection` behind a mutex; every read-check-write cycle runs inside
//! `unit_of_work`, which holds the mutex for the whole window. Within a
//! process that serializes conflicting operations outright; across processes
//! DuckDB's single-writer file locking does the same, and the version
//! compare-and-swap in `save_account` rejects any stale write that slips
//! through with a retryable conflict.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, ToSql, Transaction};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountStatus, Currency, OutboxEntry, Page, PageRequest, Transaction as LedgerEntry,
    TransactionFilters, TransactionKind, UserRecord,
};
use crate::ports::{AccountRepository, OutboxRepository, TransactionRepository, UserDirectory};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_open_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed ledger store
pub struct DuckDbLedgerStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbLedgerStore {
    /// Open (or create) the ledger database.
    ///
    /// Includes retry logic with exponential backoff for file locking
    /// errors, which occur when another ledgerd process holds the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_open_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            "database busy, retrying: {err_msg}"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("failed to open database after {MAX_RETRIES} retries"))
        }))
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading is unnecessary and slows first open
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run database migrations, returning what was applied.
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock_conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Run `f` inside one database transaction.
    ///
    /// The closure receives the only handle the repository ports are
    /// implemented on, so every read and write it performs is inside the
    /// transaction window. Commit on `Ok`, rollback on `Err` (and on
    /// unwind, via the transaction's drop behavior).
    pub fn unit_of_work<T>(&self, f: impl FnOnce(&LedgerTx<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let uow = LedgerTx { tx };
        match f(&uow) {
            Ok(value) => {
                uow.tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.tx.rollback() {
                    tracing::warn!("rollback failed after {err}: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::database("connection mutex poisoned"))
    }
}

/// Transaction-scoped repository handle.
///
/// All repository ports are implemented here and only here; a `LedgerTx`
/// exists only inside `DuckDbLedgerStore::unit_of_work`, which makes a
/// write outside an open transaction unrepresentable.
pub struct LedgerTx<'conn> {
    tx: Transaction<'conn>,
}

const ACCOUNT_COLUMNS: &str = "account_id, user_id, name, owner, iban, currency, status, \
     balance::VARCHAR, row_version, created_at::VARCHAR, updated_at::VARCHAR, deleted_at::VARCHAR";

const TRANSACTION_COLUMNS: &str =
    "transaction_id, sender_id, receiver_id, amount::VARCHAR, description, kind, created_at::VARCHAR";

const OUTBOX_COLUMNS: &str =
    "entry_id, subject, payload, created_at::VARCHAR, dispatched_at::VARCHAR, attempts, last_error";

/// Raw account row as the driver hands it over; strings are converted to
/// domain types in `into_account` so corruption surfaces as a database
/// error instead of a silent default.
struct AccountRow {
    id: String,
    user_id: String,
    name: String,
    owner: String,
    iban: String,
    currency: String,
    status: String,
    balance: String,
    version: i64,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl AccountRow {
    fn read(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            owner: row.get(3)?,
            iban: row.get(4)?,
            currency: row.get(5)?,
            status: row.get(6)?,
            balance: row.get(7)?,
            version: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            deleted_at: row.get(11)?,
        })
    }

    fn into_account(self) -> Result<Account> {
        Ok(Account {
            id: parse_uuid(&self.id, "account_id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            name: self.name,
            owner: self.owner,
            iban: self.iban,
            currency: Currency::parse(&self.currency)
                .map_err(|_| Error::database(format!("corrupt currency code: {}", self.currency)))?,
            status: AccountStatus::parse(&self.status)
                .ok_or_else(|| Error::database(format!("corrupt account status: {}", self.status)))?,
            balance: parse_decimal(&self.balance, "balance")?,
            version: self.version,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            deleted_at: self.deleted_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

struct TransactionRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    amount: String,
    description: String,
    kind: String,
    created_at: String,
}

impl TransactionRow {
    fn read(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sender_id: row.get(1)?,
            receiver_id: row.get(2)?,
            amount: row.get(3)?,
            description: row.get(4)?,
            kind: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<LedgerEntry> {
        Ok(LedgerEntry {
            id: parse_uuid(&self.id, "transaction_id")?,
            sender_id: parse_uuid(&self.sender_id, "sender_id")?,
            receiver_id: parse_uuid(&self.receiver_id, "receiver_id")?,
            amount: parse_decimal(&self.amount, "amount")?,
            description: self.description,
            kind: TransactionKind::parse(&self.kind)
                .ok_or_else(|| Error::database(format!("corrupt transaction kind: {}", self.kind)))?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

struct OutboxRow {
    id: String,
    subject: String,
    payload: String,
    created_at: String,
    dispatched_at: Option<String>,
    attempts: i64,
    last_error: Option<String>,
}

impl OutboxRow {
    fn read(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject: row.get(1)?,
            payload: row.get(2)?,
            created_at: row.get(3)?,
            dispatched_at: row.get(4)?,
            attempts: row.get(5)?,
            last_error: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<OutboxEntry> {
        Ok(OutboxEntry {
            id: parse_uuid(&self.id, "entry_id")?,
            subject: self.subject,
            payload: self.payload,
            created_at: parse_timestamp(&self.created_at)?,
            dispatched_at: self
                .dispatched_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            attempts: self.attempts,
            last_error: self.last_error,
        })
    }
}

impl AccountRepository for LedgerTx<'_> {
    fn save_account(&self, account: &mut Account) -> Result<()> {
        if account.is_persisted() {
            account.updated_at = Utc::now();
            // user_id, iban, and currency are immutable after creation and
            // deliberately absent from the update list.
            let changed = self.tx.execute(
                "UPDATE accounts
                 SET name = ?, owner = ?, status = ?,
                     balance = CAST(? AS DECIMAL(10,2)),
                     updated_at = CAST(? AS TIMESTAMP),
                     row_version = row_version + 1
                 WHERE account_id = ? AND row_version = ?",
                params![
                    account.name,
                    account.owner,
                    account.status.as_str(),
                    account.balance.to_string(),
                    fmt_timestamp(account.updated_at),
                    account.id.to_string(),
                    account.version,
                ],
            )?;
            if changed == 0 {
                return Err(Error::conflict(format!(
                    "account {} was modified concurrently (version {})",
                    account.id, account.version
                )));
            }
            account.version += 1;
        } else {
            self.tx.execute(
                "INSERT INTO accounts
                     (account_id, user_id, name, owner, iban, currency, status,
                      balance, row_version, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, CAST(? AS DECIMAL(10,2)), 1,
                         CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
                params![
                    account.id.to_string(),
                    account.user_id.to_string(),
                    account.name,
                    account.owner,
                    account.iban,
                    account.currency.as_str(),
                    account.status.as_str(),
                    account.balance.to_string(),
                    fmt_timestamp(account.created_at),
                    fmt_timestamp(account.updated_at),
                ],
            )?;
            account.version = 1;
        }
        Ok(())
    }

    fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
        self.one_account(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?"),
            params![id.to_string()],
        )
    }

    fn find_account_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Account>> {
        self.one_account(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = ? AND account_id = ?"),
            params![user_id.to_string(), id.to_string()],
        )
    }

    fn find_account_by_iban_and_owner(&self, iban: &str, owner: &str) -> Result<Option<Account>> {
        self.one_account(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE iban = ? AND owner = ?"),
            params![iban, owner],
        )
    }

    fn find_account_by_iban(&self, iban: &str) -> Result<Option<Account>> {
        self.one_account(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE iban = ?"),
            params![iban],
        )
    }

    fn list_accounts_for_user(&self, user_id: Uuid, page: &PageRequest) -> Result<Page<Account>> {
        let total: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM accounts WHERE user_id = ?",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;

        let mut stmt = self.tx.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE user_id = ?
             ORDER BY created_at, account_id
             LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(
            params![user_id.to_string(), page.limit(), page.offset()],
            AccountRow::read,
        )?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(row?.into_account()?);
        }
        Ok(Page::new(accounts, page, total, total))
    }
}

impl LedgerTx<'_> {
    fn one_account(&self, sql: &str, params: impl duckdb::Params) -> Result<Option<Account>> {
        let mut stmt = self.tx.prepare(sql)?;
        let mut rows = stmt.query_map(params, AccountRow::read)?;
        match rows.next() {
            Some(row) => Ok(Some(row?.into_account()?)),
            None => Ok(None),
        }
    }
}

impl TransactionRepository for LedgerTx<'_> {
    fn append_transaction(&self, entry: &LedgerEntry) -> Result<()> {
        self.tx.execute(
            "INSERT INTO transactions
                 (transaction_id, sender_id, receiver_id, amount, description, kind, created_at)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(10,2)), ?, ?, CAST(? AS TIMESTAMP))",
            params![
                entry.id.to_string(),
                entry.sender_id.to_string(),
                entry.receiver_id.to_string(),
                entry.amount.to_string(),
                entry.description,
                entry.kind.as_str(),
                fmt_timestamp(entry.created_at),
            ],
        )?;
        Ok(())
    }

    fn filter_transactions(
        &self,
        account_id: Uuid,
        page: &PageRequest,
        filters: &TransactionFilters,
    ) -> Result<Page<LedgerEntry>> {
        let account_id = account_id.to_string();
        let total: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM transactions WHERE sender_id = ? OR receiver_id = ?",
            params![account_id, account_id],
            |row| row.get(0),
        )?;

        // Build the filter predicate dynamically; the account predicate is
        // always present, the rest mirror TransactionFilters.
        let mut conds = vec!["(sender_id = ? OR receiver_id = ?)".to_string()];
        let mut values: Vec<Box<dyn ToSql>> =
            vec![Box::new(account_id.clone()), Box::new(account_id)];
        if let Some(kind) = filters.kind {
            conds.push("kind = ?".to_string());
            values.push(Box::new(kind.as_str().to_string()));
        }
        if let Some(start) = filters.start_date {
            conds.push("created_at >= CAST(? AS TIMESTAMP)".to_string());
            values.push(Box::new(format!("{start} 00:00:00")));
        }
        if let Some(end) = filters.end_date {
            conds.push("created_at <= CAST(? AS TIMESTAMP)".to_string());
            values.push(Box::new(format!("{end} 23:59:59.999999")));
        }
        let where_clause = conds.join(" AND ");

        let value_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let filtered_total: i64 = self.tx.query_row(
            &format!("SELECT COUNT(*) FROM transactions WHERE {where_clause}"),
            &value_refs[..],
            |row| row.get(0),
        )?;

        values.push(Box::new(page.limit()));
        values.push(Box::new(page.offset()));
        let value_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE {where_clause}
             ORDER BY created_at DESC, transaction_id
             LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt.query_map(&value_refs[..], TransactionRow::read)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(Page::new(entries, page, total, filtered_total))
    }
}

impl OutboxRepository for LedgerTx<'_> {
    fn enqueue_notice(&self, entry: &OutboxEntry) -> Result<()> {
        self.tx.execute(
            "INSERT INTO outbox (entry_id, subject, payload, created_at, attempts)
             VALUES (?, ?, ?, CAST(? AS TIMESTAMP), ?)",
            params![
                entry.id.to_string(),
                entry.subject,
                entry.payload,
                fmt_timestamp(entry.created_at),
                entry.attempts,
            ],
        )?;
        Ok(())
    }

    fn pending_notices(&self, limit: i64) -> Result<Vec<OutboxEntry>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {OUTBOX_COLUMNS} FROM outbox
             WHERE dispatched_at IS NULL
             ORDER BY created_at, entry_id
             LIMIT ?"
        ))?;
        let rows = stmt.query_map(params![limit], OutboxRow::read)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    fn mark_dispatched(&self, id: Uuid) -> Result<()> {
        self.tx.execute(
            "UPDATE outbox
             SET dispatched_at = CAST(? AS TIMESTAMP), attempts = attempts + 1, last_error = NULL
             WHERE entry_id = ?",
            params![fmt_timestamp(Utc::now()), id.to_string()],
        )?;
        Ok(())
    }

    fn record_delivery_failure(&self, id: Uuid, error: &str) -> Result<()> {
        self.tx.execute(
            "UPDATE outbox SET attempts = attempts + 1, last_error = ? WHERE entry_id = ?",
            params![error, id.to_string()],
        )?;
        Ok(())
    }

    fn outbox_counts(&self) -> Result<(i64, i64)> {
        self.tx
            .query_row(
                "SELECT COUNT(*) FILTER (WHERE dispatched_at IS NULL),
                        COUNT(*) FILTER (WHERE dispatched_at IS NOT NULL)
                 FROM outbox",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(Error::from)
    }
}

impl UserDirectory for LedgerTx<'_> {
    fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let mut stmt = self.tx.prepare(
            "SELECT user_id, name, email, created_at::VARCHAR FROM users WHERE user_id = ?",
        )?;
        let mut rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        match rows.next() {
            Some(row) => {
                let (id, name, email, created_at) = row?;
                Ok(Some(UserRecord {
                    id: parse_uuid(&id, "user_id")?,
                    name,
                    email,
                    created_at: parse_timestamp(&created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    fn add_user(&self, user: &UserRecord) -> Result<()> {
        self.tx.execute(
            "INSERT INTO users (user_id, name, email, created_at)
             VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                fmt_timestamp(user.created_at),
            ],
        )?;
        Ok(())
    }
}

// === Column conversion helpers ===

fn parse_uuid(s: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::database(format!("corrupt {column}: {e}")))
}

fn parse_decimal(s: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| Error::database(format!("corrupt {column}: {e}")))
}

/// Timestamps are written as naive UTC strings; accept both the plain and
/// the RFC 3339 renderings DuckDB may hand back.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::database(format!("corrupt timestamp {s:?}: {e}")))
}

fn fmt_timestamp(dt: DateTime<Utc>) -> String {
    dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&fmt_timestamp(now)).unwrap();
        // Microsecond precision survives the round trip
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_parse_timestamp_accepts_duckdb_renderings() {
        assert!(parse_timestamp("2026-01-14 23:59:59").is_ok());
        assert!(parse_timestamp("2026-01-14 23:59:59.123456").is_ok());
        assert!(parse_timestamp("2026-01-14T23:59:59+00:00").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_decimal_strings_stay_exact() {
        let d = parse_decimal("69.00", "balance").unwrap();
        assert_eq!(d, Decimal::new(6900, 2));
        assert_eq!(d.to_string(), "69.00");
        assert!(parse_decimal("not-a-number", "balance").is_err());
    }
}
