//! Statement service - paginated transaction listings
//!
//! Classifies each entry from the requesting account's perspective
//! (self / outgoing / incoming) and resolves the counterparty's display
//! name for the front end.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::adapters::duckdb::DuckDbLedgerStore;
use crate::domain::result::{Error, Result};
use crate::domain::{Page, PageRequest, Transaction, TransactionFilters};
use crate::ports::{AccountRepository, TransactionRepository};

/// Statement service for transaction history
pub struct StatementService {
    store: Arc<DuckDbLedgerStore>,
}

impl StatementService {
    pub fn new(store: Arc<DuckDbLedgerStore>) -> Self {
        Self { store }
    }

    /// List the account's entries, newest first. The account must belong to
    /// `user_id`; filters narrow by kind and entry date.
    pub fn list(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        page: &PageRequest,
        filters: &TransactionFilters,
    ) -> Result<Page<StatementEntry>> {
        self.store.unit_of_work(|uow| {
            uow.find_account_for_user(user_id, account_id)?
                .ok_or_else(|| Error::not_found(format!("account {account_id}")))?;

            let entries = uow.filter_transactions(account_id, page, filters)?;

            let mut list = Vec::with_capacity(entries.list.len());
            for entry in &entries.list {
                list.push(self.render(uow, entry, account_id)?);
            }

            Ok(Page {
                list,
                page: entries.page,
                limit: entries.limit,
                total: entries.total,
                filtered_total: entries.filtered_total,
                total_page: entries.total_page,
            })
        })
    }

    fn render<R: AccountRepository>(
        &self,
        repo: &R,
        entry: &Transaction,
        account_id: Uuid,
    ) -> Result<StatementEntry> {
        let counterparty_id = entry.counterparty(account_id);
        let counterparty_name = match counterparty_id {
            Some(id) => repo.find_account(id)?.map(|a| a.name),
            None => None,
        };

        Ok(StatementEntry {
            id: entry.id,
            account_id: counterparty_id,
            account_name: counterparty_name,
            amount: entry.amount.to_string(),
            description: entry.description.clone(),
            kind: entry.kind.as_str().to_string(),
            direction: entry.direction_for(account_id).as_str().to_string(),
            created_at: entry.created_at.to_rfc3339(),
        })
    }
}

/// One statement row. `account_id`/`account_name` identify the counterparty
/// and are absent for self-referential entries.
#[derive(Debug, Clone, Serialize)]
pub struct StatementEntry {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    pub amount: String,
    pub description: String,
    pub kind: String,
    pub direction: String,
    pub created_at: String,
}
