//! Balance service - single-account ledger operations (deposit, withdrawal)
//!
//! Unlike transfers these touch one account, but the balance write, the
//! ledger entry, and the notice still commit or roll back together: every
//! multi-write operation goes through the same unit of work.

use std::sync::Arc;

use uuid::Uuid;

use crate::adapters::duckdb::DuckDbLedgerStore;
use crate::domain::result::{Error, Result};
use crate::domain::{
    OutboxEntry, Transaction, TransactionKind, TransferNotice, SUBJECT_TRANSFER_INCOMING,
    SUBJECT_TRANSFER_OUTGOING,
};
use crate::ports::{AccountRepository, OutboxRepository, TransactionRepository};

use super::parse_amount;

/// A deposit or withdrawal request. Email and name address the notice to
/// the caller-supplied identity.
#[derive(Debug, Clone)]
pub struct CashOperation {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub amount: String,
}

/// Balance service for deposits and withdrawals
pub struct BalanceService {
    store: Arc<DuckDbLedgerStore>,
}

impl BalanceService {
    pub fn new(store: Arc<DuckDbLedgerStore>) -> Self {
        Self { store }
    }

    /// Load value onto an account (a self-referential `deposit` entry).
    pub fn credit(&self, op: CashOperation) -> Result<()> {
        let amount = parse_amount(&op.amount)?;
        self.store.unit_of_work(|uow| {
            let mut account = uow
                .find_account_for_user(op.user_id, op.account_id)?
                .ok_or_else(|| Error::not_found(format!("account {}", op.account_id)))?;
            if !account.is_available() {
                return Err(Error::NotAvailable);
            }

            account.credit(amount);
            uow.save_account(&mut account)?;

            let entry = Transaction::new(
                account.id,
                account.id,
                amount,
                "Load balance",
                TransactionKind::Deposit,
            );
            uow.append_transaction(&entry)?;

            let notice = TransferNotice {
                email: op.user_email.clone(),
                name: op.user_name.clone(),
                amount: amount.to_string(),
                currency: account.currency.to_string(),
                account: account.name.clone(),
                description: "Load balance".to_string(),
            };
            uow.enqueue_notice(&OutboxEntry::new(SUBJECT_TRANSFER_INCOMING, &notice)?)?;

            tracing::info!(account_id = %account.id, %amount, "balance credited");
            Ok(())
        })
    }

    /// Withdraw value from an account (a self-referential `withdrawal` entry).
    pub fn debit(&self, op: CashOperation) -> Result<()> {
        let amount = parse_amount(&op.amount)?;
        self.store.unit_of_work(|uow| {
            let mut account = uow
                .find_account_for_user(op.user_id, op.account_id)?
                .ok_or_else(|| Error::not_found(format!("account {}", op.account_id)))?;
            if !account.is_available() {
                return Err(Error::NotAvailable);
            }
            if !account.can_debit(amount) {
                return Err(Error::BalanceInsufficient);
            }

            account.debit(amount);
            uow.save_account(&mut account)?;

            let entry = Transaction::new(
                account.id,
                account.id,
                amount,
                "Withdraw balance",
                TransactionKind::Withdrawal,
            );
            uow.append_transaction(&entry)?;

            let notice = TransferNotice {
                email: op.user_email.clone(),
                name: op.user_name.clone(),
                amount: amount.to_string(),
                currency: account.currency.to_string(),
                account: account.name.clone(),
                description: "Withdraw balance".to_string(),
            };
            uow.enqueue_notice(&OutboxEntry::new(SUBJECT_TRANSFER_OUTGOING, &notice)?)?;

            tracing::info!(account_id = %account.id, %amount, "balance debited");
            Ok(())
        })
    }
}
