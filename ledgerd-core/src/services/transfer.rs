//! Transfer service - the core money-movement protocol
//!
//! One unit of work spans the whole run: destination and source resolution,
//! the business-rule gates, the ledger entries, both balance writes, and the
//! outbox notices. The first violated rule returns early and rolls back
//! everything written so far; nothing is visible to other operations until
//! commit.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::adapters::duckdb::DuckDbLedgerStore;
use crate::config::Config;
use crate::domain::iban;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, OutboxEntry, Transaction, TransactionKind, TransferNotice,
    SUBJECT_TRANSFER_INCOMING, SUBJECT_TRANSFER_OUTGOING,
};
use crate::ports::{AccountRepository, OutboxRepository, TransactionRepository, UserDirectory};

use super::parse_amount;

/// A transfer request as the API layer hands it over. `user_email` and
/// `user_name` are the caller's identity for the outgoing notice.
#[derive(Debug, Clone)]
pub struct TransferMoney {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub account_id: Uuid,
    pub amount: String,
    pub to_iban: String,
    pub to_owner: String,
    pub description: String,
}

impl TransferMoney {
    fn validate(&self) -> Result<()> {
        if !iban::validate(&self.to_iban) {
            return Err(Error::validation(format!("invalid IBAN: {}", self.to_iban)));
        }
        for (value, field) in [(&self.to_owner, "to_owner"), (&self.description, "description")] {
            let len = value.trim().chars().count();
            if !(3..=255).contains(&len) {
                return Err(Error::validation(format!(
                    "{field} must be between 3 and 255 characters"
                )));
            }
        }
        Ok(())
    }
}

/// Transfer service for account-to-account money movement
pub struct TransferService {
    store: Arc<DuckDbLedgerStore>,
    config: Config,
}

impl TransferService {
    pub fn new(store: Arc<DuckDbLedgerStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Move `amount` from the caller's account to the account addressed by
    /// (IBAN, owner). Cross-user transfers pay the configured flat fee on
    /// top; transfers between one user's own accounts are fee-free.
    pub fn transfer_money(&self, cmd: TransferMoney) -> Result<()> {
        cmd.validate()?;
        let amount = parse_amount(&cmd.amount)?;
        let fee = self.config.transfer_fee;
        let collector_iban = self.config.fee_collector_iban.as_deref();

        self.store
            .unit_of_work(|uow| execute(uow, &cmd, amount, fee, collector_iban))?;

        tracing::info!(
            from_account = %cmd.account_id,
            to_iban = %cmd.to_iban,
            %amount,
            "transfer committed"
        );
        Ok(())
    }
}

/// The transfer protocol, generic over the persistence ports.
fn execute<R>(
    repo: &R,
    cmd: &TransferMoney,
    amount: Decimal,
    fee: Decimal,
    collector_iban: Option<&str>,
) -> Result<()>
where
    R: AccountRepository + TransactionRepository + OutboxRepository + UserDirectory,
{
    let mut to_account = repo
        .find_account_by_iban_and_owner(&cmd.to_iban, &cmd.to_owner)?
        .ok_or_else(|| Error::not_found(format!("destination account {}", cmd.to_iban)))?;
    let mut from_account = repo
        .find_account_for_user(cmd.user_id, cmd.account_id)?
        .ok_or_else(|| Error::not_found(format!("account {}", cmd.account_id)))?;

    if !from_account.is_available() {
        return Err(Error::NotAvailable);
    }
    if !to_account.is_available() {
        return Err(Error::ToAccountNotAvailable);
    }
    if from_account.id == to_account.id {
        return Err(Error::TransferToSameAccount);
    }
    if from_account.currency != to_account.currency {
        return Err(Error::CurrencyMismatch);
    }

    let cross_user = from_account.user_id != to_account.user_id;
    let amount_to_pay = if cross_user { amount + fee } else { amount };

    if !from_account.can_debit(amount_to_pay) {
        return Err(Error::BalanceInsufficient);
    }

    repo.append_transaction(&Transaction::new(
        from_account.id,
        to_account.id,
        amount,
        cmd.description.clone(),
        TransactionKind::Transfer,
    ))?;

    if amount_to_pay != amount {
        let fee_receiver = collect_fee(repo, &from_account, &mut to_account, fee, collector_iban)?;
        repo.append_transaction(&Transaction::new(
            from_account.id,
            fee_receiver,
            fee,
            "Process fee",
            TransactionKind::Fee,
        ))?;
    }

    from_account.debit(amount_to_pay);
    repo.save_account(&mut from_account)?;
    to_account.credit(amount);
    repo.save_account(&mut to_account)?;

    if cross_user {
        enqueue_notices(repo, cmd, &from_account, &to_account, amount, amount_to_pay)?;
    }

    Ok(())
}

/// Credit the configured fee collector and pick the fee entry's receiver.
///
/// Unconfigured, the entry stays self-referential (source→source) and the
/// fee value leaves circulation, as the legacy books did. The destination's
/// already-loaded aggregate is credited in place rather than re-read so the
/// later save sees one consistent balance.
fn collect_fee<R>(
    repo: &R,
    from_account: &Account,
    to_account: &mut Account,
    fee: Decimal,
    collector_iban: Option<&str>,
) -> Result<Uuid>
where
    R: AccountRepository,
{
    let Some(iban) = collector_iban else {
        return Ok(from_account.id);
    };
    if iban == from_account.iban {
        tracing::warn!("fee collector is the paying account; keeping the fee self-referential");
        return Ok(from_account.id);
    }
    if iban == to_account.iban {
        to_account.credit(fee);
        return Ok(to_account.id);
    }
    let mut collector = repo
        .find_account_by_iban(iban)?
        .ok_or_else(|| Error::Config(format!("fee collector account not found: {iban}")))?;
    collector.credit(fee);
    repo.save_account(&mut collector)?;
    Ok(collector.id)
}

/// Queue the incoming/outgoing notices inside the same transaction. The
/// money movement never fails on notification grounds: an unresolvable
/// destination owner is logged and skipped.
fn enqueue_notices<R>(
    repo: &R,
    cmd: &TransferMoney,
    from_account: &Account,
    to_account: &Account,
    amount: Decimal,
    amount_to_pay: Decimal,
) -> Result<()>
where
    R: OutboxRepository + UserDirectory,
{
    match repo.find_user(to_account.user_id)? {
        Some(to_user) => {
            let incoming = TransferNotice {
                email: to_user.email,
                name: to_user.name,
                amount: amount.to_string(),
                currency: to_account.currency.to_string(),
                account: to_account.name.clone(),
                description: cmd.description.clone(),
            };
            repo.enqueue_notice(&OutboxEntry::new(SUBJECT_TRANSFER_INCOMING, &incoming)?)?;
        }
        None => {
            tracing::warn!(
                user_id = %to_account.user_id,
                "destination owner has no user record; incoming notice skipped"
            );
        }
    }

    let outgoing = TransferNotice {
        email: cmd.user_email.clone(),
        name: cmd.user_name.clone(),
        amount: amount_to_pay.to_string(),
        currency: from_account.currency.to_string(),
        account: from_account.name.clone(),
        description: cmd.description.clone(),
    };
    repo.enqueue_notice(&OutboxEntry::new(SUBJECT_TRANSFER_OUTGOING, &outgoing)?)?;
    Ok(())
}
