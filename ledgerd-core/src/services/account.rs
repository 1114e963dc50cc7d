//! Account service - creation, status changes, listing

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::adapters::duckdb::DuckDbLedgerStore;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountStatus, Currency, Page, PageRequest};
use crate::ports::AccountRepository;

/// Request to open a new account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub user_id: Uuid,
    pub name: String,
    pub owner: String,
    pub currency: String,
}

/// Account service for the account lifecycle
pub struct AccountService {
    store: Arc<DuckDbLedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<DuckDbLedgerStore>) -> Self {
        Self { store }
    }

    /// Open a new account: status active, balance zero, fresh IBAN.
    pub fn create(&self, cmd: CreateAccount) -> Result<Uuid> {
        validate_display_name(&cmd.name, "name")?;
        validate_display_name(&cmd.owner, "owner")?;
        let currency = Currency::parse(&cmd.currency)?;

        let mut account = Account::new(cmd.user_id, cmd.name, cmd.owner, currency);
        self.store
            .unit_of_work(|uow| uow.save_account(&mut account))?;

        tracing::info!(account_id = %account.id, user_id = %cmd.user_id, "account created");
        Ok(account.id)
    }

    pub fn activate(&self, user_id: Uuid, account_id: Uuid) -> Result<()> {
        self.set_status(user_id, account_id, AccountStatus::Active)
    }

    pub fn freeze(&self, user_id: Uuid, account_id: Uuid) -> Result<()> {
        self.set_status(user_id, account_id, AccountStatus::Frozen)
    }

    pub fn lock(&self, user_id: Uuid, account_id: Uuid) -> Result<()> {
        self.set_status(user_id, account_id, AccountStatus::Locked)
    }

    pub fn suspend(&self, user_id: Uuid, account_id: Uuid) -> Result<()> {
        self.set_status(user_id, account_id, AccountStatus::Suspended)
    }

    /// Status transitions are flat: the target status is applied from any
    /// current status, and re-applying the current one is a no-op in effect.
    fn set_status(&self, user_id: Uuid, account_id: Uuid, status: AccountStatus) -> Result<()> {
        self.store.unit_of_work(|uow| {
            let mut account = uow
                .find_account_for_user(user_id, account_id)?
                .ok_or_else(|| Error::not_found(format!("account {account_id}")))?;
            match status {
                AccountStatus::Active => account.activate(),
                AccountStatus::Locked => account.lock(),
                AccountStatus::Frozen => account.freeze(),
                AccountStatus::Suspended => account.suspend(),
            }
            uow.save_account(&mut account)
        })?;

        tracing::info!(%account_id, status = status.as_str(), "account status changed");
        Ok(())
    }

    pub fn list(&self, user_id: Uuid, page: &PageRequest) -> Result<Page<AccountSummary>> {
        let accounts = self
            .store
            .unit_of_work(|uow| uow.list_accounts_for_user(user_id, page))?;
        Ok(accounts.map(AccountSummary::from))
    }
}

/// Listing row with balance and status rendered for the front end.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub owner: String,
    pub iban: String,
    pub currency: String,
    pub balance: String,
    pub status: String,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            owner: account.owner,
            iban: account.iban,
            currency: account.currency.to_string(),
            balance: account.balance.to_string(),
            status: account.status.as_str().to_string(),
        }
    }
}

fn validate_display_name(value: &str, field: &str) -> Result<()> {
    let len = value.trim().chars().count();
    if !(3..=255).contains(&len) {
        return Err(Error::validation(format!(
            "{field} must be between 3 and 255 characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_bounds() {
        assert!(validate_display_name("Jo", "name").is_err());
        assert!(validate_display_name("Joe", "name").is_ok());
        assert!(validate_display_name(&"x".repeat(255), "name").is_ok());
        assert!(validate_display_name(&"x".repeat(256), "name").is_err());
    }
}
