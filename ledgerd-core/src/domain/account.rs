//! Account domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::currency::Currency;
use crate::domain::iban;

/// Account lifecycle status.
///
/// Transitions are flat and unconditional: any status can be set from any
/// other. Re-applying the current status is a harmless overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Locked,
    Frozen,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
            Self::Frozen => "frozen",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "locked" => Some(Self::Locked),
            "frozen" => Some(Self::Frozen),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// A customer account holding a balance in a single currency.
///
/// IBAN and currency are fixed at creation. The balance is mutated only by
/// `credit`/`debit`, and `version` is the optimistic-concurrency counter the
/// repository compares on save (`0` = never persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub owner: String,
    pub iban: String,
    pub currency: Currency,
    pub status: AccountStatus,
    pub balance: Decimal,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; carried in the schema but never set by the core.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new active account with a zero balance and a fresh IBAN.
    pub fn new(user_id: Uuid, name: impl Into<String>, owner: impl Into<String>, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            owner: owner.into(),
            iban: iban::generate(),
            currency,
            status: AccountStatus::Active,
            balance: Decimal::ZERO,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Add to the balance. No guard: callers gate with `is_available`.
    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Subtract from the balance. No guard: callers gate with `can_debit`.
    pub fn debit(&mut self, amount: Decimal) {
        self.balance -= amount;
    }

    pub fn activate(&mut self) {
        self.status = AccountStatus::Active;
    }

    pub fn lock(&mut self) {
        self.status = AccountStatus::Locked;
    }

    pub fn freeze(&mut self) {
        self.status = AccountStatus::Frozen;
    }

    pub fn suspend(&mut self) {
        self.status = AccountStatus::Suspended;
    }

    pub fn is_available(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Whether `amount` can be withdrawn right now: the account is active,
    /// the amount is positive, and the balance covers it. Overdraft is never
    /// permitted.
    pub fn can_debit(&self, amount: Decimal) -> bool {
        self.is_available() && amount > Decimal::ZERO && self.balance >= amount
    }

    /// True once the account has been written to storage.
    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_account() -> Account {
        Account::new(
            Uuid::new_v4(),
            "Checking",
            "Jane Roe",
            Currency::parse("TRY").unwrap(),
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let account = try_account();
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.version, 0);
        assert!(iban::validate(&account.iban));
    }

    #[test]
    fn test_credit_debit_are_unconditional() {
        let mut account = try_account();
        account.freeze();
        account.credit(Decimal::new(1000, 2));
        account.debit(Decimal::new(2500, 2));
        // The aggregate itself never guards; that is the caller's job.
        assert_eq!(account.balance, Decimal::new(-1500, 2));
    }

    #[test]
    fn test_can_debit_gates() {
        let mut account = try_account();
        account.credit(Decimal::new(10000, 2)); // 100.00

        assert!(account.can_debit(Decimal::new(10000, 2)));
        assert!(!account.can_debit(Decimal::new(10001, 2)));
        assert!(!account.can_debit(Decimal::ZERO));

        account.suspend();
        assert!(!account.can_debit(Decimal::new(100, 2)));
    }

    #[test]
    fn test_status_transitions_are_flat() {
        let mut account = try_account();
        account.freeze();
        assert_eq!(account.status, AccountStatus::Frozen);
        // Re-freezing an already-frozen account is a no-op in effect.
        account.freeze();
        assert_eq!(account.status, AccountStatus::Frozen);
        account.activate();
        assert!(account.is_available());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Locked,
            AccountStatus::Frozen,
            AccountStatus::Suspended,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("closed"), None);
    }
}
