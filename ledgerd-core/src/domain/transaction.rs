//! Transaction domain model - the append-only ledger entry

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of value movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Withdrawal,
    Deposit,
    Transfer,
    Fee,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::Fee => "fee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "withdrawal" => Some(Self::Withdrawal),
            "deposit" => Some(Self::Deposit),
            "transfer" => Some(Self::Transfer),
            "fee" => Some(Self::Fee),
            _ => None,
        }
    }
}

/// How a ledger entry reads from one account's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sender and receiver are the same account (deposit, withdrawal, fee).
    #[serde(rename = "self")]
    Self_,
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Self_ => "self",
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
        }
    }
}

/// A single value movement between two accounts.
///
/// Entries are immutable once persisted: the repository exposes insert-only
/// semantics and no mutation or delete. A deposit, withdrawal, or fee is a
/// self-referential entry (`sender_id == receiver_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    /// Always positive; direction is carried by sender/receiver.
    pub amount: Decimal,
    pub description: String,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        amount: Decimal,
        description: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            amount,
            description: description.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn is_self(&self) -> bool {
        self.sender_id == self.receiver_id
    }

    pub fn is_sender(&self, account_id: Uuid) -> bool {
        self.sender_id == account_id
    }

    pub fn is_receiver(&self, account_id: Uuid) -> bool {
        self.receiver_id == account_id
    }

    /// Classify this entry from `account_id`'s point of view.
    pub fn direction_for(&self, account_id: Uuid) -> Direction {
        if self.is_self() {
            Direction::Self_
        } else if self.is_sender(account_id) {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }

    /// The other party's account id, if any.
    pub fn counterparty(&self, account_id: Uuid) -> Option<Uuid> {
        match self.direction_for(account_id) {
            Direction::Self_ => None,
            Direction::Outgoing => Some(self.receiver_id),
            Direction::Incoming => Some(self.sender_id),
        }
    }
}

/// Optional narrowing criteria for statement listings.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilters {
    pub kind: Option<TransactionKind>,
    /// Inclusive lower bound on the entry date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the entry date.
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_classification() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entry = Transaction::new(a, b, Decimal::new(3000, 2), "rent", TransactionKind::Transfer);

        assert_eq!(entry.direction_for(a), Direction::Outgoing);
        assert_eq!(entry.direction_for(b), Direction::Incoming);
        assert_eq!(entry.counterparty(a), Some(b));
        assert_eq!(entry.counterparty(b), Some(a));
    }

    #[test]
    fn test_self_referential_entry() {
        let a = Uuid::new_v4();
        let entry = Transaction::new(a, a, Decimal::ONE, "fee", TransactionKind::Fee);

        assert!(entry.is_self());
        assert_eq!(entry.direction_for(a), Direction::Self_);
        assert_eq!(entry.counterparty(a), None);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            TransactionKind::Withdrawal,
            TransactionKind::Deposit,
            TransactionKind::Transfer,
            TransactionKind::Fee,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("refund"), None);
    }
}
