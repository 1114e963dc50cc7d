//! Notification payloads and the transactional outbox entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::Result;

pub const SUBJECT_TRANSFER_INCOMING: &str = "transfer.incoming";
pub const SUBJECT_TRANSFER_OUTGOING: &str = "transfer.outgoing";

/// What a recipient is told about a value movement touching their account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferNotice {
    pub email: String,
    pub name: String,
    pub amount: String,
    pub currency: String,
    pub account: String,
    pub description: String,
}

/// A notification waiting for delivery.
///
/// Entries are committed in the same transaction as the ledger writes they
/// announce, then delivered at-least-once by the outbox drain. A delivery
/// failure is recorded on the entry and never propagated to the operation
/// that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub subject: String,
    /// JSON-encoded `TransferNotice`.
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub attempts: i64,
    pub last_error: Option<String>,
}

impl OutboxEntry {
    pub fn new(subject: &str, notice: &TransferNotice) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            payload: serde_json::to_string(notice)?,
            created_at: Utc::now(),
            dispatched_at: None,
            attempts: 0,
            last_error: None,
        })
    }

    pub fn notice(&self) -> Result<TransferNotice> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let notice = TransferNotice {
            email: "jane@example.com".into(),
            name: "Jane".into(),
            amount: "30".into(),
            currency: "TRY".into(),
            account: "Checking".into(),
            description: "rent".into(),
        };
        let entry = OutboxEntry::new(SUBJECT_TRANSFER_INCOMING, &notice).unwrap();
        assert!(entry.dispatched_at.is_none());
        assert_eq!(entry.attempts, 0);

        let decoded = entry.notice().unwrap();
        assert_eq!(decoded.email, "jane@example.com");
        assert_eq!(decoded.amount, "30");
    }
}
