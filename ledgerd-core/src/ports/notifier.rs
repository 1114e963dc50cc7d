//! Notifier port - outbound notification delivery

use crate::domain::result::Result;
use crate::domain::TransferNotice;

/// Delivery channel for notices drained from the outbox. Implementations
/// are expected to be at-most-once per call; redelivery on failure is the
/// outbox's job, not the notifier's.
pub trait Notifier: Send + Sync {
    fn deliver(&self, subject: &str, notice: &TransferNotice) -> Result<()>;
}
