//! Outbox service - at-least-once notice delivery
//!
//! Notices are committed by the operation that produced them; this service
//! drains them through a `Notifier`. Each entry is marked in its own unit of
//! work so one slow or failing delivery never holds back the rest, and a
//! crash between deliver and mark re-delivers on the next drain
//! (at-least-once, never silently dropped).

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbLedgerStore;
use crate::domain::result::Result;
use crate::ports::{Notifier, OutboxRepository};

/// What a drain pass accomplished.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrainReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Outbox service for notification delivery
pub struct OutboxService {
    store: Arc<DuckDbLedgerStore>,
}

impl OutboxService {
    pub fn new(store: Arc<DuckDbLedgerStore>) -> Self {
        Self { store }
    }

    /// Deliver up to `limit` pending notices. Delivery failures are recorded
    /// on the entry and retried on the next drain; they are not errors of
    /// the drain itself.
    pub fn drain(&self, notifier: &dyn Notifier, limit: i64) -> Result<DrainReport> {
        let pending = self.store.unit_of_work(|uow| uow.pending_notices(limit))?;

        let mut report = DrainReport::default();
        for entry in pending {
            let outcome = entry
                .notice()
                .and_then(|notice| notifier.deliver(&entry.subject, &notice));
            match outcome {
                Ok(()) => {
                    self.store
                        .unit_of_work(|uow| uow.mark_dispatched(entry.id))?;
                    report.delivered += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        entry_id = %entry.id,
                        subject = %entry.subject,
                        "notice delivery failed: {err}"
                    );
                    self.store
                        .unit_of_work(|uow| uow.record_delivery_failure(entry.id, &err.to_string()))?;
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// (pending, dispatched) counts.
    pub fn status(&self) -> Result<(i64, i64)> {
        self.store.unit_of_work(|uow| uow.outbox_counts())
    }
}
