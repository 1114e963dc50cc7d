//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod transaction;
pub mod currency;
pub mod iban;
mod notice;
mod page;
mod user;
pub mod result;

pub use account::{Account, AccountStatus};
pub use currency::Currency;
pub use notice::{OutboxEntry, TransferNotice, SUBJECT_TRANSFER_INCOMING, SUBJECT_TRANSFER_OUTGOING};
pub use page::{Page, PageRequest};
pub use transaction::{Direction, Transaction, TransactionFilters, TransactionKind};
pub use user::UserRecord;
