//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! holds the store and runs its reads and writes inside a unit of work;
//! orchestration bodies are generic over the port traits.

mod account;
mod balance;
pub mod migration;
mod outbox;
mod statement;
mod transfer;

pub use account::{AccountService, AccountSummary, CreateAccount};
pub use balance::{BalanceService, CashOperation};
pub use migration::{MigrationResult, MigrationService};
pub use outbox::{DrainReport, OutboxService};
pub use statement::{StatementEntry, StatementService};
pub use transfer::{TransferMoney, TransferService};

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};

/// Parse a caller-supplied amount string as an exact decimal.
///
/// Amounts travel as strings end to end and never touch binary floating
/// point. Rejected: non-numeric input, zero or negative values, and more
/// than two decimal places (the ledger stores DECIMAL(10,2)).
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(s.trim())
        .map_err(|e| Error::validation(format!("invalid amount {s:?}: {e}")))?;
    if amount <= Decimal::ZERO {
        return Err(Error::validation(format!("amount must be positive: {s}")));
    }
    if amount != amount.round_dp(2) {
        return Err(Error::validation(format!(
            "amount has more than two decimal places: {s}"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_money_strings() {
        assert_eq!(parse_amount("30").unwrap(), Decimal::new(30, 0));
        assert_eq!(parse_amount("0.01").unwrap(), Decimal::new(1, 2));
        assert_eq!(parse_amount(" 100.50 ").unwrap(), Decimal::new(10050, 2));
    }

    #[test]
    fn test_parse_amount_rejections() {
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.005").is_err());
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("").is_err());
    }
}
