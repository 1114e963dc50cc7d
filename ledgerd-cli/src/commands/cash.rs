//! Deposit and withdraw commands

use anyhow::Result;
use ledgerd_core::services::CashOperation;

use super::{get_context, parse_id};
use crate::output;

pub fn run_deposit(account_id: &str, user: &str, amount: &str, email: &str, name: &str) -> Result<()> {
    let ctx = get_context()?;
    let op = CashOperation {
        user_id: parse_id(user, "user id")?,
        account_id: parse_id(account_id, "account id")?,
        user_email: email.to_string(),
        user_name: name.to_string(),
        amount: amount.to_string(),
    };
    ctx.balance_service.credit(op)?;
    output::success(&format!("Deposited {amount}"));
    Ok(())
}

pub fn run_withdraw(account_id: &str, user: &str, amount: &str, email: &str, name: &str) -> Result<()> {
    let ctx = get_context()?;
    let op = CashOperation {
        user_id: parse_id(user, "user id")?,
        account_id: parse_id(account_id, "account id")?,
        user_email: email.to_string(),
        user_name: name.to_string(),
        amount: amount.to_string(),
    };
    ctx.balance_service.debit(op)?;
    output::success(&format!("Withdrew {amount}"));
    Ok(())
}
