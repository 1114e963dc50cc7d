//! Transfer command

use anyhow::Result;
use dialoguer::Confirm;
use ledgerd_core::services::TransferMoney;

use super::{get_context, parse_id};
use crate::output;

#[allow(clippy::too_many_arguments)]
pub fn run(
    user: &str,
    from: &str,
    amount: &str,
    to_iban: &str,
    to_owner: &str,
    description: &str,
    email: &str,
    name: &str,
    yes: bool,
) -> Result<()> {
    let ctx = get_context()?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Transfer {amount} to {to_owner} ({to_iban})?"))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Transfer cancelled.");
            return Ok(());
        }
    }

    ctx.transfer_service.transfer_money(TransferMoney {
        user_id: parse_id(user, "user id")?,
        user_email: email.to_string(),
        user_name: name.to_string(),
        account_id: parse_id(from, "account id")?,
        amount: amount.to_string(),
        to_iban: to_iban.to_string(),
        to_owner: to_owner.to_string(),
        description: description.to_string(),
    })?;

    output::success(&format!("Transferred {amount} to {to_owner}"));
    Ok(())
}
