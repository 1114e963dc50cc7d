//! Account commands - creation, listing, status changes

use anyhow::Result;
use clap::Subcommand;
use ledgerd_core::services::CreateAccount;
use ledgerd_core::PageRequest;

use super::{get_context, parse_id};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account
    New {
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Account display name
        #[arg(long)]
        name: String,
        /// Legal owner name (matched on incoming transfers)
        #[arg(long)]
        owner: String,
        /// ISO 4217 currency code, e.g. TRY
        #[arg(long)]
        currency: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a user's accounts
    List {
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<i64>,
        /// Page size
        #[arg(long)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set an account active
    Activate {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
    },

    /// Freeze an account
    Freeze {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
    },

    /// Lock an account
    Lock {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
    },

    /// Suspend an account
    Suspend {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::New { user, name, owner, currency, json } => {
            let ctx = get_context()?;
            let user_id = parse_id(&user, "user id")?;
            let account_id = ctx.account_service.create(CreateAccount {
                user_id,
                name,
                owner,
                currency,
            })?;

            if json {
                println!("{}", serde_json::json!({ "id": account_id }));
                return Ok(());
            }

            output::success(&format!("Account opened: {account_id}"));
            Ok(())
        }

        AccountCommands::List { user, page, limit, json } => {
            let ctx = get_context()?;
            let user_id = parse_id(&user, "user id")?;
            let request = PageRequest { page, limit };
            let accounts = ctx.account_service.list(user_id, &request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
                return Ok(());
            }

            if accounts.list.is_empty() {
                output::info("No accounts.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name", "IBAN", "Currency", "Balance", "Status"]);
            for account in &accounts.list {
                table.add_row(vec![
                    account.id.to_string(),
                    account.name.clone(),
                    account.iban.clone(),
                    account.currency.clone(),
                    account.balance.clone(),
                    account.status.clone(),
                ]);
            }
            println!("{table}");
            println!(
                "Page {}/{} ({} accounts)",
                accounts.page, accounts.total_page, accounts.total
            );
            Ok(())
        }

        AccountCommands::Activate { account_id, user } => {
            set_status(&account_id, &user, "activated", |ctx, u, a| {
                ctx.account_service.activate(u, a)
            })
        }
        AccountCommands::Freeze { account_id, user } => {
            set_status(&account_id, &user, "frozen", |ctx, u, a| {
                ctx.account_service.freeze(u, a)
            })
        }
        AccountCommands::Lock { account_id, user } => {
            set_status(&account_id, &user, "locked", |ctx, u, a| {
                ctx.account_service.lock(u, a)
            })
        }
        AccountCommands::Suspend { account_id, user } => {
            set_status(&account_id, &user, "suspended", |ctx, u, a| {
                ctx.account_service.suspend(u, a)
            })
        }
    }
}

fn set_status(
    account_id: &str,
    user: &str,
    label: &str,
    apply: impl FnOnce(&ledgerd_core::LedgerContext, uuid::Uuid, uuid::Uuid) -> ledgerd_core::Result<()>,
) -> Result<()> {
    let ctx = get_context()?;
    let user_id = parse_id(user, "user id")?;
    let account_id = parse_id(account_id, "account id")?;
    apply(&ctx, user_id, account_id)?;
    output::success(&format!("Account {label}: {account_id}"));
    Ok(())
}
