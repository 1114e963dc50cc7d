//! Outbox commands - notice delivery and status

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use ledgerd_core::ports::Notifier;
use ledgerd_core::TransferNotice;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum OutboxCommands {
    /// Deliver pending notices to the console
    Drain {
        /// Maximum notices to deliver in one pass
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },

    /// Show pending/dispatched counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Prints each notice to stdout. Stands in for the mail gateway the server
/// deployment wires up here.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn deliver(&self, subject: &str, notice: &TransferNotice) -> ledgerd_core::Result<()> {
        println!(
            "{} {} -> {} <{}>: {} {} on {} ({})",
            "▶".cyan(),
            subject,
            notice.name,
            notice.email,
            notice.amount,
            notice.currency,
            notice.account,
            notice.description,
        );
        Ok(())
    }
}

pub fn run(command: OutboxCommands) -> Result<()> {
    match command {
        OutboxCommands::Drain { limit } => {
            let ctx = get_context()?;
            let report = ctx.outbox_service.drain(&ConsoleNotifier, limit)?;
            output::success(&format!(
                "Delivered {} notice(s), {} failed",
                report.delivered, report.failed
            ));
            Ok(())
        }

        OutboxCommands::Status { json } => {
            let ctx = get_context()?;
            let (pending, dispatched) = ctx.outbox_service.status()?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({ "pending": pending, "dispatched": dispatched })
                );
                return Ok(());
            }

            println!("Pending:    {pending}");
            println!("Dispatched: {dispatched}");
            Ok(())
        }
    }
}
