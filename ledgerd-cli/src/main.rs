//! Ledgerd CLI - bank accounts and transfers in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{account, cash, outbox, transactions, transfer, user};

/// Ledgerd - banking backend in your terminal
#[derive(Parser)]
#[command(name = "ledgerd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users in the directory
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Load value onto an account
    Deposit {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Amount as a decimal string, e.g. "100" or "12.50"
        #[arg(long)]
        amount: String,
        /// Email the notice is addressed to
        #[arg(long, default_value = "")]
        email: String,
        /// Name the notice is addressed to
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Withdraw value from an account
    Withdraw {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Amount as a decimal string
        #[arg(long)]
        amount: String,
        /// Email the notice is addressed to
        #[arg(long, default_value = "")]
        email: String,
        /// Name the notice is addressed to
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Transfer money to an account addressed by IBAN and owner
    Transfer {
        /// Sending user ID
        #[arg(long)]
        user: String,
        /// Source account ID
        #[arg(long)]
        from: String,
        /// Amount as a decimal string
        #[arg(long)]
        amount: String,
        /// Destination IBAN
        #[arg(long)]
        to_iban: String,
        /// Destination legal owner name
        #[arg(long)]
        to_owner: String,
        /// Transfer description
        #[arg(long)]
        description: String,
        /// Sender email for the outgoing notice
        #[arg(long, default_value = "")]
        email: String,
        /// Sender name for the outgoing notice
        #[arg(long, default_value = "")]
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// List an account's transactions
    Transactions {
        /// Account ID
        account_id: String,
        /// Owning user ID
        #[arg(long)]
        user: String,
        /// Filter by kind (withdrawal, deposit, transfer, fee)
        #[arg(long)]
        kind: Option<String>,
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<i64>,
        /// Page size
        #[arg(long)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Export the page as CSV to a file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Manage the notification outbox
    Outbox {
        #[command(subcommand)]
        command: outbox::OutboxCommands,
    },
}

fn main() -> ExitCode {
    // No color codes when stdout is piped
    if atty::isnt(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    // Logs go to stderr so table/JSON output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LEDGERD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::User { command } => user::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Deposit { account_id, user, amount, email, name } => {
            cash::run_deposit(&account_id, &user, &amount, &email, &name)
        }
        Commands::Withdraw { account_id, user, amount, email, name } => {
            cash::run_withdraw(&account_id, &user, &amount, &email, &name)
        }
        Commands::Transfer { user, from, amount, to_iban, to_owner, description, email, name, yes } => {
            transfer::run(&user, &from, &amount, &to_iban, &to_owner, &description, &email, &name, yes)
        }
        Commands::Transactions { account_id, user, kind, start_date, end_date, page, limit, json, csv } => {
            transactions::run(&account_id, &user, kind.as_deref(), start_date.as_deref(),
                              end_date.as_deref(), page, limit, json, csv.as_deref())
        }
        Commands::Outbox { command } => outbox::run(command),
    }
}
