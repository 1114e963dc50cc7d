//! User commands - directory seeding

use anyhow::Result;
use clap::Subcommand;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user in the directory
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address notices are delivered to
        #[arg(long)]
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Add { name, email, json } => {
            let ctx = get_context()?;
            let user = ctx.register_user(&name, &email)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
                return Ok(());
            }

            output::success(&format!("User registered: {}", user.id));
            Ok(())
        }
    }
}
