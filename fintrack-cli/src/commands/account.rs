//! Account commands

use anyhow::{anyhow, Result};
use clap::Subcommand;
use fintrack_core::AccountDraft;

use super::{confirm, parse_amount, App};
use crate::output::{self, format_amount};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an account
    Add {
        name: String,
        /// Account type (Bank, Cash, E-Wallet, Credit Card, ...)
        #[arg(long = "type", short = 't')]
        account_type: String,
        /// Opening balance
        #[arg(long, short, default_value = "0", allow_hyphen_values = true)]
        balance: String,
        /// Account number
        #[arg(long, short, default_value = "")]
        number: String,
    },
    /// Change an account; omitted fields keep their value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", short = 't')]
        account_type: Option<String>,
        #[arg(long, short, allow_hyphen_values = true)]
        balance: Option<String>,
        #[arg(long, short)]
        number: Option<String>,
    },
    /// Delete an account
    Remove {
        id: String,
        /// Skip confirmation
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    let app = App::open()?;
    app.open_session()?;

    match command {
        AccountCommands::List { json } => list(&app, json),
        AccountCommands::Add {
            name,
            account_type,
            balance,
            number,
        } => {
            let draft = AccountDraft::new(name, number, parse_amount(&balance)?, account_type);
            let account = app.block_on(app.ctx.accounts.add(draft))?;
            output::success(&format!("Added account {} ({})", account.name, account.id));
            Ok(())
        }
        AccountCommands::Update {
            id,
            name,
            account_type,
            balance,
            number,
        } => {
            let current = app
                .ctx
                .accounts
                .find(&id)
                .ok_or_else(|| anyhow!("No account with id '{}'", id))?;
            let draft = AccountDraft::new(
                name.unwrap_or(current.name),
                number.unwrap_or(current.number),
                balance
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?
                    .unwrap_or(current.balance),
                account_type.unwrap_or(current.account_type),
            );
            let account = app.block_on(app.ctx.accounts.update(&id, draft))?;
            output::success(&format!(
                "Updated account {} ({})",
                account.name,
                format_amount(account.balance)
            ));
            Ok(())
        }
        AccountCommands::Remove { id, force } => {
            let label = app
                .ctx
                .accounts
                .find(&id)
                .map(|a| a.name)
                .unwrap_or_else(|| id.clone());
            if !confirm(&format!("Delete account '{}'?", label), force)? {
                output::info("Cancelled.");
                return Ok(());
            }
            app.block_on(app.ctx.accounts.remove(&id))?;
            output::success(&format!("Deleted account {}", label));
            Ok(())
        }
    }
}

fn list(app: &App, json: bool) -> Result<()> {
    let accounts = app.ctx.accounts.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        output::info("No accounts yet. Add one with 'ft account add'.");
        return Ok(());
    }
    println!("{}", output::accounts_table(&accounts));
    println!("Total balance: {}", format_amount(app.ctx.accounts.total_balance()));
    Ok(())
}
