//! Transaction commands

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use fintrack_core::{EntryKind, Transaction, TransactionDraft, YearMonth};

use super::{confirm, parse_amount, App};
use crate::output::{self, format_flow};

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions, newest first
    List {
        /// Only this month (YYYY-MM)
        #[arg(long, short)]
        month: Option<YearMonth>,
        /// Show at most this many rows
        #[arg(long, short = 'n')]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record an income or expense
    Add {
        /// income or expense (pemasukan/pengeluaran also accepted)
        kind: EntryKind,
        amount: String,
        /// Account the money moves through
        #[arg(long, short)]
        account: String,
        #[arg(long, short)]
        category: String,
        #[arg(long, short, default_value = "")]
        description: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change a transaction; omitted fields keep their value
    Update {
        id: String,
        #[arg(long, short)]
        kind: Option<EntryKind>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, short)]
        account: Option<String>,
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction
    Remove {
        id: String,
        /// Skip confirmation
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: TransactionCommands) -> Result<()> {
    let app = App::open()?;
    app.open_session()?;

    match command {
        TransactionCommands::List { month, limit, json } => {
            let mut transactions: Vec<Transaction> = match month {
                Some(month) => app.ctx.transactions.in_month(month),
                None => app.ctx.transactions.snapshot().to_vec(),
            };
            if let Some(limit) = limit {
                transactions.truncate(limit);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&transactions)?);
            } else if transactions.is_empty() {
                output::info("No transactions found.");
            } else {
                println!("{}", output::transactions_table(&transactions));
            }
            Ok(())
        }
        TransactionCommands::Add {
            kind,
            amount,
            account,
            category,
            description,
            date,
        } => {
            let account_type = account_type_of(&app, &account)?;
            let draft = TransactionDraft {
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                description,
                category,
                kind,
                amount: parse_amount(&amount)?,
                account_name: account,
                account_type,
            };
            let tx = app.block_on(app.ctx.transactions.add(draft))?;
            output::success(&format!(
                "Recorded {} {} ({})",
                tx.kind,
                format_flow(tx.kind, tx.amount),
                tx.id
            ));
            Ok(())
        }
        TransactionCommands::Update {
            id,
            kind,
            amount,
            account,
            category,
            description,
            date,
        } => {
            let current = app
                .ctx
                .transactions
                .find(&id)
                .ok_or_else(|| anyhow!("No transaction with id '{}'", id))?;
            let (account_name, account_type) = match account {
                Some(name) => {
                    let account_type = account_type_of(&app, &name)?;
                    (name, account_type)
                }
                None => (current.account_name, current.account_type),
            };
            let draft = TransactionDraft {
                date: date.unwrap_or(current.date),
                description: description.unwrap_or(current.description),
                category: category.unwrap_or(current.category),
                kind: kind.unwrap_or(current.kind),
                amount: amount
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?
                    .unwrap_or(current.amount),
                account_name,
                account_type,
            };
            let tx = app.block_on(app.ctx.transactions.update(&id, draft))?;
            output::success(&format!("Updated transaction {}", tx.id));
            Ok(())
        }
        TransactionCommands::Remove { id, force } => {
            let label = app
                .ctx
                .transactions
                .find(&id)
                .map(|t| format!("{} on {}", t.description, t.date))
                .unwrap_or_else(|| id.clone());
            if !confirm(&format!("Delete transaction '{}'?", label), force)? {
                output::info("Cancelled.");
                return Ok(());
            }
            app.block_on(app.ctx.transactions.remove(&id))?;
            output::success(&format!("Deleted transaction {}", id));
            Ok(())
        }
    }
}

/// Transactions carry the account's type; take it from the cached account
fn account_type_of(app: &App, account_name: &str) -> Result<String> {
    app.ctx
        .accounts
        .find_by_name(account_name)
        .map(|a| a.account_type)
        .ok_or_else(|| {
            anyhow!(
                "Unknown account '{}'. See 'ft account list'.",
                account_name
            )
        })
}
