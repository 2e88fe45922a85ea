//! Status command - show connection, session and data summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fintrack_core::services::{SessionStatus, StatusSummary};

use super::App;
use crate::output::{self, format_amount};

pub fn run(json: bool) -> Result<()> {
    let app = App::open()?;
    let status = collect_status(&app, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "FinTrack Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let session = match status.session {
        SessionStatus::Valid => format!(
            "logged in as {}",
            status.username.as_deref().unwrap_or("?")
        )
        .green()
        .to_string(),
        SessionStatus::Invalid => "expired, please login again".red().to_string(),
        SessionStatus::Missing => "not logged in".yellow().to_string(),
    };
    table.add_row(vec!["Server".to_string(), status.server.clone()]);
    table.add_row(vec!["Session".to_string(), session]);
    table.add_row(vec![
        "Connection attempts".to_string(),
        status.channel.connect_attempts.to_string(),
    ]);
    table.add_row(vec!["Requests".to_string(), status.channel.requests.to_string()]);
    println!("{}", table);

    if status.session != SessionStatus::Valid {
        return Ok(());
    }

    let dashboard = &status.dashboard;
    println!();
    println!("{}", format!("Dashboard {}", dashboard.month).bold());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Accounts".to_string(), dashboard.account_count.to_string()]);
    table.add_row(vec!["Total balance".to_string(), format_amount(dashboard.total_balance)]);
    table.add_row(vec!["Income this month".to_string(), format_amount(dashboard.month_income)]);
    table.add_row(vec!["Expense this month".to_string(), format_amount(dashboard.month_expense)]);
    table.add_row(vec!["Transactions".to_string(), dashboard.transaction_count.to_string()]);
    table.add_row(vec!["Categories".to_string(), status.category_count.to_string()]);
    println!("{}", table);

    Ok(())
}

/// Validate before refreshing so an expired token is reported as such
/// rather than cleared by the failing refresh.
fn collect_status(app: &App, quiet: bool) -> Result<StatusSummary> {
    app.connect()?;

    let session = app.block_on(app.ctx.auth.validate_session())?;
    if session == SessionStatus::Valid {
        if let Err(e) = app.block_on(app.ctx.refresh_all()) {
            if !quiet {
                output::warning(&format!("Could not refresh data: {:#}", e));
            }
        }
    }

    let status = app.block_on(app.ctx.status())?;
    if status.session == SessionStatus::Invalid {
        app.ctx.session.clear();
        app.persist_session()?;
    }
    Ok(status)
}
