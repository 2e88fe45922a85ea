//! Report command - totals, trend and category breakdown

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;
use fintrack_core::services::summary::DEFAULT_TREND_MONTHS_BACK;
use fintrack_core::services::{report, ReportFilter};
use fintrack_core::YearMonth;

use super::App;
use crate::output::{self, format_amount};

#[derive(Args)]
pub struct ReportArgs {
    /// Report month (YYYY-MM), defaults to the current month
    #[arg(long, short)]
    month: Option<YearMonth>,
    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Only this account
    #[arg(long, short)]
    account: Option<String>,
    /// Only this category
    #[arg(long, short)]
    category: Option<String>,
    /// Months before the report month shown in the trend
    #[arg(long, default_value_t = DEFAULT_TREND_MONTHS_BACK)]
    months_back: u32,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ReportArgs) -> Result<()> {
    let app = App::open()?;
    app.open_session()?;

    let filter = ReportFilter {
        from: args.from,
        to: args.to,
        account: args.account,
        category: args.category,
    };
    let month = args.month.unwrap_or_else(YearMonth::current);
    let transactions = app.ctx.transactions.snapshot();
    let report = report(&transactions, &filter, month, args.months_back);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("Report {}", report.month).bold());
    println!();
    let mut table = output::create_table();
    table.add_row(vec!["Transactions".to_string(), report.count.to_string()]);
    table.add_row(vec!["Income".to_string(), format_amount(report.total_income).green().to_string()]);
    table.add_row(vec!["Expense".to_string(), format_amount(report.total_expense).red().to_string()]);
    table.add_row(vec!["Net".to_string(), format_amount(report.net)]);
    println!("{}", table);

    println!();
    println!("{}", "Trend".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Month", "Income", "Expense"]);
    for totals in &report.trend {
        table.add_row(vec![
            totals.month.to_string(),
            format_amount(totals.income),
            format_amount(totals.expense),
        ]);
    }
    println!("{}", table);

    if !report.comparison.is_empty() {
        println!();
        println!("{}", format!("Expenses vs {}", report.month.previous()).bold());
        let mut table = output::create_table();
        table.set_header(vec!["Category", "This month", "Last month"]);
        for row in &report.comparison {
            table.add_row(vec![
                row.category.clone(),
                format_amount(row.current),
                format_amount(row.previous),
            ]);
        }
        println!("{}", table);
    }

    if !report.shares.is_empty() {
        println!();
        println!("{}", "By category".bold());
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Count", "Total", "Share"]);
        for share in &report.shares {
            table.add_row(vec![
                share.category.clone(),
                share.count.to_string(),
                format_amount(share.total),
                format!("{:.1}%", share.percent),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}
