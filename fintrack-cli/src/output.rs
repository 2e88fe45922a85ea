//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use fintrack_core::{Account, Category, EntryKind, Transaction};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format whole currency units as Rupiah with dot thousands separators
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Amount colored by direction
pub fn format_flow(kind: EntryKind, amount: i64) -> String {
    match kind {
        EntryKind::Income => format!("+{}", format_amount(amount)).green().to_string(),
        EntryKind::Expense => format!("-{}", format_amount(amount)).red().to_string(),
    }
}

pub fn accounts_table(accounts: &[Account]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Type", "Number", "Balance"]);
    for account in accounts {
        table.add_row(vec![
            account.id.clone(),
            account.name.clone(),
            account.account_type.clone(),
            account.display_number().unwrap_or("").to_string(),
            format_amount(account.balance),
        ]);
    }
    table
}

pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Account", "Amount"]);
    for tx in transactions {
        table.add_row(vec![
            tx.id.clone(),
            tx.date.to_string(),
            tx.description.clone(),
            tx.category.clone(),
            tx.account_name.clone(),
            format_flow(tx.kind, tx.amount),
        ]);
    }
    table
}

pub fn categories_table(categories: &[Category]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Type", "Name"]);
    for category in categories {
        table.add_row(vec![category.kind.to_string(), category.name.clone()]);
    }
    table
}
