//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::YearMonth;

/// Wire date format for transactions
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction of money flow, shared by transactions and categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    /// Accepts the English wire names and the app's Indonesian labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(EntryKind::Income),
            "expense" | "pengeluaran" => Ok(EntryKind::Expense),
            other => Err(format!("unknown entry kind '{}'", other)),
        }
    }
}

/// A single income or expense mirrored from the backend
///
/// The account is referenced by name and type, not id: the backend
/// protocol is denormalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub kind: EntryKind,
    /// Always positive; `kind` carries the sign
    pub amount: i64,
    pub account_name: String,
    pub account_type: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    /// Amount with expenses negative
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => self.amount.saturating_neg(),
        }
    }
}

/// Fields of a transaction the client proposes; the id comes from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub kind: EntryKind,
    pub amount: i64,
    pub account_name: String,
    pub account_type: String,
}

impl TransactionDraft {
    /// Trim every free-text field
    pub fn normalized(mut self) -> Self {
        self.description = self.description.trim().to_string();
        self.category = self.category.trim().to_string();
        self.account_name = self.account_name.trim().to_string();
        self.account_type = self.account_type.trim().to_string();
        self
    }

    /// Validate transaction data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.amount <= 0 {
            return Err("amount must be greater than zero");
        }
        if self.category.trim().is_empty() {
            return Err("category cannot be empty");
        }
        if self.account_name.trim().is_empty() {
            return Err("account name cannot be empty");
        }
        Ok(())
    }

    pub fn into_transaction(self, id: impl Into<String>) -> Transaction {
        Transaction {
            id: id.into(),
            date: self.date,
            description: self.description,
            category: self.category,
            kind: self.kind,
            amount: self.amount,
            account_name: self.account_name,
            account_type: self.account_type,
        }
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date,
            description: tx.description.clone(),
            category: tx.category.clone(),
            kind: tx.kind,
            amount: tx.amount,
            account_name: tx.account_name.clone(),
            account_type: tx.account_type.clone(),
        }
    }
}
