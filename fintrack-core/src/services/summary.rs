//! Dashboard and report figures computed from store snapshots

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Account, Transaction, YearMonth};

/// Months before the report month included in the trend
pub const DEFAULT_TREND_MONTHS_BACK: u32 = 5;

/// Narrows the transactions a report covers; empty fields match everything
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Account name, case-insensitive
    pub account: Option<String>,
    /// Category name, case-insensitive
    pub category: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if let Some(account) = &self.account {
            if !tx.account_name.eq_ignore_ascii_case(account.trim()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !tx.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub month: YearMonth,
    pub total_balance: i64,
    pub month_income: i64,
    pub month_expense: i64,
    pub account_count: usize,
    pub transaction_count: usize,
}

/// Balance across all accounts plus the month's cash flow
///
/// Sums saturate at the `i64` bounds.
pub fn dashboard(accounts: &[Account], transactions: &[Transaction], month: YearMonth) -> Dashboard {
    let (month_income, month_expense) = flow(transactions.iter().filter(|t| month.contains(t.date)));
    Dashboard {
        month,
        total_balance: accounts.iter().map(|a| a.balance).fold(0, i64::saturating_add),
        month_income,
        month_expense,
        account_count: accounts.len(),
        transaction_count: transactions.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub month: YearMonth,
    pub income: i64,
    pub expense: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryComparison {
    pub category: String,
    pub current: i64,
    pub previous: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    pub total: i64,
    /// Share of all filtered amounts, 0-100
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub month: YearMonth,
    pub filter: ReportFilter,
    pub total_income: i64,
    pub total_expense: i64,
    pub net: i64,
    pub count: usize,
    /// Oldest month first, ending with `month`
    pub trend: Vec<MonthTotals>,
    /// Expense categories of `month` by name, against the previous month
    pub comparison: Vec<CategoryComparison>,
    /// Largest total first
    pub shares: Vec<CategoryShare>,
}

pub fn report(
    transactions: &[Transaction],
    filter: &ReportFilter,
    month: YearMonth,
    months_back: u32,
) -> Report {
    let selected: Vec<&Transaction> = transactions.iter().filter(|t| filter.matches(t)).collect();

    let (total_income, total_expense) = flow(selected.iter().copied());

    let trend = (0..=months_back)
        .rev()
        .map(|back| {
            let ym = month.minus_months(back);
            let (income, expense) = flow(selected.iter().copied().filter(|t| ym.contains(t.date)));
            MonthTotals {
                month: ym,
                income,
                expense,
            }
        })
        .collect();

    let current = expense_by_category(&selected, month);
    let previous = expense_by_category(&selected, month.previous());
    let comparison = current
        .iter()
        .map(|(category, amount)| CategoryComparison {
            category: category.clone(),
            current: *amount,
            previous: previous.get(category).copied().unwrap_or(0),
        })
        .collect();

    let grand_total = selected.iter().map(|t| t.amount).fold(0, i64::saturating_add);
    let mut grouped: BTreeMap<&str, (usize, i64)> = BTreeMap::new();
    for tx in &selected {
        let entry = grouped.entry(tx.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(tx.amount);
    }
    let mut shares: Vec<CategoryShare> = grouped
        .into_iter()
        .map(|(category, (count, total))| CategoryShare {
            category: category.to_string(),
            count,
            total,
            percent: if grand_total == 0 {
                0.0
            } else {
                total as f64 * 100.0 / grand_total as f64
            },
        })
        .collect();
    shares.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    Report {
        month,
        filter: filter.clone(),
        total_income,
        total_expense,
        net: total_income.saturating_sub(total_expense),
        count: selected.len(),
        trend,
        comparison,
        shares,
    }
}

fn flow<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> (i64, i64) {
    transactions.fold((0, 0), |(income, expense), tx| {
        if tx.is_income() {
            (income.saturating_add(tx.amount), expense)
        } else {
            (income, expense.saturating_add(tx.amount))
        }
    })
}

fn expense_by_category(transactions: &[&Transaction], month: YearMonth) -> BTreeMap<String, i64> {
    let mut totals = BTreeMap::new();
    for tx in transactions.iter().filter(|t| !t.is_income() && month.contains(t.date)) {
        let total = totals.entry(tx.category.clone()).or_insert(0i64);
        *total = total.saturating_add(tx.amount);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountDraft, EntryKind, TransactionDraft, TYPE_BANK, TYPE_CASH};

    fn tx(id: &str, date: &str, category: &str, kind: EntryKind, amount: i64, account: &str) -> Transaction {
        TransactionDraft {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: String::new(),
            category: category.to_string(),
            kind,
            amount,
            account_name: account.to_string(),
            account_type: TYPE_BANK.to_string(),
        }
        .into_transaction(id)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", "2025-12-01", "Gaji", EntryKind::Income, 9_000_000, "BCA"),
            tx("2", "2025-12-03", "Makanan", EntryKind::Expense, 50_000, "Cash"),
            tx("3", "2025-12-10", "Transport", EntryKind::Expense, 30_000, "BCA"),
            tx("4", "2025-11-20", "Makanan", EntryKind::Expense, 70_000, "Cash"),
            tx("5", "2025-06-15", "Gaji", EntryKind::Income, 8_000_000, "BCA"),
        ]
    }

    #[test]
    fn test_dashboard_month_flow() {
        let accounts = vec![
            AccountDraft::new("BCA", "1", 5_000_000, TYPE_BANK).into_account("a1"),
            AccountDraft::new("Cash", "-", 200_000, TYPE_CASH).into_account("a2"),
        ];
        let board = dashboard(&accounts, &sample(), YearMonth::new(2025, 12));

        assert_eq!(board.total_balance, 5_200_000);
        assert_eq!(board.month_income, 9_000_000);
        assert_eq!(board.month_expense, 80_000);
        assert_eq!(board.transaction_count, 5);
    }

    #[test]
    fn test_totals_saturate_on_extreme_amounts() {
        let accounts = vec![
            AccountDraft::new("A", "1", i64::MAX, TYPE_BANK).into_account("a1"),
            AccountDraft::new("B", "2", 1, TYPE_BANK).into_account("a2"),
        ];
        let transactions = vec![
            tx("1", "2025-12-01", "Gaji", EntryKind::Income, i64::MAX, "A"),
            tx("2", "2025-12-02", "Gaji", EntryKind::Income, i64::MAX, "A"),
            tx("3", "2025-12-03", "Makanan", EntryKind::Expense, i64::MAX, "B"),
        ];

        let board = dashboard(&accounts, &transactions, YearMonth::new(2025, 12));
        assert_eq!(board.total_balance, i64::MAX);
        assert_eq!(board.month_income, i64::MAX);

        let report = report(&transactions, &ReportFilter::default(), YearMonth::new(2025, 12), 1);
        assert_eq!(report.total_income, i64::MAX);
        assert_eq!(report.net, 0);
        assert_eq!(report.shares[0].total, i64::MAX);
    }

    #[test]
    fn test_report_totals_and_trend() {
        let report = report(&sample(), &ReportFilter::default(), YearMonth::new(2025, 12), 5);

        assert_eq!(report.total_income, 17_000_000);
        assert_eq!(report.total_expense, 150_000);
        assert_eq!(report.net, 16_850_000);
        assert_eq!(report.trend.len(), 6);
        assert_eq!(report.trend[0].month, YearMonth::new(2025, 7));
        assert_eq!(report.trend[4].expense, 70_000);
        assert_eq!(report.trend[5].income, 9_000_000);
        // June falls outside the window
        assert!(report.trend.iter().all(|m| m.income != 8_000_000));
    }

    #[test]
    fn test_category_comparison_and_shares() {
        let report = report(&sample(), &ReportFilter::default(), YearMonth::new(2025, 12), 0);

        assert_eq!(
            report.comparison,
            vec![
                CategoryComparison {
                    category: "Makanan".to_string(),
                    current: 50_000,
                    previous: 70_000,
                },
                CategoryComparison {
                    category: "Transport".to_string(),
                    current: 30_000,
                    previous: 0,
                },
            ]
        );
        assert_eq!(report.shares[0].category, "Gaji");
        assert_eq!(report.shares[0].count, 2);
        let sum: f64 = report.shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_by_account_and_range() {
        let filter = ReportFilter {
            from: NaiveDate::from_ymd_opt(2025, 11, 1),
            to: NaiveDate::from_ymd_opt(2025, 12, 5),
            account: Some("cash".to_string()),
            category: None,
        };
        let report = report(&sample(), &filter, YearMonth::new(2025, 12), 1);

        assert_eq!(report.count, 2);
        assert_eq!(report.total_expense, 120_000);
        assert_eq!(report.total_income, 0);
    }

    #[test]
    fn test_empty_report() {
        let report = report(&[], &ReportFilter::default(), YearMonth::new(2025, 1), 2);
        assert_eq!(report.count, 0);
        assert!(report.shares.is_empty());
        assert_eq!(report.trend[0].month, YearMonth::new(2024, 11));
    }
}
