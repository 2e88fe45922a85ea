//! Account domain model

use serde::{Deserialize, Serialize};

pub const TYPE_BANK: &str = "Bank";
pub const TYPE_WALLET: &str = "Dompet Digital";
pub const TYPE_CASH: &str = "Cash";
pub const TYPE_CREDIT: &str = "Kredit";

/// Placeholder the backend uses for accounts without a number
pub const NO_NUMBER: &str = "-";

/// A money account mirrored from the backend
/// Note: account_type is a freeform string. The app offers "Bank",
/// "Dompet Digital", "Cash" and "Kredit" but any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Server-issued opaque id
    pub id: String,
    pub name: String,
    pub number: String,
    /// Balance in whole currency units
    pub balance: i64,
    pub account_type: String,
}

impl Account {
    /// Account number, or None for the backend placeholder
    pub fn display_number(&self) -> Option<&str> {
        match self.number.trim() {
            "" | NO_NUMBER => None,
            n => Some(n),
        }
    }

    /// Credit accounts are liabilities, everything else is an asset
    pub fn is_liability(&self) -> bool {
        self.account_type.eq_ignore_ascii_case(TYPE_CREDIT)
    }
}

/// Fields of an account the client proposes; the id comes from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDraft {
    pub name: String,
    pub number: String,
    pub balance: i64,
    pub account_type: String,
}

impl AccountDraft {
    pub fn new(
        name: impl Into<String>,
        number: impl Into<String>,
        balance: i64,
        account_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            balance,
            account_type: account_type.into(),
        }
    }

    /// Trim fields and substitute the placeholder for a missing number
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.account_type = self.account_type.trim().to_string();
        let number = self.number.trim();
        self.number = if number.is_empty() {
            NO_NUMBER.to_string()
        } else {
            number.to_string()
        };
        self
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("account name cannot be empty");
        }
        if self.account_type.trim().is_empty() {
            return Err("account type cannot be empty");
        }
        Ok(())
    }

    pub fn into_account(self, id: impl Into<String>) -> Account {
        Account {
            id: id.into(),
            name: self.name,
            number: self.number,
            balance: self.balance,
            account_type: self.account_type,
        }
    }
}

impl From<&Account> for AccountDraft {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            number: account.number.clone(),
            balance: account.balance,
            account_type: account.account_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_number_is_hidden() {
        let account = AccountDraft::new("Cash", "-", 100_000, TYPE_CASH).into_account("id1");
        assert_eq!(account.display_number(), None);

        let bank = AccountDraft::new("BCA", "1234", 500_000, TYPE_BANK).into_account("id2");
        assert_eq!(bank.display_number(), Some("1234"));
    }

    #[test]
    fn test_normalized_fills_placeholder() {
        let draft = AccountDraft::new("  Wallet ", "", 0, " Dompet Digital ").normalized();
        assert_eq!(draft.name, "Wallet");
        assert_eq!(draft.number, NO_NUMBER);
        assert_eq!(draft.account_type, TYPE_WALLET);
    }

    #[test]
    fn test_account_validation() {
        assert!(AccountDraft::new("BCA", "1", 0, TYPE_BANK).validate().is_ok());
        assert!(AccountDraft::new("  ", "1", 0, TYPE_BANK).validate().is_err());
        assert!(AccountDraft::new("BCA", "1", 0, "").validate().is_err());
    }

    #[test]
    fn test_credit_is_liability() {
        let card = AccountDraft::new("Visa", "9", -200, "kredit").into_account("c");
        assert!(card.is_liability());
    }
}
