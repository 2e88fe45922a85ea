//! Core domain entities
//!
//! All cached entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod category;
pub mod period;
pub mod result;
mod session;
mod snapshot;
mod transaction;

pub use account::{Account, AccountDraft, NO_NUMBER, TYPE_BANK, TYPE_CASH, TYPE_CREDIT, TYPE_WALLET};
pub use category::Category;
pub use period::YearMonth;
pub use session::{Session, SessionContext};
pub use snapshot::Snapshot;
pub use transaction::{EntryKind, Transaction, TransactionDraft, DATE_FORMAT};
