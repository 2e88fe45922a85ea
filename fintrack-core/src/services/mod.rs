//! Service layer - business logic orchestration
//!
//! The stores mirror backend collections; the remaining services
//! coordinate them (auth, refresh, reports) for the front ends.

mod account_store;
mod auth;
mod category_store;
pub mod dispatcher;
mod status;
mod store;
pub mod summary;
mod sync;
mod transaction_store;

pub use account_store::AccountStore;
pub use auth::{AuthService, SessionStatus};
pub use category_store::{names_of, CategoryStore};
pub use dispatcher::{DispatchQueue, Dispatcher, Job};
pub use status::StatusSummary;
pub use store::{EntityStore, ListenerId};
pub use summary::{dashboard, report, Dashboard, Report, ReportFilter};
pub use sync::{SyncResult, SyncService};
pub use transaction_store::TransactionStore;
