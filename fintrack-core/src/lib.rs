//! FinTrack Core - client synchronization layer for the FinTrack backend
//!
//! This crate keeps local mirrors of the backend's collections in sync over
//! a line-based TCP protocol, following hexagonal architecture:
//!
//! - **domain**: Entities (Account, Transaction, Category), session, errors
//! - **protocol**: Wire framing and entity layouts
//! - **ports**: Trait definitions for the transport and event delivery
//! - **adapters**: TCP command channel and subscription channel
//! - **services**: Entity stores, dispatcher, auth, refresh and reports

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod protocol;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use adapters::{ChannelConfig, CommandChannel, SubscriptionChannel};
use config::Config;
use ports::CommandTransport;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Account, AccountDraft, Category, EntryKind, Session, SessionContext, Snapshot, Transaction,
    TransactionDraft, YearMonth,
};

/// Main context for FinTrack operations
///
/// Built once by the front end and passed around. Owns the command channel,
/// the subscription channel, and one store per entity type.
pub struct FinTrackContext {
    pub config: Config,
    pub session: SessionContext,
    pub channel: Arc<CommandChannel>,
    pub auth: AuthService,
    pub accounts: Arc<AccountStore>,
    pub transactions: Arc<TransactionStore>,
    pub categories: Arc<CategoryStore>,
    pub sync: SyncService,
    pub subscription: SubscriptionChannel,
}

impl FinTrackContext {
    /// Wire everything together; no I/O happens here
    ///
    /// `runtime` runs background work for the callback-style store calls,
    /// whose completions are posted to `dispatcher`.
    pub fn new(
        config: Config,
        session: SessionContext,
        dispatcher: Dispatcher,
        runtime: Handle,
    ) -> Self {
        let channel = Arc::new(CommandChannel::new(ChannelConfig::from(&config)));
        let transport: Arc<dyn CommandTransport> = channel.clone();

        let accounts = Arc::new(AccountStore::new(
            Arc::clone(&transport),
            session.clone(),
            dispatcher.clone(),
            runtime.clone(),
        ));
        let transactions = Arc::new(TransactionStore::new(
            Arc::clone(&transport),
            session.clone(),
            dispatcher.clone(),
            runtime.clone(),
        ));
        let categories = Arc::new(CategoryStore::new(
            Arc::clone(&transport),
            session.clone(),
            dispatcher,
            runtime,
        ));

        let sync = SyncService::new(
            Arc::clone(&accounts),
            Arc::clone(&transactions),
            Arc::clone(&categories),
        );
        let subscription = SubscriptionChannel::new(config.address(), Arc::new(sync.clone()));
        let auth = AuthService::new(transport, session.clone());

        Self {
            config,
            session,
            channel,
            auth,
            accounts,
            transactions,
            categories,
            sync,
            subscription,
        }
    }

    /// Load config from the FinTrack directory and build a context
    pub fn from_dir(
        fintrack_dir: &Path,
        session: SessionContext,
        dispatcher: Dispatcher,
        runtime: Handle,
    ) -> Result<Self> {
        let config = Config::load(fintrack_dir)?;
        Ok(Self::new(config, session, dispatcher, runtime))
    }

    /// Open the command socket (single attempt)
    pub async fn connect(&self) -> Result<()> {
        self.channel.connect().await
    }

    /// Reload accounts, transactions and categories
    pub async fn refresh_all(&self) -> Result<SyncResult> {
        self.sync.refresh_all().await
    }

    /// Subscribe to server pushes with the current session token
    pub async fn start_subscription(&self) -> Result<()> {
        let token = self
            .session
            .token()
            .ok_or_else(|| Error::Subscription("No session token available for subscription".to_string()))?;
        self.subscription.start(&token).await
    }

    pub fn stop_subscription(&self) {
        self.subscription.stop();
    }

    /// Overview of connection, session and cached data
    pub async fn status(&self) -> Result<StatusSummary> {
        let session = self.auth.validate_session().await?;
        let accounts = self.accounts.snapshot();
        let transactions = self.transactions.snapshot();

        Ok(StatusSummary {
            server: self.config.address(),
            username: self.session.username(),
            session,
            subscription_running: self.subscription.is_running(),
            channel: self.channel.stats(),
            dashboard: dashboard(&accounts, &transactions, YearMonth::current()),
            category_count: self.categories.len(),
        })
    }

    /// Stop the subscription and close the command socket
    pub async fn shutdown(&self) {
        self.subscription.stop();
        self.channel.disconnect().await;
        info!("fintrack context shut down");
    }
}
