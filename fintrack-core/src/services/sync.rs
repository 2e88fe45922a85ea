//! Sync service - reload every store from the backend

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::result::Result;
use crate::ports::EventSink;

use super::account_store::AccountStore;
use super::category_store::CategoryStore;
use super::transaction_store::TransactionStore;

/// Entry counts after a full refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub accounts: usize,
    pub transactions: usize,
    pub categories: usize,
}

/// Reloads the three stores together
///
/// Also the subscription's [`EventSink`]: a `DATA_CHANGED` push triggers a
/// background reload of everything.
#[derive(Clone)]
pub struct SyncService {
    accounts: Arc<AccountStore>,
    transactions: Arc<TransactionStore>,
    categories: Arc<CategoryStore>,
}

impl SyncService {
    pub fn new(
        accounts: Arc<AccountStore>,
        transactions: Arc<TransactionStore>,
        categories: Arc<CategoryStore>,
    ) -> Self {
        Self {
            accounts,
            transactions,
            categories,
        }
    }

    /// Load all three stores concurrently
    ///
    /// Each store is updated independently; the first failure is returned
    /// after every load has finished.
    pub async fn refresh_all(&self) -> Result<SyncResult> {
        let (accounts, transactions, categories) = tokio::join!(
            self.accounts.load(),
            self.transactions.load(),
            self.categories.load(),
        );
        let result = SyncResult {
            accounts: accounts?.len(),
            transactions: transactions?.len(),
            categories: categories?.len(),
        };
        info!(
            accounts = result.accounts,
            transactions = result.transactions,
            categories = result.categories,
            "refreshed all stores"
        );
        Ok(result)
    }

    /// Fire-and-forget reload; failures are only logged
    pub fn refresh_in_background(&self) {
        self.accounts.load_from_backend(
            |_| {},
            |err| warn!("account refresh failed: {}", err),
        );
        self.transactions.load_from_backend(
            |_| {},
            |err| warn!("transaction refresh failed: {}", err),
        );
        self.categories.load_from_backend(
            |_| {},
            |err| warn!("category refresh failed: {}", err),
        );
    }
}

impl EventSink for SyncService {
    fn data_changed(&self) {
        self.refresh_in_background();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::runtime::Handle;

    use crate::domain::result::Error;
    use crate::domain::{Session, SessionContext};
    use crate::ports::CommandTransport;
    use crate::services::dispatcher::{self, DispatchQueue};

    /// Answers by verb so concurrent loads need no fixed order
    struct RoutedTransport {
        routes: HashMap<&'static str, &'static str>,
        hits: Mutex<usize>,
    }

    #[async_trait]
    impl CommandTransport for RoutedTransport {
        async fn send(&self, command: &str) -> Result<String> {
            *self.hits.lock().unwrap() += 1;
            let verb = command.split('|').next().unwrap_or("");
            self.routes
                .get(verb)
                .map(|r| r.to_string())
                .ok_or_else(|| Error::communication("no route"))
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn service(routes: &[(&'static str, &'static str)]) -> (SyncService, DispatchQueue) {
        let transport = Arc::new(RoutedTransport {
            routes: routes.iter().copied().collect(),
            hits: Mutex::new(0),
        });
        let session = SessionContext::from_session(Session::new("tok", "alice"));
        let (dispatcher, queue) = dispatcher::channel();
        let handle = Handle::current();
        let sync = SyncService::new(
            Arc::new(AccountStore::new(transport.clone(), session.clone(), dispatcher.clone(), handle.clone())),
            Arc::new(TransactionStore::new(transport.clone(), session.clone(), dispatcher.clone(), handle.clone())),
            Arc::new(CategoryStore::new(transport, session, dispatcher, handle)),
        );
        (sync, queue)
    }

    #[tokio::test]
    async fn test_refresh_all_loads_every_store() {
        let (sync, _queue) = service(&[
            ("GET_ACCOUNTS", "DATA_ACCOUNTS|1|a1|BCA|123|500000|Bank"),
            ("GET_ALL", "DATA_ALL|0"),
            ("GET_CATEGORIES", "DATA_CATEGORIES|2|expense|Makanan|income|Gaji"),
        ]);

        let result = sync.refresh_all().await.unwrap();
        assert_eq!(
            result,
            SyncResult {
                accounts: 1,
                transactions: 0,
                categories: 2
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_all_keeps_successful_loads_on_failure() {
        let (sync, _queue) = service(&[
            ("GET_ACCOUNTS", "DATA_ACCOUNTS|1|a1|BCA|123|500000|Bank"),
            ("GET_CATEGORIES", "DATA_CATEGORIES|0"),
        ]);

        assert!(sync.refresh_all().await.is_err());
        assert_eq!(sync.accounts.len(), 1);
    }

    /// One notification counter per store, in accounts/transactions/categories order
    fn count_notifications(sync: &SyncService) -> [Arc<AtomicUsize>; 3] {
        let counters = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let c = counters[0].clone();
        sync.accounts.add_listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = counters[1].clone();
        sync.transactions.add_listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = counters[2].clone();
        sync.categories.add_listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        counters
    }

    fn counts(counters: &[Arc<AtomicUsize>; 3]) -> [usize; 3] {
        [
            counters[0].load(Ordering::SeqCst),
            counters[1].load(Ordering::SeqCst),
            counters[2].load(Ordering::SeqCst),
        ]
    }

    async fn run_jobs(queue: &mut DispatchQueue, n: usize) {
        for _ in 0..n {
            let ran = tokio::time::timeout(Duration::from_secs(2), queue.run_next())
                .await
                .expect("dispatched job did not arrive");
            assert!(ran);
        }
    }

    #[tokio::test]
    async fn test_data_changed_reloads_in_background() {
        let (sync, mut queue) = service(&[
            ("GET_ACCOUNTS", "DATA_ACCOUNTS|1|a1|BCA|123|500000|Bank"),
            ("GET_ALL", "DATA_ALL|1|t1|2025-12-03|Lunch|Makanan|expense|50000|Cash|Cash"),
            ("GET_CATEGORIES", "DATA_CATEGORIES|1|expense|Makanan"),
        ]);
        let counters = count_notifications(&sync);
        assert_eq!(counts(&counters), [1, 1, 1]);

        sync.data_changed();
        // Per store: one snapshot notification and one completion callback
        run_jobs(&mut queue, 6).await;

        assert_eq!(counts(&counters), [2, 2, 2]);
        assert_eq!(queue.run_pending(), 0);
        assert_eq!(sync.accounts.len(), 1);
        assert_eq!(sync.transactions.len(), 1);
        assert_eq!(sync.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_block_other_stores() {
        let (sync, mut queue) = service(&[
            ("GET_ACCOUNTS", "DATA_ACCOUNTS|1|a1|BCA|123|500000|Bank"),
            ("GET_CATEGORIES", "DATA_CATEGORIES|1|expense|Makanan"),
        ]);
        let counters = count_notifications(&sync);

        sync.data_changed();
        // Two stores publish and complete; the failing one only reports
        run_jobs(&mut queue, 5).await;

        assert_eq!(counts(&counters), [2, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
        assert!(sync.transactions.is_empty());
    }
}
