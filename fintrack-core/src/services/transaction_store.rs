//! Transaction mutations
//!
//! ADD, UPDATE and DELETE all answer `SUMMARY|id|...`. Only the echoed id
//! is used; the remaining summary fields are ignored.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{Transaction, TransactionDraft, YearMonth};
use crate::protocol::{transaction_fields, verbs, Response};

use super::store::EntityStore;

pub type TransactionStore = EntityStore<Transaction>;

fn summary_id(response: &Response) -> Result<String> {
    response.expect_verb(verbs::SUMMARY)?;
    response
        .field(0)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::protocol("SUMMARY response without transaction id"))
}

impl EntityStore<Transaction> {
    pub async fn add(&self, draft: TransactionDraft) -> Result<Transaction> {
        let draft = draft.normalized();
        draft.validate().map_err(Error::validation)?;

        let response = self
            .request(verbs::ADD, &transaction_fields(&draft))
            .await?;
        let id = summary_id(&response)?;

        let transaction = draft.into_transaction(id);
        let added = transaction.clone();
        self.apply(move |items| match items.iter_mut().find(|t| t.id == added.id) {
            Some(slot) => *slot = added,
            None => items.push(added),
        });
        Ok(transaction)
    }

    pub async fn update(&self, id: &str, draft: TransactionDraft) -> Result<Transaction> {
        let draft = draft.normalized();
        draft.validate().map_err(Error::validation)?;

        let mut fields = Vec::with_capacity(8);
        fields.push(id.to_string());
        fields.extend(transaction_fields(&draft));
        let response = self.request(verbs::UPDATE, &fields).await?;
        let echoed = summary_id(&response)?;
        if echoed != id {
            debug!(requested = id, echoed = %echoed, "UPDATE echoed a different id");
        }

        let transaction = draft.into_transaction(id);
        let updated = transaction.clone();
        self.apply(move |items| match items.iter_mut().find(|t| t.id == updated.id) {
            Some(slot) => *slot = updated,
            None => items.push(updated),
        });
        Ok(transaction)
    }

    /// Delete a transaction; returns the removed id
    pub async fn remove(&self, id: &str) -> Result<String> {
        let response = self.request(verbs::DELETE, &[id.to_string()]).await?;
        summary_id(&response)?;

        let removed = id.to_string();
        self.apply(|items| items.retain(|t| t.id != removed));
        Ok(id.to_string())
    }

    pub fn find(&self, id: &str) -> Option<Transaction> {
        self.snapshot().iter().find(|t| t.id == id).cloned()
    }

    /// Cached transactions dated in `month`, newest first
    pub fn in_month(&self, month: YearMonth) -> Vec<Transaction> {
        self.snapshot()
            .iter()
            .filter(|t| month.contains(t.date))
            .cloned()
            .collect()
    }

    /// Cached transactions dated within `[from, to]`
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Transaction> {
        self.snapshot()
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect()
    }

    /// Callback form of [`add`](Self::add)
    pub fn add_to_backend<S, E>(self: &Arc<Self>, draft: TransactionDraft, on_success: S, on_error: E)
    where
        S: FnOnce(Transaction) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.spawn(|store| async move { store.add(draft).await }, on_success, on_error);
    }

    /// Callback form of [`update`](Self::update)
    pub fn update_on_backend<S, E>(
        self: &Arc<Self>,
        id: impl Into<String>,
        draft: TransactionDraft,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(Transaction) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let id = id.into();
        self.spawn(
            |store| async move { store.update(&id, draft).await },
            on_success,
            on_error,
        );
    }

    /// Callback form of [`remove`](Self::remove)
    pub fn remove_from_backend<S, E>(self: &Arc<Self>, id: impl Into<String>, on_success: S, on_error: E)
    where
        S: FnOnce(String) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let id = id.into();
        self.spawn(|store| async move { store.remove(&id).await }, on_success, on_error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::runtime::Handle;

    use crate::adapters::scripted::ScriptedTransport;
    use crate::domain::{EntryKind, Session, SessionContext};
    use crate::services::dispatcher::{self, DispatchQueue};

    fn setup(transport: Arc<ScriptedTransport>) -> (Arc<TransactionStore>, DispatchQueue) {
        let (dispatcher, queue) = dispatcher::channel();
        let session = SessionContext::from_session(Session::new("tok", "alice"));
        let store = TransactionStore::new(transport, session, dispatcher, Handle::current());
        (Arc::new(store), queue)
    }

    fn draft(date: &str, amount: i64) -> TransactionDraft {
        TransactionDraft {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: "Lunch".to_string(),
            category: "Makanan".to_string(),
            kind: EntryKind::Expense,
            amount,
            account_name: "Cash".to_string(),
            account_type: "Cash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_appends_with_echoed_id() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply("SUMMARY|t-42|1000000|50000");
        let (store, mut queue) = setup(transport.clone());

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = seen.clone();
        store.add_listener(move |snap| log.lock().unwrap().push(snap.len()));

        let tx = store.add(draft("2025-12-03", 50_000)).await.unwrap();
        queue.run_pending();

        assert_eq!(tx.id, "t-42");
        assert_eq!(store.find("t-42").unwrap().amount, 50_000);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
        assert_eq!(
            transport.sent(),
            vec!["ADD|tok|2025-12-03|Lunch|Makanan|expense|50000|Cash|Cash"]
        );
    }

    #[tokio::test]
    async fn test_rejected_amount_keeps_cache() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply("DATA_ALL|1|t1|2025-12-01|Salary|Gaji|income|9000000|BCA|Bank")
            .reply("ERROR|INVALID_AMOUNT");
        let (store, _queue) = setup(transport);
        let before = store.load().await.unwrap();

        let err = store.add(draft("2025-12-03", 10)).await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid amount. Please enter a valid number.");
        assert!(store.snapshot().ptr_eq(&before));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_locally() {
        let transport = Arc::new(ScriptedTransport::new());
        let (store, _queue) = setup(transport.clone());

        assert!(matches!(
            store.add(draft("2025-12-03", 0)).await,
            Err(Error::Validation(_))
        ));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cache_stays_newest_first() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply("DATA_ALL|2|t1|2025-12-05|A|Makanan|expense|1|Cash|Cash|t2|2025-11-30|B|Makanan|expense|2|Cash|Cash")
            .reply("SUMMARY|t3")
            .reply("SUMMARY|t1")
            .reply("SUMMARY|t2");
        let (store, _queue) = setup(transport.clone());
        store.load().await.unwrap();

        store.add(draft("2025-12-01", 3)).await.unwrap();
        let ids: Vec<_> = store.snapshot().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["t1", "t3", "t2"]);

        store.update("t1", draft("2025-10-01", 7)).await.unwrap();
        let ids: Vec<_> = store.snapshot().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["t3", "t2", "t1"]);

        store.remove("t2").await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(transport.sent()[3], "DELETE|tok|t2");
    }

    #[tokio::test]
    async fn test_unexpected_verb_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply("OK");
        let (store, _queue) = setup(transport);

        let err = store.remove("t1").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_month_filter() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply("DATA_ALL|2|t1|2025-12-05|A|Makanan|expense|1|Cash|Cash|t2|2025-11-30|B|Makanan|expense|2|Cash|Cash");
        let (store, _queue) = setup(transport);
        store.load().await.unwrap();

        let december = store.in_month(YearMonth::new(2025, 12));
        assert_eq!(december.len(), 1);
        assert_eq!(december[0].id, "t1");
    }

    #[tokio::test]
    async fn test_remove_notifies_listener_once() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply("DATA_ALL|2|id1|2025-12-05|A|Makanan|expense|1|Cash|Cash|id2|2025-11-30|B|Makanan|expense|2|Cash|Cash")
            .reply("SUMMARY|id1");
        let (store, mut queue) = setup(transport);
        store.load().await.unwrap();
        queue.run_pending();

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = seen.clone();
        store.add_listener(move |snap| {
            log.lock().unwrap().push(snap.iter().map(|t| t.id.clone()).collect::<Vec<_>>())
        });

        store.remove("id1").await.unwrap();
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![vec!["id1", "id2"], vec!["id2"]]);
    }

    #[tokio::test]
    async fn test_add_replaces_entry_already_reloaded() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply("DATA_ALL|1|t-42|2025-12-03|Lunch|Makanan|expense|50000|Cash|Cash")
            .reply("SUMMARY|t-42");
        let (store, _queue) = setup(transport);
        store.load().await.unwrap();

        store.add(draft("2025-12-03", 50_000)).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.find("t-42").unwrap().amount, 50_000);
    }
}
