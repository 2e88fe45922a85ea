//! Client-side mirror of one backend collection
//!
//! An [`EntityStore`] caches every entity of one type. The cache only ever
//! changes after the backend confirms a command, so it always mirrors the
//! last successful server response. Every change publishes a fresh
//! [`Snapshot`] to the registered listeners through the [`Dispatcher`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{SessionContext, Snapshot};
use crate::ports::CommandTransport;
use crate::protocol::{decode_list, format_command, Response, WireEntity};

use super::dispatcher::Dispatcher;

/// Handle returned by [`EntityStore::add_listener`]
pub type ListenerId = u64;

type Listener<T> = Arc<dyn Fn(Snapshot<T>) + Send + Sync>;

struct Cache<T> {
    items: Vec<T>,
    snapshot: Snapshot<T>,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: ListenerId,
}

/// Cache + listeners for one entity type
pub struct EntityStore<T: WireEntity> {
    transport: Arc<dyn CommandTransport>,
    session: SessionContext,
    dispatcher: Dispatcher,
    runtime: Handle,
    cache: Mutex<Cache<T>>,
}

impl<T: WireEntity> EntityStore<T> {
    /// `runtime` runs the network work of the callback-style operations
    pub fn new(
        transport: Arc<dyn CommandTransport>,
        session: SessionContext,
        dispatcher: Dispatcher,
        runtime: Handle,
    ) -> Self {
        Self {
            transport,
            session,
            dispatcher,
            runtime,
            cache: Mutex::new(Cache {
                items: Vec::new(),
                snapshot: Snapshot::empty(),
                listeners: Vec::new(),
                next_listener: 0,
            }),
        }
    }

    /// Register a listener and call it right away with the current snapshot
    ///
    /// The first call happens on the caller's thread, before this returns.
    /// Later snapshots arrive through the dispatcher.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Snapshot<T>) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(listener);
        let (id, current) = {
            let mut cache = self.lock();
            let id = cache.next_listener;
            cache.next_listener += 1;
            cache.listeners.push((id, Arc::clone(&listener)));
            (id, cache.snapshot.clone())
        };
        listener(current);
        id
    }

    /// Returns false if `id` was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut cache = self.lock();
        let before = cache.listeners.len();
        cache.listeners.retain(|(lid, _)| *lid != id);
        cache.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.lock().snapshot.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the whole collection and replace the cache with it
    ///
    /// A malformed or error response leaves the cache untouched.
    pub async fn load(&self) -> Result<Snapshot<T>> {
        let response = self.request(T::LOAD_VERB, &[]).await?;
        let items = decode_list::<T>(&response)?;
        debug!(entity = T::NAME, count = items.len(), "loaded from backend");
        let ((), snapshot) = self.apply(move |cache| *cache = items);
        Ok(snapshot)
    }

    /// Callback form of [`load`](Self::load)
    pub fn load_from_backend<S, E>(self: &Arc<Self>, on_success: S, on_error: E)
    where
        S: FnOnce(Snapshot<T>) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.spawn(|store| async move { store.load().await }, on_success, on_error);
    }

    /// Send `verb|token|fields...` and classify error envelopes
    pub(crate) async fn request(&self, verb: &str, fields: &[String]) -> Result<Response> {
        let token = self.session.require_token()?;

        let mut parts: Vec<&str> = Vec::with_capacity(fields.len() + 2);
        parts.push(verb);
        parts.push(&token);
        parts.extend(fields.iter().map(String::as_str));

        let line = self.transport.send(&format_command(&parts)).await?;
        let response = Response::parse(&line);
        if let Some(err) = response.error() {
            debug!(entity = T::NAME, verb, error = %err, "backend rejected command");
            return Err(err);
        }
        Ok(response)
    }

    /// Mutate the cache and publish the result
    ///
    /// The mutation, the new snapshot and the posting of notifications all
    /// happen under the cache lock, so listeners see snapshots in mutation
    /// order and never a half-applied change.
    pub(crate) fn apply<R>(&self, mutate: impl FnOnce(&mut Vec<T>) -> R) -> (R, Snapshot<T>) {
        let mut cache = self.lock();
        let result = mutate(&mut cache.items);
        T::arrange(&mut cache.items);
        let snapshot = Snapshot::new(cache.items.clone());
        cache.snapshot = snapshot.clone();

        for (_, listener) in &cache.listeners {
            let listener = Arc::clone(listener);
            let snapshot = snapshot.clone();
            self.dispatcher.post(move || listener(snapshot));
        }
        (result, snapshot)
    }

    /// Run `op` on a worker task and deliver its outcome on the UI thread
    pub(crate) fn spawn<R, F, Fut, S, E>(self: &Arc<Self>, op: F, on_success: S, on_error: E)
    where
        R: Send + 'static,
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
        S: FnOnce(R) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let dispatcher = self.dispatcher.clone();
        let work = op(Arc::clone(self));
        self.runtime.spawn(async move {
            match work.await {
                Ok(value) => {
                    dispatcher.post(move || on_success(value));
                }
                Err(err) => {
                    warn!(entity = T::NAME, error = %err, "background store operation failed");
                    dispatcher.post(move || on_error(err));
                }
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, Cache<T>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
