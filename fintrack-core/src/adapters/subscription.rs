//! Server-push subscription on a dedicated socket

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::ports::EventSink;
use crate::protocol::{decode_event, format_command, verbs, ServerEvent};

struct Listener {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Receives `EVENT|...` lines pushed by the backend
///
/// Never shares its socket with the command channel. `DATA_CHANGED`
/// is forwarded to the [`EventSink`]; other lines are logged and dropped.
pub struct SubscriptionChannel {
    addr: String,
    sink: Arc<dyn EventSink>,
    running: Arc<AtomicBool>,
    events_received: Arc<AtomicU64>,
    listener: Mutex<Option<Listener>>,
    starting: tokio::sync::Mutex<()>,
}

impl SubscriptionChannel {
    pub fn new(addr: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            addr: addr.into(),
            sink,
            running: Arc::new(AtomicBool::new(false)),
            events_received: Arc::new(AtomicU64::new(0)),
            listener: Mutex::new(None),
            starting: tokio::sync::Mutex::new(()),
        }
    }

    /// Open the subscription socket and start listening
    ///
    /// No-op while already running. Must be called inside a tokio runtime.
    pub async fn start(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(Error::Subscription(
                "No session token available for subscription".to_string(),
            ));
        }

        let _starting = self.starting.lock().await;
        if self.is_running() {
            return Ok(());
        }
        // A listener that ended on its own leaves a finished task behind
        self.stop();

        let stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            Error::Subscription(format!("Cannot connect to {}: {}", self.addr, e))
        })?;
        let (read_half, mut write_half) = stream.into_split();

        let subscribe = format!("{}\n", format_command(&[verbs::SUBSCRIBE, token]));
        write_half
            .write_all(subscribe.as_bytes())
            .await
            .map_err(|e| Error::Subscription(format!("Failed to subscribe: {}", e)))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.running.store(true, Ordering::SeqCst);

        let sink = Arc::clone(&self.sink);
        let running = Arc::clone(&self.running);
        let events = Arc::clone(&self.events_received);
        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            let mut shutdown = shutdown_rx;
            loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        debug!("subscription stopped");
                        break;
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => handle_line(&line, sink.as_ref(), &events),
                        Ok(None) => {
                            info!("subscription closed by server");
                            break;
                        }
                        Err(e) => {
                            warn!("subscription read failed: {}", e);
                            break;
                        }
                    }
                }
            }
            drop(write_half);
            running.store(false, Ordering::SeqCst);
        });

        *self.lock_listener() = Some(Listener {
            shutdown: shutdown_tx,
            task,
        });
        info!(addr = %self.addr, "subscription started");
        Ok(())
    }

    /// Stop listening and release the socket; safe to call repeatedly
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(listener) = self.lock_listener().take() {
            let _ = listener.shutdown.send(());
            listener.task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of event lines seen since construction
    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::SeqCst)
    }

    fn lock_listener(&self) -> std::sync::MutexGuard<'_, Option<Listener>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SubscriptionChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_line(line: &str, sink: &dyn EventSink, events: &AtomicU64) {
    if line.trim().is_empty() {
        return;
    }
    match decode_event(line) {
        Some(ServerEvent::DataChanged) => {
            events.fetch_add(1, Ordering::SeqCst);
            debug!("data changed on server, refreshing stores");
            sink.data_changed();
        }
        Some(ServerEvent::Unknown(kind)) => {
            events.fetch_add(1, Ordering::SeqCst);
            warn!(event = %kind, "unhandled server event");
        }
        None => debug!(line = %line, "ignoring non-event line on subscription"),
    }
}
