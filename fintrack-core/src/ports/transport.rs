//! Transport port - request/response exchange with the backend

use async_trait::async_trait;

use crate::domain::result::Result;

/// One-request-at-a-time command exchange
///
/// Implementations frame `command` as a single line, wait for the single
/// response line, and return it without the line terminator. They only
/// ever fail with connection, communication or timeout errors; interpreting
/// the response is the caller's job.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn send(&self, command: &str) -> Result<String>;

    fn is_connected(&self) -> bool;
}

/// Receiver of server-pushed notifications
pub trait EventSink: Send + Sync {
    /// Backend data changed; cached state should be reloaded
    fn data_changed(&self);
}
