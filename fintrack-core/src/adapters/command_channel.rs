//! Primary request/response socket to the FinTrack backend

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::ports::CommandTransport;
use crate::protocol::redact_command;

/// Socket settings for a [`CommandChannel`]
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub addr: String,
    pub read_timeout: Duration,
    pub max_reconnect_attempts: u32,
    pub initial_backoff: Duration,
}

impl From<&Config> for ChannelConfig {
    fn from(config: &Config) -> Self {
        Self {
            addr: config.address(),
            read_timeout: config.read_timeout,
            max_reconnect_attempts: config.max_reconnect_attempts,
            initial_backoff: config.initial_backoff,
        }
    }
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub connected: bool,
    /// Every socket open attempt, successful or not
    pub connect_attempts: u64,
    pub reconnect_cycles: u64,
    pub requests: u64,
}

/// Delay to wait before reconnect attempt `attempt` (0-based): d, 2d, 4d, ...
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(attempt))
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Single-socket command channel
///
/// One request is in flight at a time: the connection slot is held for
/// the whole write+read exchange. A failed exchange triggers exactly one
/// reconnect cycle and one retry of the same command.
pub struct CommandChannel {
    config: ChannelConfig,
    conn: Mutex<Option<Connection>>,
    connected: AtomicBool,
    connect_attempts: AtomicU64,
    reconnect_cycles: AtomicU64,
    requests: AtomicU64,
}

impl CommandChannel {
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
            connected: AtomicBool::new(false),
            connect_attempts: AtomicU64::new(0),
            reconnect_cycles: AtomicU64::new(0),
            requests: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Open the socket if it is not open yet (single attempt, no backoff)
    pub async fn connect(&self) -> Result<()> {
        let mut slot = self.conn.lock().await;
        if slot.is_some() {
            return Ok(());
        }
        let conn = self.open().await?;
        *slot = Some(conn);
        self.connected.store(true, Ordering::SeqCst);
        info!(addr = %self.config.addr, "connected to backend");
        Ok(())
    }

    /// Close the socket; the next `send` reconnects
    pub async fn disconnect(&self) {
        let mut slot = self.conn.lock().await;
        self.teardown(&mut slot).await;
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            connected: self.connected.load(Ordering::SeqCst),
            connect_attempts: self.connect_attempts.load(Ordering::SeqCst),
            reconnect_cycles: self.reconnect_cycles.load(Ordering::SeqCst),
            requests: self.requests.load(Ordering::SeqCst),
        }
    }

    async fn open(&self) -> Result<Connection> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let stream = TcpStream::connect(&self.config.addr).await.map_err(|e| {
            Error::connection(format!("Cannot connect to {}: {}", self.config.addr, e))
        })?;
        // Commands are tiny; do not let Nagle hold them back
        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();
        Ok(Connection {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    async fn teardown(&self, slot: &mut Option<Connection>) {
        if let Some(mut conn) = slot.take() {
            let _ = conn.writer.shutdown().await;
        }
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Tear down and reopen with exponential pre-wait backoff
    async fn reconnect(&self, slot: &mut Option<Connection>) -> Result<()> {
        self.teardown(slot).await;
        self.reconnect_cycles.fetch_add(1, Ordering::SeqCst);

        let max = self.config.max_reconnect_attempts;
        for attempt in 0..max {
            let delay = backoff_delay(self.config.initial_backoff, attempt);
            debug!(
                "reconnecting in {}ms (attempt {}/{})",
                delay.as_millis(),
                attempt + 1,
                max
            );
            tokio::time::sleep(delay).await;

            match self.open().await {
                Ok(conn) => {
                    *slot = Some(conn);
                    self.connected.store(true, Ordering::SeqCst);
                    info!(addr = %self.config.addr, attempt = attempt + 1, "reconnected");
                    return Ok(());
                }
                Err(e) => warn!("reconnect attempt {}/{} failed: {}", attempt + 1, max, e),
            }
        }

        Err(Error::connection(format!(
            "Failed to reconnect after {} attempts",
            max
        )))
    }

    async fn exchange(&self, slot: &mut Option<Connection>, command: &str) -> Result<String> {
        let Some(conn) = slot.as_mut() else {
            return Err(Error::communication("Not connected"));
        };

        let mut frame = String::with_capacity(command.len() + 1);
        frame.push_str(command);
        frame.push('\n');
        conn.writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| Error::communication(format!("Failed to send request: {}", e)))?;
        conn.writer
            .flush()
            .await
            .map_err(|e| Error::communication(format!("Failed to send request: {}", e)))?;

        let mut line = String::new();
        match tokio::time::timeout(self.config.read_timeout, conn.reader.read_line(&mut line)).await
        {
            Err(_) => Err(Error::Timeout(self.config.read_timeout)),
            Ok(Err(e)) => Err(Error::communication(format!("Failed to read response: {}", e))),
            Ok(Ok(0)) => Err(Error::communication("Connection closed by server")),
            Ok(Ok(_)) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

#[async_trait]
impl CommandTransport for CommandChannel {
    async fn send(&self, command: &str) -> Result<String> {
        let mut slot = self.conn.lock().await;
        self.requests.fetch_add(1, Ordering::SeqCst);
        debug!(command = %redact_command(command), "send");

        if slot.is_none() {
            self.reconnect(&mut slot).await?;
        }

        let first = match self.exchange(&mut slot, command).await {
            Ok(line) => {
                debug!(response_len = line.len(), "recv");
                return Ok(line);
            }
            Err(e) => e,
        };

        warn!("request failed, reconnecting once: {}", first);
        self.reconnect(&mut slot).await?;

        match self.exchange(&mut slot, command).await {
            Ok(line) => {
                debug!(response_len = line.len(), "recv after reconnect");
                Ok(line)
            }
            Err(e) => {
                // The stream may be mid-frame; never reuse it
                self.teardown(&mut slot).await;
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config_for(addr: String) -> ChannelConfig {
        ChannelConfig {
            addr,
            read_timeout: Duration::from_millis(300),
            max_reconnect_attempts: 2,
            initial_backoff: Duration::from_millis(5),
        }
    }

    /// Address nothing listens on
    async fn dead_addr() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        addr
    }

    #[test]
    fn test_backoff_doubles() {
        let d = Duration::from_millis(1000);
        assert_eq!(backoff_delay(d, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(d, 1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(d, 2), Duration::from_millis(4000));
        // Saturates instead of overflowing
        assert!(backoff_delay(d, 64) >= backoff_delay(d, 30));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        let channel = CommandChannel::new(config_for(dead_addr().await));
        let err = channel.connect().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!channel.is_connected());
        assert_eq!(channel.stats().connect_attempts, 1);
    }

    #[tokio::test]
    async fn test_send_when_disconnected_reconnects_first() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let reply = format!("ECHO|{}\n", line);
                write_half.write_all(reply.as_bytes()).await.unwrap();
            }
        });

        let channel = CommandChannel::new(config_for(addr));
        let reply = channel.send("GET_ALL|tok").await.unwrap();

        assert_eq!(reply, "ECHO|GET_ALL|tok");
        assert!(channel.is_connected());
        let stats = channel.stats();
        assert_eq!(stats.reconnect_cycles, 1);
        assert_eq!(stats.requests, 1);
    }

    #[tokio::test]
    async fn test_send_exhausts_reconnect_attempts() {
        let channel = CommandChannel::new(config_for(dead_addr().await));
        let err = channel.send("GET_ALL|tok").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            Error::connection("Failed to reconnect after 2 attempts").to_string()
        );
        assert_eq!(channel.stats().connect_attempts, 2);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            // Accept and hold every connection without answering
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let channel = CommandChannel::new(config_for(addr));
        channel.connect().await.unwrap();
        let err = channel.send("GET_ALL|tok").await.unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_communication());
        assert!(!channel.is_connected());
        // First connect plus one reconnect
        assert_eq!(channel.stats().connect_attempts, 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let channel = CommandChannel::new(config_for(dead_addr().await));
        channel.disconnect().await;
        channel.disconnect().await;
        assert!(!channel.is_connected());
    }
}
