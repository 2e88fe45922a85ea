//! Mock FinTrack backend for integration tests
//!
//! Speaks the line protocol over a real TCP socket on a random port. Each
//! connection gets its own thread; replies come from a pluggable handler.
//! `SUBSCRIBE|token` turns a connection into a push channel that
//! [`MockBackend::push_event`] writes to.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use fintrack_core::config::Config;

/// What the backend does with one command line
pub enum Reply {
    Line(String),
    /// Drop the connection without answering
    Close,
    /// Never answer; the client times out
    Hold,
}

/// `(command, connection index)` -> reply
pub type Handler = Arc<dyn Fn(&str, usize) -> Reply + Send + Sync>;

pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    connections: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    subscribers: Arc<Mutex<Vec<TcpStream>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    pub fn start(handler: Handler) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let running = Arc::new(AtomicBool::new(true));
        let connections = Arc::new(AtomicUsize::new(0));
        let commands = Arc::new(Mutex::new(Vec::new()));
        let subscribers = Arc::new(Mutex::new(Vec::new()));

        let thread_handle = {
            let running = running.clone();
            let connections = connections.clone();
            let commands = commands.clone();
            let subscribers = subscribers.clone();
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            let index = connections.fetch_add(1, Ordering::SeqCst);
                            let handler = handler.clone();
                            let commands = commands.clone();
                            let subscribers = subscribers.clone();
                            thread::spawn(move || {
                                serve(stream, index, handler, commands, subscribers);
                            });
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            })
        };

        Ok(Self {
            port,
            running,
            connections,
            commands,
            subscribers,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Client config with short timeouts pointed at this backend
    pub fn config(&self) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: self.port,
            read_timeout: Duration::from_millis(500),
            max_reconnect_attempts: 3,
            initial_backoff: Duration::from_millis(10),
        }
    }

    /// Connections accepted so far, subscriptions included
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Every non-subscribe command received, in arrival order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Wait until `n` subscribers are registered
    pub fn wait_for_subscribers(&self, n: usize) -> bool {
        for _ in 0..200 {
            if self.subscriber_count() >= n {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    /// Write one line to every subscriber
    pub fn push_event(&self, line: &str) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain_mut(|stream| {
            stream
                .write_all(format!("{}\n", line).as_bytes())
                .and_then(|_| stream.flush())
                .is_ok()
        });
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for stream in self.subscribers.lock().unwrap().drain(..) {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve(
    stream: TcpStream,
    index: usize,
    handler: Handler,
    commands: Arc<Mutex<Vec<String>>>,
    subscribers: Arc<Mutex<Vec<TcpStream>>>,
) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut writer = stream;
    let reader = BufReader::new(read_half);

    for line in reader.lines() {
        let Ok(line) = line else { return };

        if line.starts_with("SUBSCRIBE|") {
            if let Ok(push) = writer.try_clone() {
                subscribers.lock().unwrap().push(push);
            }
            continue;
        }

        commands.lock().unwrap().push(line.clone());
        match handler(&line, index) {
            Reply::Line(reply) => {
                if writer.write_all(format!("{}\n", reply).as_bytes()).is_err() {
                    return;
                }
            }
            Reply::Close => {
                let _ = writer.shutdown(Shutdown::Both);
                return;
            }
            Reply::Hold => {}
        }
    }
}

/// In-memory FinTrack backend state behind a [`Handler`]
#[derive(Clone, Default)]
pub struct Ledger {
    state: Arc<Mutex<LedgerState>>,
}

#[derive(Default)]
struct LedgerState {
    accounts: Vec<Vec<String>>,
    transactions: Vec<Vec<String>>,
    categories: Vec<Vec<String>>,
    next_id: usize,
    token_revoked: bool,
}

pub const TOKEN: &str = "tok-1";
pub const PASSWORD: &str = "secret";

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Handler {
        let ledger = self.clone();
        Arc::new(move |line: &str, _conn: usize| ledger.handle(line))
    }

    /// Change made by another client
    pub fn insert_account(&self, name: &str, balance: i64, account_type: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.issue_id("a");
        state.accounts.push(vec![
            id.clone(),
            name.to_string(),
            "-".to_string(),
            balance.to_string(),
            account_type.to_string(),
        ]);
        id
    }

    pub fn insert_category(&self, kind: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .categories
            .push(vec![kind.to_string(), name.to_string()]);
    }

    pub fn revoke_token(&self) {
        self.state.lock().unwrap().token_revoked = true;
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    fn handle(&self, line: &str) -> Reply {
        let parts: Vec<&str> = line.split('|').collect();
        let mut state = self.state.lock().unwrap();

        let reply = match parts.as_slice() {
            ["LOGIN", _, password] => {
                if *password == PASSWORD {
                    state.token_revoked = false;
                    format!("OK|{}", TOKEN)
                } else {
                    "LOGIN_FAIL".to_string()
                }
            }
            ["REGISTER", _, _] => "OK".to_string(),
            ["LOGOUT", ..] => "OK".to_string(),
            [_, token, ..] if *token != TOKEN || state.token_revoked => {
                "ERROR|SESSION_INVALID|Session expired".to_string()
            }
            ["VALIDATE_SESSION", _] => "OK".to_string(),
            ["GET_ACCOUNTS", _] => data("DATA_ACCOUNTS", &state.accounts),
            ["GET_ALL", _] => data("DATA_ALL", &state.transactions),
            ["GET_CATEGORIES", _] => data("DATA_CATEGORIES", &state.categories),
            ["ADD_ACCOUNT", _, fields @ ..] if fields.len() == 4 => {
                let id = state.issue_id("a");
                let mut row = vec![id.clone()];
                row.extend(fields.iter().map(|f| f.to_string()));
                state.accounts.push(row);
                format!("OK|{}", id)
            }
            ["UPDATE_ACCOUNT", _, id, fields @ ..] if fields.len() == 4 => {
                match state.accounts.iter_mut().find(|row| row[0] == *id) {
                    Some(row) => {
                        row.truncate(1);
                        row.extend(fields.iter().map(|f| f.to_string()));
                        "OK".to_string()
                    }
                    None => "ERROR|ACCOUNT_NOT_FOUND".to_string(),
                }
            }
            ["DELETE_ACCOUNT", _, id] => {
                let before = state.accounts.len();
                state.accounts.retain(|row| row[0] != *id);
                if state.accounts.len() < before {
                    "OK".to_string()
                } else {
                    "ERROR|ACCOUNT_NOT_FOUND".to_string()
                }
            }
            ["ADD", _, fields @ ..] if fields.len() == 7 => {
                if fields[4].parse::<i64>().map(|a| a <= 0).unwrap_or(true) {
                    "ERROR|INVALID_AMOUNT".to_string()
                } else {
                    let id = state.issue_id("t");
                    let mut row = vec![id.clone()];
                    row.extend(fields.iter().map(|f| f.to_string()));
                    state.transactions.push(row);
                    format!("SUMMARY|{}|0|0", id)
                }
            }
            ["UPDATE", _, id, fields @ ..] if fields.len() == 7 => {
                match state.transactions.iter_mut().find(|row| row[0] == *id) {
                    Some(row) => {
                        row.truncate(1);
                        row.extend(fields.iter().map(|f| f.to_string()));
                        format!("SUMMARY|{}|0|0", id)
                    }
                    None => "ERROR|TRANSACTION_NOT_FOUND".to_string(),
                }
            }
            ["DELETE", _, id] => {
                let before = state.transactions.len();
                state.transactions.retain(|row| row[0] != *id);
                if state.transactions.len() < before {
                    format!("SUMMARY|{}|0|0", id)
                } else {
                    "ERROR|TRANSACTION_NOT_FOUND".to_string()
                }
            }
            ["ADD_CATEGORY", _, kind, name] => {
                state.categories.push(vec![kind.to_string(), name.to_string()]);
                "OK".to_string()
            }
            ["DELETE_CATEGORY", _, kind, name] => {
                state
                    .categories
                    .retain(|row| !(row[0] == *kind && row[1].eq_ignore_ascii_case(name)));
                "OK".to_string()
            }
            _ => "ERROR|UNKNOWN_COMMAND".to_string(),
        };
        Reply::Line(reply)
    }
}

impl LedgerState {
    fn issue_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

fn data(tag: &str, rows: &[Vec<String>]) -> String {
    let mut parts = vec![tag.to_string(), rows.len().to_string()];
    for row in rows {
        parts.extend(row.iter().cloned());
    }
    parts.join("|")
}
