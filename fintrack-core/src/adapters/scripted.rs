//! In-memory transport that replays canned responses (tests only)

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::ports::CommandTransport;

/// Answers each `send` with the next queued reply and records the command
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String>>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, line: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(line.to_string()));
        self
    }

    pub fn fail(&self, err: Error) -> &Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandTransport for ScriptedTransport {
    async fn send(&self, command: &str) -> Result<String> {
        self.sent.lock().unwrap().push(command.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::communication("no scripted reply left")))
    }

    fn is_connected(&self) -> bool {
        true
    }
}
