//! Auth service - register, login, session validation, logout

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{Session, SessionContext};
use crate::ports::CommandTransport;
use crate::protocol::{format_command, verbs, Response};

/// Some servers acknowledge REGISTER with this verb instead of `OK`
const REGISTER_OK: &str = "REGISTER_OK";

/// Outcome of asking the backend about the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Valid,
    /// Backend rejected the token; the session is left for the caller to clear
    Invalid,
    /// No token held locally
    Missing,
}

pub struct AuthService {
    transport: Arc<dyn CommandTransport>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(transport: Arc<dyn CommandTransport>, session: SessionContext) -> Self {
        Self { transport, session }
    }

    /// Create a user
    ///
    /// When the backend answers `OK|token` the new user is logged in and the
    /// session is returned; a bare acknowledgement returns None.
    pub async fn register(&self, username: &str, password: &str) -> Result<Option<Session>> {
        let username = check_credentials(username, password)?;
        let response = self
            .call(&[verbs::REGISTER, username, password])
            .await?;

        match response.verb() {
            verbs::OK | REGISTER_OK => {}
            other => {
                return Err(Error::protocol(format!(
                    "unexpected REGISTER response '{}'",
                    other
                )))
            }
        }

        info!(username, "registered");
        match response.field(0).filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(Some(self.establish(token, username))),
            None => Ok(None),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = check_credentials(username, password)?;
        let response = self.call(&[verbs::LOGIN, username, password]).await?;

        if response.verb() == verbs::LOGIN_FAIL {
            return Err(Error::from_server("INVALID_CREDENTIALS", None));
        }
        response.expect_verb(verbs::OK)?;

        let token = response
            .field(0)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::protocol("LOGIN response without session token"))?;

        info!(username, "logged in");
        Ok(self.establish(token, username))
    }

    /// Ask the backend whether the held token is still accepted
    ///
    /// Never clears the session; an `Invalid` result is the caller's cue.
    pub async fn validate_session(&self) -> Result<SessionStatus> {
        let Some(token) = self.session.token() else {
            return Ok(SessionStatus::Missing);
        };

        let line = self
            .transport
            .send(&format_command(&[verbs::VALIDATE_SESSION, token.as_str()]))
            .await?;
        let response = Response::parse(&line);
        match response.error() {
            Some(err) if err.is_session() => {
                debug!("backend rejected session token");
                Ok(SessionStatus::Invalid)
            }
            Some(err) => Err(err),
            None => {
                response.expect_verb(verbs::OK)?;
                Ok(SessionStatus::Valid)
            }
        }
    }

    /// Tell the backend, then forget the session locally
    ///
    /// The local session is cleared even when the backend cannot be reached.
    pub async fn logout(&self) -> Result<()> {
        let Some(token) = self.session.token() else {
            return Ok(());
        };

        let outcome = self
            .transport
            .send(&format_command(&[verbs::LOGOUT, token.as_str()]))
            .await
            .map(|line| Response::parse(&line));
        self.session.clear();
        info!("logged out");

        match outcome {
            Ok(response) => match response.error() {
                // Already gone server-side
                Some(err) if err.is_session() => Ok(()),
                Some(err) => Err(err),
                None => Ok(()),
            },
            Err(err) => Err(err),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    async fn call(&self, parts: &[&str]) -> Result<Response> {
        let line = self.transport.send(&format_command(parts)).await?;
        let response = Response::parse(&line);
        match response.error() {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    fn establish(&self, token: &str, username: &str) -> Session {
        self.session.set(token.trim(), username);
        self.session.current()
    }
}

fn check_credentials<'a>(username: &'a str, password: &str) -> Result<&'a str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("username cannot be empty"));
    }
    if password.is_empty() {
        return Err(Error::validation("password cannot be empty"));
    }
    Ok(username)
}
