//! Result and error types for the core library

use std::time::Duration;

use thiserror::Error;

/// Error codes the backend reports for an expired or missing session
pub const SESSION_ERROR_CODES: [&str; 2] = ["SESSION_INVALID", "SESSION_REQUIRED"];

/// Core library error type
///
/// The transport only ever produces `Connection`, `Communication` and
/// `Timeout`. Stores add `Protocol`, `Session` and `Application` when they
/// interpret a response.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Session error: {message}")]
    Session {
        code: Option<String>,
        message: String,
    },

    #[error("{message}")]
    Application { code: String, message: String },

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a communication error
    pub fn communication(msg: impl Into<String>) -> Self {
        Self::Communication(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Session error raised locally when no token is present
    pub fn no_session() -> Self {
        Self::Session {
            code: None,
            message: "No active session. Please login first.".to_string(),
        }
    }

    /// Classify a server `ERROR|code[|description]` envelope
    pub fn from_server(code: &str, description: Option<&str>) -> Self {
        if SESSION_ERROR_CODES.contains(&code) {
            return Self::Session {
                code: Some(code.to_string()),
                message: description
                    .filter(|d| !d.is_empty())
                    .unwrap_or("Session is no longer valid")
                    .to_string(),
            };
        }

        Self::Application {
            code: code.to_string(),
            message: describe_error_code(code, description),
        }
    }

    /// True for send/read failures, including timeouts
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication(_) | Self::Timeout(_))
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Self::Session { .. })
    }

    /// Server-reported error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Application { code, .. } => Some(code),
            Self::Session { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(detail) => format!(
                "Cannot connect to server. Please ensure the backend is running. ({})",
                detail
            ),
            Self::Timeout(_) => {
                "Request timeout. The server took too long to respond. Please try again."
                    .to_string()
            }
            Self::Session { code: Some(_), .. } => {
                "Session expired. Please login again.".to_string()
            }
            Self::Session { code: None, message } => message.clone(),
            Self::Application { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// User-facing description for a backend business error code
///
/// Unknown codes fall back to the server's own description, then to the code.
pub fn describe_error_code(code: &str, description: Option<&str>) -> String {
    let known = match code {
        "USER_EXISTS" => "Username already exists. Please choose a different username.",
        "INVALID_CREDENTIALS" => "Invalid username or password. Please try again.",
        "ACCOUNT_NOT_FOUND" => "Account not found. It may have been deleted.",
        "TRANSACTION_NOT_FOUND" => "Transaction not found. It may have been deleted.",
        "CATEGORY_NOT_FOUND" => "Category not found. It may have been deleted.",
        "INVALID_FORMAT" => "Invalid input format. Please check your data and try again.",
        "INVALID_AMOUNT" => "Invalid amount. Please enter a valid number.",
        "INVALID_DATE" => "Invalid date format. Please use YYYY-MM-DD format.",
        "DATABASE_ERROR" => "Database error occurred. Please try again later.",
        "UNKNOWN_COMMAND" => "Unknown command sent to server. Please contact support.",
        "MISSING_PARAMETER" => "Missing required information. Please fill in all fields.",
        "UPDATE_NOT_FOUND" => "Item not found for update. It may have been deleted.",
        "DELETE_NOT_FOUND" => "Item not found for deletion. It may have been already deleted.",
        _ => {
            return match description {
                Some(d) if !d.is_empty() => d.to_string(),
                _ => format!("An error occurred: {}", code),
            }
        }
    };
    known.to_string()
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
