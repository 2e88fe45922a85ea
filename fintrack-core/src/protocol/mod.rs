//! Line-based wire protocol spoken by the FinTrack backend

mod codec;
mod entity;
mod event;

pub use codec::{format_command, redact_command, Fields, Response, DELIMITER};
pub use entity::{account_fields, decode_list, transaction_fields, WireEntity};
pub use event::{decode_event, ServerEvent};

/// Command and response verbs
pub mod verbs {
    // Auth
    pub const REGISTER: &str = "REGISTER";
    pub const LOGIN: &str = "LOGIN";
    pub const LOGIN_FAIL: &str = "LOGIN_FAIL";
    pub const VALIDATE_SESSION: &str = "VALIDATE_SESSION";
    pub const LOGOUT: &str = "LOGOUT";

    // Loads and their data responses
    pub const GET_ALL: &str = "GET_ALL";
    pub const GET_ACCOUNTS: &str = "GET_ACCOUNTS";
    pub const GET_CATEGORIES: &str = "GET_CATEGORIES";
    pub const DATA_ALL: &str = "DATA_ALL";
    pub const DATA_ACCOUNTS: &str = "DATA_ACCOUNTS";
    pub const DATA_CATEGORIES: &str = "DATA_CATEGORIES";

    // Transactions
    pub const ADD: &str = "ADD";
    pub const UPDATE: &str = "UPDATE";
    pub const DELETE: &str = "DELETE";
    pub const SUMMARY: &str = "SUMMARY";

    // Accounts
    pub const ADD_ACCOUNT: &str = "ADD_ACCOUNT";
    pub const UPDATE_ACCOUNT: &str = "UPDATE_ACCOUNT";
    pub const DELETE_ACCOUNT: &str = "DELETE_ACCOUNT";

    // Categories
    pub const ADD_CATEGORY: &str = "ADD_CATEGORY";
    pub const DELETE_CATEGORY: &str = "DELETE_CATEGORY";

    // Subscription
    pub const SUBSCRIBE: &str = "SUBSCRIBE";
    pub const EVENT: &str = "EVENT";
    pub const DATA_CHANGED: &str = "DATA_CHANGED";

    pub const OK: &str = "OK";
    pub const ERROR: &str = "ERROR";
}
