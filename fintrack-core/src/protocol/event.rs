//! Server-pushed event envelopes (`EVENT|<verb>[|...]`)

use super::codec::Response;
use super::verbs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Something changed server-side; cached data is stale
    DataChanged,
    /// An event verb this client does not understand
    Unknown(String),
}

/// Decode one subscription line; None for lines that are not events
pub fn decode_event(line: &str) -> Option<ServerEvent> {
    let response = Response::parse(line);
    if response.verb() != verbs::EVENT {
        return None;
    }
    match response.field(0).unwrap_or("") {
        verbs::DATA_CHANGED => Some(ServerEvent::DataChanged),
        other => Some(ServerEvent::Unknown(other.to_string())),
    }
}
