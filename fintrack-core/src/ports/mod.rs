//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Stores and
//! services depend only on these traits, not on the TCP adapters.

mod transport;

pub use transport::{CommandTransport, EventSink};
