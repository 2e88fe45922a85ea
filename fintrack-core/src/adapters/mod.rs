//! Adapter implementations
//!
//! Adapters implement the port traits over TCP:
//! - CommandChannel for the CommandTransport port
//! - SubscriptionChannel feeding an EventSink

pub mod command_channel;
pub mod subscription;

#[cfg(test)]
pub mod scripted;

pub use command_channel::{backoff_delay, ChannelConfig, ChannelStats, CommandChannel};
pub use subscription::SubscriptionChannel;
