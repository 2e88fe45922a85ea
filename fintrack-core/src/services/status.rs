//! Status summary - connection, session and cache overview

use serde::Serialize;

use crate::adapters::ChannelStats;

use super::auth::SessionStatus;
use super::summary::Dashboard;

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub server: String,
    pub username: Option<String>,
    pub session: SessionStatus,
    pub subscription_running: bool,
    pub channel: ChannelStats,
    pub dashboard: Dashboard,
    pub category_count: usize,
}
