//! Config command - show or change settings.json

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{ContentArrangement, Table};
use fintrack_core::config::Config;

use super::get_fintrack_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change server or network settings
    Set {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Read timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        max_reconnect_attempts: Option<u32>,
        /// First reconnect delay in milliseconds, doubled per attempt
        #[arg(long)]
        backoff_ms: Option<u64>,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let dir = get_fintrack_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create fintrack directory: {:?}", dir))?;
    let mut config = Config::load(&dir)?;

    match command {
        ConfigCommands::Show { json } => {
            if json {
                let value = serde_json::json!({
                    "host": config.host,
                    "port": config.port,
                    "readTimeoutMs": config.read_timeout.as_millis() as u64,
                    "maxReconnectAttempts": config.max_reconnect_attempts,
                    "initialBackoffMs": config.initial_backoff.as_millis() as u64,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.add_row(vec!["Server".to_string(), config.address()]);
            table.add_row(vec![
                "Read timeout".to_string(),
                format!("{} ms", config.read_timeout.as_millis()),
            ]);
            table.add_row(vec![
                "Reconnect attempts".to_string(),
                config.max_reconnect_attempts.to_string(),
            ]);
            table.add_row(vec![
                "Initial backoff".to_string(),
                format!("{} ms", config.initial_backoff.as_millis()),
            ]);
            table.add_row(vec!["Directory".to_string(), dir.display().to_string()]);
            println!("{}", table);
            Ok(())
        }
        ConfigCommands::Set {
            host,
            port,
            timeout_ms,
            max_reconnect_attempts,
            backoff_ms,
        } => {
            if let Some(host) = host {
                config.host = host.trim().to_string();
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(ms) = timeout_ms {
                config.read_timeout = Duration::from_millis(ms);
            }
            if let Some(attempts) = max_reconnect_attempts {
                config.max_reconnect_attempts = attempts;
            }
            if let Some(ms) = backoff_ms {
                config.initial_backoff = Duration::from_millis(ms);
            }
            config.validate()?;
            config.save(&dir)?;
            output::success(&format!("Saved settings (server {})", config.address()));
            Ok(())
        }
    }
}
