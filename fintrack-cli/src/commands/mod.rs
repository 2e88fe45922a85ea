//! CLI command implementations

pub mod account;
pub mod auth;
pub mod category;
pub mod config;
pub mod report;
pub mod status;
pub mod transaction;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use fintrack_core::services::{dispatcher, DispatchQueue};
use fintrack_core::{Error, FinTrackContext, Session, SessionContext};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

const SESSION_FILE: &str = "session.json";

/// Get the FinTrack directory from environment or default
pub fn get_fintrack_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".fintrack"))
        .context("Could not find home directory (set FINTRACK_DIR)")
}

/// Read the remembered session; a missing or unreadable file means logged out
pub fn load_session(fintrack_dir: &Path) -> Session {
    let path = fintrack_dir.join(SESSION_FILE);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Session::default();
    };
    match serde_json::from_str(&content) {
        Ok(session) => session,
        Err(e) => {
            warn!("ignoring unreadable {}: {}", path.display(), e);
            Session::default()
        }
    }
}

pub fn save_session(fintrack_dir: &Path, session: &Session) -> Result<()> {
    let path = fintrack_dir.join(SESSION_FILE);
    let content = serde_json::to_string_pretty(session)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn clear_session(fintrack_dir: &Path) -> Result<()> {
    let path = fintrack_dir.join(SESSION_FILE);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Everything one CLI invocation needs
///
/// The main thread owns the dispatch queue and drives the runtime, so it
/// plays the UI thread for store listeners and callbacks.
pub struct App {
    pub ctx: FinTrackContext,
    pub queue: DispatchQueue,
    pub runtime: Runtime,
    dir: PathBuf,
}

impl App {
    pub fn open() -> Result<Self> {
        Self::with_dir(get_fintrack_dir()?)
    }

    pub fn with_dir(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create fintrack directory: {:?}", dir))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let session = SessionContext::from_session(load_session(&dir));
        let (dispatcher, queue) = dispatcher::channel();
        let ctx = FinTrackContext::from_dir(&dir, session, dispatcher, runtime.handle().clone())
            .context("Failed to load settings")?;

        Ok(Self {
            ctx,
            queue,
            runtime,
            dir,
        })
    }

    /// Run a core operation to completion, translating its error for humans
    pub fn block_on<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = fintrack_core::Result<T>>,
    {
        self.runtime.block_on(fut).map_err(|e| self.fail(e))
    }

    /// Open the command socket behind a spinner
    pub fn connect(&self) -> Result<()> {
        let spinner = spinner(&format!("Connecting to {}", self.ctx.config.address()));
        let result = self.runtime.block_on(self.ctx.connect());
        spinner.finish_and_clear();
        result.map_err(|e| self.fail(e))
    }

    /// Bail unless a session is remembered
    pub fn require_login(&self) -> Result<()> {
        if !self.ctx.session.has_valid_session() {
            bail!("Not logged in. Run 'ft login <username>' first.");
        }
        Ok(())
    }

    /// Connect and refresh every store; most commands start here
    pub fn open_session(&self) -> Result<()> {
        self.require_login()?;
        self.connect()?;
        self.block_on(self.ctx.refresh_all())?;
        Ok(())
    }

    pub fn persist_session(&self) -> Result<()> {
        let session = self.ctx.session.current();
        if session.is_authenticated() {
            save_session(&self.dir, &session)
        } else {
            clear_session(&self.dir)
        }
    }

    /// A rejected token is forgotten here; the core only reports it
    fn fail(&self, err: Error) -> anyhow::Error {
        if err.is_session() && err.code().is_some() {
            debug!("server rejected session, clearing it");
            self.ctx.session.clear();
            if let Err(e) = clear_session(&self.dir) {
                warn!("{:#}", e);
            }
        }
        anyhow!(err.user_message())
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Parse whole currency units; `.`, `,` and `_` group digits
pub fn parse_amount(input: &str) -> Result<i64> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '_'))
        .collect();
    digits
        .parse()
        .map_err(|_| anyhow!("Invalid amount '{}'", input))
}

/// Ask before a destructive step; non-interactive stdin needs `--force`
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if atty::isnt(atty::Stream::Stdin) {
        bail!("Refusing to prompt without a terminal; pass --force");
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
