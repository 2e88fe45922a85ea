//! Register, login and logout

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use dialoguer::Password;

use super::App;
use crate::output;

/// Take the password from the flag, a pipe, or an interactive prompt
fn resolve_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        let password = line.trim_end_matches(['\r', '\n']).to_string();
        if password.is_empty() {
            bail!("No password provided on stdin");
        }
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords don't match");
    }
    Ok(prompt.interact()?)
}

pub fn register(username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password, true)?;
    let app = App::open()?;
    app.connect()?;

    match app.block_on(app.ctx.auth.register(username, &password))? {
        Some(session) => {
            app.persist_session()?;
            output::success(&format!(
                "Registered and logged in as {}",
                session.username.as_deref().unwrap_or(username)
            ));
        }
        None => {
            output::success(&format!("Registered {}", username));
            output::info(&format!("Run 'ft login {}' to sign in.", username));
        }
    }
    Ok(())
}

pub fn login(username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password, false)?;
    let app = App::open()?;
    app.connect()?;

    let session = app.block_on(app.ctx.auth.login(username, &password))?;
    app.persist_session()?;
    output::success(&format!(
        "Logged in as {}",
        session.username.as_deref().unwrap_or(username)
    ));
    Ok(())
}

/// Always forgets the local session, even when the server is unreachable
pub fn logout() -> Result<()> {
    let app = App::open()?;
    if !app.ctx.session.has_valid_session() {
        output::info("Not logged in.");
        return Ok(());
    }

    let server = match app.connect() {
        Ok(()) => app.block_on(app.ctx.auth.logout()),
        Err(e) => {
            app.ctx.session.clear();
            Err(e)
        }
    };
    app.persist_session()?;

    match server {
        Ok(()) => output::success("Logged out."),
        Err(e) => output::warning(&format!("Logged out locally ({:#})", e)),
    }
    Ok(())
}
