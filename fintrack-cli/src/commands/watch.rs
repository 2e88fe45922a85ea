//! Watch command - print live changes pushed by the server

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use fintrack_core::services::DispatchQueue;
use fintrack_core::FinTrackContext;

use super::App;
use crate::output::{self, format_amount};

const SUBSCRIPTION_CHECK: Duration = Duration::from_secs(1);

/// Why the watch loop returned
#[derive(Debug, PartialEq, Eq)]
enum WatchEnd {
    Interrupted,
    SubscriptionClosed,
    QueueClosed,
}

fn stamp() -> String {
    Local::now().format("%H:%M:%S").to_string().dimmed().to_string()
}

pub fn run() -> Result<()> {
    let mut app = App::open()?;
    app.open_session()?;

    // Listeners run on this thread as the dispatch queue is drained
    app.ctx.accounts.add_listener(|accounts| {
        let total = accounts
            .iter()
            .map(|a| a.balance)
            .fold(0, i64::saturating_add);
        println!(
            "{} accounts: {} (total {})",
            stamp(),
            accounts.len(),
            format_amount(total)
        );
    });
    app.ctx.transactions.add_listener(|transactions| {
        let latest = transactions
            .first()
            .map(|t| format!(", latest: {} on {}", t.description, t.date))
            .unwrap_or_default();
        println!("{} transactions: {}{}", stamp(), transactions.len(), latest);
    });
    app.ctx.categories.add_listener(|categories| {
        println!("{} categories: {}", stamp(), categories.len());
    });

    app.block_on(app.ctx.start_subscription())?;
    output::info("Watching for changes. Press Ctrl-C to stop.");

    let end = {
        let ctx = &app.ctx;
        let queue = &mut app.queue;
        app.runtime.block_on(pump(
            ctx,
            queue,
            tokio::signal::ctrl_c(),
            SUBSCRIPTION_CHECK,
        ))
    };

    app.runtime.block_on(app.ctx.shutdown());
    println!();
    match end {
        WatchEnd::Interrupted => output::success("Stopped watching."),
        WatchEnd::SubscriptionClosed => output::warning("Server closed the subscription."),
        WatchEnd::QueueClosed => output::warning("Stopped: dispatcher closed."),
    }
    Ok(())
}

/// Run dispatched jobs on this thread until `stop` resolves or the
/// subscription ends
async fn pump<S: Future>(
    ctx: &FinTrackContext,
    queue: &mut DispatchQueue,
    stop: S,
    check_every: Duration,
) -> WatchEnd {
    tokio::pin!(stop);
    let mut check = tokio::time::interval(check_every);
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => return WatchEnd::Interrupted,
            job = queue.next() => match job {
                Some(job) => job(),
                None => return WatchEnd::QueueClosed,
            },
            _ = check.tick() => {
                if !ctx.subscription.is_running() {
                    return WatchEnd::SubscriptionClosed;
                }
            }
        }
    }
}
