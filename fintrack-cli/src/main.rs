//! FinTrack CLI - personal finance backend client in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{account, auth, category, config, report, status, transaction, watch};

/// FinTrack - personal finance in your terminal
#[derive(Parser)]
#[command(name = "ft", version, about, long_about = None)]
struct Cli {
    /// Log wire traffic and connection lifecycle to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user on the backend
    Register {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Log in and remember the session
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Show connection, session and data summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Manage transactions
    Tx {
        #[command(subcommand)]
        command: transaction::TransactionCommands,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Income/expense report for a month
    Report(report::ReportArgs),

    /// Follow live changes pushed by the server until Ctrl-C
    Watch,

    /// Show or change client settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fintrack_core=debug,fintrack_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register { username, password } => auth::register(&username, password),
        Commands::Login { username, password } => auth::login(&username, password),
        Commands::Logout => auth::logout(),
        Commands::Status { json } => status::run(json),
        Commands::Account { command } => account::run(command),
        Commands::Tx { command } => transaction::run(command),
        Commands::Category { command } => category::run(command),
        Commands::Report(args) => report::run(args),
        Commands::Watch => watch::run(),
        Commands::Config { command } => config::run(command),
    }
}
