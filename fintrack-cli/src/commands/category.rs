//! Category commands

use anyhow::Result;
use clap::Subcommand;
use fintrack_core::{Category, EntryKind};

use super::{confirm, App};
use crate::output;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only income or expense categories
        #[arg(long, short)]
        kind: Option<EntryKind>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a category
    Add { kind: EntryKind, name: String },
    /// Delete a category (name match ignores case)
    Remove {
        kind: EntryKind,
        name: String,
        /// Skip confirmation
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: CategoryCommands) -> Result<()> {
    let app = App::open()?;
    app.open_session()?;

    match command {
        CategoryCommands::List { kind, json } => {
            let categories: Vec<Category> = app
                .ctx
                .categories
                .snapshot()
                .iter()
                .filter(|c| kind.map_or(true, |k| c.kind == k))
                .cloned()
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            } else if categories.is_empty() {
                output::info("No categories found.");
            } else {
                println!("{}", output::categories_table(&categories));
            }
            Ok(())
        }
        CategoryCommands::Add { kind, name } => {
            if app.ctx.categories.contains(kind, &name) {
                output::info(&format!("{} category '{}' already exists", kind, name.trim()));
                return Ok(());
            }
            let category = app.block_on(app.ctx.categories.add(kind, &name))?;
            output::success(&format!("Added {} category '{}'", category.kind, category.name));
            Ok(())
        }
        CategoryCommands::Remove { kind, name, force } => {
            if !confirm(&format!("Delete {} category '{}'?", kind, name.trim()), force)? {
                output::info("Cancelled.");
                return Ok(());
            }
            let category = app.block_on(app.ctx.categories.remove(kind, &name))?;
            output::success(&format!("Deleted {} category '{}'", category.kind, category.name));
            Ok(())
        }
    }
}
