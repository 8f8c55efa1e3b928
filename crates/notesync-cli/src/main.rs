//! notesync CLI - offline-first notes from the terminal
//!
//! Every command works against the local cache; mutations are mirrored to the
//! remote store when one is configured, and `notesync sync` reconciles the two.

mod cli;
mod commands;
mod error;
mod offline;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::common::{resolve_config_path, resolve_db_path, App};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "notesync=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.command.is_none() && cli.note.is_empty() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let db_path = resolve_db_path(cli.db_path);
    let config_path = resolve_config_path(cli.config);
    let app = App::open(&db_path, &config_path).await?;

    let result = execute(&app, cli.command, cli.note).await;
    app.finish().await;
    result
}

async fn execute(app: &App, command: Option<Commands>, note: Vec<String>) -> Result<(), CliError> {
    use crate::commands::{add, count, delete, deleted, edit, list, restore, search, sync};

    match command {
        Some(Commands::Add { title, body }) => add::run_add(app, &title, body).await,
        Some(Commands::List { page, order, json }) => {
            list::run_list(app, page, order.into(), json).await
        }
        Some(Commands::Search {
            query,
            page,
            order,
            json,
        }) => search::run_search(app, &query, page, order.into(), json).await,
        Some(Commands::Edit { id, title, body }) => edit::run_edit(app, &id, title, body).await,
        Some(Commands::Delete { ids }) => delete::run_delete(app, &ids).await,
        Some(Commands::Deleted { json }) => deleted::run_deleted(app, json).await,
        Some(Commands::Restore { id }) => restore::run_restore(app, &id).await,
        Some(Commands::Count { json }) => count::run_count(app, json).await,
        Some(Commands::Sync { json }) => sync::run_sync(app, json).await,
        // Quick capture mode: notesync "my note title"
        None => add::run_add(app, &note, None).await,
    }
}
