//! # todo - Personal Task Manager
//!
//! A small command-line task manager. Tasks carry a priority, a category and
//! an optional due date, and are kept in a single local JSON file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task due in three days
//! todo add "Renew passport" --priority High --category Admin --due 3
//!
//! # Everything, soonest deadline first
//! todo list
//!
//! # Only overdue work
//! todo list --filter overdue
//!
//! # Finish, then tidy up
//! todo complete 1
//! todo clear-completed
//! ```
//!
//! Data lives in `~/.todo/todo_data.json` unless `--db` or `TODO_DB` says otherwise.
//! Set `RUST_LOG` or pass `--verbose` for diagnostic output on stderr.

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod clock;
pub mod cmd;
pub mod db;
pub mod error;
pub mod fields;
pub mod store;
pub mod task;

use cli::Cli;
use clock::SystemClock;
use cmd::*;
use db::JsonFile;
use store::TaskStore;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "todo=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let storage = JsonFile::new(cli.db_path());
    tracing::debug!(path = %storage.path().display(), "using task file");
    let mut store = TaskStore::open(&storage, SystemClock);

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::Add { title, desc, priority, category, due } =>
            cmd_add(&mut store, &storage, title, desc, priority, category, due),
        Commands::List { filter, pending } => {
            cmd_list(&store, filter, pending);
            Ok(())
        }
        Commands::Complete { id } => cmd_complete(&mut store, &storage, id),
        Commands::Delete { id } => cmd_delete(&mut store, &storage, id),
        Commands::Search { term } => {
            cmd_search(&store, &term);
            Ok(())
        }
        Commands::Edit { id, title, desc, priority, category, due, clear_due } =>
            cmd_edit(&mut store, &storage, id, title, desc, priority, category, due, clear_due),
        Commands::ClearCompleted { keep_ids } =>
            cmd_clear_completed(&mut store, &storage, keep_ids),
        Commands::Stats => {
            cmd_stats(&store);
            Ok(())
        }
        Commands::Categories => {
            cmd_categories(&store);
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
