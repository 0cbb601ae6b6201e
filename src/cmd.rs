//! Command implementations for the CLI interface.
//!
//! Each handler parses what clap left as raw text, calls one store
//! operation, saves when the collection changed, and renders the result.

use anyhow::{bail, Context};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::clock::Clock;
use crate::db::{print_table, print_task, truncate, Storage};
use crate::fields::{Priority, ViewFilter};
use crate::store::{CompleteOutcome, DeleteOutcome, EditOutcome, TaskStore};
use crate::task::{DueUpdate, NewTask, TaskUpdate};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: High | Medium | Low. Anything else means Medium.
        #[arg(long)]
        priority: Option<String>,
        /// Category (default: General).
        #[arg(long)]
        category: Option<String>,
        /// Due date: YYYY-MM-DD or a number of days from today.
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks sorted by due date, priority and creation date.
    List {
        /// Named filter: high-priority | due-today | overdue.
        #[arg(long, value_enum)]
        filter: Option<ViewFilter>,
        /// Hide completed tasks.
        #[arg(long)]
        pending: bool,
    },

    /// Mark a task done.
    Complete {
        /// Task ID to complete.
        id: u64,
    },

    /// Delete a task.
    Delete {
        /// Task ID to delete.
        id: u64,
    },

    /// Search titles, descriptions and categories.
    Search {
        /// Case-insensitive search term.
        term: String,
    },

    /// Update fields on a task.
    Edit {
        /// Task ID to edit.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        /// New description. Pass an empty string to clear it.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Due date: YYYY-MM-DD or a number of days from today.
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Clear due date.
        #[arg(long)]
        clear_due: bool,
    },

    /// Remove all completed tasks and renumber the rest.
    ClearCompleted {
        /// Keep existing IDs instead of renumbering from 1.
        #[arg(long)]
        keep_ids: bool,
    },

    /// Show task counts.
    Stats,

    /// List distinct categories and counts.
    Categories,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn persist<C: Clock>(store: &TaskStore<C>, storage: &impl Storage) -> anyhow::Result<()> {
    store.save(storage).context("Failed to save tasks")
}

/// Add a new task to the collection.
pub fn cmd_add<C: Clock>(
    store: &mut TaskStore<C>,
    storage: &impl Storage,
    title: String,
    desc: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    due: Option<String>,
) -> anyhow::Result<()> {
    let title = title.trim().to_string();
    if title.is_empty() {
        bail!("Task title cannot be empty");
    }
    let priority = priority.filter(|p| !p.trim().is_empty());
    if let Some(p) = priority.as_deref() {
        if Priority::parse(p).is_none() {
            eprintln!("Unknown priority '{p}', using Medium.");
        }
    }
    let had_due = due.as_deref().is_some_and(|d| !d.trim().is_empty());

    let task = store.add(NewTask {
        title,
        description: desc.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
        priority,
        category: category.map(|c| c.trim().to_string()),
        due: due.filter(|d| !d.trim().is_empty()),
    });
    if had_due && task.due_date.is_none() {
        eprintln!("Could not read due date, task has no deadline.");
    }
    persist(store, storage)?;
    println!(
        "Added task {}: {} (Priority: {}, Category: {})",
        task.id,
        task.title,
        task.priority.label(),
        task.category
    );
    Ok(())
}

/// List tasks with an optional named filter.
pub fn cmd_list<C: Clock>(store: &TaskStore<C>, filter: Option<ViewFilter>, pending: bool) {
    let tasks = store.view(filter, !pending);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    print_table(&tasks, store.today());
}

pub fn cmd_complete<C: Clock>(
    store: &mut TaskStore<C>,
    storage: &impl Storage,
    id: u64,
) -> anyhow::Result<()> {
    match store.complete(id) {
        CompleteOutcome::Completed => {
            persist(store, storage)?;
            let title = store.get(id).map(|t| t.title.as_str()).unwrap_or_default();
            println!("Completed: {title}");
        }
        CompleteOutcome::AlreadyCompleted => println!("Task {id} is already completed."),
        CompleteOutcome::NotFound => bail!("Task {id} not found."),
    }
    Ok(())
}

pub fn cmd_delete<C: Clock>(
    store: &mut TaskStore<C>,
    storage: &impl Storage,
    id: u64,
) -> anyhow::Result<()> {
    match store.delete(id) {
        DeleteOutcome::Deleted(title) => {
            persist(store, storage)?;
            println!("Deleted: {title}");
        }
        DeleteOutcome::NotFound => bail!("Task {id} not found."),
    }
    Ok(())
}

pub fn cmd_search<C: Clock>(store: &TaskStore<C>, term: &str) {
    let found = store.search(term.trim());
    if found.is_empty() {
        println!("No tasks match '{}'.", term.trim());
        return;
    }
    println!("Found {} task(s):", found.len());
    print_table(&found, store.today());
}

/// Update an existing task's fields.
pub fn cmd_edit<C: Clock>(
    store: &mut TaskStore<C>,
    storage: &impl Storage,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    due: Option<String>,
    clear_due: bool,
) -> anyhow::Result<()> {
    let due = if clear_due {
        Some(DueUpdate::Clear)
    } else {
        due.map(DueUpdate::Set)
    };
    let update = TaskUpdate {
        title: title.map(|t| t.trim().to_string()),
        description: desc.map(|d| d.trim().to_string()),
        priority,
        category: category.map(|c| c.trim().to_string()),
        due,
    };
    let changed = !update.is_empty();

    match store.edit(id, update) {
        EditOutcome::Updated { ignored } => {
            for field in ignored {
                eprintln!("Ignored invalid {}; kept the previous value.", field.label());
            }
            if changed {
                persist(store, storage)?;
            } else {
                println!("Nothing to update.");
            }
            if let Some(task) = store.get(id) {
                print_task(task, store.today());
            }
        }
        EditOutcome::NotFound => bail!("Task {id} not found."),
    }
    Ok(())
}

pub fn cmd_clear_completed<C: Clock>(
    store: &mut TaskStore<C>,
    storage: &impl Storage,
    keep_ids: bool,
) -> anyhow::Result<()> {
    let removed = store.clear_completed(!keep_ids);
    if removed == 0 {
        println!("No completed tasks to clear.");
        return Ok(());
    }
    persist(store, storage)?;
    println!("Cleared {removed} completed task(s).");
    if !keep_ids {
        println!("Remaining tasks were renumbered from 1.");
    }
    Ok(())
}

pub fn cmd_stats<C: Clock>(store: &TaskStore<C>) {
    let s = store.stats();
    println!("Total:          {}", s.total);
    println!("Completed:      {}", s.completed);
    println!("Pending:        {}", s.pending);
    println!("Overdue:        {}", s.overdue);
    println!("Due today:      {}", s.due_today);
    println!("High priority:  {}", s.high_priority_pending);
}

pub fn cmd_categories<C: Clock>(store: &TaskStore<C>) {
    println!("{:<16} {}", "Category", "Count");
    for (category, count) in store.categories() {
        println!("{:<16} {}", truncate(&category, 16), count);
    }
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

