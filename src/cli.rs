use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task manager with priorities, categories and due dates.
/// Storage defaults to ~/.todo/todo_data.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal task manager CLI")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true, env = "TODO_DB")]
    pub db: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the task file: --db / TODO_DB, else ~/.todo/todo_data.json.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.db {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".todo").join("todo_data.json"),
            None => PathBuf::from("todo_data.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ViewFilter;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "todo", "--db", "/tmp/t.json", "add", "Buy milk", "--priority", "High", "--due", "2",
        ])
        .unwrap();
        assert_eq!(cli.db_path(), PathBuf::from("/tmp/t.json"));
        match cli.command {
            Commands::Add { title, priority, due, category, desc } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(priority.as_deref(), Some("High"));
                assert_eq!(due.as_deref(), Some("2"));
                assert!(category.is_none());
                assert!(desc.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_list_filter() {
        let cli = Cli::try_parse_from(["todo", "list", "--filter", "overdue", "--pending"]).unwrap();
        match cli.command {
            Commands::List { filter, pending } => {
                assert_eq!(filter, Some(ViewFilter::Overdue));
                assert!(pending);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_edit_due_and_clear_due_conflict() {
        let res = Cli::try_parse_from(["todo", "edit", "1", "--due", "3", "--clear-due"]);
        assert!(res.is_err());
    }
}
