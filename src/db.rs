//! Task collection, persistence and display utilities.
//!
//! This module provides the `Database` struct holding the ordered task
//! collection, the `Storage` load/save contract with its JSON file
//! implementation, and the formatting helpers the CLI uses to render tasks.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::task::Task;

/// In-memory task collection. Insertion order is storage order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
}

impl Database {
    /// Generate the next available task ID: max + 1, or the lowest free id
    /// once the max is `u64::MAX`.
    pub fn next_id(&self) -> u64 {
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        max.checked_add(1).unwrap_or_else(|| {
            let used: HashSet<u64> = self.tasks.iter().map(|t| t.id).collect();
            (1..).find(|id| !used.contains(id)).unwrap_or(1)
        })
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        let idx = self.position(id)?;
        self.tasks.get_mut(idx)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// True when every task id is distinct.
    pub fn ids_unique(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        self.tasks.iter().all(|t| seen.insert(t.id))
    }

    /// Ids are distinct, positive, and leave room for `next_id`.
    pub fn ids_valid(&self) -> bool {
        self.ids_unique() && self.tasks.iter().all(|t| t.id != 0 && t.id != u64::MAX)
    }
}

/// Load/save contract for a task collection.
pub trait Storage {
    /// Never fails: missing or malformed state yields an empty collection.
    fn load(&self) -> Database;

    fn save(&self, db: &Database) -> Result<()>;
}

/// JSON file storage: `{"tasks": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where an unusable task file is moved aside to.
    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }

    /// Move an unusable file out of the way so the next save cannot clobber it.
    fn set_aside(&self, reason: &str) -> Database {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                "{reason}, moved file aside and starting fresh"
            ),
            Err(e) => warn!(
                path = %self.path.display(),
                "{reason}, starting fresh; could not move file aside ({e}), the next save overwrites it"
            ),
        }
        Database::default()
    }
}

impl Storage for JsonFile {
    fn load(&self) -> Database {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no task file yet, starting empty");
            return Database::default();
        }
        let mut buf = String::new();
        if let Err(e) = File::open(&self.path).and_then(|mut f| f.read_to_string(&mut buf)) {
            warn!(path = %self.path.display(), "error reading tasks, starting fresh: {e}");
            return Database::default();
        }
        match serde_json::from_str::<Database>(&buf) {
            Ok(db) if db.ids_valid() => {
                info!(path = %self.path.display(), count = db.tasks.len(), "loaded tasks");
                db
            }
            Ok(_) => self.set_aside("duplicate or out-of-range task ids"),
            Err(e) => self.set_aside(&format!("error parsing tasks: {e}")),
        }
    }

    /// Atomic-ish write via temp file + rename.
    fn save(&self, db: &Database) -> Result<()> {
        let data = serde_json::to_string_pretty(db)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), count = db.tasks.len(), "saved tasks");
        Ok(())
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            if days == 0 {
                "today".into()
            } else if days == 1 {
                "tomorrow".into()
            } else if days > 1 {
                format!("in {days}d")
            } else {
                format!("{}d late", -days)
            }
        }
    }
}

pub fn status_mark(task: &Task) -> &'static str {
    if task.completed {
        "✓"
    } else {
        "○"
    }
}

/// Print tasks in a fixed-width table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<5} {:<2} {:<7} {:<12} {:<14} {}",
        "ID", "", "Pri", "Due", "Category", "Title"
    );
    for t in tasks {
        println!(
            "{:<5} {:<2} {:<7} {:<12} {:<14} {}",
            t.id,
            status_mark(t),
            t.priority.label(),
            format_due_relative(t.due_date, today),
            truncate(&t.category, 14),
            t.title
        );
        if !t.description.is_empty() {
            println!("{:<5} {}", "", truncate(&t.description, 72));
        }
    }
}

/// Print every field of one task.
pub fn print_task(task: &Task, today: NaiveDate) {
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "Done" } else { "Pending" });
    println!("Priority:     {}", task.priority.label());
    println!("Category:     {}", task.category);
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Created:      {}", task.created);
    if let Some(done) = task.completed_date {
        println!("Completed:    {}", done.format("%Y-%m-%d %H:%M"));
    }
    if !task.description.is_empty() {
        println!("Description:\n{}", task.description);
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
