//! Task store: the session object that owns a loaded task collection.
//!
//! Every operation runs against the in-memory collection. Persistence is a
//! separate, explicit step through a `Storage`. Dates come from the injected
//! `Clock`, so the same store behaves identically under test.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::db::{Database, Storage};
use crate::error::Result;
use crate::fields::{Priority, ViewFilter};
use crate::task::{DueSpec, DueUpdate, NewTask, Task, TaskUpdate, DEFAULT_CATEGORY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed,
    AlreadyCompleted,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Applied. `ignored` names fields whose new value was rejected and left as is.
    Updated { ignored: Vec<Field> },
    NotFound,
}

/// Editable task fields, used to report rejected edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Priority,
    Category,
    DueDate,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Priority => "priority",
            Field::Category => "category",
            Field::DueDate => "due date",
        }
    }
}

/// Summary counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub high_priority_pending: usize,
}

pub struct TaskStore<C: Clock> {
    db: Database,
    clock: C,
}

impl<C: Clock> TaskStore<C> {
    pub fn new(db: Database, clock: C) -> Self {
        TaskStore { db, clock }
    }

    /// Load the collection once for this session.
    pub fn open(storage: &impl Storage, clock: C) -> Self {
        Self::new(storage.load(), clock)
    }

    /// Write the collection back. Memory state is untouched on failure.
    pub fn save(&self, storage: &impl Storage) -> Result<()> {
        storage.save(&self.db)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.db.tasks
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.db.get(id)
    }

    /// Create a task and append it to the collection.
    ///
    /// Invalid priority falls back to Medium and an unparseable due date
    /// leaves the task without one; neither stops the task being created.
    pub fn add(&mut self, new: NewTask) -> Task {
        let today = self.clock.today();
        let priority = match new.priority.as_deref() {
            None => Priority::default(),
            Some(raw) => Priority::parse(raw).unwrap_or_else(|| {
                warn!(priority = raw, "unknown priority, using Medium");
                Priority::default()
            }),
        };
        let category = new
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let due_date = new.due.as_deref().and_then(|raw| {
            let resolved = DueSpec::parse(raw).and_then(|spec| spec.resolve(today));
            if resolved.is_none() {
                warn!(due = raw, "unparseable due date, leaving it unset");
            }
            resolved
        });

        let task = Task {
            id: self.db.next_id(),
            title: new.title,
            description: new.description.unwrap_or_default(),
            priority,
            category,
            completed: false,
            created: today,
            due_date,
            completed_date: None,
        };
        debug!(id = task.id, title = %task.title, "added task");
        self.db.tasks.push(task.clone());
        task
    }

    /// Filtered, sorted view. Never mutates the collection.
    ///
    /// Order: due date (none last), then priority, then creation date.
    pub fn view(&self, filter: Option<ViewFilter>, include_completed: bool) -> Vec<&Task> {
        let today = self.clock.today();
        let mut out: Vec<&Task> = self
            .db
            .tasks
            .iter()
            .filter(|t| include_completed || !t.completed)
            .filter(|t| match filter {
                None => true,
                Some(ViewFilter::HighPriority) => t.priority == Priority::High,
                Some(ViewFilter::DueToday) => t.due_date == Some(today),
                Some(ViewFilter::Overdue) => is_overdue(t, today),
            })
            .collect();
        out.sort_by_key(|t| {
            (
                t.due_date.unwrap_or(NaiveDate::MAX),
                t.priority.rank(),
                t.created,
            )
        });
        debug!(?filter, include_completed, count = out.len(), "view");
        out
    }

    pub fn complete(&mut self, id: u64) -> CompleteOutcome {
        let now = self.clock.now();
        let Some(task) = self.db.get_mut(id) else {
            return CompleteOutcome::NotFound;
        };
        if task.completed {
            return CompleteOutcome::AlreadyCompleted;
        }
        task.completed = true;
        task.completed_date = Some(now);
        debug!(id, "completed task");
        CompleteOutcome::Completed
    }

    pub fn delete(&mut self, id: u64) -> DeleteOutcome {
        match self.db.position(id) {
            Some(idx) => {
                let task = self.db.tasks.remove(idx);
                debug!(id, "deleted task");
                DeleteOutcome::Deleted(task.title)
            }
            None => DeleteOutcome::NotFound,
        }
    }

    /// Case-insensitive substring match on title, description and category,
    /// in collection order. An empty term matches nothing.
    pub fn search(&self, term: &str) -> Vec<&Task> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.db
            .tasks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
                    || t.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Apply a partial update. Rejected fields keep their old value while
    /// the rest of the update still lands.
    pub fn edit(&mut self, id: u64, update: TaskUpdate) -> EditOutcome {
        let today = self.clock.today();
        let Some(task) = self.db.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        let mut ignored = Vec::new();

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                ignored.push(Field::Title);
            } else {
                task.title = title;
            }
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(raw) = update.priority {
            match Priority::parse(&raw) {
                Some(p) => task.priority = p,
                None => {
                    warn!(id, priority = %raw, "unknown priority, keeping current");
                    ignored.push(Field::Priority);
                }
            }
        }
        if let Some(category) = update.category {
            if category.trim().is_empty() {
                ignored.push(Field::Category);
            } else {
                task.category = category;
            }
        }
        match update.due {
            None => {}
            Some(DueUpdate::Clear) => task.due_date = None,
            Some(DueUpdate::Set(raw)) => {
                match DueSpec::parse(&raw).and_then(|spec| spec.resolve(today)) {
                    Some(date) => task.due_date = Some(date),
                    None => {
                        warn!(id, due = %raw, "unparseable due date, keeping current");
                        ignored.push(Field::DueDate);
                    }
                }
            }
        }
        debug!(id, ?ignored, "edited task");
        EditOutcome::Updated { ignored }
    }

    /// Remove completed tasks, optionally renumbering the survivors.
    pub fn clear_completed(&mut self, renumber: bool) -> usize {
        let before = self.db.tasks.len();
        self.db.tasks.retain(|t| !t.completed);
        let removed = before - self.db.tasks.len();
        if removed > 0 && renumber {
            self.renumber();
        }
        debug!(removed, renumber, "cleared completed tasks");
        removed
    }

    /// Reassign ids 1..=n in collection order.
    pub fn renumber(&mut self) {
        for (i, task) in self.db.tasks.iter_mut().enumerate() {
            task.id = i as u64 + 1;
        }
    }

    pub fn stats(&self) -> Stats {
        let today = self.clock.today();
        let mut stats = Stats {
            total: self.db.tasks.len(),
            ..Stats::default()
        };
        for t in &self.db.tasks {
            if t.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
                if t.priority == Priority::High {
                    stats.high_priority_pending += 1;
                }
            }
            if is_overdue(t, today) {
                stats.overdue += 1;
            }
            if t.due_date == Some(today) {
                stats.due_today += 1;
            }
        }
        stats
    }

    /// Distinct categories with task counts, sorted by name.
    pub fn categories(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for t in &self.db.tasks {
            *counts.entry(t.category.clone()).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.is_some_and(|d| d < today)
}
