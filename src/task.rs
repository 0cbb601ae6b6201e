//! Task data structure and the inputs that create or change one.
//!
//! `Task` is the persisted record. `NewTask` and `TaskUpdate` carry raw,
//! possibly malformed user input into the store, which resolves it under the
//! fail-soft policy.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::Priority;

pub const DEFAULT_CATEGORY: &str = "General";

/// A single user-visible work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    pub created: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDateTime>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Input for the Add operation. Only `title` is required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Due date change requested by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueUpdate {
    Clear,
    Set(String),
}

/// Partial update for the Edit operation. `None` means "no change".
///
/// `description: Some(String::new())` clears the description, which is not
/// the same as leaving it out.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<DueUpdate>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due.is_none()
    }
}

/// A due date as typed by the user: a literal date or a day offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueSpec {
    On(NaiveDate),
    InDays(u32),
}

impl DueSpec {
    /// Accepts `YYYY-MM-DD` or a non-negative day count.
    pub fn parse(s: &str) -> Option<DueSpec> {
        let s = s.trim();
        if let Ok(days) = s.parse::<u32>() {
            return Some(DueSpec::InDays(days));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(DueSpec::On)
    }

    /// Pin to a calendar date relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DueSpec::On(date) => Some(date),
            DueSpec::InDays(days) => today.checked_add_signed(Duration::days(days as i64)),
        }
    }
}
