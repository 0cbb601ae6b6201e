//! Enumerations and field types for tasks.
//!
//! Priorities and the named view filters live here. Unknown priority text
//! parses to `None`; the store decides whether that defaults (add) or keeps
//! the old value (edit).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, High first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Parse a priority name, case-insensitively. `None` for anything else.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Named predicates applied by a view query.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ViewFilter {
    HighPriority,
    DueToday,
    Overdue,
}
