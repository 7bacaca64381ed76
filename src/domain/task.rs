//! Tasks: flat to-do records with status, priority and an optional due time.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{NoteText, TaskId, TaskTitle, TypeConstraintError};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    OnHold,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::OnHold,
    ];
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "Open"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::Completed => write!(f, "Completed"),
            TaskStatus::OnHold => write!(f, "On Hold"),
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = TypeConstraintError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "Open" => Ok(TaskStatus::Open),
            "In Progress" => Ok(TaskStatus::InProgress),
            "Completed" => Ok(TaskStatus::Completed),
            "On Hold" => Ok(TaskStatus::OnHold),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown task status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "Low"),
            TaskPriority::Medium => write!(f, "Medium"),
            TaskPriority::High => write!(f, "High"),
            TaskPriority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = TypeConstraintError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "Low" => Ok(TaskPriority::Low),
            "Medium" => Ok(TaskPriority::Medium),
            "High" => Ok(TaskPriority::High),
            "Urgent" => Ok(TaskPriority::Urgent),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown task priority `{other}`"
            ))),
        }
    }
}

/// Combines a picked date and time into the stored due timestamp.
///
/// All-day tasks always land on the start of the selected day; the picked
/// time is ignored.
pub fn compose_due_at(date: NaiveDate, time: NaiveTime, is_all_day: bool) -> NaiveDateTime {
    if is_all_day {
        date.and_time(NaiveTime::MIN)
    } else {
        date.and_time(time)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: TaskTitle,
    pub description: NoteText,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub assignee: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Task {
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        if self.status == TaskStatus::Completed {
            return false;
        }
        match self.due_at {
            // An all-day task is due for the whole day.
            Some(due) if self.is_all_day => due.date() < now.date(),
            Some(due) => due < now,
            None => false,
        }
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.assignee.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewTask {
    pub title: TaskTitle,
    pub description: NoteText,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub assignee: Option<String>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: NoteText::default(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_at: None,
            is_all_day: false,
            assignee: None,
        }
    }

    /// Sets the due timestamp from a picked date and time.
    #[must_use]
    pub fn due(mut self, date: NaiveDate, time: NaiveTime, is_all_day: bool) -> Self {
        self.due_at = Some(compose_due_at(date, time, is_all_day));
        self.is_all_day = is_all_day;
        self
    }
}

/// Full replacement of a task's editable fields.
pub type UpdateTask = NewTask;
