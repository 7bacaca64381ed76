use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::task::{
    NewTask as DomainNewTask, Task as DomainTask, TaskPriority, TaskStatus, compose_due_at,
};
use crate::domain::types::{NoteText, TaskId, TaskTitle, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tasks)]
/// Diesel model for [`crate::domain::task::Task`].
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_at: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub assignee: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: String,
    pub priority: String,
    pub due_at: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub assignee: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: String,
    pub priority: String,
    pub due_at: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub assignee: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Task> for DomainTask {
    type Error = TypeConstraintError;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::try_from(task.id)?,
            title: TaskTitle::new(task.title)?,
            description: NoteText::new(task.description),
            status: TaskStatus::try_from(task.status.as_str())?,
            priority: TaskPriority::try_from(task.priority.as_str())?,
            due_at: task.due_at,
            is_all_day: task.is_all_day,
            assignee: task.assignee,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }
}

/// Due timestamp as stored: all-day tasks are pinned to the start of the day
/// whatever time the payload carries.
fn stored_due_at(task: &DomainNewTask) -> Option<NaiveDateTime> {
    task.due_at
        .map(|due| compose_due_at(due.date(), due.time(), task.is_all_day))
}

impl<'a> NewTask<'a> {
    pub fn from_domain(task: &'a DomainNewTask, now: NaiveDateTime) -> Self {
        Self {
            title: task.title.as_str(),
            description: task.description.as_str(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            due_at: stored_due_at(task),
            is_all_day: task.is_all_day,
            assignee: task.assignee.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> UpdateTask<'a> {
    pub fn from_domain(task: &'a DomainNewTask, now: NaiveDateTime) -> Self {
        Self {
            title: task.title.as_str(),
            description: task.description.as_str(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            due_at: stored_due_at(task),
            is_all_day: task.is_all_day,
            assignee: task.assignee.as_deref(),
            updated_at: now,
        }
    }
}
