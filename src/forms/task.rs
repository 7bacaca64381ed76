use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use validator::Validate;

use crate::domain::task::{NewTask, Task, TaskPriority, TaskStatus};
use crate::domain::types::{NoteText, TaskTitle, optional_text};
use crate::forms::{Draft, FormError};

/// Draft backing the task create and edit screens.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(max = 200))]
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// When unset the task has no due date and the picker values are ignored.
    pub has_due_date: bool,
    pub due_date: NaiveDate,
    pub due_time: NaiveTime,
    /// Only meaningful with a due date; a task without one is never all-day.
    pub is_all_day: bool,
    pub assignee: String,
}

impl TaskForm {
    /// Create mode: defaults with the date picker on `today` at the next full hour.
    pub fn new(today: NaiveDate, now: NaiveTime) -> Self {
        let next_hour = NaiveTime::from_hms_opt((now.hour() + 1) % 24, 0, 0).unwrap_or(now);
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            has_due_date: false,
            due_date: today,
            due_time: next_hour,
            is_all_day: false,
            assignee: String::new(),
        }
    }

    /// Edit mode: seeded from a stored task.
    pub fn from_task(task: &Task, today: NaiveDate, now: NaiveTime) -> Self {
        let mut form = Self::new(today, now);
        form.title = task.title.as_str().to_string();
        form.description = task.description.as_str().to_string();
        form.status = task.status;
        form.priority = task.priority;
        form.is_all_day = task.is_all_day;
        form.assignee = task.assignee.clone().unwrap_or_default();
        if let Some(due_at) = task.due_at {
            form.has_due_date = true;
            form.due_date = due_at.date();
            form.due_time = due_at.time();
        }
        form
    }
}

impl Draft for TaskForm {
    type Payload = NewTask;

    fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
    }

    fn to_payload(&self) -> Result<NewTask, FormError> {
        self.validate()?;

        let mut task = NewTask::new(TaskTitle::new(self.title.as_str())?);
        task.description = NoteText::new(self.description.as_str());
        task.status = self.status;
        task.priority = self.priority;
        task.assignee = optional_text(Some(self.assignee.as_str()));
        if self.has_due_date {
            task = task.due(self.due_date, self.due_time, self.is_all_day);
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 14).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn blank_title_has_no_content() {
        let mut form = TaskForm::new(date(), time(9, 30));
        assert!(!form.has_content());
        form.title = "   ".into();
        assert!(!form.has_content());
        form.title = "Call supplier".into();
        assert!(form.has_content());
    }

    #[test]
    fn all_day_task_stores_start_of_day() {
        let mut form = TaskForm::new(date(), time(9, 30));
        form.title = "Inspect roof".into();
        form.has_due_date = true;
        form.due_time = time(15, 45);
        form.is_all_day = true;

        let task = form.to_payload().unwrap();
        assert_eq!(task.due_at, Some(date().and_hms_opt(0, 0, 0).unwrap()));
        assert!(task.is_all_day);
    }

    #[test]
    fn timed_task_combines_date_and_time() {
        let mut form = TaskForm::new(date(), time(9, 30));
        form.title = "Inspect roof".into();
        form.has_due_date = true;
        form.due_time = time(15, 45);

        let task = form.to_payload().unwrap();
        let expected: NaiveDateTime = date().and_time(time(15, 45));
        assert_eq!(task.due_at, Some(expected));
    }

    #[test]
    fn no_due_date_ignores_pickers() {
        let mut form = TaskForm::new(date(), time(9, 30));
        form.title = "Order mulch".into();
        form.assignee = "  ".into();

        let task = form.to_payload().unwrap();
        assert_eq!(task.due_at, None);
        assert_eq!(task.assignee, None);
    }

    #[test]
    fn all_day_toggle_needs_due_date() {
        let mut form = TaskForm::new(date(), time(9, 30));
        form.title = "Order mulch".into();
        form.is_all_day = true;

        let task = form.to_payload().unwrap();
        assert_eq!(task.due_at, None);
        assert!(!task.is_all_day);
    }

    #[test]
    fn new_form_defaults_to_next_hour() {
        let form = TaskForm::new(date(), time(23, 10));
        assert_eq!(form.due_time, time(0, 0));
        assert_eq!(form.priority, TaskPriority::Medium);
    }
}
