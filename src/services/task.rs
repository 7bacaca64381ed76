//! Task list and status workflows.

use chrono::NaiveDateTime;

use crate::domain::task::{NewTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crate::domain::types::TaskId;
use crate::repository::{TaskListQuery, TaskReader, TaskWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_tasks<R>(
    repo: &R,
    search: Option<&str>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
) -> ServiceResult<Vec<Task>>
where
    R: TaskReader + ?Sized,
{
    let mut query = TaskListQuery::new();
    if let Some(term) = search {
        query = query.search(term);
    }
    if let Some(status) = status {
        query = query.status(status);
    }
    if let Some(priority) = priority {
        query = query.priority(priority);
    }

    let (_, tasks) = repo.list_tasks(query).map_err(|err| {
        log::error!("Failed to list tasks: {err}");
        ServiceError::from(err)
    })?;
    Ok(tasks)
}

/// Tasks past their due time that are not completed, most urgent first.
pub fn list_overdue_tasks<R>(repo: &R, now: NaiveDateTime) -> ServiceResult<Vec<Task>>
where
    R: TaskReader + ?Sized,
{
    let (_, tasks) = repo.list_tasks(TaskListQuery::new())?;
    let mut overdue: Vec<Task> = tasks.into_iter().filter(|t| t.is_overdue(now)).collect();
    overdue.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.due_at.cmp(&b.due_at)));
    Ok(overdue)
}

pub fn get_task<R>(repo: &R, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + ?Sized,
{
    let task_id = TaskId::new(task_id)?;
    repo.get_task_by_id(task_id)?.ok_or(ServiceError::NotFound)
}

pub fn create_task<R>(repo: &R, new_task: &NewTask) -> ServiceResult<Task>
where
    R: TaskWriter + ?Sized,
{
    repo.create_task(new_task).map_err(|err| {
        log::error!("Failed to create a task: {err}");
        ServiceError::from(err)
    })
}

pub fn update_task<R>(repo: &R, task_id: i32, updates: &UpdateTask) -> ServiceResult<Task>
where
    R: TaskWriter + ?Sized,
{
    let task_id = TaskId::new(task_id)?;
    repo.update_task(task_id, updates).map_err(|err| {
        log::error!("Failed to update task {task_id}: {err}");
        ServiceError::from(err)
    })
}

/// Changes the status in place from the task detail screen.
pub fn set_task_status<R>(repo: &R, task_id: i32, status: TaskStatus) -> ServiceResult<Task>
where
    R: TaskWriter + ?Sized,
{
    let task_id = TaskId::new(task_id)?;
    repo.set_task_status(task_id, status).map_err(|err| {
        log::error!("Failed to set status of task {task_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn delete_task<R>(repo: &R, task_id: i32) -> ServiceResult<()>
where
    R: TaskWriter + ?Sized,
{
    let task_id = TaskId::new(task_id)?;
    repo.delete_task(task_id).map_err(|err| {
        log::error!("Failed to delete task {task_id}: {err}");
        ServiceError::from(err)
    })
}
