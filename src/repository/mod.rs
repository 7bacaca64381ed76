//! Local store: repository traits, list queries and change notifications.
//!
//! Screens talk to the store through the reader/writer traits below rather
//! than embedding query syntax. Every successful write is announced on a
//! broadcast channel so that list screens can refresh themselves.

use chrono::{NaiveDateTime, Utc};
use tokio::sync::broadcast;

use crate::db::{DbConnection, DbPool};
use crate::domain::{
    client::{Client, NewClient, UpdateClient},
    expense::{Expense, ExpenseCategory, NewExpense, UpdateExpense},
    item::Item,
    job::{Job, JobLineItem, JobStatus, NewJob, NewJobLineItem, UpdateJob},
    task::{NewTask, Task, TaskPriority, TaskStatus, UpdateTask},
    types::{ClientId, ExpenseId, ItemId, JobId, TaskId},
};
use crate::repository::errors::RepositoryResult;

pub mod client;
pub mod errors;
pub mod expense;
pub mod item;
pub mod job;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod task;

/// Number of change notifications buffered per subscriber.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Job,
    JobLineItem,
    Task,
    Item,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Notification published after a record was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreChange {
    pub entity: EntityKind,
    pub kind: ChangeKind,
    pub id: i32,
}

impl StoreChange {
    pub fn new(entity: EntityKind, kind: ChangeKind, id: i32) -> Self {
        Self { entity, kind, id }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub sort: SortOrder,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default)]
pub struct JobListQuery {
    pub client_id: Option<ClientId>,
    pub status: Option<JobStatus>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseListQuery {
    pub job_id: Option<JobId>,
    pub category: Option<ExpenseCategory>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub pagination: Option<Pagination>,
}

/// Trims the search term, treating blank input as no search.
fn normalize_search(term: impl Into<String>) -> Option<String> {
    let term = term.into().trim().to_string();
    if term.is_empty() { None } else { Some(term) }
}

macro_rules! common_query_builders {
    ($name:ident) => {
        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn search(mut self, term: impl Into<String>) -> Self {
                self.search = normalize_search(term);
                self
            }

            pub fn sort(mut self, sort: SortOrder) -> Self {
                self.sort = sort;
                self
            }

            pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
                self.pagination = Some(Pagination { page, per_page });
                self
            }
        }
    };
}

common_query_builders!(ClientListQuery);
common_query_builders!(JobListQuery);
common_query_builders!(TaskListQuery);
common_query_builders!(ExpenseListQuery);

impl JobListQuery {
    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl TaskListQuery {
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl ExpenseListQuery {
    pub fn job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn category(mut self, category: ExpenseCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Returns the total count together with the requested page of `items`.
pub(crate) fn paginate<T>(items: Vec<T>, pagination: Option<&Pagination>) -> (usize, Vec<T>) {
    let total = items.len();
    let Some(pagination) = pagination else {
        return (total, items);
    };
    let offset = (pagination.page.max(1) - 1) * pagination.per_page;
    let page = items
        .into_iter()
        .skip(offset)
        .take(pagination.per_page)
        .collect();
    (total, page)
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(&self, client_id: ClientId, updates: &UpdateClient)
    -> RepositoryResult<Client>;
    /// Deletes the client together with its jobs and their line items.
    fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()>;
}

pub trait JobReader {
    fn get_job_by_id(&self, id: JobId) -> RepositoryResult<Option<Job>>;
    fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<(usize, Vec<Job>)>;
    fn list_job_line_items(&self, job_id: JobId) -> RepositoryResult<Vec<JobLineItem>>;
}

pub trait JobWriter {
    fn create_job(&self, new_job: &NewJob, line_items: &[NewJobLineItem])
    -> RepositoryResult<Job>;
    fn update_job(&self, job_id: JobId, updates: &UpdateJob) -> RepositoryResult<Job>;
    /// Saves the job's fields and replaces its line items in one transaction.
    fn update_job_with_line_items(
        &self,
        job_id: JobId,
        updates: &UpdateJob,
        line_items: &[NewJobLineItem],
    ) -> RepositoryResult<(Job, Vec<JobLineItem>)>;
    fn replace_job_line_items(
        &self,
        job_id: JobId,
        line_items: &[NewJobLineItem],
    ) -> RepositoryResult<Vec<JobLineItem>>;
    fn delete_job(&self, job_id: JobId) -> RepositoryResult<()>;
}

pub trait TaskReader {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
}

pub trait TaskWriter {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
    fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task>;
    fn set_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepositoryResult<Task>;
    fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()>;
}

pub trait ItemReader {
    fn list_items(&self) -> RepositoryResult<Vec<Item>>;
}

pub trait ItemWriter {
    fn create_item(&self, timestamp: NaiveDateTime) -> RepositoryResult<Item>;
    fn delete_item(&self, item_id: ItemId) -> RepositoryResult<()>;
}

pub trait ExpenseReader {
    fn get_expense_by_id(&self, id: ExpenseId) -> RepositoryResult<Option<Expense>>;
    fn list_expenses(&self, query: ExpenseListQuery) -> RepositoryResult<(usize, Vec<Expense>)>;
}

pub trait ExpenseWriter {
    fn create_expense(&self, new_expense: &NewExpense) -> RepositoryResult<Expense>;
    fn update_expense(
        &self,
        expense_id: ExpenseId,
        updates: &UpdateExpense,
    ) -> RepositoryResult<Expense>;
    fn delete_expense(&self, expense_id: ExpenseId) -> RepositoryResult<()>;
}

/// Change-notification stream for screens that keep lists on display.
pub trait StoreEvents {
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Diesel-backed implementation of every store trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
    changes: broadcast::Sender<StoreChange>,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn publish(&self, changes: impl IntoIterator<Item = StoreChange>) {
        for change in changes {
            // No subscribers is not an error.
            let _ = self.changes.send(change);
        }
    }
}

impl StoreEvents for DieselRepository {
    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
