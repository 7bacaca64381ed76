//! Mock store used to isolate services and forms in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::expense::{Expense, NewExpense, UpdateExpense};
use crate::domain::item::Item;
use crate::domain::job::{Job, JobLineItem, NewJob, NewJobLineItem, UpdateJob};
use crate::domain::task::{NewTask, Task, TaskStatus, UpdateTask};
use crate::domain::types::{ClientId, ExpenseId, ItemId, JobId, TaskId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, ExpenseListQuery, ExpenseReader, ExpenseWriter,
    ItemReader, ItemWriter, JobListQuery, JobReader, JobWriter, TaskListQuery, TaskReader,
    TaskWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(
            &self,
            client_id: ClientId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()>;
    }

    impl JobReader for Repository {
        fn get_job_by_id(&self, id: JobId) -> RepositoryResult<Option<Job>>;
        fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<(usize, Vec<Job>)>;
        fn list_job_line_items(&self, job_id: JobId) -> RepositoryResult<Vec<JobLineItem>>;
    }

    impl JobWriter for Repository {
        fn create_job(
            &self,
            new_job: &NewJob,
            line_items: &[NewJobLineItem],
        ) -> RepositoryResult<Job>;
        fn update_job(&self, job_id: JobId, updates: &UpdateJob) -> RepositoryResult<Job>;
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

    impl TaskReader for Repository {
        fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
        fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)>;
    }

    impl TaskWriter for Repository {
        fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;
        fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task>;
        fn set_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepositoryResult<Task>;
        fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()>;
    }

    impl ItemReader for Repository {
        fn list_items(&self) -> RepositoryResult<Vec<Item>>;
    }

    impl ItemWriter for Repository {
        fn create_item(&self, timestamp: NaiveDateTime) -> RepositoryResult<Item>;
        fn delete_item(&self, item_id: ItemId) -> RepositoryResult<()>;
    }

    impl ExpenseReader for Repository {
        fn get_expense_by_id(&self, id: ExpenseId) -> RepositoryResult<Option<Expense>>;
        fn list_expenses(
            &self,
            query: ExpenseListQuery,
        ) -> RepositoryResult<(usize, Vec<Expense>)>;
    }

    impl ExpenseWriter for Repository {
        fn create_expense(&self, new_expense: &NewExpense) -> RepositoryResult<Expense>;
        fn update_expense(
            &self,
            expense_id: ExpenseId,
            updates: &UpdateExpense,
        ) -> RepositoryResult<Expense>;
        fn delete_expense(&self, expense_id: ExpenseId) -> RepositoryResult<()>;
    }
}
