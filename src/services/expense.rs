//! Expense tracking workflows.

use crate::domain::expense::{Expense, ExpenseCategory, NewExpense, UpdateExpense, total_spent};
use crate::domain::types::{ExpenseId, JobId};
use crate::repository::{ExpenseListQuery, ExpenseReader, ExpenseWriter};
use crate::services::{ServiceError, ServiceResult};

/// Expenses booked against one job with their running total.
#[derive(Debug, Clone)]
pub struct JobExpenses {
    pub expenses: Vec<Expense>,
    pub total: f64,
}

pub fn list_expenses<R>(
    repo: &R,
    search: Option<&str>,
    category: Option<ExpenseCategory>,
) -> ServiceResult<Vec<Expense>>
where
    R: ExpenseReader + ?Sized,
{
    let mut query = ExpenseListQuery::new();
    if let Some(term) = search {
        query = query.search(term);
    }
    if let Some(category) = category {
        query = query.category(category);
    }

    let (_, expenses) = repo.list_expenses(query).map_err(|err| {
        log::error!("Failed to list expenses: {err}");
        ServiceError::from(err)
    })?;
    Ok(expenses)
}

pub fn list_job_expenses<R>(repo: &R, job_id: i32) -> ServiceResult<JobExpenses>
where
    R: ExpenseReader + ?Sized,
{
    let job_id = JobId::new(job_id)?;
    let (_, expenses) = repo.list_expenses(ExpenseListQuery::new().job(job_id))?;
    let total = total_spent(&expenses);
    Ok(JobExpenses { expenses, total })
}

pub fn get_expense<R>(repo: &R, expense_id: i32) -> ServiceResult<Expense>
where
    R: ExpenseReader + ?Sized,
{
    let expense_id = ExpenseId::new(expense_id)?;
    repo.get_expense_by_id(expense_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_expense<R>(repo: &R, new_expense: &NewExpense) -> ServiceResult<Expense>
where
    R: ExpenseWriter + ?Sized,
{
    repo.create_expense(new_expense).map_err(|err| {
        log::error!("Failed to create an expense: {err}");
        ServiceError::from(err)
    })
}

pub fn update_expense<R>(
    repo: &R,
    expense_id: i32,
    updates: &UpdateExpense,
) -> ServiceResult<Expense>
where
    R: ExpenseWriter + ?Sized,
{
    let expense_id = ExpenseId::new(expense_id)?;
    repo.update_expense(expense_id, updates).map_err(|err| {
        log::error!("Failed to update expense {expense_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn delete_expense<R>(repo: &R, expense_id: i32) -> ServiceResult<()>
where
    R: ExpenseWriter + ?Sized,
{
    let expense_id = ExpenseId::new(expense_id)?;
    repo.delete_expense(expense_id).map_err(|err| {
        log::error!("Failed to delete expense {expense_id}: {err}");
        ServiceError::from(err)
    })
}
