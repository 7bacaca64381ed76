use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::expense::{Expense as DomainExpense, ExpenseCategory, NewExpense as DomainNewExpense};
use crate::domain::types::{ExpenseId, ExpenseTitle, JobId, Money, NoteText, TypeConstraintError};
use crate::models::job::Job;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Job, foreign_key = job_id))]
#[diesel(table_name = crate::schema::expenses)]
pub struct Expense {
    pub id: i32,
    pub job_id: Option<i32>,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub spent_on: NaiveDate,
    pub notes: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::expenses)]
pub struct NewExpense<'a> {
    pub job_id: Option<i32>,
    pub title: &'a str,
    pub amount: f64,
    pub category: String,
    pub spent_on: NaiveDate,
    pub notes: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::expenses)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateExpense<'a> {
    pub job_id: Option<i32>,
    pub title: &'a str,
    pub amount: f64,
    pub category: String,
    pub spent_on: NaiveDate,
    pub notes: &'a str,
}

impl TryFrom<Expense> for DomainExpense {
    type Error = TypeConstraintError;

    fn try_from(expense: Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ExpenseId::try_from(expense.id)?,
            job_id: expense.job_id.map(JobId::try_from).transpose()?,
            title: ExpenseTitle::new(expense.title)?,
            amount: Money::new(expense.amount)?,
            category: ExpenseCategory::try_from(expense.category.as_str())?,
            spent_on: expense.spent_on,
            notes: NoteText::new(expense.notes),
            created_at: expense.created_at,
        })
    }
}

impl<'a> NewExpense<'a> {
    pub fn from_domain(expense: &'a DomainNewExpense, now: NaiveDateTime) -> Self {
        Self {
            job_id: expense.job_id.map(JobId::get),
            title: expense.title.as_str(),
            amount: expense.amount.get(),
            category: expense.category.to_string(),
            spent_on: expense.spent_on,
            notes: expense.notes.as_str(),
            created_at: now,
        }
    }
}

impl<'a> From<&'a DomainNewExpense> for UpdateExpense<'a> {
    fn from(expense: &'a DomainNewExpense) -> Self {
        Self {
            job_id: expense.job_id.map(JobId::get),
            title: expense.title.as_str(),
            amount: expense.amount.get(),
            category: expense.category.to_string(),
            spent_on: expense.spent_on,
            notes: expense.notes.as_str(),
        }
    }
}
