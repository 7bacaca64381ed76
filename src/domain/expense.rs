use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{ExpenseId, ExpenseTitle, JobId, Money, NoteText, TypeConstraintError};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Fuel,
    Materials,
    Equipment,
    Meals,
    Travel,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Fuel,
        ExpenseCategory::Materials,
        ExpenseCategory::Equipment,
        ExpenseCategory::Meals,
        ExpenseCategory::Travel,
        ExpenseCategory::Other,
    ];
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseCategory::Fuel => write!(f, "Fuel"),
            ExpenseCategory::Materials => write!(f, "Materials"),
            ExpenseCategory::Equipment => write!(f, "Equipment"),
            ExpenseCategory::Meals => write!(f, "Meals"),
            ExpenseCategory::Travel => write!(f, "Travel"),
            ExpenseCategory::Other => write!(f, "Other"),
        }
    }
}

impl TryFrom<&str> for ExpenseCategory {
    type Error = TypeConstraintError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown category `{s}`")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub job_id: Option<JobId>,
    pub title: ExpenseTitle,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    pub notes: NoteText,
    pub created_at: NaiveDateTime,
}

impl Expense {
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.notes.as_str().to_lowercase().contains(&needle)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewExpense {
    pub job_id: Option<JobId>,
    pub title: ExpenseTitle,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    pub notes: NoteText,
}

pub type UpdateExpense = NewExpense;

/// Sum of the given expense amounts.
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount.get()).sum()
}
