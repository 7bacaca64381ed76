use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::expense::{Expense, ExpenseCategory, NewExpense};
use crate::domain::types::{ExpenseTitle, JobId, Money, NoteText};
use crate::forms::{Draft, FormError};

/// Draft backing the expense screens. The amount is kept as typed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseForm {
    #[validate(length(max = 200))]
    pub title: String,
    pub amount: String,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: String,
    pub job_id: Option<JobId>,
}

impl ExpenseForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            amount: String::new(),
            category: ExpenseCategory::default(),
            spent_on: today,
            notes: String::new(),
            job_id: None,
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            title: expense.title.as_str().to_string(),
            amount: format!("{:.2}", expense.amount.get()),
            category: expense.category,
            spent_on: expense.spent_on,
            notes: expense.notes.as_str().to_string(),
            job_id: expense.job_id,
        }
    }

    fn parsed_amount(&self) -> Option<Money> {
        Money::parse(&self.amount).ok().filter(|m| m.get() > 0.0)
    }
}

impl Draft for ExpenseForm {
    type Payload = NewExpense;

    fn has_content(&self) -> bool {
        !self.title.trim().is_empty() && self.parsed_amount().is_some()
    }

    fn to_payload(&self) -> Result<NewExpense, FormError> {
        self.validate()?;

        let amount = self.parsed_amount().ok_or(FormError::InvalidAmount)?;
        Ok(NewExpense {
            job_id: self.job_id,
            title: ExpenseTitle::new(self.title.as_str())?,
            amount,
            category: self.category,
            spent_on: self.spent_on,
            notes: NoteText::new(self.notes.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
    }

    #[test]
    fn requires_title_and_positive_amount() {
        let mut form = ExpenseForm::new(today());
        form.title = "Diesel".into();
        assert!(!form.has_content());

        form.amount = "0".into();
        assert!(!form.has_content());

        form.amount = "abc".into();
        assert!(!form.has_content());

        form.amount = "$1,250.75".into();
        assert!(form.has_content());
        assert_eq!(form.to_payload().unwrap().amount.get(), 1250.75);
    }

    #[test]
    fn notes_are_sanitized() {
        let mut form = ExpenseForm::new(today());
        form.title = "Lunch".into();
        form.amount = "12".into();
        form.category = ExpenseCategory::Meals;
        form.notes = "<script>alert(1)</script>crew".into();

        let expense = form.to_payload().unwrap();
        assert_eq!(expense.notes.as_str(), "crew");
        assert_eq!(expense.category, ExpenseCategory::Meals);
    }
}
