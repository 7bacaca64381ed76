use diesel::prelude::*;

use crate::{
    domain::{
        expense::{Expense, NewExpense, UpdateExpense},
        types::ExpenseId,
    },
    models::expense::{
        Expense as DbExpense, NewExpense as DbNewExpense, UpdateExpense as DbUpdateExpense,
    },
    repository::{
        ChangeKind, DieselRepository, EntityKind, ExpenseListQuery, ExpenseReader, ExpenseWriter,
        SortOrder, StoreChange,
        errors::{RepositoryError, RepositoryResult},
        paginate,
    },
};

impl ExpenseReader for DieselRepository {
    fn get_expense_by_id(&self, id: ExpenseId) -> RepositoryResult<Option<Expense>> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;
        let db_expense = expenses::table
            .find(id.get())
            .first::<DbExpense>(&mut conn)
            .optional()?;

        db_expense
            .map(|expense| Expense::try_from(expense).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_expenses(&self, query: ExpenseListQuery) -> RepositoryResult<(usize, Vec<Expense>)> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;

        let mut items = expenses::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(job_id) = query.job_id {
            items = items.filter(expenses::job_id.eq(job_id.get()));
        }
        if let Some(category) = query.category {
            items = items.filter(expenses::category.eq(category.to_string()));
        }
        let items = match query.sort {
            SortOrder::NewestFirst => {
                items.order((expenses::created_at.desc(), expenses::id.desc()))
            }
            SortOrder::OldestFirst => items.order((expenses::created_at.asc(), expenses::id.asc())),
        };

        let matching = items
            .load::<DbExpense>(&mut conn)?
            .into_iter()
            .map(Expense::try_from)
            .filter(|expense| match (expense, &query.search) {
                (Ok(expense), Some(term)) => expense.matches_search(term),
                _ => true,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(paginate(matching, query.pagination.as_ref()))
    }
}

impl ExpenseWriter for DieselRepository {
    fn create_expense(&self, new_expense: &NewExpense) -> RepositoryResult<Expense> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;
        let db_expense = diesel::insert_into(expenses::table)
            .values(&DbNewExpense::from_domain(new_expense, Self::now()))
            .get_result::<DbExpense>(&mut conn)?;

        let expense = Expense::try_from(db_expense)?;
        self.publish([StoreChange::new(
            EntityKind::Expense,
            ChangeKind::Created,
            expense.id.get(),
        )]);
        Ok(expense)
    }

    fn update_expense(
        &self,
        expense_id: ExpenseId,
        updates: &UpdateExpense,
    ) -> RepositoryResult<Expense> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;
        let changeset: DbUpdateExpense = updates.into();
        let db_expense = diesel::update(expenses::table.find(expense_id.get()))
            .set(&changeset)
            .get_result::<DbExpense>(&mut conn)?;

        let expense = Expense::try_from(db_expense)?;
        self.publish([StoreChange::new(
            EntityKind::Expense,
            ChangeKind::Updated,
            expense.id.get(),
        )]);
        Ok(expense)
    }

    fn delete_expense(&self, expense_id: ExpenseId) -> RepositoryResult<()> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(expenses::table.find(expense_id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.publish([StoreChange::new(
            EntityKind::Expense,
            ChangeKind::Deleted,
            expense_id.get(),
        )]);
        Ok(())
    }
}
