use diesel::prelude::*;

use crate::{
    domain::{
        task::{NewTask, Task, TaskStatus, UpdateTask},
        types::TaskId,
    },
    models::task::{NewTask as DbNewTask, Task as DbTask, UpdateTask as DbUpdateTask},
    repository::{
        ChangeKind, DieselRepository, EntityKind, SortOrder, StoreChange, TaskListQuery,
        TaskReader, TaskWriter,
        errors::{RepositoryError, RepositoryResult},
        paginate,
    },
};

impl DieselRepository {
    fn task_updated(&self, db_task: DbTask) -> RepositoryResult<Task> {
        let task = Task::try_from(db_task)?;
        self.publish([StoreChange::new(
            EntityKind::Task,
            ChangeKind::Updated,
            task.id.get(),
        )]);
        Ok(task)
    }
}

impl TaskReader for DieselRepository {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;
        let db_task = tasks::table
            .find(id.get())
            .first::<DbTask>(&mut conn)
            .optional()?;

        db_task
            .map(|task| Task::try_from(task).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<Task>)> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;

        let mut items = tasks::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(status) = query.status {
            items = items.filter(tasks::status.eq(status.to_string()));
        }
        if let Some(priority) = query.priority {
            items = items.filter(tasks::priority.eq(priority.to_string()));
        }
        let items = match query.sort {
            SortOrder::NewestFirst => items.order((tasks::created_at.desc(), tasks::id.desc())),
            SortOrder::OldestFirst => items.order((tasks::created_at.asc(), tasks::id.asc())),
        };

        let matching = items
            .load::<DbTask>(&mut conn)?
            .into_iter()
            .map(Task::try_from)
            .filter(|task| match (task, &query.search) {
                (Ok(task), Some(term)) => task.matches_search(term),
                _ => true,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(paginate(matching, query.pagination.as_ref()))
    }
}

impl TaskWriter for DieselRepository {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;
        let db_task = diesel::insert_into(tasks::table)
            .values(&DbNewTask::from_domain(new_task, Self::now()))
            .get_result::<DbTask>(&mut conn)?;

        let task = Task::try_from(db_task)?;
        self.publish([StoreChange::new(
            EntityKind::Task,
            ChangeKind::Created,
            task.id.get(),
        )]);
        Ok(task)
    }

    fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;
        let db_task = diesel::update(tasks::table.find(task_id.get()))
            .set(&DbUpdateTask::from_domain(updates, Self::now()))
            .get_result::<DbTask>(&mut conn)?;

        self.task_updated(db_task)
    }

    fn set_task_status(&self, task_id: TaskId, status: TaskStatus) -> RepositoryResult<Task> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;
        let db_task = diesel::update(tasks::table.find(task_id.get()))
            .set((
                tasks::status.eq(status.to_string()),
                tasks::updated_at.eq(Self::now()),
            ))
            .get_result::<DbTask>(&mut conn)?;

        self.task_updated(db_task)
    }

    fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()> {
        use crate::schema::tasks;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(tasks::table.find(task_id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.publish([StoreChange::new(
            EntityKind::Task,
            ChangeKind::Deleted,
            task_id.get(),
        )]);
        Ok(())
    }
}
