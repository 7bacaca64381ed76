//! Repository implementation for jobs and their line items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    db::DbConnection,
    domain::{
        job::{Job, JobLineItem, NewJob, NewJobLineItem, UpdateJob, line_items_subtotal},
        types::JobId,
    },
    models::job::{
        Job as DbJob, JobLineItem as DbJobLineItem, NewJob as DbNewJob,
        NewJobLineItem as DbNewJobLineItem, UpdateJob as DbUpdateJob,
    },
    repository::{
        ChangeKind, DieselRepository, EntityKind, JobListQuery, JobReader, JobWriter, SortOrder,
        StoreChange,
        errors::{RepositoryError, RepositoryResult},
        paginate,
    },
};

/// Inserts `line_items` for `job_id`, returning the new row ids.
fn insert_line_items(
    conn: &mut DbConnection,
    job_id: JobId,
    line_items: &[NewJobLineItem],
) -> RepositoryResult<Vec<i32>> {
    use crate::schema::job_line_items;

    line_items
        .iter()
        .map(|item| {
            diesel::insert_into(job_line_items::table)
                .values(&DbNewJobLineItem::from_domain(job_id, item))
                .returning(job_line_items::id)
                .get_result::<i32>(conn)
                .map_err(RepositoryError::from)
        })
        .collect()
}

fn load_line_items(conn: &mut DbConnection, job_id: JobId) -> RepositoryResult<Vec<JobLineItem>> {
    use crate::schema::job_line_items;

    job_line_items::table
        .filter(job_line_items::job_id.eq(job_id.get()))
        .order(job_line_items::id.asc())
        .load::<DbJobLineItem>(conn)?
        .into_iter()
        .map(|item| JobLineItem::try_from(item).map_err(RepositoryError::from))
        .collect()
}

/// Replaces every line item of `job_id` and stores the new subtotal.
/// Returns the removed row ids and the stored items. Runs inside the
/// caller's transaction.
fn swap_line_items(
    conn: &mut DbConnection,
    job_id: JobId,
    line_items: &[NewJobLineItem],
    now: NaiveDateTime,
) -> RepositoryResult<(Vec<i32>, Vec<JobLineItem>)> {
    use crate::schema::{job_line_items, jobs};

    let updated = diesel::update(jobs::table.find(job_id.get()))
        .set((
            jobs::subtotal.eq(line_items_subtotal(line_items)),
            jobs::updated_at.eq(now),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(RepositoryError::NotFound);
    }

    let removed_ids = job_line_items::table
        .filter(job_line_items::job_id.eq(job_id.get()))
        .select(job_line_items::id)
        .load::<i32>(conn)?;
    diesel::delete(job_line_items::table.filter(job_line_items::job_id.eq(job_id.get())))
        .execute(conn)?;

    insert_line_items(conn, job_id, line_items)?;
    let stored = load_line_items(conn, job_id)?;
    Ok((removed_ids, stored))
}

/// Changes announced after a job's line items were replaced.
fn line_item_changes(
    job_id: JobId,
    removed_ids: Vec<i32>,
    stored: &[JobLineItem],
) -> Vec<StoreChange> {
    removed_ids
        .into_iter()
        .map(|id| StoreChange::new(EntityKind::JobLineItem, ChangeKind::Deleted, id))
        .chain(stored.iter().map(|item| {
            StoreChange::new(EntityKind::JobLineItem, ChangeKind::Created, item.id.get())
        }))
        .chain([StoreChange::new(EntityKind::Job, ChangeKind::Updated, job_id.get())])
        .collect()
}

impl JobReader for DieselRepository {
    fn get_job_by_id(&self, id: JobId) -> RepositoryResult<Option<Job>> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let db_job = jobs::table
            .find(id.get())
            .first::<DbJob>(&mut conn)
            .optional()?;

        match db_job {
            Some(db_job) => Ok(Some(Job::try_from(db_job)?)),
            None => Ok(None),
        }
    }

    fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<(usize, Vec<Job>)> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;

        let mut items = jobs::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = query.client_id {
            items = items.filter(jobs::client_id.eq(client_id.get()));
        }
        if let Some(status) = query.status {
            items = items.filter(jobs::status.eq(status.to_string()));
        }
        let items = match query.sort {
            SortOrder::NewestFirst => items.order((jobs::created_at.desc(), jobs::id.desc())),
            SortOrder::OldestFirst => items.order((jobs::created_at.asc(), jobs::id.asc())),
        };

        let matching = items
            .load::<DbJob>(&mut conn)?
            .into_iter()
            .map(Job::try_from)
            .filter(|job| match (job, &query.search) {
                (Ok(job), Some(term)) => job.matches_search(term),
                _ => true,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(paginate(matching, query.pagination.as_ref()))
    }

    fn list_job_line_items(&self, job_id: JobId) -> RepositoryResult<Vec<JobLineItem>> {
        let mut conn = self.conn()?;
        load_line_items(&mut conn, job_id)
    }
}

impl JobWriter for DieselRepository {
    fn create_job(
        &self,
        new_job: &NewJob,
        line_items: &[NewJobLineItem],
    ) -> RepositoryResult<Job> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let subtotal = line_items_subtotal(line_items);
        let insertable = DbNewJob::from_domain(new_job, subtotal, Self::now());

        let (job, line_item_ids) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_job = diesel::insert_into(jobs::table)
                .values(&insertable)
                .get_result::<DbJob>(conn)?;
            let job = Job::try_from(db_job)?;
            let line_item_ids = insert_line_items(conn, job.id, line_items)?;
            Ok((job, line_item_ids))
        })?;

        let line_item_changes = line_item_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::JobLineItem, ChangeKind::Created, id));
        self.publish(
            [StoreChange::new(
                EntityKind::Job,
                ChangeKind::Created,
                job.id.get(),
            )]
            .into_iter()
            .chain(line_item_changes),
        );
        Ok(job)
    }

    fn update_job(&self, job_id: JobId, updates: &UpdateJob) -> RepositoryResult<Job> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let changeset = DbUpdateJob::from_domain(updates, Self::now());

        let updated = diesel::update(jobs::table.find(job_id.get()))
            .set(&changeset)
            .get_result::<DbJob>(&mut conn)?;

        let job = Job::try_from(updated)?;
        self.publish([StoreChange::new(
            EntityKind::Job,
            ChangeKind::Updated,
            job.id.get(),
        )]);
        Ok(job)
    }

    fn replace_job_line_items(
        &self,
        job_id: JobId,
        line_items: &[NewJobLineItem],
    ) -> RepositoryResult<Vec<JobLineItem>> {
        let mut conn = self.conn()?;
        let now = Self::now();

        let (removed_ids, stored) = conn.transaction::<_, RepositoryError, _>(|conn| {
            swap_line_items(conn, job_id, line_items, now)
        })?;

        self.publish(line_item_changes(job_id, removed_ids, &stored));
        Ok(stored)
    }

    fn update_job_with_line_items(
        &self,
        job_id: JobId,
        updates: &UpdateJob,
        line_items: &[NewJobLineItem],
    ) -> RepositoryResult<(Job, Vec<JobLineItem>)> {
        use crate::schema::jobs;

        let mut conn = self.conn()?;
        let now = Self::now();
        let changeset = DbUpdateJob::from_domain(updates, now);

        let (db_job, removed_ids, stored) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let updated = diesel::update(jobs::table.find(job_id.get()))
                .set(&changeset)
                .execute(conn)?;
            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }
            let (removed_ids, stored) = swap_line_items(conn, job_id, line_items, now)?;
            let db_job = jobs::table.find(job_id.get()).first::<DbJob>(conn)?;
            Ok((db_job, removed_ids, stored))
        })?;

        let job = Job::try_from(db_job)?;
        self.publish(line_item_changes(job_id, removed_ids, &stored));
        Ok((job, stored))
    }

    fn delete_job(&self, job_id: JobId) -> RepositoryResult<()> {
        use crate::schema::{expenses, job_line_items, jobs};

        let mut conn = self.conn()?;

        let (line_item_ids, expense_ids) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let line_item_ids = job_line_items::table
                .filter(job_line_items::job_id.eq(job_id.get()))
                .select(job_line_items::id)
                .load::<i32>(conn)?;
            let expense_ids = expenses::table
                .filter(expenses::job_id.eq(job_id.get()))
                .select(expenses::id)
                .load::<i32>(conn)?;

            diesel::delete(job_line_items::table.filter(job_line_items::job_id.eq(job_id.get())))
                .execute(conn)?;
            diesel::update(expenses::table.filter(expenses::job_id.eq(job_id.get())))
                .set(expenses::job_id.eq(None::<i32>))
                .execute(conn)?;

            let deleted = diesel::delete(jobs::table.find(job_id.get())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok((line_item_ids, expense_ids))
        })?;

        let line_items = line_item_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::JobLineItem, ChangeKind::Deleted, id));
        let expenses = expense_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::Expense, ChangeKind::Updated, id));
        self.publish(
            line_items
                .chain(expenses)
                .chain([StoreChange::new(EntityKind::Job, ChangeKind::Deleted, job_id.get())]),
        );
        Ok(())
    }
}
