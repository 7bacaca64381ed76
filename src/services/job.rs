//! Job workflows, keeping line items and the subtotal together.

use crate::domain::job::{Job, JobLineItem, JobStatus, NewJob, NewJobLineItem, UpdateJob};
use crate::domain::types::{ClientId, JobId};
use crate::repository::{JobListQuery, JobReader, JobWriter};
use crate::services::{DEFAULT_ITEMS_PER_PAGE, ServiceError, ServiceResult};

/// A job together with its line items, as shown on the job detail screen.
#[derive(Debug, Clone)]
pub struct JobDetail {
    pub job: Job,
    pub line_items: Vec<JobLineItem>,
}

/// Filters accepted by [`list_jobs`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter<'a> {
    pub search: Option<&'a str>,
    pub client_id: Option<i32>,
    pub status: Option<JobStatus>,
    pub page: Option<usize>,
}

pub fn list_jobs<R>(repo: &R, filter: JobFilter<'_>) -> ServiceResult<(usize, Vec<Job>)>
where
    R: JobReader + ?Sized,
{
    let mut query = JobListQuery::new();
    if let Some(term) = filter.search {
        query = query.search(term);
    }
    if let Some(client_id) = filter.client_id {
        query = query.client(ClientId::new(client_id)?);
    }
    if let Some(status) = filter.status {
        query = query.status(status);
    }
    if let Some(page) = filter.page {
        query = query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
    }

    repo.list_jobs(query).map_err(|err| {
        log::error!("Failed to list jobs: {err}");
        ServiceError::from(err)
    })
}

/// Loads a job and its line items.
pub fn get_job_detail<R>(repo: &R, job_id: i32) -> ServiceResult<JobDetail>
where
    R: JobReader + ?Sized,
{
    let job_id = JobId::new(job_id)?;
    let job = repo.get_job_by_id(job_id)?.ok_or(ServiceError::NotFound)?;
    let line_items = repo.list_job_line_items(job_id)?;
    Ok(JobDetail { job, line_items })
}

pub fn create_job<R>(
    repo: &R,
    new_job: &NewJob,
    line_items: &[NewJobLineItem],
) -> ServiceResult<Job>
where
    R: JobWriter + ?Sized,
{
    repo.create_job(new_job, line_items).map_err(|err| {
        log::error!("Failed to create a job: {err}");
        ServiceError::from(err)
    })
}

/// Replaces the job's fields and line items, returning the refreshed detail.
/// Either both are saved or neither is.
pub fn update_job<R>(
    repo: &R,
    job_id: i32,
    updates: &UpdateJob,
    line_items: &[NewJobLineItem],
) -> ServiceResult<JobDetail>
where
    R: JobWriter + ?Sized,
{
    let job_id = JobId::new(job_id)?;

    let (job, line_items) = repo
        .update_job_with_line_items(job_id, updates, line_items)
        .map_err(|err| {
            log::error!("Failed to update job {job_id}: {err}");
            ServiceError::from(err)
        })?;
    Ok(JobDetail { job, line_items })
}

pub fn delete_job<R>(repo: &R, job_id: i32) -> ServiceResult<()>
where
    R: JobWriter + ?Sized,
{
    let job_id = JobId::new(job_id)?;
    repo.delete_job(job_id).map_err(|err| {
        log::error!("Failed to delete job {job_id}: {err}");
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::domain::types::{JobTitle, Money, NoteText};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn epoch() -> NaiveDateTime {
        chrono::DateTime::from_timestamp(0, 0)
            .expect("valid timestamp")
            .naive_utc()
    }

    fn sample_job(id: i32, subtotal: f64) -> Job {
        Job {
            id: JobId::new(id).unwrap(),
            client_id: None,
            first_name: "John".into(),
            last_name: "Smith".into(),
            property_address: "1 Main St".into(),
            billing_address: None,
            title: JobTitle::new("Lawn care").unwrap(),
            instructions: NoteText::default(),
            phone: None,
            email: None,
            salesperson: None,
            subtotal: Money::new(subtotal).unwrap(),
            is_scheduled: false,
            scheduled_at: None,
            team_member: None,
            remind_to_invoice: false,
            status: JobStatus::Upcoming,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    #[test]
    fn get_job_detail_loads_line_items() {
        let mut repo = MockRepository::new();
        repo.expect_get_job_by_id()
            .returning(|id| Ok(Some(sample_job(id.get(), 0.0))));
        repo.expect_list_job_line_items().returning(|_| Ok(vec![]));

        let detail = get_job_detail(&repo, 4).unwrap();
        assert_eq!(detail.job.id.get(), 4);
        assert!(detail.line_items.is_empty());
    }

    #[test]
    fn list_jobs_applies_client_and_status_filters() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs()
            .withf(|query| {
                query.client_id.map(|id| id.get()) == Some(9)
                    && query.status == Some(JobStatus::Active)
                    && query.pagination.is_none()
            })
            .returning(|_| Ok((0, vec![])));

        let filter = JobFilter {
            client_id: Some(9),
            status: Some(JobStatus::Active),
            ..Default::default()
        };
        assert_eq!(list_jobs(&repo, filter).unwrap().0, 0);
    }

    #[test]
    fn update_job_stops_when_job_is_missing() {
        let mut repo = MockRepository::new();
        repo.expect_update_job_with_line_items()
            .returning(|_, _, _| Err(RepositoryError::NotFound));
        repo.expect_update_job().never();
        repo.expect_replace_job_line_items().never();

        let updates = NewJob::new(JobTitle::new("Gutter cleaning").unwrap());
        assert!(matches!(
            update_job(&repo, 2, &updates, &[]),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn update_job_returns_refreshed_subtotal() {
        let mut repo = MockRepository::new();
        repo.expect_update_job_with_line_items()
            .withf(|id, updates, items| {
                id.get() == 2 && updates.title.as_str() == "Lawn care" && items.len() == 1
            })
            .times(1)
            .returning(|id, _, _| Ok((sample_job(id.get(), 25.0), vec![])));

        let updates = NewJob::new(JobTitle::new("Lawn care").unwrap());
        let items = vec![
            NewJobLineItem::new(
                crate::domain::types::LineItemName::new("Mowing").unwrap(),
                1.0,
                Money::new(25.0).unwrap(),
            )
            .unwrap(),
        ];
        let detail = update_job(&repo, 2, &updates, &items).unwrap();
        assert_eq!(detail.job.subtotal.get(), 25.0);
    }
}
