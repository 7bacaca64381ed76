use chrono::{NaiveDate, NaiveTime, Utc};
use jobdesk::domain::client::{NewClient, UpdateClient};
use jobdesk::domain::expense::{ExpenseCategory, NewExpense};
use jobdesk::domain::job::{JobStatus, NewJob, NewJobLineItem};
use jobdesk::domain::task::{NewTask, TaskPriority, TaskStatus};
use jobdesk::domain::types::{
    ClientId, EmailAddress, ExpenseTitle, JobTitle, LineItemName, Money, NoteText, TaskTitle,
};
use jobdesk::repository::errors::RepositoryError;
use jobdesk::repository::{
    ChangeKind, ClientListQuery, ClientReader, ClientWriter, EntityKind, ExpenseListQuery,
    ExpenseReader, ExpenseWriter, ItemReader, ItemWriter, JobListQuery, JobReader, JobWriter,
    SortOrder, StoreChange, StoreEvents, TaskListQuery, TaskReader, TaskWriter,
};

mod common;

fn line_item(name: &str, quantity: f64, unit_price: f64) -> NewJobLineItem {
    NewJobLineItem::new(
        LineItemName::new(name).unwrap(),
        quantity,
        Money::new(unit_price).unwrap(),
    )
    .unwrap()
}

fn expense(title: &str, amount: f64, job: Option<jobdesk::domain::types::JobId>) -> NewExpense {
    NewExpense {
        job_id: job,
        title: ExpenseTitle::new(title).unwrap(),
        amount: Money::new(amount).unwrap(),
        category: ExpenseCategory::Materials,
        spent_on: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
        notes: NoteText::default(),
    }
}

#[test]
fn test_client_repository_crud() {
    let test_db = common::TestDb::new("test_client_repository_crud.db");
    let repo = test_db.repo();

    let alice = repo
        .create_client(
            &NewClient::new("Alice", "Brown", "", "1 Elm St")
                .email(EmailAddress::new("alice@example.com").unwrap())
                .phone("+1 415 555 0100", ""),
        )
        .unwrap();
    let acme = repo
        .create_client(&NewClient::new("", "", "Acme Corp", "2 Oak St"))
        .unwrap();

    assert_eq!(alice.full_name(), "Alice Brown");
    assert_eq!(alice.phone.as_deref(), Some("+14155550100"));
    assert_eq!(alice.phone_label, "Main");
    assert_eq!(acme.full_name(), "Acme Corp");

    let (total, items) = repo.list_clients(ClientListQuery::new()).unwrap();
    assert_eq!(total, 2);
    assert_eq!(items[0].id, acme.id);

    let (_, oldest_first) = repo
        .list_clients(ClientListQuery::new().sort(SortOrder::OldestFirst))
        .unwrap();
    assert_eq!(oldest_first[0].id, alice.id);

    let mut updates = UpdateClient::from(NewClient::new("Alice", "Green", "", "1 Elm St"));
    updates.billing_address = Some("PO Box 7".into());
    let updated = repo.update_client(alice.id, &updates).unwrap();
    assert_eq!(updated.full_name(), "Alice Green");
    assert_eq!(updated.effective_billing_address(), "PO Box 7");
    assert_eq!(updated.email, None);

    repo.delete_client(acme.id).unwrap();
    assert!(repo.get_client_by_id(acme.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_client(acme.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_client_search_is_case_insensitive() {
    let test_db = common::TestDb::new("test_client_search_is_case_insensitive.db");
    let repo = test_db.repo();

    let clients = [
        NewClient::new("John", "Smith", "", "1 Main St"),
        NewClient::new("Amy", "Jones", "", "2 Main St"),
        NewClient::new("Bob", "Smithson", "", "3 Main St"),
    ];
    assert_eq!(repo.create_clients(&clients).unwrap(), 3);

    let (total, found) = repo
        .list_clients(ClientListQuery::new().search("smith"))
        .unwrap();
    assert_eq!(total, 2);
    let mut names: Vec<String> = found.iter().map(|c| c.full_name()).collect();
    names.sort();
    assert_eq!(names, vec!["Bob Smithson", "John Smith"]);

    let (total, _) = repo
        .list_clients(ClientListQuery::new().search("main st"))
        .unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_client_pagination_reports_total() {
    let test_db = common::TestDb::new("test_client_pagination_reports_total.db");
    let repo = test_db.repo();

    let clients: Vec<NewClient> = (1..=5)
        .map(|i| NewClient::new(&format!("Client{i}"), "", "", ""))
        .collect();
    repo.create_clients(&clients).unwrap();

    let (total, page) = repo
        .list_clients(
            ClientListQuery::new()
                .sort(SortOrder::OldestFirst)
                .paginate(2, 2),
        )
        .unwrap();
    assert_eq!(total, 5);
    let names: Vec<String> = page.iter().map(|c| c.first_name.clone()).collect();
    assert_eq!(names, vec!["Client3", "Client4"]);
}

#[test]
fn test_delete_client_cascades_to_jobs_and_line_items() {
    let test_db = common::TestDb::new("test_delete_client_cascades.db");
    let repo = test_db.repo();

    let client = repo
        .create_client(&NewClient::new("John", "Smith", "", "1 Main St"))
        .unwrap();
    let other = repo
        .create_client(&NewClient::new("Amy", "Jones", "", "2 Main St"))
        .unwrap();

    let mut job_ids = Vec::new();
    for title in ["Mow lawn", "Trim hedges", "Clean gutters"] {
        let job = repo
            .create_job(
                &NewJob::new(JobTitle::new(title).unwrap()).for_client(&client),
                &[line_item("Labor", 2.0, 40.0), line_item("Fuel", 1.0, 10.0)],
            )
            .unwrap();
        job_ids.push(job.id);
    }
    let kept = repo
        .create_job(
            &NewJob::new(JobTitle::new("Other job").unwrap()).for_client(&other),
            &[line_item("Labor", 1.0, 40.0)],
        )
        .unwrap();
    let booked = repo
        .create_expense(&expense("Mulch", 30.0, Some(job_ids[0])))
        .unwrap();

    let mut events = repo.subscribe();
    repo.delete_client(client.id).unwrap();

    let (total, remaining) = repo
        .list_jobs(JobListQuery::new().client(client.id))
        .unwrap();
    assert_eq!(total, 0);
    assert!(remaining.is_empty());
    for job_id in &job_ids {
        assert!(repo.get_job_by_id(*job_id).unwrap().is_none());
        assert!(repo.list_job_line_items(*job_id).unwrap().is_empty());
    }

    assert!(repo.get_job_by_id(kept.id).unwrap().is_some());
    assert_eq!(repo.list_job_line_items(kept.id).unwrap().len(), 1);

    let orphaned = repo.get_expense_by_id(booked.id).unwrap().unwrap();
    assert_eq!(orphaned.job_id, None);

    let mut changes = Vec::new();
    while let Ok(change) = events.try_recv() {
        changes.push(change);
    }
    let count = |entity: EntityKind, kind: ChangeKind| {
        changes
            .iter()
            .filter(|c| c.entity == entity && c.kind == kind)
            .count()
    };
    assert_eq!(count(EntityKind::JobLineItem, ChangeKind::Deleted), 6);
    assert_eq!(count(EntityKind::Job, ChangeKind::Deleted), 3);
    assert_eq!(count(EntityKind::Expense, ChangeKind::Updated), 1);
    assert_eq!(count(EntityKind::Client, ChangeKind::Deleted), 1);
}

#[test]
fn test_job_subtotal_follows_line_items() {
    let test_db = common::TestDb::new("test_job_subtotal_follows_line_items.db");
    let repo = test_db.repo();

    let job = repo
        .create_job(
            &NewJob::new(JobTitle::new("Fence repair").unwrap()),
            &[line_item("Posts", 4.0, 12.5), line_item("Labor", 2.0, 60.0)],
        )
        .unwrap();
    assert_eq!(job.subtotal.get(), 170.0);
    assert_eq!(job.status, JobStatus::Upcoming);
    assert_eq!(job.contact_name(), "");

    let items = repo
        .replace_job_line_items(job.id, &[line_item("Labor", 3.0, 60.0)])
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total(), 180.0);

    let reloaded = repo.get_job_by_id(job.id).unwrap().unwrap();
    assert_eq!(reloaded.subtotal.get(), 180.0);

    let mut updates = NewJob::new(JobTitle::new("Fence rebuild").unwrap());
    updates.status = JobStatus::Active;
    let updated = repo.update_job(job.id, &updates).unwrap();
    assert_eq!(updated.title.as_str(), "Fence rebuild");
    assert_eq!(updated.subtotal.get(), 180.0);

    let (total, _) = repo
        .list_jobs(JobListQuery::new().status(JobStatus::Active).search("REBUILD"))
        .unwrap();
    assert_eq!(total, 1);
}

#[test]
fn test_delete_job_clears_expense_reference() {
    let test_db = common::TestDb::new("test_delete_job_clears_expense_reference.db");
    let repo = test_db.repo();

    let job = repo
        .create_job(
            &NewJob::new(JobTitle::new("Patio").unwrap()),
            &[line_item("Pavers", 100.0, 2.0)],
        )
        .unwrap();
    let booked = repo
        .create_expense(&expense("Sand", 45.0, Some(job.id)))
        .unwrap();
    repo.create_expense(&expense("Gloves", 12.0, None)).unwrap();

    let (total, _) = repo
        .list_expenses(ExpenseListQuery::new().job(job.id))
        .unwrap();
    assert_eq!(total, 1);

    repo.delete_job(job.id).unwrap();
    assert!(repo.list_job_line_items(job.id).unwrap().is_empty());
    assert_eq!(repo.get_expense_by_id(booked.id).unwrap().unwrap().job_id, None);
    assert!(matches!(
        repo.delete_job(job.id),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.replace_job_line_items(job.id, &[]),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_task_repository_crud() {
    let test_db = common::TestDb::new("test_task_repository_crud.db");
    let repo = test_db.repo();
    let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();

    let all_day = repo
        .create_task(&NewTask::new(TaskTitle::new("Order mulch").unwrap()).due(day, time, true))
        .unwrap();
    assert_eq!(all_day.due_at, Some(day.and_hms_opt(0, 0, 0).unwrap()));

    let mut timed = NewTask::new(TaskTitle::new("Call Smith").unwrap()).due(day, time, false);
    timed.priority = TaskPriority::High;
    timed.assignee = Some("Dana".into());
    let timed = repo.create_task(&timed).unwrap();
    assert_eq!(timed.due_at, Some(day.and_time(time)));

    let done = repo
        .set_task_status(timed.id, TaskStatus::Completed)
        .unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.updated_at >= timed.updated_at);

    let (total, _) = repo
        .list_tasks(TaskListQuery::new().status(TaskStatus::Completed))
        .unwrap();
    assert_eq!(total, 1);
    let (total, _) = repo
        .list_tasks(TaskListQuery::new().priority(TaskPriority::Medium))
        .unwrap();
    assert_eq!(total, 1);
    let (total, found) = repo.list_tasks(TaskListQuery::new().search("dana")).unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, timed.id);

    let mut updates = NewTask::new(TaskTitle::new("Order more mulch").unwrap());
    updates.description = NoteText::new("10 yards");
    let updated = repo.update_task(all_day.id, &updates).unwrap();
    assert_eq!(updated.due_at, None);
    assert_eq!(updated.description.as_str(), "10 yards");

    repo.delete_task(all_day.id).unwrap();
    assert!(repo.get_task_by_id(all_day.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_task(all_day.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_item_repository() {
    let test_db = common::TestDb::new("test_item_repository.db");
    let repo = test_db.repo();

    let first = repo.create_item(Utc::now().naive_utc()).unwrap();
    let second = repo
        .create_item(Utc::now().naive_utc() + chrono::Duration::seconds(1))
        .unwrap();

    let items = repo.list_items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, second.id);

    repo.delete_item(first.id).unwrap();
    assert_eq!(repo.list_items().unwrap().len(), 1);
    assert!(matches!(
        repo.delete_item(first.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_expense_filters_and_update() {
    let test_db = common::TestDb::new("test_expense_filters_and_update.db");
    let repo = test_db.repo();

    let fuel = NewExpense {
        category: ExpenseCategory::Fuel,
        notes: NoteText::new("truck refill"),
        ..expense("Diesel", 80.0, None)
    };
    let fuel = repo.create_expense(&fuel).unwrap();
    repo.create_expense(&expense("Lumber", 120.0, None)).unwrap();

    let (total, found) = repo
        .list_expenses(ExpenseListQuery::new().category(ExpenseCategory::Fuel))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, fuel.id);

    let (total, _) = repo
        .list_expenses(ExpenseListQuery::new().search("REFILL"))
        .unwrap();
    assert_eq!(total, 1);

    let updates = NewExpense {
        amount: Money::new(95.5).unwrap(),
        ..expense("Diesel", 0.0, None)
    };
    let updated = repo.update_expense(fuel.id, &updates).unwrap();
    assert_eq!(updated.amount.get(), 95.5);
    assert_eq!(updated.category, ExpenseCategory::Materials);

    repo.delete_expense(fuel.id).unwrap();
    assert!(repo.get_expense_by_id(fuel.id).unwrap().is_none());
}

#[test]
fn test_writes_publish_changes() {
    let test_db = common::TestDb::new("test_writes_publish_changes.db");
    let repo = test_db.repo();
    let mut events = repo.subscribe();

    let client = repo
        .create_client(&NewClient::new("Dana", "", "", ""))
        .unwrap();
    let job = repo
        .create_job(
            &NewJob::new(JobTitle::new("Survey").unwrap()),
            &[line_item("Visit", 1.0, 50.0)],
        )
        .unwrap();
    let task = repo
        .create_task(&NewTask::new(TaskTitle::new("Follow up").unwrap()))
        .unwrap();
    repo.delete_task(task.id).unwrap();

    let changes: Vec<StoreChange> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert_eq!(
        changes[0],
        StoreChange::new(EntityKind::Client, ChangeKind::Created, client.id.get())
    );
    assert_eq!(
        changes[1],
        StoreChange::new(EntityKind::Job, ChangeKind::Created, job.id.get())
    );
    assert_eq!(changes[2].entity, EntityKind::JobLineItem);
    assert_eq!(
        changes[3],
        StoreChange::new(EntityKind::Task, ChangeKind::Created, task.id.get())
    );
    assert_eq!(
        changes[4],
        StoreChange::new(EntityKind::Task, ChangeKind::Deleted, task.id.get())
    );
    assert_eq!(changes.len(), 5);
}

#[test]
fn test_missing_client_lookup_returns_none() {
    let test_db = common::TestDb::new("test_missing_client_lookup_returns_none.db");
    let repo = test_db.repo();
    assert!(
        repo.get_client_by_id(ClientId::new(42).unwrap())
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_all_day_task_is_stored_at_start_of_day() {
    let test_db = common::TestDb::new("test_all_day_task_is_stored_at_start_of_day.db");
    let repo = test_db.repo();
    let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let afternoon = NaiveTime::from_hms_opt(14, 30, 0).unwrap();

    let mut task = NewTask::new(TaskTitle::new("Order mulch").unwrap()).due(day, afternoon, false);
    task.is_all_day = true;
    let created = repo.create_task(&task).unwrap();
    assert!(created.is_all_day);
    assert_eq!(created.due_at, Some(day.and_hms_opt(0, 0, 0).unwrap()));

    let mut updates = NewTask::new(TaskTitle::new("Order mulch").unwrap()).due(day, afternoon, false);
    let timed = repo.update_task(created.id, &updates).unwrap();
    assert_eq!(timed.due_at, Some(day.and_time(afternoon)));

    updates.is_all_day = true;
    let updated = repo.update_task(created.id, &updates).unwrap();
    assert_eq!(updated.due_at, Some(day.and_hms_opt(0, 0, 0).unwrap()));
}

#[test]
fn test_failed_line_item_write_keeps_job_fields() {
    use diesel::RunQueryDsl;

    let test_db = common::TestDb::new("test_failed_line_item_write_keeps_job_fields.db");
    let repo = test_db.repo();

    let job = repo
        .create_job(
            &NewJob::new(JobTitle::new("Deck staining").unwrap()),
            &[line_item("Stain", 2.0, 40.0)],
        )
        .unwrap();

    let mut conn = test_db.pool().get().unwrap();
    diesel::sql_query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON job_line_items \
         WHEN NEW.name = 'boom' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(&mut conn)
    .unwrap();
    drop(conn);

    let mut updates = NewJob::new(JobTitle::new("Deck rebuild").unwrap());
    updates.status = JobStatus::Active;
    let result = repo.update_job_with_line_items(
        job.id,
        &updates,
        &[line_item("Boards", 10.0, 8.0), line_item("boom", 1.0, 1.0)],
    );
    assert!(result.is_err());

    let reloaded = repo.get_job_by_id(job.id).unwrap().unwrap();
    assert_eq!(reloaded.title.as_str(), "Deck staining");
    assert_eq!(reloaded.status, JobStatus::Upcoming);
    assert_eq!(reloaded.subtotal.get(), 80.0);
    let items = repo.list_job_line_items(job.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name.as_str(), "Stain");

    let (saved, items) = repo
        .update_job_with_line_items(job.id, &updates, &[line_item("Boards", 10.0, 8.0)])
        .unwrap();
    assert_eq!(saved.title.as_str(), "Deck rebuild");
    assert_eq!(saved.subtotal.get(), 80.0);
    assert_eq!(items.len(), 1);

    assert!(matches!(
        repo.update_job_with_line_items(
            jobdesk::domain::types::JobId::new(999).unwrap(),
            &updates,
            &[],
        ),
        Err(RepositoryError::NotFound)
    ));
}
