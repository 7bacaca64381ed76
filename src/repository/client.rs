use diesel::prelude::*;

use crate::{
    domain::{
        client::{Client, NewClient, UpdateClient},
        types::ClientId,
    },
    models::client::{
        Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
    },
    repository::{
        ChangeKind, ClientListQuery, ClientReader, ClientWriter, DieselRepository, EntityKind,
        SortOrder, StoreChange,
        errors::{RepositoryError, RepositoryResult},
        paginate,
    },
};

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .find(id.get())
            .first::<DbClient>(&mut conn)
            .optional()?;

        match client {
            Some(db_client) => Ok(Some(Client::try_from(db_client)?)),
            None => Ok(None),
        }
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let items = clients::table.into_boxed::<diesel::sqlite::Sqlite>();
        let items = match query.sort {
            SortOrder::NewestFirst => items.order((clients::created_at.desc(), clients::id.desc())),
            SortOrder::OldestFirst => items.order((clients::created_at.asc(), clients::id.asc())),
        };

        // The full name falls back to the company name, so matching happens on
        // the domain value rather than in SQL.
        let matching = items
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Client::try_from)
            .filter(|client| match (client, &query.search) {
                (Ok(client), Some(term)) => client.matches_search(term),
                _ => true,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(paginate(matching, query.pagination.as_ref()))
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertable = DbNewClient::from_domain(new_client, Self::now());

        let db_client = diesel::insert_into(clients::table)
            .values(&insertable)
            .get_result::<DbClient>(&mut conn)?;

        let client = Client::try_from(db_client)?;
        self.publish([StoreChange::new(
            EntityKind::Client,
            ChangeKind::Created,
            client.id.get(),
        )]);
        Ok(client)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let now = Self::now();

        let ids = conn.transaction::<Vec<i32>, RepositoryError, _>(|conn| {
            new_clients
                .iter()
                .map(|client| {
                    diesel::insert_into(clients::table)
                        .values(&DbNewClient::from_domain(client, now))
                        .returning(clients::id)
                        .get_result::<i32>(conn)
                        .map_err(RepositoryError::from)
                })
                .collect()
        })?;

        self.publish(
            ids.iter()
                .map(|id| StoreChange::new(EntityKind::Client, ChangeKind::Created, *id)),
        );
        Ok(ids.len())
    }

    fn update_client(
        &self,
        client_id: ClientId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let changeset = DbUpdateClient::from_domain(updates, Self::now());

        let updated = diesel::update(clients::table.find(client_id.get()))
            .set(&changeset)
            .get_result::<DbClient>(&mut conn)?;

        let client = Client::try_from(updated)?;
        self.publish([StoreChange::new(
            EntityKind::Client,
            ChangeKind::Updated,
            client.id.get(),
        )]);
        Ok(client)
    }

    fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()> {
        use crate::schema::{clients, expenses, job_line_items, jobs};

        let mut conn = self.conn()?;

        let (job_ids, line_item_ids, expense_ids) =
            conn.transaction::<_, RepositoryError, _>(|conn| {
                let job_ids = jobs::table
                    .filter(jobs::client_id.eq(client_id.get()))
                    .select(jobs::id)
                    .load::<i32>(conn)?;

                let line_item_ids = job_line_items::table
                    .filter(job_line_items::job_id.eq_any(job_ids.clone()))
                    .select(job_line_items::id)
                    .load::<i32>(conn)?;

                let expense_ids = expenses::table
                    .filter(expenses::job_id.eq_any(job_ids.clone()))
                    .select(expenses::id)
                    .load::<i32>(conn)?;

                diesel::delete(
                    job_line_items::table.filter(job_line_items::job_id.eq_any(job_ids.clone())),
                )
                .execute(conn)?;

                diesel::update(expenses::table.filter(expenses::id.eq_any(expense_ids.clone())))
                    .set(expenses::job_id.eq(None::<i32>))
                    .execute(conn)?;

                diesel::delete(jobs::table.filter(jobs::client_id.eq(client_id.get())))
                    .execute(conn)?;

                let deleted = diesel::delete(clients::table.find(client_id.get())).execute(conn)?;
                if deleted == 0 {
                    return Err(RepositoryError::NotFound);
                }

                Ok((job_ids, line_item_ids, expense_ids))
            })?;

        log::info!(
            "Deleted client {client_id} with {} job(s) and {} line item(s)",
            job_ids.len(),
            line_item_ids.len()
        );

        let line_items = line_item_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::JobLineItem, ChangeKind::Deleted, id));
        let jobs = job_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::Job, ChangeKind::Deleted, id));
        let expenses = expense_ids
            .into_iter()
            .map(|id| StoreChange::new(EntityKind::Expense, ChangeKind::Updated, id));
        self.publish(
            line_items
                .chain(jobs)
                .chain(expenses)
                .chain([StoreChange::new(
                    EntityKind::Client,
                    ChangeKind::Deleted,
                    client_id.get(),
                )]),
        );
        Ok(())
    }
}
