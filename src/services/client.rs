//! Client list, detail and import workflows.

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::types::ClientId;
use crate::forms::client::parse_clients_csv;
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, SortOrder};
use crate::services::{DEFAULT_ITEMS_PER_PAGE, ServiceError, ServiceResult};

/// Lists clients matching `search`, newest first, one page at a time.
pub fn list_clients<R>(
    repo: &R,
    search: Option<&str>,
    page: Option<usize>,
) -> ServiceResult<(usize, Vec<Client>)>
where
    R: ClientReader + ?Sized,
{
    let mut query = ClientListQuery::new().sort(SortOrder::NewestFirst);
    if let Some(term) = search {
        query = query.search(term);
    }
    if let Some(page) = page {
        query = query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
    }

    repo.list_clients(query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        ServiceError::from(err)
    })
}

/// Fetches a client by its raw identifier.
pub fn get_client<R>(repo: &R, client_id: i32) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_client<R>(repo: &R, new_client: &NewClient) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    repo.create_client(new_client).map_err(|err| {
        log::error!("Failed to create a client: {err}");
        ServiceError::from(err)
    })
}

pub fn update_client<R>(repo: &R, client_id: i32, updates: &UpdateClient) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    repo.update_client(client_id, updates).map_err(|err| {
        log::error!("Failed to update client {client_id}: {err}");
        ServiceError::from(err)
    })
}

/// Deletes the client and, through the store, all of its jobs.
pub fn delete_client<R>(repo: &R, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    repo.delete_client(client_id).map_err(|err| {
        log::error!("Failed to delete client {client_id}: {err}");
        ServiceError::from(err)
    })
}

/// Parses a CSV export and creates the clients in bulk, returning the count.
pub fn import_clients<R>(repo: &R, csv: &[u8]) -> ServiceResult<usize>
where
    R: ClientWriter + ?Sized,
{
    let clients = parse_clients_csv(csv).map_err(|err| {
        log::error!("Failed to parse clients: {err}");
        ServiceError::Form(err.to_string())
    })?;

    repo.create_clients(&clients).map_err(|err| {
        log::error!("Failed to import clients: {err}");
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn sample_client(id: i32, first: &str, last: &str) -> Client {
        let now = chrono::DateTime::from_timestamp(0, 0)
            .expect("valid timestamp")
            .naive_utc();
        Client {
            id: ClientId::new(id).expect("valid id"),
            first_name: first.to_string(),
            last_name: last.to_string(),
            company_name: String::new(),
            phone: None,
            phone_label: "Main".to_string(),
            email: None,
            lead_source: None,
            property_address: "1 Main St".to_string(),
            billing_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_clients_passes_trimmed_search_and_page() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| {
                query.search.as_deref() == Some("smith")
                    && query.pagination.as_ref().map(|p| (p.page, p.per_page))
                        == Some((2, DEFAULT_ITEMS_PER_PAGE))
            })
            .returning(|_| Ok((1, vec![sample_client(1, "John", "Smith")])));

        let (total, clients) = list_clients(&repo, Some("  smith "), Some(2)).unwrap();
        assert_eq!(total, 1);
        assert_eq!(clients[0].full_name(), "John Smith");
    }

    #[test]
    fn get_client_maps_missing_to_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(None));

        assert!(matches!(get_client(&repo, 7), Err(ServiceError::NotFound)));
    }

    #[test]
    fn get_client_rejects_non_positive_id() {
        let repo = MockRepository::new();

        assert!(matches!(
            get_client(&repo, 0),
            Err(ServiceError::TypeConstraint(_))
        ));
    }

    #[test]
    fn delete_client_propagates_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_client()
            .returning(|_| Err(RepositoryError::NotFound));

        assert!(matches!(delete_client(&repo, 3), Err(ServiceError::NotFound)));
    }

    #[test]
    fn import_clients_creates_parsed_rows() {
        let mut repo = MockRepository::new();
        repo.expect_create_clients()
            .withf(|clients| clients.len() == 2 && clients[1].company_name == "Acme")
            .returning(|clients| Ok(clients.len()));

        let csv = b"first_name,last_name,company_name,email,phone,property_address\n\
John,Smith,,john@example.com,,1 Main St\n\
,,Acme,,,2 Side St\n";

        assert_eq!(import_clients(&repo, csv).unwrap(), 2);
    }

    #[test]
    fn import_clients_rejects_bad_email() {
        let repo = MockRepository::new();
        let csv = b"first_name,last_name,company_name,email,phone,property_address\n\
John,Smith,,not-an-email,,1 Main St\n";

        assert!(matches!(
            import_clients(&repo, csv),
            Err(ServiceError::Form(_))
        ));
    }
}
