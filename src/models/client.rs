use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{ClientId, EmailAddress, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub phone_label: String,
    pub email: Option<String>,
    pub lead_source: Option<String>,
    pub property_address: String,
    pub billing_address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub company_name: &'a str,
    pub phone: Option<&'a str>,
    pub phone_label: &'a str,
    pub email: Option<&'a str>,
    pub lead_source: Option<&'a str>,
    pub property_address: &'a str,
    pub billing_address: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub company_name: &'a str,
    pub phone: Option<&'a str>,
    pub phone_label: &'a str,
    pub email: Option<&'a str>,
    pub lead_source: Option<&'a str>,
    pub property_address: &'a str,
    pub billing_address: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::try_from(client.id)?,
            first_name: client.first_name,
            last_name: client.last_name,
            company_name: client.company_name,
            phone: client.phone,
            phone_label: client.phone_label,
            email: client.email.map(EmailAddress::new).transpose()?,
            lead_source: client.lead_source,
            property_address: client.property_address,
            billing_address: client.billing_address,
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> NewClient<'a> {
    pub fn from_domain(client: &'a DomainNewClient, now: NaiveDateTime) -> Self {
        Self {
            first_name: client.first_name.as_str(),
            last_name: client.last_name.as_str(),
            company_name: client.company_name.as_str(),
            phone: client.phone.as_deref(),
            phone_label: client.phone_label.as_str(),
            email: client.email.as_ref().map(EmailAddress::as_str),
            lead_source: client.lead_source.as_deref(),
            property_address: client.property_address.as_str(),
            billing_address: client.billing_address.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(client: &'a DomainUpdateClient, now: NaiveDateTime) -> Self {
        Self {
            first_name: client.first_name.as_str(),
            last_name: client.last_name.as_str(),
            company_name: client.company_name.as_str(),
            phone: client.phone.as_deref(),
            phone_label: client.phone_label.as_str(),
            email: client.email.as_ref().map(EmailAddress::as_str),
            lead_source: client.lead_source.as_deref(),
            property_address: client.property_address.as_str(),
            billing_address: client.billing_address.as_deref(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_domain_new() -> DomainNewClient {
        DomainNewClient::new("John", "Smith", "", "1 Main St")
            .email(EmailAddress::new("john@example.com").unwrap())
            .phone("123", "Mobile")
    }

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = sample_domain_new();
        let now = Utc::now().naive_utc();
        let new = NewClient::from_domain(&domain, now);
        assert_eq!(new.first_name, "John");
        assert_eq!(new.email, Some("john@example.com"));
        assert_eq!(new.phone, Some("123"));
        assert_eq!(new.phone_label, "Mobile");
        assert_eq!(new.billing_address, None);
        assert_eq!(new.created_at, now);
    }

    #[test]
    fn client_into_domain() {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            first_name: "n".to_string(),
            last_name: "".to_string(),
            company_name: "".to_string(),
            phone: Some("p".to_string()),
            phone_label: "Main".to_string(),
            email: Some("E@Example.com".to_string()),
            lead_source: None,
            property_address: "a".to_string(),
            billing_address: None,
            created_at: now,
            updated_at: now,
        };
        let domain = DomainClient::try_from(db_client).unwrap();
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.full_name(), "n");
        assert_eq!(domain.email.unwrap().as_str(), "e@example.com");
        assert_eq!(domain.created_at, now);
    }

    #[test]
    fn invalid_stored_id_is_rejected() {
        let now = Utc::now().naive_utc();
        let db_client = Client {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            company_name: String::new(),
            phone: None,
            phone_label: "Main".to_string(),
            email: None,
            lead_source: None,
            property_address: String::new(),
            billing_address: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainClient::try_from(db_client),
            Err(TypeConstraintError::NonPositiveId)
        );
    }
}
