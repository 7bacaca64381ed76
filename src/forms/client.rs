use std::io::Read;

use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{Client, DEFAULT_PHONE_LABEL, NewClient, UpdateClient};
use crate::domain::types::EmailAddress;
use crate::forms::{Draft, FormError};

/// Draft backing the new-client and edit-client screens.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    #[validate(length(max = 200))]
    pub company_name: String,
    pub phone: String,
    pub phone_label: String,
    pub email: String,
    pub lead_source: String,
    pub property_address: String,
    pub billing_address: String,
    /// Billing address mirrors the property address; the billing field is ignored.
    pub billing_same_as_property: bool,
}

impl Default for ClientForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            company_name: String::new(),
            phone: String::new(),
            phone_label: DEFAULT_PHONE_LABEL.to_string(),
            email: String::new(),
            lead_source: String::new(),
            property_address: String::new(),
            billing_address: String::new(),
            billing_same_as_property: true,
        }
    }
}

impl ClientForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: &Client) -> Self {
        Self {
            first_name: client.first_name.clone(),
            last_name: client.last_name.clone(),
            company_name: client.company_name.clone(),
            phone: client.phone.clone().unwrap_or_default(),
            phone_label: client.phone_label.clone(),
            email: client
                .email
                .as_ref()
                .map(|e| e.as_str().to_string())
                .unwrap_or_default(),
            lead_source: client.lead_source.clone().unwrap_or_default(),
            property_address: client.property_address.clone(),
            billing_address: client.billing_address.clone().unwrap_or_default(),
            billing_same_as_property: client.billing_address.is_none(),
        }
    }

    pub fn to_update(&self) -> Result<UpdateClient, FormError> {
        self.to_payload().map(UpdateClient::from)
    }
}

impl Draft for ClientForm {
    type Payload = NewClient;

    fn has_content(&self) -> bool {
        [&self.first_name, &self.last_name, &self.company_name]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    fn to_payload(&self) -> Result<NewClient, FormError> {
        self.validate()?;

        let mut client = NewClient::new(
            &self.first_name,
            &self.last_name,
            &self.company_name,
            &self.property_address,
        )
        .phone(&self.phone, &self.phone_label)
        .lead_source(&self.lead_source);

        if let Some(email) = EmailAddress::parse_optional(&self.email)? {
            client = client.email(email);
        }
        if !self.billing_same_as_property {
            client = client.billing_address(&self.billing_address);
        }
        Ok(client)
    }
}

/// One row of a client CSV export. Unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClientCsvRow {
    first_name: String,
    last_name: String,
    company_name: String,
    email: String,
    phone: String,
    phone_label: String,
    lead_source: String,
    property_address: String,
    billing_address: String,
}

/// Parses clients from CSV with a header row.
///
/// Every row needs a first, last or company name and, when present, a valid
/// email. The first offending row aborts the import.
pub fn parse_clients_csv<R: Read>(input: R) -> Result<Vec<NewClient>, FormError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut clients = Vec::new();
    for (index, record) in reader.deserialize::<ClientCsvRow>().enumerate() {
        let row = record?;
        let form = ClientForm {
            first_name: row.first_name,
            last_name: row.last_name,
            company_name: row.company_name,
            phone: row.phone,
            phone_label: row.phone_label,
            email: row.email,
            lead_source: row.lead_source,
            property_address: row.property_address,
            billing_same_as_property: row.billing_address.is_empty(),
            billing_address: row.billing_address,
        };
        if !form.has_content() {
            // Header is line 1.
            return Err(FormError::MissingName { row: index + 2 });
        }
        clients.push(form.to_payload()?);
    }
    Ok(clients)
}
