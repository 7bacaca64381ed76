use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, EmailAddress, normalize_phone, optional_text};

/// Name shown for clients that have neither a personal nor a company name.
pub const UNNAMED_CLIENT: &str = "Unnamed Client";

/// Default label attached to a client's phone number.
pub const DEFAULT_PHONE_LABEL: &str = "Main";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub phone_label: String,
    pub email: Option<EmailAddress>,
    pub lead_source: Option<String>,
    pub property_address: String,
    pub billing_address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Client {
    /// Display name: personal name, then company name, then a placeholder.
    pub fn full_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.company_name)
    }

    /// Billing address, falling back to the property address when unset.
    pub fn effective_billing_address(&self) -> &str {
        self.billing_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(&self.property_address)
    }

    /// Case-insensitive substring match over name, company, addresses and email.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let full_name = self.full_name();
        let email = self.email.as_ref().map(EmailAddress::as_str);
        [
            Some(full_name.as_str()),
            Some(self.company_name.as_str()),
            Some(self.property_address.as_str()),
            self.billing_address.as_deref(),
            email,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Builds the display name shared by clients and job contacts.
pub fn display_name(first_name: &str, last_name: &str, company_name: &str) -> String {
    let first = first_name.trim();
    let last = last_name.trim();
    if !first.is_empty() || !last.is_empty() {
        return format!("{first} {last}").trim().to_string();
    }
    let company = company_name.trim();
    if !company.is_empty() {
        return company.to_string();
    }
    UNNAMED_CLIENT.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub phone_label: String,
    pub email: Option<EmailAddress>,
    pub lead_source: Option<String>,
    pub property_address: String,
    pub billing_address: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        first_name: &str,
        last_name: &str,
        company_name: &str,
        property_address: &str,
    ) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            company_name: company_name.trim().to_string(),
            phone: None,
            phone_label: DEFAULT_PHONE_LABEL.to_string(),
            email: None,
            lead_source: None,
            property_address: property_address.trim().to_string(),
            billing_address: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: &str, label: &str) -> Self {
        self.phone = normalize_phone(phone);
        self.phone_label = optional_text(Some(label)).unwrap_or_else(|| DEFAULT_PHONE_LABEL.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }

    #[must_use]
    pub fn lead_source(mut self, source: &str) -> Self {
        self.lead_source = optional_text(Some(source));
        self
    }

    #[must_use]
    pub fn billing_address(mut self, address: &str) -> Self {
        self.billing_address = optional_text(Some(address));
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateClient {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub phone_label: String,
    pub email: Option<EmailAddress>,
    pub lead_source: Option<String>,
    pub property_address: String,
    pub billing_address: Option<String>,
}

impl From<NewClient> for UpdateClient {
    fn from(client: NewClient) -> Self {
        Self {
            first_name: client.first_name,
            last_name: client.last_name,
            company_name: client.company_name,
            phone: client.phone,
            phone_label: client.phone_label,
            email: client.email,
            lead_source: client.lead_source,
            property_address: client.property_address,
            billing_address: client.billing_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn client(first: &str, last: &str, company: &str) -> Client {
        let now = Utc::now().naive_utc();
        Client {
            id: ClientId::new(1).unwrap(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            company_name: company.to_string(),
            phone: None,
            phone_label: DEFAULT_PHONE_LABEL.to_string(),
            email: None,
            lead_source: None,
            property_address: "12 Oak Street".to_string(),
            billing_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_name_joins_name_parts() {
        assert_eq!(client("John", "Smith", "Acme").full_name(), "John Smith");
        assert_eq!(client("  John ", "", "Acme").full_name(), "John");
        assert_eq!(client("", "Smith", "").full_name(), "Smith");
    }

    #[test]
    fn full_name_falls_back_to_company_then_placeholder() {
        assert_eq!(client("", "  ", "Acme Roofing").full_name(), "Acme Roofing");
        assert_eq!(client("", "", "   ").full_name(), UNNAMED_CLIENT);
    }

    #[test]
    fn billing_address_defaults_to_property() {
        let mut c = client("A", "B", "");
        assert_eq!(c.effective_billing_address(), "12 Oak Street");
        c.billing_address = Some("PO Box 9".to_string());
        assert_eq!(c.effective_billing_address(), "PO Box 9");
    }

    #[test]
    fn search_matches_name_address_and_email() {
        let mut c = client("Bob", "Smithson", "");
        assert!(c.matches_search("SMITH"));
        assert!(c.matches_search("oak"));
        assert!(!c.matches_search("jones"));
        c.email = Some(EmailAddress::new("bob@jones.example").unwrap());
        assert!(c.matches_search("jones"));
        assert!(c.matches_search("   "));
    }
}
