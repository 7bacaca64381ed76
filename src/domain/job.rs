use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::client::{Client, display_name};
use crate::domain::types::{
    ClientId, EmailAddress, JobId, JobLineItemId, JobTitle, LineItemName, Money, NoteText,
    TypeConstraintError,
};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JobStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Upcoming,
        JobStatus::Active,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Upcoming => write!(f, "Upcoming"),
            JobStatus::Active => write!(f, "Active"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = TypeConstraintError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "Upcoming" => Ok(JobStatus::Upcoming),
            "Active" => Ok(JobStatus::Active),
            "Completed" => Ok(JobStatus::Completed),
            "Cancelled" => Ok(JobStatus::Cancelled),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown job status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub client_id: Option<ClientId>,
    pub first_name: String,
    pub last_name: String,
    pub property_address: String,
    pub billing_address: Option<String>,
    pub title: JobTitle,
    pub instructions: NoteText,
    pub phone: Option<String>,
    pub email: Option<EmailAddress>,
    pub salesperson: Option<String>,
    /// Sum of the line item totals, maintained by the store.
    pub subtotal: Money,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: Option<String>,
    pub remind_to_invoice: bool,
    pub status: JobStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Job {
    pub fn contact_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, "")
    }

    /// Billing address, falling back to the property address when unset.
    pub fn effective_billing_address(&self) -> &str {
        self.billing_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(&self.property_address)
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let contact = self.contact_name();
        let email = self.email.as_ref().map(EmailAddress::as_str);
        [
            Some(self.title.as_str()),
            Some(contact.as_str()),
            Some(self.property_address.as_str()),
            email,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JobLineItem {
    pub id: JobLineItemId,
    pub job_id: JobId,
    pub name: LineItemName,
    pub quantity: f64,
    pub unit_price: Money,
}

impl JobLineItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price.get()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewJobLineItem {
    pub name: LineItemName,
    pub quantity: f64,
    pub unit_price: Money,
}

impl NewJobLineItem {
    pub fn new(name: LineItemName, quantity: f64, unit_price: Money) -> Result<Self, TypeConstraintError> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(TypeConstraintError::InvalidValue(
                "quantity must be a non-negative number".to_string(),
            ));
        }
        Ok(Self {
            name,
            quantity,
            unit_price,
        })
    }

    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price.get()
    }
}

/// Sum of `quantity * unit_price` across the given line items.
pub fn line_items_subtotal(items: &[NewJobLineItem]) -> f64 {
    items.iter().map(NewJobLineItem::total).sum()
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewJob {
    pub client_id: Option<ClientId>,
    pub first_name: String,
    pub last_name: String,
    pub property_address: String,
    pub billing_address: Option<String>,
    pub title: JobTitle,
    pub instructions: NoteText,
    pub phone: Option<String>,
    pub email: Option<EmailAddress>,
    pub salesperson: Option<String>,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: Option<String>,
    pub remind_to_invoice: bool,
    pub status: JobStatus,
}

impl NewJob {
    #[must_use]
    pub fn new(title: JobTitle) -> Self {
        Self {
            client_id: None,
            first_name: String::new(),
            last_name: String::new(),
            property_address: String::new(),
            billing_address: None,
            title,
            instructions: NoteText::default(),
            phone: None,
            email: None,
            salesperson: None,
            is_scheduled: false,
            scheduled_at: None,
            team_member: None,
            remind_to_invoice: false,
            status: JobStatus::default(),
        }
    }

    /// Links the job to a client and copies its contact details.
    #[must_use]
    pub fn for_client(mut self, client: &Client) -> Self {
        self.client_id = Some(client.id);
        self.first_name = client.first_name.clone();
        self.last_name = client.last_name.clone();
        self.property_address = client.property_address.clone();
        self.billing_address = client.billing_address.clone();
        self.phone = client.phone.clone();
        self.email = client.email.clone();
        self
    }

    /// Marks the job as scheduled; `None` leaves it unscheduled.
    #[must_use]
    pub fn schedule(mut self, at: Option<NaiveDateTime>) -> Self {
        self.is_scheduled = at.is_some();
        self.scheduled_at = at;
        self
    }
}

/// Full replacement of a job's editable fields; line items are written separately.
pub type UpdateJob = NewJob;

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: f64, price: f64) -> NewJobLineItem {
        NewJobLineItem::new(
            LineItemName::new(name).unwrap(),
            quantity,
            Money::new(price).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let items = vec![item("Mulch", 3.0, 12.5), item("Labour", 2.0, 40.0)];
        assert_eq!(line_items_subtotal(&items), 117.5);
        assert_eq!(line_items_subtotal(&[]), 0.0);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let result = NewJobLineItem::new(LineItemName::new("x").unwrap(), -1.0, Money::ZERO);
        assert!(result.is_err());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in JobStatus::ALL {
            assert_eq!(JobStatus::try_from(status.to_string().as_str()), Ok(status));
        }
        assert!(JobStatus::try_from("Paused").is_err());
    }

    #[test]
    fn schedule_sets_flag() {
        let job = NewJob::new(JobTitle::new("Gutter clean").unwrap());
        assert!(!job.is_scheduled);
        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let job = job.schedule(Some(at));
        assert!(job.is_scheduled);
        assert_eq!(job.scheduled_at, Some(at));
    }
}
