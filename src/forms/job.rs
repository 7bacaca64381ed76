use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::client::Client;
use crate::domain::job::{Job, JobLineItem, JobStatus, NewJob, NewJobLineItem};
use crate::domain::types::{
    ClientId, EmailAddress, JobTitle, LineItemName, Money, NoteText, normalize_phone,
    optional_text,
};
use crate::forms::{Draft, FormError};

/// One editable row of the line item list.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LineItemDraft {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItemDraft {
    pub fn new(name: &str, quantity: f64, unit_price: f64) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    fn to_domain(&self) -> Result<NewJobLineItem, FormError> {
        let name = LineItemName::new(self.name.as_str())?;
        let unit_price = Money::new(self.unit_price)
            .map_err(|_| FormError::InvalidLineItem(format!("{}: bad unit price", self.name)))?;
        Ok(NewJobLineItem::new(name, self.quantity, unit_price)?)
    }
}

/// Draft backing the new-job and edit-job screens.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct JobForm {
    pub client_id: Option<ClientId>,
    pub first_name: String,
    pub last_name: String,
    pub property_address: String,
    pub billing_address: String,
    #[validate(length(max = 200))]
    pub title: String,
    pub instructions: String,
    pub phone: String,
    pub email: String,
    pub salesperson: String,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: String,
    pub remind_to_invoice: bool,
    pub status: JobStatus,
    pub line_items: Vec<LineItemDraft>,
}

impl JobForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mode started from a client's detail screen.
    pub fn for_client(client: &Client) -> Self {
        let mut form = Self::new();
        form.prefill_from_client(client);
        form
    }

    /// Links the draft to `client` and copies its contact details over
    /// whatever was typed.
    pub fn prefill_from_client(&mut self, client: &Client) {
        self.client_id = Some(client.id);
        self.first_name = client.first_name.clone();
        self.last_name = client.last_name.clone();
        self.property_address = client.property_address.clone();
        self.billing_address = client.billing_address.clone().unwrap_or_default();
        self.phone = client.phone.clone().unwrap_or_default();
        self.email = client
            .email
            .as_ref()
            .map(|e| e.as_str().to_string())
            .unwrap_or_default();
    }

    pub fn from_job(job: &Job, line_items: &[JobLineItem]) -> Self {
        Self {
            client_id: job.client_id,
            first_name: job.first_name.clone(),
            last_name: job.last_name.clone(),
            property_address: job.property_address.clone(),
            billing_address: job.billing_address.clone().unwrap_or_default(),
            title: job.title.as_str().to_string(),
            instructions: job.instructions.as_str().to_string(),
            phone: job.phone.clone().unwrap_or_default(),
            email: job
                .email
                .as_ref()
                .map(|e| e.as_str().to_string())
                .unwrap_or_default(),
            salesperson: job.salesperson.clone().unwrap_or_default(),
            is_scheduled: job.is_scheduled,
            scheduled_at: job.scheduled_at,
            team_member: job.team_member.clone().unwrap_or_default(),
            remind_to_invoice: job.remind_to_invoice,
            status: job.status,
            line_items: line_items
                .iter()
                .map(|item| {
                    LineItemDraft::new(item.name.as_str(), item.quantity, item.unit_price.get())
                })
                .collect(),
        }
    }

    pub fn add_line_item(&mut self) {
        self.line_items.push(LineItemDraft {
            quantity: 1.0,
            ..Default::default()
        });
    }

    pub fn remove_line_item(&mut self, index: usize) {
        if index < self.line_items.len() {
            self.line_items.remove(index);
        }
    }

    /// Running total shown under the line item list.
    pub fn subtotal_preview(&self) -> f64 {
        self.line_items
            .iter()
            .filter(|item| !item.is_blank())
            .map(LineItemDraft::total)
            .filter(|total| total.is_finite())
            .sum()
    }
}

impl Draft for JobForm {
    type Payload = (NewJob, Vec<NewJobLineItem>);

    fn has_content(&self) -> bool {
        !self.title.trim().is_empty()
    }

    fn to_payload(&self) -> Result<Self::Payload, FormError> {
        self.validate()?;

        let mut job = NewJob::new(JobTitle::new(self.title.as_str())?);
        job.client_id = self.client_id;
        job.first_name = self.first_name.trim().to_string();
        job.last_name = self.last_name.trim().to_string();
        job.property_address = self.property_address.trim().to_string();
        job.billing_address = optional_text(Some(self.billing_address.as_str()));
        job.instructions = NoteText::new(self.instructions.as_str());
        job.phone = normalize_phone(&self.phone);
        job.email = EmailAddress::parse_optional(&self.email)?;
        job.salesperson = optional_text(Some(self.salesperson.as_str()));
        job.team_member = optional_text(Some(self.team_member.as_str()));
        job.remind_to_invoice = self.remind_to_invoice;
        job.status = self.status;
        let job = job.schedule(if self.is_scheduled {
            self.scheduled_at
        } else {
            None
        });

        let line_items = self
            .line_items
            .iter()
            .filter(|item| !item.is_blank())
            .map(LineItemDraft::to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((job, line_items))
    }
}
