//! Diesel models for jobs and their line items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::job::{
    Job as DomainJob, JobLineItem as DomainJobLineItem, JobStatus, NewJob as DomainNewJob,
    NewJobLineItem as DomainNewJobLineItem,
};
use crate::domain::types::{
    ClientId, EmailAddress, JobId, JobLineItemId, JobTitle, LineItemName, Money, NoteText,
    TypeConstraintError,
};
use crate::models::client::Client;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Client, foreign_key = client_id))]
#[diesel(table_name = crate::schema::jobs)]
pub struct Job {
    pub id: i32,
    pub client_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub property_address: String,
    pub billing_address: Option<String>,
    pub title: String,
    pub instructions: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub salesperson: Option<String>,
    pub subtotal: f64,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: Option<String>,
    pub remind_to_invoice: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob<'a> {
    pub client_id: Option<i32>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub property_address: &'a str,
    pub billing_address: Option<&'a str>,
    pub title: &'a str,
    pub instructions: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub salesperson: Option<&'a str>,
    pub subtotal: f64,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: Option<&'a str>,
    pub remind_to_invoice: bool,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateJob<'a> {
    pub client_id: Option<i32>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub property_address: &'a str,
    pub billing_address: Option<&'a str>,
    pub title: &'a str,
    pub instructions: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub salesperson: Option<&'a str>,
    pub is_scheduled: bool,
    pub scheduled_at: Option<NaiveDateTime>,
    pub team_member: Option<&'a str>,
    pub remind_to_invoice: bool,
    pub status: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Job, foreign_key = job_id))]
#[diesel(table_name = crate::schema::job_line_items)]
pub struct JobLineItem {
    pub id: i32,
    pub job_id: i32,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::job_line_items)]
pub struct NewJobLineItem<'a> {
    pub job_id: i32,
    pub name: &'a str,
    pub quantity: f64,
    pub unit_price: f64,
}

impl TryFrom<Job> for DomainJob {
    type Error = TypeConstraintError;

    fn try_from(job: Job) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::try_from(job.id)?,
            client_id: job.client_id.map(ClientId::try_from).transpose()?,
            first_name: job.first_name,
            last_name: job.last_name,
            property_address: job.property_address,
            billing_address: job.billing_address,
            title: JobTitle::new(job.title)?,
            instructions: NoteText::new(job.instructions),
            phone: job.phone,
            email: job.email.map(EmailAddress::new).transpose()?,
            salesperson: job.salesperson,
            subtotal: Money::new(job.subtotal)?,
            is_scheduled: job.is_scheduled,
            scheduled_at: job.scheduled_at,
            team_member: job.team_member,
            remind_to_invoice: job.remind_to_invoice,
            status: JobStatus::try_from(job.status.as_str())?,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}

impl TryFrom<JobLineItem> for DomainJobLineItem {
    type Error = TypeConstraintError;

    fn try_from(item: JobLineItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobLineItemId::try_from(item.id)?,
            job_id: JobId::try_from(item.job_id)?,
            name: LineItemName::new(item.name)?,
            quantity: item.quantity,
            unit_price: Money::new(item.unit_price)?,
        })
    }
}

impl<'a> NewJob<'a> {
    pub fn from_domain(job: &'a DomainNewJob, subtotal: f64, now: NaiveDateTime) -> Self {
        Self {
            client_id: job.client_id.map(ClientId::get),
            first_name: job.first_name.as_str(),
            last_name: job.last_name.as_str(),
            property_address: job.property_address.as_str(),
            billing_address: job.billing_address.as_deref(),
            title: job.title.as_str(),
            instructions: job.instructions.as_str(),
            phone: job.phone.as_deref(),
            email: job.email.as_ref().map(EmailAddress::as_str),
            salesperson: job.salesperson.as_deref(),
            subtotal,
            is_scheduled: job.is_scheduled,
            scheduled_at: job.scheduled_at,
            team_member: job.team_member.as_deref(),
            remind_to_invoice: job.remind_to_invoice,
            status: job.status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> UpdateJob<'a> {
    pub fn from_domain(job: &'a DomainNewJob, now: NaiveDateTime) -> Self {
        Self {
            client_id: job.client_id.map(ClientId::get),
            first_name: job.first_name.as_str(),
            last_name: job.last_name.as_str(),
            property_address: job.property_address.as_str(),
            billing_address: job.billing_address.as_deref(),
            title: job.title.as_str(),
            instructions: job.instructions.as_str(),
            phone: job.phone.as_deref(),
            email: job.email.as_ref().map(EmailAddress::as_str),
            salesperson: job.salesperson.as_deref(),
            is_scheduled: job.is_scheduled,
            scheduled_at: job.scheduled_at,
            team_member: job.team_member.as_deref(),
            remind_to_invoice: job.remind_to_invoice,
            status: job.status.to_string(),
            updated_at: now,
        }
    }
}

impl<'a> NewJobLineItem<'a> {
    pub fn from_domain(job_id: JobId, item: &'a DomainNewJobLineItem) -> Self {
        Self {
            job_id: job_id.get(),
            name: item.name.as_str(),
            quantity: item.quantity,
            unit_price: item.unit_price.get(),
        }
    }
}
