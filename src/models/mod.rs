//! Diesel row models and their conversions to domain records.

pub mod client;
#[cfg(feature = "app")]
pub mod config;
pub mod expense;
pub mod item;
pub mod job;
pub mod task;
