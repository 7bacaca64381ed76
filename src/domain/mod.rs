//! Domain records held by the local store.

pub mod client;
pub mod expense;
pub mod item;
pub mod job;
pub mod task;
pub mod types;
