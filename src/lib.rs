//! Application core of a field-service business manager: clients, jobs,
//! tasks and expenses in a local store, a remote-auth session, and the map
//! adapters behind the client and fleet screens.

#[cfg(feature = "app")]
pub mod auth;
#[cfg(feature = "app")]
pub mod context;
pub mod db;
pub mod domain;
#[cfg(feature = "app")]
pub mod forms;
#[cfg(feature = "app")]
pub mod geo;
#[cfg(feature = "app")]
pub mod logging;
pub mod models;
pub mod repository;
pub mod schema;
#[cfg(feature = "app")]
pub mod services;

#[cfg(feature = "app")]
pub use context::AppContext;
