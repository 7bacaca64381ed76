//! Configuration model loaded from external sources.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "jobdesk.sqlite3";
const DEFAULT_SESSION_FILE: &str = "session.json";
const DEFAULT_AUTH_URL: &str = "https://jobdesk.supabase.co";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_STATIONS_URL: &str = "https://api.geoapify.com";

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted auth/profile backend.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub api_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeocoderConfig {
    pub url: String,
    pub user_agent: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StationsConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the store, session and map adapters.
pub struct AppConfig {
    pub database_url: String,
    pub session_file: String,
    pub http_timeout_secs: u64,
    pub auth: AuthConfig,
    pub geocoder: GeocoderConfig,
    pub stations: StationsConfig,
}

impl AppConfig {
    /// Loads settings from an optional YAML file layered over built-in
    /// defaults. `APP_`-prefixed environment variables win over both, with
    /// `__` separating nested keys (`APP_AUTH__API_KEY`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("session_file", DEFAULT_SESSION_FILE)?
            .set_default("http_timeout_secs", 30)?
            .set_default("auth.url", DEFAULT_AUTH_URL)?
            .set_default("auth.api_key", "")?
            .set_default("geocoder.url", DEFAULT_GEOCODER_URL)?
            .set_default(
                "geocoder.user_agent",
                concat!("jobdesk/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("stations.url", DEFAULT_STATIONS_URL)?
            .set_default("stations.api_key", "")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
