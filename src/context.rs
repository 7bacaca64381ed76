//! Composition root wiring configuration, store, session and map adapters.

use std::path::Path;

use config::ConfigError;
use thiserror::Error;

use crate::auth::{AuthError, AuthSession, FileSessionStore, HttpAuthBackend};
use crate::db::open_store;
use crate::geo::{GeoError, HttpGeocoder, HttpStationProvider};
use crate::logging;
use crate::models::config::AppConfig;
use crate::repository::DieselRepository;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("auth client error: {0}")]
    Auth(#[from] AuthError),

    #[error("map client error: {0}")]
    Geo(#[from] GeoError),
}

/// Everything a screen may need, built once at launch and passed down.
pub struct AppContext {
    pub config: AppConfig,
    pub repo: DieselRepository,
    pub auth: AuthSession<HttpAuthBackend, FileSessionStore>,
    pub geocoder: HttpGeocoder,
    pub stations: HttpStationProvider,
}

impl AppContext {
    /// Initializes logging, loads settings from `config_path` and builds the
    /// context.
    pub fn launch(config_path: Option<&Path>) -> Result<Self, ContextError> {
        logging::init();
        let config = AppConfig::load(config_path).map_err(|err| {
            log::error!("Failed to load configuration: {err}");
            err
        })?;
        Self::new(config)
    }

    pub fn new(config: AppConfig) -> Result<Self, ContextError> {
        let pool = open_store(&config.database_url).map_err(|err| {
            log::error!("Failed to open store at {}: {err}", config.database_url);
            err
        })?;
        let repo = DieselRepository::new(pool);

        let timeout = config.http_timeout();
        let auth = AuthSession::new(
            HttpAuthBackend::new(&config.auth, timeout)?,
            FileSessionStore::new(&config.session_file),
        );
        let geocoder = HttpGeocoder::new(&config.geocoder, timeout)?;
        let stations = HttpStationProvider::new(&config.stations, timeout)?;

        log::info!("Store ready at {}", config.database_url);
        Ok(Self {
            config,
            repo,
            auth,
            geocoder,
            stations,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::repository::ClientReader;
    use crate::repository::ClientListQuery;

    #[tokio::test]
    async fn launch_builds_working_context() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("context.sqlite3");
        let session = dir.path().join("session.json");

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "database_url: {}\nsession_file: {}\n",
            database.display(),
            session.display()
        )
        .unwrap();

        let context = AppContext::launch(Some(file.path())).unwrap();
        let (total, _) = context.repo.list_clients(ClientListQuery::new()).unwrap();
        assert_eq!(total, 0);

        assert!(!context.auth.check_auth_status().await.unwrap());
        assert!(!context.auth.state().is_authenticated);
    }
}
