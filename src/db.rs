//! On-device SQLite store: pool construction, per-connection pragmas and
//! embedded schema migrations.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::repository::errors::{RepositoryError, RepositoryResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Wait applied when another connection holds the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pragmas run on every connection handed out by the pool.
///
/// Cascading deletes rely on `foreign_keys` being on; SQLite resets it for
/// each new connection.
#[derive(Debug, Clone, Copy)]
struct StorePragmas {
    busy_timeout: Duration,
}

impl StorePragmas {
    fn script(&self) -> String {
        format!(
            "PRAGMA foreign_keys = ON; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        )
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for StorePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.script())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool without touching the schema.
fn build_pool(database_url: &str) -> RepositoryResult<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(StorePragmas {
            busy_timeout: BUSY_TIMEOUT,
        }))
        .build(manager)
        .map_err(|err| {
            log::error!("Failed to open database {database_url}: {err}");
            RepositoryError::from(err)
        })
}

/// Applies every pending embedded migration.
pub fn run_migrations(pool: &DbPool) -> RepositoryResult<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::Migration(err.to_string()))?;
    if !applied.is_empty() {
        log::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

/// Opens the database at `database_url` and migrates it to the latest schema.
pub fn open_store(database_url: &str) -> RepositoryResult<DbPool> {
    let pool = build_pool(database_url)?;
    run_migrations(&pool)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragma_script_enables_foreign_keys() {
        let script = StorePragmas {
            busy_timeout: Duration::from_millis(250),
        }
        .script();
        assert!(script.contains("foreign_keys = ON"));
        assert!(script.contains("busy_timeout = 250"));
    }
}
