#![allow(dead_code)]

use jobdesk::db::{DbPool, open_store};
use jobdesk::repository::DieselRepository;
use tempfile::TempDir;

/// Migrated SQLite file in a temporary directory, removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = open_store(path.to_str().expect("utf-8 path")).expect("open store");
        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}
