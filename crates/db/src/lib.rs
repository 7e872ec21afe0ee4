//! SQLite storage for Biblio.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections configured for the service.
//! - Apply module-contributed migrations and record them in a ledger table.
//! - Run blocking SQLite work on tokio's blocking pool.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - A migration recorded in `schema_migrations` is never executed again.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use biblio_kernel::settings::DatabaseSettings;
use biblio_kernel::Migration;
use rusqlite::Connection;

mod error;
pub mod migrate;
mod module;

pub use error::{DbError, DbResult};
pub use migrate::AppliedMigration;
pub use module::DbModule;

/// Shared handle to the service database.
///
/// Cloning is cheap; all clones share one connection guarded by a mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: Arc<str>,
}

impl Database {
    /// Open the database described by `settings`, creating parent
    /// directories for file-backed databases.
    pub fn open(settings: &DatabaseSettings) -> DbResult<Self> {
        let started_at = Instant::now();
        let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);

        let conn = if settings.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            let path = Path::new(&settings.path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
            Connection::open(path)?
        };

        bootstrap_connection(&conn, busy_timeout)?;

        tracing::info!(
            path = %settings.path,
            duration_ms = started_at.elapsed().as_millis() as u64,
            "database opened"
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: Arc::from(settings.path.as_str()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&DatabaseSettings::in_memory())
    }

    /// Path (or `:memory:`) this handle was opened with.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run `f` against the connection on the blocking pool.
    ///
    /// A panic inside `f` surfaces as [`DbError::Join`]. The connection stays
    /// usable afterwards: an unfinished transaction is rolled back when it is
    /// dropped during unwinding, so the poisoned lock is recovered.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(|poisoned| {
                tracing::warn!("recovering database connection after a panicked call");
                conn.clear_poison();
                poisoned.into_inner()
            });
            f(&mut guard)
        })
        .await
        .map_err(|err| E::from(DbError::Join(err)))?
    }

    /// Apply every migration not yet present in the ledger.
    pub async fn apply_migrations(
        &self,
        migrations: Vec<(String, Migration)>,
    ) -> DbResult<Vec<AppliedMigration>> {
        let applied = self
            .call(move |conn| migrate::apply(conn, &migrations))
            .await?;

        for migration in &applied {
            tracing::info!(
                module = %migration.module,
                migration = %migration.id,
                "migration applied"
            );
        }

        Ok(applied)
    }

    /// Cheap liveness probe.
    pub async fn ping(&self) -> DbResult<()> {
        self.call(|conn| {
            conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

fn bootstrap_connection(conn: &Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
