//! Storage Layer - dual-backend persistence gateway
//!
//! System of record is SQL with tables:
//! - drivers(id, name, department)
//! - vehicles(id, model, isCheckedOut, currentDriver)
//! - history(id, vehicleId, driverId, checkoutTime, returnTime)
//! - users(id, username, password, role, driverId, driverName)
//!
//! Two backends implement the same [`Backend`] trait: an embedded SQLite
//! engine persisted to a local file, and a remote libSQL database. The
//! backend is picked once, at [`Gateway`] construction, and never switches.

pub mod embedded;
pub mod remote;

pub use embedded::EmbeddedBackend;
pub use remote::RemoteBackend;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Config, Mode};
use crate::value::SqlValue;
use crate::{Error, Result};

/// Backend-native metadata for a mutating statement. Callers may rely on it
/// being returned, not on any particular field being meaningful for a given
/// statement kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// Uniform row-returning result shape for both backends: ordered column
/// names plus row tuples positionally aligned with them.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub values: Vec<Vec<SqlValue>>,
}

/// Escape hatch to the live backend handle. Callers going through this give
/// up the gateway's result-shape normalization.
pub enum BackendHandle<'a> {
    Embedded(std::sync::MutexGuard<'a, rusqlite::Connection>),
    Remote(libsql::Connection),
}

/// One storage backend behind the gateway
#[async_trait]
pub trait Backend: Send + Sync {
    /// Idempotently ensure the four tables and the seed rows exist
    async fn initialize(&self) -> Result<()>;

    /// Execute a mutating or non-result-returning statement
    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome>;

    /// Execute a row-returning statement, normalized to [`ResultSet`]
    async fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<ResultSet>>;

    /// Flush state to durable storage where the backend does not own
    /// durability itself
    async fn persist(&self) -> Result<()>;

    /// Direct access to the underlying connection
    fn handle(&self) -> BackendHandle<'_>;
}

/// The persistence gateway: one logical query interface over whichever
/// backend configuration selected at startup.
pub struct Gateway {
    backend: Box<dyn Backend>,
}

impl Gateway {
    /// Select and construct the backend from configuration. This is a
    /// one-time, process-lifetime decision.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let backend: Box<dyn Backend> = match config.mode {
            Mode::Development => Box::new(EmbeddedBackend::open(&config.database_file)?),
            Mode::Production => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| Error::Config("DATABASE_URL is required in production".into()))?;
                let token = config.auth_token.as_deref().ok_or_else(|| {
                    Error::Config("DATABASE_AUTH_TOKEN is required in production".into())
                })?;
                Box::new(RemoteBackend::connect(url, token).await?)
            }
        };
        Ok(Self::new(backend))
    }

    /// Wrap an already-constructed backend
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Idempotently ensure schema and seed data exist
    pub async fn initialize(&self) -> Result<()> {
        self.backend.initialize().await
    }

    /// Execute a mutating statement with positional parameters
    pub async fn run_query(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        self.backend.run(sql, params).await.inspect_err(|e| {
            tracing::error!("Error running query: {} params={:?}: {}", sql, params, e);
        })
    }

    /// Execute a row-returning statement with positional parameters
    pub async fn exec_query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<ResultSet>> {
        self.backend.exec(sql, params).await.inspect_err(|e| {
            tracing::error!("Error executing query: {} params={:?}: {}", sql, params, e);
        })
    }

    /// Persist in-memory state to the database file (embedded mode). The
    /// remote backend owns its own durability, so this is a no-op there.
    /// Not invoked automatically after `run_query`.
    pub async fn save(&self) -> Result<()> {
        self.backend.persist().await
    }

    /// Direct access to the live backend handle
    pub fn handle(&self) -> BackendHandle<'_> {
        self.backend.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_gateway(dir: &tempfile::TempDir) -> Gateway {
        let backend = EmbeddedBackend::open(dir.path().join("vehicles.db")).unwrap();
        Gateway::new(Box::new(backend))
    }

    #[tokio::test]
    async fn test_gateway_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();

        let gateway = dev_gateway(&dir);
        gateway.initialize().await.unwrap();
        gateway
            .run_query(
                "UPDATE vehicles SET isCheckedOut = TRUE, currentDriver = ? WHERE id = ?",
                &["1".into(), "RSB7C87".into()],
            )
            .await
            .unwrap();
        gateway.save().await.unwrap();
        drop(gateway);

        // A fresh process sees the saved state, not a reseeded database.
        let gateway = dev_gateway(&dir);
        gateway.initialize().await.unwrap();
        let result = gateway
            .exec_query(
                "SELECT currentDriver FROM vehicles WHERE id = ?",
                &["RSB7C87".into()],
            )
            .await
            .unwrap();
        assert_eq!(result[0].values, vec![vec![SqlValue::Text("1".into())]]);
    }

    #[tokio::test]
    async fn test_uniform_result_shape() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = dev_gateway(&dir);
        gateway.initialize().await.unwrap();

        let result = gateway
            .exec_query("SELECT id, model FROM vehicles", &[])
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].columns, vec!["id", "model"]);
        assert_eq!(result[0].values.len(), 4);
        for tuple in &result[0].values {
            assert_eq!(tuple.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_run_query_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = dev_gateway(&dir);
        gateway.initialize().await.unwrap();

        let outcome = gateway
            .run_query(
                "INSERT INTO history (vehicleId, driverId) VALUES (?, ?)",
                &["RSB7C87".into(), "2".into()],
            )
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_id, 1);
    }

    #[tokio::test]
    async fn test_handle_reaches_live_connection() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = dev_gateway(&dir);
        gateway.initialize().await.unwrap();

        let BackendHandle::Embedded(conn) = gateway.handle() else {
            panic!("development gateway should expose the embedded handle");
        };
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }
}
