//! Remote libSQL backend for production
//!
//! Every operation is an independent network round-trip through the libsql
//! client. No batching, pooling, retries, or timeouts are layered on top;
//! whatever the client does is what callers get. The remote service owns
//! durability, so `persist` is a deliberate no-op.

use async_trait::async_trait;

use super::{Backend, BackendHandle, ExecOutcome, ResultSet};
use crate::schema;
use crate::value::SqlValue;
use crate::Result;

pub struct RemoteBackend {
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RemoteBackend {
    /// Connect to a managed libSQL database with URL and auth-token
    /// credentials.
    pub async fn connect(url: &str, auth_token: &str) -> Result<Self> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        tracing::info!("Connected to remote database at {}", url);
        Ok(Self { db, conn })
    }

    /// The owned database handle
    pub fn database(&self) -> &libsql::Database {
        &self.db
    }

    /// Same client against a local database file. No network involved;
    /// used by the integration tests and offline tooling.
    pub async fn open_local(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Ok(Self { db, conn })
    }

    fn to_params(params: &[SqlValue]) -> Vec<libsql::Value> {
        params.iter().cloned().map(Into::into).collect()
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    /// The create-if-absent DDL runs on every call. Seed rows are guarded by
    /// an existence probe so repeated initialization does not trip the
    /// primary-key constraints.
    async fn initialize(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, ()).await?;
        }

        let mut rows = self.conn.query(schema::SEED_PROBE, ()).await?;
        let existing: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        if existing == 0 {
            for (sql, params) in schema::seed_statements()? {
                let vals: Vec<libsql::Value> = params.into_iter().map(Into::into).collect();
                self.conn.execute(sql, vals).await?;
            }
            tracing::info!("Seeded remote database");
        }
        Ok(())
    }

    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let rows_affected = self.conn.execute(sql, Self::to_params(params)).await?;
        Ok(ExecOutcome {
            rows_affected,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    async fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<ResultSet>> {
        let mut rows = self.conn.query(sql, Self::to_params(params)).await?;

        let width = rows.column_count();
        let columns: Vec<String> = (0..width)
            .map(|i| rows.column_name(i).unwrap_or_default().to_string())
            .collect();

        let mut values = Vec::new();
        while let Some(row) = rows.next().await? {
            let mut tuple = Vec::with_capacity(width as usize);
            for i in 0..width {
                tuple.push(SqlValue::from(row.get_value(i)?));
            }
            values.push(tuple);
        }

        Ok(vec![ResultSet { columns, values }])
    }

    async fn persist(&self) -> Result<()> {
        // The remote service owns durability.
        tracing::debug!("persist is a no-op for the remote backend");
        Ok(())
    }

    fn handle(&self) -> BackendHandle<'_> {
        BackendHandle::Remote(self.conn.clone())
    }
}
