//! # Fleetdb - Fleet-Management Data Layer
//!
//! Tracks vehicles, drivers, checkout/return history, and user accounts in a
//! relational store behind a single persistence gateway.
//!
//! Fleetdb provides:
//! - One logical query interface over two interchangeable backends
//! - An embedded, file-persisted SQLite engine for local development
//! - A remote libSQL backend for production
//! - One schema, one initialization routine, one result shape for callers

pub mod config;
pub mod schema;
pub mod storage;
pub mod value;

// Re-exports for convenient access
pub use config::{Config, Mode};
pub use storage::{Backend, BackendHandle, ExecOutcome, Gateway, ResultSet};
pub use value::SqlValue;

/// Result type alias for Fleetdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Fleetdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] libsql::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Configuration error: {0}")]
    Config(String),
}
