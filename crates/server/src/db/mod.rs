//! Database operations for the client registry `PostgreSQL`.
//!
//! ## Tables
//!
//! - `clients` - One row per client, `cpf_cnpj` carries a `UNIQUE` constraint
//!
//! # Schema
//!
//! The schema lives in `crates/server/migrations/` and is applied by the
//! operator (e.g. `psql -f`). It is not applied on startup.

pub mod clients;
#[cfg(test)]
pub mod memory;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use client_registry_core::TaxIdError;

pub use clients::{ClientStore, PgClientStore};

/// Errors returned by [`ClientStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The CPF/CNPJ failed validation.
    #[error(transparent)]
    InvalidTaxId(#[from] TaxIdError),

    /// A client with this CPF/CNPJ already exists, whether caught by the
    /// pre-check or by the unique constraint at commit time.
    #[error("CPF/CNPJ already registered")]
    DuplicateTaxId,

    /// The database could not be reached or the query failed.
    #[error("{operation} failed: {source}")]
    Unavailable {
        /// Store operation that failed.
        operation: &'static str,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Wrap a driver error for the named operation.
    ///
    /// Unique violations become [`StoreError::DuplicateTaxId`]; everything
    /// else is [`StoreError::Unavailable`].
    #[must_use]
    pub fn from_sqlx(operation: &'static str, source: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = source
            && db_err.is_unique_violation()
        {
            return Self::DuplicateTaxId;
        }
        Self::Unavailable { operation, source }
    }

    /// Returns the closed error classification for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTaxId(TaxIdError::InvalidLength) => ErrorKind::InvalidLength,
            Self::InvalidTaxId(TaxIdError::InvalidCpf) => ErrorKind::InvalidCpf,
            Self::InvalidTaxId(TaxIdError::InvalidCnpj) => ErrorKind::InvalidCnpj,
            Self::DuplicateTaxId => ErrorKind::DuplicateTaxId,
            Self::Unavailable { .. } => ErrorKind::StoreUnavailable,
        }
    }
}

/// Closed set of failure kinds surfaced by the registry.
///
/// Callers (HTTP handlers, the CLI) decide on status codes and exit paths
/// from this value rather than from error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Identifier is neither 11 nor 14 digits.
    InvalidLength,
    /// 11-digit identifier with a bad CPF checksum.
    InvalidCpf,
    /// 14-digit identifier with a bad CNPJ checksum.
    InvalidCnpj,
    /// Identifier already registered.
    DuplicateTaxId,
    /// Bulk-load row with too few fields.
    MalformedRow,
    /// Connectivity, query or transaction failure.
    StoreUnavailable,
}

impl ErrorKind {
    /// Returns true if the caller can fix the request and retry.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::StoreUnavailable)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
