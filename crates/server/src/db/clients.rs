//! Client store: uniqueness-enforcing persistence of clients.
//!
//! Identifier uniqueness is enforced twice on insert:
//!
//! 1. An `EXISTS` pre-check, which rejects the common duplicate cheaply.
//! 2. The `UNIQUE` constraint on `clients.cpf_cnpj`, which is the real
//!    guarantee when two inserts race past the pre-check.
//!
//! Both paths surface as [`StoreError::DuplicateTaxId`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use client_registry_core::TaxId;

use super::StoreError;
use crate::models::{Client, NewClient};

/// Persistence operations for clients.
///
/// Implementations must be safe to call from many tasks at once; the
/// uniqueness invariant may not depend on in-process locking.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Every client, ordered by name (ties broken by id).
    async fn get_all(&self) -> Result<Vec<Client>, StoreError>;

    /// Clients whose name contains `name`, case-insensitively, ordered by name.
    ///
    /// An empty or blank `name` is accepted and matches every client.
    async fn get_by_name(&self, name: &str) -> Result<Vec<Client>, StoreError>;

    /// Whether a client with this CPF/CNPJ exists.
    ///
    /// The identifier is validated first; validation failures are returned
    /// as [`StoreError::InvalidTaxId`].
    async fn exists(&self, tax_id: &str) -> Result<bool, StoreError>;

    /// Validate, pre-check and insert a new client.
    async fn insert(&self, client: &NewClient) -> Result<Client, StoreError>;

    /// Round-trip to the backing store (readiness probe).
    async fn ping(&self) -> Result<(), StoreError>;
}

/// [`ClientStore`] backed by the `clients` table in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    /// Create a store over a shared connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn exists_normalized(&self, tax_id: &TaxId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM clients
                WHERE cpf_cnpj = $1
            )
            ",
        )
        .bind(tax_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx("check CPF/CNPJ existence", e))
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Client>, StoreError> {
        let clients = sqlx::query_as::<_, Client>(
            r"
            SELECT id, name, cpf_cnpj, blocklist
            FROM clients
            ORDER BY name, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx("get all clients", e))?;

        tracing::debug!(count = clients.len(), "Fetched clients");
        Ok(clients)
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<Vec<Client>, StoreError> {
        let pattern = format!("%{}%", escape_like(name));

        let clients = sqlx::query_as::<_, Client>(
            r"
            SELECT id, name, cpf_cnpj, blocklist
            FROM clients
            WHERE name ILIKE $1
            ORDER BY name, id
            ",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx("get clients by name", e))?;

        tracing::debug!(count = clients.len(), "Fetched clients by name");
        Ok(clients)
    }

    #[instrument(skip(self))]
    async fn exists(&self, tax_id: &str) -> Result<bool, StoreError> {
        let tax_id = TaxId::parse(tax_id)?;
        self.exists_normalized(&tax_id).await
    }

    #[instrument(skip(self, client), fields(tax_id = %client.tax_id))]
    async fn insert(&self, client: &NewClient) -> Result<Client, StoreError> {
        let tax_id = TaxId::parse(&client.tax_id)?;

        if self.exists_normalized(&tax_id).await? {
            tracing::debug!("Rejected by pre-check: CPF/CNPJ already registered");
            return Err(StoreError::DuplicateTaxId);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::from_sqlx("begin insert transaction", e))?;

        let created = sqlx::query_as::<_, Client>(
            r"
            INSERT INTO clients (name, cpf_cnpj, blocklist)
            VALUES ($1, $2, $3)
            RETURNING id, name, cpf_cnpj, blocklist
            ",
        )
        .bind(&client.name)
        .bind(&tax_id)
        .bind(client.blocklist)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_sqlx("insert client", e))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::from_sqlx("commit insert transaction", e))?;

        tracing::info!(client_id = %created.id, "Client created");
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx("ping database", e))?;
        Ok(())
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
///
/// `PostgreSQL` uses backslash as the default `LIKE` escape character.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
