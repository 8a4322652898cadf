//! Integration tests for the client registry.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-backed store and import tests
//! TEST_DATABASE_URL=postgres://localhost/registry_test \
//!     cargo test -p client-registry-integration-tests -- --ignored
//!
//! # HTTP tests additionally need a running server
//! REGISTRY_BASE_URL=http://localhost:8080 \
//!     cargo test -p client-registry-integration-tests --test http_api -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `store` - `PgClientStore` uniqueness, search and concurrency
//! - `import` - CSV bulk import against `PostgreSQL`
//! - `http_api` - JSON API against a running server
//!
//! Tests share one database and never truncate it; each test generates its
//! own identifiers and names so runs do not collide.

use rand::Rng;
use secrecy::SecretString;
use sqlx::PgPool;

use client_registry_core::TaxId;
use client_registry_server::db::{self, PgClientStore};

/// Schema applied before the database tests run.
const SCHEMA: &str = include_str!("../../server/migrations/20260101000001_create_clients.sql");

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("REGISTRY_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Connect to `TEST_DATABASE_URL` and make sure the schema exists.
///
/// # Panics
///
/// Panics if `TEST_DATABASE_URL` is unset or the database is unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url), 5)
        .await
        .expect("Failed to connect to test database");

    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .expect("Failed to apply schema");

    pool
}

/// A `PgClientStore` over the test database.
pub async fn test_store() -> PgClientStore {
    PgClientStore::new(test_pool().await)
}

/// A random valid CPF, unlikely to collide with other test runs.
#[must_use]
pub fn random_cpf() -> TaxId {
    let mut rng = rand::rng();
    loop {
        let base = rng.random_range(100_000_000_u32..1_000_000_000).to_string();
        if let Ok(tax_id) = TaxId::cpf_from_base(&base) {
            return tax_id;
        }
    }
}

/// A random valid CNPJ, unlikely to collide with other test runs.
#[must_use]
pub fn random_cnpj() -> TaxId {
    let mut rng = rand::rng();
    loop {
        let base = rng
            .random_range(100_000_000_000_u64..1_000_000_000_000)
            .to_string();
        if let Ok(tax_id) = TaxId::cnpj_from_base(&base) {
            return tax_id;
        }
    }
}

/// A client name unique to this test run, e.g. `"Alice 3f2a9c1e"`.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix} {}", suffix.get(..8).unwrap_or(&suffix))
}

/// Delete the given identifiers from the test database.
///
/// # Panics
///
/// Panics if the delete fails.
pub async fn cleanup(pool: &PgPool, tax_ids: &[&TaxId]) {
    let ids: Vec<&str> = tax_ids.iter().map(|t| t.as_str()).collect();
    sqlx::query("DELETE FROM clients WHERE cpf_cnpj = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await
        .expect("Failed to clean up test clients");
}
