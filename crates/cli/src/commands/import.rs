//! Bulk import of clients from a CSV file.

use std::path::Path;

use tracing::{info, warn};

use client_registry_server::config::database_url_from_env;
use client_registry_server::db::{self, PgClientStore};
use client_registry_server::import::{self, FailurePolicy};

/// Connections used by a single sequential import.
const IMPORT_MAX_CONNECTIONS: u32 = 2;

/// Import clients from `file_path` into the registry database.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable, the file cannot be read or is malformed, or (under
/// [`FailurePolicy::FailFast`]) any row fails to insert.
pub async fn run(file_path: &Path, policy: FailurePolicy) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url_from_env()?;

    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    let pool = db::create_pool(&database_url, IMPORT_MAX_CONNECTIONS).await?;
    info!("Connected to database");

    let store = PgClientStore::new(pool);
    let report = import::import_csv_file(&store, file_path, policy).await?;

    for failure in &report.failures {
        warn!(
            line = failure.line,
            tax_id = %failure.tax_id,
            "Skipped: {}", failure.error
        );
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped(),
        "Clients imported"
    );
    Ok(())
}
