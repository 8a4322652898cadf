//! Bulk client import from tabular (CSV) input.
//!
//! # Input
//!
//! Row 0 is a header and is always skipped. Every other row needs at least
//! two fields: the CPF/CNPJ followed by the client name. Extra fields are
//! ignored.
//!
//! # Failure handling
//!
//! - A row with fewer than two fields is a structural error. All rows are
//!   checked before anything is inserted, so a malformed file inserts nothing.
//! - A row whose insert fails (invalid or duplicate CPF/CNPJ, database error)
//!   is handled according to [`FailurePolicy`].
//!
//! Rows are inserted strictly in order, one at a time.

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{ClientStore, ErrorKind, StoreError};
use crate::models::NewClient;

/// Minimum number of fields in a data row (CPF/CNPJ, name).
pub const EXPECTED_FIELDS: usize = 2;

/// A tokenized input row.
pub type Row = Vec<String>;

/// What to do when inserting a single row fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, record it in the report and continue with the next row.
    #[default]
    BestEffort,
    /// Abort the whole import on the first failed row.
    FailFast,
}

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A data row has too few fields. `row` is the 0-based index including
    /// the header; the message reports the 1-based line.
    #[error("invalid data at line {line}: expected {expected} columns, got {found}", line = .row + 1)]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Inserting a row failed under [`FailurePolicy::FailFast`].
    #[error("failed to insert client at line {line} (CPF/CNPJ: {tax_id}): {source}")]
    Row {
        line: usize,
        tax_id: String,
        #[source]
        source: StoreError,
    },

    /// The input file could not be read.
    #[error("failed to open CSV file: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid CSV.
    #[error("failed to read CSV file: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    /// Returns the closed error classification, if this is a registry error.
    ///
    /// I/O and CSV decoding errors have no registry kind.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::MalformedRow { .. } => Some(ErrorKind::MalformedRow),
            Self::Row { source, .. } => Some(source.kind()),
            Self::Io(_) | Self::Csv(_) => None,
        }
    }
}

/// A row that failed to insert under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct RowFailure {
    /// 1-based line number in the input.
    pub line: usize,
    /// Raw CPF/CNPJ as it appeared in the input.
    pub tax_id: String,
    /// Why the insert failed.
    pub error: StoreError,
}

/// Outcome of a completed import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Rows inserted.
    pub inserted: usize,
    /// Rows skipped because their insert failed.
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    /// Number of rows skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Tokenize CSV input into rows.
///
/// Records may have differing field counts so short rows reach the
/// structural check; fields are whitespace-trimmed.
///
/// # Errors
///
/// Returns `ImportError::Csv` if the input is not valid CSV.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_owned).collect());
    }
    Ok(rows)
}

/// Read and tokenize a CSV file.
///
/// # Errors
///
/// Returns `ImportError::Io` if the file cannot be read, or
/// `ImportError::Csv` if it is not valid CSV.
pub async fn read_csv_file(path: &Path) -> Result<Vec<Row>, ImportError> {
    let bytes = tokio::fs::read(path).await?;
    read_csv_rows(bytes.as_slice())
}

/// Insert every data row through `store`.
///
/// # Errors
///
/// - `ImportError::MalformedRow` if any data row has fewer than
///   [`EXPECTED_FIELDS`] fields (nothing is inserted)
/// - `ImportError::Row` on the first failed insert under
///   [`FailurePolicy::FailFast`]
pub async fn import_rows(
    store: &dyn ClientStore,
    rows: &[Row],
    policy: FailurePolicy,
) -> Result<ImportReport, ImportError> {
    let data_rows = || rows.iter().enumerate().skip(1);

    if let Some((row, fields)) = data_rows().find(|(_, fields)| fields.len() < EXPECTED_FIELDS) {
        return Err(ImportError::MalformedRow {
            row,
            expected: EXPECTED_FIELDS,
            found: fields.len(),
        });
    }

    let mut report = ImportReport::default();

    for (row, fields) in data_rows() {
        let line = row + 1;
        let (Some(tax_id), Some(name)) = (fields.first(), fields.get(1)) else {
            continue;
        };
        let client = NewClient::new(name.as_str(), tax_id.as_str());

        match store.insert(&client).await {
            Ok(_) => report.inserted += 1,
            Err(error) => match policy {
                FailurePolicy::FailFast => {
                    return Err(ImportError::Row {
                        line,
                        tax_id: client.tax_id,
                        source: error,
                    });
                }
                FailurePolicy::BestEffort => {
                    warn!(
                        line,
                        tax_id = %client.tax_id,
                        error = %error,
                        "Failed to insert client, skipping row"
                    );
                    report.failures.push(RowFailure {
                        line,
                        tax_id: client.tax_id,
                        error,
                    });
                }
            },
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped(),
        "Import finished"
    );
    Ok(report)
}

/// Read a CSV file and import it.
///
/// # Errors
///
/// See [`read_csv_file`] and [`import_rows`].
pub async fn import_csv_file(
    store: &dyn ClientStore,
    path: &Path,
    policy: FailurePolicy,
) -> Result<ImportReport, ImportError> {
    let rows = read_csv_file(path).await?;
    info!(path = %path.display(), rows = rows.len(), ?policy, "Importing clients");
    import_rows(store, &rows, policy).await
}
