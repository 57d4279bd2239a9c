//! Error types shared by the aggregation, intake and escalation paths.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The field list supplied for a table differs from its fixed schema.
    #[error("schema mismatch for {table}: expected [{expected}], found [{found}]")]
    SchemaMismatch {
        table: &'static str,
        expected: String,
        found: String,
    },

    #[error("row for {table} has {found} fields, expected {expected}")]
    RowWidth {
        table: &'static str,
        expected: usize,
        found: usize,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema_mismatch(table: &'static str, expected: &[&str], found: &[&str]) -> Self {
        Self::SchemaMismatch {
            table,
            expected: expected.join(", "),
            found: found.join(", "),
        }
    }
}

/// Errors surfaced to callers of the attendance engine.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// A numeric field held something that does not parse. Never defaulted.
    #[error("invalid {field} value {value:?}: {reason}")]
    DataFormat {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// User-facing rejection; nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}

impl AttendanceError {
    pub fn data_format(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::DataFormat {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }
}

pub type Result<T, E = AttendanceError> = std::result::Result<T, E>;
