// Command handlers module
pub mod alerts;
pub mod config;
pub mod intake;
pub mod report;

use anyhow::{Context, Result};

use crate::alerts::{Escalator, OutboundNotifier};
use crate::config::{Config, StorageBackend, StorageConfig};
use crate::storage::{CsvStore, RecordStore, SqliteStore};

// Re-export command handlers for easy access
pub use alerts::{handle_alerts_command, handle_send_alerts_command};
pub use config::handle_config_action;
pub use intake::{handle_record_absence_command, handle_upload_students_command};
pub use report::handle_report_command;

pub type CliEscalator = Escalator<Box<dyn RecordStore>, OutboundNotifier>;

/// Open the configured record store backend.
pub fn open_store(storage: &StorageConfig) -> Result<Box<dyn RecordStore>> {
    let path = storage.resolved_path()?;
    let store: Box<dyn RecordStore> = match storage.backend {
        StorageBackend::Sqlite => Box::new(SqliteStore::new(&path)?),
        StorageBackend::Csv => Box::new(
            CsvStore::open(&path)
                .with_context(|| format!("Failed to open CSV store at: {}", path.display()))?,
        ),
    };
    Ok(store)
}

pub fn open_escalator(config: &Config) -> Result<CliEscalator> {
    let store = open_store(&config.storage)?;
    let notifier = OutboundNotifier::new(config.notifications.clone())
        .context("Failed to build notification client")?;
    Ok(Escalator::new(store, notifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Table;
    use tempfile::TempDir;

    #[test]
    fn test_open_store_for_each_backend() {
        let temp_dir = TempDir::new().unwrap();

        let sqlite = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: temp_dir.path().join("db").join("aamas.db").display().to_string(),
        };
        assert!(open_store(&sqlite).unwrap().load_all(Table::Students).unwrap().is_empty());

        let csv = StorageConfig {
            backend: StorageBackend::Csv,
            path: temp_dir.path().join("csv").display().to_string(),
        };
        open_store(&csv).unwrap();
        assert!(temp_dir.path().join("csv").join("students.csv").exists());
    }
}
