// Configuration module
pub mod settings;

pub use settings::{Config, NotificationConfig, OutputConfig, StorageBackend, StorageConfig};
