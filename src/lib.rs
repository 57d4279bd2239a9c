// aamas library crate
// Attendance aggregation, absenteeism classification and alert escalation

pub mod alerts;
pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod output;
pub mod storage;

pub use alerts::{Escalator, Notifier, Tier};
pub use error::{AttendanceError, Result, StoreError};
pub use storage::{RecordStore, Table};
