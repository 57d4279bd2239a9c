pub mod notifications;
pub mod state;
pub mod system;
pub mod thresholds;

pub use notifications::{AlertMessage, Channel, Delivery, OutboundNotifier, Notifier};
pub use state::{AlertLedger, AlertState, Reconciliation, reconcile};
pub use system::{AlertOverview, EscalationReport, Escalator, StudentOutcome};
pub use thresholds::{Tier, TierFlags};
