// Roster upload and absence recording
pub mod absence;
pub mod roster;

pub use absence::{AbsenceForm, record_absence};
pub use roster::upload_roster;
