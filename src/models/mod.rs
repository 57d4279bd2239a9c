// Roster and attendance records
pub mod attendance;
pub mod student;

pub use attendance::{AttendanceEvent, parse_hours};
pub use student::Student;
