use std::collections::HashMap;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::error::Result;
use crate::models::AttendanceEvent;
use crate::storage::{RecordStore, Table, TableRecord};

/// Total missed hours per student_id. Students without absences are absent.
pub type MissedHours = HashMap<String, BigDecimal>;

/// Sum missed hours for one (course_code, group) from already parsed events.
pub fn sum_missed_hours(events: &[AttendanceEvent], course_code: &str, group: &str) -> MissedHours {
    let mut missed = MissedHours::new();
    for event in events
        .iter()
        .filter(|e| e.course_code == course_code && e.group == group)
    {
        *missed.entry(event.student_id.clone()).or_default() += &event.hours;
    }
    missed
}

/// Load the attendance log and sum missed hours for one (course_code, group).
///
/// Only rows for the requested enrollment are parsed; a malformed `hours`
/// value among them aborts with a data format error.
pub fn missed_hours<S: RecordStore + ?Sized>(
    store: &S,
    course_code: &str,
    group: &str,
) -> Result<MissedHours> {
    let rows = store.load_all(Table::AttendanceEvents)?;

    let events = rows
        .iter()
        .filter(|row| AttendanceEvent::row_matches(row, course_code, group))
        .map(|row| AttendanceEvent::from_row(row))
        .collect::<Result<Vec<_>>>()?;

    let missed = sum_missed_hours(&events, course_code, group);
    debug!(
        course_code,
        group,
        events = events.len(),
        students = missed.len(),
        "aggregated missed hours"
    );
    Ok(missed)
}
