use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AttendanceError, Result};
use crate::models::{AttendanceEvent, Student, parse_hours};
use crate::storage::{RecordStore, RecordStoreExt};

/// Absence as entered by a lecturer; fields are raw text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceForm {
    pub student_id: String,
    pub course_code: String,
    pub group: String,
    pub week: String,
    pub class_label: String,
    pub hours: String,
    pub date: String,
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(AttendanceError::validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Validate an absence and append it to the attendance log.
///
/// Unknown students and missing identity fields are rejected; hours must be a
/// non-negative number (blank means 0). The student's name is taken from the
/// roster, and a blank date defaults to today. Nothing is written on error.
pub fn record_absence<S: RecordStore + ?Sized>(
    store: &mut S,
    form: &AbsenceForm,
) -> Result<AttendanceEvent> {
    let student_id = required("student_id", form.student_id.trim())?;
    let course_code = required("course_code", form.course_code.trim())?;
    let group = required("group", form.group.trim())?;

    let students: Vec<Student> = store.load_records()?;
    let student = students
        .iter()
        .find(|s| s.student_id == student_id)
        .ok_or_else(|| AttendanceError::validation("Student not found"))?;

    let hours_text = match form.hours.trim() {
        "" => "0",
        text => text,
    };
    let hours = parse_hours(hours_text)?;

    let date = match form.date.trim() {
        "" => Local::now().date_naive().format("%Y-%m-%d").to_string(),
        text => text.to_string(),
    };

    let event = AttendanceEvent {
        student_id: student.student_id.clone(),
        name: student.name.clone(),
        course_code: course_code.to_string(),
        group: group.to_string(),
        week: form.week.trim().to_string(),
        class_label: form.class_label.trim().to_string(),
        hours,
        date,
    };

    store.append_record(&event)?;
    info!(
        student_id = %event.student_id,
        course_code = %event.course_code,
        group = %event.group,
        hours = %event.hours,
        "absence recorded"
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use crate::intake::upload_roster;
    use crate::storage::{MemoryStore, Table};

    fn store_with_roster() -> MemoryStore {
        let mut store = MemoryStore::new();
        upload_roster(
            &mut store,
            "student_id,name,programme,part,course_code,group,phone,email\n\
             S1,Tariro Moyo,BSc Computing,2,CS201,A,+263771111111,tariro@uni.test\n",
        )
        .unwrap();
        store
    }

    fn form(student_id: &str, hours: &str) -> AbsenceForm {
        AbsenceForm {
            student_id: student_id.to_string(),
            course_code: "CS201".to_string(),
            group: "A".to_string(),
            week: "3".to_string(),
            class_label: "Lecture".to_string(),
            hours: hours.to_string(),
            date: "2026-03-16".to_string(),
        }
    }

    #[test]
    fn test_records_event_with_roster_name() {
        let mut store = store_with_roster();
        let event = record_absence(&mut store, &form(" S1 ", "2")).unwrap();
        assert_eq!(event.name, "Tariro Moyo");
        assert_eq!(event.hours, BigDecimal::from(2));

        let events: Vec<AttendanceEvent> = store.load_records().unwrap();
        assert_eq!(events, vec![event]);
    }

    #[test]
    fn test_unknown_student_is_rejected_without_append() {
        let mut store = store_with_roster();
        let err = record_absence(&mut store, &form("S404", "2")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Student not found");
        assert_eq!(store.row_count(Table::AttendanceEvents), 0);
    }

    #[test]
    fn test_non_numeric_hours_are_rejected() {
        let mut store = store_with_roster();
        let err = record_absence(&mut store, &form("S1", "two")).unwrap_err();
        assert!(err.is_data_format());
        assert_eq!(store.row_count(Table::AttendanceEvents), 0);
    }

    #[test]
    fn test_missing_group_is_rejected() {
        let mut store = store_with_roster();
        let mut absence = form("S1", "1");
        absence.group = "  ".to_string();
        let err = record_absence(&mut store, &absence).unwrap_err();
        assert_eq!(err.to_string(), "group is required");
    }

    #[test]
    fn test_blank_hours_and_date_take_defaults() {
        let mut store = store_with_roster();
        let mut absence = form("S1", "");
        absence.date = String::new();
        let event = record_absence(&mut store, &absence).unwrap();
        assert_eq!(event.hours, BigDecimal::from(0));
        assert_eq!(event.date.len(), 10);
    }
}
