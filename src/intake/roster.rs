use std::collections::HashSet;

use tracing::info;

use crate::error::{AttendanceError, Result};
use crate::models::Student;
use crate::storage::{RecordStore, RecordStoreExt, STUDENT_FIELDS, TableRecord};

/// Replace the roster with the students in `csv_text`.
///
/// The header must equal the Students schema exactly, names and order. Any
/// problem rejects the whole upload and leaves the stored roster unchanged.
pub fn upload_roster<S: RecordStore + ?Sized>(store: &mut S, csv_text: &str) -> Result<usize> {
    if csv_text.trim().is_empty() {
        return Err(AttendanceError::validation("No file selected"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AttendanceError::validation(format!("Upload failed: {e}")))?
        .clone();
    let found: Vec<&str> = headers.iter().collect();
    if found != STUDENT_FIELDS {
        return Err(AttendanceError::validation(format!(
            "Invalid header. Expected: {}",
            STUDENT_FIELDS.join(", ")
        )));
    }

    let mut students = Vec::new();
    let mut seen = HashSet::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| AttendanceError::validation(format!("Upload failed: {e}")))?;
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        let student = Student::from_row(&row)?;

        if student.student_id.is_empty() {
            return Err(AttendanceError::validation(format!(
                "Upload failed: row {} has no student_id",
                index + 2
            )));
        }
        if !seen.insert(student.student_id.clone()) {
            return Err(AttendanceError::validation(format!(
                "Upload failed: duplicate student_id {}",
                student.student_id
            )));
        }
        students.push(student);
    }

    store.replace_records(&students)?;
    info!(students = students.len(), "roster replaced");
    Ok(students.len())
}
