use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::storage::{Row, Table, TableRecord};

/// One roster entry. A student is enrolled in exactly one (course_code, group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub programme: String,
    pub part: String,
    pub course_code: String,
    pub group: String,
    pub phone: String,
    pub email: String,
}

impl Student {
    pub fn is_enrolled_in(&self, course_code: &str, group: &str) -> bool {
        self.course_code == course_code && self.group == group
    }
}

impl TableRecord for Student {
    const TABLE: Table = Table::Students;

    fn from_row(row: &[String]) -> Result<Self, AttendanceError> {
        Self::TABLE.check_width(row)?;
        Ok(Self {
            student_id: row[0].clone(),
            name: row[1].clone(),
            programme: row[2].clone(),
            part: row[3].clone(),
            course_code: row[4].clone(),
            group: row[5].clone(),
            phone: row[6].clone(),
            email: row[7].clone(),
        })
    }

    fn to_row(&self) -> Row {
        vec![
            self.student_id.clone(),
            self.name.clone(),
            self.programme.clone(),
            self.part.clone(),
            self.course_code.clone(),
            self.group.clone(),
            self.phone.clone(),
            self.email.clone(),
        ]
    }
}
