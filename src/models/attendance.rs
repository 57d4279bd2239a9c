use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::storage::{Row, Table, TableRecord};

const COURSE_CODE: usize = 2;
const GROUP: usize = 3;
const HOURS: usize = 6;

/// A single recorded absence. The log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub student_id: String,
    pub name: String,
    pub course_code: String,
    pub group: String,
    pub week: String,
    pub class_label: String,
    pub hours: BigDecimal,
    pub date: String,
}

impl AttendanceEvent {
    /// Checks the enrollment columns of a stored row without parsing it.
    pub fn row_matches(row: &[String], course_code: &str, group: &str) -> bool {
        row.len() > GROUP && row[COURSE_CODE] == course_code && row[GROUP] == group
    }
}

/// Parse an hours field: a finite, non-negative decimal.
pub fn parse_hours(raw: &str) -> Result<BigDecimal, AttendanceError> {
    let hours = BigDecimal::from_str(raw.trim())
        .map_err(|e| AttendanceError::data_format("hours", raw, e))?;

    if hours < BigDecimal::zero() {
        return Err(AttendanceError::data_format(
            "hours",
            raw,
            "must not be negative",
        ));
    }
    Ok(hours)
}

/// Render hours the way they are written back to storage: `2` not `2.0`,
/// `1.5` not `1.50`.
pub fn format_hours(hours: &BigDecimal) -> String {
    let whole = hours.with_scale(0);
    if whole == *hours {
        whole.to_string()
    } else {
        hours.normalized().to_string()
    }
}

impl TableRecord for AttendanceEvent {
    const TABLE: Table = Table::AttendanceEvents;

    fn from_row(row: &[String]) -> Result<Self, AttendanceError> {
        Self::TABLE.check_width(row)?;
        Ok(Self {
            student_id: row[0].clone(),
            name: row[1].clone(),
            course_code: row[COURSE_CODE].clone(),
            group: row[GROUP].clone(),
            week: row[4].clone(),
            class_label: row[5].clone(),
            hours: parse_hours(&row[HOURS])?,
            date: row[7].clone(),
        })
    }

    fn to_row(&self) -> Row {
        vec![
            self.student_id.clone(),
            self.name.clone(),
            self.course_code.clone(),
            self.group.clone(),
            self.week.clone(),
            self.class_label.clone(),
            format_hours(&self.hours),
            self.date.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::to_row;

    #[test]
    fn test_parse_hours_accepts_reals() {
        assert_eq!(parse_hours("3").unwrap(), BigDecimal::from(3));
        assert_eq!(parse_hours(" 1.5 ").unwrap(), BigDecimal::from_str("1.5").unwrap());
        assert_eq!(parse_hours("0").unwrap(), BigDecimal::zero());
    }

    #[test]
    fn test_parse_hours_rejects_garbage() {
        for raw in ["", "two", "1,5", "-1", "NaN", "inf"] {
            let err = parse_hours(raw).unwrap_err();
            assert!(err.is_data_format(), "{raw:?} should be a data format error");
        }
    }

    #[test]
    fn test_format_hours_drops_integral_fraction() {
        let hours = |raw: &str| BigDecimal::from_str(raw).unwrap();
        assert_eq!(format_hours(&hours("2")), "2");
        assert_eq!(format_hours(&hours("2.00")), "2");
        assert_eq!(format_hours(&hours("1.50")), "1.5");
        assert_eq!(format_hours(&hours("0.25")), "0.25");
    }

    #[test]
    fn test_row_matches_uses_enrollment_columns() {
        let row = to_row(&["S1", "Tariro", "CS201", "A", "1", "Lab", "x", "2026-03-02"]);
        assert!(AttendanceEvent::row_matches(&row, "CS201", "A"));
        assert!(!AttendanceEvent::row_matches(&row, "CS201", "B"));
        // hours are not parsed by the match
        assert!(AttendanceEvent::from_row(&row).is_err());
    }
}
