use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Serialize, Serializer};

use crate::alerts::thresholds::{Tier, tiers_hit};
use crate::analysis::aggregator::{MissedHours, missed_hours};
use crate::error::Result;
use crate::models::Student;
use crate::storage::{RecordStore, RecordStoreExt};

/// Missed hours as presented: integral values show without a fraction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct HoursMissed(pub f64);

impl HoursMissed {
    pub fn value(self) -> f64 {
        self.0
    }

    fn as_integer(self) -> Option<i64> {
        (self.0.fract() == 0.0 && self.0.abs() < 1e15).then_some(self.0 as i64)
    }
}

impl std::fmt::Display for HoursMissed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_integer() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for HoursMissed {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(whole) => serializer.serialize_i64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

/// Absenteeism for one enrolled student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPercentage {
    pub student_id: String,
    pub name: String,
    pub course_code: String,
    pub group: String,
    pub hours_missed: HoursMissed,
    pub percent: f64,
    pub tiers_hit: Vec<Tier>,
    pub phone: String,
    pub email: String,
}

/// Round half away from zero to `places` decimals; for the non-negative
/// percentages computed here that is half-up.
pub fn round_half_up(value: &BigDecimal, places: i64) -> BigDecimal {
    value.with_scale_round(places, RoundingMode::HalfUp)
}

/// `hours / total * 100` to two decimals, computed exactly. A non-positive
/// total yields zero.
pub fn percent_of(hours_missed: &BigDecimal, total_hours: &BigDecimal) -> BigDecimal {
    if *total_hours <= BigDecimal::zero() {
        return BigDecimal::zero();
    }
    round_half_up(&(hours_missed * BigDecimal::from(100) / total_hours), 2)
}

/// Decimal form of a total given as a float, taken from its shortest
/// round-trip text so `37.3` stays `37.3`. Non-finite totals become zero.
pub fn decimal_from_f64(value: f64) -> BigDecimal {
    if !value.is_finite() {
        return BigDecimal::zero();
    }
    BigDecimal::from_str(&value.to_string()).unwrap_or_default()
}

/// Nearest float to a decimal, for presentation.
pub fn decimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// Percent as written to storage and messages: `7.5`, `20.0`, `7.13`.
pub fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{percent:.1}")
    } else {
        percent.to_string()
    }
}

/// Percentages for every student enrolled in (course_code, group), in roster
/// order. Enrollment defines the universe, so students with no recorded
/// absences appear with 0.0.
pub fn percentages_for(
    students: &[Student],
    missed: &MissedHours,
    course_code: &str,
    group: &str,
    total_hours: f64,
) -> Vec<StudentPercentage> {
    let total_hours = decimal_from_f64(total_hours);
    students
        .iter()
        .filter(|s| s.is_enrolled_in(course_code, group))
        .map(|s| {
            let hours = missed.get(&s.student_id).cloned().unwrap_or_default();
            let percent = decimal_to_f64(&percent_of(&hours, &total_hours));
            StudentPercentage {
                student_id: s.student_id.clone(),
                name: s.name.clone(),
                course_code: s.course_code.clone(),
                group: s.group.clone(),
                hours_missed: HoursMissed(decimal_to_f64(&hours)),
                percent,
                tiers_hit: tiers_hit(percent),
                phone: s.phone.clone(),
                email: s.email.clone(),
            }
        })
        .collect()
}

pub fn compute_percentages<S: RecordStore + ?Sized>(
    store: &S,
    course_code: &str,
    group: &str,
    total_hours: f64,
) -> Result<Vec<StudentPercentage>> {
    let students: Vec<Student> = store.load_records()?;
    let missed = missed_hours(store, course_code, group)?;
    Ok(percentages_for(
        &students,
        &missed,
        course_code,
        group,
        total_hours,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Table, TableRecord, to_row};

    fn enroll(store: &mut MemoryStore, id: &str, course: &str, group: &str) {
        let student = Student {
            student_id: id.to_string(),
            name: format!("Student {id}"),
            programme: "BSc".to_string(),
            part: "1".to_string(),
            course_code: course.to_string(),
            group: group.to_string(),
            phone: "+263770000000".to_string(),
            email: format!("{id}@uni.test"),
        };
        store.append_one(Table::Students, student.to_row()).unwrap();
    }

    fn absent(store: &mut MemoryStore, id: &str, hours: &str) {
        store
            .append_one(
                Table::AttendanceEvents,
                to_row(&[id, "", "CS201", "A", "1", "Lab", hours, "2026-03-02"]),
            )
            .unwrap();
    }

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    fn pct(hours: &str, total: &str) -> f64 {
        decimal_to_f64(&percent_of(&dec(hours), &dec(total)))
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(pct("3", "40"), 7.5);
        assert_eq!(pct("8", "40"), 20.0);
        assert_eq!(pct("1", "3"), 33.33);
        assert_eq!(pct("2", "3"), 66.67);
        assert_eq!(pct("0", "40"), 0.0);
        assert_eq!(pct("80", "40"), 200.0);
    }

    #[test]
    fn test_percent_of_rounds_exact_midpoints_up() {
        assert_eq!(percent_of(&dec("9.995"), &dec("100")), dec("10.00"));
        assert_eq!(pct("2.3", "16"), 14.38);
        assert_eq!(pct("19.99", "200"), 10.0);
        assert_eq!(tiers_hit(pct("9.995", "100")), vec![Tier::Seven, Tier::Ten]);
    }

    #[test]
    fn test_non_positive_total_yields_zero() {
        assert_eq!(pct("5", "0"), 0.0);
        assert_eq!(pct("5", "-10"), 0.0);
        assert_eq!(pct("0", "0"), 0.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(&dec("0.125"), 2), dec("0.13"));
        assert_eq!(round_half_up(&dec("7.5"), 0), dec("8"));
        assert_eq!(round_half_up(&dec("12.344"), 2), dec("12.34"));
    }

    #[test]
    fn test_float_totals_keep_their_decimal_text() {
        assert_eq!(decimal_from_f64(37.3), dec("37.3"));
        assert_eq!(decimal_from_f64(40.0), dec("40"));
        assert_eq!(decimal_from_f64(f64::NAN), BigDecimal::zero());
    }

    #[test]
    fn test_hours_missed_display() {
        assert_eq!(HoursMissed(3.0).to_string(), "3");
        assert_eq!(HoursMissed(3.5).to_string(), "3.5");
        assert_eq!(serde_json::to_string(&HoursMissed(4.0)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&HoursMissed(0.25)).unwrap(), "0.25");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(7.5), "7.5");
        assert_eq!(format_percent(20.0), "20.0");
        assert_eq!(format_percent(0.0), "0.0");
        assert_eq!(format_percent(33.33), "33.33");
    }

    #[test]
    fn test_enrollment_drives_the_universe() {
        let mut store = MemoryStore::new();
        enroll(&mut store, "S1", "CS201", "A");
        enroll(&mut store, "S2", "CS201", "A");
        enroll(&mut store, "S3", "CS201", "B");
        absent(&mut store, "S1", "3");
        absent(&mut store, "GHOST", "12");

        let rows = compute_percentages(&store, "CS201", "A", 40.0).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].student_id, "S1");
        assert_eq!(rows[0].percent, 7.5);
        assert_eq!(rows[0].tiers_hit, vec![Tier::Seven]);
        assert_eq!(rows[0].hours_missed.to_string(), "3");

        assert_eq!(rows[1].student_id, "S2");
        assert_eq!(rows[1].percent, 0.0);
        assert!(rows[1].tiers_hit.is_empty());
    }

    #[test]
    fn test_zero_total_hours_is_not_an_error() {
        let mut store = MemoryStore::new();
        enroll(&mut store, "S1", "CS201", "A");
        absent(&mut store, "S1", "30");

        let rows = compute_percentages(&store, "CS201", "A", 0.0).unwrap();
        assert_eq!(rows[0].percent, 0.0);
        assert!(rows[0].tiers_hit.is_empty());
        assert_eq!(rows[0].hours_missed.value(), 30.0);
    }

    #[test]
    fn test_decimal_absences_reach_the_ten_percent_tier() {
        let mut store = MemoryStore::new();
        enroll(&mut store, "S1", "CS201", "A");
        absent(&mut store, "S1", "4.995");
        absent(&mut store, "S1", "5");

        let rows = compute_percentages(&store, "CS201", "A", 100.0).unwrap();
        assert_eq!(rows[0].percent, 10.0);
        assert_eq!(rows[0].tiers_hit, vec![Tier::Seven, Tier::Ten]);
        assert_eq!(rows[0].hours_missed.to_string(), "9.995");
    }
}
