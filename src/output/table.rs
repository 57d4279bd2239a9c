use serde::Serialize;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Style};
use tabled::{Table, Tabled};

use crate::alerts::thresholds::{Tier, format_tiers};
use crate::alerts::{AlertOverview, Delivery, EscalationReport, StudentOutcome};
use crate::analysis::{StudentPercentage, format_percent};

/// Trait for items that can be displayed as tables or JSON
pub trait OutputFormat {
    fn to_table(&self, colored: bool) -> String;
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

/// Row for the absenteeism report
#[derive(Tabled, Serialize, Debug)]
pub struct ReportRow {
    #[tabled(rename = "Student ID")]
    pub student_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Hours Missed")]
    pub hours_missed: String,
    #[tabled(rename = "Absent %")]
    pub percent: String,
    #[tabled(rename = "Tiers Hit")]
    pub tiers_hit: String,
    #[tabled(rename = "Phone")]
    pub phone: String,
    #[tabled(rename = "Email")]
    pub email: String,
}

/// Row for students at or above the first tier
#[derive(Tabled, Serialize, Debug)]
pub struct AlertRow {
    #[tabled(rename = "Student ID")]
    pub student_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Absent %")]
    pub percent: String,
    #[tabled(rename = "Tiers Hit")]
    pub tiers_hit: String,
    #[tabled(rename = "Sent 7%")]
    pub sent7: String,
    #[tabled(rename = "Sent 10%")]
    pub sent10: String,
    #[tabled(rename = "Sent 15%")]
    pub sent15: String,
    #[tabled(rename = "Alerts")]
    pub count: String,
}

/// Row for the result of an escalation run
#[derive(Tabled, Serialize, Debug)]
pub struct OutcomeRow {
    #[tabled(rename = "Student ID")]
    pub student_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Absent %")]
    pub percent: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "SMS")]
    pub sms: String,
    #[tabled(rename = "Processed")]
    pub processed: String,
    #[tabled(rename = "New Tiers")]
    pub newly_crossed: String,
}

fn yes_or_blank(set: bool) -> String {
    if set { "yes".to_string() } else { String::new() }
}

fn delivery_cell(delivery: &Delivery) -> String {
    if delivery.success {
        format!("ok: {}", delivery.detail)
    } else {
        delivery.detail.clone()
    }
}

impl ReportRow {
    pub fn from_percentage(row: &StudentPercentage) -> Self {
        Self {
            student_id: row.student_id.clone(),
            name: row.name.clone(),
            hours_missed: row.hours_missed.to_string(),
            percent: format_percent(row.percent),
            tiers_hit: format_tiers(&row.tiers_hit),
            phone: row.phone.clone(),
            email: row.email.clone(),
        }
    }
}

impl AlertRow {
    pub fn from_overview(overview: &AlertOverview) -> Self {
        Self {
            student_id: overview.row.student_id.clone(),
            name: overview.row.name.clone(),
            percent: format_percent(overview.row.percent),
            tiers_hit: format_tiers(&overview.row.tiers_hit),
            sent7: yes_or_blank(overview.flags.sent7),
            sent10: yes_or_blank(overview.flags.sent10),
            sent15: yes_or_blank(overview.flags.sent15),
            count: overview.count.to_string(),
        }
    }
}

impl OutcomeRow {
    pub fn from_outcome(outcome: &StudentOutcome) -> Self {
        Self {
            student_id: outcome.student_id.clone(),
            name: outcome.name.clone(),
            percent: format_percent(outcome.percent),
            email: delivery_cell(&outcome.email),
            sms: delivery_cell(&outcome.sms),
            processed: if outcome.processed { "yes" } else { "no" }.to_string(),
            newly_crossed: format_tiers(&outcome.newly_crossed),
        }
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Seven => Color::FG_CYAN,
        Tier::Ten => Color::FG_YELLOW,
        Tier::Fifteen => Color::FG_RED,
    }
}

/// Render rows; when colored, the header is bold and each body row takes the
/// color of the highest tier in `highest`.
fn styled<T: Tabled>(rows: Vec<T>, highest: &[Option<Tier>], colored: bool) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    if colored {
        table.modify(Rows::first(), Color::BOLD);
        for (index, tier) in highest.iter().enumerate() {
            if let Some(tier) = tier {
                table.modify(Rows::single(index + 1), tier_color(*tier));
            }
        }
    }
    table.to_string()
}

fn highest_tier(tiers: &[Tier]) -> Option<Tier> {
    tiers.iter().copied().max()
}

impl OutputFormat for Vec<StudentPercentage> {
    fn to_table(&self, colored: bool) -> String {
        if self.is_empty() {
            return "No students enrolled in this course/group.".to_string();
        }
        let highest: Vec<_> = self.iter().map(|row| highest_tier(&row.tiers_hit)).collect();
        styled(
            self.iter().map(ReportRow::from_percentage).collect(),
            &highest,
            colored,
        )
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for Vec<AlertOverview> {
    fn to_table(&self, colored: bool) -> String {
        if self.is_empty() {
            return "No students at or above 7% absenteeism.".to_string();
        }
        let highest: Vec<_> = self
            .iter()
            .map(|overview| highest_tier(&overview.row.tiers_hit))
            .collect();
        styled(
            self.iter().map(AlertRow::from_overview).collect(),
            &highest,
            colored,
        )
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for EscalationReport {
    fn to_table(&self, colored: bool) -> String {
        let summary = format!("Alerts processed for {} student(s)", self.processed_count);
        if self.outcomes.is_empty() {
            return summary;
        }
        let highest: Vec<_> = self
            .outcomes
            .iter()
            .map(|outcome| highest_tier(&outcome.tiers_hit))
            .collect();
        format!(
            "{}\n{}",
            styled(
                self.outcomes.iter().map(OutcomeRow::from_outcome).collect(),
                &highest,
                colored,
            ),
            summary
        )
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub fn render<T: OutputFormat>(
    value: &T,
    json: bool,
    colored: bool,
) -> Result<String, serde_json::Error> {
    if json { value.to_json() } else { Ok(value.to_table(colored)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::thresholds::{Tier, TierFlags, tiers_hit};
    use crate::analysis::HoursMissed;

    fn percentage(percent: f64, hours: f64) -> StudentPercentage {
        StudentPercentage {
            student_id: "S1".to_string(),
            name: "Tariro Moyo".to_string(),
            course_code: "CS201".to_string(),
            group: "A".to_string(),
            hours_missed: HoursMissed(hours),
            percent,
            tiers_hit: tiers_hit(percent),
            phone: "+263771111111".to_string(),
            email: "tariro@uni.test".to_string(),
        }
    }

    #[test]
    fn test_report_row_formatting() {
        let row = ReportRow::from_percentage(&percentage(7.5, 3.0));
        assert_eq!(row.hours_missed, "3");
        assert_eq!(row.percent, "7.5");
        assert_eq!(row.tiers_hit, "7%");

        let row = ReportRow::from_percentage(&percentage(0.0, 0.0));
        assert_eq!(row.tiers_hit, "-");
        assert_eq!(row.percent, "0.0");
    }

    #[test]
    fn test_empty_report_table() {
        let rows: Vec<StudentPercentage> = Vec::new();
        assert_eq!(rows.to_table(false), "No students enrolled in this course/group.");
    }

    #[test]
    fn test_report_table_has_headers() {
        let table = vec![percentage(12.5, 5.0)].to_table(false);
        assert!(table.contains("Student ID"));
        assert!(table.contains("7%, 10%"));
    }

    #[test]
    fn test_report_json_keeps_integral_hours() {
        let json = render(&vec![percentage(7.5, 3.0)], true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["hours_missed"], serde_json::json!(3));
        assert_eq!(value[0]["tiers_hit"], serde_json::json!(["7%"]));
    }

    #[test]
    fn test_alert_row_flags() {
        let overview = AlertOverview {
            row: percentage(11.0, 4.4),
            flags: TierFlags {
                sent7: true,
                sent10: false,
                sent15: false,
            },
            count: 1,
        };
        let row = AlertRow::from_overview(&overview);
        assert_eq!(row.sent7, "yes");
        assert_eq!(row.sent10, "");
        assert_eq!(row.count, "1");
    }

    #[test]
    fn test_outcome_summary_line() {
        let report = EscalationReport {
            processed_count: 1,
            outcomes: vec![StudentOutcome {
                student_id: "S1".to_string(),
                name: "Tariro Moyo".to_string(),
                percent: 20.0,
                tiers_hit: Tier::ALL.to_vec(),
                email: Delivery::failed("Email failed: email transport failed: connection refused"),
                sms: Delivery::sent("SMS logged"),
                processed: true,
                newly_crossed: vec![Tier::Ten, Tier::Fifteen],
                count: Some(2),
            }],
        };
        let table = report.to_table(false);
        assert!(table.ends_with("Alerts processed for 1 student(s)"));
        assert!(table.contains("ok: SMS logged"));
        assert!(table.contains("10%, 15%"));
    }

    #[test]
    fn test_colored_tables_mark_tier_rows() {
        let rows = vec![percentage(16.0, 6.4), percentage(0.0, 0.0)];
        let plain = rows.to_table(false);
        assert!(!plain.contains('\u{1b}'));

        let colored = render(&rows, false, true).unwrap();
        assert!(colored.contains("\u{1b}[31m"));
        assert!(colored.contains("Tariro Moyo"));
    }

    #[test]
    fn test_highest_tier() {
        assert_eq!(highest_tier(&Tier::ALL), Some(Tier::Fifteen));
        assert_eq!(highest_tier(&[Tier::Seven]), Some(Tier::Seven));
        assert_eq!(highest_tier(&[]), None);
    }
}
