// Attendance aggregation and absenteeism percentages
pub mod aggregator;
pub mod percentages;

pub use aggregator::{MissedHours, missed_hours, sum_missed_hours};
pub use percentages::{
    HoursMissed, StudentPercentage, compute_percentages, format_percent, percent_of,
    percentages_for, round_half_up,
};
