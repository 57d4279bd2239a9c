use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aamas")]
#[command(about = "Attendance monitoring and absenteeism alerts")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable colorized table output
    #[arg(long, global = true)]
    pub colored: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Course/group selection plus the course length used for percentages.
#[derive(Args, Debug, Clone)]
pub struct CourseScope {
    /// Course code, e.g. CS201
    #[arg(long)]
    pub course_code: String,

    /// Group within the course
    #[arg(long)]
    pub group: String,

    /// Total scheduled hours for the course; zero or less reports 0%
    #[arg(long, allow_negative_numbers = true)]
    pub total_hours: f64,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., notifications.timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the student roster from a CSV file
    UploadStudents {
        /// CSV with header student_id,name,programme,part,course_code,group,phone,email
        #[arg(long)]
        file: PathBuf,
    },

    /// Record hours missed by a student
    RecordAbsence {
        #[arg(long)]
        student_id: String,

        #[arg(long)]
        course_code: String,

        #[arg(long)]
        group: String,

        #[arg(long, default_value = "")]
        week: String,

        /// Class label, e.g. Lecture or Lab 2
        #[arg(long, default_value = "")]
        class_label: String,

        /// Hours missed
        #[arg(long, default_value = "0")]
        hours: String,

        /// Date of the class (YYYY-MM-DD), defaults to today
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Show absenteeism for every student in a course/group
    Report {
        #[command(flatten)]
        scope: CourseScope,
    },

    /// List students at or above 7% with their alert history
    Alerts {
        #[command(flatten)]
        scope: CourseScope,
    },

    /// Notify students by email and SMS and record the tiers reached
    #[command(group(
        ArgGroup::new("selection")
            .args(["students", "all"])
            .required(true)
            .multiple(false)
    ))]
    SendAlerts {
        #[command(flatten)]
        scope: CourseScope,

        /// Student to notify (repeatable)
        #[arg(long = "student")]
        students: Vec<String>,

        /// Notify every student currently at or above 7%
        #[arg(long)]
        all: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_alerts_requires_a_selection() {
        let base = [
            "aamas",
            "send-alerts",
            "--course-code",
            "CS201",
            "--group",
            "A",
            "--total-hours",
            "40",
        ];
        assert!(Cli::try_parse_from(base).is_err());

        let mut with_students = base.to_vec();
        with_students.extend(["--student", "S1", "--student", "S2"]);
        let cli = Cli::try_parse_from(with_students).unwrap();
        match cli.command {
            Commands::SendAlerts { students, all, scope } => {
                assert_eq!(students, vec!["S1", "S2"]);
                assert!(!all);
                assert_eq!(scope.total_hours, 40.0);
            }
            _ => panic!("expected send-alerts"),
        }

        let mut both = base.to_vec();
        both.extend(["--student", "S1", "--all"]);
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn test_negative_total_hours_parse() {
        let cli = Cli::try_parse_from([
            "aamas",
            "report",
            "--course-code",
            "CS201",
            "--group",
            "A",
            "--total-hours",
            "-5",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { scope } => assert_eq!(scope.total_hours, -5.0),
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_colored_is_global() {
        let cli = Cli::try_parse_from([
            "aamas",
            "alerts",
            "--course-code",
            "CS201",
            "--group",
            "A",
            "--total-hours",
            "40",
            "--colored",
        ])
        .unwrap();
        assert!(cli.colored);
        assert!(!cli.json);
    }
}
