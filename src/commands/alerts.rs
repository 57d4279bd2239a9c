use anyhow::Result;

use crate::cli::CourseScope;
use crate::config::Config;
use crate::output::render;

pub fn handle_alerts_command(
    config: &Config,
    scope: &CourseScope,
    json_output: bool,
    colored: bool,
) -> Result<()> {
    let escalator = super::open_escalator(config)?;
    let overview =
        escalator.alert_overview(&scope.course_code, &scope.group, scope.total_hours)?;
    println!("{}", render(&overview, json_output, colored)?);
    Ok(())
}

pub fn handle_send_alerts_command(
    config: &Config,
    scope: &CourseScope,
    students: Vec<String>,
    all: bool,
    json_output: bool,
    colored: bool,
) -> Result<()> {
    let mut escalator = super::open_escalator(config)?;

    let selected = if all {
        escalator
            .alert_overview(&scope.course_code, &scope.group, scope.total_hours)?
            .into_iter()
            .map(|overview| overview.row.student_id)
            .collect()
    } else {
        students
    };

    let report = escalator.process_alerts(
        &scope.course_code,
        &scope.group,
        scope.total_hours,
        &selected,
    )?;
    println!("{}", render(&report, json_output, colored)?);
    Ok(())
}
