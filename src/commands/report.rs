use anyhow::Result;

use crate::cli::CourseScope;
use crate::config::Config;
use crate::output::render;

pub fn handle_report_command(
    config: &Config,
    scope: &CourseScope,
    json_output: bool,
    colored: bool,
) -> Result<()> {
    let escalator = super::open_escalator(config)?;
    let rows =
        escalator.compute_percentages(&scope.course_code, &scope.group, scope.total_hours)?;

    if !json_output {
        println!(
            "Absenteeism for {} group {} ({} total hours)",
            scope.course_code, scope.group, scope.total_hours
        );
    }
    println!("{}", render(&rows, json_output, colored)?);
    Ok(())
}
