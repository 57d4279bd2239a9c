use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::intake::{AbsenceForm, record_absence, upload_roster};

pub fn handle_upload_students_command(config: &Config, file: &Path, json_output: bool) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read roster file: {}", file.display()))?;

    let mut store = super::open_store(&config.storage)?;
    let count = upload_roster(&mut store, &contents)?;

    if json_output {
        println!(
            "{}",
            serde_json::json!({"status": "success", "students": count})
        );
    } else {
        println!("Students uploaded successfully ({count} students)");
    }
    Ok(())
}

pub fn handle_record_absence_command(config: &Config, form: &AbsenceForm, json_output: bool) -> Result<()> {
    let mut store = super::open_store(&config.storage)?;
    let event = record_absence(&mut store, form)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        println!(
            "Absence recorded: {} ({}) missed {} hour(s) of {} group {}",
            event.name,
            event.student_id,
            crate::models::attendance::format_hours(&event.hours),
            event.course_code,
            event.group
        );
    }
    Ok(())
}
