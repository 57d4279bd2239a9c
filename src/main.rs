// aamas: attendance monitoring and absenteeism alerts
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aamas::cli::{Cli, Commands};
use aamas::commands::{
    handle_alerts_command, handle_config_action, handle_record_absence_command,
    handle_report_command, handle_send_alerts_command, handle_upload_students_command,
};
use aamas::config::Config;
use aamas::intake::AbsenceForm;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "aamas=debug" } else { "aamas=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(config_path: &Path) -> Config {
    match Config::load_from(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    }
}

/// `--json` wins over the configured format
fn wants_json(cli_json: bool, config: &Config) -> bool {
    cli_json || config.output.format == "json"
}

fn wants_color(cli_colored: bool, config: &Config) -> bool {
    cli_colored || config.output.colored
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };

    let json = cli.json;
    let colored = cli.colored;

    match cli.command {
        Commands::UploadStudents { file } => {
            let config = load_config(&config_path);
            handle_upload_students_command(&config, &file, wants_json(json, &config))?;
        }
        Commands::RecordAbsence {
            student_id,
            course_code,
            group,
            week,
            class_label,
            hours,
            date,
        } => {
            let form = AbsenceForm {
                student_id,
                course_code,
                group,
                week,
                class_label,
                hours,
                date,
            };
            let config = load_config(&config_path);
            handle_record_absence_command(&config, &form, wants_json(json, &config))?;
        }
        Commands::Report { scope } => {
            let config = load_config(&config_path);
            handle_report_command(
                &config,
                &scope,
                wants_json(json, &config),
                wants_color(colored, &config),
            )?;
        }
        Commands::Alerts { scope } => {
            let config = load_config(&config_path);
            handle_alerts_command(
                &config,
                &scope,
                wants_json(json, &config),
                wants_color(colored, &config),
            )?;
        }
        Commands::SendAlerts {
            scope,
            students,
            all,
        } => {
            let config = load_config(&config_path);
            handle_send_alerts_command(
                &config,
                &scope,
                students,
                all,
                wants_json(json, &config),
                wants_color(colored, &config),
            )?;
        }
        Commands::Config { action } => {
            handle_config_action(action, &config_path, json)?;
        }
    }

    Ok(())
}
