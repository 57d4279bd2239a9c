use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::Config;

fn print_status(json_output: bool, message: &str) {
    if json_output {
        println!(
            "{}",
            serde_json::json!({"status": "success", "message": message})
        );
    } else {
        println!("{message}");
    }
}

pub fn handle_config_action(action: ConfigAction, config_path: &Path, json_output: bool) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::default()
                .save_to(config_path)
                .context("Failed to initialize config")?;
            print_status(
                json_output,
                &format!("Configuration initialized at: {}", config_path.display()),
            );
        }
        ConfigAction::Show => {
            let config = Config::load_from(config_path).context("Failed to load config")?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Configuration ({})", config_path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(config_path).context("Failed to load config")?;
            config
                .set_value(&key, &value)
                .context("Invalid configuration")?;
            config.save_to(config_path).context("Failed to save config")?;
            print_status(
                json_output,
                &format!("Configuration updated: {key} = {value}"),
            );
        }
    }
    Ok(())
}
