use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Csv,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file for sqlite, directory for csv. `~` expands to home.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub email_enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Login is attempted, after STARTTLS, only when user and password are both set.
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: String,
    pub sms_enabled: bool,
    pub sms_gateway_url: Option<String>,
    /// Connect and send timeout per channel.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String, // "table" or "json"
    pub colored: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: "~/.local/share/aamas/aamas.db".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_enabled: true,
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            smtp_user: None,
            smtp_password: None,
            email_from: "aamas@localhost".to_string(),
            sms_enabled: true,
            sms_gateway_url: None,
            timeout_secs: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            colored: false,
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> Result<PathBuf> {
        expand_home(&self.path)
    }
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            Ok(home.join(rest))
        }
        None if path == "~" => dirs::home_dir().context("Failed to determine home directory"),
        None => Ok(PathBuf::from(path)),
    }
}

impl Config {
    /// Load from the default location, writing a commented default file if
    /// none exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        if config.notifications.timeout_secs == 0 {
            anyhow::bail!(
                "notifications.timeout_secs must be at least 1 in {}",
                config_path.display()
            );
        }

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_commented_toml();

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Generate TOML configuration with comments explaining each option
    pub fn to_commented_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# aamas configuration\n");
        output.push_str("# Attendance monitoring and absenteeism alerts\n");
        output.push_str("\n");

        output.push_str("[storage]\n");
        output.push_str("# Record store backend:\n");
        output.push_str("#   \"sqlite\" - single database file (default)\n");
        output.push_str("#   \"csv\"    - directory holding students.csv, attendance.csv, alerts.csv\n");
        output.push_str(&format!("backend = \"{}\"\n", self.storage.backend.as_str()));
        output.push_str("# Database file (sqlite) or directory (csv); ~ expands to your home\n");
        output.push_str(&format!("path = {}\n", toml_string(&self.storage.path)));
        output.push_str("\n");

        output.push_str("[notifications]\n");
        output.push_str("# Email is sent over SMTP, by default to a local server such as postfix.\n");
        output.push_str("# With smtp_user and smtp_password set the session is upgraded with\n");
        output.push_str("# STARTTLS before logging in.\n");
        output.push_str(&format!("email_enabled = {}\n", self.notifications.email_enabled));
        output.push_str(&format!(
            "smtp_host = {}\n",
            toml_string(&self.notifications.smtp_host)
        ));
        output.push_str(&format!("smtp_port = {}\n", self.notifications.smtp_port));
        match &self.notifications.smtp_user {
            Some(user) => output.push_str(&format!("smtp_user = {}\n", toml_string(user))),
            None => output.push_str("# smtp_user = \"alerts@example.ac.zw\"\n"),
        }
        match &self.notifications.smtp_password {
            Some(password) => {
                output.push_str(&format!("smtp_password = {}\n", toml_string(password)))
            }
            None => output.push_str("# smtp_password = \"\"\n"),
        }
        output.push_str(&format!(
            "email_from = {}\n",
            toml_string(&self.notifications.email_from)
        ));
        output.push_str("\n");
        output.push_str("# SMS is posted as JSON {to, message} to an HTTP gateway.\n");
        output.push_str("# Without a gateway URL messages are written to the log and count as sent.\n");
        output.push_str(&format!("sms_enabled = {}\n", self.notifications.sms_enabled));
        match &self.notifications.sms_gateway_url {
            Some(url) => output.push_str(&format!("sms_gateway_url = {}\n", toml_string(url))),
            None => output.push_str("# sms_gateway_url = \"http://localhost:9090/sms\"\n"),
        }
        output.push_str("\n");
        output.push_str("# Per-channel connect and send timeout in seconds. A timed out channel\n");
        output.push_str("# counts as failed; the rest of the batch continues.\n");
        output.push_str(&format!("timeout_secs = {}\n", self.notifications.timeout_secs));
        output.push_str("\n");

        output.push_str("[output]\n");
        output.push_str("# \"table\" or \"json\"; --json on the command line overrides\n");
        output.push_str(&format!("format = {}\n", toml_string(&self.output.format)));
        output.push_str("# Color table rows by the highest tier reached; --colored overrides\n");
        output.push_str(&format!("colored = {}\n", self.output.colored));

        output
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".config").join("aamas").join("config.toml"))
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage.backend" => {
                self.storage.backend = match value {
                    "sqlite" => StorageBackend::Sqlite,
                    "csv" => StorageBackend::Csv,
                    _ => anyhow::bail!("Invalid backend: {}. Must be 'sqlite' or 'csv'", value),
                };
            }
            "storage.path" => {
                if value.trim().is_empty() {
                    anyhow::bail!("storage.path must not be empty");
                }
                self.storage.path = value.to_string();
            }
            "notifications.email_enabled" => {
                self.notifications.email_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "notifications.smtp_host" => {
                if value.trim().is_empty() {
                    anyhow::bail!("notifications.smtp_host must not be empty");
                }
                self.notifications.smtp_host = value.trim().to_string();
            }
            "notifications.smtp_port" => {
                self.notifications.smtp_port = value
                    .parse()
                    .with_context(|| format!("Invalid port value: {}", value))?;
            }
            "notifications.smtp_user" => {
                self.notifications.smtp_user = optional_text(value);
            }
            "notifications.smtp_password" => {
                self.notifications.smtp_password = optional_text(value);
            }
            "notifications.email_from" => self.notifications.email_from = value.to_string(),
            "notifications.sms_enabled" => {
                self.notifications.sms_enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "notifications.sms_gateway_url" => {
                self.notifications.sms_gateway_url = optional_url(value)?;
            }
            "notifications.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout value: {}", value))?;
                if secs == 0 || secs > 300 {
                    anyhow::bail!("Timeout must be between 1 and 300 seconds");
                }
                self.notifications.timeout_secs = secs;
            }
            "output.format" => {
                if !["table", "json"].contains(&value) {
                    anyhow::bail!("Invalid output format: {}. Must be 'table' or 'json'", value);
                }
                self.output.format = value.to_string();
            }
            "output.colored" => {
                self.output.colored = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}

/// Empty clears the value.
fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Empty clears the URL.
fn optional_url(value: &str) -> Result<Option<String>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        anyhow::bail!("Invalid URL: {}. Must start with http:// or https://", value);
    }
    Ok(Some(value.to_string()))
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
