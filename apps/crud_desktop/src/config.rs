use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE_NAME: &str = "crud_desktop.toml";

/// Clock used when displaying resource timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Utc,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resource_api_url: String,
    pub student_api_url: String,
    pub notification_ms: u64,
    pub timestamp_zone: TimestampZone,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resource_api_url: "http://localhost:8080/api/v1".into(),
            student_api_url: "http://localhost:8080".into(),
            notification_ms: 3000,
            timestamp_zone: TimestampZone::Utc,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("resource_api_url", &self.resource_api_url),
            ("student_api_url", &self.student_api_url),
        ] {
            url::Url::parse(value).with_context(|| format!("invalid {key} '{value}'"))?;
        }
        anyhow::ensure!(self.notification_ms > 0, "notification_ms must be positive");
        Ok(())
    }
}

/// Values given on the command line; each one beats the settings file.
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    pub resource_api_url: Option<String>,
    pub student_api_url: Option<String>,
    pub notification_ms: Option<u64>,
    pub timestamp_zone: Option<TimestampZone>,
    pub log_filter: Option<String>,
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("crud_desktop").join(SETTINGS_FILE_NAME))
}

/// Reads settings from `explicit`, or from the platform config dir when no
/// path is given. Only an explicit path is required to exist.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Settings::default()),
        },
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let settings = toml::from_str::<Settings>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded settings file");
    Ok(settings)
}

pub fn apply_overrides(mut settings: Settings, overrides: LaunchOverrides) -> Settings {
    if let Some(v) = overrides.resource_api_url {
        settings.resource_api_url = v;
    }
    if let Some(v) = overrides.student_api_url {
        settings.student_api_url = v;
    }
    if let Some(v) = overrides.notification_ms {
        settings.notification_ms = v;
    }
    if let Some(v) = overrides.timestamp_zone {
        settings.timestamp_zone = v;
    }
    if let Some(v) = overrides.log_filter {
        settings.log_filter = v;
    }
    settings
}
