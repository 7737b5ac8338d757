use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Converter settings, loadable from a YAML file and overridable per-flag
/// from the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Indented JSON output instead of compact.
    #[serde(default)]
    pub pretty: bool,
    /// Populate `raw_rule` in each record.
    #[serde(default = "default_true")]
    pub include_raw: bool,
    /// Only emit records whose metadata SID matches this decimal text.
    #[serde(default)]
    pub sid_filter: Option<String>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pretty: false,
            include_raw: true,
            sid_filter: None,
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConvertError::Config(format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(sid) = &self.sid_filter {
            if sid.parse::<i64>().is_err() {
                return Err(ConvertError::Config(format!(
                    "SID filter must be a decimal number, got {:?}",
                    sid
                )));
            }
        }

        Ok(())
    }
}
