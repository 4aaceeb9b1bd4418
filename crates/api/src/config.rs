//! Server Configuration
//!
//! Settings come from an optional TOML file overlaid with `ATTRITION_*`
//! environment variables, e.g. `ATTRITION_SERVER__ADDR=127.0.0.1:9000`.

use config::{Config, ConfigError, Environment, File};
use inference_engine::ArtifactPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read when `ATTRITION_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "attrition.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "ATTRITION_CONFIG";

const ENV_PREFIX: &str = "ATTRITION";

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub artifacts: ArtifactPaths,
    pub schema: SchemaSettings,
    pub dataset: DatasetSettings,
    pub performance: PerformanceSettings,
}

impl Settings {
    /// Load from `ATTRITION_CONFIG` (or `attrition.toml`) plus the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(path)
    }

    /// Load from a specific file; a missing file falls back to defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("schema.categorical_fields"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub addr: String,
    /// Largest accepted batch upload
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Raw fields that were one-hot encoded at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub categorical_fields: Vec<String>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            categorical_fields: [
                "BusinessTravel",
                "Department",
                "EducationField",
                "Gender",
                "JobRole",
                "MaritalStatus",
                "OverTime",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Historical dataset shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub path: PathBuf,
    pub preview_rows: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/employee_attrition.csv"),
            preview_rows: 5,
        }
    }
}

/// One evaluation figure reported by the performance page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub value: String,
}

impl MetricEntry {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Offline evaluation results of the deployed model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub metrics: Vec<MetricEntry>,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            metrics: vec![
                MetricEntry::new("Accuracy", "88%"),
                MetricEntry::new("Precision (Attrition)", "74%"),
                MetricEntry::new("Recall (Attrition)", "36%"),
                MetricEntry::new("F1 Score", "0.49"),
            ],
        }
    }
}
