//! `vts.toml` settings.
//!
//! ```toml
//! [statistics]
//! lsd_t_value = 2.0
//! lsd_replications = 4
//!
//! [report]
//! placeholder = "—"
//!
//! [store]
//! path = "vts-store.json"
//! sites_csv = "sites.csv"
//! ```
//!
//! Every section and key is optional. Command-line flags win over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vts_core::{LsdParams, MATURITY_PLACEHOLDER, ReportOptions};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vts.toml";
pub const DEFAULT_STORE_FILE: &str = "vts-store.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub statistics: StatisticsConfig,
    pub report: ReportConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub lsd_t_value: f64,
    pub lsd_replications: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        let params = LsdParams::default();
        Self {
            lsd_t_value: params.t_value,
            lsd_replications: params.replications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maturity group label for varieties missing from the registry.
    pub placeholder: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            placeholder: MATURITY_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Replaces the bundled site catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sites_csv: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
            sites_csv: None,
        }
    }
}

impl AppConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// An explicit path must exist; the default file is optional.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t_value = self.statistics.lsd_t_value;
        if !t_value.is_finite() || t_value <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "statistics.lsd_t_value",
                message: format!("expected a positive number, got {t_value}"),
            });
        }
        if self.statistics.lsd_replications == 0 {
            return Err(ConfigError::Invalid {
                key: "statistics.lsd_replications",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn lsd_params(&self) -> LsdParams {
        LsdParams {
            t_value: self.statistics.lsd_t_value,
            replications: self.statistics.lsd_replications,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            maturity_placeholder: self.report.placeholder.clone(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
