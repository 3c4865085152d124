use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dashboard_core::DEFAULT_FILE_IDS;
use dashboard_engine::{EngineSettings, ServiceSettings};
use dashboard_logging::dashboard_info;
use serde::{Deserialize, Serialize};

/// Settings read from the `.ron` config file. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Service root that `/health` and `/v1/...` are resolved against.
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub health_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Initial contents of the file-id input.
    pub default_file_ids: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            poll_interval_ms: 2500,
            health_interval_ms: 5000,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            default_file_ids: DEFAULT_FILE_IDS.to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            service: ServiceSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            health_interval: Duration::from_millis(self.health_interval_ms),
        }
    }
}

/// Load the config at `path`. No path, or a file that does not exist, means defaults.
pub fn load(path: Option<&Path>) -> Result<DashboardConfig> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };

    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            dashboard_info!("No config at {:?}, using defaults", path);
            return Ok(DashboardConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };

    let config = ron::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    dashboard_info!("Loaded config from {:?}", path);
    Ok(config)
}
