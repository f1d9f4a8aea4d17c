use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::{ConfigError, ParameterOverrides, ParameterSet};
use crate::engine::{EngineSettings, DEFAULT_MONTHS};

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub parameters: ParameterOverrides,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: None,
            months: None,
            logging: LoggingConfig::default(),
            parameters: ParameterOverrides::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Validates the scenario's overrides, with `extra` layered on top.
    pub fn parameters(&self, extra: ParameterOverrides) -> Result<ParameterSet, ConfigError> {
        ParameterSet::new(self.parameters.clone().overlay(extra))
    }

    pub fn months(&self, override_months: Option<u32>) -> u32 {
        override_months.or(self.months).unwrap_or(DEFAULT_MONTHS)
    }

    pub fn engine_settings(&self, override_months: Option<u32>) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            total_months: self.months(override_months),
        }
    }
}
