use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LoggingConfig;
use super::session::SessionConfig;
use super::store::StoreConfig;
use crate::utils::logger::parse_level;

/// Environment variables with this prefix override values from the YAML file,
/// e.g. `SESSIONTRON_BIND_ADDRESS` or `SESSIONTRON_SESSION__DEFAULT_EXPIRY_IN_S`.
pub const ENV_PREFIX: &str = "SESSIONTRON_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0, containing session, store, logging, etc.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub store: StoreConfig,
}

impl ConfigV1 {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if parse_level(&self.logging.level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Invalid logging.level '{}'. Valid values: trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        self.session.validate()
    }
}

/// Extract and validate a config from an already assembled figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment.extract::<Config>().map_err(Box::new)?;
    let config = match config {
        Config::ConfigV1(c) => c,
    };
    config.validate()?;
    Ok(config)
}

/// Load config from a YAML file, with `SESSIONTRON_`-prefixed environment overrides.
pub fn load_config(path: &Path) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract_config(figment)
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
