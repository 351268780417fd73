//! CLI configuration with layered loading.
//!
//! # Load Order
//!
//! 1. Default values
//! 2. Config file (`--config`, or `rolegate.json` inside the store directory)
//! 3. Environment variables (`ROLEGATE_STORE`, `ROLEGATE_PROGRAM_ID`, `ROLEGATE_LOG`)
//! 4. Command line flags
//!
//! Each layer overrides the previous.

use std::path::{Path, PathBuf};

use rolegate_common::Address;
use rolegate_program::EngineSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the config file looked for inside the store directory.
pub const CONFIG_FILE: &str = "rolegate.json";

/// Store directory used when nothing else is configured.
pub const DEFAULT_STORE_DIR: &str = ".rolegate";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    /// A loaded value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidValue(String),
}

/// Everything the `rolegate` binary needs to know before it runs a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding the record store.
    pub store: PathBuf,

    /// `tracing_subscriber::EnvFilter` directive.
    pub log: String,

    /// Engine settings (flattened into the top level of the file).
    #[serde(flatten)]
    pub engine: EngineSettings,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from(DEFAULT_STORE_DIR),
            log: DEFAULT_LOG_FILTER.to_owned(),
            engine: EngineSettings::default(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub program_id: Option<Address>,
    pub log: Option<String>,
}

/// Configuration loader with builder pattern.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    overrides: ConfigOverrides,
    skip_env: bool,
}

impl ConfigLoader {
    /// Creates a loader whose last layer is `overrides`.
    #[must_use]
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self {
            overrides,
            skip_env: false,
        }
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// A missing default config file is ignored; a missing file named with
    /// `--config` is an error.
    pub fn load(&self) -> Result<CliConfig, ConfigError> {
        let env = |name: &str| {
            if self.skip_env {
                None
            } else {
                std::env::var(name).ok()
            }
        };

        // The store directory decides where the default config file lives,
        // so resolve it from the upper layers first
        let store = self
            .overrides
            .store
            .clone()
            .or_else(|| env("ROLEGATE_STORE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));

        let mut config = match &self.overrides.config {
            Some(path) => load_file(path)?,
            None => {
                let path = store.join(CONFIG_FILE);
                if path.exists() {
                    load_file(&path)?
                } else {
                    CliConfig::default()
                }
            }
        };

        apply_env(&mut config, env)?;
        self.apply_overrides(&mut config);

        config
            .engine
            .validate()
            .map_err(|error| ConfigError::InvalidValue(error.to_string()))?;

        Ok(config)
    }

    fn apply_overrides(&self, config: &mut CliConfig) {
        if let Some(store) = &self.overrides.store {
            config.store = store.clone();
        }
        if let Some(program_id) = self.overrides.program_id {
            config.engine.program_id = program_id;
        }
        if let Some(log) = &self.overrides.log {
            config.log = log.clone();
        }
    }
}

fn load_file(path: &Path) -> Result<CliConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Applies `ROLEGATE_*` variables as looked up by `env`.
pub fn apply_env<Lookup>(config: &mut CliConfig, env: Lookup) -> Result<(), ConfigError>
where
    Lookup: Fn(&str) -> Option<String>,
{
    if let Some(store) = env("ROLEGATE_STORE") {
        config.store = PathBuf::from(store);
    }
    if let Some(program_id) = env("ROLEGATE_PROGRAM_ID") {
        config.engine.program_id =
            program_id
                .parse()
                .map_err(|error: rolegate_common::AddressParseError| {
                    ConfigError::InvalidEnvVar {
                        name: "ROLEGATE_PROGRAM_ID".into(),
                        message: error.to_string(),
                    }
                })?;
    }
    if let Some(log) = env("ROLEGATE_LOG") {
        config.log = log;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rolegate_program::default_program_id;

    use super::*;

    #[test]
    fn it_defaults_everything() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let config = ConfigLoader::new(ConfigOverrides {
            store: Some(tempdir.path().to_owned()),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load()?;

        assert_eq!(config.engine.program_id, default_program_id());
        assert_eq!(config.log, "warn");
        Ok(())
    }

    #[test]
    fn it_layers_file_env_and_flags() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let file_program = Address::from([1u8; 32]);
        let flag_program = Address::from([2u8; 32]);
        std::fs::write(
            tempdir.path().join(CONFIG_FILE),
            format!(r#"{{ "program_id": "{file_program}", "log": "info", "max_name_length": 16 }}"#),
        )?;

        let from_file = ConfigLoader::new(ConfigOverrides {
            store: Some(tempdir.path().to_owned()),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load()?;
        assert_eq!(from_file.engine.program_id, file_program);
        assert_eq!(from_file.engine.max_name_length, 16);
        assert_eq!(from_file.log, "info");

        let mut with_env = from_file.clone();
        let vars = HashMap::from([("ROLEGATE_LOG", "debug")]);
        apply_env(&mut with_env, |name| vars.get(name).map(|value| value.to_string()))?;
        assert_eq!(with_env.log, "debug");
        assert_eq!(with_env.engine.program_id, file_program);

        let with_flags = ConfigLoader::new(ConfigOverrides {
            store: Some(tempdir.path().to_owned()),
            program_id: Some(flag_program),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load()?;
        assert_eq!(with_flags.engine.program_id, flag_program);
        assert_eq!(with_flags.engine.max_name_length, 16);

        Ok(())
    }

    #[test]
    fn it_reports_a_bad_program_id_in_the_environment() {
        let mut config = CliConfig::default();
        let result = apply_env(&mut config, |name| {
            (name == "ROLEGATE_PROGRAM_ID").then(|| "not an address".to_owned())
        });

        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn it_rejects_an_oversized_name_limit() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("custom.json");
        std::fs::write(&path, r#"{ "max_name_length": 64 }"#)?;

        let result = ConfigLoader::new(ConfigOverrides {
            config: Some(path),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load();

        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
        Ok(())
    }

    #[test]
    fn it_requires_an_explicit_config_file_to_exist() {
        let result = ConfigLoader::new(ConfigOverrides {
            config: Some(PathBuf::from("/nonexistent/rolegate.json")),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load();

        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
