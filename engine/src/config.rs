//! Configuration file management.
//!
//! Configuration is loaded from TOML files, but all configuration values have sensible defaults.
//!
//! When adding a section to the configuration, ensure that
//!
//! * it has an entry in the root configuration [`Config`](struct.Config.html),
//! * `Default` is implemented (derived or manually) with sensible defaults,
//! * it is annotated with `#[serde(deny_unknown_fields)]` to ensure config files contain valid
//!   keys.

use std::{fs, path::Path};

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use multi_staking_types::{multi_staking::DEFAULT_MODULE_NAME, U512};

use crate::logging::LoggingConfig;

/// Default lower bound on the locked amount of a single request.
pub const DEFAULT_MINIMUM_DELEGATION_AMOUNT: u64 = 1;

/// Root configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Multi-staking engine configuration.
    pub multi_staking: EngineConfig,
}

/// Multi-staking engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Module name mixed into derived intermediary accounts.
    ///
    /// Changing it on a live chain derives different accounts for new delegators only.
    pub module_name: String,
    /// Smallest locked amount a delegate, redelegate or undelegate request may carry.
    pub minimum_delegation_amount: U512,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            minimum_delegation_amount: U512::from(DEFAULT_MINIMUM_DELEGATION_AMOUNT),
        }
    }
}

/// Loads a TOML-formatted configuration from a given file.
pub fn load_from_file<P: AsRef<Path>, C: DeserializeOwned>(config_path: P) -> anyhow::Result<C> {
    let path_ref = config_path.as_ref();
    let config: C = toml::from_slice(
        &fs::read(path_ref).with_context(|| "failed to read configuration file")?,
    )
    .with_context(|| format!("Failed to parse configuration file {}", path_ref.display()))?;
    Ok(config)
}

/// Creates a TOML-formatted string from a given configuration.
pub fn to_string<C: Serialize>(cfg: &C) -> anyhow::Result<String> {
    toml::to_string_pretty(cfg).with_context(|| "Failed to serialize default configuration")
}
