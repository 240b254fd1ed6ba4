//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `biomes-config.yaml`. This module
//! mirrors its structure in strongly-typed structs; every field has a
//! default so a partial (or empty) file is valid.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

use biomes_types::UpdateMode;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "BIOMES_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "biomes-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BiomesConfig {
    /// Request defaults.
    #[serde(default)]
    pub settings: Settings,

    /// Biome catalog entries.
    #[serde(default)]
    pub biomes: Vec<BiomeEntry>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BiomesConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Config file location: `$BIOMES_CONFIG`, else `biomes-config.yaml`.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }
}

/// Defaults applied to requests that do not specify them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// World name, used to build catalog unique IDs.
    #[serde(default = "default_world_name")]
    pub world_name: String,

    /// Update mode when a request names none.
    #[serde(default = "default_mode")]
    pub default_mode: UpdateMode,

    /// Chunk count / square side when a request names none.
    #[serde(default = "default_size")]
    pub default_size: i32,

    /// Whether biome costs are withdrawn.
    #[serde(default = "default_true")]
    pub withdraw_funds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_name: default_world_name(),
            default_mode: default_mode(),
            default_size: default_size(),
            withdraw_funds: true,
        }
    }
}

/// One biome in the catalog section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BiomeEntry {
    /// Biome type identifier, e.g. `DESERT`.
    pub biome: String,

    /// Display name. Defaults to the biome identifier.
    #[serde(default)]
    pub friendly_name: Option<String>,

    /// Description shown by the info listing.
    #[serde(default)]
    pub description: String,

    /// Tier the target must exceed.
    #[serde(default, alias = "islandLevel")]
    pub island_level: u64,

    /// Price of applying the biome.
    #[serde(default)]
    pub cost: Decimal,

    /// Permission node for self-service changes. Empty grants everyone.
    #[serde(default)]
    pub permission: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
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

fn default_world_name() -> String {
    "world".to_owned()
}

const fn default_mode() -> UpdateMode {
    UpdateMode::Island
}

const fn default_size() -> i32 {
    3
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BiomesConfig::default();
        assert_eq!(config.settings.default_mode, UpdateMode::Island);
        assert_eq!(config.settings.default_size, 3);
        assert!(config.settings.withdraw_funds);
        assert!(config.biomes.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = BiomesConfig::parse("{}").unwrap();
        assert_eq!(config, BiomesConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
settings:
  world_name: "skyblock"
  default_mode: square
  default_size: 9
  withdraw_funds: false

biomes:
  - biome: DESERT
    friendly_name: "Sandy Desert"
    description: "Hot and dry."
    islandLevel: 10
    cost: 250.5
    permission: "biomes.set.desert"
  - biome: JUNGLE

logging:
  level: debug
"#;
        let config = BiomesConfig::parse(yaml).unwrap();

        assert_eq!(config.settings.world_name, "skyblock");
        assert_eq!(config.settings.default_mode, UpdateMode::Square);
        assert_eq!(config.settings.default_size, 9);
        assert!(!config.settings.withdraw_funds);
        assert_eq!(config.biomes.len(), 2);

        let desert = config.biomes.first().unwrap();
        assert_eq!(desert.friendly_name.as_deref(), Some("Sandy Desert"));
        assert_eq!(desert.island_level, 10);
        assert_eq!(desert.cost, dec!(250.5));

        let jungle = config.biomes.get(1).unwrap();
        assert_eq!(jungle.friendly_name, None);
        assert_eq!(jungle.cost, Decimal::ZERO);
        assert!(jungle.permission.is_empty());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn unknown_update_mode_is_a_yaml_error() {
        let result = BiomesConfig::parse("settings:\n  default_mode: CIRCLE\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = BiomesConfig::from_file(Path::new("/nonexistent/biomes-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
