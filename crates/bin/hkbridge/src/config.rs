//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `hkbridge.toml` in the working directory unless `--config`
//! points elsewhere. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};

use hkbridge_app::settings::BridgeSettings;
use hkbridge_domain::bridge::BridgeConfig;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::filter::EntityFilter;
use serde::{Deserialize, Serialize};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "hkbridge.toml";

/// Integrations whose entities are never exposed unless the user says otherwise.
const STOCK_EXCLUDED_INTEGRATIONS: &[&str] = &[
    "unifi",
    "unifiprotect",
    "alexa_media",
    "frigate",
    "sonos",
    "stateful_scenes",
    "nest_protect",
    "adguard",
    "pura",
    "spook",
    "rachio",
    "litterrobot",
    "bambu_lab",
    "teslemetry",
    "wake_on_lan",
    "synology_dsm",
    "hacs",
];

/// Govee light segments (`_segment_001`, `_segment_002`, …).
const STOCK_EXCLUDED_PATTERNS: &[&str] = &[r"_segment_\d{3}"];

/// Top-level configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform installation settings.
    pub homeassistant: HomeAssistantConfig,
    /// Where generated artifacts are written.
    pub output: OutputConfig,
    /// Entity exclusions.
    pub filters: FiltersConfig,
    /// Bridge declarations, first match wins.
    pub bridges: Vec<BridgeConfig>,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Platform installation and service settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Configuration directory holding `.storage`.
    pub config_path: PathBuf,
    /// systemd unit running the platform.
    pub service: String,
    /// Prefix `systemctl` calls with `sudo`.
    pub use_sudo: bool,
}

/// Output artifact settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `homekit_mapping.json`.
    pub dir: PathBuf,
}

/// Exclusion lists applied to every candidate entity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub excluded_integrations: Vec<String>,
    /// Regular expressions searched anywhere in the entity id.
    pub excluded_patterns: Vec<String>,
    pub ignored_entities: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// bridges or patterns it declares are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HKBRIDGE_HA_CONFIG_PATH") {
            self.homeassistant.config_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("HKBRIDGE_HA_SERVICE") {
            self.homeassistant.service = val;
        }
        if let Some(val) = lookup("HKBRIDGE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("HKBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.homeassistant.service.trim().is_empty() {
            return Err(ConfigError::Validation(
                "homeassistant.service must not be empty".to_string(),
            ));
        }
        self.settings().map(|_| ()).map_err(ConfigError::Settings)
    }

    /// Build the immutable settings handed to the services.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] for duplicate or empty bridge
    /// names and for patterns that do not compile.
    pub fn settings(&self) -> Result<BridgeSettings, HkBridgeError> {
        let filter = EntityFilter::new(
            self.filters.ignored_entities.iter().cloned(),
            self.filters.excluded_integrations.iter().cloned(),
            &self.filters.excluded_patterns,
        )?;
        BridgeSettings::new(self.bridges.clone(), filter)
    }

    /// The configuration written by `init`: defaults plus two sample bridges.
    #[must_use]
    pub fn example() -> Self {
        Self {
            bridges: vec![
                BridgeConfig::new("First Floor", ["Kitchen", "Living Room", "Family Room"]),
                BridgeConfig::new("Second Floor", ["Master Bedroom", "Kids Bedroom", "Bathroom"]),
            ],
            ..Self::default()
        }
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("/srv/HA/ha-config"),
            service: "home-assistant@homeassistant".to_string(),
            use_sudo: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            excluded_integrations: STOCK_EXCLUDED_INTEGRATIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            excluded_patterns: STOCK_EXCLUDED_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            ignored_entities: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hkbridge=info,hkbridge_app=info,hkbridge_adapter_storage_fs=info,hkbridge_adapter_systemctl=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// TOML rendering failure.
    #[error("failed to render config file")]
    Serialize(#[from] toml::ser::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Bridges or filters rejected by the domain.
    #[error("invalid configuration")]
    Settings(#[source] HkBridgeError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use hkbridge_domain::error::ValidationError;

    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(
            config.homeassistant.config_path,
            PathBuf::from("/srv/HA/ha-config")
        );
        assert_eq!(config.homeassistant.service, "home-assistant@homeassistant");
        assert!(config.homeassistant.use_sudo);
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert!(config.bridges.is_empty());
    }

    #[test]
    fn should_carry_stock_exclusions_by_default() {
        let config = Config::default();
        assert!(
            config
                .filters
                .excluded_integrations
                .contains(&"unifi".to_string())
        );
        assert_eq!(config.filters.excluded_integrations.len(), 17);
        assert_eq!(config.filters.excluded_patterns, [r"_segment_\d{3}"]);
        assert!(config.filters.ignored_entities.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.homeassistant.service, "home-assistant@homeassistant");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r"
            [homeassistant]
            config_path = '/config'
            service = 'hass'
            use_sudo = false

            [output]
            dir = 'out'

            [filters]
            excluded_integrations = ['unifi']
            excluded_patterns = ['_segment_\d{3}', '^switch\.test_']
            ignored_entities = ['switch.garage']

            [[bridges]]
            name = 'First Floor'
            areas = ['Kitchen', 'Living Room']

            [[bridges]]
            name = 'Garage'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.homeassistant.config_path, PathBuf::from("/config"));
        assert_eq!(config.homeassistant.service, "hass");
        assert!(!config.homeassistant.use_sudo);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.filters.excluded_integrations, ["unifi"]);
        assert_eq!(config.filters.excluded_patterns.len(), 2);
        assert_eq!(config.filters.ignored_entities, ["switch.garage"]);
        assert_eq!(config.bridges.len(), 2);
        assert_eq!(config.bridges[0].areas, ["Kitchen", "Living Room"]);
        assert!(config.bridges[1].areas.is_empty());
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [homeassistant]
            service = 'hass'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.homeassistant.service, "hass");
        assert_eq!(
            config.homeassistant.config_path,
            PathBuf::from("/srv/HA/ha-config")
        );
        assert_eq!(config.filters.excluded_integrations.len(), 17);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("."));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_env_overrides_over_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("HKBRIDGE_HA_CONFIG_PATH", "/other"),
            ("HKBRIDGE_HA_SERVICE", "hass"),
            ("HKBRIDGE_OUTPUT_DIR", "/tmp/out"),
            ("HKBRIDGE_LOG", "warn"),
        ]);
        let mut config = Config::default();

        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.homeassistant.config_path, PathBuf::from("/other"));
        assert_eq!(config.homeassistant.service, "hass");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_hkbridge_log() {
        let env: HashMap<&str, &str> =
            HashMap::from([("HKBRIDGE_LOG", "warn"), ("RUST_LOG", "trace")]);
        let mut config = Config::default();

        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_duplicate_bridge_names() {
        let config = Config {
            bridges: vec![
                BridgeConfig::new("Upstairs", ["Bedroom"]),
                BridgeConfig::new("Upstairs", ["Office"]),
            ],
            ..Config::default()
        };

        let err = config.validate().unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Settings(HkBridgeError::Validation(
                ValidationError::DuplicateBridgeName(_)
            ))
        ));
    }

    #[test]
    fn should_reject_invalid_pattern() {
        let mut config = Config::default();
        config.filters.excluded_patterns = vec!["(unclosed".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Settings(HkBridgeError::Validation(
                ValidationError::InvalidPattern { .. }
            )))
        ));
    }

    #[test]
    fn should_reject_empty_service_name() {
        let mut config = Config::default();
        config.homeassistant.service = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_render_example_that_parses_back() {
        let rendered = Config::example().to_toml().unwrap();

        let parsed: Config = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.bridges.len(), 2);
        assert_eq!(parsed.bridges[0].name, "First Floor");
        assert_eq!(parsed.filters.excluded_patterns, [r"_segment_\d{3}"]);
        assert!(parsed.validate().is_ok());
    }
}
