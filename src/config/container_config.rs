use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

/// Environment variable overriding [`ContainerConfig::duplicate_policy`]
pub const ENV_DUPLICATE_POLICY: &str = "GITSTARS_DUPLICATE_POLICY";
/// Environment variable overriding [`ContainerConfig::validate_on_freeze`]
pub const ENV_VALIDATE_ON_FREEZE: &str = "GITSTARS_VALIDATE_ON_FREEZE";

/// What `Registry::register` does when the capability key already exists
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateRegistration`
    #[default]
    Reject,
    /// Replace the earlier registration
    Overwrite,
}

impl DuplicatePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(DuplicatePolicy::Reject),
            "overwrite" => Some(DuplicatePolicy::Overwrite),
            _ => None,
        }
    }
}

/// Configuration for the service registry
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Walk declared constructor dependencies on freeze, rejecting cycles and
    /// missing capabilities before the first resolution
    #[serde(default = "default_validate_on_freeze")]
    pub validate_on_freeze: bool,
}

/// Partial container configuration as written in TOML
#[derive(Deserialize, Debug, Default)]
pub struct PartialContainerConfig {
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub validate_on_freeze: Option<bool>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            validate_on_freeze: default_validate_on_freeze(),
        }
    }
}

impl ContainerConfig {
    /// Parse a TOML document; missing fields fall back to defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let partial: PartialContainerConfig =
            toml::from_str(source).map_err(ConfigError::TomlParse)?;
        Self::from_partial_and_env(Some(partial), HashMap::new())
    }

    /// Merge partial config with environment overrides (environment wins)
    pub fn from_partial_and_env(
        partial: Option<PartialContainerConfig>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();
        let mut config = Self {
            duplicate_policy: partial.duplicate_policy.unwrap_or_default(),
            validate_on_freeze: partial
                .validate_on_freeze
                .unwrap_or_else(default_validate_on_freeze),
        };

        if let Some(value) = env_map.get(ENV_DUPLICATE_POLICY) {
            config.duplicate_policy =
                DuplicatePolicy::parse(value).ok_or_else(|| ConfigError::InvalidEnv {
                    var: ENV_DUPLICATE_POLICY,
                    value: value.clone(),
                })?;
        }

        if let Some(value) = env_map.get(ENV_VALIDATE_ON_FREEZE) {
            config.validate_on_freeze =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_VALIDATE_ON_FREEZE,
                    value: value.clone(),
                })?;
        }

        Ok(config)
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_partial_and_env(None, collect_env_vars())
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    [ENV_DUPLICATE_POLICY, ENV_VALIDATE_ON_FREEZE]
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
        .collect()
}

fn default_validate_on_freeze() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_container_config() {
        let config = ContainerConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.validate_on_freeze);
    }

    #[test]
    fn test_from_toml_str() {
        let config = ContainerConfig::from_toml_str("duplicate_policy = \"overwrite\"").unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert!(config.validate_on_freeze); // default

        let empty = ContainerConfig::from_toml_str("").unwrap();
        assert_eq!(empty, ContainerConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = ContainerConfig::from_toml_str("duplicate_policy = \"sometimes\"");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_env_overrides_partial() {
        let partial = PartialContainerConfig {
            duplicate_policy: Some(DuplicatePolicy::Reject),
            validate_on_freeze: Some(true),
        };
        let env_map = HashMap::from([
            (ENV_DUPLICATE_POLICY.to_string(), "Overwrite".to_string()),
            (ENV_VALIDATE_ON_FREEZE.to_string(), "false".to_string()),
        ]);

        let config = ContainerConfig::from_partial_and_env(Some(partial), env_map).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert!(!config.validate_on_freeze);
    }

    #[test]
    fn test_invalid_env_value() {
        let env_map = HashMap::from([(ENV_VALIDATE_ON_FREEZE.to_string(), "maybe".to_string())]);
        let result = ContainerConfig::from_partial_and_env(None, env_map);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                var: ENV_VALIDATE_ON_FREEZE,
                ..
            })
        ));
    }
}
