//! Environment overlay for client settings.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::ClientSettings;

pub const DEFAULT_ENV_PREFIX: &str = "RPC_CLIENT_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Reads `<PREFIX>ADDRESS`, `<PREFIX>CONNECTION_NAME` and `<PREFIX>DEFAULT_DEADLINE_MS`.
///
/// Unset or empty variables leave the corresponding setting untouched.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    prefix: String,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Overlay environment values onto `settings`.
    pub fn apply(&self, settings: &mut ClientSettings) -> Result<(), ConfigError> {
        if let Some(address) = self.get_var("ADDRESS") {
            settings.connectivity.address = address;
        }
        if let Some(name) = self.get_var("CONNECTION_NAME") {
            settings.connection_name = Some(name);
        }
        if let Some(raw) = self.get_var("DEFAULT_DEADLINE_MS") {
            let millis: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: self.key("DEFAULT_DEADLINE_MS"),
                value: raw.clone(),
            })?;
            settings.default_deadline = Some(Duration::from_millis(millis));
        }
        tracing::debug!(prefix = %self.prefix, ?settings, "applied environment settings");
        Ok(())
    }

    /// Default settings with the environment applied.
    pub fn load(&self) -> Result<ClientSettings, ConfigError> {
        let mut settings = ClientSettings::default();
        self.apply(&mut settings)?;
        Ok(settings)
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn get_var(&self, name: &str) -> Option<String> {
        env::var(self.key(name)).ok().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const PREFIX: &str = "RPC_CLIENT_UNIT_";

    fn clear_env() {
        for name in ["ADDRESS", "CONNECTION_NAME", "DEFAULT_DEADLINE_MS"] {
            env::remove_var(format!("{PREFIX}{name}"));
        }
    }

    #[test]
    #[serial]
    fn test_unset_env_keeps_defaults() {
        clear_env();
        let settings = SettingsLoader::with_prefix(PREFIX).load().unwrap();
        assert_eq!(settings.connectivity.address, crate::DEFAULT_ADDRESS);
        assert!(settings.connection_name.is_none());
    }

    #[test]
    #[serial]
    fn test_env_overlays_settings() {
        clear_env();
        env::set_var("RPC_CLIENT_UNIT_ADDRESS", "grpc://node2:2113");
        env::set_var("RPC_CLIENT_UNIT_CONNECTION_NAME", "billing");
        env::set_var("RPC_CLIENT_UNIT_DEFAULT_DEADLINE_MS", "1500");

        let settings = SettingsLoader::with_prefix(PREFIX).load().unwrap();
        assert_eq!(settings.connectivity.address, "grpc://node2:2113");
        assert_eq!(settings.connection_name.as_deref(), Some("billing"));
        assert_eq!(settings.default_deadline, Some(Duration::from_millis(1500)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_deadline() {
        clear_env();
        env::set_var("RPC_CLIENT_UNIT_DEFAULT_DEADLINE_MS", "soon");

        let err = SettingsLoader::with_prefix(PREFIX).load().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "RPC_CLIENT_UNIT_DEFAULT_DEADLINE_MS".into(),
                value: "soon".into(),
            }
        );
        clear_env();
    }
}
