//! Application configuration
//!
//! Loaded from `lodgekeep.toml` in the platform config directory.
//! Every key has a default so a missing file is a valid configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use lodgekeep_core::DiscountPolicy;
use serde::Deserialize;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Credentials for the seeded admin account
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file path; platform data directory when unset
    pub database_path: Option<PathBuf>,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// One-time code lifetime in minutes
    pub otp_expiration_minutes: i64,
    /// Root directory for the local media store; platform data
    /// directory when unset
    pub media_root: Option<PathBuf>,
    /// Discount association policy
    pub discount_policy: DiscountPolicy,
    /// Admin account seeded at startup, if configured
    pub admin: Option<AdminSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            session_ttl_hours: 24 * 7,
            otp_expiration_minutes: 5,
            media_root: None,
            discount_policy: DiscountPolicy::Owned,
            admin: None,
        }
    }
}

impl AppConfig {
    /// Load from the platform config path; defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "lodgekeep", "lodgekeep")
            .map(|dirs| dirs.config_dir().join("lodgekeep.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.session_ttl_hours, 168);
        assert_eq!(config.otp_expiration_minutes, 5);
        assert_eq!(config.discount_policy, DiscountPolicy::Owned);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lodgekeep.toml");
        std::fs::write(
            &path,
            r#"
                session_ttl_hours = 24
                discount_policy = "referenced"

                [admin]
                name = "Admin"
                email = "admin@example.com"
                password = "changeme123"
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.discount_policy, DiscountPolicy::Referenced);
        assert_eq!(config.admin.unwrap().email, "admin@example.com");
        // Unset keys keep their defaults
        assert_eq!(config.otp_expiration_minutes, 5);
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lodgekeep.toml");
        std::fs::write(&path, "session_ttl_hours = \"not a number\"").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
