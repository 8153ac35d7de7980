//! Application configuration management.
//!
//! This module handles loading the gateway configuration: where to listen,
//! how to reach the Service Layer, and which credentials to log in with.
//!
//! Configuration is read from `$ERPGATE_CONFIG`, or from
//! `~/.config/erpgate/config.json` when that variable is unset. Environment
//! variables (typically loaded from `.env`) override individual settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;

/// Application name used for the config directory path
const APP_NAME: &str = "erpgate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming an explicit config file
const CONFIG_PATH_ENV: &str = "ERPGATE_CONFIG";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;
const DEFAULT_HANDLER_LIFETIME_MINUTES: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub service_layer: ServiceLayerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            service_layer: ServiceLayerConfig::default(),
        }
    }
}

/// Connection settings for the Service Layer.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLayerConfig {
    pub base_url: String,
    pub company_db: String,
    pub user_name: String,
    pub password: String,
    /// Accept any server certificate. Never enable outside diagnostics.
    pub ignore_tls_errors: bool,
    pub request_timeout_secs: u64,
    pub handler_lifetime_minutes: u64,
    /// Warehouse applied to every sales order line.
    pub default_warehouse_code: Option<String>,
}

impl Default for ServiceLayerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            company_db: String::new(),
            user_name: String::new(),
            password: String::new(),
            ignore_tls_errors: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            handler_lifetime_minutes: DEFAULT_HANDLER_LIFETIME_MINUTES,
            default_warehouse_code: None,
        }
    }
}

impl fmt::Debug for ServiceLayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLayerConfig")
            .field("base_url", &self.base_url)
            .field("company_db", &self.company_db)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("ignore_tls_errors", &self.ignore_tls_errors)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("handler_lifetime_minutes", &self.handler_lifetime_minutes)
            .field("default_warehouse_code", &self.default_warehouse_code)
            .finish()
    }
}

impl ServiceLayerConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.company_db, &self.user_name, &self.password)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connection_lifetime(&self) -> Duration {
        Duration::from_secs(self.handler_lifetime_minutes.saturating_mul(60))
    }
}

impl Config {
    /// Load the config file (if any), apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        let (path, explicit) = Self::config_path()?;
        let mut config = Self::read_file(&path, explicit)?;

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, falling back to defaults when it is absent and not `required`.
    fn read_file(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                bail!(
                    "Config file {} named by {} does not exist",
                    path.display(),
                    CONFIG_PATH_ENV
                );
            }
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Returns the config file path and whether it was named explicitly.
    fn config_path() -> Result<(PathBuf, bool)> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Ok((PathBuf::from(explicit), true));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok((config_dir.join(APP_NAME).join(CONFIG_FILE), false))
    }

    /// Apply `ERPGATE_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sl = &mut self.service_layer;

        if let Some(v) = lookup("ERPGATE_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = lookup("ERPGATE_SL_BASE_URL") {
            sl.base_url = v;
        }
        if let Some(v) = lookup("ERPGATE_SL_COMPANY_DB") {
            sl.company_db = v;
        }
        if let Some(v) = lookup("ERPGATE_SL_USERNAME") {
            sl.user_name = v;
        }
        if let Some(v) = lookup("ERPGATE_SL_PASSWORD") {
            sl.password = v;
        }
        if let Some(v) = lookup("ERPGATE_SL_IGNORE_TLS_ERRORS") {
            sl.ignore_tls_errors = parse_bool(&v)
                .with_context(|| "Invalid ERPGATE_SL_IGNORE_TLS_ERRORS")?;
        }
        if let Some(v) = lookup("ERPGATE_SL_TIMEOUT_SECS") {
            sl.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid ERPGATE_SL_TIMEOUT_SECS '{}'", v))?;
        }
        if let Some(v) = lookup("ERPGATE_SL_HANDLER_LIFETIME_MINUTES") {
            sl.handler_lifetime_minutes = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid ERPGATE_SL_HANDLER_LIFETIME_MINUTES '{}'", v))?;
        }
        if let Some(v) = lookup("ERPGATE_SL_DEFAULT_WAREHOUSE") {
            let v = v.trim();
            sl.default_warehouse_code = (!v.is_empty()).then(|| v.to_string());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let sl = &self.service_layer;
        for (name, value) in [
            ("base_url", &sl.base_url),
            ("company_db", &sl.company_db),
            ("user_name", &sl.user_name),
            ("password", &sl.password),
        ] {
            if value.trim().is_empty() {
                bail!("service_layer.{} is not configured", name);
            }
        }
        if sl.request_timeout_secs == 0 {
            bail!("service_layer.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Config {
        let mut config = Config::default();
        config.service_layer.base_url = "https://sap:50000/b1s/v1".to_string();
        config.service_layer.company_db = "SBODEMOGB".to_string();
        config.service_layer.user_name = "manager".to_string();
        config.service_layer.password = "pw".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.service_layer.request_timeout(), Duration::from_secs(100));
        assert_eq!(config.service_layer.connection_lifetime(), Duration::from_secs(1800));
        assert!(!config.service_layer.ignore_tls_errors);
    }

    #[test]
    fn test_parse_partial_file() {
        let json = r#"{"service_layer": {"base_url": "https://sap/b1s/v1", "default_warehouse_code": "01"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.service_layer.base_url, "https://sap/b1s/v1");
        assert_eq!(config.service_layer.default_warehouse_code.as_deref(), Some("01"));
        assert_eq!(config.service_layer.request_timeout_secs, 100);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ERPGATE_LISTEN_ADDR", "0.0.0.0:9000"),
            ("ERPGATE_SL_PASSWORD", "from-env"),
            ("ERPGATE_SL_IGNORE_TLS_ERRORS", "true"),
            ("ERPGATE_SL_TIMEOUT_SECS", "15"),
            ("ERPGATE_SL_DEFAULT_WAREHOUSE", " 02 "),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.service_layer.password, "from-env");
        assert!(config.service_layer.ignore_tls_errors);
        assert_eq!(config.service_layer.request_timeout_secs, 15);
        assert_eq!(config.service_layer.default_warehouse_code.as_deref(), Some("02"));
        // Untouched values survive
        assert_eq!(config.service_layer.company_db, "SBODEMOGB");
    }

    #[test]
    fn test_env_override_rejects_bad_numbers() {
        let mut config = complete();
        let err = config
            .apply_overrides(|k| (k == "ERPGATE_SL_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ERPGATE_SL_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate() {
        assert!(complete().validate().is_ok());

        let mut missing = complete();
        missing.service_layer.password = "  ".to_string();
        let err = missing.validate().unwrap_err();
        assert!(err.to_string().contains("password"));

        let mut zero = complete();
        zero.service_layer.request_timeout_secs = 0;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let dbg = format!("{:?}", complete().service_layer);
        assert!(dbg.contains("SBODEMOGB"));
        assert!(!dbg.contains("\"pw\""));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_huge_handler_lifetime_saturates() {
        let mut config = complete();
        config
            .apply_overrides(|k| {
                (k == "ERPGATE_SL_HANDLER_LIFETIME_MINUTES").then(|| u64::MAX.to_string())
            })
            .unwrap();
        assert_eq!(
            config.service_layer.connection_lifetime(),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let path = std::env::temp_dir().join("erpgate-no-such-dir").join("config.json");

        let err = Config::read_file(&path, true).unwrap_err();
        assert!(err.to_string().contains("erpgate-no-such-dir"));
        assert!(err.to_string().contains(CONFIG_PATH_ENV));

        let config = Config::read_file(&path, false).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
