use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Credentials, DeviceIdentity};
use crate::{Error, Result};

pub const DEFAULT_NAME: &str = "Terneo";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Settings for one thermostat, as a consumer would store them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub serial: String,
    pub host: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl DeviceConfig {
    pub fn new(serial: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            host: host.into(),
            name: default_name(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial.trim().is_empty() {
            return Err(Error::Configuration("serial must not be empty".into()));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Configuration("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::Configuration("port must be between 1 and 65535".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Configuration("timeout_ms must be >= 1".into()));
        }
        if self.username().is_some() != self.password().is_some() {
            return Err(Error::Configuration(
                "username and password must be given together".into(),
            ));
        }
        Ok(())
    }

    /// Username, with an empty string counting as not set.
    fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Validate and produce the immutable device identity.
    pub fn identity(&self) -> Result<DeviceIdentity> {
        self.validate()?;
        let credentials = match (self.username(), self.password()) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        };
        Ok(DeviceIdentity {
            serial: self.serial.clone(),
            host: self.host.clone(),
            port: self.port,
            credentials,
        })
    }
}
