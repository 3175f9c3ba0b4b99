// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Context;
use serde::{de::Error as _, Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

use crate::constants::{deployment, OPERATOR_NAME};
use crate::error::{Result, TendoError};

/// Operator configuration loaded from a YAML file with environment overrides
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_app_name", alias = "APP_NAME")]
    pub app_name: String,
    /// `Production` switches logging to JSON at info level
    #[serde(default = "default_app_mode", alias = "APP_MODE")]
    pub app_mode: String,
    #[serde(default = "default_app_host", alias = "APP_HOST")]
    pub app_host: String,
    #[serde(
        default = "default_app_port",
        alias = "APP_PORT",
        deserialize_with = "string_or_number"
    )]
    pub app_port: String,
    /// Seconds between two reconciliation ticks
    pub watch_interval: u64,
    pub watch_targets: Vec<WatchTarget>,
    #[serde(default)]
    pub deployment: DeploymentSettings,
}

/// One secret kept in sync with one Tencent Cloud certificate
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchTarget {
    pub secret_name: String,
    pub secret_namespace: String,
    pub opaque_secret_name: String,
    #[serde(default, rename = "certificateID", alias = "certificateId")]
    pub certificate_id: Option<String>,
    pub certificate_name: String,
    pub certificate_region: String,
    #[serde(default)]
    pub certificate_resource_types: Vec<ResourceBinding>,
}

impl WatchTarget {
    /// The configured certificate id, if one is set
    pub fn known_certificate_id(&self) -> Option<&str> {
        self.certificate_id.as_deref().filter(|id| !id.is_empty())
    }

    /// `namespace/name` of the watched TLS secret
    pub fn secret_ref(&self) -> String {
        format!("{}/{}", self.secret_namespace, self.secret_name)
    }
}

/// A resource type that has to pick up the new certificate, and where
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResourceBinding {
    pub name: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

/// How the deploy status of an updated certificate is polled
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_seconds: u64,
    /// Unbounded when absent
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            settle_delay_seconds: default_settle_delay(),
            max_attempts: None,
        }
    }
}

impl DeploymentSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_seconds)
    }
}

fn default_app_name() -> String {
    OPERATOR_NAME.to_string()
}

fn default_app_mode() -> String {
    "Development".to_string()
}

fn default_app_host() -> String {
    "127.0.0.1".to_string()
}

fn default_app_port() -> String {
    "8085".to_string()
}

fn default_poll_interval() -> u64 {
    deployment::POLL_INTERVAL_SECS
}

fn default_settle_delay() -> u64 {
    deployment::SETTLE_DELAY_SECS
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or a number, found {:?}",
            other
        ))),
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("error reading config file {}", path.display()))?;

        Self::from_yaml(&contents, |key| std::env::var(key).ok())
            .with_context(|| format!("error loading config file {}", path.display()))
    }

    /// Parse and validate a YAML document, resolving overrides through `lookup`
    pub fn from_yaml<F>(contents: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = serde_yaml::from_str(contents)
            .map_err(|e| TendoError::Config(format!("unable to parse config: {}", e)))?;

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            ("APP_NAME", &mut self.app_name),
            ("APP_MODE", &mut self.app_mode),
            ("APP_HOST", &mut self.app_host),
            ("APP_PORT", &mut self.app_port),
        ];

        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.watch_interval == 0 {
            return Err(TendoError::Config(
                "watchInterval must be greater than zero".to_string(),
            ));
        }

        if self.watch_targets.is_empty() {
            return Err(TendoError::Config(
                "at least one watch target is required".to_string(),
            ));
        }

        if self.deployment.poll_interval_seconds == 0 {
            return Err(TendoError::Config(
                "deployment.pollIntervalSeconds must be greater than zero".to_string(),
            ));
        }

        self.app_port.parse::<u16>().map_err(|e| {
            TendoError::Config(format!("invalid APP_PORT '{}': {}", self.app_port, e))
        })?;

        for (index, target) in self.watch_targets.iter().enumerate() {
            let required = [
                ("secretName", &target.secret_name),
                ("secretNamespace", &target.secret_namespace),
                ("opaqueSecretName", &target.opaque_secret_name),
                ("certificateName", &target.certificate_name),
                ("certificateRegion", &target.certificate_region),
            ];

            if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
                return Err(TendoError::Config(format!(
                    "watch target {} is missing {}",
                    index, field
                )));
            }
        }

        Ok(())
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }

    pub fn is_production(&self) -> bool {
        self.app_mode == "Production"
    }
}
