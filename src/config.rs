//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values like `PODLIFT_CLUSTER_TOKEN`.

use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::error::{ConfigError, Result};

/// Supported runtime backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Local single-host Podman engine (libpod REST API).
    #[default]
    Podman,
    /// Kubernetes-style cluster orchestrator.
    Cluster,
}

impl RuntimeKind {
    /// Backend name for logging and identification.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Podman => "podman",
            Self::Cluster => "cluster",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which runtime backend to operate against.
    pub runtime: RuntimeKind,
    /// Directory holding application template bundles.
    pub template_dir: String,
    pub podman: PodmanConfig,
    pub cluster: ClusterConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the local Podman engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PodmanConfig {
    /// Base URL of the libpod REST API, e.g. `http://127.0.0.1:8888`.
    pub api_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Connection settings for the cluster backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Base URL of the Kubernetes API server.
    pub api_url: String,
    pub namespace: String,
    /// Bearer token; overridden by `PODLIFT_CLUSTER_TOKEN` when set.
    pub token: Option<String>,
    pub insecure_skip_tls_verify: bool,
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: RuntimeKind::Podman,
            template_dir: "applications".into(),
            podman: PodmanConfig::default(),
            cluster: ClusterConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PodmanConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8888".into(),
            timeout_secs: 60,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            api_url: "https://127.0.0.1:6443".into(),
            namespace: "default".into(),
            token: None,
            insecure_skip_tls_verify: false,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("PODLIFT_CLUSTER_TOKEN") {
            if !token.is_empty() {
                self.cluster.token = Some(token);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.template_dir.is_empty() {
            return Err(ConfigError::MissingField {
                field: "template_dir",
            }
            .into());
        }

        Url::parse(&self.podman.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "podman.api_url",
            reason: e.to_string(),
        })?;
        Url::parse(&self.cluster.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "cluster.api_url",
            reason: e.to_string(),
        })?;

        if self.cluster.namespace.is_empty() {
            return Err(ConfigError::MissingField {
                field: "cluster.namespace",
            }
            .into());
        }

        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_podman() {
        let config = Config::default();
        assert_eq!(config.runtime, RuntimeKind::Podman);
        assert_eq!(config.runtime.as_str(), "podman");
    }

    #[test]
    fn parses_runtime_selection() {
        let config: Config = toml::from_str(
            r#"
            runtime = "cluster"

            [cluster]
            api_url = "https://api.example.com:6443"
            namespace = "models"
            "#,
        )
        .unwrap();

        assert_eq!(config.runtime, RuntimeKind::Cluster);
        assert_eq!(config.cluster.namespace, "models");
    }

    #[test]
    fn rejects_bad_api_url() {
        let config = Config {
            podman: PodmanConfig {
                api_url: "not a url".into(),
                ..PodmanConfig::default()
            },
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/podlift.toml").unwrap();
        assert_eq!(config.template_dir, "applications");
    }
}
