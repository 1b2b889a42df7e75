//! Runtime-agnostic pod and container types.
//!
//! Both backends map their wire formats into these types; nothing above the
//! [`RuntimeBackend`](super::RuntimeBackend) seam ever sees backend-specific
//! payloads.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Label identifying which application a pod belongs to.
pub const APPLICATION_LABEL: &str = "podlift.io/application";

/// Annotation opting a container's pod out of automatic start.
pub const AUTOSTART_ANNOTATION: &str = "podlift.io/autostart";

/// Annotation value that disables automatic start.
pub const AUTOSTART_OFF: &str = "never";

/// A container image known to the runtime.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub repo_digests: Vec<String>,
}

/// Lifecycle state of a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodState {
    Created,
    Pending,
    Running,
    Degraded,
    Paused,
    Stopped,
    Exited,
    /// Any state this crate does not model; carries the raw value.
    Unknown(String),
}

impl PodState {
    /// Parse a backend-reported state string, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "pending" => Self::Pending,
            "running" => Self::Running,
            "degraded" => Self::Degraded,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            "exited" => Self::Exited,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Degraded => "Degraded",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Exited => "Exited",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for PodState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container entry as listed inside a pod.
#[derive(Debug, Clone)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

/// A pod as reported by the runtime.
#[derive(Debug, Clone)]
pub struct Pod {
    pub id: String,
    pub name: String,
    pub state: PodState,
    pub labels: HashMap<String, String>,
    pub containers: Vec<ContainerRef>,
    pub created: Option<DateTime<Utc>>,
    /// Host-facing port bindings, already rendered (e.g. `8080/tcp`).
    pub ports: Vec<String>,
}

impl Pod {
    /// Application this pod belongs to, when labelled.
    #[must_use]
    pub fn application(&self) -> Option<&str> {
        self.labels.get(APPLICATION_LABEL).map(String::as_str)
    }
}

/// Runtime status of a container process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Waiting,
    Terminated,
    Unknown(String),
}

impl ContainerStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "waiting" | "created" | "initialized" | "paused" => Self::Waiting,
            "terminated" | "exited" | "stopped" | "dead" => Self::Terminated,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Waiting => "waiting",
            Self::Terminated => "terminated",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Health signal reported by a container's health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Starting,
    /// No health check configured, or no result reported yet.
    Unset,
}

impl HealthState {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "healthy" => Self::Healthy,
            "unhealthy" => Self::Unhealthy,
            "starting" => Self::Starting,
            _ => Self::Unset,
        }
    }
}

/// Detailed container view returned by `inspect_container`.
#[derive(Debug, Clone)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub status: ContainerStatus,
    pub health: HealthState,
    /// Configured health-check start period. `None` means no health check.
    pub start_period: Option<Duration>,
    pub annotations: HashMap<String, String>,
}

impl Container {
    /// Whether this container counts as ready for pod health aggregation.
    ///
    /// A running container with no health signal counts ready; any
    /// non-running status does not.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status.is_running() && matches!(self.health, HealthState::Healthy | HealthState::Unset)
    }

    /// Human-facing status: the raw status for non-running containers, the
    /// health signal otherwise.
    #[must_use]
    pub fn effective_status(&self) -> &str {
        if !self.status.is_running() {
            return self.status.as_str();
        }
        match self.health {
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
            HealthState::Starting => "starting",
            HealthState::Unset => "ready",
        }
    }
}

/// Label filters passed to list operations.
#[derive(Debug, Clone, Default)]
pub struct LabelFilters {
    labels: Vec<(String, String)>,
}

impl LabelFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on pods belonging to the given application.
    #[must_use]
    pub fn application(name: &str) -> Self {
        Self::new().with_label(APPLICATION_LABEL, name)
    }

    #[must_use]
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `key=value` selector terms.
    #[must_use]
    pub fn selector_terms(&self) -> Vec<String> {
        self.labels.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}
