//! Kubernetes pod-API wire types and mapping into runtime-agnostic types.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::runtime::types::{
    Container, ContainerRef, ContainerStatus, HealthState, Pod, PodState,
};

#[derive(Debug, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<PodItem>,
}

#[derive(Debug, Deserialize)]
pub struct PodItem {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Option<PodSpec>,
    #[serde(default)]
    pub status: Option<PodStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    #[serde(default)]
    pub readiness_probe: Option<Probe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub container_port: u16,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(default)]
    pub initial_delay_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatusItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatusItem {
    pub name: String,
    #[serde(default)]
    pub container_id: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<ContainerStateItem>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerStateItem {
    #[serde(default)]
    pub running: Option<serde_json::Value>,
    #[serde(default)]
    pub waiting: Option<serde_json::Value>,
    #[serde(default)]
    pub terminated: Option<serde_json::Value>,
}

impl ContainerStateItem {
    fn status(&self) -> ContainerStatus {
        if self.running.is_some() {
            ContainerStatus::Running
        } else if self.terminated.is_some() {
            ContainerStatus::Terminated
        } else {
            ContainerStatus::Waiting
        }
    }
}

pub fn to_pod(item: &PodItem) -> Pod {
    let containers = item
        .status
        .as_ref()
        .map(|s| {
            s.container_statuses
                .iter()
                .map(|c| ContainerRef {
                    id: c.container_id.clone(),
                    name: c.name.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let ports = item
        .spec
        .as_ref()
        .map(|spec| {
            let mut ports: Vec<String> = spec
                .containers
                .iter()
                .flat_map(|c| c.ports.iter())
                .map(|p| {
                    let protocol = p.protocol.as_deref().unwrap_or("TCP").to_ascii_lowercase();
                    format!("{}/{protocol}", p.container_port)
                })
                .collect();
            ports.sort();
            ports
        })
        .unwrap_or_default();

    Pod {
        id: item.metadata.uid.clone(),
        name: item.metadata.name.clone(),
        state: item
            .status
            .as_ref()
            .map(|s| PodState::parse(&s.phase))
            .unwrap_or(PodState::Unknown(String::new())),
        labels: item.metadata.labels.clone(),
        containers,
        created: item.metadata.creation_timestamp,
        ports,
    }
}

/// Build a container view from a pod's status entry plus its spec.
///
/// The cluster has no standalone container inspect; readiness (`ready`)
/// doubles as the health signal, and the readiness probe's initial delay
/// plays the role of the health-check start period.
pub fn to_container(pod: &PodItem, status: &ContainerStatusItem) -> Container {
    let spec = pod
        .spec
        .as_ref()
        .and_then(|s| s.containers.iter().find(|c| c.name == status.name));

    let start_period = spec
        .and_then(|c| c.readiness_probe.as_ref())
        .and_then(|p| p.initial_delay_seconds)
        .map(Duration::from_secs);

    let container_status = status
        .state
        .as_ref()
        .map(ContainerStateItem::status)
        .unwrap_or(ContainerStatus::Waiting);

    let health = if status.ready {
        HealthState::Healthy
    } else if container_status.is_running() {
        HealthState::Starting
    } else {
        HealthState::Unset
    };

    Container {
        id: status.container_id.clone(),
        name: status.name.clone(),
        status: container_status,
        health,
        start_period,
        annotations: pod.metadata.annotations.clone(),
    }
}
