//! libpod REST API wire types and mapping into runtime-agnostic types.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::runtime::types::{
    Container, ContainerRef, ContainerStatus, HealthState, Image, Pod, PodState,
};

#[derive(Debug, Deserialize)]
pub struct ImageSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RepoTags", default)]
    pub repo_tags: Vec<String>,
    #[serde(rename = "RepoDigests", default)]
    pub repo_digests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPodsReport {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Labels", default)]
    pub labels: HashMap<String, String>,
    #[serde(rename = "Containers", default)]
    pub containers: Vec<ListPodContainer>,
    #[serde(rename = "Created", default)]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ListPodContainer {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Names", default)]
    pub names: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListContainer {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Names", default)]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayKubeReport {
    #[serde(rename = "Pods", default)]
    pub pods: Vec<PlayKubePod>,
}

#[derive(Debug, Deserialize)]
pub struct PlayKubePod {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Containers", default)]
    pub containers: Vec<String>,
    #[serde(rename = "ContainerErrors", default)]
    pub container_errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InspectPodData {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Labels", default)]
    pub labels: HashMap<String, String>,
    #[serde(rename = "Containers", default)]
    pub containers: Vec<InspectPodContainer>,
    #[serde(rename = "Created", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "InfraConfig", default)]
    pub infra_config: Option<InspectPodInfraConfig>,
}

#[derive(Debug, Deserialize)]
pub struct InspectPodContainer {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InspectPodInfraConfig {
    #[serde(rename = "PortBindings", default)]
    pub port_bindings: Option<HashMap<String, Option<Vec<PortBinding>>>>,
}

#[derive(Debug, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

#[derive(Debug, Deserialize)]
pub struct InspectContainerData {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State", default)]
    pub state: Option<InspectContainerState>,
    #[serde(rename = "Config", default)]
    pub config: Option<InspectContainerConfig>,
}

#[derive(Debug, Deserialize)]
pub struct InspectContainerState {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Health", default)]
    pub health: Option<HealthCheckResults>,
}

#[derive(Debug, Deserialize)]
pub struct HealthCheckResults {
    #[serde(rename = "Status", default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct InspectContainerConfig {
    #[serde(rename = "Healthcheck", default)]
    pub healthcheck: Option<HealthCheckConfig>,
    #[serde(rename = "Annotations", default)]
    pub annotations: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct HealthCheckConfig {
    /// Grace window before health failures count, in nanoseconds.
    #[serde(rename = "StartPeriod", default)]
    pub start_period: u64,
}

impl From<ImageSummary> for Image {
    fn from(summary: ImageSummary) -> Self {
        Self {
            id: summary.id,
            repo_tags: summary.repo_tags,
            repo_digests: summary.repo_digests,
        }
    }
}

impl From<ListPodsReport> for Pod {
    fn from(report: ListPodsReport) -> Self {
        Self {
            id: report.id,
            name: report.name,
            state: PodState::parse(&report.status),
            labels: report.labels,
            containers: report
                .containers
                .into_iter()
                .map(|c| ContainerRef {
                    id: c.id,
                    name: c.names,
                })
                .collect(),
            created: report.created,
            ports: Vec::new(),
        }
    }
}

impl From<InspectPodData> for Pod {
    fn from(data: InspectPodData) -> Self {
        let ports = data
            .infra_config
            .as_ref()
            .map(render_port_bindings)
            .unwrap_or_default();

        Self {
            id: data.id,
            name: data.name,
            state: PodState::parse(&data.state),
            labels: data.labels,
            containers: data
                .containers
                .into_iter()
                .map(|c| ContainerRef {
                    id: c.id,
                    name: c.name,
                })
                .collect(),
            created: data.created,
            ports,
        }
    }
}

impl From<InspectContainerData> for Container {
    fn from(data: InspectContainerData) -> Self {
        let status = data
            .state
            .as_ref()
            .map(|s| ContainerStatus::parse(&s.status))
            .unwrap_or(ContainerStatus::Unknown(String::new()));
        let health = data
            .state
            .as_ref()
            .and_then(|s| s.health.as_ref())
            .map(|h| HealthState::parse(&h.status))
            .unwrap_or(HealthState::Unset);
        let start_period = data
            .config
            .as_ref()
            .and_then(|c| c.healthcheck.as_ref())
            .map(|h| Duration::from_nanos(h.start_period));
        let annotations = data
            .config
            .and_then(|c| c.annotations)
            .unwrap_or_default();

        Self {
            // Inspect reports names with a leading slash
            name: data.name.trim_start_matches('/').to_string(),
            id: data.id,
            status,
            health,
            start_period,
            annotations,
        }
    }
}

fn render_port_bindings(config: &InspectPodInfraConfig) -> Vec<String> {
    let Some(bindings) = &config.port_bindings else {
        return Vec::new();
    };

    let mut ports = Vec::new();
    for (target, hosts) in bindings {
        match hosts {
            Some(hosts) if !hosts.is_empty() => {
                for host in hosts {
                    if host.host_ip.is_empty() {
                        ports.push(format!("{}->{target}", host.host_port));
                    } else {
                        ports.push(format!("{}:{}->{target}", host.host_ip, host.host_port));
                    }
                }
            }
            _ => ports.push(target.clone()),
        }
    }
    ports.sort();
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_inspect_container_with_healthcheck() {
        let data: InspectContainerData = serde_json::from_str(
            r#"{
                "Id": "abc123",
                "Name": "/db-server",
                "State": {"Status": "running", "Health": {"Status": "starting"}},
                "Config": {
                    "Healthcheck": {"StartPeriod": 2000000000},
                    "Annotations": {"podlift.io/autostart": "never"}
                }
            }"#,
        )
        .unwrap();

        let container = Container::from(data);
        assert_eq!(container.name, "db-server");
        assert_eq!(container.status, ContainerStatus::Running);
        assert_eq!(container.health, HealthState::Starting);
        assert_eq!(container.start_period, Some(Duration::from_secs(2)));
        assert_eq!(
            container.annotations.get("podlift.io/autostart"),
            Some(&"never".to_string())
        );
    }

    #[test]
    fn missing_healthcheck_maps_to_none() {
        let data: InspectContainerData = serde_json::from_str(
            r#"{"Id": "abc", "Name": "web", "State": {"Status": "running"}, "Config": {}}"#,
        )
        .unwrap();

        let container = Container::from(data);
        assert_eq!(container.start_period, None);
        assert_eq!(container.health, HealthState::Unset);
    }

    #[test]
    fn maps_play_kube_report() {
        let report: PlayKubeReport = serde_json::from_str(
            r#"{"Pods": [{"ID": "p1", "Containers": ["c1", "c2"], "ContainerErrors": []}]}"#,
        )
        .unwrap();

        assert_eq!(report.pods.len(), 1);
        assert_eq!(report.pods[0].containers, vec!["c1", "c2"]);
    }

    #[test]
    fn renders_port_bindings_with_and_without_host_ip() {
        let config: InspectPodInfraConfig = serde_json::from_str(
            r#"{"PortBindings": {
                "80/tcp": [{"HostIp": "", "HostPort": "8080"}],
                "443/tcp": [{"HostIp": "10.0.0.1", "HostPort": "8443"}],
                "53/udp": null
            }}"#,
        )
        .unwrap();

        let ports = render_port_bindings(&config);
        assert_eq!(
            ports,
            vec!["10.0.0.1:8443->443/tcp", "53/udp", "8080->80/tcp"]
        );
    }
}
