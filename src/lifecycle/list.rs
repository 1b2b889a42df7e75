//! Listing applications and their pod health.

use tracing::{debug, error, info};

use crate::error::Result;
use crate::lifecycle::age::time_ago;
use crate::runtime::types::{LabelFilters, Pod};

use super::LifecycleController;

/// Options for listing application pods.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Restrict to one application; `None` lists every labelled pod.
    pub application: Option<String>,
    /// Produce the wide projection.
    pub wide: bool,
}

/// One row of `ps` output. Wide-only fields are empty in the narrow
/// projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRow {
    pub application: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub age: String,
    pub ports: String,
    pub containers: String,
}

impl LifecycleController {
    /// Query pods and compute one row per pod with aggregate health.
    pub async fn list(&self, opts: &ListOptions) -> Result<Vec<PodRow>> {
        let filters = opts
            .application
            .as_deref()
            .map(LabelFilters::application)
            .unwrap_or_default();

        let pods = self.backend.list_pods(&filters).await?;
        if pods.is_empty() {
            if let Some(app) = &opts.application {
                info!(app = %app, "no pods found for the given application name");
            }
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(pods.len());
        for pod in pods {
            // Pods without the application label are not ours to report.
            let Some(application) = pod.application().map(str::to_string) else {
                continue;
            };

            let data = match self.backend.inspect_pod(&pod.id).await {
                Ok(data) => data,
                Err(err) => {
                    error!(pod = %pod.id, error = %err, "failed to inspect pod; skipping row");
                    continue;
                }
            };

            rows.push(self.build_row(application, data, opts.wide).await);
        }

        Ok(rows)
    }

    async fn build_row(&self, application: String, pod: Pod, wide: bool) -> PodRow {
        let status = self.aggregate_status(&pod).await;

        if !wide {
            return PodRow {
                application,
                id: String::new(),
                name: pod.name,
                status,
                age: String::new(),
                ports: String::new(),
                containers: String::new(),
            };
        }

        let containers = self.container_cells(&pod).await;
        let ports = if pod.ports.is_empty() {
            "none".to_string()
        } else {
            pod.ports.join(", ")
        };
        let age = pod.created.map(time_ago).unwrap_or_else(|| "-".into());

        PodRow {
            application,
            id: pod.id.chars().take(12).collect(),
            name: pod.name,
            status,
            age,
            ports,
            containers,
        }
    }

    /// Aggregate pod health: a running pod is healthy only when every
    /// container reports ready; any other runtime state passes through.
    async fn aggregate_status(&self, pod: &Pod) -> String {
        if !pod.state.is_running() {
            return pod.state.as_str().to_string();
        }

        let mut ready = 0usize;
        for container in &pod.containers {
            match self.backend.inspect_container(&container.id).await {
                Ok(data) if data.is_ready() => ready += 1,
                Ok(_) => {}
                Err(err) => {
                    debug!(
                        pod = %pod.name,
                        container = %container.id,
                        error = %err,
                        "failed to inspect container for health aggregation"
                    );
                }
            }
        }

        if ready == pod.containers.len() {
            format!("{} (healthy)", pod.state)
        } else {
            format!("{} (not ready)", pod.state)
        }
    }

    async fn container_cells(&self, pod: &Pod) -> String {
        let mut cells = Vec::with_capacity(pod.containers.len());
        for container in &pod.containers {
            match self.backend.inspect_container(&container.id).await {
                Ok(data) => cells.push(format!("{} ({})", data.name, data.effective_status())),
                Err(err) => {
                    debug!(
                        pod = %pod.name,
                        container = %container.id,
                        error = %err,
                        "failed to inspect container; omitting from row"
                    );
                }
            }
        }

        if cells.is_empty() {
            "none".to_string()
        } else {
            cells.join(", ")
        }
    }
}
