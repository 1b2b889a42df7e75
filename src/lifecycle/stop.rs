//! Stopping an application's pods.

use tracing::info;

use crate::error::{LifecycleError, Result};
use crate::runtime::types::{LabelFilters, Pod, PodState};

use super::{confirm, LifecycleController};

/// Options for stopping an application.
#[derive(Debug, Clone, Default)]
pub struct StopOptions {
    /// Application name.
    pub name: String,
    /// Explicit pod names to stop; empty means every pod.
    pub pod_names: Vec<String>,
    /// Skip the confirmation prompt.
    pub auto_yes: bool,
}

impl LifecycleController {
    /// Stop a running application.
    ///
    /// Mirrors [`start`](Self::start): absent names are warned about and
    /// skipped, already-stopped pods are skipped with a log note, and
    /// per-pod failures are aggregated without aborting the rest.
    pub async fn stop(&self, opts: StopOptions) -> Result<()> {
        let pods = self
            .backend
            .list_pods(&LabelFilters::application(&opts.name))
            .await?;
        if pods.is_empty() {
            info!(app = %opts.name, "no pods found for the given application");
            return Ok(());
        }

        let targets = if opts.pod_names.is_empty() {
            pods
        } else {
            Self::filter_pods_by_name(pods, &opts.pod_names)
        };
        if targets.is_empty() {
            info!(app = %opts.name, "no pods to stop for the given application");
            return Ok(());
        }

        info!("the following pods will be stopped:");
        for pod in &targets {
            info!("  -> {}", pod.name);
        }

        if !opts.auto_yes && !confirm("Stop the above pods?")? {
            info!("skipping stopping of pods");
            return Ok(());
        }

        self.stop_pods(&targets).await
    }

    async fn stop_pods(&self, targets: &[Pod]) -> Result<()> {
        let mut failures: Vec<(String, String)> = Vec::new();

        for pod in targets {
            info!(pod = %pod.name, "stopping pod");
            let data = match self.backend.inspect_pod(&pod.name).await {
                Ok(data) => data,
                Err(err) => {
                    failures.push((pod.name.clone(), err.to_string()));
                    continue;
                }
            };

            if matches!(data.state, PodState::Stopped | PodState::Exited) {
                info!(pod = %pod.name, "pod is not running; skipping");
                continue;
            }

            if let Err(err) = self.backend.stop_pod(&data.id).await {
                failures.push((pod.name.clone(), err.to_string()));
                continue;
            }

            info!(pod = %pod.name, "successfully stopped pod");
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::StopFailed(failures).into())
        }
    }
}
