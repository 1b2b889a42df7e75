//! Starting an application's pods.

use tracing::{info, warn};

use crate::error::{LifecycleError, Result, RuntimeError};
use crate::runtime::types::{LabelFilters, Pod, AUTOSTART_ANNOTATION, AUTOSTART_OFF};

use super::{confirm, LifecycleController};

/// Options for starting an application.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Application name.
    pub name: String,
    /// Explicit pod names to start; empty means annotation-based selection.
    pub pod_names: Vec<String>,
    /// Skip the confirmation prompt.
    pub auto_yes: bool,
    /// Do not stream logs after starting a single pod.
    pub skip_logs: bool,
}

impl LifecycleController {
    /// Start a stopped application.
    ///
    /// Pods are selected by explicit name (absent names are warned about
    /// and skipped) or, with no names given, by excluding pods whose
    /// containers opt out of autostart. Per-pod start failures are
    /// collected and surfaced together; they never abort the remaining
    /// pods.
    pub async fn start(&self, opts: StartOptions) -> Result<()> {
        let pods = self
            .backend
            .list_pods(&LabelFilters::application(&opts.name))
            .await?;
        if pods.is_empty() {
            info!(app = %opts.name, "no pods found for the given application");
            return Ok(());
        }

        let targets = if opts.pod_names.is_empty() {
            self.filter_pods_by_annotation(pods).await?
        } else {
            Self::filter_pods_by_name(pods, &opts.pod_names)
        };
        if targets.is_empty() {
            info!(app = %opts.name, "no pods to start for the given application");
            return Ok(());
        }

        info!("the following pods will be started:");
        for pod in &targets {
            info!("  -> {}", pod.name);
        }

        let follow_logs = targets.len() == 1 && !opts.skip_logs;
        if follow_logs {
            info!("after starting, logs will be streamed; press Ctrl+C to return to the terminal");
        }

        if !opts.auto_yes && !confirm("Start the above pods?")? {
            info!("skipping starting of pods");
            return Ok(());
        }

        info!("proceeding to start pods");
        self.start_pods(&targets).await?;

        if follow_logs {
            self.follow_pod_logs(&targets[0]).await?;
        }

        Ok(())
    }

    /// Keep every pod except those carrying the autostart opt-out
    /// annotation on any container.
    async fn filter_pods_by_annotation(&self, pods: Vec<Pod>) -> Result<Vec<Pod>> {
        let mut selected = Vec::new();

        'pods: for pod in pods {
            for container in &pod.containers {
                let data = self.backend.inspect_container(&container.name).await?;
                if data
                    .annotations
                    .get(AUTOSTART_ANNOTATION)
                    .is_some_and(|v| v == AUTOSTART_OFF)
                {
                    info!(pod = %pod.name, "pod opts out of autostart; skipping");
                    continue 'pods;
                }
            }
            selected.push(pod);
        }

        Ok(selected)
    }

    async fn start_pods(&self, targets: &[Pod]) -> Result<()> {
        let mut failures: Vec<(String, String)> = Vec::new();

        for pod in targets {
            info!(pod = %pod.name, "starting pod");
            let data = match self.backend.inspect_pod(&pod.name).await {
                Ok(data) => data,
                Err(err) => {
                    failures.push((pod.name.clone(), err.to_string()));
                    continue;
                }
            };

            if data.state.is_running() {
                info!(pod = %pod.name, "pod is already running; skipping");
                continue;
            }

            if let Err(err) = self.backend.start_pod(&data.id).await {
                failures.push((pod.name.clone(), err.to_string()));
                continue;
            }

            info!(pod = %pod.name, "successfully started pod");
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::StartFailed(failures).into())
        }
    }

    async fn follow_pod_logs(&self, pod: &Pod) -> Result<()> {
        info!(pod = %pod.name, "following pod logs");

        match self.backend.pod_logs(&pod.name).await {
            Ok(()) => Ok(()),
            // A user interrupt or transport cancellation mid-stream is a
            // normal end of following, not a failure.
            Err(err) if is_interrupted(&err) => {
                info!("log following stopped");
                Ok(())
            }
            Err(err) => {
                warn!(pod = %pod.name, error = %err, "failed to follow pod logs");
                Err(err.into())
            }
        }
    }
}

fn is_interrupted(err: &RuntimeError) -> bool {
    let message = err.to_string();
    message.contains("interrupt") || message.contains("canceled") || message.contains("cancelled")
}
