//! Container readiness verification.
//!
//! A container's own health check defines a start period during which early
//! failures are ignored; the verifier waits at least that long plus a fixed
//! buffer (covering external provisioning delay) before declaring failure,
//! but reports success on the first poll that observes a healthy signal.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::runtime::types::{ContainerRef, HealthState, Pod};
use crate::runtime::RuntimeBackend;

/// Buffer added on top of a container's configured start period.
pub const EXTRA_READINESS_GRACE: Duration = Duration::from_secs(5 * 60);

/// Interval between health polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Verify that every container in `pod` reports ready within its budget.
pub async fn verify_pod_ready(backend: &dyn RuntimeBackend, pod: &Pod) -> Result<()> {
    debug!(pod = %pod.name, "performing pod readiness check");
    for container in &pod.containers {
        verify_container_ready(backend, pod, container).await?;
    }
    info!(pod = %pod.name, "pod is ready");

    Ok(())
}

async fn verify_container_ready(
    backend: &dyn RuntimeBackend,
    pod: &Pod,
    container: &ContainerRef,
) -> Result<()> {
    let mut state = backend.inspect_container(&container.id).await?;

    let Some(start_period) = state.start_period else {
        debug!(
            container = %container.name,
            "no container health check is set; skipping readiness check"
        );
        return Ok(());
    };

    let budget = start_period + EXTRA_READINESS_GRACE;
    let deadline = Instant::now() + budget;
    info!(
        container = %container.name,
        timeout_secs = budget.as_secs(),
        "waiting for container readiness"
    );

    loop {
        if state.health == HealthState::Healthy {
            info!(container = %container.name, "container is ready");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DeployError::ReadinessTimeout {
                pod: pod.name.clone(),
                container: container.name.clone(),
                budget_secs: budget.as_secs(),
            }
            .into());
        }

        tokio::time::sleep(POLL_INTERVAL).await;
        state = backend.inspect_container(&container.id).await?;
    }
}
