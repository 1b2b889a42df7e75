//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`backend`] — [`ScriptedBackend`](backend::ScriptedBackend), an
//!   in-memory [`RuntimeBackend`](crate::runtime::RuntimeBackend) with
//!   scriptable failures and health sequences, recording every call.

pub mod backend;

use std::collections::HashMap;

use crate::runtime::types::{Container, ContainerRef, ContainerStatus, HealthState, Pod, PodState};

/// Build a pod labelled as belonging to `app`.
#[must_use]
pub fn pod(app: &str, name: &str, state: PodState) -> Pod {
    let mut labels = HashMap::new();
    labels.insert(
        crate::runtime::types::APPLICATION_LABEL.to_string(),
        app.to_string(),
    );

    Pod {
        id: format!("pod-{name}"),
        name: name.to_string(),
        state,
        labels,
        containers: Vec::new(),
        created: None,
        ports: Vec::new(),
    }
}

/// Attach a container reference to a pod.
#[must_use]
pub fn with_container(mut pod: Pod, container: &Container) -> Pod {
    pod.containers.push(ContainerRef {
        id: container.id.clone(),
        name: container.name.clone(),
    });
    pod
}

/// Build a running container with the given health signal.
#[must_use]
pub fn container(id: &str, name: &str, health: HealthState) -> Container {
    Container {
        id: id.to_string(),
        name: name.to_string(),
        status: ContainerStatus::Running,
        health,
        start_period: None,
        annotations: HashMap::new(),
    }
}
