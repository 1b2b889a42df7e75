//! Runtime backend abstraction.
//!
//! This module defines the capability set every container runtime must
//! implement, the shared pod/container types, and the factory that selects
//! a backend from configuration. The deployment and lifecycle layers only
//! ever talk to [`RuntimeBackend`]; swapping backends never touches them.

pub mod cluster;
pub mod podman;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, RuntimeKind};
use crate::error::{Result, RuntimeError};

pub use types::{
    Container, ContainerRef, ContainerStatus, HealthState, Image, LabelFilters, Pod, PodState,
    APPLICATION_LABEL, AUTOSTART_ANNOTATION, AUTOSTART_OFF,
};

/// Capability set implemented by every container runtime.
///
/// Implementations must be safe for concurrent use: the deployment
/// orchestrator issues simultaneous `create_pod` and `inspect_container`
/// calls from every task in a layer against one shared handle.
///
/// Read operations return an explicit not-found error
/// ([`RuntimeError::PodNotFound`] / [`RuntimeError::ContainerNotFound`])
/// rather than an empty value masquerading as success. Backends may report
/// a logged no-op success for operations whose semantics the platform owns
/// (e.g. image pulls on a cluster are managed by the scheduler); callers
/// must tolerate that.
#[async_trait]
pub trait RuntimeBackend: Send + Sync {
    /// Backend name for logging and identification.
    fn kind(&self) -> RuntimeKind;

    async fn list_images(&self) -> std::result::Result<Vec<Image>, RuntimeError>;

    async fn pull_image(&self, image: &str) -> std::result::Result<(), RuntimeError>;

    async fn list_pods(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<Pod>, RuntimeError>;

    /// Submit a rendered manifest. All-or-nothing for a single submission;
    /// returns every pod the manifest created (a manifest may describe a
    /// multi-pod unit).
    async fn create_pod(&self, manifest: &[u8]) -> std::result::Result<Vec<Pod>, RuntimeError>;

    async fn delete_pod(&self, id: &str, force: bool) -> std::result::Result<(), RuntimeError>;

    async fn stop_pod(&self, id: &str) -> std::result::Result<(), RuntimeError>;

    async fn start_pod(&self, id: &str) -> std::result::Result<(), RuntimeError>;

    async fn inspect_pod(&self, name_or_id: &str) -> std::result::Result<Pod, RuntimeError>;

    async fn pod_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError>;

    /// Stream pod logs to stdout until the stream ends or the user
    /// interrupts.
    async fn pod_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError>;

    async fn list_containers(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<ContainerRef>, RuntimeError>;

    async fn inspect_container(
        &self,
        name_or_id: &str,
    ) -> std::result::Result<Container, RuntimeError>;

    async fn container_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError>;

    async fn container_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError>;
}

/// Create the backend selected by configuration.
///
/// Pure factory keyed by the configured runtime kind; no reflection, no
/// dynamic loading.
pub fn create_backend(config: &Config) -> Result<Arc<dyn RuntimeBackend>> {
    match config.runtime {
        RuntimeKind::Podman => Ok(Arc::new(podman::PodmanBackend::from_config(
            &config.podman,
        )?)),
        RuntimeKind::Cluster => Ok(Arc::new(cluster::ClusterBackend::from_config(
            &config.cluster,
        )?)),
    }
}
