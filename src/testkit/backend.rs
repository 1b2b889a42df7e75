//! In-memory scripted [`RuntimeBackend`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::config::RuntimeKind;
use crate::error::RuntimeError;
use crate::runtime::types::{
    Container, ContainerRef, HealthState, Image, LabelFilters, Pod, PodState,
};
use crate::runtime::RuntimeBackend;

type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Behavior of one scripted `create_pod` match.
enum CreateScript {
    /// Insert the seeded pods/containers into the store and return the pods.
    Create(Vec<(Pod, Vec<Container>)>),
    /// Fail the submission with this message.
    Fail(String),
}

/// An in-memory backend with scriptable behavior.
///
/// Every mutating and inspect call is recorded so tests can assert on
/// ordering (e.g. layer barriers) and call counts. Scripts match
/// `create_pod` submissions by manifest substring; container health can be
/// scripted as a sequence consumed one inspect at a time (the last entry
/// repeats).
#[derive(Default)]
pub struct ScriptedBackend {
    pods: RwLock<Vec<Pod>>,
    containers: RwLock<Vec<Container>>,
    create_scripts: Mutex<Vec<(String, CreateScript)>>,
    health_sequences: Mutex<HashMap<String, VecDeque<HealthState>>>,
    start_failures: RwLock<HashMap<String, String>>,
    stop_failures: RwLock<HashMap<String, String>>,
    log_results: Mutex<HashMap<String, RuntimeResult<()>>>,

    submissions: Mutex<Vec<String>>,
    started: Mutex<Vec<String>>,
    stopped: Mutex<Vec<String>>,
    log_requests: Mutex<Vec<String>>,
    container_inspections: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a pod (and its containers) into the store.
    pub fn add_pod(&self, pod: Pod, containers: Vec<Container>) {
        self.pods.write().push(pod);
        self.containers.write().extend(containers);
    }

    /// When a submitted manifest contains `needle`, create the seeded pods.
    pub fn on_create(&self, needle: &str, pods: Vec<(Pod, Vec<Container>)>) {
        self.create_scripts
            .lock()
            .push((needle.to_string(), CreateScript::Create(pods)));
    }

    /// When a submitted manifest contains `needle`, fail the submission.
    pub fn fail_create(&self, needle: &str, message: &str) {
        self.create_scripts
            .lock()
            .push((needle.to_string(), CreateScript::Fail(message.to_string())));
    }

    /// Script the health signals successive inspects of a container see.
    /// The final entry repeats once the sequence is exhausted.
    pub fn script_health(&self, container_id: &str, sequence: Vec<HealthState>) {
        self.health_sequences
            .lock()
            .insert(container_id.to_string(), sequence.into());
    }

    /// Make `start_pod` fail for the given pod id.
    pub fn fail_start(&self, pod_id: &str, message: &str) {
        self.start_failures
            .write()
            .insert(pod_id.to_string(), message.to_string());
    }

    /// Make `stop_pod` fail for the given pod id.
    pub fn fail_stop(&self, pod_id: &str, message: &str) {
        self.stop_failures
            .write()
            .insert(pod_id.to_string(), message.to_string());
    }

    /// Script the outcome of a `pod_logs` call for the given pod name.
    pub fn script_logs(&self, pod_name: &str, result: RuntimeResult<()>) {
        self.log_results.lock().insert(pod_name.to_string(), result);
    }

    /// Manifests submitted via `create_pod`, in submission order.
    #[must_use]
    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().clone()
    }

    /// Pod ids passed to `start_pod`, in call order.
    #[must_use]
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    /// Pod ids passed to `stop_pod`, in call order.
    #[must_use]
    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().clone()
    }

    /// Pod names whose logs were requested.
    #[must_use]
    pub fn log_requests(&self) -> Vec<String> {
        self.log_requests.lock().clone()
    }

    /// Container ids/names passed to `inspect_container`, in call order.
    #[must_use]
    pub fn container_inspections(&self) -> Vec<String> {
        self.container_inspections.lock().clone()
    }

    /// Snapshot of every pod currently in the store.
    #[must_use]
    pub fn pods_snapshot(&self) -> Vec<Pod> {
        self.pods.read().clone()
    }

    fn find_pod(&self, name_or_id: &str) -> Option<Pod> {
        self.pods
            .read()
            .iter()
            .find(|p| p.id == name_or_id || p.name == name_or_id)
            .cloned()
    }

    fn set_pod_state(&self, id: &str, state: PodState) {
        let mut pods = self.pods.write();
        if let Some(pod) = pods.iter_mut().find(|p| p.id == id) {
            pod.state = state;
        }
    }
}

#[async_trait]
impl RuntimeBackend for ScriptedBackend {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Podman
    }

    async fn list_images(&self) -> RuntimeResult<Vec<Image>> {
        Ok(Vec::new())
    }

    async fn pull_image(&self, _image: &str) -> RuntimeResult<()> {
        Ok(())
    }

    async fn list_pods(&self, filters: &LabelFilters) -> RuntimeResult<Vec<Pod>> {
        let pods = self.pods.read();
        Ok(pods
            .iter()
            .filter(|pod| {
                filters
                    .iter()
                    .all(|(k, v)| pod.labels.get(k).is_some_and(|have| have == v))
            })
            .cloned()
            .collect())
    }

    async fn create_pod(&self, manifest: &[u8]) -> RuntimeResult<Vec<Pod>> {
        let manifest = String::from_utf8_lossy(manifest).to_string();
        self.submissions.lock().push(manifest.clone());

        let mut scripts = self.create_scripts.lock();
        let index = scripts
            .iter()
            .position(|(needle, _)| manifest.contains(needle.as_str()));

        match index {
            Some(index) => match &scripts[index].1 {
                CreateScript::Fail(message) => Err(RuntimeError::Failure(message.clone())),
                CreateScript::Create(seeds) => {
                    let created: Vec<Pod> = seeds.iter().map(|(pod, _)| pod.clone()).collect();
                    let containers: Vec<Container> = seeds
                        .iter()
                        .flat_map(|(_, cs)| cs.iter().cloned())
                        .collect();
                    drop(scripts);

                    self.pods.write().extend(created.iter().cloned());
                    self.containers.write().extend(containers);

                    Ok(created)
                }
            },
            None => {
                drop(scripts);
                // Unscripted manifests create one anonymous running pod.
                let pod = Pod {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: format!("pod-{}", self.submissions.lock().len()),
                    state: PodState::Running,
                    labels: HashMap::new(),
                    containers: Vec::new(),
                    created: None,
                    ports: Vec::new(),
                };
                self.pods.write().push(pod.clone());

                Ok(vec![pod])
            }
        }
    }

    async fn delete_pod(&self, id: &str, _force: bool) -> RuntimeResult<()> {
        let mut pods = self.pods.write();
        let before = pods.len();
        pods.retain(|p| p.id != id && p.name != id);
        if pods.len() == before {
            return Err(RuntimeError::PodNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn stop_pod(&self, id: &str) -> RuntimeResult<()> {
        self.stopped.lock().push(id.to_string());
        if let Some(message) = self.stop_failures.read().get(id) {
            return Err(RuntimeError::Failure(message.clone()));
        }
        if self.find_pod(id).is_none() {
            return Err(RuntimeError::PodNotFound(id.to_string()));
        }
        self.set_pod_state(id, PodState::Stopped);
        Ok(())
    }

    async fn start_pod(&self, id: &str) -> RuntimeResult<()> {
        self.started.lock().push(id.to_string());
        if let Some(message) = self.start_failures.read().get(id) {
            return Err(RuntimeError::Failure(message.clone()));
        }
        if self.find_pod(id).is_none() {
            return Err(RuntimeError::PodNotFound(id.to_string()));
        }
        self.set_pod_state(id, PodState::Running);
        Ok(())
    }

    async fn inspect_pod(&self, name_or_id: &str) -> RuntimeResult<Pod> {
        self.find_pod(name_or_id)
            .ok_or_else(|| RuntimeError::PodNotFound(name_or_id.to_string()))
    }

    async fn pod_exists(&self, name_or_id: &str) -> RuntimeResult<bool> {
        Ok(self.find_pod(name_or_id).is_some())
    }

    async fn pod_logs(&self, name_or_id: &str) -> RuntimeResult<()> {
        self.log_requests.lock().push(name_or_id.to_string());
        if let Some(result) = self.log_results.lock().remove(name_or_id) {
            return result;
        }
        if self.find_pod(name_or_id).is_none() {
            return Err(RuntimeError::PodNotFound(name_or_id.to_string()));
        }
        Ok(())
    }

    async fn list_containers(&self, _filters: &LabelFilters) -> RuntimeResult<Vec<ContainerRef>> {
        Ok(self
            .containers
            .read()
            .iter()
            .map(|c| ContainerRef {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect())
    }

    async fn inspect_container(&self, name_or_id: &str) -> RuntimeResult<Container> {
        self.container_inspections.lock().push(name_or_id.to_string());
        let mut container = self
            .containers
            .read()
            .iter()
            .find(|c| c.id == name_or_id || c.name == name_or_id)
            .cloned()
            .ok_or_else(|| RuntimeError::ContainerNotFound(name_or_id.to_string()))?;

        let mut sequences = self.health_sequences.lock();
        if let Some(sequence) = sequences.get_mut(&container.id) {
            if sequence.len() > 1 {
                container.health = sequence.pop_front().unwrap_or(container.health);
            } else if let Some(health) = sequence.front() {
                container.health = *health;
            }
        }

        Ok(container)
    }

    async fn container_exists(&self, name_or_id: &str) -> RuntimeResult<bool> {
        Ok(self
            .containers
            .read()
            .iter()
            .any(|c| c.id == name_or_id || c.name == name_or_id))
    }

    async fn container_logs(&self, name_or_id: &str) -> RuntimeResult<()> {
        self.log_requests.lock().push(name_or_id.to_string());
        Ok(())
    }
}
