//! Cluster backend speaking the Kubernetes pod API.
//!
//! Only the read-side of the contract has cluster-native semantics; the
//! mutating operations the platform manages declaratively (image pulls,
//! pod create/start/stop/delete) are logged no-ops, which callers of
//! [`RuntimeBackend`](crate::runtime::RuntimeBackend) must tolerate.
//! Application installs on the cluster go through the chart-install path
//! instead of `create_pod`.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client as HttpClient, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::config::{ClusterConfig, RuntimeKind};
use crate::error::{Result, RuntimeError};
use crate::runtime::types::{Container, ContainerRef, Image, LabelFilters, Pod};
use crate::runtime::RuntimeBackend;

/// Backend for a Kubernetes-style cluster.
pub struct ClusterBackend {
    http: HttpClient,
    stream: HttpClient,
    base_url: String,
    namespace: String,
}

impl ClusterBackend {
    pub fn from_config(config: &ClusterConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| RuntimeError::Failure("cluster token is not valid ASCII".into()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let build = |timeout: Option<Duration>| {
            let mut builder = HttpClient::builder()
                .default_headers(headers.clone())
                .danger_accept_invalid_certs(config.insecure_skip_tls_verify);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().map_err(RuntimeError::Transport)
        };

        Ok(Self {
            http: build(Some(Duration::from_secs(config.timeout_secs)))?,
            stream: build(None)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
        })
    }

    fn pods_url(&self) -> String {
        format!("{}/api/v1/namespaces/{}/pods", self.base_url, self.namespace)
    }

    async fn ensure_ok(response: Response) -> std::result::Result<Response, RuntimeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RuntimeError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_pods(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<wire::PodItem>, RuntimeError> {
        let mut request = self.http.get(self.pods_url());
        if !filters.is_empty() {
            request = request.query(&[("labelSelector", filters.selector_terms().join(","))]);
        }

        let body = Self::ensure_ok(request.send().await?).await?.bytes().await?;
        let list: wire::PodList = serde_json::from_slice(&body).map_err(RuntimeError::Decode)?;

        Ok(list.items)
    }

    /// Resolve a pod by name prefix. Cluster pod names carry generated
    /// suffixes, so an exact lookup of the caller-facing name fails.
    async fn find_pod(
        &self,
        name_or_id: &str,
    ) -> std::result::Result<wire::PodItem, RuntimeError> {
        let items = self.fetch_pods(&LabelFilters::new()).await?;

        items
            .into_iter()
            .find(|p| p.metadata.name.starts_with(name_or_id) || p.metadata.uid == name_or_id)
            .ok_or_else(|| RuntimeError::PodNotFound(name_or_id.to_string()))
    }

    async fn follow_log_stream(&self, url: String) -> std::result::Result<(), RuntimeError> {
        let response = self
            .stream
            .get(url)
            .query(&[("follow", "true")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RuntimeError::Failure("log target not found".into()));
        }
        let response = Self::ensure_ok(response).await?;

        let mut body = response.bytes_stream();
        let mut out = tokio::io::stdout();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            out.write_all(&chunk)
                .await
                .map_err(|e| RuntimeError::Failure(e.to_string()))?;
        }
        out.flush()
            .await
            .map_err(|e| RuntimeError::Failure(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl RuntimeBackend for ClusterBackend {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Cluster
    }

    async fn list_images(&self) -> std::result::Result<Vec<Image>, RuntimeError> {
        warn!("list_images is not implemented for the cluster backend; returning an empty list");
        Ok(Vec::new())
    }

    async fn pull_image(&self, image: &str) -> std::result::Result<(), RuntimeError> {
        warn!(
            image,
            "pull_image is a no-op on the cluster backend; image fetch is managed by the scheduler"
        );
        Ok(())
    }

    async fn list_pods(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<Pod>, RuntimeError> {
        let items = self.fetch_pods(filters).await?;

        Ok(items.iter().map(wire::to_pod).collect())
    }

    async fn create_pod(&self, _manifest: &[u8]) -> std::result::Result<Vec<Pod>, RuntimeError> {
        warn!("create_pod is a no-op on the cluster backend; installs go through the chart path");
        Ok(Vec::new())
    }

    async fn delete_pod(&self, id: &str, _force: bool) -> std::result::Result<(), RuntimeError> {
        warn!(id, "delete_pod is a no-op on the cluster backend");
        Ok(())
    }

    async fn stop_pod(&self, id: &str) -> std::result::Result<(), RuntimeError> {
        warn!(id, "stop_pod is a no-op on the cluster backend");
        Ok(())
    }

    async fn start_pod(&self, id: &str) -> std::result::Result<(), RuntimeError> {
        warn!(id, "start_pod is a no-op on the cluster backend");
        Ok(())
    }

    async fn inspect_pod(&self, name_or_id: &str) -> std::result::Result<Pod, RuntimeError> {
        let item = self.find_pod(name_or_id).await?;

        Ok(wire::to_pod(&item))
    }

    async fn pod_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError> {
        match self.find_pod(name_or_id).await {
            Ok(_) => Ok(true),
            Err(RuntimeError::PodNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn pod_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError> {
        let item = self.find_pod(name_or_id).await?;
        let url = format!("{}/{}/log", self.pods_url(), item.metadata.name);

        self.follow_log_stream(url).await
    }

    async fn list_containers(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<ContainerRef>, RuntimeError> {
        let items = self.fetch_pods(filters).await?;

        Ok(items
            .iter()
            .flat_map(|pod| {
                pod.status.iter().flat_map(|s| {
                    s.container_statuses.iter().map(|c| ContainerRef {
                        id: c.container_id.clone(),
                        name: c.name.clone(),
                    })
                })
            })
            .collect())
    }

    async fn inspect_container(
        &self,
        name_or_id: &str,
    ) -> std::result::Result<Container, RuntimeError> {
        let items = self.fetch_pods(&LabelFilters::new()).await?;

        for pod in &items {
            if let Some(status) = pod.status.as_ref() {
                for container in &status.container_statuses {
                    if container.name == name_or_id || container.container_id == name_or_id {
                        return Ok(wire::to_container(pod, container));
                    }
                }
            }
        }

        Err(RuntimeError::ContainerNotFound(name_or_id.to_string()))
    }

    async fn container_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError> {
        match self.inspect_container(name_or_id).await {
            Ok(_) => Ok(true),
            Err(RuntimeError::ContainerNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn container_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError> {
        let items = self.fetch_pods(&LabelFilters::new()).await?;

        for pod in &items {
            let has_container = pod
                .status
                .as_ref()
                .is_some_and(|s| s.container_statuses.iter().any(|c| c.name == name_or_id));
            if has_container {
                let url = format!("{}/{}/log", self.pods_url(), pod.metadata.name);
                let response = self
                    .stream
                    .get(&url)
                    .query(&[("follow", "true"), ("container", name_or_id)])
                    .send()
                    .await?;
                let response = Self::ensure_ok(response).await?;

                let mut body = response.bytes_stream();
                let mut out = tokio::io::stdout();
                while let Some(chunk) = body.next().await {
                    let chunk = chunk?;
                    out.write_all(&chunk)
                        .await
                        .map_err(|e| RuntimeError::Failure(e.to_string()))?;
                }
                return Ok(());
            }
        }

        Err(RuntimeError::ContainerNotFound(name_or_id.to_string()))
    }
}

impl std::fmt::Debug for ClusterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBackend")
            .field("base_url", &self.base_url)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaced_pod_url() {
        let backend = ClusterBackend::from_config(&ClusterConfig {
            api_url: "https://api.example.com:6443/".into(),
            namespace: "models".into(),
            ..ClusterConfig::default()
        })
        .unwrap();

        assert_eq!(
            backend.pods_url(),
            "https://api.example.com:6443/api/v1/namespaces/models/pods"
        );
    }
}
