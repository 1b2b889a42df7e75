//! Local-engine backend speaking the libpod REST API.
//!
//! Talks to a `podman system service` endpoint over HTTP. All wire payloads
//! are mapped into the runtime-agnostic types in [`crate::runtime::types`]
//! before they leave this module.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client as HttpClient, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::{PodmanConfig, RuntimeKind};
use crate::error::{Result, RuntimeError};
use crate::runtime::types::{Container, ContainerRef, Image, LabelFilters, Pod};
use crate::runtime::RuntimeBackend;

const API_PREFIX: &str = "v5.0.0/libpod";

/// Backend for a local Podman engine.
pub struct PodmanBackend {
    http: HttpClient,
    /// Client without a total request timeout, for log following.
    stream: HttpClient,
    base_url: String,
}

impl PodmanBackend {
    pub fn from_config(config: &PodmanConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(RuntimeError::Transport)?;
        let stream = HttpClient::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(RuntimeError::Transport)?;

        Ok(Self {
            http,
            stream,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    fn label_filters_param(filters: &LabelFilters) -> std::result::Result<String, RuntimeError> {
        serde_json::to_string(&serde_json::json!({
            "label": filters.selector_terms(),
        }))
        .map_err(RuntimeError::Decode)
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

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> std::result::Result<T, RuntimeError> {
        let body = Self::ensure_ok(response).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(RuntimeError::Decode)
    }

    /// Stream a follow-mode log endpoint to stdout, demultiplexing the
    /// docker-style 8-byte frame headers podman emits for non-tty targets.
    async fn follow_logs(&self, url: String) -> std::result::Result<(), RuntimeError> {
        let response = self
            .stream
            .get(url)
            .query(&[("follow", "true"), ("stdout", "true"), ("stderr", "true")])
            .send()
            .await?;
        let response = Self::ensure_ok(response).await?;

        let mut body = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut out = tokio::io::stdout();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            drain_log_frames(&mut buffer, &mut out)
                .await
                .map_err(|e| RuntimeError::Failure(e.to_string()))?;
        }

        // Trailing bytes without a complete frame header
        if !buffer.is_empty() {
            out.write_all(&buffer)
                .await
                .map_err(|e| RuntimeError::Failure(e.to_string()))?;
        }
        out.flush()
            .await
            .map_err(|e| RuntimeError::Failure(e.to_string()))?;

        Ok(())
    }
}

/// Write complete multiplexed frames from `buffer` to `out`, leaving any
/// partial frame in place. Raw (non-multiplexed) streams pass through.
async fn drain_log_frames(
    buffer: &mut Vec<u8>,
    out: &mut tokio::io::Stdout,
) -> std::io::Result<()> {
    loop {
        if buffer.is_empty() {
            return Ok(());
        }

        // tty streams carry no headers; pass anything unframed through raw
        let unframed =
            buffer[0] > 2 || (buffer.len() >= 4 && buffer[1..4] != [0, 0, 0]);
        if unframed {
            out.write_all(buffer).await?;
            buffer.clear();
            return Ok(());
        }

        // partial header; wait for more bytes
        if buffer.len() < 8 {
            return Ok(());
        }
        let len = u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]) as usize;
        if buffer.len() < 8 + len {
            return Ok(());
        }

        out.write_all(&buffer[8..8 + len]).await?;
        buffer.drain(..8 + len);
    }
}

#[async_trait]
impl RuntimeBackend for PodmanBackend {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Podman
    }

    async fn list_images(&self) -> std::result::Result<Vec<Image>, RuntimeError> {
        let response = self.http.get(self.url("images/json")).send().await?;
        let images: Vec<wire::ImageSummary> = Self::decode(response).await?;

        Ok(images.into_iter().map(Image::from).collect())
    }

    async fn pull_image(&self, image: &str) -> std::result::Result<(), RuntimeError> {
        debug!(image, "pulling image");
        let response = self
            .http
            .post(self.url("images/pull"))
            .query(&[("reference", image)])
            .send()
            .await?;
        let body = Self::ensure_ok(response).await?.text().await?;

        // The pull endpoint streams progress objects; errors arrive inline.
        for line in body.lines() {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
                    return Err(RuntimeError::Failure(format!(
                        "failed to pull {image}: {err}"
                    )));
                }
            }
        }

        Ok(())
    }

    async fn list_pods(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<Pod>, RuntimeError> {
        let mut request = self.http.get(self.url("pods/json"));
        if !filters.is_empty() {
            request = request.query(&[("filters", Self::label_filters_param(filters)?)]);
        }

        let reports: Vec<wire::ListPodsReport> = Self::decode(request.send().await?).await?;

        Ok(reports.into_iter().map(Pod::from).collect())
    }

    async fn create_pod(&self, manifest: &[u8]) -> std::result::Result<Vec<Pod>, RuntimeError> {
        let response = self
            .http
            .post(self.url("play/kube"))
            .header(reqwest::header::CONTENT_TYPE, "application/x-yaml")
            .body(manifest.to_vec())
            .send()
            .await?;
        let report: wire::PlayKubeReport = Self::decode(response).await?;

        let container_errors: Vec<String> = report
            .pods
            .iter()
            .flat_map(|p| p.container_errors.iter().cloned())
            .collect();
        if !container_errors.is_empty() {
            return Err(RuntimeError::Failure(format!(
                "kube play reported container errors: {}",
                container_errors.join("; ")
            )));
        }

        let mut pods = Vec::with_capacity(report.pods.len());
        for created in &report.pods {
            pods.push(self.inspect_pod(&created.id).await?);
        }

        Ok(pods)
    }

    async fn delete_pod(&self, id: &str, force: bool) -> std::result::Result<(), RuntimeError> {
        let response = self
            .http
            .delete(self.url(&format!("pods/{id}")))
            .query(&[("force", force)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RuntimeError::PodNotFound(id.to_string()));
        }
        Self::ensure_ok(response).await?;

        Ok(())
    }

    async fn stop_pod(&self, id: &str) -> std::result::Result<(), RuntimeError> {
        let response = self
            .http
            .post(self.url(&format!("pods/{id}/stop")))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(RuntimeError::PodNotFound(id.to_string())),
            // 304: already stopped
            StatusCode::NOT_MODIFIED => Ok(()),
            _ => Self::ensure_ok(response).await.map(|_| ()),
        }
    }

    async fn start_pod(&self, id: &str) -> std::result::Result<(), RuntimeError> {
        let response = self
            .http
            .post(self.url(&format!("pods/{id}/start")))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(RuntimeError::PodNotFound(id.to_string())),
            // 304: already running
            StatusCode::NOT_MODIFIED => Ok(()),
            _ => Self::ensure_ok(response).await.map(|_| ()),
        }
    }

    async fn inspect_pod(&self, name_or_id: &str) -> std::result::Result<Pod, RuntimeError> {
        let response = self
            .http
            .get(self.url(&format!("pods/{name_or_id}/json")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RuntimeError::PodNotFound(name_or_id.to_string()));
        }
        let data: wire::InspectPodData = Self::decode(response).await?;

        Ok(Pod::from(data))
    }

    async fn pod_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError> {
        let response = self
            .http
            .get(self.url(&format!("pods/{name_or_id}/exists")))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::ensure_ok(response).await.map(|_| true),
        }
    }

    async fn pod_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError> {
        if !self.pod_exists(name_or_id).await? {
            return Err(RuntimeError::PodNotFound(name_or_id.to_string()));
        }
        self.follow_logs(self.url(&format!("pods/{name_or_id}/logs")))
            .await
    }

    async fn list_containers(
        &self,
        filters: &LabelFilters,
    ) -> std::result::Result<Vec<ContainerRef>, RuntimeError> {
        let mut request = self
            .http
            .get(self.url("containers/json"))
            .query(&[("all", "true")]);
        if !filters.is_empty() {
            request = request.query(&[("filters", Self::label_filters_param(filters)?)]);
        }

        let containers: Vec<wire::ListContainer> = Self::decode(request.send().await?).await?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerRef {
                id: c.id,
                name: c.names.join(","),
            })
            .collect())
    }

    async fn inspect_container(
        &self,
        name_or_id: &str,
    ) -> std::result::Result<Container, RuntimeError> {
        let response = self
            .http
            .get(self.url(&format!("containers/{name_or_id}/json")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RuntimeError::ContainerNotFound(name_or_id.to_string()));
        }
        let data: wire::InspectContainerData = Self::decode(response).await?;

        Ok(Container::from(data))
    }

    async fn container_exists(&self, name_or_id: &str) -> std::result::Result<bool, RuntimeError> {
        let response = self
            .http
            .get(self.url(&format!("containers/{name_or_id}/exists")))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::ensure_ok(response).await.map(|_| true),
        }
    }

    async fn container_logs(&self, name_or_id: &str) -> std::result::Result<(), RuntimeError> {
        if !self.container_exists(name_or_id).await? {
            return Err(RuntimeError::ContainerNotFound(name_or_id.to_string()));
        }
        self.follow_logs(self.url(&format!("containers/{name_or_id}/logs")))
            .await
    }
}

impl std::fmt::Debug for PodmanBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodmanBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
