//! Layered deployment orchestration.
//!
//! Layers execute strictly in sequence; templates inside a layer deploy
//! concurrently, one task per template, joined at a barrier before the next
//! layer starts. Task results flow through a channel with capacity equal to
//! the layer size, so no task ever blocks on reporting.
//!
//! A failed layer aborts the deployment without rolling back pods created
//! by this or earlier layers; remediation is operator-driven.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::deploy::readiness::verify_pod_ready;
use crate::deploy::render::{render, RenderParams};
use crate::deploy::DeploymentPlan;
use crate::error::{DeployError, Error, Result};
use crate::runtime::RuntimeBackend;
use crate::templates::TemplateSet;

/// Drives layered application deployments against a runtime backend.
pub struct Deployer {
    backend: Arc<dyn RuntimeBackend>,
}

impl Deployer {
    #[must_use]
    pub fn new(backend: Arc<dyn RuntimeBackend>) -> Self {
        Self { backend }
    }

    /// Deploy `app_name` according to `plan`.
    ///
    /// The plan is validated against the loaded template set before
    /// anything touches the backend.
    pub async fn run(
        &self,
        app_name: &str,
        plan: &DeploymentPlan,
        templates: &TemplateSet,
    ) -> Result<()> {
        plan.validate(templates)?;

        let params = RenderParams::for_application(app_name);
        info!(
            app = app_name,
            templates = templates.len(),
            layers = plan.layers().len(),
            "deploying application"
        );

        for (index, layer) in plan.layers().iter().enumerate() {
            let layer_no = index + 1;
            info!(layer = layer_no, templates = ?layer, "executing layer");

            self.run_layer(layer_no, layer, templates, &params).await?;

            info!(layer = layer_no, "layer completed");
        }

        info!(app = app_name, "application deployed");

        Ok(())
    }

    async fn run_layer(
        &self,
        layer_no: usize,
        layer: &[String],
        templates: &TemplateSet,
        params: &RenderParams,
    ) -> Result<()> {
        // Capacity matches the layer size so every task can report without
        // blocking even if the collector has not started draining.
        let (tx, mut rx) = mpsc::channel::<(String, Result<()>)>(layer.len().max(1));
        let mut handles = Vec::with_capacity(layer.len());

        for name in layer {
            // Presence is guaranteed by plan validation.
            let Some(template) = templates.get(name) else {
                continue;
            };

            let backend = Arc::clone(&self.backend);
            let tx = tx.clone();
            let task_name = name.clone();
            let text = template.text.clone();
            let params = params.clone();

            let handle = tokio::spawn(async move {
                let result = deploy_template(backend, &task_name, &text, &params).await;
                // Capacity-bounded by layer size; send cannot block.
                let _ = tx.send((task_name, result)).await;
            });
            handles.push((name.clone(), handle));
        }
        drop(tx);

        // Join barrier: the next layer never starts until every task in
        // this layer has returned.
        let mut failures: Vec<(String, Box<Error>)> = Vec::new();
        for (name, handle) in handles {
            if let Err(join_err) = handle.await {
                failures.push((
                    name.clone(),
                    Box::new(Error::Deploy(DeployError::Task {
                        template: name,
                        reason: format!("task panicked: {join_err}"),
                    })),
                ));
            }
        }
        while let Some((name, result)) = rx.recv().await {
            if let Err(err) = result {
                error!(layer = layer_no, template = %name, error = %err, "template failed");
                failures.push((name, Box::new(err)));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DeployError::LayerFailed {
                layer: layer_no,
                failures,
            }
            .into())
        }
    }
}

/// Render one template, submit it, and verify every pod it created.
async fn deploy_template(
    backend: Arc<dyn RuntimeBackend>,
    name: &str,
    text: &str,
    params: &RenderParams,
) -> Result<()> {
    info!(template = name, "processing template");

    let manifest = render(text, params);

    let pods = backend
        .create_pod(manifest.as_bytes())
        .await
        .map_err(|source| DeployError::Submission {
            template: name.to_string(),
            source,
        })?;

    info!(template = name, pods = pods.len(), "manifest submitted");

    for pod in &pods {
        verify_pod_ready(backend.as_ref(), pod).await?;
    }

    Ok(())
}
