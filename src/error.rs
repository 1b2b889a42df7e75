use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised by a runtime backend.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("pod not found: {0}")]
    PodNotFound(String),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("runtime API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("runtime transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed runtime response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("runtime operation failed: {0}")]
    Failure(String),
}

/// Errors raised while loading an application template bundle.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("unknown template bundle: {0}")]
    UnknownBundle(String),

    #[error("failed to read template directory: {0}")]
    ReadDir(#[source] std::io::Error),

    #[error("failed to read template {name}: {source}")]
    ReadTemplate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read bundle metadata: {0}")]
    ReadMetadata(#[source] std::io::Error),

    #[error("failed to parse bundle metadata: {0}")]
    ParseMetadata(#[source] serde_yaml::Error),
}

/// Errors raised by the layered deployment path.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("invalid deployment plan: {0}")]
    InvalidPlan(String),

    #[error("failed to render template {template}: {reason}")]
    Render { template: String, reason: String },

    #[error("failed to submit manifest for template {template}: {source}")]
    Submission {
        template: String,
        #[source]
        source: RuntimeError,
    },

    #[error("deployment task for template {template} failed: {reason}")]
    Task { template: String, reason: String },

    #[error("container {container} in pod {pod} was not ready within {budget_secs}s")]
    ReadinessTimeout {
        pod: String,
        container: String,
        budget_secs: u64,
    },

    #[error("layer {layer} failed:\n{}", format_layer_failures(.failures))]
    LayerFailed {
        layer: usize,
        failures: Vec<(String, Box<crate::error::Error>)>,
    },
}

/// Errors raised by the start/stop/list lifecycle controllers.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("failed to start pods:\n{}", format_pod_failures(.0))]
    StartFailed(Vec<(String, String)>),

    #[error("failed to stop pods:\n{}", format_pod_failures(.0))]
    StopFailed(Vec<(String, String)>),

    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Precondition-check failures that abort a deployment before submission.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("precondition check '{name}' failed: {message}")]
    CheckFailed { name: &'static str, message: String },
}

fn format_layer_failures(failures: &[(String, Box<Error>)]) -> String {
    failures
        .iter()
        .map(|(template, err)| format!("  {template}: {err}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_pod_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(pod, err)| format!("  {pod}: {err}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Lifecycle(LifecycleError::Prompt(std::io::Error::other(
            err.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_failed_enumerates_every_failure() {
        let failures = vec![
            (
                "cache".to_string(),
                Box::new(Error::Runtime(RuntimeError::Api {
                    status: 500,
                    message: "boom".into(),
                })),
            ),
            (
                "db".to_string(),
                Box::new(Error::Deploy(DeployError::ReadinessTimeout {
                    pod: "db-pod".into(),
                    container: "db".into(),
                    budget_secs: 302,
                })),
            ),
        ];
        let err = DeployError::LayerFailed { layer: 1, failures };
        let rendered = err.to_string();

        assert!(rendered.contains("layer 1"));
        assert!(rendered.contains("cache"));
        assert!(rendered.contains("boom"));
        assert!(rendered.contains("db-pod"));
    }

    #[test]
    fn start_failed_lists_every_pod() {
        let err = LifecycleError::StartFailed(vec![
            ("pod-a".into(), "no such pod".into()),
            ("pod-b".into(), "timeout".into()),
        ]);
        let rendered = err.to_string();

        assert!(rendered.contains("pod-a"));
        assert!(rendered.contains("pod-b"));
        assert!(rendered.contains("timeout"));
    }
}
