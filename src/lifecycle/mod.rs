//! Application lifecycle operations: start, stop, and list.

pub mod age;
mod list;
mod start;
mod stop;

use std::sync::Arc;

use tracing::warn;

use crate::runtime::types::Pod;
use crate::runtime::RuntimeBackend;

pub use list::{ListOptions, PodRow};
pub use start::StartOptions;
pub use stop::StopOptions;

/// Drives start/stop/list against a runtime backend.
pub struct LifecycleController {
    backend: Arc<dyn RuntimeBackend>,
}

impl LifecycleController {
    #[must_use]
    pub fn new(backend: Arc<dyn RuntimeBackend>) -> Self {
        Self { backend }
    }

    /// Select pods by explicit name. Names that do not match any of the
    /// application's pods are warned about and skipped; one bad name never
    /// aborts the operation.
    fn filter_pods_by_name(pods: Vec<Pod>, names: &[String]) -> Vec<Pod> {
        let mut by_name: std::collections::HashMap<String, Pod> =
            pods.into_iter().map(|p| (p.name.clone(), p)).collect();

        let mut selected = Vec::new();
        let mut not_found = Vec::new();
        for name in names {
            match by_name.remove(name) {
                Some(pod) => selected.push(pod),
                None => not_found.push(name.clone()),
            }
        }

        if !not_found.is_empty() {
            warn!(
                "the following specified pods were not found and will be skipped: {}",
                not_found.join(", ")
            );
        }

        selected
    }
}

/// Ask the operator to confirm an action. Declining is a normal outcome.
fn confirm(prompt: &str) -> crate::error::Result<bool> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::types::PodState;

    fn pod(name: &str) -> Pod {
        Pod {
            id: format!("id-{name}"),
            name: name.to_string(),
            state: PodState::Stopped,
            labels: Default::default(),
            containers: Vec::new(),
            created: None,
            ports: Vec::new(),
        }
    }

    #[test]
    fn name_filter_keeps_matches_and_skips_missing() {
        let pods = vec![pod("x"), pod("z")];
        let selected =
            LifecycleController::filter_pods_by_name(pods, &["x".into(), "y".into()]);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "x");
    }

    #[test]
    fn name_filter_preserves_request_order() {
        let pods = vec![pod("a"), pod("b"), pod("c")];
        let selected =
            LifecycleController::filter_pods_by_name(pods, &["c".into(), "a".into()]);

        assert_eq!(
            selected.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["c", "a"]
        );
    }
}
