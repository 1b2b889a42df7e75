//! Integration tests for the layered deployment orchestrator.

use podlift::deploy::{Deployer, DeploymentPlan};
use podlift::runtime::types::{HealthState, PodState};
use podlift::templates::{ManifestTemplate, TemplateSet};
use podlift::testkit::backend::ScriptedBackend;
use podlift::testkit::{container, pod, with_container};

fn template_set(names: &[&str]) -> TemplateSet {
    let mut set = TemplateSet::new();
    for name in names {
        set.insert(ManifestTemplate {
            name: (*name).to_string(),
            text: format!("kind: Pod\nmetadata:\n  name: {{{{AppName}}}}-{name}\ntemplate: {name}\n"),
        });
    }
    set
}

fn plan(layers: &[&[&str]]) -> DeploymentPlan {
    DeploymentPlan::new(
        layers
            .iter()
            .map(|layer| layer.iter().map(|s| (*s).to_string()).collect())
            .collect(),
        None,
    )
}

/// Register a successful create script producing one ready pod.
fn script_ready_pod(backend: &ScriptedBackend, app: &str, name: &str) {
    let c = container(&format!("c-{name}"), name, HealthState::Healthy);
    let p = with_container(pod(app, &format!("{app}-{name}"), PodState::Running), &c);
    backend.on_create(&format!("template: {name}"), vec![(p, vec![c])]);
}

#[tokio::test]
async fn invalid_plan_is_rejected_before_any_submission() {
    let backend = ScriptedBackend::new();
    let templates = template_set(&["db", "server"]);
    let plan = plan(&[&["db"]]);

    let result = Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await;

    assert!(result.is_err());
    assert!(backend.submissions().is_empty());
}

#[tokio::test]
async fn plan_with_unknown_template_is_rejected_before_any_submission() {
    let backend = ScriptedBackend::new();
    let templates = template_set(&["db", "server"]);
    let plan = plan(&[&["db", "ghost"]]);

    let result = Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("ghost"));
    assert!(backend.submissions().is_empty());
}

#[tokio::test]
async fn later_layer_submits_only_after_earlier_layer_completes() {
    let backend = ScriptedBackend::new();
    for name in ["db", "cache", "server"] {
        script_ready_pod(&backend, "infer1", name);
    }
    let templates = template_set(&["db", "cache", "server"]);
    let plan = plan(&[&["db", "cache"], &["server"]]);

    Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap();

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 3);

    let position = |needle: &str| {
        submissions
            .iter()
            .position(|m| m.contains(needle))
            .unwrap_or_else(|| panic!("{needle} was never submitted"))
    };
    let server = position("template: server");
    assert!(server > position("template: db"));
    assert!(server > position("template: cache"));
}

#[tokio::test]
async fn rendered_manifests_carry_the_application_name() {
    let backend = ScriptedBackend::new();
    script_ready_pod(&backend, "infer1", "db");
    let templates = template_set(&["db"]);
    let plan = plan(&[&["db"]]);

    Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap();

    let submissions = backend.submissions();
    assert!(submissions[0].contains("name: infer1-db"));
    assert!(!submissions[0].contains("{{AppName}}"));
}

#[tokio::test]
async fn failing_template_aborts_before_later_layers() {
    let backend = ScriptedBackend::new();
    script_ready_pod(&backend, "infer1", "db");
    backend.fail_create("template: cache", "backend rejected manifest");
    script_ready_pod(&backend, "infer1", "server");

    let templates = template_set(&["db", "cache", "server"]);
    let plan = plan(&[&["db", "cache"], &["server"]]);

    let err = Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("layer 1"), "error should name the layer: {err}");
    assert!(err.contains("cache"), "error should name the template: {err}");

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 2);
    assert!(!submissions.iter().any(|m| m.contains("template: server")));
}

#[tokio::test]
async fn sibling_failures_in_one_layer_are_all_reported() {
    let backend = ScriptedBackend::new();
    backend.fail_create("template: db", "db exploded");
    backend.fail_create("template: cache", "cache exploded");

    let templates = template_set(&["db", "cache"]);
    let plan = plan(&[&["db", "cache"]]);

    let err = Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("db exploded"));
    assert!(err.contains("cache exploded"));
}

#[tokio::test(start_paused = true)]
async fn readiness_failure_surfaces_with_layer_context() {
    let backend = ScriptedBackend::new();

    // db's container carries a health check that never reports healthy
    let mut c = container("c-db", "db", HealthState::Starting);
    c.start_period = Some(std::time::Duration::from_secs(1));
    let p = with_container(pod("infer1", "infer1-db", PodState::Running), &c);
    backend.on_create("template: db", vec![(p, vec![c])]);

    let templates = template_set(&["db", "server"]);
    let plan = plan(&[&["db"], &["server"]]);

    let err = Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("layer 1"));
    assert!(err.contains("infer1-db"));
    assert!(!backend.submissions().iter().any(|m| m.contains("server")));
}

#[tokio::test]
async fn full_deployment_succeeds_and_creates_every_pod() {
    let backend = ScriptedBackend::new();
    for name in ["db", "cache", "server"] {
        script_ready_pod(&backend, "infer1", name);
    }
    let templates = template_set(&["db", "cache", "server"]);
    let plan = plan(&[&["db", "cache"], &["server"]]);

    Deployer::new(backend.clone())
        .run("infer1", &plan, &templates)
        .await
        .unwrap();

    let pods = backend
        .pods_snapshot()
        .into_iter()
        .map(|p| p.name)
        .collect::<Vec<_>>();
    assert_eq!(pods.len(), 3);
    for name in ["infer1-db", "infer1-cache", "infer1-server"] {
        assert!(pods.contains(&name.to_string()));
    }
}
