//! Integration tests for the start/stop/list lifecycle controllers.

use podlift::error::{Error, LifecycleError, RuntimeError};
use podlift::lifecycle::{LifecycleController, ListOptions, StartOptions, StopOptions};
use podlift::runtime::types::{HealthState, PodState, AUTOSTART_ANNOTATION, AUTOSTART_OFF};
use podlift::testkit::backend::ScriptedBackend;
use podlift::testkit::{container, pod, with_container};

fn start_opts(app: &str, pods: &[&str]) -> StartOptions {
    StartOptions {
        name: app.to_string(),
        pod_names: pods.iter().map(|s| (*s).to_string()).collect(),
        auto_yes: true,
        skip_logs: true,
    }
}

#[tokio::test]
async fn starting_an_empty_application_is_not_an_error() {
    let backend = ScriptedBackend::new();

    LifecycleController::new(backend.clone())
        .start(start_opts("ghost", &[]))
        .await
        .unwrap();

    assert!(backend.started().is_empty());
}

#[tokio::test]
async fn running_pod_is_skipped_not_restarted() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "web", PodState::Running), vec![]);

    LifecycleController::new(backend.clone())
        .start(start_opts("app", &["web"]))
        .await
        .unwrap();

    assert!(backend.started().is_empty());
}

#[tokio::test]
async fn missing_pod_name_is_skipped_with_the_rest_proceeding() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "x", PodState::Stopped), vec![]);

    LifecycleController::new(backend.clone())
        .start(start_opts("app", &["x", "y"]))
        .await
        .unwrap();

    assert_eq!(backend.started(), vec!["pod-x"]);
}

#[tokio::test]
async fn start_failures_are_aggregated_without_aborting_remaining_pods() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "a", PodState::Stopped), vec![]);
    backend.add_pod(pod("app", "b", PodState::Stopped), vec![]);
    backend.add_pod(pod("app", "c", PodState::Stopped), vec![]);
    backend.fail_start("pod-a", "cgroup error");
    backend.fail_start("pod-c", "image missing");

    let err = LifecycleController::new(backend.clone())
        .start(start_opts("app", &["a", "b", "c"]))
        .await
        .unwrap_err();

    // every pod was attempted
    assert_eq!(backend.started(), vec!["pod-a", "pod-b", "pod-c"]);

    let Error::Lifecycle(LifecycleError::StartFailed(failures)) = &err else {
        panic!("expected StartFailed, got {err}");
    };
    assert_eq!(failures.len(), 2);
    let rendered = err.to_string();
    assert!(rendered.contains("a: "));
    assert!(rendered.contains("cgroup error"));
    assert!(rendered.contains("image missing"));
}

#[tokio::test]
async fn annotated_pods_are_excluded_from_automatic_start() {
    let backend = ScriptedBackend::new();

    let mut optout = container("c-job", "job", HealthState::Unset);
    optout
        .annotations
        .insert(AUTOSTART_ANNOTATION.to_string(), AUTOSTART_OFF.to_string());
    let job_pod = with_container(pod("app", "job", PodState::Stopped), &optout);
    backend.add_pod(job_pod, vec![optout]);

    let plain = container("c-web", "web-main", HealthState::Unset);
    let web_pod = with_container(pod("app", "web", PodState::Stopped), &plain);
    backend.add_pod(web_pod, vec![plain]);

    LifecycleController::new(backend.clone())
        .start(start_opts("app", &[]))
        .await
        .unwrap();

    assert_eq!(backend.started(), vec!["pod-web"]);
}

#[tokio::test]
async fn single_targeted_pod_streams_logs_after_start() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "web", PodState::Stopped), vec![]);

    let mut opts = start_opts("app", &["web"]);
    opts.skip_logs = false;

    LifecycleController::new(backend.clone())
        .start(opts)
        .await
        .unwrap();

    assert_eq!(backend.log_requests(), vec!["web"]);
}

#[tokio::test]
async fn logs_are_skipped_for_multiple_targets() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "a", PodState::Stopped), vec![]);
    backend.add_pod(pod("app", "b", PodState::Stopped), vec![]);

    let mut opts = start_opts("app", &["a", "b"]);
    opts.skip_logs = false;

    LifecycleController::new(backend.clone())
        .start(opts)
        .await
        .unwrap();

    assert!(backend.log_requests().is_empty());
}

#[tokio::test]
async fn interrupted_log_stream_is_a_normal_end() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "web", PodState::Stopped), vec![]);
    backend.script_logs(
        "web",
        Err(RuntimeError::Failure("context canceled".to_string())),
    );

    let mut opts = start_opts("app", &["web"]);
    opts.skip_logs = false;

    LifecycleController::new(backend.clone())
        .start(opts)
        .await
        .unwrap();
}

#[tokio::test]
async fn stop_skips_pods_that_are_not_running() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "live", PodState::Running), vec![]);
    backend.add_pod(pod("app", "done", PodState::Exited), vec![]);

    LifecycleController::new(backend.clone())
        .stop(StopOptions {
            name: "app".to_string(),
            pod_names: Vec::new(),
            auto_yes: true,
        })
        .await
        .unwrap();

    assert_eq!(backend.stopped(), vec!["pod-live"]);
}

#[tokio::test]
async fn stop_failures_are_aggregated() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "a", PodState::Running), vec![]);
    backend.add_pod(pod("app", "b", PodState::Running), vec![]);
    backend.fail_stop("pod-a", "stuck");

    let err = LifecycleController::new(backend.clone())
        .stop(StopOptions {
            name: "app".to_string(),
            pod_names: Vec::new(),
            auto_yes: true,
        })
        .await
        .unwrap_err();

    assert_eq!(backend.stopped(), vec!["pod-a", "pod-b"]);
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::StopFailed(_))
    ));
}

#[tokio::test]
async fn list_reports_all_ready_pod_as_healthy() {
    let backend = ScriptedBackend::new();
    let c1 = container("c1", "api", HealthState::Healthy);
    let c2 = container("c2", "sidecar", HealthState::Healthy);
    let p = with_container(
        with_container(pod("app", "web", PodState::Running), &c1),
        &c2,
    );
    backend.add_pod(p, vec![c1, c2]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "Running (healthy)");
}

#[tokio::test]
async fn list_reports_pod_with_one_unhealthy_container_as_not_ready() {
    let backend = ScriptedBackend::new();
    let good = container("c1", "api", HealthState::Healthy);
    let bad = container("c2", "sidecar", HealthState::Unhealthy);
    let p = with_container(
        with_container(pod("app", "web", PodState::Running), &good),
        &bad,
    );
    backend.add_pod(p, vec![good, bad]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(rows[0].status, "Running (not ready)");
}

#[tokio::test]
async fn list_passes_non_running_states_through() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("app", "old", PodState::Exited), vec![]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(rows[0].status, "Exited");
}

#[tokio::test]
async fn list_skips_pods_without_the_application_label() {
    let backend = ScriptedBackend::new();
    let mut foreign = pod("x", "foreign", PodState::Running);
    foreign.labels.clear();
    backend.add_pod(foreign, vec![]);
    backend.add_pod(pod("app", "ours", PodState::Running), vec![]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "ours");
}

#[tokio::test]
async fn list_filters_by_application_name() {
    let backend = ScriptedBackend::new();
    backend.add_pod(pod("one", "a", PodState::Running), vec![]);
    backend.add_pod(pod("two", "b", PodState::Running), vec![]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions {
            application: Some("one".to_string()),
            wide: false,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].application, "one");
}

#[tokio::test]
async fn wide_listing_carries_ports_and_container_statuses() {
    let backend = ScriptedBackend::new();
    let c = container("c1", "api", HealthState::Healthy);
    let mut p = with_container(pod("app", "web", PodState::Running), &c);
    p.ports = vec!["8080->80/tcp".to_string()];
    backend.add_pod(p, vec![c]);

    let rows = LifecycleController::new(backend)
        .list(&ListOptions {
            application: None,
            wide: true,
        })
        .await
        .unwrap();

    assert_eq!(rows[0].ports, "8080->80/tcp");
    assert_eq!(rows[0].containers, "api (healthy)");
    assert_eq!(rows[0].id, "pod-web");
}
