//! Seed scenario S6 (spec §8): a service that never reports healthy is
//! marked `failed` rather than left `starting` forever. Binding conflicts
//! and crash loops both surface through this same health-timeout path.

use lf_daemon::{Orchestrator, OrchestrationMode, ServiceId, ServiceSpec};
use lf_wire::ServiceState;

fn never_healthy_spec(tmp: &tempfile::TempDir, port: Option<u16>) -> ServiceSpec {
    ServiceSpec {
        service_id: ServiceId::Worker,
        native_argv: vec!["sleep".to_string(), "60".to_string()],
        container_image: None,
        port,
        // No health endpoint ever answers, so the orchestrator's poll loop
        // runs out its full deadline and the service is marked failed.
        health_url: Some("http://127.0.0.1:1/health".to_string()),
        log_path: tmp.path().join("worker.log"),
    }
}

#[tokio::test]
async fn service_that_never_becomes_healthy_is_marked_failed() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(OrchestrationMode::Native, vec![never_healthy_spec(&tmp, None)]);

    let result = orchestrator.start(Some(&[ServiceId::Worker])).await;
    assert!(result.is_err(), "start should time out waiting for health");

    let status = orchestrator.status();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].state, ServiceState::Failed);

    // A failed service can still be stopped cleanly afterward.
    orchestrator.stop(Some(&[ServiceId::Worker])).await.expect("stop should succeed");
    let status = orchestrator.status();
    assert_eq!(status[0].state, ServiceState::Stopped);
}

#[tokio::test]
async fn startup_timeout_with_a_bound_port_carries_kill_port_recovery_commands() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(OrchestrationMode::Native, vec![never_healthy_spec(&tmp, Some(54321))]);

    let err = orchestrator.start(Some(&[ServiceId::Worker])).await.expect_err("start should time out");
    let recovery = err.recovery();
    assert!(!recovery.is_empty(), "S6: recovery list must contain the kill/port commands");
    assert!(recovery.iter().any(|c| c.contains("54321")), "recovery commands should name the held port");
}
