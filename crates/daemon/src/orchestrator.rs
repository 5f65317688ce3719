// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! The Service Orchestrator (§4.4): owns lifecycle and health for the
//! worker, API server, and Universal Runtime.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use lf_wire::{HealthReport, HealthStatus, ServiceState, ServiceStatusEntry};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::process::Command;

use crate::error::DaemonError;
use crate::health::{poll_until_healthy, unhealthy_report};
use crate::service::{OrchestrationMode, ServiceDescriptor, ServiceId};

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// How to spawn and health-check one service, resolved from the project's
/// configuration at startup.
pub struct ServiceSpec {
    pub service_id: ServiceId,
    pub native_argv: Vec<String>,
    pub container_image: Option<String>,
    pub port: Option<u16>,
    pub health_url: Option<String>,
    pub log_path: PathBuf,
}

/// Owns every [`ServiceDescriptor`]; no external mutation (§5 "Shared resources").
pub struct Orchestrator {
    mode: OrchestrationMode,
    specs: HashMap<ServiceId, ServiceSpec>,
    descriptors: Mutex<HashMap<ServiceId, ServiceDescriptor>>,
    http: reqwest::Client,
}

impl Orchestrator {
    pub fn new(mode: OrchestrationMode, specs: Vec<ServiceSpec>) -> Self {
        let mut descriptors = HashMap::new();
        let mut spec_map = HashMap::new();
        for spec in specs {
            descriptors.insert(spec.service_id, ServiceDescriptor::new(spec.service_id, mode.resolved()));
            spec_map.insert(spec.service_id, spec);
        }
        Self { mode, specs: spec_map, descriptors: Mutex::new(descriptors), http: reqwest::Client::new() }
    }

    pub fn status(&self) -> Vec<ServiceStatusEntry> {
        let descriptors = self.descriptors.lock();
        ServiceId::startup_order().iter().filter_map(|id| descriptors.get(id)).map(|d| d.to_status_entry()).collect()
    }

    /// Start the named services (or all, in dependency order) and poll each
    /// healthy before moving to the next. Idempotent: a service already
    /// `running` is left alone (§4.4 "Public contract").
    pub async fn start(&self, service_ids: Option<&[ServiceId]>) -> Result<(), DaemonError> {
        let targets = self.resolve_targets(service_ids, ServiceId::startup_order());
        for service_id in targets {
            self.start_one(service_id).await?;
        }
        Ok(())
    }

    async fn start_one(&self, service_id: ServiceId) -> Result<(), DaemonError> {
        {
            let descriptors = self.descriptors.lock();
            if descriptors.get(&service_id).map(|d| d.state) == Some(ServiceState::Running) {
                return Ok(());
            }
        }
        let spec = self.specs.get(&service_id).ok_or_else(|| DaemonError::UnknownService(service_id.to_string()))?;

        {
            let mut descriptors = self.descriptors.lock();
            if let Some(d) = descriptors.get_mut(&service_id) {
                d.state = ServiceState::Starting;
            }
        }

        let spawn_result = match self.mode.resolved() {
            OrchestrationMode::Native => spawn_native(spec).await,
            OrchestrationMode::Container => spawn_container(spec).await,
            OrchestrationMode::Auto => unreachable!("resolved() never returns Auto"),
        };

        let (pid, container_id, child) = match spawn_result {
            Ok(triple) => triple,
            Err(e) => {
                self.mark_failed(service_id);
                return Err(e);
            }
        };

        {
            let mut descriptors = self.descriptors.lock();
            if let Some(d) = descriptors.get_mut(&service_id) {
                d.pid = pid;
                d.container_id = container_id;
                d.port = spec.port;
                d.started_at = Some(Instant::now());
                d.child = child;
            }
        }

        let deadline = Duration::from_secs(service_id.default_deadline_secs());
        let health_url = spec.health_url.clone();
        let http = self.http.clone();
        let (healthy, last) = poll_until_healthy(
            || {
                let http = http.clone();
                let url = health_url.clone();
                async move { probe_health(&http, url.as_deref()).await }
            },
            deadline,
        )
        .await;

        let mut descriptors = self.descriptors.lock();
        let Some(d) = descriptors.get_mut(&service_id) else { return Ok(()) };
        if healthy {
            d.state = ServiceState::Running;
            d.health = HealthStatus::Healthy;
            Ok(())
        } else {
            d.state = ServiceState::Failed;
            d.health = last.status;
            Err(DaemonError::StartupTimeout {
                service: service_id.to_string(),
                deadline_secs: deadline.as_secs(),
                last_health: format!("{:?}", last.status),
                port: spec.port,
            })
        }
    }

    fn mark_failed(&self, service_id: ServiceId) {
        let mut descriptors = self.descriptors.lock();
        if let Some(d) = descriptors.get_mut(&service_id) {
            d.state = ServiceState::Failed;
        }
    }

    /// Stop the named services (or all) in reverse dependency order.
    /// Idempotent: a stopped service is left alone.
    pub async fn stop(&self, service_ids: Option<&[ServiceId]>) -> Result<(), DaemonError> {
        let mut order: Vec<ServiceId> = self.resolve_targets(service_ids, ServiceId::startup_order());
        order.reverse();
        for service_id in order {
            self.stop_one(service_id).await?;
        }
        Ok(())
    }

    async fn stop_one(&self, service_id: ServiceId) -> Result<(), DaemonError> {
        let mut child = {
            let mut descriptors = self.descriptors.lock();
            let Some(d) = descriptors.get_mut(&service_id) else {
                return Err(DaemonError::UnknownService(service_id.to_string()));
            };
            if d.state == ServiceState::Stopped {
                return Ok(());
            }
            d.state = ServiceState::Stopping;
            d.child.take()
        };

        if let Some(child) = &mut child {
            send_cooperative_signal(child);
            let exited = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, child.wait()).await;
            if exited.is_err() {
                child.start_kill().ok();
                let _ = child.wait().await;
            }
        }

        let mut descriptors = self.descriptors.lock();
        if let Some(d) = descriptors.get_mut(&service_id) {
            d.state = ServiceState::Stopped;
            d.health = HealthStatus::Unhealthy;
            d.pid = None;
            d.container_id = None;
            d.child = None;
        }
        Ok(())
    }

    /// Poll one service's own `/health` until healthy or `deadline` elapses.
    pub async fn wait_healthy(&self, service_id: ServiceId, deadline: Duration) -> HealthReport {
        let health_url = self.specs.get(&service_id).and_then(|s| s.health_url.clone());
        let http = self.http.clone();
        let (_, report) = poll_until_healthy(
            || {
                let http = http.clone();
                let url = health_url.clone();
                async move { probe_health(&http, url.as_deref()).await }
            },
            deadline,
        )
        .await;
        report
    }

    fn resolve_targets(&self, requested: Option<&[ServiceId]>, default_order: &[ServiceId]) -> Vec<ServiceId> {
        match requested {
            Some(ids) => default_order.iter().copied().filter(|id| ids.contains(id)).collect(),
            None => default_order.to_vec(),
        }
    }
}

async fn probe_health(http: &reqwest::Client, url: Option<&str>) -> HealthReport {
    let Some(url) = url else {
        return unhealthy_report("health", "no health endpoint configured");
    };
    match http.get(url).send().await {
        Ok(resp) => resp.json::<HealthReport>().await.unwrap_or_else(|e| unhealthy_report("health", e.to_string())),
        Err(e) => unhealthy_report("health", e.to_string()),
    }
}

async fn spawn_native(
    spec: &ServiceSpec,
) -> Result<(Option<u32>, Option<String>, Option<tokio::process::Child>), DaemonError> {
    let [binary, args @ ..] = spec.native_argv.as_slice() else {
        return Err(DaemonError::UnknownService(spec.service_id.to_string()));
    };
    if let Some(parent) = spec.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::File::create(&spec.log_path)?;
    let err_file = log_file.try_clone()?;
    let child = Command::new(binary)
        .args(args)
        .stdout(std::process::Stdio::from(log_file))
        .stderr(std::process::Stdio::from(err_file))
        .spawn()?;
    let pid = child.id();
    Ok((pid, None, Some(child)))
}

async fn spawn_container(
    spec: &ServiceSpec,
) -> Result<(Option<u32>, Option<String>, Option<tokio::process::Child>), DaemonError> {
    let image = spec.container_image.as_deref().unwrap_or(spec.service_id.as_str());
    let mut command = Command::new("docker");
    command.args(["run", "-d", "--rm"]);
    if let Some(port) = spec.port {
        command.arg("-p").arg(format!("{port}:{port}"));
    }
    command.arg(image);
    let child = command.spawn()?;
    let pid = child.id();
    Ok((pid, Some(image.to_string()), Some(child)))
}

fn send_cooperative_signal(child: &tokio::process::Child) {
    if let Some(pid) = child.id() {
        let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleep_spec(service_id: ServiceId, tmp: &tempfile::TempDir) -> ServiceSpec {
        ServiceSpec {
            service_id,
            native_argv: vec!["sleep".to_string(), "5".to_string()],
            container_image: None,
            port: None,
            health_url: None,
            log_path: tmp.path().join(format!("{}.log", service_id.as_str())),
        }
    }

    #[tokio::test]
    async fn spawn_native_starts_a_process_with_a_pid() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let spec = sleep_spec(ServiceId::Worker, &tmp);
        let (pid, container_id, child) = spawn_native(&spec).await.expect("should spawn");
        assert!(pid.is_some());
        assert!(container_id.is_none());
        let mut child = child.expect("child handle");
        child.start_kill().ok();
        let _ = child.wait().await;
    }

    #[tokio::test]
    async fn cooperative_signal_terminates_child() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let spec = sleep_spec(ServiceId::Worker, &tmp);
        let (_, _, child) = spawn_native(&spec).await.expect("should spawn");
        let mut child = child.expect("child handle");
        send_cooperative_signal(&child);
        let status = tokio::time::timeout(Duration::from_secs(2), child.wait())
            .await
            .expect("process should exit after SIGTERM")
            .expect("wait should succeed");
        assert!(!status.success());
    }

    #[test]
    fn status_reports_every_service_stopped_before_start() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let specs = vec![
            sleep_spec(ServiceId::Worker, &tmp),
            sleep_spec(ServiceId::ApiServer, &tmp),
            sleep_spec(ServiceId::Runtime, &tmp),
        ];
        let orchestrator = Orchestrator::new(OrchestrationMode::Native, specs);
        let status = orchestrator.status();
        assert_eq!(status.len(), 3);
        assert!(status.iter().all(|s| s.state == ServiceState::Stopped));
        assert_eq!(status[0].service_id, "worker");
        assert_eq!(status[2].service_id, "runtime");
    }

    #[tokio::test]
    async fn stopping_an_already_stopped_service_is_a_noop() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let specs = vec![sleep_spec(ServiceId::Worker, &tmp)];
        let orchestrator = Orchestrator::new(OrchestrationMode::Native, specs);
        orchestrator.stop(Some(&[ServiceId::Worker])).await.expect("noop stop should succeed");
    }
}
