// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! HTTP client for the `lfd` API server (§6 "External Interfaces"). Every
//! subcommand goes through here instead of touching `reqwest` directly, so
//! auto-start and error-payload handling stay in one place.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use lf_wire::{
    ErrorPayload, HealthReport, IngestRequest, QueryRequest, QueryResponse, ServiceStatusEntry,
    TaskStatusResponse,
};
use reqwest::StatusCode;

use crate::exit_error::ExitError;

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Verifies the daemon answers `/health`; if it doesn't and `auto_start`
    /// is set, spawns `lfd supervisor` detached and polls until it does or
    /// `deadline` elapses (§6 "Global flags": `--auto-start` default true,
    /// a server-start deadline).
    pub async fn ensure_running(
        &self,
        auto_start: bool,
        project_dir: &Path,
        port: u16,
        mode: &str,
        deadline: Duration,
    ) -> Result<(), ExitError> {
        if self.ping().await {
            return Ok(());
        }
        if !auto_start {
            return Err(ExitError::service("lfd is not running (pass --auto-start or run `lf start`)"));
        }

        spawn_server(project_dir, port, mode)?;

        let started = Instant::now();
        while started.elapsed() < deadline {
            if self.ping().await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Err(ExitError::service(format!(
            "lfd did not become healthy within {:?}",
            deadline
        )))
    }

    async fn ping(&self) -> bool {
        self.http
            .get(self.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    pub async fn process_dataset(&self, req: &IngestRequest) -> Result<TaskStatusResponse, ExitError> {
        self.post_json("/datasets/process", req).await
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ExitError> {
        self.get_json(&format!("/tasks/{task_id}")).await
    }

    /// Polls `GET /tasks/:id` until the task leaves `pending`/`started`,
    /// sleeping between attempts (§3 "state machine").
    pub async fn poll_task_until_terminal(&self, task_id: &str) -> Result<TaskStatusResponse, ExitError> {
        loop {
            let status = self.task_status(task_id).await?;
            use lf_core::TaskStateKind::*;
            match status.state {
                Pending | Started => tokio::time::sleep(Duration::from_millis(250)).await,
                Success | Failure | Revoked => return Ok(status),
            }
        }
    }

    pub async fn rag_query(&self, project_dir: &str, req: &QueryRequest) -> Result<QueryResponse, ExitError> {
        #[derive(serde::Serialize)]
        struct Body<'a> {
            project_dir: &'a str,
            #[serde(flatten)]
            query: &'a QueryRequest,
        }
        self.post_json("/rag/query", &Body { project_dir, query: req }).await
    }

    pub async fn health(&self) -> Result<HealthReport, ExitError> {
        self.get_json("/health").await
    }

    pub async fn services_status(&self) -> Result<Vec<ServiceStatusEntry>, ExitError> {
        self.get_json("/services/status").await
    }

    pub async fn services_start(&self, services: Vec<String>) -> Result<Vec<ServiceStatusEntry>, ExitError> {
        self.post_selection("/services/start", services).await
    }

    pub async fn services_stop(&self, services: Vec<String>) -> Result<Vec<ServiceStatusEntry>, ExitError> {
        self.post_selection("/services/stop", services).await
    }

    async fn post_selection(&self, path: &str, services: Vec<String>) -> Result<Vec<ServiceStatusEntry>, ExitError> {
        #[derive(serde::Serialize)]
        struct Selection {
            services: Vec<String>,
        }
        self.post_json(path, &Selection { services }).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ExitError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ExitError::service(format!("could not reach lfd: {e}")))?;
        Self::decode(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ExitError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ExitError::service(format!("could not reach lfd: {e}")))?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ExitError> {
        if resp.status().is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| ExitError::service(format!("malformed response from lfd: {e}")));
        }
        let status = resp.status();
        match resp.json::<ErrorPayload>().await {
            Ok(payload) => Err(ExitError::from_payload(payload)),
            Err(_) => Err(ExitError::new(
                if status == StatusCode::BAD_REQUEST { 1 } else { 2 },
                format!("lfd returned {status}"),
            )),
        }
    }
}

fn spawn_server(project_dir: &Path, port: u16, mode: &str) -> Result<(), ExitError> {
    let exe = find_lfd_binary()?;
    Command::new(exe)
        .arg("serve")
        .arg("--project-dir")
        .arg(project_dir)
        .arg("--port")
        .arg(port.to_string())
        .arg("--mode")
        .arg(mode)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ExitError::service(format!("failed to start lfd: {e}")))?;
    Ok(())
}

/// Finds the `lfd` binary next to this one, falling back to `PATH` — the
/// same sibling-binary convention a Cargo workspace installs with.
fn find_lfd_binary() -> Result<PathBuf, ExitError> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("lfd");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }
    Ok(PathBuf::from("lfd"))
}
