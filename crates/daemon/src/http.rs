// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! The HTTP API the CLI and UI talk to (§6 "External Interfaces"): dataset
//! ingestion, task polling, queries, model downloads, and service control.
//! All of it is a thin translation layer over `lf-broker`/`lf-pipeline`/
//! [`crate::orchestrator::Orchestrator`] — no domain logic lives here.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path as AxumPath, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::Stream;
use lf_broker::Broker;
use lf_core::{ConfigError, TaskId};
use lf_pipeline::{PipelineContext, QueryArgs};
use lf_wire::{
    DownloadEvent, ErrorPayload, HealthReport, HealthStatus, IngestRequest, QueryRequest, QueryResponse,
    ServiceState, ServiceStatusEntry, TaskStatusResponse, CODE_CONFIG_ERROR, CODE_DEPENDENCY_ERROR,
    CODE_SERVICE_ERROR, CODE_TRANSPORT_ERROR,
};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Notify;

use crate::download::{stream_download, DownloadRequest};
use crate::error::DaemonError;
use crate::orchestrator::Orchestrator;
use crate::service::ServiceId;

/// Everything a request handler needs; cloned per-request (every field is
/// an `Arc` or otherwise cheap to clone), not locked as a whole (§5 "Shared
/// resources" — only the orchestrator's own descriptor map is mutex-guarded).
///
/// This process is itself the `api_server` service (§4.4): it owns the only
/// [`Orchestrator`] instance, which in turn spawns `worker` and `runtime` as
/// child processes. The orchestrator's own spec map never contains
/// `ServiceId::ApiServer` — its status is synthesized here from `port` and
/// `started_at` instead of asked of itself.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub orchestrator: Arc<Orchestrator>,
    pub pipeline_ctx: Arc<PipelineContext>,
    pub models_dir: PathBuf,
    pub http: reqwest::Client,
    pub port: u16,
    pub started_at: Instant,
    pub shutdown: Arc<Notify>,
}

impl AppState {
    fn self_status(&self) -> ServiceStatusEntry {
        ServiceStatusEntry {
            service_id: ServiceId::ApiServer.to_string(),
            state: ServiceState::Running,
            pid: Some(std::process::id()),
            port: Some(self.port),
            health: HealthStatus::Healthy,
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/datasets/process", post(process_dataset))
        .route("/tasks/:task_id", get(task_status))
        .route("/rag/query", post(rag_query))
        .route("/health", get(health))
        .route("/services/status", get(services_status))
        .route("/services/start", post(start_services))
        .route("/services/stop", post(stop_services))
        .route("/downloads/:model_id", get(download_model))
        .with_state(state)
}

/// `POST /datasets/process` — validates the manifest then dispatches
/// `rag.ingest_file` to the broker; the response carries only the new
/// task's id, never the job's outcome (§6 "Task names").
async fn process_dataset(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let manifest_path = Path::new(&req.project_dir).join("manifest.yaml");
    lf_manifest::load_from_path(&manifest_path).map_err(ApiError::Config)?;

    let args = lf_pipeline::IngestArgs {
        project_dir: req.project_dir,
        database_name: req.database_name,
        processing_strategy: "default".to_string(),
        source_path: req.source_path,
    };
    let sig = state
        .broker
        .build_signature("rag.ingest_file", &args)
        .map_err(|e| ApiError::Config(ConfigError::InvalidYaml(e.to_string())))?;
    let handle = state.broker.dispatch(sig).map_err(ApiError::Broker)?;
    task_status(State(state), AxumPath(handle.task_id)).await
}

/// `GET /tasks/:task_id` — a failed job is a normal 200 with `error`
/// populated, never a 5xx (§7 "Propagation policy").
async fn task_status(
    State(state): State<AppState>,
    AxumPath(task_id): AxumPath<TaskId>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let polled = state.broker.poll(&task_id).map_err(ApiError::Broker)?;
    Ok(Json(TaskStatusResponse {
        task_id: polled.task_id,
        kind: polled.kind,
        state: polled.state.kind(),
        result: polled.state.result().cloned(),
        error: polled.state.traceback().map(str::to_string),
        children: polled.children,
    }))
}

/// `POST /rag/query` — answered synchronously inside this process, unlike
/// ingestion and model-download jobs: §1 names only those two as broker-
/// dispatched, so a query never waits on a worker-queue round trip.
async fn rag_query(
    State(state): State<AppState>,
    Json(req): Json<RagQueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let manifest_path = Path::new(&req.project_dir).join("manifest.yaml");
    let manifest = lf_manifest::load_from_path(&manifest_path).map_err(ApiError::Config)?;
    let args = QueryArgs { database_name: req.query.database_name, query: req.query.query, k: req.query.k.unwrap_or(5) };
    let hits = lf_pipeline::run_query(&state.pipeline_ctx, &manifest, &args).await.map_err(ApiError::Pipeline)?;
    Ok(Json(QueryResponse { hits }))
}

#[derive(Debug, Deserialize)]
struct RagQueryRequest {
    project_dir: String,
    #[serde(flatten)]
    query: QueryRequest,
}

/// `GET /health` — the aggregate banner, not any one service's own report;
/// each service's `/health` is what [`Orchestrator::wait_healthy`] polls
/// internally during startup.
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let mut reports = vec![(ServiceId::ApiServer.to_string(), crate::health::healthy_report())];
    for entry in state.orchestrator.status() {
        let Some(service_id) = service_id_from_str(&entry.service_id) else { continue };
        let report = state.orchestrator.wait_healthy(service_id, Duration::from_millis(1)).await;
        reports.push((entry.service_id, report));
    }
    Json(crate::health::aggregate(reports))
}

async fn services_status(State(state): State<AppState>) -> Json<Vec<ServiceStatusEntry>> {
    let mut entries = vec![state.self_status()];
    entries.extend(state.orchestrator.status());
    Json(entries)
}

#[derive(Debug, Deserialize, Default)]
struct ServiceSelection {
    #[serde(default)]
    services: Vec<String>,
}

/// `api_server` is this process — it is always already "started" from its
/// own point of view, so it's dropped from what's forwarded to the
/// orchestrator (which only knows about `worker`/`runtime`).
async fn start_services(
    State(state): State<AppState>,
    body: Option<Json<ServiceSelection>>,
) -> Result<Json<Vec<ServiceStatusEntry>>, ApiError> {
    let ids = parse_service_ids(body)?;
    let orchestrator_ids = without_self(ids);
    state.orchestrator.start(orchestrator_ids.as_deref()).await.map_err(ApiError::Daemon)?;
    let mut entries = vec![state.self_status()];
    entries.extend(state.orchestrator.status());
    Ok(Json(entries))
}

/// Stopping `api_server` (explicitly, or implicitly via an unscoped "stop
/// everything") tears down `worker`/`runtime` first, then asks this
/// process's own HTTP server to shut down gracefully after the response
/// for this request has been sent.
async fn stop_services(
    State(state): State<AppState>,
    body: Option<Json<ServiceSelection>>,
) -> Result<Json<Vec<ServiceStatusEntry>>, ApiError> {
    let ids = parse_service_ids(body)?;
    let stop_self = match &ids {
        None => true,
        Some(ids) => ids.contains(&ServiceId::ApiServer),
    };
    let orchestrator_ids = without_self(ids);
    state.orchestrator.stop(orchestrator_ids.as_deref()).await.map_err(ApiError::Daemon)?;
    if stop_self {
        state.shutdown.notify_one();
    }
    let mut entries = vec![state.self_status()];
    entries.extend(state.orchestrator.status());
    Ok(Json(entries))
}

fn without_self(ids: Option<Vec<ServiceId>>) -> Option<Vec<ServiceId>> {
    ids.map(|ids| ids.into_iter().filter(|id| *id != ServiceId::ApiServer).collect())
}

fn parse_service_ids(body: Option<Json<ServiceSelection>>) -> Result<Option<Vec<ServiceId>>, ApiError> {
    let Some(Json(selection)) = body else { return Ok(None) };
    if selection.services.is_empty() {
        return Ok(None);
    }
    selection
        .services
        .iter()
        .map(|s| service_id_from_str(s).ok_or_else(|| ApiError::Daemon(DaemonError::UnknownService(s.clone()))))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn service_id_from_str(s: &str) -> Option<ServiceId> {
    ServiceId::startup_order().iter().copied().find(|id| id.as_str() == s)
}

/// `GET /downloads/:model_id?url=...&dest=...&quantization=...` — proxies a
/// model download as an SSE event stream; closing the connection aborts
/// the download at the next chunk boundary (§4.4).
async fn download_model(
    State(state): State<AppState>,
    AxumPath(model_id): AxumPath<String>,
    axum::extract::Query(params): axum::extract::Query<DownloadParams>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let destination = state.models_dir.join(&model_id).join(params.quantization.as_deref().unwrap_or("default"));
    let request =
        DownloadRequest { model_id, quantization: params.quantization, url: params.url, destination };
    let stream = stream_download(state.http.clone(), request);
    let events = tokio_stream::StreamExt::map(stream, |event: DownloadEvent| {
        Ok(Event::default().json_data(event).unwrap_or_else(|_| Event::default().data("serialization error")))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct DownloadParams {
    url: String,
    #[serde(default)]
    quantization: Option<String>,
}

/// Maps the error taxonomy (§7) to wire status codes. Task-level failures
/// never reach here — they're reported as `200` bodies with `error` set.
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Broker(#[from] lf_broker::BrokerError),
    #[error(transparent)]
    Pipeline(#[from] lf_pipeline::PipelineError),
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Config(_) => (StatusCode::BAD_REQUEST, CODE_CONFIG_ERROR),
            ApiError::Broker(lf_broker::BrokerError::Transport(_)) => (StatusCode::SERVICE_UNAVAILABLE, CODE_TRANSPORT_ERROR),
            ApiError::Broker(lf_broker::BrokerError::Store(_)) => (StatusCode::SERVICE_UNAVAILABLE, CODE_TRANSPORT_ERROR),
            ApiError::Pipeline(_) => (StatusCode::BAD_GATEWAY, CODE_DEPENDENCY_ERROR),
            ApiError::Daemon(_) => (StatusCode::SERVICE_UNAVAILABLE, CODE_SERVICE_ERROR),
        };
        let recovery = match &self {
            ApiError::Daemon(e) => e.recovery(),
            _ => Vec::new(),
        };
        let payload = ErrorPayload::new(code, self.to_string()).with_recovery(recovery);
        (status, Json(payload)).into_response()
    }
}
