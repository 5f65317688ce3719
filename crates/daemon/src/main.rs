// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lfd`: one binary, two roles selected by subcommand. `serve` is the
//! process the CLI's `start` launches and is itself the `api_server`
//! service (§4.4); at startup it spawns `worker` and the Universal Runtime
//! as child processes via its own argv, via [`lf_daemon::Orchestrator`], and
//! tears them down on `services stop`/SIGINT. `worker` runs the broker
//! consumer loop and is never invoked directly by a user. The Universal
//! Runtime is a separate, external binary (§9 "Universal Runtime ... just
//! an HTTP dependency") and is not implemented here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use lf_broker::{Broker, Consumer, FsQueue, QueueRouter};
use lf_daemon::http::{router, AppState};
use lf_daemon::{DaemonError, OrchestrationMode, Orchestrator, ServiceId, ServiceSpec};
use lf_pipeline::PipelineContext;
use lf_storage::ResultStore;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lfd", version)]
struct Cli {
    /// Project directory containing `manifest.yaml` (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Where Result Store/queue/vector-store state lives (default: `<project_dir>/.llamafarm`).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server; also owns and spawns `worker` and the
    /// Universal Runtime (§4.4).
    Serve {
        #[arg(long, default_value = "7878")]
        port: u16,
        #[arg(long, value_enum, default_value = "native")]
        mode: CliOrchestrationMode,
    },
    /// Run the broker consumer loop for `rag.ingest_file`. Spawned by
    /// `serve`, not run directly by users.
    Worker,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliOrchestrationMode {
    Native,
    Container,
    Auto,
}

impl From<CliOrchestrationMode> for OrchestrationMode {
    fn from(mode: CliOrchestrationMode) -> Self {
        match mode {
            CliOrchestrationMode::Native => OrchestrationMode::Native,
            CliOrchestrationMode::Container => OrchestrationMode::Container,
            CliOrchestrationMode::Auto => OrchestrationMode::Auto,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn state_dir(cli: &Cli) -> PathBuf {
    cli.state_dir.clone().unwrap_or_else(|| cli.project_dir.join(".llamafarm"))
}

fn router_for_core_tasks() -> QueueRouter {
    QueueRouter::new().with_route("rag", "rag").with_route("orchestration", "server")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let state_root = state_dir(&cli);

    match cli.command {
        Command::Serve { port, mode } => run_serve(&cli.project_dir, &state_root, port, mode.into()).await,
        Command::Worker => run_worker(&cli.project_dir, &state_root).await,
    }
}

/// Runs the HTTP API server: `POST /datasets/process`, `GET /tasks/:id`,
/// `POST /rag/query`, `/health`, `/services/*`, `/downloads/:model`. Spawns
/// `worker` and the Universal Runtime via the orchestrator before it starts
/// accepting connections, and tears both down on graceful shutdown.
async fn run_serve(project_dir: &PathBuf, state_root: &PathBuf, port: u16, mode: OrchestrationMode) -> anyhow::Result<()> {
    std::fs::create_dir_all(state_root.join("logs"))?;
    std::fs::create_dir_all(state_root.join("result_store"))?;
    let store = Arc::new(ResultStore::create(state_root.join("result_store"))?);
    let broker = Arc::new(Broker::new(store, state_root.join("queue"), router_for_core_tasks()));

    let exe = std::env::current_exe()?.to_string_lossy().to_string();
    let project_dir_str = project_dir.to_string_lossy().to_string();
    let specs = vec![
        ServiceSpec {
            service_id: ServiceId::Worker,
            native_argv: vec![exe, "worker".to_string(), "--project-dir".to_string(), project_dir_str],
            container_image: Some("llamafarm/worker".to_string()),
            port: None,
            health_url: None,
            log_path: state_root.join("logs/worker.log"),
        },
        ServiceSpec {
            service_id: ServiceId::Runtime,
            native_argv: vec!["llamafarm-runtime".to_string()],
            container_image: Some("llamafarm/runtime".to_string()),
            port: Some(8008),
            health_url: Some("http://127.0.0.1:8008/health".to_string()),
            log_path: state_root.join("logs/runtime.log"),
        },
    ];
    let orchestrator = Arc::new(Orchestrator::new(mode, specs));
    orchestrator.start(None).await?;

    let state = AppState {
        broker,
        orchestrator: orchestrator.clone(),
        pipeline_ctx: Arc::new(PipelineContext::new()),
        models_dir: state_root.join("models"),
        http: reqwest::Client::new(),
        port,
        started_at: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    };
    let shutdown = state.shutdown.clone();

    let app = router(state).layer(tower_http::trace::TraceLayer::new_for_http());
    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, project_dir = %project_dir.display(), "api server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown(shutdown)).await?;

    tracing::info!("shutting down worker/runtime");
    orchestrator.stop(None).await?;
    Ok(())
}

async fn wait_for_shutdown(notify: Arc<Notify>) {
    tokio::select! {
        _ = notify.notified() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

/// Runs the broker consumer loop: claims `rag.ingest_file` jobs and drives
/// them through the ingestion pipeline until interrupted.
///
/// Per §5 the worker handler is plain blocking code that calls back into
/// async adapters with `rt.block_on`; that is only legal from a thread the
/// async runtime doesn't itself drive, so the loop runs on a dedicated
/// blocking-pool thread rather than directly inside this `async fn`.
async fn run_worker(project_dir: &PathBuf, state_root: &PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(state_root.join("result_store"))?;
    let store = Arc::new(ResultStore::create(state_root.join("result_store"))?);
    let queue = Arc::new(FsQueue::open(state_root.join("queue").join("rag"))?);
    let mut consumer = Consumer::new(store, queue, format!("worker-{}", std::process::id()));

    // Concrete embedders/vector stores are external collaborators supplied
    // by the Designer UI's generated plugin, not this crate (`lf-manifest`'s
    // `VectorStoreConfig` doc comment); an unconfigured database simply
    // fails its jobs with `UnknownDatabase` rather than panicking.
    let ctx = Arc::new(PipelineContext::new());
    let rt = tokio::runtime::Handle::current();
    lf_daemon::worker::register_ingest_handler(&mut consumer, state_root.clone(), ctx, rt);

    tracing::info!(project_dir = %project_dir.display(), "worker started");
    tokio::task::spawn_blocking(move || loop {
        match consumer.tick() {
            Ok(true) => continue,
            Ok(false) => std::thread::sleep(Duration::from_millis(200)),
            Err(e) => {
                tracing::error!(error = %e, "worker tick failed");
                return Err(DaemonError::from(e));
            }
        }
    })
    .await??;
    Ok(())
}
