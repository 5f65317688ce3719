// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf`: the CLI users and the Designer UI script against (§6 "External
//! Interfaces"). Talks to `lfd` exclusively over HTTP via [`client::Client`]
//! — it never links `lf-daemon`, `lf-broker`, or `lf-pipeline` directly, so
//! the CLI and the daemon can be upgraded independently.

mod client;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lf", version, about = "LlamaFarm: local-first RAG projects")]
struct Cli {
    /// Base URL of the `lfd` API server.
    #[arg(long, global = true, env = "LF_SERVER_URL", default_value = "http://127.0.0.1:7878")]
    server_url: String,

    /// Spawn `lfd` automatically if it isn't already reachable.
    #[arg(long, global = true, env = "LF_AUTO_START", default_value_t = true, value_parser = clap::value_parser!(bool))]
    auto_start: bool,

    /// Project directory to operate in.
    #[arg(long, global = true, default_value = ".")]
    cwd: PathBuf,

    /// Verbose logging.
    #[arg(long, global = true)]
    debug: bool,

    /// How long to wait for an auto-started `lfd` to become healthy.
    #[arg(long, global = true, default_value_t = 30)]
    server_start_deadline_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a starter manifest in the target directory.
    Init {
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Start `lfd` and every service it owns, then print a health banner.
    Start {
        #[arg(long, value_enum, env = "LF_ORCHESTRATION_MODE", default_value = "native")]
        mode: commands::start::Mode,
        #[arg(long, default_value_t = 7878)]
        port: u16,
    },
    /// Stop one service, or everything if none is named.
    Stop { service: Option<String> },
    #[command(subcommand)]
    Services(ServicesCommand),
    #[command(subcommand)]
    Datasets(DatasetsCommand),
    #[command(subcommand)]
    Rag(RagCommand),
    /// Send one chat message to the configured model.
    Chat {
        msg: Option<String>,
        /// Print the sanitized equivalent curl request instead of sending it.
        #[arg(long)]
        curl: bool,
        #[arg(long, env = "LF_SESSION_ID")]
        session_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ServicesCommand {
    Status {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum DatasetsCommand {
    Create { name: String, database: String },
    Upload { name: String, source: String },
    Process {
        database: String,
        source: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    Delete { name: String },
}

#[derive(Subcommand)]
enum RagCommand {
    Query {
        database: String,
        query: String,
        #[arg(long, default_value_t = 5)]
        k: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    Stats {
        database: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    Health {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("error: {e}");
        output::print_recovery(&e.recovery);
        std::process::exit(e.code);
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let project_dir = cli.cwd.clone();
    let client = client::Client::new(cli.server_url.clone());
    let deadline = Duration::from_secs(cli.server_start_deadline_secs);

    // `init` never needs a running daemon.
    if let Command::Init { path, format } = cli.command {
        return commands::init::handle(path, format);
    }

    let port = port_from_url(&cli.server_url);

    match cli.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Start { mode, port: start_port } => {
            commands::start::handle(&client, cli.auto_start, &project_dir, start_port, mode, deadline).await
        }
        Command::Stop { service } => commands::stop::handle(&client, service).await,
        Command::Services(ServicesCommand::Status { format }) => {
            client.ensure_running(cli.auto_start, &project_dir, port, "native", deadline).await?;
            commands::services::status(&client, format).await
        }
        Command::Datasets(cmd) => {
            client.ensure_running(cli.auto_start, &project_dir, port, "native", deadline).await?;
            commands::datasets::handle(&client, &project_dir, cmd).await
        }
        Command::Rag(cmd) => {
            client.ensure_running(cli.auto_start, &project_dir, port, "native", deadline).await?;
            commands::rag::handle(&client, &project_dir, cmd).await
        }
        Command::Chat { msg, curl, session_id } => {
            client.ensure_running(cli.auto_start, &project_dir, port, "native", deadline).await?;
            commands::chat::handle(&client, msg, curl, session_id).await
        }
    }
}

fn port_from_url(url: &str) -> u16 {
    url.rsplit_once(':').and_then(|(_, p)| p.trim_end_matches('/').parse().ok()).unwrap_or(7878)
}
