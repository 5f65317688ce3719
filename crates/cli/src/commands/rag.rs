// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf rag query/stats/health` (§6).

use std::path::Path;

use lf_manifest::load_from_path;
use lf_wire::QueryRequest;

use crate::client::Client;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use crate::RagCommand;

pub async fn handle(client: &Client, project_dir: &Path, cmd: RagCommand) -> Result<(), ExitError> {
    match cmd {
        RagCommand::Query { database, query, k, format } => query(client, project_dir, database, query, k, format).await,
        RagCommand::Stats { database, format } => stats(project_dir, database, format),
        RagCommand::Health { format } => health(client, format).await,
    }
}

async fn query(
    client: &Client,
    project_dir: &Path,
    database: String,
    query: String,
    k: u32,
    format: OutputFormat,
) -> Result<(), ExitError> {
    let project_dir = project_dir.display().to_string();
    let req = QueryRequest { database_name: database, query, k: Some(k) };
    let response = client.rag_query(&project_dir, &req).await?;

    format_or_json(format, &response, || {
        if response.hits.is_empty() {
            println!("No hits");
        }
        for hit in &response.hits {
            println!("[{:.3}] {} — {}", hit.score, hit.chunk_id, truncate(&hit.text, 120));
        }
    })
    .map_err(ExitError::from)
}

/// `rag stats` is a local read of the manifest's database declaration; the
/// daemon owns chunk counts (via the vector store), not dataset metadata, so
/// this reports what the project itself says about the database.
fn stats(project_dir: &Path, database: String, format: OutputFormat) -> Result<(), ExitError> {
    let manifest = load_from_path(project_dir.join("manifest.yaml")).map_err(|e| ExitError::user(e.to_string()))?;
    let db = manifest
        .databases
        .get(&database)
        .ok_or_else(|| ExitError::user(format!("no such database '{database}' in manifest.yaml")))?;

    format_or_json(
        format,
        &serde_json::json!({
            "database": database,
            "embedding_model": db.embedding_strategy.model_id(),
            "vector_store": db.vector_store.store_type,
            "top_k": db.retrieval_strategy.top_k,
        }),
        || {
            println!("database: {database}");
            println!("  embedding model: {}", db.embedding_strategy.model_id());
            println!("  vector store: {}", db.vector_store.store_type);
            println!("  top_k: {}", db.retrieval_strategy.top_k);
        },
    )
    .map_err(ExitError::from)
}

async fn health(client: &Client, format: OutputFormat) -> Result<(), ExitError> {
    let report = client.health().await?;
    format_or_json(format, &report, || {
        println!("status: {:?}", report.status);
        for (name, component) in &report.components {
            println!("  {name}: {:?}", component.status);
        }
    })
    .map_err(ExitError::from)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max])
    }
}
