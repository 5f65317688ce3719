// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf datasets create/upload/process/list/delete` (§6).
//!
//! `process` is the only operation that dispatches an async task through
//! `lfd` — it enqueues `rag.ingest_file` and polls it to a terminal state.
//! `create`/`upload`/`list`/`delete` manage the dataset entries in the local
//! `manifest.yaml` directly; the daemon has no dataset bookkeeping of its
//! own (§4.3 scopes the Ingestion Pipeline to turning files into chunks,
//! not to owning project configuration).

use std::path::Path;

use lf_manifest::{load_from_path, Dataset};
use lf_wire::IngestRequest;

use crate::client::Client;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use crate::DatasetsCommand;

pub async fn handle(client: &Client, project_dir: &Path, cmd: DatasetsCommand) -> Result<(), ExitError> {
    match cmd {
        DatasetsCommand::Create { name, database } => create(project_dir, name, database),
        DatasetsCommand::Upload { name, source } => upload(project_dir, name, source),
        DatasetsCommand::Process { database, source, format } => {
            process(client, project_dir, database, source, format).await
        }
        DatasetsCommand::List { format } => list(project_dir, format),
        DatasetsCommand::Delete { name } => delete(project_dir, name),
    }
}

fn manifest_path(project_dir: &Path) -> std::path::PathBuf {
    project_dir.join("manifest.yaml")
}

fn create(project_dir: &Path, name: String, database: String) -> Result<(), ExitError> {
    let path = manifest_path(project_dir);
    let mut manifest = load_from_path(&path).map_err(|e| ExitError::user(e.to_string()))?;
    if manifest.datasets.iter().any(|d| d.name == name) {
        return Err(ExitError::user(format!("dataset '{name}' already exists")));
    }
    manifest.datasets.push(Dataset {
        name: name.clone(),
        database,
        processing_strategy: "default".to_string(),
        paths: Vec::new(),
    });
    write_manifest(&path, &manifest)?;
    println!("Created dataset '{name}'");
    Ok(())
}

fn upload(project_dir: &Path, name: String, source: String) -> Result<(), ExitError> {
    let path = manifest_path(project_dir);
    let mut manifest = load_from_path(&path).map_err(|e| ExitError::user(e.to_string()))?;
    let dataset = manifest
        .datasets
        .iter_mut()
        .find(|d| d.name == name)
        .ok_or_else(|| ExitError::user(format!("no such dataset '{name}' (run `lf datasets create` first)")))?;
    dataset.paths.push(source.clone());
    write_manifest(&path, &manifest)?;
    println!("Added '{source}' to dataset '{name}'");
    Ok(())
}

async fn process(
    client: &Client,
    project_dir: &Path,
    database: String,
    source: String,
    format: OutputFormat,
) -> Result<(), ExitError> {
    let req = IngestRequest {
        project_dir: project_dir.display().to_string(),
        database_name: database,
        source_path: source,
    };
    let dispatched = client.process_dataset(&req).await?;
    let status = client.poll_task_until_terminal(&dispatched.task_id.to_string()).await?;

    format_or_json(format, &status, || match &status.error {
        Some(err) => println!("ingestion failed: {err}"),
        None => println!(
            "ingestion finished: {}",
            status.result.as_ref().map(ToString::to_string).unwrap_or_default()
        ),
    })
    .map_err(ExitError::from)?;

    if status.error.is_some() {
        return Err(ExitError::task_failure("ingestion task failed"));
    }
    Ok(())
}

fn list(project_dir: &Path, format: OutputFormat) -> Result<(), ExitError> {
    let manifest = load_from_path(manifest_path(project_dir)).map_err(|e| ExitError::user(e.to_string()))?;
    format_or_json(format, &manifest.datasets, || {
        if manifest.datasets.is_empty() {
            println!("No datasets defined");
        }
        for dataset in &manifest.datasets {
            println!("{} -> database '{}' ({} path(s))", dataset.name, dataset.database, dataset.paths.len());
        }
    })
    .map_err(ExitError::from)
}

fn delete(project_dir: &Path, name: String) -> Result<(), ExitError> {
    let path = manifest_path(project_dir);
    let mut manifest = load_from_path(&path).map_err(|e| ExitError::user(e.to_string()))?;
    let before = manifest.datasets.len();
    manifest.datasets.retain(|d| d.name != name);
    if manifest.datasets.len() == before {
        return Err(ExitError::user(format!("no such dataset '{name}'")));
    }
    write_manifest(&path, &manifest)?;
    println!("Deleted dataset '{name}'");
    Ok(())
}

fn write_manifest(path: &Path, manifest: &lf_manifest::ProjectManifest) -> Result<(), ExitError> {
    let yaml = serde_yaml::to_string(manifest).map_err(|e| ExitError::user(e.to_string()))?;
    std::fs::write(path, yaml).map_err(|e| ExitError::user(format!("could not write {}: {e}", path.display())))
}
