// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf init [path]` — write a starter manifest, failing if one exists
//! (§6 "External Interfaces").

use std::path::Path;

use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

const STARTER_MANIFEST: &str = r#"namespace: local
name: my-project

models:
  - id: default-embedder
    repo: nomic-ai/nomic-embed-text-v1.5

databases:
  docs:
    embedding_strategy: default-embedder
    retrieval_strategy:
      top_k: 5
      rerank: false
    vector_store: sqlite

processing_strategies:
  default:
    filter:
      include: ["**/*"]
      exclude: []
    parsers:
      - parser: text
        file_extensions: [txt, md]
      - parser: pdf
        file_extensions: [pdf]
    extractors: []

datasets: []
"#;

pub fn handle(path: Option<String>, format: OutputFormat) -> Result<(), ExitError> {
    let project_dir = path.map(std::path::PathBuf::from).unwrap_or_else(|| std::path::PathBuf::from("."));
    std::fs::create_dir_all(&project_dir)
        .map_err(|e| ExitError::user(format!("could not create {}: {e}", project_dir.display())))?;

    let manifest_path = project_dir.join("manifest.yaml");
    if manifest_path.exists() {
        return Err(ExitError::user(format!("{} already exists", manifest_path.display())));
    }

    std::fs::write(&manifest_path, STARTER_MANIFEST)
        .map_err(|e| ExitError::user(format!("could not write {}: {e}", manifest_path.display())))?;

    format_or_json(
        format,
        &serde_json::json!({ "manifest_path": manifest_path.display().to_string() }),
        || println!("Wrote {}", manifest_path.display()),
    )
    .map_err(ExitError::from)
}

pub fn manifest_path_for(project_dir: &Path) -> std::path::PathBuf {
    project_dir.join("manifest.yaml")
}
