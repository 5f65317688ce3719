// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `POST /datasets/process` and `GET /tasks/:task_id` bodies.

use lf_core::{TaskId, TaskKind, TaskStateKind};
use serde::{Deserialize, Serialize};

/// Body of `POST /datasets/process`; mirrors `rag.ingest_file`'s Signature
/// args (§6 "Task names").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestRequest {
    pub project_dir: String,
    pub database_name: String,
    pub source_path: String,
}

/// Body of `GET /tasks/:task_id`. The API layer never returns 5xx for a
/// failed ingestion job — `state == failure` is a normal 200 response with
/// `error` populated instead (§7 "Propagation policy").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub state: TaskStateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskId>,
}
