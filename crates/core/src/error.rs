// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Error taxonomy shared across the orchestration subsystem.
//!
//! Each downstream crate (storage, broker, pipeline, daemon) defines its own
//! `thiserror` enum for crate-local failure modes, but every one of those
//! enums has a variant that carries one of the categories below so that the
//! CLI and the API layer can render a consistent `{code, message, recovery}`
//! triple regardless of which layer failed (see `recovery_for`).

use thiserror::Error;

/// Malformed manifest, unknown strategy, missing referenced database.
///
/// Surfaced at CLI exit with a human-readable message; never caught internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("manifest is not valid YAML: {0}")]
    InvalidYaml(String),

    #[error("strategy {0:?} is not defined in this manifest")]
    UnknownStrategy(String),

    #[error("database {0:?} is not defined in this manifest")]
    UnknownDatabase(String),

    #[error("dataset {0:?} references unknown database {1:?}")]
    DanglingDatasetReference(String, String),

    #[error("manifest is missing required field {0:?}")]
    MissingField(String),
}

/// Broker queue unwritable, result store directory missing.
///
/// Retried with bounded backoff inside the broker; propagated as `FAILURE`
/// if the retries are exhausted.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("queue directory unwritable: {0}")]
    QueueUnwritable(#[source] std::io::Error),

    #[error("result store directory missing: {0}")]
    StoreMissing(std::path::PathBuf),

    #[error("no queue is configured for task name {0:?}")]
    UnroutableName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any exception raised inside a registered task handler.
///
/// Captured with a traceback string, written to the Task Record as `FAILURE`,
/// never re-raised to the transport loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("handler failed: {message}")]
pub struct HandlerError {
    pub message: String,
    pub traceback: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { traceback: message.clone(), message }
    }

    pub fn with_traceback(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self { message: message.into(), traceback: traceback.into() }
    }
}

/// Embedder/vector-store/runtime unreachable.
///
/// Inside a task, retried a finite number of times with backoff; if still
/// failing the task FAILS and the orchestrator's health report marks the
/// dependent service `degraded`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("{service} unreachable after {attempts} attempt(s): {detail}")]
    Unreachable { service: String, attempts: u32, detail: String },

    #[error("{service} returned a dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { service: String, expected: usize, actual: usize },
}

/// A short machine-readable failure code plus a human message and copy-paste
/// recovery commands, as required by the user-visible failure contract (the
/// CLI and UI render `recovery` verbatim).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserFacingError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub recovery: Vec<String>,
}

impl UserFacingError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into(), recovery: Vec::new() }
    }

    pub fn with_recovery(mut self, commands: impl IntoIterator<Item = String>) -> Self {
        self.recovery = commands.into_iter().collect();
        self
    }
}

/// Umbrella error for the rare case a caller wants one type across categories.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}
