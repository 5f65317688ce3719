// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("unknown service `{0}`")]
    UnknownService(String),

    #[error("service `{service}` failed to become healthy within {deadline_secs}s: {last_health}")]
    StartupTimeout { service: String, deadline_secs: u64, last_health: String, port: Option<u16> },

    #[error("service `{0}` did not stop within its grace period")]
    ShutdownTimeout(String),

    #[error(transparent)]
    Config(#[from] lf_core::ConfigError),

    #[error(transparent)]
    Store(#[from] lf_storage::StoreError),

    #[error(transparent)]
    Broker(#[from] lf_broker::BrokerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DaemonError {
    /// Copy-paste shell commands for the user-visible failure contract
    /// (§6 "on timeout mark `failed`"). A startup timeout is most often a
    /// port already held by another process (seed scenario S6), so the
    /// recovery commands name the port to inspect and free.
    pub fn recovery(&self) -> Vec<String> {
        match self {
            DaemonError::StartupTimeout { port: Some(port), .. } => {
                vec![format!("lsof -i :{port}"), format!("kill $(lsof -t -i :{port})")]
            }
            _ => Vec::new(),
        }
    }
}
