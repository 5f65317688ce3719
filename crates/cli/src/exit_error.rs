// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Custom error type that carries a process exit code (§6 "CLI" — 0
//! success, 1 user error, 2 service error, 3 task failure).
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, so `main()` is the only place that terminates the process.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
    pub recovery: Vec<String>,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), recovery: Vec::new() }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn task_failure(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn with_recovery(mut self, commands: impl IntoIterator<Item = String>) -> Self {
        self.recovery = commands.into_iter().collect();
        self
    }

    /// Lift a wire `ErrorPayload` (code/message/recovery) into the matching
    /// exit code. `task_failure` maps to 3; everything else the API server
    /// can emit is a user or service-level problem (§7 "Taxonomy").
    pub fn from_payload(payload: lf_wire::ErrorPayload) -> Self {
        let code = match payload.code.as_str() {
            lf_wire::CODE_TASK_FAILURE => 3,
            lf_wire::CODE_SERVICE_ERROR | lf_wire::CODE_DEPENDENCY_ERROR | lf_wire::CODE_TRANSPORT_ERROR => 2,
            _ => 1,
        };
        Self { code, message: payload.message, recovery: payload.recovery }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<anyhow::Error> for ExitError {
    fn from(e: anyhow::Error) -> Self {
        Self::new(1, e.to_string())
    }
}
