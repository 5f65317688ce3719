// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

use thiserror::Error;

/// Failure modes for a single pluggable adapter call. The ingestion
/// pipeline decides what's fatal to a job and what's only fatal to one
/// file/chunk (§4.3) — this type just reports what happened.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("parser failed: {0}")]
    Parse(String),

    #[error("extractor failed: {0}")]
    Extract(String),

    #[error(transparent)]
    Dependency(#[from] lf_core::DependencyError),
}
