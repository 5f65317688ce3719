// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-core: shared domain types for the LlamaFarm orchestration and
//! task-dispatch subsystem (result store, task broker, ingestion pipeline,
//! service orchestrator).

pub mod clock;
pub mod error;
pub mod id;
pub mod macros;
pub mod progress;
pub mod signature;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ConfigError, CoreError, DependencyError, HandlerError, TransportError, UserFacingError};
pub use id::short;
pub use progress::{PipelineStage, Progress};
pub use signature::Signature;
pub use task::{
    GroupRecord, TaskId, TaskKind, TaskMetadata, TaskName, TaskRecord, TaskState, TaskStateKind,
};
