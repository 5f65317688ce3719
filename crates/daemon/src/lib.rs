// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-daemon (`lfd`): the long-running process that ties the Result Store,
//! Task Broker, Ingestion Pipeline, and Service Orchestrator together
//! behind one HTTP API (§6 "External Interfaces").
//!
//! This crate is a thin assembly layer. Domain logic lives in `lf-broker`,
//! `lf-pipeline`, and [`orchestrator::Orchestrator`]; `lfd` wires them to a
//! concrete project directory, registers adapters, and serves the worker
//! loop and the API server side by side in one process.

pub mod download;
pub mod error;
pub mod health;
pub mod http;
pub mod orchestrator;
pub mod service;
pub mod worker;

pub use error::DaemonError;
pub use http::AppState;
pub use orchestrator::{Orchestrator, ServiceSpec};
pub use service::{OrchestrationMode, ServiceId};
