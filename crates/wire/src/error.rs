// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! User-visible failure payload (§7 "User-visible failure behavior").
//!
//! The shape is defined once, in `lf_core::UserFacingError` (code, message,
//! recovery commands); this module only fixes the small set of codes the
//! HTTP API actually emits so the CLI can match on them.

pub use lf_core::UserFacingError as ErrorPayload;

pub const CODE_CONFIG_ERROR: &str = "config_error";
pub const CODE_TRANSPORT_ERROR: &str = "transport_error";
pub const CODE_DEPENDENCY_ERROR: &str = "dependency_error";
pub const CODE_TASK_FAILURE: &str = "task_failure";
pub const CODE_SERVICE_ERROR: &str = "service_error";
