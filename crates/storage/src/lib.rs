// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-storage: the Result Store. A durable, cross-process key->record map
//! for Task Records, one file per task, with atomic terminal-state writes.
//!
//! See `store::ResultStore` for the public contract. Readers tolerate
//! partially-written or corrupt records as `NotFound` rather than failing.

mod error;
pub mod path;
mod store;

pub use error::StoreError;
pub use store::ResultStore;
