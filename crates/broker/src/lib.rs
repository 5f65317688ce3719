// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-broker: the Task Broker. Decouples task producers (the API server)
//! from consumers (the worker) behind a `(name, args)` signature; the
//! reference transport is a filesystem-backed queue where consumers
//! rename-to-claim.
//!
//! Producer side: [`Broker::dispatch`], [`Broker::dispatch_group`],
//! [`Broker::poll`], [`Broker::revoke`]. Consumer side: [`Consumer::register`]
//! and [`Consumer::serve`]. Poll wrappers live in [`poll`] and come in a
//! parallel variant (for the multi-threaded API server) and a cooperative
//! one (for the single-threaded event loop) — never share one between the
//! two scheduling models (§5).

mod consumer;
mod error;
mod handle;
mod producer;
pub mod poll;
mod queue;
mod revocation;
mod router;

pub use consumer::{Consumer, Handler};
pub use error::BrokerError;
pub use handle::{GroupHandle, PolledRecord, TaskHandle};
pub use producer::Broker;
pub use queue::{FsQueue, QueueMessage};
pub use revocation::RevocationFlag;
pub use router::QueueRouter;

pub use lf_core::Signature;
