// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

use thiserror::Error;

/// Errors raised by the producer side of the broker. Per §4.2/§7, transport
/// failures during dispatch raise here; once a task is successfully
/// dispatched, all further failures are surfaced via the Task Record's
/// FAILURE state instead.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Transport(#[from] lf_core::TransportError),

    #[error(transparent)]
    Store(#[from] lf_storage::StoreError),
}
