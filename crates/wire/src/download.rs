// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Model-download SSE event payloads (§4.4 "Model-download streamer"). Each
//! `data: <json>\n\n` line on the wire deserializes to one of these.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// `total == 0` means indeterminate; clients treat `n` in later
    /// `Progress` events as a monotonically increasing activity indicator
    /// rather than a fraction of `total`.
    Start { desc: String, total: u64 },
    Progress { n: u64, total: u64 },
    End { desc: String },
    Done { local_dir: String },
    /// Exactly one of `Done`/`Error` ends the stream. `message` must name
    /// the failure mode precisely (S5: "parse" vs. a generic network
    /// message) rather than a generic "stream ended unexpectedly".
    Error { message: String },
}

impl DownloadEvent {
    /// Whether this event is terminal (closes the stream).
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadEvent::Done { .. } | DownloadEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_and_error_are_terminal() {
        assert!(DownloadEvent::Done { local_dir: "/x".into() }.is_terminal());
        assert!(DownloadEvent::Error { message: "boom".into() }.is_terminal());
    }

    #[test]
    fn progress_and_start_are_not_terminal() {
        assert!(!DownloadEvent::Start { desc: "org/model".into(), total: 0 }.is_terminal());
        assert!(!DownloadEvent::Progress { n: 1, total: 0 }.is_terminal());
    }
}
