// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Maps task-name prefixes to queue names, e.g. `rag.* -> rag`,
//! `orchestration.* -> server`. Tasks with unknown prefixes are rejected at
//! dispatch time.

use lf_core::{TaskName, TransportError};

#[derive(Debug, Clone)]
pub struct QueueRouter {
    routes: Vec<(String, String)>,
}

impl QueueRouter {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Route every task name whose prefix matches `task_prefix` (the part
    /// before the first `.`) to `queue_name`.
    pub fn with_route(mut self, task_prefix: impl Into<String>, queue_name: impl Into<String>) -> Self {
        self.routes.push((task_prefix.into(), queue_name.into()));
        self
    }

    /// Resolve `name`'s queue, or [`TransportError::UnroutableName`] if no
    /// configured prefix matches.
    pub fn route(&self, name: &TaskName) -> Result<&str, TransportError> {
        let prefix = name.prefix();
        self.routes
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, queue)| queue.as_str())
            .ok_or_else(|| TransportError::UnroutableName(name.as_str().to_string()))
    }
}

impl Default for QueueRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_matching_prefix_to_configured_queue() {
        let router = QueueRouter::new().with_route("rag", "rag").with_route("orchestration", "server");
        assert_eq!(router.route(&TaskName::new("rag.ingest_file")).unwrap(), "rag");
        assert_eq!(router.route(&TaskName::new("orchestration.health")).unwrap(), "server");
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        let router = QueueRouter::new().with_route("rag", "rag");
        let err = router.route(&TaskName::new("mystery.task")).unwrap_err();
        assert!(matches!(err, TransportError::UnroutableName(name) if name == "mystery.task"));
    }
}
