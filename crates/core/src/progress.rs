// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Progress messages emitted by the ingestion pipeline into a Task Record's
//! `metadata` at stage boundaries and at configurable intervals within
//! `EMBEDDING` and `STORING` (see §4.3).

use serde::{Deserialize, Serialize};

/// A point-in-time progress report, stored under the `"progress"` metadata key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    /// 0..=100.
    pub progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<String>,
    pub stage: PipelineStage,
}

impl Progress {
    pub fn new(stage: PipelineStage, progress: u8, message: impl Into<String>) -> Self {
        Self { progress: progress.min(100), message: message.into(), current_file: None, stage }
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.current_file = Some(path.into());
        self
    }

    pub fn into_metadata_value(self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// The ingestion pipeline's per-job state machine (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Discovering,
    Parsing,
    Extracting,
    Embedding,
    Storing,
    Done,
    Failed,
}

crate::simple_display! {
    PipelineStage {
        Discovering => "discovering",
        Parsing => "parsing",
        Extracting => "extracting",
        Embedding => "embedding",
        Storing => "storing",
        Done => "done",
        Failed => "failed",
    }
}

impl PipelineStage {
    /// The only states reachable from `self` by one forward step, plus the
    /// implicit `Failed` escape hatch available from every non-terminal stage.
    pub fn next_states(self) -> &'static [PipelineStage] {
        use PipelineStage::*;
        match self {
            Discovering => &[Parsing, Failed],
            Parsing => &[Extracting, Failed],
            Extracting => &[Embedding, Failed],
            Embedding => &[Storing, Failed],
            Storing => &[Done, Failed],
            Done | Failed => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_above_100() {
        let p = Progress::new(PipelineStage::Embedding, 250, "batch 3/2");
        assert_eq!(p.progress, 100);
    }

    #[test]
    fn terminal_stages_have_no_next_states() {
        assert!(PipelineStage::Done.next_states().is_empty());
        assert!(PipelineStage::Failed.next_states().is_empty());
    }

    #[test]
    fn failed_is_reachable_from_every_nonterminal_stage() {
        for stage in [
            PipelineStage::Discovering,
            PipelineStage::Parsing,
            PipelineStage::Extracting,
            PipelineStage::Embedding,
            PipelineStage::Storing,
        ] {
            assert!(stage.next_states().contains(&PipelineStage::Failed));
        }
    }
}
