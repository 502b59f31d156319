//! Step records emitted after each atomic algorithm action, for external playback.

use serde::{Deserialize, Serialize};

use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepLabel {
    Relaxed { pos: Pos },
    Finalized { pos: Pos },
    FogEntered { pos: Pos },
    Moved { pos: Pos },
    Backtracked { from: Pos, to: Pos },
    PathFound,
    NoPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub explored: usize,
    pub explorable: usize,
    pub cost: Option<u32>,
    pub label: Option<StepLabel>,
}

pub trait StepSink {
    fn record(&mut self, step: StepRecord);
}

/// Sink that drops every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl StepSink for NoopSink {
    fn record(&mut self, _step: StepRecord) {}
}

impl StepSink for Vec<StepRecord> {
    fn record(&mut self, step: StepRecord) {
        self.push(step);
    }
}
