//! Shortest-path search under partial visibility and the fog exploration loop around it.
//! This file wires the search submodules together.

use crate::config::RunConfig;
use crate::graph::Graph;
use crate::oracle::Oracle;
use crate::steps::{StepLabel, StepRecord, StepSink};
use crate::types::*;

mod alternates;
mod explorer;
mod frontier;
mod hash;
mod pathfinding;
mod session;

#[cfg(test)]
mod test_support;

pub use alternates::{AlternatePaths, enumerate_paths};
pub use explorer::{
    Backtrack, Excursion, ExcursionEnd, ExcursionReport, ExplorationContext, ExplorerState,
    FogWorld,
};
pub use frontier::{FrontierCandidate, FrontierScan, scan_frontier, select_entry};
pub use pathfinding::{CostLabeling, FogFrontier, Label, PathQuery, SearchOutcome, find_path};
pub use session::{AdvanceResult, AdvanceStopReason, Leg, RunOutcome, RunReport, Session};

pub(crate) fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}
