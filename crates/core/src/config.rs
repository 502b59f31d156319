use serde::{Deserialize, Serialize};

use crate::types::{FrontierStrategy, SearchAlgorithm, Weighting};

/// Per-run choices made by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub algorithm: SearchAlgorithm,
    pub frontier_strategy: FrontierStrategy,
    pub weighting: Weighting,
    /// Seed for the fog explorer's tie-breaking stream.
    pub seed: u64,
    /// Upper bound on enumerated tied-optimal paths; `None` enumerates all.
    pub max_paths: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: SearchAlgorithm::AStar,
            frontier_strategy: FrontierStrategy::MinSumOfBoth,
            weighting: Weighting::Terrain,
            seed: 0,
            max_paths: None,
        }
    }
}
