//! Reconstruction of every tied-optimal path from a finished cost labeling.

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternatePaths {
    /// Cost of each path, excluding whatever was spent before the labeling's start.
    pub cost: u32,
    /// Start-to-goal node sequences, sorted.
    pub paths: Vec<Vec<Pos>>,
    /// Set when `max_paths` stopped the expansion before it was exhausted.
    pub truncated: bool,
}

/// Walks backwards from `goal` along every predecessor whose label is consistent
/// with the goal's, forking whenever several predecessors qualify.
pub fn enumerate_paths(
    graph: &Graph,
    labeling: &CostLabeling,
    goal: Pos,
    weighting: Weighting,
    max_paths: Option<usize>,
) -> Result<AlternatePaths, SearchError> {
    let start = labeling.start();
    let goal_cost = labeling.cost(goal);
    if goal_cost == INFINITE {
        return Err(PreconditionError::GoalNotLabeled { goal }.into());
    }

    let oracle = Oracle::new(graph, weighting);
    // Partial paths are stored goal-first and reversed once they reach the start.
    let mut open_paths = vec![vec![goal]];
    let mut closed_paths = Vec::new();
    let mut truncated = false;

    while let Some(mut path) = open_paths.pop() {
        let Some(&tail) = path.last() else {
            continue;
        };
        if tail == start {
            path.reverse();
            closed_paths.push(path);
            if max_paths.is_some_and(|limit| closed_paths.len() >= limit) {
                truncated = !open_paths.is_empty();
                break;
            }
            continue;
        }

        let tail_cost = labeling.cost(tail);
        let predecessors: Vec<Pos> = graph
            .neighbors(tail)
            .filter(|(_, n, _)| oracle.is_known_passable(*n))
            .filter_map(|(_, n, edge)| {
                let step = oracle.step_cost(edge, tail)?;
                let cost = labeling.cost(n);
                (cost != INFINITE && cost.checked_add(step) == Some(tail_cost)).then_some(n)
            })
            .collect();

        match predecessors.as_slice() {
            [] => return Err(InvariantViolation::NoPredecessor { pos: tail }.into()),
            [only] => {
                path.push(*only);
                open_paths.push(path);
            }
            many => {
                // Reverse so the first predecessor is expanded first.
                for n in many.iter().rev() {
                    let mut fork = path.clone();
                    fork.push(*n);
                    open_paths.push(fork);
                }
            }
        }
    }

    closed_paths.sort();
    Ok(AlternatePaths { cost: goal_cost - labeling.cost(start), paths: closed_paths, truncated })
}
