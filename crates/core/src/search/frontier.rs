//! Frontier classification and entry selection for fog exploration.

use std::collections::BTreeSet;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierCandidate {
    /// Known node the walker leaves from.
    pub node: Pos,
    /// The single unvisited fog cell bordering `node`.
    pub fog: Pos,
    /// Labeled cost of `node`.
    pub cost: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontierScan {
    /// Nodes bordering exactly one unvisited fog cell.
    pub candidates: Vec<Pos>,
    /// Nodes bordering several unvisited fog cells; these cannot be evaluated yet.
    pub ambiguous: Vec<Pos>,
}

fn unvisited_fog(graph: &Graph, node: Pos, visited: &BTreeSet<Pos>) -> Vec<Pos> {
    Oracle::new(graph, Weighting::Terrain)
        .unknown_neighbors(node)
        .filter(|fog| !visited.contains(fog))
        .collect()
}

/// Sorts the origin nodes of `frontier` into usable and ambiguous entries,
/// skipping nodes already proven to lead nowhere.
pub fn scan_frontier(
    graph: &Graph,
    frontier: &FogFrontier,
    context: &ExplorationContext,
    dead: &BTreeSet<Pos>,
) -> FrontierScan {
    let mut scan = FrontierScan::default();
    for node in frontier.origin_nodes() {
        if dead.contains(&node) {
            continue;
        }
        match unvisited_fog(graph, node, &context.visited).len() {
            0 => {}
            1 => scan.candidates.push(node),
            _ => scan.ambiguous.push(node),
        }
    }
    scan
}

/// Picks the best entry among `known_neighbors` under `strategy`.
///
/// Distance from the player is the labeled cost relative to `start`. Distance
/// to the target has no known path yet, so it is the Manhattan distance scaled
/// by the cheapest terrain cost. Ties go to the lowest row, then column.
pub fn select_entry(
    graph: &Graph,
    labeling: &CostLabeling,
    known_neighbors: &[Pos],
    start: Pos,
    goal: Pos,
    strategy: FrontierStrategy,
    visited: &BTreeSet<Pos>,
) -> Result<Option<FrontierCandidate>, SearchError> {
    let start_cost = labeling.cost(start);
    let mut best: Option<(u32, FrontierCandidate)> = None;

    for &node in known_neighbors {
        let cost = labeling.cost(node);
        if cost == INFINITE {
            return Err(InvariantViolation::UnlabeledFrontier { node }.into());
        }
        let fog = match unvisited_fog(graph, node, visited).as_slice() {
            [fog] => *fog,
            other => {
                return Err(InvariantViolation::AmbiguousFrontier {
                    node,
                    fog_neighbors: other.len(),
                }
                .into());
            }
        };

        let from_player = cost.saturating_sub(start_cost);
        let to_target = manhattan(node, goal) * Terrain::cheapest_cost();
        let metric = match strategy {
            FrontierStrategy::ClosestToPlayer => from_player,
            FrontierStrategy::ClosestToTarget => to_target,
            FrontierStrategy::MinSumOfBoth => from_player.saturating_add(to_target),
        };

        let is_better = match best {
            None => true,
            Some((best_metric, best_candidate)) => {
                (metric, node) < (best_metric, best_candidate.node)
            }
        };
        if is_better {
            best = Some((metric, FrontierCandidate { node, fog, cost }));
        }
    }

    Ok(best.map(|(_, candidate)| candidate))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::steps::NoopSink;

    fn failed_search(graph: &Graph) -> (CostLabeling, FogFrontier) {
        let start = graph.player().expect("player placed");
        let goal = graph.target().expect("target placed");
        match find_path(graph, PathQuery::new(start, goal, SearchAlgorithm::AStar), &mut NoopSink)
            .expect("search runs")
        {
            SearchOutcome::NotFound { labeling, frontier } => (labeling, frontier),
            SearchOutcome::Found(_) => panic!("fixture should hide the goal"),
        }
    }

    fn pick(graph: &Graph, strategy: FrontierStrategy) -> FrontierCandidate {
        let (labeling, frontier) = failed_search(graph);
        let context = ExplorationContext::default();
        let scan = scan_frontier(graph, &frontier, &context, &BTreeSet::new());
        select_entry(
            graph,
            &labeling,
            &scan.candidates,
            labeling.start(),
            graph.target().expect("target placed"),
            strategy,
            &context.visited,
        )
        .expect("selection succeeds")
        .expect("a candidate exists")
    }

    #[test]
    fn fog_column_offers_every_left_column_node() {
        let graph = fog_column_fixture();
        let (_, frontier) = failed_search(&graph);
        let scan =
            scan_frontier(&graph, &frontier, &ExplorationContext::default(), &BTreeSet::new());
        assert_eq!(
            scan.candidates,
            vec![Pos { y: 0, x: 0 }, Pos { y: 1, x: 0 }, Pos { y: 2, x: 0 }]
        );
        assert!(scan.ambiguous.is_empty());
    }

    #[test]
    fn strategies_pick_different_entries() {
        let graph = fog_column_fixture();

        let near_player = pick(&graph, FrontierStrategy::ClosestToPlayer);
        assert_eq!(near_player.node, Pos { y: 0, x: 0 });
        assert_eq!(near_player.fog, Pos { y: 0, x: 1 });

        let near_target = pick(&graph, FrontierStrategy::ClosestToTarget);
        assert_eq!(near_target.node, Pos { y: 2, x: 0 });
        assert_eq!(near_target.fog, Pos { y: 2, x: 1 });
        assert_eq!(near_target.cost, 2);

        // All three column-0 nodes sum to 4; the top row wins the tie.
        let balanced = pick(&graph, FrontierStrategy::MinSumOfBoth);
        assert_eq!(balanced.node, Pos { y: 0, x: 0 });
    }

    #[test]
    fn dead_entries_and_visited_fog_are_skipped() {
        let graph = fog_column_fixture();
        let (_, frontier) = failed_search(&graph);
        let mut context = ExplorationContext::default();
        context.visited.insert(Pos { y: 1, x: 1 });
        let dead = BTreeSet::from([Pos { y: 0, x: 0 }]);

        let scan = scan_frontier(&graph, &frontier, &context, &dead);
        assert_eq!(scan.candidates, vec![Pos { y: 2, x: 0 }]);
    }

    #[test]
    fn node_bordering_two_fog_cells_is_ambiguous() {
        let graph = grid(&[
            "@sM*", //
            "sMMM",
        ]);
        let (labeling, frontier) = failed_search(&graph);
        let scan =
            scan_frontier(&graph, &frontier, &ExplorationContext::default(), &BTreeSet::new());
        assert!(scan.candidates.is_empty());
        assert_eq!(scan.ambiguous, vec![Pos { y: 0, x: 0 }]);

        let result = select_entry(
            &graph,
            &labeling,
            &scan.ambiguous,
            Pos { y: 0, x: 0 },
            Pos { y: 0, x: 3 },
            FrontierStrategy::ClosestToPlayer,
            &BTreeSet::new(),
        );
        assert_eq!(
            result,
            Err(SearchError::Invariant(InvariantViolation::AmbiguousFrontier {
                node: Pos { y: 0, x: 0 },
                fog_neighbors: 2,
            }))
        );
    }

    #[test]
    fn unlabeled_node_is_rejected() {
        let graph = fog_column_fixture();
        let labeling = CostLabeling::new(Pos { y: 0, x: 0 }, 0);
        let result = select_entry(
            &graph,
            &labeling,
            &[Pos { y: 2, x: 0 }],
            Pos { y: 0, x: 0 },
            Pos { y: 2, x: 2 },
            FrontierStrategy::ClosestToTarget,
            &BTreeSet::new(),
        );
        assert_eq!(
            result,
            Err(SearchError::Invariant(InvariantViolation::UnlabeledFrontier {
                node: Pos { y: 2, x: 0 }
            }))
        );
    }

    #[test]
    fn empty_input_selects_nothing() {
        let graph = fog_column_fixture();
        let labeling = CostLabeling::new(Pos { y: 0, x: 0 }, 0);
        let result = select_entry(
            &graph,
            &labeling,
            &[],
            Pos { y: 0, x: 0 },
            Pos { y: 2, x: 2 },
            FrontierStrategy::MinSumOfBoth,
            &BTreeSet::new(),
        );
        assert_eq!(result, Ok(None));
    }
}
