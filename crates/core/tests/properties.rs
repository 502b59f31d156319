use std::collections::BTreeSet;

use fogpath::*;
use proptest::prelude::*;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

const TERRAIN_CELLS: [char; 6] = ['S', 'S', 'P', 'F', 'H', 'M'];

/// Random map with the player in the top-left and the target in the bottom-right corner.
fn random_rows(seed: u64, width: usize, height: usize, fog_percent: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    if (y, x) == (0, 0) {
                        return '@';
                    }
                    if (y, x) == (height - 1, width - 1) {
                        return if rng.next_u64() % 100 < fog_percent { '?' } else { '*' };
                    }
                    let cell = TERRAIN_CELLS[rng.next_u64() as usize % TERRAIN_CELLS.len()];
                    if rng.next_u64() % 100 < fog_percent { cell.to_ascii_lowercase() } else { cell }
                })
                .collect()
        })
        .collect()
}

fn terrain_cost(graph: &Graph, pos: Pos) -> u32 {
    graph.terrain_at(pos).and_then(Terrain::cost).unwrap_or(INFINITE)
}

fn path_cost(graph: &Graph, path: &[Pos]) -> u32 {
    path.iter().skip(1).map(|pos| terrain_cost(graph, *pos)).sum()
}

fn adjacent(a: Pos, b: Pos) -> bool {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y) == 1
}

/// Every cheapest simple path over known terrain, found by exhaustive DFS.
fn brute_force_optimal(graph: &Graph, start: Pos, goal: Pos) -> (u32, BTreeSet<Vec<Pos>>) {
    fn walk(
        graph: &Graph,
        goal: Pos,
        path: &mut Vec<Pos>,
        cost: u32,
        best: &mut (u32, BTreeSet<Vec<Pos>>),
    ) {
        let Some(&tail) = path.last() else {
            return;
        };
        if cost > best.0 {
            return;
        }
        if tail == goal {
            if cost < best.0 {
                best.1.clear();
                best.0 = cost;
            }
            best.1.insert(path.clone());
            return;
        }
        let next: Vec<Pos> = graph
            .neighbors(tail)
            .map(|(_, n, _)| n)
            .filter(|n| graph.is_known(*n) && !path.contains(n))
            .collect();
        for n in next {
            let step = terrain_cost(graph, n);
            if step == INFINITE {
                continue;
            }
            path.push(n);
            walk(graph, goal, path, cost + step, best);
            path.pop();
        }
    }

    let mut best = (INFINITE, BTreeSet::new());
    walk(graph, goal, &mut vec![start], 0, &mut best);
    best
}

fn search(graph: &Graph, algorithm: SearchAlgorithm) -> SearchOutcome {
    let start = graph.player().expect("player placed");
    let goal = graph.target().expect("target placed");
    find_path(graph, PathQuery::new(start, goal, algorithm), &mut NoopSink).expect("search runs")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn dijkstra_and_astar_agree_under_full_visibility(
        seed in any::<u64>(),
        width in 2_usize..=8,
        height in 1_usize..=8,
    ) {
        let graph = parse_rows(&random_rows(seed, width, height, 0)).expect("map parses");
        let goal = graph.target().expect("target placed");
        let dijkstra = search(&graph, SearchAlgorithm::Dijkstra);
        let astar = search(&graph, SearchAlgorithm::AStar);
        prop_assert_eq!(dijkstra.is_found(), astar.is_found());
        prop_assert_eq!(dijkstra.labeling().cost(goal), astar.labeling().cost(goal));

        let again = search(&graph, SearchAlgorithm::AStar);
        prop_assert_eq!(again.labeling(), astar.labeling());
    }

    #[test]
    fn enumeration_matches_brute_force(
        seed in any::<u64>(),
        width in 2_usize..=4,
        height in 1_usize..=3,
    ) {
        let graph = parse_rows(&random_rows(seed, width, height, 0)).expect("map parses");
        let start = graph.player().expect("player placed");
        let goal = graph.target().expect("target placed");
        let (best_cost, best_paths) = brute_force_optimal(&graph, start, goal);

        for algorithm in [SearchAlgorithm::Dijkstra, SearchAlgorithm::AStar] {
            let outcome = search(&graph, algorithm);
            prop_assert_eq!(outcome.is_found(), best_cost != INFINITE);
            if !outcome.is_found() {
                continue;
            }
            let found = enumerate_paths(&graph, outcome.labeling(), goal, Weighting::Terrain, None)
                .expect("enumeration succeeds");
            prop_assert_eq!(found.cost, best_cost);
            for path in &found.paths {
                prop_assert_eq!(path_cost(&graph, path), best_cost);
            }
            let found_set: BTreeSet<Vec<Pos>> = found.paths.into_iter().collect();
            prop_assert_eq!(&found_set, &best_paths, "seed={} algorithm={:?}", seed, algorithm);
        }
    }

    #[test]
    fn fog_runs_walk_connected_routes_and_charge_every_step(
        seed in any::<u64>(),
        width in 2_usize..=9,
        height in 2_usize..=9,
        fog_percent in 10_u64..=70,
    ) {
        let rows = random_rows(seed, width, height, fog_percent);
        let mut graph = parse_rows(&rows).expect("map parses");
        let config = RunConfig { seed, ..RunConfig::default() };
        let report = Session::new(&mut graph, config)
            .expect("session starts")
            .run(&mut NoopSink)
            .expect("run completes without invariant violations");

        for leg in &report.legs {
            if let Leg::Excursion(excursion) = leg {
                prop_assert!(excursion.path.iter().all(|pos| !excursion.discarded.contains(pos)));
                prop_assert!(excursion.walked.windows(2).all(|w| adjacent(w[0], w[1])));
            }
        }

        if let RunOutcome::Reached { cost, route, .. } = &report.outcome {
            prop_assert_eq!(route.first().copied(), Some(Pos { y: 0, x: 0 }));
            prop_assert_eq!(
                route.last().copied(),
                Some(Pos { y: height as i32 - 1, x: width as i32 - 1 })
            );
            prop_assert!(route.windows(2).all(|w| adjacent(w[0], w[1])), "rows={:?}", rows);
            prop_assert_eq!(*cost, path_cost(&graph, route), "rows={:?}", rows);
        }
    }
}
