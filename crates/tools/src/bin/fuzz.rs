use anyhow::{Result, bail};
use clap::Parser;
use fogpath::{
    FrontierStrategy, Graph, Leg, NoopSink, Pos, RunConfig, RunOutcome, RunReport, SearchAlgorithm,
    Session, Terrain, parse_map,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tools::random_map::{MapShape, choose, random_map_text};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    maps: u32,
    #[arg(long, default_value_t = 12)]
    max_side: usize,
}

const STRATEGIES: [FrontierStrategy; 3] = [
    FrontierStrategy::ClosestToPlayer,
    FrontierStrategy::ClosestToTarget,
    FrontierStrategy::MinSumOfBoth,
];

fn route_cost(graph: &Graph, route: &[Pos]) -> u32 {
    route.iter().skip(1).filter_map(|pos| graph.terrain_at(*pos).and_then(Terrain::cost)).sum()
}

fn adjacent(a: Pos, b: Pos) -> bool {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y) == 1
}

fn run_once(text: &str, config: RunConfig) -> Result<(Graph, RunReport)> {
    let mut graph = parse_map(text)?;
    let report = Session::new(&mut graph, config)?.run(&mut NoopSink)?;
    Ok((graph, report))
}

fn check_invariants(text: &str, graph: &Graph, report: &RunReport) -> Result<()> {
    for leg in &report.legs {
        if let Leg::Excursion(excursion) = leg {
            if excursion.path.iter().any(|pos| excursion.discarded.contains(pos)) {
                bail!("Invariant failed: excursion path overlaps its discards\n{text}");
            }
            if !excursion.walked.windows(2).all(|w| adjacent(w[0], w[1])) {
                bail!("Invariant failed: excursion jumped between cells\n{text}");
            }
        }
    }
    if let RunOutcome::Reached { cost, route, final_paths, .. } = &report.outcome {
        if !route.windows(2).all(|w| adjacent(w[0], w[1])) {
            bail!("Invariant failed: route is not connected\n{text}");
        }
        if *cost != route_cost(graph, route) {
            bail!("Invariant failed: cost {cost} does not match walked route\n{text}");
        }
        if route.last() != graph.target().as_ref() {
            bail!("Invariant failed: route does not end on the target\n{text}");
        }
        let tail_cost = final_paths.first().map(|path| route_cost(graph, path));
        if final_paths.iter().any(|path| Some(route_cost(graph, path)) != tail_cost) {
            bail!("Invariant failed: final paths differ in cost\n{text}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for {} maps...", args.seed, args.maps);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut reached = 0;

    for map_index in 0..args.maps {
        let shape = MapShape {
            width: 2 + rng.next_u64() as usize % args.max_side.max(1),
            height: 1 + rng.next_u64() as usize % args.max_side.max(1),
            fog_percent: rng.next_u64() % 80,
        };
        let text = random_map_text(&mut rng, shape);
        let config = RunConfig {
            algorithm: choose(&mut rng, &[SearchAlgorithm::Dijkstra, SearchAlgorithm::AStar]),
            frontier_strategy: choose(&mut rng, &STRATEGIES),
            seed: rng.next_u64(),
            ..RunConfig::default()
        };

        let (graph, report) = run_once(&text, config.clone())?;
        check_invariants(&text, &graph, &report)?;
        if report.outcome.cost().is_some() {
            reached += 1;
        }

        // The same map and seed must replay identically.
        let (_, replay) = run_once(&text, config)?;
        if replay.snapshot_hash() != report.snapshot_hash() {
            bail!("Invariant failed: map {map_index} is not deterministic\n{text}");
        }
    }

    println!("Fuzzing completed successfully ({reached}/{} maps reached the target).", args.maps);
    Ok(())
}
