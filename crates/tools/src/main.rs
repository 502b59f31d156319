use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fogpath::{
    FrontierStrategy, Leg, NoopSink, Pos, RunConfig, RunEvent, RunOutcome, RunReport,
    SearchAlgorithm, Session, StepLabel, TraceHeader, TraceWriter, Weighting, load_trace,
    parse_map, render_map,
};
use serde::Serialize;
use tools::config_file::load_run_config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a text map for the target, exploring fog as needed
    Run(RunArgs),
    /// Validate a trace file and summarize its steps
    VerifyTrace {
        #[arg(short, long)]
        trace: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the map file
    #[arg(short, long)]
    map: PathBuf,
    /// TOML run configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    algorithm: Option<AlgorithmArg>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    #[arg(long, value_enum)]
    weighting: Option<WeightingArg>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    max_paths: Option<usize>,
    /// Write every step to a hash-chained JSONL trace
    #[arg(short, long)]
    trace: Option<PathBuf>,
    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => load_run_config(path)?,
            None => RunConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm.into();
        }
        if let Some(strategy) = self.strategy {
            config.frontier_strategy = strategy.into();
        }
        if let Some(weighting) = self.weighting {
            config.weighting = weighting.into();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.max_paths.is_some() {
            config.max_paths = self.max_paths;
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Dijkstra,
    Astar,
}

impl From<AlgorithmArg> for SearchAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Dijkstra => Self::Dijkstra,
            AlgorithmArg::Astar => Self::AStar,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Player,
    Target,
    Sum,
}

impl From<StrategyArg> for FrontierStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Player => Self::ClosestToPlayer,
            StrategyArg::Target => Self::ClosestToTarget,
            StrategyArg::Sum => Self::MinSumOfBoth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightingArg {
    Terrain,
    Edge,
}

impl From<WeightingArg> for Weighting {
    fn from(arg: WeightingArg) -> Self {
        match arg {
            WeightingArg::Terrain => Self::Terrain,
            WeightingArg::Edge => Self::Edge,
        }
    }
}

#[derive(Serialize)]
struct RunSummary<'a> {
    reached: bool,
    cost: Option<u32>,
    route: &'a [Pos],
    paths: usize,
    truncated: bool,
    excursions: usize,
    snapshot_hash: u64,
    log: &'a [RunEvent],
}

fn summarize(report: &RunReport) -> RunSummary<'_> {
    let excursions = report.legs.iter().filter(|leg| matches!(leg, Leg::Excursion(_))).count();
    let (route, paths, truncated): (&[Pos], usize, bool) = match &report.outcome {
        RunOutcome::Reached { route, final_paths, truncated, .. } => {
            (route, final_paths.len(), *truncated)
        }
        RunOutcome::Unreachable { .. } => (&[], 0, false),
    };
    RunSummary {
        reached: report.outcome.cost().is_some(),
        cost: report.outcome.cost(),
        route,
        paths,
        truncated,
        excursions,
        snapshot_hash: report.snapshot_hash(),
        log: &report.log,
    }
}

fn print_report(report: &RunReport) {
    for event in &report.log {
        println!("  {event:?}");
    }
    match &report.outcome {
        RunOutcome::Reached { cost, route, final_paths, truncated } => {
            println!("Reached target at cost {cost} in {} moves.", route.len().saturating_sub(1));
            let note = if *truncated { " (truncated)" } else { "" };
            println!("Final leg has {} tied-optimal path(s){note}.", final_paths.len());
        }
        RunOutcome::Unreachable { ambiguous_frontier } => {
            println!("Target unreachable.");
            if !ambiguous_frontier.is_empty() {
                println!("Ambiguous frontier nodes: {ambiguous_frontier:?}");
            }
        }
    }
    println!("Snapshot Hash: {}", report.snapshot_hash());
}

fn run(args: RunArgs) -> Result<()> {
    let run_config = args.run_config()?;
    let RunArgs { map, trace, json, .. } = args;

    let text = fs::read_to_string(&map)
        .with_context(|| format!("Failed to read map file: {}", map.display()))?;
    let mut graph =
        parse_map(&text).with_context(|| format!("Failed to parse map file: {}", map.display()))?;
    let session = Session::new(&mut graph, run_config.clone()).context("Failed to start session")?;

    let report = match &trace {
        Some(path) => {
            let mut writer = TraceWriter::create(path, &TraceHeader::for_config(&run_config))
                .with_context(|| format!("Failed to create trace file: {}", path.display()))?;
            let report = session.run(&mut writer).context("Run aborted")?;
            let written = writer.finish().context("Failed to write trace")?;
            if !json {
                println!("Wrote {written} step(s) to {}", path.display());
            }
            report
        }
        None => session.run(&mut NoopSink).context("Run aborted")?,
    };

    if json {
        let summary = serde_json::to_string_pretty(&summarize(&report))
            .context("Failed to serialize run summary")?;
        println!("{summary}");
    } else {
        print_report(&report);
        println!("Revealed map:");
        print!("{}", render_map(&graph));
    }
    Ok(())
}

fn verify_trace(trace: PathBuf) -> Result<()> {
    let loaded = load_trace(&trace)
        .with_context(|| format!("Failed to load trace file: {}", trace.display()))?;
    let fog_steps = loaded
        .steps
        .iter()
        .filter(|step| {
            matches!(
                step.label,
                Some(StepLabel::FogEntered { .. } | StepLabel::Moved { .. } | StepLabel::Backtracked { .. })
            )
        })
        .count();

    println!("Trace verified.");
    println!("Seed: {}", loaded.header.seed);
    println!("Algorithm: {:?}", loaded.header.algorithm);
    println!("Frontier strategy: {:?}", loaded.header.frontier_strategy);
    println!("Steps: {} ({fog_steps} in fog)", loaded.steps.len());
    println!("Last SHA-256: {}", loaded.last_sha256_hex);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Run(run_args) => run(run_args),
        Command::VerifyTrace { trace } => verify_trace(trace),
    }
}
