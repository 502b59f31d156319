//! Orchestration loop alternating shortest-path search with fog excursions.
//! This module exists to own the state carried between search legs: position,
//! running costs, the last failed search and the cells already explored.
//! It does not own the algorithms it sequences.

use std::collections::BTreeSet;
use std::mem;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leg {
    /// Walk over known terrain from the current position to a frontier node.
    Approach { path: Vec<Pos>, cost: u32 },
    Excursion(ExcursionReport),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Reached {
        /// Total cost from the player's starting cell, every detour included.
        cost: u32,
        /// Cells physically walked, starting with the player's cell.
        route: Vec<Pos>,
        /// Tied-optimal paths of the final search leg. Empty when the target
        /// was reached inside fog.
        final_paths: Vec<Vec<Pos>>,
        truncated: bool,
    },
    Unreachable {
        /// Frontier nodes left unevaluated because they border several fog cells.
        ambiguous_frontier: Vec<Pos>,
    },
}

impl RunOutcome {
    pub fn cost(&self) -> Option<u32> {
        match self {
            Self::Reached { cost, .. } => Some(*cost),
            Self::Unreachable { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub legs: Vec<Leg>,
    pub log: Vec<RunEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    Finished(RunOutcome),
    BudgetExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvanceResult {
    pub iterations: u32,
    pub stop_reason: AdvanceStopReason,
}

/// Resumption state after a search that did not reach the target.
#[derive(Clone, Debug)]
struct FrontierPhase {
    /// Labeling of the failed search, untouched by excursions.
    labeling: CostLabeling,
    frontier: FogFrontier,
    /// Frontier nodes whose excursion got stuck.
    dead: BTreeSet<Pos>,
}

#[derive(Clone, Debug)]
enum Phase {
    Search,
    Frontier(FrontierPhase),
    Finished(RunOutcome),
}

pub struct Session<'g, R = ChaCha8Rng> {
    graph: &'g mut Graph,
    config: RunConfig,
    rng: R,
    goal: Pos,
    position: Pos,
    /// Search labels overlaid with running costs written by excursions.
    labeling: CostLabeling,
    context: ExplorationContext,
    route: Vec<Pos>,
    legs: Vec<Leg>,
    log: Vec<RunEvent>,
    phase: Phase,
}

impl<'g> Session<'g, ChaCha8Rng> {
    pub fn new(graph: &'g mut Graph, config: RunConfig) -> Result<Self, SearchError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(graph, config, rng)
    }
}

impl<'g, R: Rng> Session<'g, R> {
    pub fn with_rng(graph: &'g mut Graph, config: RunConfig, rng: R) -> Result<Self, SearchError> {
        let start = graph.player().ok_or(PreconditionError::MissingPlayer)?;
        let goal = graph.target().ok_or(PreconditionError::MissingTarget)?;
        if !Oracle::new(graph, config.weighting).is_known_passable(start) {
            return Err(PreconditionError::StartNotTraversable { pos: start }.into());
        }

        Ok(Self {
            graph,
            config,
            rng,
            goal,
            position: start,
            labeling: CostLabeling::new(start, 0),
            context: ExplorationContext::default(),
            route: vec![start],
            legs: Vec::new(),
            log: Vec::new(),
            phase: Phase::Search,
        })
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn labeling(&self) -> &CostLabeling {
        &self.labeling
    }

    pub fn context(&self) -> &ExplorationContext {
        &self.context
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn log(&self) -> &[RunEvent] {
        &self.log
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        match &self.phase {
            Phase::Finished(outcome) => Some(outcome),
            Phase::Search | Phase::Frontier(_) => None,
        }
    }

    /// Runs at most `max_iterations` search legs or frontier attempts.
    pub fn advance(
        &mut self,
        max_iterations: u32,
        sink: &mut dyn StepSink,
    ) -> Result<AdvanceResult, SearchError> {
        let mut iterations = 0;
        loop {
            if let Phase::Finished(outcome) = &self.phase {
                return Ok(AdvanceResult {
                    iterations,
                    stop_reason: AdvanceStopReason::Finished(outcome.clone()),
                });
            }
            if iterations >= max_iterations {
                return Ok(AdvanceResult { iterations, stop_reason: AdvanceStopReason::BudgetExhausted });
            }
            self.iterate(sink)?;
            iterations += 1;
        }
    }

    /// Drives the session to completion.
    pub fn run(mut self, sink: &mut dyn StepSink) -> Result<RunReport, SearchError> {
        loop {
            let result = self.advance(u32::MAX, sink)?;
            if let AdvanceStopReason::Finished(outcome) = result.stop_reason {
                return Ok(RunReport { outcome, legs: self.legs, log: self.log });
            }
        }
    }

    fn iterate(&mut self, sink: &mut dyn StepSink) -> Result<(), SearchError> {
        match mem::replace(&mut self.phase, Phase::Search) {
            Phase::Search => self.search_leg(sink),
            Phase::Frontier(state) => self.frontier_attempt(state, sink),
            Phase::Finished(outcome) => {
                self.phase = Phase::Finished(outcome);
                Ok(())
            }
        }
    }

    fn search_leg(&mut self, sink: &mut dyn StepSink) -> Result<(), SearchError> {
        let from = self.position;
        let start_cost = self.labeling.cost(from);
        self.log.push(RunEvent::SearchStarted { from, cost: start_cost });

        let query = PathQuery {
            start: from,
            goal: self.goal,
            start_cost,
            algorithm: self.config.algorithm,
            weighting: self.config.weighting,
        };
        match find_path(self.graph, query, sink)? {
            SearchOutcome::Found(labeling) => {
                let found = enumerate_paths(
                    self.graph,
                    &labeling,
                    self.goal,
                    self.config.weighting,
                    self.config.max_paths,
                )?;
                let cost = labeling.cost(self.goal);
                self.log.push(RunEvent::PathsFound { cost, count: found.paths.len() });
                self.log.push(RunEvent::GoalReached { cost });
                if let Some(first) = found.paths.first() {
                    self.route.extend(first.iter().skip(1));
                }
                self.position = self.goal;
                self.context.searched.extend(labeling.closed_nodes());
                self.labeling = labeling;
                self.phase = Phase::Finished(RunOutcome::Reached {
                    cost,
                    route: self.route.clone(),
                    final_paths: found.paths,
                    truncated: found.truncated,
                });
            }
            SearchOutcome::NotFound { labeling, frontier } => {
                self.log.push(RunEvent::SearchFailed { from, fog_cells: frontier.len() });
                self.context.searched.extend(labeling.closed_nodes());
                self.labeling = labeling.clone();
                self.phase = Phase::Frontier(FrontierPhase { labeling, frontier, dead: BTreeSet::new() });
            }
        }
        Ok(())
    }

    fn frontier_attempt(
        &mut self,
        mut state: FrontierPhase,
        sink: &mut dyn StepSink,
    ) -> Result<(), SearchError> {
        let scan = scan_frontier(self.graph, &state.frontier, &self.context, &state.dead);
        let strategy = self.config.frontier_strategy;
        let selected = select_entry(
            self.graph,
            &state.labeling,
            &scan.candidates,
            self.position,
            self.goal,
            strategy,
            &self.context.visited,
        )?;
        let Some(candidate) = selected else {
            self.log.push(RunEvent::Unreachable { ambiguous: scan.ambiguous.len() });
            self.phase = Phase::Finished(RunOutcome::Unreachable { ambiguous_frontier: scan.ambiguous });
            return Ok(());
        };
        self.log.push(RunEvent::EntrySelected {
            frontier: candidate.node,
            entry: candidate.fog,
            strategy,
        });

        let report = {
            let mut world = FogWorld {
                graph: &mut *self.graph,
                labeling: &mut self.labeling,
                context: &mut self.context,
                rng: &mut self.rng,
                sink,
                goal: self.goal,
                weighting: self.config.weighting,
            };
            Excursion::new(candidate.node, candidate.fog, candidate.cost).run(&mut world)?
        };

        let Some(exit) = report.end.exit() else {
            self.log.push(RunEvent::ExcursionStuck { entry: report.entry, walked: report.walked.len() });
            self.legs.push(Leg::Excursion(report));
            state.dead.insert(candidate.node);
            self.phase = Phase::Frontier(state);
            return Ok(());
        };

        // Cells revealed by stuck excursions are unlabeled in the failed search,
        // so the approach only follows cells that search actually finalized.
        let approach =
            enumerate_paths(self.graph, &state.labeling, candidate.node, self.config.weighting, Some(1))?;
        let path = approach.paths.into_iter().next().unwrap_or_else(|| vec![candidate.node]);
        self.route.extend(path.iter().skip(1));
        self.route.extend(report.walked.iter().copied());
        self.legs.push(Leg::Approach { path, cost: approach.cost });

        let cost = report.cost;
        let end = report.end;
        self.legs.push(Leg::Excursion(report));
        self.position = exit;

        if matches!(end, ExcursionEnd::Goal(_)) {
            self.log.push(RunEvent::GoalReached { cost });
            self.phase = Phase::Finished(RunOutcome::Reached {
                cost,
                route: self.route.clone(),
                final_paths: Vec::new(),
                truncated: false,
            });
        } else {
            self.log.push(RunEvent::Reconnected { at: exit, cost });
        }
        Ok(())
    }
}
