//! Randomized depth-first walk into fog with backtracking.
//! This module exists to probe unknown terrain one revealed cell at a time.
//! It does not own frontier selection or the decision to resume search.

use std::collections::BTreeSet;

use rand_chacha::rand_core::Rng;

use super::*;

/// Cells touched by exploration over a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorationContext {
    /// Known cells already finalized by a search this run.
    pub searched: BTreeSet<Pos>,
    /// Fog cells entered by any excursion this run.
    pub visited: BTreeSet<Pos>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplorerState {
    Entering,
    Walking,
    Backtracking,
    Exited,
    Stuck,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExcursionEnd {
    /// The walker stepped onto the target.
    Goal(Pos),
    /// The walker stepped onto a known cell outside the searched region.
    Reconnected(Pos),
    Stuck,
}

impl ExcursionEnd {
    pub fn exit(self) -> Option<Pos> {
        match self {
            Self::Goal(pos) | Self::Reconnected(pos) => Some(pos),
            Self::Stuck => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backtrack {
    pub from: Pos,
    pub to: Pos,
    /// Running cost after stepping back onto `to`.
    pub cost: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcursionReport {
    pub origin: Pos,
    pub entry: Pos,
    pub end: ExcursionEnd,
    /// Every cell stepped onto in order, re-entries after backtracking included.
    pub walked: Vec<Pos>,
    /// Simple path from the entry to the last cell.
    pub path: Vec<Pos>,
    pub discarded: BTreeSet<Pos>,
    pub backtracks: Vec<Backtrack>,
    /// Running cost at the last cell, base cost included.
    pub cost: u32,
}

/// Mutable run state an excursion reads and writes while walking.
pub struct FogWorld<'a, R> {
    pub graph: &'a mut Graph,
    pub labeling: &'a mut CostLabeling,
    pub context: &'a mut ExplorationContext,
    pub rng: &'a mut R,
    pub sink: &'a mut dyn StepSink,
    pub goal: Pos,
    pub weighting: Weighting,
}

#[derive(Clone, Debug)]
pub struct Excursion {
    state: ExplorerState,
    origin: Pos,
    entry: Pos,
    path: Vec<Pos>,
    walked: Vec<Pos>,
    discarded: BTreeSet<Pos>,
    backtracks: Vec<Backtrack>,
    accumulated: u32,
    retrying: bool,
    end: Option<ExcursionEnd>,
}

impl Excursion {
    /// `base_cost` is the labeled cost of `origin`, the known node the walk leaves from.
    pub fn new(origin: Pos, entry: Pos, base_cost: u32) -> Self {
        Self {
            state: ExplorerState::Entering,
            origin,
            entry,
            path: Vec::new(),
            walked: Vec::new(),
            discarded: BTreeSet::new(),
            backtracks: Vec::new(),
            accumulated: base_cost,
            retrying: false,
            end: None,
        }
    }

    pub fn state(&self) -> ExplorerState {
        self.state
    }

    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    pub fn walked(&self) -> &[Pos] {
        &self.walked
    }

    pub fn discarded(&self) -> &BTreeSet<Pos> {
        &self.discarded
    }

    /// Performs one state transition and returns the new state.
    pub fn step<R: Rng>(&mut self, world: &mut FogWorld<'_, R>) -> Result<ExplorerState, SearchError> {
        match self.state {
            ExplorerState::Entering => self.enter(world)?,
            ExplorerState::Walking => self.walk(world),
            ExplorerState::Backtracking => self.backtrack(world),
            ExplorerState::Exited | ExplorerState::Stuck => {}
        }
        Ok(self.state)
    }

    pub fn run<R: Rng>(mut self, world: &mut FogWorld<'_, R>) -> Result<ExcursionReport, SearchError> {
        while !matches!(self.step(world)?, ExplorerState::Exited | ExplorerState::Stuck) {}
        Ok(self.into_report())
    }

    pub fn into_report(self) -> ExcursionReport {
        ExcursionReport {
            origin: self.origin,
            entry: self.entry,
            end: self.end.unwrap_or(ExcursionEnd::Stuck),
            walked: self.walked,
            path: self.path,
            discarded: self.discarded,
            backtracks: self.backtracks,
            cost: self.accumulated,
        }
    }

    fn enter<R: Rng>(&mut self, world: &mut FogWorld<'_, R>) -> Result<(), SearchError> {
        if world.graph.is_known(self.entry) {
            return Err(InvariantViolation::EntryAlreadyKnown { pos: self.entry }.into());
        }
        match step_between(world, self.origin, self.entry) {
            Some(cost) => self.arrive(world, self.entry, cost, StepLabel::FogEntered { pos: self.entry }),
            None => {
                // Bumping into impassable fog still reveals it.
                world.graph.reveal(self.entry);
                world.context.visited.insert(self.entry);
                self.discarded.insert(self.entry);
                self.finish(ExcursionEnd::Stuck);
            }
        }
        Ok(())
    }

    fn walk<R: Rng>(&mut self, world: &mut FogWorld<'_, R>) {
        let Some(&current) = self.path.last() else {
            self.finish(ExcursionEnd::Stuck);
            return;
        };
        let (known, fog) = self.options(world, current);
        // Right after a backtrack the walker tries fresh fog first.
        let options =
            if known.is_empty() || (self.retrying && !fog.is_empty()) { fog } else { known };
        match choose_cheapest(world.rng, &options) {
            Some((next, cost)) => {
                self.retrying = false;
                self.arrive(world, next, cost, StepLabel::Moved { pos: next });
            }
            None => self.state = ExplorerState::Backtracking,
        }
    }

    fn backtrack<R: Rng>(&mut self, world: &mut FogWorld<'_, R>) {
        let Some(from) = self.path.pop() else {
            self.finish(ExcursionEnd::Stuck);
            return;
        };
        self.discarded.insert(from);
        let Some(&to) = self.path.last() else {
            self.finish(ExcursionEnd::Stuck);
            return;
        };
        let Some(cost) = step_between(world, from, to) else {
            self.finish(ExcursionEnd::Stuck);
            return;
        };

        // Stepping back onto the new tail is a real move and costs its terrain again.
        self.accumulated = self.accumulated.saturating_add(cost);
        self.walked.push(to);
        world.labeling.record_running_cost(to, self.accumulated);
        self.backtracks.push(Backtrack { from, to, cost: self.accumulated });
        self.record(world, StepLabel::Backtracked { from, to });
        self.retrying = true;
        self.state = ExplorerState::Walking;
    }

    fn arrive<R: Rng>(&mut self, world: &mut FogWorld<'_, R>, pos: Pos, cost: u32, label: StepLabel) {
        let was_known = world.graph.is_known(pos);
        self.accumulated = self.accumulated.saturating_add(cost);
        self.path.push(pos);
        self.walked.push(pos);
        world.labeling.record_running_cost(pos, self.accumulated);
        if !was_known {
            world.graph.reveal(pos);
            world.context.visited.insert(pos);
        }
        self.record(world, label);

        if pos == world.goal {
            self.finish(ExcursionEnd::Goal(pos));
        } else if was_known {
            self.finish(ExcursionEnd::Reconnected(pos));
        } else {
            self.state = ExplorerState::Walking;
        }
    }

    /// Passable neighbors of `current` split into known cells outside the
    /// searched region and fog cells, each with its step cost.
    fn options<R>(&self, world: &FogWorld<'_, R>, current: Pos) -> (Vec<(Pos, u32)>, Vec<(Pos, u32)>) {
        let oracle = Oracle::new(&*world.graph, world.weighting);
        let mut known = Vec::new();
        let mut fog = Vec::new();
        for (_, n, edge) in world.graph.neighbors(current) {
            let Some(cost) = oracle.step_cost(edge, n) else {
                continue;
            };
            if self.discarded.contains(&n) || world.context.visited.contains(&n) {
                continue;
            }
            if !oracle.is_known(n) {
                fog.push((n, cost));
            } else if !world.context.searched.contains(&n) {
                known.push((n, cost));
            }
        }
        (known, fog)
    }

    fn finish(&mut self, end: ExcursionEnd) {
        self.end = Some(end);
        self.state = match end {
            ExcursionEnd::Stuck => ExplorerState::Stuck,
            ExcursionEnd::Goal(_) | ExcursionEnd::Reconnected(_) => ExplorerState::Exited,
        };
    }

    fn record<R>(&self, world: &mut FogWorld<'_, R>, label: StepLabel) {
        world.sink.record(StepRecord {
            explored: world.context.visited.len(),
            explorable: world.graph.passable_count(),
            cost: Some(self.accumulated),
            label: Some(label),
        });
    }
}

fn step_between<R>(world: &FogWorld<'_, R>, from: Pos, to: Pos) -> Option<u32> {
    let oracle = Oracle::new(&*world.graph, world.weighting);
    world
        .graph
        .neighbors(from)
        .find(|(_, n, _)| *n == to)
        .and_then(|(_, _, edge)| oracle.step_cost(edge, to))
}

/// Uniform pick among the cheapest options.
fn choose_cheapest<R: Rng>(rng: &mut R, options: &[(Pos, u32)]) -> Option<(Pos, u32)> {
    let cheapest = options.iter().map(|(_, cost)| *cost).min()?;
    let tied: Vec<(Pos, u32)> = options.iter().copied().filter(|(_, cost)| *cost == cheapest).collect();
    let idx = (rng.next_u64() as usize) % tied.len();
    Some(tied[idx])
}
