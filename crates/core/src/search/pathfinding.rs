//! Dijkstra and A* over the known part of the graph.
//! This module exists so both algorithms share one cost labeling and one fog frontier record.
//! It does not own frontier selection, exploration, or path reconstruction.

use std::collections::{BTreeMap, BTreeSet};

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    /// Best known cost from the original start.
    pub cost: u32,
    /// Heuristic estimate to the goal; always 0 under Dijkstra.
    pub estimate: u32,
    pub closed: bool,
}

/// Per-run cost labels. Unlabeled nodes have cost `INFINITE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostLabeling {
    start: Pos,
    labels: BTreeMap<Pos, Label>,
}

impl CostLabeling {
    pub fn new(start: Pos, start_cost: u32) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(start, Label { cost: start_cost, estimate: 0, closed: true });
        Self { start, labels }
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn cost(&self, pos: Pos) -> u32 {
        self.labels.get(&pos).map_or(INFINITE, |label| label.cost)
    }

    pub fn label(&self, pos: Pos) -> Option<Label> {
        self.labels.get(&pos).copied()
    }

    pub fn is_closed(&self, pos: Pos) -> bool {
        self.labels.get(&pos).is_some_and(|label| label.closed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, Label)> + '_ {
        self.labels.iter().map(|(pos, label)| (*pos, *label))
    }

    pub fn closed_nodes(&self) -> impl Iterator<Item = Pos> + '_ {
        self.iter().filter(|(_, label)| label.closed).map(|(pos, _)| pos)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Writes a cost observed by walking rather than by search. The node counts as final.
    pub fn record_running_cost(&mut self, pos: Pos, cost: u32) {
        self.labels.insert(pos, Label { cost, estimate: 0, closed: true });
    }
}

/// Fog cells seen from expanded known nodes, keyed by fog cell.
/// Each fog cell keeps one entry per distinct (origin cost, origin node).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FogFrontier {
    cells: BTreeMap<Pos, BTreeSet<(u32, Pos)>>,
}

impl FogFrontier {
    fn record(&mut self, fog: Pos, cost: u32, origin: Pos) {
        self.cells.entry(fog).or_default().insert((cost, origin));
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.keys().copied()
    }

    fn origins(&self, fog: Pos) -> impl Iterator<Item = (u32, Pos)> + '_ {
        self.cells.get(&fog).into_iter().flatten().copied()
    }

    /// Every known node that borders at least one recorded fog cell.
    pub fn origin_nodes(&self) -> BTreeSet<Pos> {
        self.cells().flat_map(|fog| self.origins(fog)).map(|(_, origin)| origin).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(CostLabeling),
    NotFound { labeling: CostLabeling, frontier: FogFrontier },
}

impl SearchOutcome {
    pub fn labeling(&self) -> &CostLabeling {
        match self {
            Self::Found(labeling) | Self::NotFound { labeling, .. } => labeling,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathQuery {
    pub start: Pos,
    pub goal: Pos,
    /// Cost already spent reaching `start`.
    pub start_cost: u32,
    pub algorithm: SearchAlgorithm,
    pub weighting: Weighting,
}

impl PathQuery {
    pub fn new(start: Pos, goal: Pos, algorithm: SearchAlgorithm) -> Self {
        Self { start, goal, start_cost: 0, algorithm, weighting: Weighting::Terrain }
    }
}

// Field order is the open-set ranking: f, then lower g, then row, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    g: u32,
    y: i32,
    x: i32,
}

impl OpenNode {
    fn new(pos: Pos, g: u32, h: u32) -> Self {
        Self { f: g.saturating_add(h), g, y: pos.y, x: pos.x }
    }

    fn pos(self) -> Pos {
        Pos { y: self.y, x: self.x }
    }
}

pub fn find_path(
    graph: &Graph,
    query: PathQuery,
    sink: &mut dyn StepSink,
) -> Result<SearchOutcome, SearchError> {
    let oracle = Oracle::new(graph, query.weighting);
    if !oracle.is_known_passable(query.start) {
        return Err(PreconditionError::StartNotTraversable { pos: query.start }.into());
    }

    let heuristic = |pos: Pos| match query.algorithm {
        SearchAlgorithm::Dijkstra => 0,
        SearchAlgorithm::AStar => manhattan(pos, query.goal) * Terrain::cheapest_cost(),
    };
    let explorable = graph.passable_count();
    let mut labeling = CostLabeling { start: query.start, labels: BTreeMap::new() };
    let mut frontier = FogFrontier::default();
    let mut open_set = BTreeSet::new();
    let mut explored = 0;
    let mut goal_cost = None;

    let h = heuristic(query.start);
    labeling.labels.insert(query.start, Label { cost: query.start_cost, estimate: h, closed: false });
    open_set.insert(OpenNode::new(query.start, query.start_cost, h));

    while let Some(curr) = open_set.pop_first() {
        // Once the goal is final, only nodes tied with it may still lie on an optimal path.
        if goal_cost.is_some_and(|cost| curr.f > cost) {
            break;
        }
        let p = curr.pos();
        if let Some(label) = labeling.labels.get_mut(&p) {
            label.closed = true;
        }
        explored += 1;
        sink.record(StepRecord {
            explored,
            explorable,
            cost: Some(curr.g),
            label: Some(StepLabel::Finalized { pos: p }),
        });

        if p == query.goal {
            goal_cost = Some(curr.g);
            if query.algorithm == SearchAlgorithm::Dijkstra {
                break;
            }
            continue;
        }

        for fog in oracle.unknown_neighbors(p) {
            frontier.record(fog, curr.g, p);
        }

        for (n, step) in oracle.known_steps(p) {
            let tentative = curr.g.saturating_add(step);
            match labeling.labels.get(&n) {
                Some(label) if label.closed || tentative >= label.cost => continue,
                Some(label) => {
                    open_set.remove(&OpenNode::new(n, label.cost, label.estimate));
                }
                None => {}
            }
            let h = heuristic(n);
            labeling.labels.insert(n, Label { cost: tentative, estimate: h, closed: false });
            open_set.insert(OpenNode::new(n, tentative, h));
            sink.record(StepRecord {
                explored,
                explorable,
                cost: Some(tentative),
                label: Some(StepLabel::Relaxed { pos: n }),
            });
        }
    }

    let label = if goal_cost.is_some() { StepLabel::PathFound } else { StepLabel::NoPath };
    sink.record(StepRecord { explored, explorable, cost: goal_cost, label: Some(label) });

    Ok(match goal_cost {
        Some(_) => SearchOutcome::Found(labeling),
        None => SearchOutcome::NotFound { labeling, frontier },
    })
}
