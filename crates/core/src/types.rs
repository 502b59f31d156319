use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
    pub struct EdgeId;
}

/// Sentinel cost for unlabeled or impassable nodes.
pub const INFINITE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    pub fn step(self, from: Pos) -> Pos {
        match self {
            Self::North => Pos { y: from.y - 1, x: from.x },
            Self::East => Pos { y: from.y, x: from.x + 1 },
            Self::South => Pos { y: from.y + 1, x: from.x },
            Self::West => Pos { y: from.y, x: from.x - 1 },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Street,
    Plains,
    Forest,
    Hill,
    Mountain,
}

impl Terrain {
    /// Traversal cost of entering a cell of this terrain. `None` means impassable.
    pub fn cost(self) -> Option<u32> {
        match self {
            Self::Street => Some(1),
            Self::Plains => Some(2),
            Self::Forest => Some(3),
            Self::Hill => Some(5),
            Self::Mountain => None,
        }
    }

    pub fn is_passable(self) -> bool {
        self.cost().is_some()
    }

    /// Lowest cost any passable terrain can have; keeps straight-line estimates admissible.
    pub fn cheapest_cost() -> u32 {
        1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Target,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchAlgorithm {
    Dijkstra,
    #[default]
    AStar,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontierStrategy {
    ClosestToPlayer,
    ClosestToTarget,
    #[default]
    MinSumOfBoth,
}

/// Which quantity a single move is charged with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weighting {
    /// Entering a cell costs its terrain cost.
    #[default]
    Terrain,
    /// Entering a cell costs the cost of the edge crossed; terrain only decides passability.
    Edge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreconditionError {
    MissingPlayer,
    MissingTarget,
    StartNotTraversable { pos: Pos },
    GoalNotLabeled { goal: Pos },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A labeled node on the way back to the start has no consistent predecessor.
    NoPredecessor { pos: Pos },
    /// A frontier node was handed over that does not border exactly one unvisited fog cell.
    AmbiguousFrontier { node: Pos, fog_neighbors: usize },
    UnlabeledFrontier { node: Pos },
    /// The fog-entry path tried to enter a cell the searcher can already see.
    EntryAlreadyKnown { pos: Pos },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    Precondition(PreconditionError),
    Invariant(InvariantViolation),
}

impl From<PreconditionError> for SearchError {
    fn from(error: PreconditionError) -> Self {
        Self::Precondition(error)
    }
}

impl From<InvariantViolation> for SearchError {
    fn from(error: InvariantViolation) -> Self {
        Self::Invariant(error)
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition(PreconditionError::MissingPlayer) => {
                write!(f, "no player is placed on the graph")
            }
            Self::Precondition(PreconditionError::MissingTarget) => {
                write!(f, "no target is placed on the graph")
            }
            Self::Precondition(PreconditionError::StartNotTraversable { pos }) => {
                write!(f, "search start ({}, {}) is not a known passable node", pos.x, pos.y)
            }
            Self::Precondition(PreconditionError::GoalNotLabeled { goal }) => {
                write!(f, "goal ({}, {}) has no finite cost in the labeling", goal.x, goal.y)
            }
            Self::Invariant(InvariantViolation::NoPredecessor { pos }) => {
                write!(f, "internal error: ({}, {}) has no shortest-path predecessor", pos.x, pos.y)
            }
            Self::Invariant(InvariantViolation::AmbiguousFrontier { node, fog_neighbors }) => {
                write!(
                    f,
                    "internal error: frontier node ({}, {}) borders {fog_neighbors} unvisited fog cells",
                    node.x, node.y
                )
            }
            Self::Invariant(InvariantViolation::UnlabeledFrontier { node }) => {
                write!(f, "internal error: frontier node ({}, {}) has no cost label", node.x, node.y)
            }
            Self::Invariant(InvariantViolation::EntryAlreadyKnown { pos }) => {
                write!(f, "internal error: fog entry ({}, {}) is already known", pos.x, pos.y)
            }
        }
    }
}

impl Error for SearchError {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEvent {
    SearchStarted { from: Pos, cost: u32 },
    SearchFailed { from: Pos, fog_cells: usize },
    PathsFound { cost: u32, count: usize },
    EntrySelected { frontier: Pos, entry: Pos, strategy: FrontierStrategy },
    ExcursionStuck { entry: Pos, walked: usize },
    Reconnected { at: Pos, cost: u32 },
    GoalReached { cost: u32 },
    Unreachable { ambiguous: usize },
}
