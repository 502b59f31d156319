//! Cost and visibility queries shared by search, enumeration and exploration.

use crate::graph::{Edge, Graph};
use crate::types::*;

#[derive(Clone, Copy)]
pub struct Oracle<'g> {
    graph: &'g Graph,
    weighting: Weighting,
}

impl<'g> Oracle<'g> {
    pub fn new(graph: &'g Graph, weighting: Weighting) -> Self {
        Self { graph, weighting }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Terrain cost of `pos`, or `INFINITE` for impassable or missing nodes.
    pub fn terrain_cost(&self, pos: Pos) -> u32 {
        self.graph.terrain_at(pos).and_then(Terrain::cost).unwrap_or(INFINITE)
    }

    pub fn is_known(&self, pos: Pos) -> bool {
        self.graph.is_known(pos)
    }

    pub fn is_passable(&self, pos: Pos) -> bool {
        self.graph.terrain_at(pos).is_some_and(Terrain::is_passable)
    }

    pub fn is_known_passable(&self, pos: Pos) -> bool {
        self.is_known(pos) && self.is_passable(pos)
    }

    /// Cost charged for crossing `edge` into `to`; `None` when `to` cannot be entered.
    pub fn step_cost(&self, edge: &Edge, to: Pos) -> Option<u32> {
        let terrain = self.graph.terrain_at(to)?.cost()?;
        match self.weighting {
            Weighting::Terrain => Some(terrain),
            Weighting::Edge => Some(edge.cost),
        }
    }

    /// Known, passable neighbors of `from` with the cost of stepping onto each.
    pub fn known_steps(&self, from: Pos) -> impl Iterator<Item = (Pos, u32)> + use<'g> {
        let oracle = *self;
        self.graph.neighbors(from).filter_map(move |(_, to, edge)| {
            if !oracle.is_known(to) {
                return None;
            }
            Some((to, oracle.step_cost(edge, to)?))
        })
    }

    /// Neighbors of `from` still hidden from the searcher, whatever their terrain.
    pub fn unknown_neighbors(&self, from: Pos) -> impl Iterator<Item = Pos> + use<'g> {
        let oracle = *self;
        self.graph.neighbors(from).map(|(_, to, _)| to).filter(move |to| !oracle.is_known(*to))
    }
}
