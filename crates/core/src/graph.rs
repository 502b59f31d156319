//! Grid graph model: nodes, direction-tagged edges and placed entities.
//! This module exists so every search component reads the same cell data.
//! It does not own any search or exploration policy.

use slotmap::SlotMap;

use crate::types::*;

#[derive(Clone, Debug)]
pub struct Node {
    pub pos: Pos,
    pub terrain: Terrain,
    pub known: bool,
    edges: [Option<EdgeId>; 4],
    occupant: Option<EntityId>,
}

impl Node {
    pub fn edge(&self, dir: Direction) -> Option<EdgeId> {
        self.edges[dir.index()]
    }
}

/// Undirected link between two adjacent nodes. Each end records the direction
/// the edge leaves that node in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub ends: [(Pos, Direction); 2],
    pub cost: u32,
}

impl Edge {
    pub fn other(&self, from: Pos) -> Option<Pos> {
        match self.ends {
            [(a, _), (b, _)] if a == from => Some(b),
            [(a, _), (b, _)] if b == from => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Pos,
}

#[derive(Clone)]
pub struct Graph {
    width: usize,
    height: usize,
    cells: Vec<Option<Node>>,
    edges: SlotMap<EdgeId, Edge>,
    entities: SlotMap<EntityId, Entity>,
}

impl Graph {
    /// Builds a fully connected `width` x `height` grid of known Street cells.
    pub fn new(width: usize, height: usize) -> Self {
        let mut graph = Self {
            width,
            height,
            cells: Vec::with_capacity(width * height),
            edges: SlotMap::with_key(),
            entities: SlotMap::with_key(),
        };
        for y in 0..height {
            for x in 0..width {
                let pos = Pos { y: y as i32, x: x as i32 };
                graph.cells.push(Some(Node {
                    pos,
                    terrain: Terrain::Street,
                    known: true,
                    edges: [None; 4],
                    occupant: None,
                }));
            }
        }
        for y in 0..height {
            for x in 0..width {
                let pos = Pos { y: y as i32, x: x as i32 };
                graph.connect(pos, Direction::East);
                graph.connect(pos, Direction::South);
            }
        }
        graph
    }

    fn connect(&mut self, from: Pos, dir: Direction) {
        let to = dir.step(from);
        if !self.contains(from) || !self.contains(to) {
            return;
        }
        let id = self.edges.insert(Edge { ends: [(from, dir), (to, dir.opposite())], cost: 1 });
        if let Some(node) = self.node_mut(from) {
            node.edges[dir.index()] = Some(id);
        }
        if let Some(node) = self.node_mut(to) {
            node.edges[dir.opposite().index()] = Some(id);
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.node(pos).is_some()
    }

    pub fn node(&self, pos: Pos) -> Option<&Node> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)].as_ref()
    }

    fn node_mut(&mut self, pos: Pos) -> Option<&mut Node> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        self.cells[idx].as_mut()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.cells.iter().flatten()
    }

    pub fn terrain_at(&self, pos: Pos) -> Option<Terrain> {
        self.node(pos).map(|node| node.terrain)
    }

    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) {
        if let Some(node) = self.node_mut(pos) {
            node.terrain = terrain;
        }
    }

    pub fn is_known(&self, pos: Pos) -> bool {
        self.node(pos).is_some_and(|node| node.known)
    }

    pub fn set_known(&mut self, pos: Pos, known: bool) {
        if let Some(node) = self.node_mut(pos) {
            node.known = known;
        }
    }

    pub fn reveal(&mut self, pos: Pos) {
        self.set_known(pos, true);
    }

    pub fn fill_known(&mut self, known: bool) {
        for node in self.cells.iter_mut().flatten() {
            node.known = known;
        }
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edge-connected neighbors of `pos`, in North, East, South, West order.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = (Direction, Pos, &Edge)> + '_ {
        let node = self.node(pos);
        Direction::ALL.into_iter().filter_map(move |dir| {
            let id = node?.edge(dir)?;
            let edge = self.edges.get(id)?;
            Some((dir, edge.other(pos)?, edge))
        })
    }

    /// Sets the cost of the edge leaving `pos` towards `dir`. Costs are clamped to at least 1.
    pub fn set_edge_cost(&mut self, pos: Pos, dir: Direction, cost: u32) -> bool {
        let Some(id) = self.node(pos).and_then(|node| node.edge(dir)) else {
            return false;
        };
        match self.edges.get_mut(id) {
            Some(edge) => {
                edge.cost = cost.max(1);
                true
            }
            None => false,
        }
    }

    /// Removes a node together with its edges and any entity standing on it.
    pub fn remove_node(&mut self, pos: Pos) {
        let Some(node) = self.node(pos).cloned() else {
            return;
        };
        for dir in Direction::ALL {
            let Some(id) = node.edge(dir) else {
                continue;
            };
            if let Some(edge) = self.edges.remove(id)
                && let Some(other) = edge.other(pos)
                && let Some(neighbor) = self.node_mut(other)
            {
                neighbor.edges[dir.opposite().index()] = None;
            }
        }
        if let Some(id) = node.occupant {
            self.entities.remove(id);
        }
        let idx = self.index(pos);
        self.cells[idx] = None;
    }

    pub fn remove_row(&mut self, y: i32) {
        for x in 0..self.width as i32 {
            self.remove_node(Pos { y, x });
        }
    }

    pub fn remove_column(&mut self, x: i32) {
        for y in 0..self.height as i32 {
            self.remove_node(Pos { y, x });
        }
    }

    /// Number of nodes whose terrain can be traversed.
    pub fn passable_count(&self) -> usize {
        self.nodes().filter(|node| node.terrain.is_passable()).count()
    }

    /// Places the single entity of `kind` on `pos`, moving it if it already exists.
    /// Returns `None` when `pos` has no node or is held by the other entity.
    pub fn place(&mut self, kind: EntityKind, pos: Pos) -> Option<EntityId> {
        let occupant = self.node(pos)?.occupant;
        if let Some(id) = occupant
            && self.entities.get(id).is_some_and(|entity| entity.kind != kind)
        {
            return None;
        }

        if let Some(existing) = self.entity(kind) {
            if let Some(node) = self.node_mut(existing.pos) {
                node.occupant = None;
            }
            self.entities.remove(existing.id);
        }

        let id = self.entities.insert(Entity { id: EntityId::default(), kind, pos });
        self.entities[id].id = id;
        if let Some(node) = self.node_mut(pos) {
            node.occupant = Some(id);
        }
        Some(id)
    }

    pub fn entity(&self, kind: EntityKind) -> Option<Entity> {
        self.entities.values().find(|entity| entity.kind == kind).copied()
    }

    pub fn player(&self) -> Option<Pos> {
        self.entity(EntityKind::Player).map(|entity| entity.pos)
    }

    pub fn target(&self) -> Option<Pos> {
        self.entity(EntityKind::Target).map(|entity| entity.pos)
    }

    pub fn occupant(&self, pos: Pos) -> Option<EntityKind> {
        let id = self.node(pos)?.occupant?;
        self.entities.get(id).map(|entity| entity.kind)
    }
}
