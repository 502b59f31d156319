//! Plain-text grid maps, one line per row and one character per cell.
//!
//! `S P F H M` are known Street/Plains/Forest/Hill/Mountain cells and the
//! lowercase letters are the same terrain under fog. `@` is the player and
//! `*` the target, both on known Street; `?` is the target on foggy Street.
//! `#` marks a missing node, and rows shorter than the widest row are padded
//! with missing nodes.

use std::error::Error;
use std::fmt;

use crate::graph::Graph;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapParseError {
    Empty,
    UnknownCell { line: usize, column: usize, ch: char },
    DuplicateEntity { kind: EntityKind, line: usize, column: usize },
}

impl fmt::Display for MapParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "map has no rows"),
            Self::UnknownCell { line, column, ch } => {
                write!(f, "unknown map cell {ch:?} at line {line}, column {column}")
            }
            Self::DuplicateEntity { kind, line, column } => {
                write!(f, "second {kind:?} at line {line}, column {column}")
            }
        }
    }
}

impl Error for MapParseError {}

fn terrain_for(ch: char) -> Option<Terrain> {
    match ch.to_ascii_uppercase() {
        'S' | '@' | '*' | '?' | '#' => Some(Terrain::Street),
        'P' => Some(Terrain::Plains),
        'F' => Some(Terrain::Forest),
        'H' => Some(Terrain::Hill),
        'M' => Some(Terrain::Mountain),
        _ => None,
    }
}

fn terrain_char(terrain: Terrain) -> char {
    match terrain {
        Terrain::Street => 'S',
        Terrain::Plains => 'P',
        Terrain::Forest => 'F',
        Terrain::Hill => 'H',
        Terrain::Mountain => 'M',
    }
}

/// Parses one string per row. Blank trailing whitespace is ignored.
pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> Result<Graph, MapParseError> {
    let rows: Vec<&str> = rows.iter().map(|row| row.as_ref().trim_end()).collect();
    let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    if rows.is_empty() || width == 0 {
        return Err(MapParseError::Empty);
    }

    let mut graph = Graph::new(width, rows.len());
    let mut holes = Vec::new();
    let mut seen_player = false;
    let mut seen_target = false;

    for (y, row) in rows.iter().enumerate() {
        let mut row_width = 0;
        for (x, ch) in row.chars().enumerate() {
            row_width = x + 1;
            let pos = Pos { y: y as i32, x: x as i32 };
            let terrain =
                terrain_for(ch).ok_or(MapParseError::UnknownCell { line: y + 1, column: x + 1, ch })?;
            graph.set_terrain(pos, terrain);
            graph.set_known(pos, !(ch.is_ascii_lowercase() || ch == '?'));

            let kind = match ch {
                '@' => Some((EntityKind::Player, &mut seen_player)),
                '*' | '?' => Some((EntityKind::Target, &mut seen_target)),
                '#' => {
                    holes.push(pos);
                    None
                }
                _ => None,
            };
            if let Some((kind, seen)) = kind {
                if *seen {
                    return Err(MapParseError::DuplicateEntity { kind, line: y + 1, column: x + 1 });
                }
                *seen = true;
                graph.place(kind, pos);
            }
        }
        for x in row_width..width {
            holes.push(Pos { y: y as i32, x: x as i32 });
        }
    }

    for pos in holes {
        graph.remove_node(pos);
    }
    Ok(graph)
}

pub fn parse_map(text: &str) -> Result<Graph, MapParseError> {
    let rows: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    parse_rows(&rows)
}

/// Renders `graph` in the format [`parse_map`] reads. Edge costs are not kept.
pub fn render_map(graph: &Graph) -> String {
    let mut out = String::with_capacity((graph.width() + 1) * graph.height());
    for y in 0..graph.height() {
        for x in 0..graph.width() {
            let pos = Pos { y: y as i32, x: x as i32 };
            let ch = match (graph.node(pos), graph.occupant(pos)) {
                (None, _) => '#',
                (Some(_), Some(EntityKind::Player)) => '@',
                (Some(node), Some(EntityKind::Target)) => {
                    if node.known {
                        '*'
                    } else {
                        '?'
                    }
                }
                (Some(node), None) if node.known => terrain_char(node.terrain),
                (Some(node), None) => terrain_char(node.terrain).to_ascii_lowercase(),
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
