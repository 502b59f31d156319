//! Seeded random maps in the plain-text format `fogpath::parse_map` reads.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

const TERRAIN_CELLS: [char; 5] = ['S', 'P', 'F', 'H', 'M'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapShape {
    pub width: usize,
    pub height: usize,
    /// Chance in percent that a cell starts under fog.
    pub fog_percent: u64,
}

pub fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

/// Builds a map with one player and one target on distinct cells.
/// The player always stands on known terrain; the target may be fogged.
/// Shapes smaller than 2x1 are grown to 2x1.
pub fn random_map_text(rng: &mut ChaCha8Rng, shape: MapShape) -> String {
    let width = shape.width.max(2);
    let height = shape.height.max(1);
    let cells = width * height;
    let player = rng.next_u64() as usize % cells;
    let mut target = rng.next_u64() as usize % cells;
    if target == player {
        target = (target + 1) % cells;
    }

    let mut out = String::with_capacity(cells + height);
    for idx in 0..cells {
        let fogged = rng.next_u64() % 100 < shape.fog_percent;
        let cell = choose(rng, &TERRAIN_CELLS);
        let ch = if idx == player {
            '@'
        } else if idx == target {
            if fogged { '?' } else { '*' }
        } else if fogged {
            cell.to_ascii_lowercase()
        } else {
            cell
        };
        out.push(ch);
        if (idx + 1) % width == 0 {
            out.push('\n');
        }
    }
    out
}
