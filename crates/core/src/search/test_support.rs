//! Shared graph fixtures for the `search` submodule test suites.
//! This module exists to avoid repeating grid setup across many tests.
//! It does not own production search logic.

use super::*;
use crate::map_text::parse_rows;

/// Builds a graph from one string per row in the plain-text map format.
pub(super) fn grid(rows: &[&str]) -> Graph {
    parse_rows(rows).expect("fixture map parses")
}

/// Three known Street columns with the middle one under fog.
pub(super) fn fog_column_fixture() -> Graph {
    grid(&[
        "@sS", //
        "SsS", //
        "Ss*",
    ])
}

/// Two disjoint 2-hop routes of equal cost from the player to the target.
pub(super) fn twin_route_fixture() -> Graph {
    grid(&[
        "@S", //
        "S*",
    ])
}

/// Target walled in by mountains with everything visible.
pub(super) fn sealed_target_fixture() -> Graph {
    grid(&[
        "@SSSS", //
        "SSMMM", //
        "SSM*M", //
        "SSMMM",
    ])
}
