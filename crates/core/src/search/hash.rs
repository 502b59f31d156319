//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from the search and exploration code.
//! It does not own trace persistence.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
}

fn write_positions(hasher: &mut Xxh3, positions: &[Pos]) {
    hasher.write_usize(positions.len());
    for pos in positions {
        write_pos(hasher, *pos);
    }
}

fn write_strategy(hasher: &mut Xxh3, strategy: FrontierStrategy) {
    hasher.write_u8(match strategy {
        FrontierStrategy::ClosestToPlayer => 0,
        FrontierStrategy::ClosestToTarget => 1,
        FrontierStrategy::MinSumOfBoth => 2,
    });
}

fn write_event(hasher: &mut Xxh3, event: &RunEvent) {
    match *event {
        RunEvent::SearchStarted { from, cost } => {
            hasher.write_u8(0);
            write_pos(hasher, from);
            hasher.write_u32(cost);
        }
        RunEvent::SearchFailed { from, fog_cells } => {
            hasher.write_u8(1);
            write_pos(hasher, from);
            hasher.write_usize(fog_cells);
        }
        RunEvent::PathsFound { cost, count } => {
            hasher.write_u8(2);
            hasher.write_u32(cost);
            hasher.write_usize(count);
        }
        RunEvent::EntrySelected { frontier, entry, strategy } => {
            hasher.write_u8(3);
            write_pos(hasher, frontier);
            write_pos(hasher, entry);
            write_strategy(hasher, strategy);
        }
        RunEvent::ExcursionStuck { entry, walked } => {
            hasher.write_u8(4);
            write_pos(hasher, entry);
            hasher.write_usize(walked);
        }
        RunEvent::Reconnected { at, cost } => {
            hasher.write_u8(5);
            write_pos(hasher, at);
            hasher.write_u32(cost);
        }
        RunEvent::GoalReached { cost } => {
            hasher.write_u8(6);
            hasher.write_u32(cost);
        }
        RunEvent::Unreachable { ambiguous } => {
            hasher.write_u8(7);
            hasher.write_usize(ambiguous);
        }
    }
}

fn write_excursion(hasher: &mut Xxh3, report: &ExcursionReport) {
    write_pos(hasher, report.origin);
    write_pos(hasher, report.entry);
    match report.end {
        ExcursionEnd::Goal(pos) => {
            hasher.write_u8(0);
            write_pos(hasher, pos);
        }
        ExcursionEnd::Reconnected(pos) => {
            hasher.write_u8(1);
            write_pos(hasher, pos);
        }
        ExcursionEnd::Stuck => hasher.write_u8(2),
    }
    write_positions(hasher, &report.walked);
    write_positions(hasher, &report.path);
    hasher.write_usize(report.discarded.len());
    for pos in &report.discarded {
        write_pos(hasher, *pos);
    }
    hasher.write_usize(report.backtracks.len());
    for backtrack in &report.backtracks {
        write_pos(hasher, backtrack.from);
        write_pos(hasher, backtrack.to);
        hasher.write_u32(backtrack.cost);
    }
    hasher.write_u32(report.cost);
}

impl CostLabeling {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        write_pos(&mut hasher, self.start());
        hasher.write_usize(self.len());
        for (pos, label) in self.iter() {
            write_pos(&mut hasher, pos);
            hasher.write_u32(label.cost);
            hasher.write_u32(label.estimate);
            hasher.write_u8(u8::from(label.closed));
        }
        hasher.finish()
    }
}

impl RunReport {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        match &self.outcome {
            RunOutcome::Reached { cost, route, final_paths, truncated } => {
                hasher.write_u8(0);
                hasher.write_u32(*cost);
                write_positions(&mut hasher, route);
                hasher.write_usize(final_paths.len());
                for path in final_paths {
                    write_positions(&mut hasher, path);
                }
                hasher.write_u8(u8::from(*truncated));
            }
            RunOutcome::Unreachable { ambiguous_frontier } => {
                hasher.write_u8(1);
                write_positions(&mut hasher, ambiguous_frontier);
            }
        }
        hasher.write_usize(self.legs.len());
        for leg in &self.legs {
            match leg {
                Leg::Approach { path, cost } => {
                    hasher.write_u8(0);
                    write_positions(&mut hasher, path);
                    hasher.write_u32(*cost);
                }
                Leg::Excursion(report) => {
                    hasher.write_u8(1);
                    write_excursion(&mut hasher, report);
                }
            }
        }
        hasher.write_usize(self.log.len());
        for event in &self.log {
            write_event(&mut hasher, event);
        }
        hasher.finish()
    }
}
