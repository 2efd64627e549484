//! Candidate command generation
//!
//! Enumerates the pruned candidate set for one board. The set always starts
//! with the none-candidate, letting every volant fly straight. Branching is
//! deliberately narrow: while any queen is in flight only queens are
//! considered, since hive placement dominates everything a worker could do
//! that turn. Candidates are recomputed at every node, never cached.

use crate::board::{Board, Command};
use crate::volant::Volant;
use rustc_hash::FxHashSet;

/// Queens may not found a hive inside this radius of an existing hive while
/// the colony is still small.
const HIVE_SPACING_RADIUS: i32 = 2;

/// Seeds may not grow a flower adjacent to an existing hive or flower.
const FLOWER_SPACING_RADIUS: i32 = 1;

/// A hive at or below this much nectar is worth replacing in place.
const REPLACEABLE_HIVE_NECTAR: i64 = 1;

/// Enumerate candidate commands for `board`. The first entry is always
/// `None` (issue no command this tick).
pub fn candidates(board: &Board) -> Vec<Option<Command>> {
    let mut out: Vec<Option<Command>> = vec![None];

    let hive_tiles: FxHashSet<(i32, i32)> = board.hives.iter().map(|h| (h.x, h.y)).collect();

    // Tiles where a seed may not be planted: every hive and flower tile
    // plus their immediate surroundings.
    let mut flower_exclusion: FxHashSet<(i32, i32)> = FxHashSet::default();
    for &(x, y) in &hive_tiles {
        flower_exclusion.extend(crate::hex::footprint(
            x,
            y,
            FLOWER_SPACING_RADIUS,
            board.width,
            board.height,
        ));
    }
    for f in &board.flowers {
        flower_exclusion.extend(crate::hex::footprint(
            f.x,
            f.y,
            FLOWER_SPACING_RADIUS,
            board.width,
            board.height,
        ));
    }

    // Tiles where a queen may not found a hive. Once the colony has more
    // than two hives the spacing requirement is dropped and only the hive
    // tiles themselves are off limits.
    let hive_exclusion: FxHashSet<(i32, i32)> = if board.hives.len() <= 2 {
        hive_tiles
            .iter()
            .flat_map(|&(x, y)| {
                crate::hex::footprint(x, y, HIVE_SPACING_RADIUS, board.width, board.height)
            })
            .collect()
    } else {
        hive_tiles.clone()
    };

    // Queen-only pruning: with a queen in flight, nothing else branches.
    let mut tracked: Vec<&String> = board
        .inflight
        .iter()
        .filter(|(_, v)| matches!(v, Volant::QueenBee(_)))
        .map(|(id, _)| id)
        .collect();
    if tracked.is_empty() {
        tracked = board.inflight.keys().collect();
    }
    // Map order is arbitrary; sorted ids keep the tree reproducible.
    tracked.sort_unstable();

    for id in tracked {
        let volant = &board.inflight[id];
        let (x, y) = volant.position();

        for heading in volant.heading().legal_turns() {
            out.push(Some(Command::Turn { entity: id.clone(), heading }));
        }

        match volant {
            Volant::QueenBee(_) => {
                let allowed = if !hive_exclusion.contains(&(x, y)) {
                    true
                } else {
                    // Inside the spacing footprint a queen may still replace
                    // a nearly-empty hive, as long as she is not directly on
                    // a hive tile.
                    nearest_hive_nectar(board, x, y)
                        .is_some_and(|nectar| nectar <= REPLACEABLE_HIVE_NECTAR)
                        && !hive_tiles.contains(&(x, y))
                };
                if allowed {
                    out.push(Some(Command::CreateHive { entity: id.clone() }));
                }
            }
            Volant::Seed(_) => {
                if !flower_exclusion.contains(&(x, y)) {
                    out.push(Some(Command::Flower { entity: id.clone() }));
                }
            }
            Volant::Bee(_) => {}
        }
    }

    out
}

/// Nectar held by the hive closest to (x, y) by Chebyshev distance.
fn nearest_hive_nectar(board: &Board, x: i32, y: i32) -> Option<i64> {
    board
        .hives
        .iter()
        .min_by_key(|h| (h.x - x).abs().max((h.y - y).abs()))
        .map(|h| h.nectar)
}
