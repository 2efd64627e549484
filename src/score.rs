//! Static board evaluation
//!
//! Two heuristics, selected once per search episode from the root board's
//! hive count and then held fixed for every node in that tree. The early
//! heuristic chases expansion: hives, flowers, and anything in flight that
//! promises more of them. The mid heuristic switches to consolidation,
//! paying diminishing returns on hive nectar so half-filling existing hives
//! beats founding new ones, and steering flowers toward hive-adjacent tiles.

use crate::board::{Board, FlowerKind};
use crate::hex::footprint;
use crate::volant::Volant;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Heuristic mode, chosen from the root hive count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Early,
    Mid,
}

/// A colony this size or smaller is still in the expansion stage.
const EARLY_STAGE_MAX_HIVES: usize = 5;

impl Stage {
    pub fn of(board: &Board) -> Stage {
        if board.hives.len() <= EARLY_STAGE_MAX_HIVES {
            Stage::Early
        } else {
            Stage::Mid
        }
    }
}

/// Heuristic weights. Defaults are hand-tuned for the standard 8x8 game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreParams {
    pub dead_bee_factor: i64,
    pub hive_factor: i64,
    pub flower_factor: i64,
    pub venus_factor: i64,
    pub nectar_factor: i64,
    pub flower_adjacent_to_hive: i64,
    pub flower_adjacent_to_flower: i64,
    pub queen_bee_bonus: i64,
    pub seed_bonus: i64,
    /// Seed bonus once the board is crowded with flowers.
    pub crowded_seed_bonus: i64,
    /// Flower count above which seeds stop being precious.
    pub crowded_flower_cutoff: usize,
    /// (tier limit, rate per nectar) pairs, applied in order with the
    /// remainder carried into the next tier.
    pub mid_graded_nectar: Vec<(i64, i64)>,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            dead_bee_factor: -3,
            hive_factor: 200,
            flower_factor: 50,
            venus_factor: -50,
            nectar_factor: 2,
            flower_adjacent_to_hive: 60,
            flower_adjacent_to_flower: 55,
            queen_bee_bonus: 50,
            seed_bonus: 25,
            crowded_seed_bonus: 2,
            crowded_flower_cutoff: 40,
            mid_graded_nectar: vec![(60, 4), (90, 3), (10, 2)],
        }
    }
}

/// Fixed-for-the-episode evaluation context: the stage and the root board's
/// adjacency sets. Descendant boards are scored against the root's layout.
#[derive(Clone, Debug)]
pub struct EvalContext {
    pub stage: Stage,
    pub adjacent_to_hives: FxHashSet<(i32, i32)>,
    pub adjacent_to_flowers: FxHashSet<(i32, i32)>,
}

impl EvalContext {
    /// Build the context for a search rooted at `board`.
    pub fn for_root(board: &Board) -> Self {
        let hive_tiles: FxHashSet<(i32, i32)> =
            board.hives.iter().map(|h| (h.x, h.y)).collect();

        let mut adjacent_to_hives: FxHashSet<(i32, i32)> = hive_tiles
            .iter()
            .flat_map(|&(x, y)| footprint(x, y, 1, board.width, board.height))
            .collect();
        let mut adjacent_to_flowers: FxHashSet<(i32, i32)> = board
            .flowers
            .iter()
            .flat_map(|f| footprint(f.x, f.y, 1, board.width, board.height))
            .collect();

        // A flower cannot sit on a hive tile, so those never count as a
        // placement target.
        for tile in &hive_tiles {
            adjacent_to_hives.remove(tile);
            adjacent_to_flowers.remove(tile);
        }

        Self { stage: Stage::of(board), adjacent_to_hives, adjacent_to_flowers }
    }
}

/// Score `board` under the episode's fixed context. Higher is better.
pub fn score(board: &Board, ctx: &EvalContext, params: &ScoreParams) -> i64 {
    match ctx.stage {
        Stage::Early => early_stage_score(board, params),
        Stage::Mid => mid_stage_score(board, ctx, params),
    }
}

fn early_stage_score(board: &Board, params: &ScoreParams) -> i64 {
    let hive_nectar: i64 = board.hives.iter().map(|h| h.nectar).sum();
    let flower_score: i64 = board
        .flowers
        .iter()
        .map(|f| match f.kind {
            FlowerKind::Flower => params.flower_factor,
            FlowerKind::VenusBeeTrap => params.venus_factor,
        })
        .sum();

    let seed_bonus = if board.flowers.len() <= params.crowded_flower_cutoff {
        params.seed_bonus
    } else {
        params.crowded_seed_bonus
    };

    let mut total = board.dead_bees as i64 * params.dead_bee_factor
        + board.hives.len() as i64 * params.hive_factor
        + flower_score
        + hive_nectar * params.nectar_factor
        + board.seeds_to_gen as i64 * seed_bonus;

    for volant in board.inflight.values() {
        total += match volant {
            Volant::QueenBee(_) => params.queen_bee_bonus,
            Volant::Seed(_) => seed_bonus,
            Volant::Bee(b) => b.nectar as i64,
        };
    }

    total
}

fn mid_stage_score(board: &Board, ctx: &EvalContext, params: &ScoreParams) -> i64 {
    let tiers = &params.mid_graded_nectar;
    let mut total = board.dead_bees as i64 * params.dead_bee_factor
        + board.hives.len() as i64 * params.hive_factor;

    for hive in &board.hives {
        total += hive.nectar * params.nectar_factor + graded_nectar(hive.nectar, tiers);
    }

    for flower in &board.flowers {
        total += match flower.kind {
            FlowerKind::VenusBeeTrap => params.venus_factor,
            FlowerKind::Flower => {
                if ctx.adjacent_to_hives.contains(&(flower.x, flower.y)) {
                    params.flower_adjacent_to_hive
                } else if ctx.adjacent_to_flowers.contains(&(flower.x, flower.y)) {
                    params.flower_adjacent_to_flower
                } else {
                    params.flower_factor
                }
            }
        };
    }

    total
}

/// Diminishing-returns nectar value: each tier's rate applies to the slice
/// of nectar falling inside its limit, the remainder rolls forward, and
/// nectar beyond the last tier is worth nothing here.
fn graded_nectar(nectar: i64, tiers: &[(i64, i64)]) -> i64 {
    let mut remaining = nectar.max(0);
    let mut total = 0;
    for &(limit, rate) in tiers {
        total += rate * remaining.min(limit);
        remaining = (remaining - limit).max(0);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Flower, Hive};
    use crate::hex::Heading;
    use crate::volant::{Bee, Seed};

    fn base_board(hive_count: usize) -> Board {
        let mut b = Board::new(8, 8, 10);
        for i in 0..hive_count {
            b.hives.push(Hive::new(i as i32, 0, 0));
        }
        b.flowers.push(Flower::new(4, 4, 100));
        b
    }

    #[test]
    fn test_stage_selection() {
        assert_eq!(Stage::of(&base_board(5)), Stage::Early);
        assert_eq!(Stage::of(&base_board(6)), Stage::Mid);
    }

    #[test]
    fn test_early_score_monotonic_in_hive_nectar() {
        let params = ScoreParams::default();
        let mut board = base_board(2);
        let ctx = EvalContext::for_root(&board);

        let mut last = score(&board, &ctx, &params);
        for nectar in 1..=20 {
            board.hives[0].nectar = nectar;
            let s = score(&board, &ctx, &params);
            assert!(s > last, "score must rise with stored nectar");
            last = s;
        }
    }

    #[test]
    fn test_early_hive_nectar_is_linear() {
        // No diminishing returns in the early stage: the marginal value of
        // stored nectar stays flat well past the mid-stage tier limits.
        let params = ScoreParams::default();
        let mut board = base_board(2);
        let ctx = EvalContext::for_root(&board);

        board.hives[0].nectar = 100;
        let at_100 = score(&board, &ctx, &params);
        board.hives[0].nectar = 150;
        let at_150 = score(&board, &ctx, &params);
        assert_eq!(at_150 - at_100, 50 * params.nectar_factor);
    }

    #[test]
    fn test_early_inflight_bonuses() {
        let params = ScoreParams::default();
        let mut board = base_board(2);
        let ctx = EvalContext::for_root(&board);
        let empty = score(&board, &ctx, &params);

        board
            .inflight
            .insert("q".into(), Volant::QueenBee(Bee {
                x: 5,
                y: 5,
                heading: Heading::North,
                energy: 10,
                nectar: 0,
            }));
        assert_eq!(score(&board, &ctx, &params), empty + params.queen_bee_bonus);

        board.inflight.insert("s".into(), Volant::Seed(Seed {
            x: 6,
            y: 5,
            heading: Heading::North,
        }));
        assert_eq!(
            score(&board, &ctx, &params),
            empty + params.queen_bee_bonus + params.seed_bonus
        );
    }

    #[test]
    fn test_graded_nectar_tiers() {
        let tiers = [(60, 4), (90, 3), (10, 2)];
        assert_eq!(graded_nectar(0, &tiers), 0);
        assert_eq!(graded_nectar(30, &tiers), 120);
        assert_eq!(graded_nectar(60, &tiers), 240);
        // 60 into tier one, 10 into tier two.
        assert_eq!(graded_nectar(70, &tiers), 240 + 30);
        // Beyond all tiers the surplus earns nothing extra.
        assert_eq!(graded_nectar(200, &tiers), 240 + 270 + 20);
        assert_eq!(graded_nectar(500, &tiers), graded_nectar(160, &tiers));
    }

    #[test]
    fn test_mid_marginal_value_shrinks_past_first_tier() {
        let params = ScoreParams::default();
        let mut board = base_board(6);
        let ctx = EvalContext::for_root(&board);
        assert_eq!(ctx.stage, Stage::Mid);

        board.hives[0].nectar = 59;
        let a = score(&board, &ctx, &params);
        board.hives[0].nectar = 60;
        let b = score(&board, &ctx, &params);
        board.hives[0].nectar = 61;
        let c = score(&board, &ctx, &params);

        let first_tier_margin = b - a;
        let second_tier_margin = c - b;
        assert!(second_tier_margin < first_tier_margin);
        assert!(second_tier_margin > 0);
    }

    #[test]
    fn test_mid_flower_placement_preference() {
        let params = ScoreParams::default();
        let board = base_board(6);
        let ctx = EvalContext::for_root(&board);

        let place = |x: i32, y: i32| {
            let mut b = board.clone();
            b.flowers.push(Flower::new(x, y, 100));
            score(&b, &ctx, &params)
        };

        let next_to_hive = place(1, 1); // adjacent to the hive row at y=0
        let next_to_flower = place(5, 5); // adjacent to the flower at (4, 4)
        let in_the_open = place(7, 7);

        assert!(next_to_hive > next_to_flower);
        assert!(next_to_flower > in_the_open);
    }

    #[test]
    fn test_venus_trap_scores_negative() {
        let params = ScoreParams::default();
        let board = base_board(2);
        let ctx = EvalContext::for_root(&board);
        let clean = score(&board, &ctx, &params);

        let mut with_trap = board.clone();
        let mut trap = Flower::new(6, 6, 100);
        trap.kind = FlowerKind::VenusBeeTrap;
        with_trap.flowers.push(trap);
        assert_eq!(score(&with_trap, &ctx, &params), clean + params.venus_factor);
    }
}
