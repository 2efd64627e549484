//! Time-bounded iterative-deepening search
//!
//! Single-agent best-value lookahead: every node maximizes the same
//! heuristic, there is no opposing minimizer. The search deepens one ply at
//! a time under a hard wall-clock budget, sharing work between depths
//! through a per-invocation transposition table keyed by the board's
//! canonical key. Deadline checks are cooperative and sit at root-candidate
//! granularity, so overshoot is bounded by one subtree evaluation.

use crate::board::{Board, Command};
use crate::moves::candidates;
use crate::params::GameParams;
use crate::score::{score, EvalContext, ScoreParams};
use crate::volant::Volant;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Search limits.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Wall-clock budget for one invocation.
    pub budget: Duration,
    /// Cap on iterative-deepening depth.
    pub max_depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { budget: Duration::from_millis(160), max_depth: 19 }
    }
}

/// One transposition entry: the value of the keyed board when explored to
/// `depth`.
#[derive(Clone, Copy, Debug)]
struct TtEntry {
    depth: u32,
    value: i64,
}

type TranspositionTable = FxHashMap<u64, TtEntry>;

/// Relative cost of branching on each volant kind, used to project whether
/// another full depth iteration fits in the budget.
fn branch_weight(volant: &Volant) -> u32 {
    match volant {
        Volant::Bee(_) => 2,
        Volant::Seed(_) => 3,
        Volant::QueenBee(_) => 3,
    }
}

/// Pick the best command for `root` within the configured budget. Returns
/// `None` when the board has nothing in flight, or when issuing no command
/// is the best option found.
pub fn best_command(
    root: &Board,
    params: &GameParams,
    score_params: &ScoreParams,
    config: &SearchConfig,
) -> Option<Command> {
    if root.inflight.is_empty() {
        return None;
    }

    let started = Instant::now();
    let deadline = started + config.budget;
    let ctx = EvalContext::for_root(root);
    let mut tt: TranspositionTable = TranspositionTable::default();

    let branching: u32 = root.inflight.values().map(branch_weight).sum();

    let mut best_value = i64::MIN;
    let mut best_cmd: Option<Command> = None;

    for depth in 1..=config.max_depth {
        let mut first_eval_cost = Duration::ZERO;

        for (index, cmd) in candidates(root).into_iter().enumerate() {
            let eval_started = Instant::now();

            let mut child = root.clone();
            match child.advance(cmd.as_ref(), params) {
                Ok(()) => {
                    let value =
                        dfs_max(&child, depth - 1, &mut tt, &ctx, params, score_params);
                    // Strict comparison keeps the earliest candidate on ties.
                    if value > best_value {
                        best_value = value;
                        best_cmd = cmd;
                    }
                }
                Err(err) => {
                    trace!(%err, "candidate rejected by simulation");
                    continue;
                }
            }

            let spent = eval_started.elapsed();
            if index == 0 {
                first_eval_cost = spent;
            }
            // Assume the next candidate costs up to 1.5x the one just
            // finished; bail out now rather than blow the budget on it.
            if Instant::now() + spent + spent / 2 > deadline {
                debug!(depth, value = best_value, "mid-depth deadline abort");
                return best_cmd;
            }
        }

        let elapsed = started.elapsed();
        if elapsed > config.budget || elapsed + first_eval_cost * branching > config.budget {
            debug!(depth, value = best_value, "no budget for next depth");
            return best_cmd;
        }
        debug!(depth, value = best_value, ?elapsed, "depth complete");
    }

    best_cmd
}

/// Exhaustive best-value recursion with transposition memoization. A cached
/// entry short-circuits only when it was explored at least as deep as the
/// remaining depth here; deeper results overwrite shallower ones.
fn dfs_max(
    board: &Board,
    depth: u32,
    tt: &mut TranspositionTable,
    ctx: &EvalContext,
    params: &GameParams,
    score_params: &ScoreParams,
) -> i64 {
    if depth == 0 {
        return score(board, ctx, score_params);
    }

    let key = board.canonical_key();
    if let Some(entry) = tt.get(&key) {
        if entry.depth >= depth {
            return entry.value;
        }
    }

    let mut best = i64::MIN;
    for cmd in candidates(board) {
        let mut child = board.clone();
        match child.advance(cmd.as_ref(), params) {
            Ok(()) => {
                let value = dfs_max(&child, depth - 1, tt, ctx, params, score_params);
                best = best.max(value);
            }
            Err(err) => trace!(%err, "candidate rejected by simulation"),
        }
    }

    tt.insert(key, TtEntry { depth, value: best });
    best
}
