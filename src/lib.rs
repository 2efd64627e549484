//! Waggle - lookahead agent for a hex-grid pollination game
//!
//! This crate decides, once per turn and within a wall-clock budget, the
//! single best command for a player's flying units:
//! - Hex geometry with offset-column movement and the legal-turn table
//! - A deterministic single-tick simulation twin of the game board
//! - Pruned candidate command generation
//! - Stage-selected static evaluation
//! - Iterative-deepening search with a per-invocation transposition table
//!
//! The host contest engine supplies turn snapshots and enforces the real
//! rules; the simulation here is a simplified twin used only for lookahead.

pub mod agent;
pub mod board;
pub mod hex;
pub mod moves;
pub mod params;
pub mod score;
pub mod search;
pub mod volant;

// Re-exports for convenient access
pub use agent::{Agent, SnapshotError, TurnSnapshot};
pub use board::{Board, Command, Flower, FlowerKind, Hive, SimError};
pub use hex::{Heading, HEADINGS};
pub use moves::candidates;
pub use params::GameParams;
pub use score::{score, EvalContext, ScoreParams, Stage};
pub use search::{best_command, SearchConfig};
pub use volant::{Bee, Seed, Volant, VolantId};
