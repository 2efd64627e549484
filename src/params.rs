//! Game-balance parameters
//!
//! An immutable bundle of the balance constants the simulation depends on.
//! The host engine owns the authoritative values; this copy exists so every
//! simulated tick reads the same numbers without any global state. Loading
//! these from configuration is out of scope.

use serde::{Deserialize, Serialize};

/// Balance constants for the simulation twin. Construct once per search
/// invocation and pass by reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParams {
    /// Maximum nectar a bee can carry.
    pub bee_nectar_capacity: i32,
    /// Energy gained per point of flower potency drunk.
    pub bee_energy_boost_per_nectar: i32,
    /// Turns a freshly planted flower lives.
    pub flower_lifespan: u32,
    /// Turns added to a flower's expiry per visit.
    pub flower_lifespan_visit_impact: u32,
    /// Visits per point of potency (potency = min(3, visits / ratio + 1)).
    pub flower_visit_potency_ratio: u32,
    /// Visit count at which a flower first spawns a seed.
    pub flower_seed_visit_initial_threshold: u32,
    /// Visit interval for subsequent seed spawns.
    pub flower_seed_visit_subsequent_threshold: u32,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            bee_nectar_capacity: 5,
            bee_energy_boost_per_nectar: 25,
            flower_lifespan: 100,
            flower_lifespan_visit_impact: 10,
            flower_visit_potency_ratio: 10,
            flower_seed_visit_initial_threshold: 10,
            flower_seed_visit_subsequent_threshold: 10,
        }
    }
}
