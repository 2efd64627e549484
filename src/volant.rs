//! Flying units: bees, queen bees, and seeds
//!
//! A volant is anything in flight. The three kinds share position and
//! heading; bee kinds add energy and carried nectar. A queen is a bee with
//! one extra capability (converting her tile into a hive), so both bee
//! variants wrap the same struct and behavior dispatches on the enum tag.

use crate::hex::{step, Heading};
use crate::params::GameParams;
use serde::{Deserialize, Serialize};

/// Identifier the host assigns to each in-flight unit.
pub type VolantId = String;

/// A bee in flight. Negative energy means the bee is dead and will be
/// removed at the next collision-resolution pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bee {
    pub x: i32,
    pub y: i32,
    pub heading: Heading,
    pub energy: i32,
    pub nectar: i32,
}

impl Bee {
    /// Drink from a flower of the given potency. Nectar is capped at
    /// capacity but the energy boost applies to the full potency.
    pub fn drink(&mut self, potency: i32, params: &GameParams) {
        self.nectar = (self.nectar + potency).min(params.bee_nectar_capacity);
        self.energy += params.bee_energy_boost_per_nectar * potency;
    }
}

/// A seed in flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub x: i32,
    pub y: i32,
    pub heading: Heading,
}

/// Any flying unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volant {
    Bee(Bee),
    QueenBee(Bee),
    Seed(Seed),
}

impl Volant {
    pub fn position(&self) -> (i32, i32) {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => (b.x, b.y),
            Volant::Seed(s) => (s.x, s.y),
        }
    }

    pub fn heading(&self) -> Heading {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => b.heading,
            Volant::Seed(s) => s.heading,
        }
    }

    pub fn set_heading(&mut self, heading: Heading) {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => b.heading = heading,
            Volant::Seed(s) => s.heading = heading,
        }
    }

    /// Bee or queen bee, the kinds that drink, land, and collide as bees.
    pub fn is_bee_kind(&self) -> bool {
        matches!(self, Volant::Bee(_) | Volant::QueenBee(_))
    }

    pub fn as_bee(&self) -> Option<&Bee> {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => Some(b),
            Volant::Seed(_) => None,
        }
    }

    pub fn as_bee_mut(&mut self) -> Option<&mut Bee> {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => Some(b),
            Volant::Seed(_) => None,
        }
    }

    /// Advance one hex along the current heading. Bee kinds burn 1 energy,
    /// or 2 once they are carrying a full load of nectar.
    pub fn advance(&mut self, params: &GameParams) {
        match self {
            Volant::Bee(b) | Volant::QueenBee(b) => {
                let (nx, ny) = step(b.x, b.y, b.heading);
                b.x = nx;
                b.y = ny;
                b.energy -= if b.nectar >= params.bee_nectar_capacity { 2 } else { 1 };
            }
            Volant::Seed(s) => {
                let (nx, ny) = step(s.x, s.y, s.heading);
                s.x = nx;
                s.y = ny;
            }
        }
    }
}
