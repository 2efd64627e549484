//! Board snapshot and the single-tick simulation
//!
//! `Board` is a lightweight twin of the host engine's board, used only for
//! lookahead. It owns its unit map outright; branching clones the whole
//! snapshot, which makes in-place mutation during a tick sound.
//!
//! The twin simplifies on purpose: units leaving the board are dropped
//! instead of handed to a neighbouring board, and seed creation is deferred
//! to a pending counter rather than modeled.

use crate::hex::{is_even_column, Heading};
use crate::params::GameParams;
use crate::volant::{Volant, VolantId};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use thiserror::Error;

// ============================================================================
// BOARD OBJECTS
// ============================================================================

/// A hive on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hive {
    pub x: i32,
    pub y: i32,
    pub nectar: i64,
}

impl Hive {
    pub fn new(x: i32, y: i32, nectar: i64) -> Self {
        Self { x, y, nectar }
    }
}

/// Flower subtype tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowerKind {
    /// Feeds visiting bees.
    Flower,
    /// Drains energy instead of yielding nectar.
    VenusBeeTrap,
}

/// A flower on the board. Expiry is always defined; a snapshot source that
/// cannot provide one is rejected at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flower {
    pub x: i32,
    pub y: i32,
    pub kind: FlowerKind,
    pub potency: i32,
    pub visits: u32,
    pub expires: u32,
}

impl Flower {
    pub fn new(x: i32, y: i32, expires: u32) -> Self {
        Self { x, y, kind: FlowerKind::Flower, potency: 1, visits: 0, expires }
    }

    /// Record a bee visit: count it, extend the flower's life, and rescale
    /// potency. Returns true when this visit spawns a seed.
    pub fn visit(&mut self, params: &GameParams) -> bool {
        self.visits += 1;
        self.expires += params.flower_lifespan_visit_impact;
        self.potency = (self.visits / params.flower_visit_potency_ratio + 1).min(3) as i32;

        self.visits >= params.flower_seed_visit_initial_threshold
            && self.visits % params.flower_seed_visit_subsequent_threshold == 0
    }
}

// ============================================================================
// COMMANDS AND ERRORS
// ============================================================================

/// One instruction for a single volant. "Do nothing" is expressed as the
/// absence of a command (`None` at the call sites).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Rotate in place to an adjacent heading.
    Turn { entity: VolantId, heading: Heading },
    /// Queen bee converts her tile into a new hive and is consumed.
    CreateHive { entity: VolantId },
    /// Seed converts its tile into a new flower and is consumed.
    Flower { entity: VolantId },
}

impl Command {
    pub fn entity(&self) -> &VolantId {
        match self {
            Command::Turn { entity, .. }
            | Command::CreateHive { entity }
            | Command::Flower { entity } => entity,
        }
    }
}

/// Why a simulated tick was rejected. The search treats these as per-branch
/// rejections, not faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(VolantId),
    #[error("cannot rotate from heading {from}\u{b0} to {to}\u{b0}")]
    IllegalHeading { from: i16, to: i16 },
    #[error("cannot create hive for volant '{0}'")]
    IllegalHiveCreation(VolantId),
    #[error("cannot grow flower for volant '{0}'")]
    IllegalFlowerCreation(VolantId),
}

// ============================================================================
// BOARD SNAPSHOT
// ============================================================================

/// One board snapshot. Clone to branch; every clone exclusively owns its
/// unit map, so no volant is ever aliased across snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub hives: Vec<Hive>,
    pub flowers: Vec<Flower>,
    pub inflight: FxHashMap<VolantId, Volant>,
    /// Bees lost this game, accumulated across ticks.
    pub dead_bees: u32,
    /// Seeds owed to the board; actual creation is the host's job.
    pub seeds_to_gen: u32,
    /// Turn this snapshot is about to play.
    pub turn: u32,
}

impl Board {
    pub fn new(width: i32, height: i32, turn: u32) -> Self {
        Self {
            width,
            height,
            hives: Vec::new(),
            flowers: Vec::new(),
            inflight: FxHashMap::default(),
            dead_bees: 0,
            seeds_to_gen: 0,
            turn,
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn hive_at(&self, x: i32, y: i32) -> Option<&Hive> {
        self.hives.iter().find(|h| h.x == x && h.y == y)
    }

    pub fn flower_at(&self, x: i32, y: i32) -> Option<&Flower> {
        self.flowers.iter().find(|f| f.x == x && f.y == y)
    }

    /// Advance this snapshot by exactly one tick under `cmd`. Sub-steps run
    /// in a fixed order; any command validation failure rejects the whole
    /// tick and leaves the snapshot in a partially-advanced state the
    /// caller must discard.
    pub fn advance(&mut self, cmd: Option<&Command>, params: &GameParams) -> Result<(), SimError> {
        self.apply_command(cmd, params)?;
        self.expire_flowers();
        self.move_volants(params);
        self.remove_departed();
        self.visit_flowers(params);
        self.land_bees();
        self.resolve_crashes();
        self.turn += 1;
        Ok(())
    }

    // ========================================================================
    // TICK SUB-STEPS
    // ========================================================================

    fn apply_command(&mut self, cmd: Option<&Command>, params: &GameParams) -> Result<(), SimError> {
        let cmd = match cmd {
            Some(c) => c,
            None => return Ok(()),
        };

        let volant = self
            .inflight
            .get(cmd.entity())
            .ok_or_else(|| SimError::UnknownEntity(cmd.entity().clone()))?;

        match cmd {
            Command::Flower { entity } => {
                let (x, y) = match volant {
                    Volant::Seed(s) => (s.x, s.y),
                    _ => return Err(SimError::IllegalFlowerCreation(entity.clone())),
                };
                self.hives.retain(|h| (h.x, h.y) != (x, y));
                self.flowers.retain(|f| (f.x, f.y) != (x, y));
                self.flowers.push(Flower::new(x, y, self.turn + params.flower_lifespan));
                self.inflight.remove(entity);
            }
            Command::CreateHive { entity } => {
                let queen = match volant {
                    Volant::QueenBee(b) => b.clone(),
                    _ => return Err(SimError::IllegalHiveCreation(entity.clone())),
                };
                self.flowers.retain(|f| (f.x, f.y) != (queen.x, queen.y));
                self.hives.retain(|h| (h.x, h.y) != (queen.x, queen.y));
                self.hives.push(Hive::new(queen.x, queen.y, queen.nectar as i64));
                self.inflight.remove(entity);
            }
            Command::Turn { entity, heading } => {
                let current = volant.heading();
                if !current.can_turn_to(*heading) {
                    return Err(SimError::IllegalHeading {
                        from: current.degrees(),
                        to: heading.degrees(),
                    });
                }
                // Heading is the only thing a rotation touches.
                if let Some(v) = self.inflight.get_mut(entity) {
                    v.set_heading(*heading);
                }
            }
        }
        Ok(())
    }

    fn expire_flowers(&mut self) {
        if self.flowers.is_empty() {
            return;
        }
        let turn = self.turn;
        let survivors: Vec<Flower> =
            self.flowers.iter().filter(|f| f.expires > turn).cloned().collect();

        if survivors.is_empty() {
            // The board never goes flowerless once flowers have existed.
            // Deterministic survivor: lowest (x, y).
            let keep = self
                .flowers
                .iter()
                .min_by_key(|f| (f.x, f.y))
                .cloned()
                .into_iter()
                .collect();
            self.flowers = keep;
        } else {
            self.flowers = survivors;
        }
    }

    fn move_volants(&mut self, params: &GameParams) {
        for volant in self.inflight.values_mut() {
            volant.advance(params);
        }
    }

    fn remove_departed(&mut self) {
        let width = self.width;
        let height = self.height;
        self.inflight.retain(|_, v| {
            let (x, y) = v.position();
            x >= 0 && x < width && y >= 0 && y < height
        });
    }

    fn visit_flowers(&mut self, params: &GameParams) {
        let flower_tiles: FxHashMap<(i32, i32), usize> = self
            .flowers
            .iter()
            .enumerate()
            .map(|(i, f)| ((f.x, f.y), i))
            .collect();

        let visitors: Vec<(VolantId, usize)> = self
            .inflight
            .iter()
            .filter(|(_, v)| v.is_bee_kind())
            .filter_map(|(id, v)| flower_tiles.get(&v.position()).map(|&i| (id.clone(), i)))
            .collect();

        for (bee_id, flower_idx) in visitors {
            let flower = &mut self.flowers[flower_idx];
            if let Some(bee) = self.inflight.get_mut(&bee_id).and_then(|v| v.as_bee_mut()) {
                match flower.kind {
                    FlowerKind::Flower => bee.drink(flower.potency, params),
                    FlowerKind::VenusBeeTrap => {
                        bee.energy -= params.bee_energy_boost_per_nectar * flower.potency;
                    }
                }
            }
            if flower.visit(params) {
                self.seeds_to_gen += 1;
            }
        }
    }

    fn land_bees(&mut self) {
        let hive_tiles: FxHashMap<(i32, i32), usize> = self
            .hives
            .iter()
            .enumerate()
            .map(|(i, h)| ((h.x, h.y), i))
            .collect();

        let landed: Vec<(VolantId, usize)> = self
            .inflight
            .iter()
            .filter(|(_, v)| v.is_bee_kind())
            .filter_map(|(id, v)| hive_tiles.get(&v.position()).map(|&i| (id.clone(), i)))
            .collect();

        for (bee_id, hive_idx) in landed {
            match self.inflight.remove(&bee_id) {
                Some(Volant::QueenBee(_)) => {
                    // A queen touching down on a hive is always lost.
                    self.dead_bees += 1;
                }
                Some(Volant::Bee(bee)) => {
                    self.hives[hive_idx].nectar += bee.nectar as i64;
                }
                _ => {}
            }
        }
    }

    fn resolve_crashes(&mut self) {
        let mut bee_occupied: FxHashMap<(i32, i32), Vec<VolantId>> = FxHashMap::default();
        let mut seed_occupied: FxHashMap<(i32, i32), Vec<VolantId>> = FxHashMap::default();
        // (position, heading) a head-on partner would be showing this tick.
        let mut opposing_states: FxHashSet<(i32, i32, Heading)> = FxHashSet::default();

        for (id, volant) in &self.inflight {
            let (x, y) = volant.position();
            if volant.is_bee_kind() {
                bee_occupied.entry((x, y)).or_default().push(id.clone());
                let reverse = volant.heading().opposite();
                let (dx, dy) = reverse.delta(is_even_column(x));
                opposing_states.insert((x + dx, y + dy, reverse));
            } else {
                seed_occupied.entry((x, y)).or_default().push(id.clone());
            }
        }

        let collided: FxHashSet<VolantId> = bee_occupied
            .values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .cloned()
            .collect();

        let exhausted: FxHashSet<VolantId> = self
            .inflight
            .iter()
            .filter(|(id, v)| {
                v.as_bee().is_some_and(|b| b.energy < 0) && !collided.contains(*id)
            })
            .map(|(id, _)| id.clone())
            .collect();

        let headon: FxHashSet<VolantId> = self
            .inflight
            .iter()
            .filter(|(id, v)| {
                if !v.is_bee_kind() || collided.contains(*id) || exhausted.contains(*id) {
                    return false;
                }
                let (x, y) = v.position();
                opposing_states.contains(&(x, y, v.heading()))
            })
            .map(|(id, _)| id.clone())
            .collect();

        let seeds_collided: Vec<VolantId> = seed_occupied
            .values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .cloned()
            .collect();

        self.dead_bees += (collided.len() + exhausted.len() + headon.len()) as u32;

        for id in collided.iter().chain(&exhausted).chain(&headon).chain(&seeds_collided) {
            self.inflight.remove(id);
        }
    }

    // ========================================================================
    // CANONICAL KEY
    // ========================================================================

    /// Order-independent key over the snapshot's tile contents, for
    /// transposition lookups. Two boards that differ only in unit
    /// enumeration order produce the same key.
    pub fn canonical_key(&self) -> u64 {
        fn part<T: Hash>(value: T) -> u64 {
            let mut h = FxHasher::default();
            value.hash(&mut h);
            h.finish()
        }

        let mut parts: Vec<u64> =
            Vec::with_capacity(self.hives.len() + self.flowers.len() + self.inflight.len());

        for h in &self.hives {
            parts.push(part((b'h', h.x, h.y, h.nectar)));
        }
        for f in &self.flowers {
            parts.push(part((b'f', f.x, f.y, f.visits)));
        }
        for v in self.inflight.values() {
            match v {
                Volant::Bee(b) => {
                    parts.push(part((b'b', b.x, b.y, b.heading.degrees(), b.energy, b.nectar)))
                }
                Volant::QueenBee(b) => {
                    parts.push(part((b'q', b.x, b.y, b.heading.degrees(), b.energy, b.nectar)))
                }
                Volant::Seed(s) => parts.push(part((b's', s.x, s.y, s.heading.degrees()))),
            }
        }
        parts.sort_unstable();

        let mut hasher = FxHasher::default();
        parts.hash(&mut hasher);
        self.dead_bees.hash(&mut hasher);
        self.seeds_to_gen.hash(&mut hasher);
        self.turn.hash(&mut hasher);
        hasher.finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
