//! Host-facing surface: turn snapshots, wire encoding, and the agent
//!
//! The host engine hands over one snapshot per turn and expects a command
//! (or null) back within the time budget. Unit and flower descriptors are
//! positional JSON arrays; a bee descriptor carries an opaque
//! game-parameter slot the agent ignores and re-emits as null.

use crate::board::{Board, Command, Flower, FlowerKind, Hive};
use crate::hex::Heading;
use crate::params::GameParams;
use crate::score::ScoreParams;
use crate::search::{best_command, SearchConfig};
use crate::volant::{Bee, Seed, Volant, VolantId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Why a host snapshot could not be turned into a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Construction bug upstream; a flower must always know when it dies.
    #[error("flower at ({x}, {y}) has undefined expiry")]
    MissingFlowerExpiry { x: i32, y: i32 },
    #[error("unknown flower kind '{0}'")]
    UnknownFlowerKind(String),
    #[error("unknown volant kind '{0}'")]
    UnknownVolantKind(String),
    #[error("malformed descriptor for volant '{0}'")]
    MalformedVolant(VolantId),
    #[error("invalid heading value {0}")]
    InvalidHeading(i64),
}

/// Positional flower descriptor: x, y, reserved, potency, visits, expiry,
/// kind tag.
pub type FlowerWire = (i32, i32, Option<Value>, i32, u32, Option<u32>, String);

/// One turn's inputs as the host serializes them. Historical fields the
/// search does not consume are kept for completeness.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSnapshot {
    pub board_width: i32,
    pub board_height: i32,
    pub hives: Vec<(i32, i32, i64)>,
    pub flowers: Vec<FlowerWire>,
    pub inflight: HashMap<VolantId, Vec<Value>>,
    #[serde(default)]
    pub crashed: Value,
    #[serde(default)]
    pub lost_volants: Value,
    #[serde(default)]
    pub received_volants: Value,
    #[serde(default)]
    pub landed: Value,
    #[serde(default)]
    pub scores: Value,
    #[serde(default)]
    pub player_id: i64,
    #[serde(default)]
    pub game_id: Option<String>,
    pub turn_num: u32,
}

impl TurnSnapshot {
    /// Decode into a simulation board. Fails on malformed descriptors and
    /// on the undefined-expiry invariant violation.
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        let mut board = Board::new(self.board_width, self.board_height, self.turn_num);

        for &(x, y, nectar) in &self.hives {
            board.hives.push(Hive::new(x, y, nectar));
        }
        for wire in &self.flowers {
            board.flowers.push(flower_from_wire(wire)?);
        }
        for (id, descriptor) in &self.inflight {
            board.inflight.insert(id.clone(), volant_from_wire(id, descriptor)?);
        }
        Ok(board)
    }
}

// ============================================================================
// WIRE CODECS
// ============================================================================

fn flower_from_wire(wire: &FlowerWire) -> Result<Flower, SnapshotError> {
    let &(x, y, _, potency, visits, expires, ref kind) = wire;
    let expires = expires.ok_or(SnapshotError::MissingFlowerExpiry { x, y })?;
    let kind = match kind.as_str() {
        "Flower" => FlowerKind::Flower,
        "VenusBeeTrap" => FlowerKind::VenusBeeTrap,
        other => return Err(SnapshotError::UnknownFlowerKind(other.to_string())),
    };
    Ok(Flower { x, y, kind, potency, visits, expires })
}

pub fn flower_to_wire(flower: &Flower) -> Value {
    let kind = match flower.kind {
        FlowerKind::Flower => "Flower",
        FlowerKind::VenusBeeTrap => "VenusBeeTrap",
    };
    json!([flower.x, flower.y, null, flower.potency, flower.visits, flower.expires, kind])
}

fn volant_from_wire(id: &VolantId, descriptor: &[Value]) -> Result<Volant, SnapshotError> {
    let field = |i: usize| -> Result<i64, SnapshotError> {
        descriptor
            .get(i)
            .and_then(Value::as_i64)
            .ok_or_else(|| SnapshotError::MalformedVolant(id.clone()))
    };
    let kind = descriptor
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| SnapshotError::MalformedVolant(id.clone()))?;

    let x = field(1)? as i32;
    let y = field(2)? as i32;
    let heading_deg = field(3)?;
    let heading = Heading::try_from(heading_deg as i16)
        .map_err(|_| SnapshotError::InvalidHeading(heading_deg))?;

    match kind {
        "Seed" => Ok(Volant::Seed(Seed { x, y, heading })),
        "Bee" | "QueenBee" => {
            // Slot 5 is the host's shared game-parameter reference; skipped.
            let bee = Bee { x, y, heading, energy: field(4)? as i32, nectar: field(6)? as i32 };
            Ok(if kind == "Bee" { Volant::Bee(bee) } else { Volant::QueenBee(bee) })
        }
        other => Err(SnapshotError::UnknownVolantKind(other.to_string())),
    }
}

pub fn volant_to_wire(volant: &Volant) -> Value {
    match volant {
        Volant::Bee(b) => {
            json!(["Bee", b.x, b.y, b.heading.degrees(), b.energy, null, b.nectar])
        }
        Volant::QueenBee(b) => {
            json!(["QueenBee", b.x, b.y, b.heading.degrees(), b.energy, null, b.nectar])
        }
        Volant::Seed(s) => json!(["Seed", s.x, s.y, s.heading.degrees()]),
    }
}

/// Serialize a board in the host's snapshot shape.
pub fn board_to_wire(board: &Board) -> Value {
    json!({
        "boardWidth": board.width,
        "boardHeight": board.height,
        "hives": board.hives.iter().map(|h| json!([h.x, h.y, h.nectar])).collect::<Vec<_>>(),
        "flowers": board.flowers.iter().map(flower_to_wire).collect::<Vec<_>>(),
        "inflight": board
            .inflight
            .iter()
            .map(|(id, v)| (id.clone(), volant_to_wire(v)))
            .collect::<serde_json::Map<_, _>>(),
        "deadBees": board.dead_bees,
        "seedsToGen": board.seeds_to_gen,
        "turnNum": board.turn,
    })
}

/// Serialize the decision for the host: null means "no command".
pub fn command_to_wire(cmd: Option<&Command>) -> Value {
    match cmd {
        None => Value::Null,
        Some(Command::Turn { entity, heading }) => {
            json!({ "entity": entity, "command": heading.degrees() })
        }
        Some(Command::CreateHive { entity }) => {
            json!({ "entity": entity, "command": "create_hive" })
        }
        Some(Command::Flower { entity }) => {
            json!({ "entity": entity, "command": "flower" })
        }
    }
}

// ============================================================================
// AGENT
// ============================================================================

/// The per-turn decision function plus lifecycle hooks. Stateless between
/// turns; every invocation builds its own search context and discards it.
#[derive(Clone, Debug, Default)]
pub struct Agent {
    params: GameParams,
    score_params: ScoreParams,
    config: SearchConfig,
}

impl Agent {
    pub fn new(params: GameParams, score_params: ScoreParams, config: SearchConfig) -> Self {
        Self { params, score_params, config }
    }

    /// Decide this turn's command.
    pub fn decide(&self, snapshot: &TurnSnapshot) -> Result<Option<Command>, SnapshotError> {
        let board = snapshot.to_board()?;
        debug!(
            turn = board.turn,
            inflight = board.inflight.len(),
            hives = board.hives.len(),
            "turn received"
        );
        Ok(best_command(&board, &self.params, &self.score_params, &self.config))
    }

    /// Start-of-game notification. Reserved for stateful strategies.
    pub fn on_game_start(&mut self, _snapshot: &TurnSnapshot) {}

    /// End-of-game notification. Reserved for stateful strategies.
    pub fn on_game_over(&mut self, _snapshot: &TurnSnapshot) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_json() -> Value {
        json!({
            "boardWidth": 8,
            "boardHeight": 8,
            "hives": [[2, 2, 0]],
            "flowers": [[3, 3, null, 1, 0, 50, "Flower"]],
            "inflight": {
                "bee-1": ["Bee", 2, 3, 0, 10, null, 0]
            },
            "turnNum": 10
        })
    }

    #[test]
    fn test_snapshot_decodes() {
        let snapshot: TurnSnapshot = serde_json::from_value(snapshot_json()).unwrap();
        let board = snapshot.to_board().unwrap();
        assert_eq!(board.turn, 10);
        assert_eq!(board.hives.len(), 1);
        assert_eq!(board.flower_at(3, 3).unwrap().expires, 50);
        let bee = board.inflight["bee-1"].as_bee().unwrap();
        assert_eq!((bee.x, bee.y, bee.energy), (2, 3, 10));
        assert_eq!(bee.heading, Heading::North);
    }

    #[test]
    fn test_missing_expiry_is_fatal() {
        let mut raw = snapshot_json();
        raw["flowers"][0][5] = Value::Null;
        let snapshot: TurnSnapshot = serde_json::from_value(raw).unwrap();
        assert_eq!(
            snapshot.to_board().unwrap_err(),
            SnapshotError::MissingFlowerExpiry { x: 3, y: 3 }
        );
    }

    #[test]
    fn test_unknown_volant_kind_rejected() {
        let mut raw = snapshot_json();
        raw["inflight"]["bee-1"][0] = json!("Wasp");
        let snapshot: TurnSnapshot = serde_json::from_value(raw).unwrap();
        assert_eq!(
            snapshot.to_board().unwrap_err(),
            SnapshotError::UnknownVolantKind("Wasp".to_string())
        );
    }

    #[test]
    fn test_volant_wire_round_trip() {
        let queen = Volant::QueenBee(Bee {
            x: 4,
            y: 5,
            heading: Heading::SouthWest,
            energy: 7,
            nectar: 2,
        });
        let wire = volant_to_wire(&queen);
        let decoded = volant_from_wire(&"q".to_string(), wire.as_array().unwrap()).unwrap();
        assert_eq!(decoded, queen);

        let seed = Volant::Seed(Seed { x: 1, y: 0, heading: Heading::NorthWest });
        let wire = volant_to_wire(&seed);
        let decoded = volant_from_wire(&"s".to_string(), wire.as_array().unwrap()).unwrap();
        assert_eq!(decoded, seed);
    }

    #[test]
    fn test_board_wire_shape() {
        let snapshot: TurnSnapshot = serde_json::from_value(snapshot_json()).unwrap();
        let board = snapshot.to_board().unwrap();
        let wire = board_to_wire(&board);
        assert_eq!(wire["boardWidth"], 8);
        assert_eq!(wire["deadBees"], 0);
        assert_eq!(wire["inflight"]["bee-1"][0], "Bee");
        assert_eq!(wire["flowers"][0][6], "Flower");
    }

    #[test]
    fn test_command_wire() {
        assert_eq!(command_to_wire(None), Value::Null);
        let turn = Command::Turn { entity: "bee-1".into(), heading: Heading::SouthWest };
        assert_eq!(
            command_to_wire(Some(&turn)),
            json!({ "entity": "bee-1", "command": -120 })
        );
        let hive = Command::CreateHive { entity: "q".into() };
        assert_eq!(
            command_to_wire(Some(&hive)),
            json!({ "entity": "q", "command": "create_hive" })
        );
    }

    #[test]
    fn test_agent_decides_toward_flower() {
        let snapshot: TurnSnapshot = serde_json::from_value(snapshot_json()).unwrap();
        let agent = Agent::default();
        let cmd = agent.decide(&snapshot).unwrap();
        // The only profitable single move steps onto the flower.
        assert_eq!(
            cmd,
            Some(Command::Turn { entity: "bee-1".into(), heading: Heading::NorthEast })
        );
    }
}
