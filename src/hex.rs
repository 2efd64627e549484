//! Hex grid geometry: headings, movement deltas, legal turns, footprints
//!
//! The board is an offset hex grid addressed by (x, y) with x as the column.
//! A heading's (dx, dy) step depends on the parity of the current column, so
//! movement must always consult the position it starts from.

use serde::{Deserialize, Serialize};

/// One of the six flight headings, named by compass direction.
///
/// The numeric value is the heading angle in degrees as it appears on the
/// wire: 0 is north (+y), positive angles turn clockwise toward east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum Heading {
    North = 0,
    NorthEast = 60,
    SouthEast = 120,
    South = 180,
    SouthWest = -120,
    NorthWest = -60,
}

/// All headings in clockwise order (each entry is +60 degrees from the last).
pub const HEADINGS: [Heading; 6] = [
    Heading::North,
    Heading::NorthEast,
    Heading::SouthEast,
    Heading::South,
    Heading::SouthWest,
    Heading::NorthWest,
];

impl Heading {
    /// Heading angle in degrees, in (-180, 180].
    pub fn degrees(self) -> i16 {
        self as i16
    }

    fn ring_index(self) -> usize {
        match self {
            Heading::North => 0,
            Heading::NorthEast => 1,
            Heading::SouthEast => 2,
            Heading::South => 3,
            Heading::SouthWest => 4,
            Heading::NorthWest => 5,
        }
    }

    /// Rotate 60 degrees clockwise.
    pub fn clockwise(self) -> Heading {
        HEADINGS[(self.ring_index() + 1) % 6]
    }

    /// Rotate 60 degrees counter-clockwise.
    pub fn counter_clockwise(self) -> Heading {
        HEADINGS[(self.ring_index() + 5) % 6]
    }

    /// The 180-degree flip, used for head-on collision detection.
    pub fn opposite(self) -> Heading {
        HEADINGS[(self.ring_index() + 3) % 6]
    }

    /// The two headings reachable by a single in-place rotation.
    pub fn legal_turns(self) -> [Heading; 2] {
        [self.clockwise(), self.counter_clockwise()]
    }

    /// Whether `target` is reachable from this heading in one rotation.
    pub fn can_turn_to(self, target: Heading) -> bool {
        self.legal_turns().contains(&target)
    }

    /// Movement delta for one step along this heading, starting from a
    /// column of the given parity. Diagonal steps shift y only in odd
    /// columns on the way up and only in even columns on the way down.
    pub fn delta(self, even_column: bool) -> (i32, i32) {
        match self {
            Heading::North => (0, 1),
            Heading::South => (0, -1),
            Heading::NorthEast => (1, if even_column { 0 } else { 1 }),
            Heading::SouthEast => (1, if even_column { -1 } else { 0 }),
            Heading::SouthWest => (-1, if even_column { -1 } else { 0 }),
            Heading::NorthWest => (-1, if even_column { 0 } else { 1 }),
        }
    }
}

impl From<Heading> for i16 {
    fn from(h: Heading) -> i16 {
        h.degrees()
    }
}

impl TryFrom<i16> for Heading {
    type Error = String;

    fn try_from(deg: i16) -> Result<Self, Self::Error> {
        match deg {
            0 => Ok(Heading::North),
            60 => Ok(Heading::NorthEast),
            120 => Ok(Heading::SouthEast),
            180 => Ok(Heading::South),
            -120 => Ok(Heading::SouthWest),
            -60 => Ok(Heading::NorthWest),
            other => Err(format!("invalid heading {other}")),
        }
    }
}

/// Column parity for the offset movement rule.
pub fn is_even_column(x: i32) -> bool {
    x.rem_euclid(2) == 0
}

/// One step from (x, y) along `heading`.
pub fn step(x: i32, y: i32, heading: Heading) -> (i32, i32) {
    let (dx, dy) = heading.delta(is_even_column(x));
    (x + dx, y + dy)
}

/// Tiles within Chebyshev distance `radius` of (x, y), clamped to the board.
pub fn footprint(
    x: i32,
    y: i32,
    radius: i32,
    width: i32,
    height: i32,
) -> impl Iterator<Item = (i32, i32)> {
    let x_range = (x - radius).max(0)..=(x + radius).min(width - 1);
    x_range.flat_map(move |fx| {
        let y_range = (y - radius).max(0)..=(y + radius).min(height - 1);
        y_range.map(move |fy| (fx, fy))
    })
}
