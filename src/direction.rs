use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SketchError;
use crate::geometry::{BoundingBox, Point};

/// Proximity, in canvas units, within which a point counts as lying on a box edge.
pub const DIRECTION_PADDING: f32 = 10.0;

/// Compass side of a box a line leaves from or arrives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Outward unit normal of the side (y grows downwards).
    pub fn normal(self) -> Point {
        match self {
            Direction::North => Point::new(0.0, -1.0),
            Direction::South => Point::new(0.0, 1.0),
            Direction::East => Point::new(1.0, 0.0),
            Direction::West => Point::new(-1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            _ => Err(SketchError::UnknownDirection(value.to_string())),
        }
    }
}

/// Sides a line leaves its source from and enters its target through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directions {
    pub start: Direction,
    pub end: Direction,
}

/// Classify both endpoints of a line against their boxes.
pub fn resolve_directions(
    start_point: Point,
    end_point: Point,
    source: &BoundingBox,
    target: &BoundingBox,
    padding: f32,
) -> Directions {
    Directions {
        start: resolve_direction(start_point, source, padding),
        end: resolve_direction(end_point, target, padding),
    }
}

/// East, west and south edges are probed in that order; the closest one within
/// `padding` wins and ties keep the earlier side. Anything else is north.
pub fn resolve_direction(point: Point, bounds: &BoundingBox, padding: f32) -> Direction {
    let probes = [
        (Direction::East, (point.x - bounds.right()).abs()),
        (Direction::West, (point.x - bounds.x).abs()),
        (Direction::South, (point.y - bounds.bottom()).abs()),
    ];

    let mut best: Option<(Direction, f32)> = None;
    for (direction, diff) in probes {
        if diff.is_nan() || diff > padding {
            continue;
        }
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((direction, diff)),
        }
    }

    best.map(|(direction, _)| direction).unwrap_or(Direction::North)
}
