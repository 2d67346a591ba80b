use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::geometry::{BoundingBox, Point};

/// Distance kept between the near-corner anchors and the corners themselves.
pub const ANCHOR_PADDING: f32 = 40.0;

/// Sides in the order candidates are enumerated. The closest-pair search keeps
/// the first minimum it sees, so this order is observable.
pub const SIDE_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::North,
    Direction::South,
];

const AVOID_EPSILON: f32 = 1e-3;

/// Chosen endpoints of a connector, one on each box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub start: Point,
    pub end: Point,
}

impl AnchorPair {
    pub fn distance(&self) -> f32 {
        Point::distance(self.start, self.end)
    }
}

/// Near-start, middle and near-end anchors of one side.
///
/// The corner offset is capped at half the side length, so on small boxes the
/// near-corner anchors collapse onto the middle one. Returns `None` for boxes
/// that have no drawable perimeter.
pub fn anchors_for_side(bounds: &BoundingBox, side: Direction, padding: f32) -> Option<[Point; 3]> {
    if !bounds.is_valid() {
        return None;
    }
    let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };
    let center = bounds.center();
    let anchors = match side {
        Direction::East | Direction::West => {
            let x = if side == Direction::East {
                bounds.right()
            } else {
                bounds.x
            };
            let offset = padding.min(bounds.height / 2.0);
            [
                Point::new(x, bounds.y + offset),
                Point::new(x, center.y),
                Point::new(x, bounds.bottom() - offset),
            ]
        }
        Direction::North | Direction::South => {
            let y = if side == Direction::South {
                bounds.bottom()
            } else {
                bounds.y
            };
            let offset = padding.min(bounds.width / 2.0);
            [
                Point::new(bounds.x + offset, y),
                Point::new(center.x, y),
                Point::new(bounds.right() - offset, y),
            ]
        }
    };
    Some(anchors)
}

/// All twelve candidate anchors of a box in [`SIDE_ORDER`]; empty for degenerate boxes.
pub fn anchors(bounds: &BoundingBox, padding: f32) -> Vec<Point> {
    SIDE_ORDER
        .iter()
        .filter_map(|side| anchors_for_side(bounds, *side, padding))
        .flatten()
        .collect()
}

/// Brute-force search for the closest anchor pair between two boxes.
///
/// Candidates listed in `avoid_a` / `avoid_b` (endpoints already taken by
/// other connectors) are skipped. When that leaves nothing, the search runs
/// again without exclusions. Ties keep the first pair in enumeration order.
pub fn closest_anchor_pair(
    a: &BoundingBox,
    b: &BoundingBox,
    padding: f32,
    avoid_a: &[Point],
    avoid_b: &[Point],
) -> Option<AnchorPair> {
    let from = anchors(a, padding);
    let to = anchors(b, padding);
    if from.is_empty() || to.is_empty() {
        return None;
    }

    search_closest(&from, &to, avoid_a, avoid_b).or_else(|| {
        tracing::trace!("every anchor candidate avoided; retrying without exclusions");
        search_closest(&from, &to, &[], &[])
    })
}

/// Endpoints for a connector whose source and target are the same box:
/// leave through the upper east anchor and come back through the right-hand
/// north anchor, so the route loops around the top-right corner.
pub fn self_anchor_pair(bounds: &BoundingBox, padding: f32) -> Option<AnchorPair> {
    let east = anchors_for_side(bounds, Direction::East, padding)?;
    let north = anchors_for_side(bounds, Direction::North, padding)?;
    Some(AnchorPair {
        start: east[0],
        end: north[2],
    })
}

fn search_closest(
    from: &[Point],
    to: &[Point],
    avoid_from: &[Point],
    avoid_to: &[Point],
) -> Option<AnchorPair> {
    let mut best: Option<(AnchorPair, f32)> = None;
    for start in from {
        if is_avoided(*start, avoid_from) {
            continue;
        }
        for end in to {
            if is_avoided(*end, avoid_to) {
                continue;
            }
            let distance = Point::distance(*start, *end);
            if distance.is_nan() {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, best_distance)) => distance < *best_distance,
            };
            if better {
                best = Some((
                    AnchorPair {
                        start: *start,
                        end: *end,
                    },
                    distance,
                ));
            }
        }
    }
    best.map(|(pair, _)| pair)
}

fn is_avoided(candidate: Point, avoid: &[Point]) -> bool {
    avoid.iter().any(|taken| {
        (taken.x - candidate.x).abs() < AVOID_EPSILON && (taken.y - candidate.y).abs() < AVOID_EPSILON
    })
}
