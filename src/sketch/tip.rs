use crate::config::SketchConfig;
use crate::direction::{Direction, Directions};
use crate::error::SketchError;
use crate::geometry::Point;

use super::types::polyline_path;
use super::{LineShape, LineType, Tip, TipStyle, TipType};

/// Marker at the end of the line, pointing into the target box.
pub fn end_marker(
    tip_type: TipType,
    line: &LineShape,
    directions: Directions,
    config: &SketchConfig,
) -> Result<Tip, SketchError> {
    ensure_rectilinear(line)?;
    let origin = line.end_point;
    // drawn pointing east, i.e. entering a west side
    let rotate = match directions.end {
        Direction::West => 0.0,
        Direction::North => 90.0,
        Direction::East => 180.0,
        Direction::South => 270.0,
    };
    Ok(build_tip(tip_type, origin, -1.0, rotate, config))
}

/// Marker at the start of the line, pointing back into the source box.
pub fn start_marker(
    tip_type: TipType,
    line: &LineShape,
    directions: Directions,
    config: &SketchConfig,
) -> Result<Tip, SketchError> {
    ensure_rectilinear(line)?;
    let origin = line.start_point;
    // drawn pointing west, i.e. leaving an east side
    let rotate = match directions.start {
        Direction::East => 0.0,
        Direction::South => 90.0,
        Direction::West => 180.0,
        Direction::North => 270.0,
    };
    Ok(build_tip(tip_type, origin, 1.0, rotate, config))
}

fn ensure_rectilinear(line: &LineShape) -> Result<(), SketchError> {
    if line.line_type != LineType::Rectilinear {
        return Err(SketchError::UnsupportedLine {
            line: line.line_type,
            element: "tip",
        });
    }
    Ok(())
}

/// `outward` is the x sign of the side the tail of the marker sits on.
fn build_tip(tip_type: TipType, origin: Point, outward: f32, rotate: f32, config: &SketchConfig) -> Tip {
    let half = config.tip_width / 2.0;
    let tail = origin.x + outward * config.tip_length;
    let (coordinates, style, closed) = match tip_type {
        TipType::Parent => (
            vec![
                Point::new(tail, origin.y - half),
                origin,
                Point::new(tail, origin.y + half),
            ],
            TipStyle::Hollow,
            true,
        ),
        TipType::Direction => (
            vec![
                Point::new(tail, origin.y - half),
                origin,
                Point::new(tail, origin.y + half),
            ],
            TipStyle::Filled,
            true,
        ),
        TipType::Association => (
            vec![
                Point::new(origin.x, origin.y - half),
                Point::new(tail, origin.y),
                Point::new(origin.x, origin.y + half),
            ],
            TipStyle::Open,
            false,
        ),
    };
    Tip {
        tip_type,
        path: polyline_path(&coordinates, closed),
        coordinates,
        rotate,
        transform_origin: origin,
        style,
    }
}
