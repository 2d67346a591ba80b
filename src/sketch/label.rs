use crate::config::SketchConfig;
use crate::direction::{Direction, Directions};
use crate::geometry::Point;

use super::{Label, LineShape, LineType, TextAnchor};

/// Place `text` next to the first point of a rectilinear line.
///
/// The offset keeps the text clear of the stroke: to the right of lines that
/// leave vertically or eastwards, and right-aligned to the left of lines that
/// leave westwards.
pub fn sketch_label(
    line: &LineShape,
    text: &str,
    directions: Directions,
    config: &SketchConfig,
) -> Option<Label> {
    if line.line_type != LineType::Rectilinear {
        return None;
    }
    let origin = *line.coordinates.first()?;
    if !origin.is_valid() {
        return None;
    }

    let offset = config.label_offset;
    let (delta, anchor) = match directions.start {
        Direction::South => (Point::new(offset, offset * 2.0), TextAnchor::Start),
        Direction::East => (Point::new(offset, -offset), TextAnchor::Start),
        Direction::North => (Point::new(offset, -offset), TextAnchor::Start),
        // End-anchored text runs leftwards, clear of a westward line.
        _ => (Point::new(-offset, -offset), TextAnchor::End),
    };
    let position = origin + delta;

    Some(Label {
        x: position.x,
        y: position.y,
        value: text.to_string(),
        anchor,
        transform_origin: position,
        rotate: 0.0,
    })
}
