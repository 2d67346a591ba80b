use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SketchError;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Linear,
    #[default]
    Rectilinear,
}

impl LineType {
    pub fn as_str(self) -> &'static str {
        match self {
            LineType::Linear => "linear",
            LineType::Rectilinear => "rectilinear",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" | "straight" => Ok(LineType::Linear),
            "rectilinear" | "orthogonal" => Ok(LineType::Rectilinear),
            _ => Err(SketchError::UnknownLineType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipType {
    /// Hollow triangle pointing at a supertype.
    Parent,
    /// Solid arrowhead showing navigation direction.
    Direction,
    /// Crow's foot spreading onto the box.
    Association,
}

impl TipType {
    pub fn as_str(self) -> &'static str {
        match self {
            TipType::Parent => "parent",
            TipType::Direction => "direction",
            TipType::Association => "association",
        }
    }
}

impl fmt::Display for TipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipType {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" => Ok(TipType::Parent),
            "direction" => Ok(TipType::Direction),
            "association" => Ok(TipType::Association),
            _ => Err(SketchError::UnknownTipType(value.to_string())),
        }
    }
}

/// Drawable connector path.
///
/// `coordinates` always starts at `start_point` and ends at `end_point`; for
/// rectilinear lines every segment is horizontal or vertical and the bends
/// in between are repeated in `control_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    #[serde(rename = "type")]
    pub line_type: LineType,
    pub start_point: Point,
    pub end_point: Point,
    pub coordinates: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_points: Vec<Point>,
}

impl LineShape {
    pub fn bends(&self) -> usize {
        self.control_points.len()
    }

    pub fn length(&self) -> f32 {
        self.coordinates
            .windows(2)
            .map(|pair| Point::distance(pair[0], pair[1]))
            .sum()
    }

    /// SVG path data for the polyline.
    pub fn path(&self) -> String {
        polyline_path(&self.coordinates, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipStyle {
    Hollow,
    Filled,
    Open,
}

/// Marker at one end of a line. `coordinates` are unrotated; renderers apply
/// `rotate` degrees around `transform_origin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "type")]
    pub tip_type: TipType,
    pub coordinates: Vec<Point>,
    pub path: String,
    pub rotate: f32,
    pub transform_origin: Point,
    pub style: TipStyle,
}

impl Tip {
    /// Vertices with the rotation applied, for hosts that cannot transform.
    pub fn placed_coordinates(&self) -> Vec<Point> {
        let radians = self.rotate.to_radians();
        let (sin, cos) = radians.sin_cos();
        let origin = self.transform_origin;
        self.coordinates
            .iter()
            .map(|point| {
                let rel = *point - origin;
                let rotated = Point::new(rel.x * cos - rel.y * sin, rel.x * sin + rel.y * cos);
                Point::new(round_px(rotated.x + origin.x), round_px(rotated.y + origin.y))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tips {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Tip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Tip>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub value: String,
    pub anchor: TextAnchor,
    pub transform_origin: Point,
    pub rotate: f32,
}

/// Everything drawn for one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub line: LineShape,
    #[serde(default)]
    pub tips: Tips,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

pub(crate) fn polyline_path(points: &[Point], closed: bool) -> String {
    let mut path = String::new();
    for (idx, point) in points.iter().enumerate() {
        if idx > 0 {
            path.push(' ');
        }
        let command = if idx == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{command} {} {}", point.x, point.y));
    }
    if closed && !points.is_empty() {
        path.push_str(" Z");
    }
    path
}

// Rotations by multiples of 90 degrees leave float noise like 1e-6.
fn round_px(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_names() {
        assert_eq!("Rectilinear".parse::<LineType>().unwrap(), LineType::Rectilinear);
        assert_eq!("parent".parse::<TipType>().unwrap(), TipType::Parent);
        assert_eq!(
            "diamond".parse::<TipType>(),
            Err(SketchError::UnknownTipType("diamond".to_string()))
        );
        assert!("curved".parse::<LineType>().is_err());
    }

    #[test]
    fn path_data_for_open_and_closed_polylines() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.5)];
        assert_eq!(polyline_path(&points, false), "M 0 0 L 10 0 L 10 5.5");
        assert_eq!(polyline_path(&points, true), "M 0 0 L 10 0 L 10 5.5 Z");
    }

    #[test]
    fn line_shape_serializes_with_type_key() {
        let line = LineShape {
            line_type: LineType::Linear,
            start_point: Point::new(0.0, 0.0),
            end_point: Point::new(5.0, 0.0),
            coordinates: vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)],
            control_points: Vec::new(),
        };
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["type"], "linear");
        assert!(value.get("startPoint").is_some());
        assert!(value.get("controlPoints").is_none());
    }
}
