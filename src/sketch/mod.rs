mod label;
mod line;
mod tip;
mod types;

pub use label::sketch_label;
pub use line::{LineRequest, route_rectilinear, sketch_line};
pub use tip::{end_marker, start_marker};
pub use types::*;

use serde::{Deserialize, Serialize};

use crate::anchor::{closest_anchor_pair, self_anchor_pair};
use crate::config::SketchConfig;
use crate::direction::{Directions, resolve_directions};
use crate::error::SketchError;
use crate::geometry::{BoundingBox, Point};

const PERIMETER_TOLERANCE: f32 = 1e-3;

/// Marker kinds requested at either end of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTips {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TipType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TipType>,
}

/// One edge to sketch between two placed boxes.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRequest<'a> {
    pub line_type: LineType,
    pub source: &'a BoundingBox,
    pub target: &'a BoundingBox,
    /// Source and target are the same node.
    pub self_loop: bool,
    /// Lines already drawn on the canvas; their endpoints are avoided when
    /// picking anchors.
    pub others: &'a [&'a LineShape],
    pub tips: EdgeTips,
    pub label: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSketch {
    pub shape: Shape,
    pub directions: Directions,
}

/// Runs the anchor, direction, line, tip and label steps for one edge.
#[derive(Debug, Clone, Default)]
pub struct Sketcher {
    config: SketchConfig,
}

impl Sketcher {
    pub fn new(config: SketchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// `Ok(None)` when the edge has nothing drawable (degenerate boxes or
    /// points); `Err` when it asks for something the line type cannot carry.
    pub fn sketch_edge(&self, request: &EdgeRequest<'_>) -> Result<Option<EdgeSketch>, SketchError> {
        let padding = self.config.anchor_padding;
        let pair = if request.self_loop {
            self_anchor_pair(request.source, padding)
        } else {
            let avoid_start = taken_endpoints(request.others, request.source);
            let avoid_end = taken_endpoints(request.others, request.target);
            closest_anchor_pair(request.source, request.target, padding, &avoid_start, &avoid_end)
        };
        let Some(pair) = pair else {
            tracing::debug!(source = ?request.source, target = ?request.target, "no anchors on degenerate box");
            return Ok(None);
        };

        let line_request = LineRequest {
            line_type: request.line_type,
            start_point: pair.start,
            end_point: pair.end,
            source: request.source,
            target: request.target,
        };
        let Some(line) = sketch_line(&line_request, &self.config) else {
            tracing::debug!(start = ?pair.start, end = ?pair.end, "degenerate line omitted");
            return Ok(None);
        };

        let directions = resolve_directions(
            line.start_point,
            line.end_point,
            request.source,
            request.target,
            self.config.direction_padding,
        );

        let tips = Tips {
            start: request
                .tips
                .start
                .map(|kind| start_marker(kind, &line, directions, &self.config))
                .transpose()?,
            end: request
                .tips
                .end
                .map(|kind| end_marker(kind, &line, directions, &self.config))
                .transpose()?,
        };
        let label = request
            .label
            .and_then(|text| sketch_label(&line, text, directions, &self.config));

        Ok(Some(EdgeSketch {
            shape: Shape { line, tips, label },
            directions,
        }))
    }
}

fn taken_endpoints(others: &[&LineShape], bounds: &BoundingBox) -> Vec<Point> {
    let mut taken = Vec::new();
    for line in others {
        for point in [line.start_point, line.end_point] {
            if on_perimeter(bounds, point) {
                taken.push(point);
            }
        }
    }
    taken
}

fn on_perimeter(bounds: &BoundingBox, point: Point) -> bool {
    let t = PERIMETER_TOLERANCE;
    let within_x = point.x >= bounds.x - t && point.x <= bounds.right() + t;
    let within_y = point.y >= bounds.y - t && point.y <= bounds.bottom() + t;
    let on_vertical = (point.x - bounds.x).abs() <= t || (point.x - bounds.right()).abs() <= t;
    let on_horizontal = (point.y - bounds.y).abs() <= t || (point.y - bounds.bottom()).abs() <= t;
    (on_vertical && within_y) || (on_horizontal && within_x)
}
