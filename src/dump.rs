use crate::canvas::CanvasExtent;
use crate::diagram::Diagram;
use crate::direction::Directions;
use crate::sketch::{EdgeTips, LineType, Shape};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Snapshot of a diagram handed to the rendering layer.
#[derive(Debug, Serialize)]
pub struct DiagramDump {
    pub canvas: CanvasExtent,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub line_type: LineType,
    pub tips: EdgeTips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub position_change: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directions: Option<Directions>,
    /// `null` tells the renderer to omit the edge.
    pub shape: Option<Shape>,
}

impl DiagramDump {
    pub fn from_diagram(diagram: &Diagram, canvas: CanvasExtent) -> Self {
        let nodes = diagram
            .nodes()
            .map(|(id, bounds)| NodeDump {
                id: id.to_string(),
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            })
            .collect();

        let edges = diagram
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                line_type: edge.line_type,
                tips: edge.tips,
                label: edge.label.clone(),
                position_change: edge.position_change,
                directions: edge.directions,
                shape: edge.shape.clone(),
            })
            .collect();

        DiagramDump {
            canvas,
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_diagram_dump(path: &Path, diagram: &Diagram, canvas: CanvasExtent) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = DiagramDump::from_diagram(diagram, canvas);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
