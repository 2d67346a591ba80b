use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasSurface, StructuralChange, StructuralSource};
use crate::config::SketchConfig;
use crate::direction::Directions;
use crate::error::SketchError;
use crate::geometry::{BoundingBox, Viewport};
use crate::layout::LayoutResult;
use crate::sketch::{EdgeRequest, EdgeTips, LineShape, LineType, Shape, Sketcher};

/// Connection between two nodes of the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default)]
    pub tips: EdgeTips,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether the host lets the user drag this edge's endpoints.
    #[serde(default = "default_position_change")]
    pub position_change: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<Directions>,
    /// Last computed shape; `None` when the edge cannot be drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
}

fn default_position_change() -> bool {
    true
}

impl AssociationEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            line_type: LineType::default(),
            tips: EdgeTips::default(),
            label: None,
            position_change: true,
            directions: None,
            shape: None,
        }
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_tips(mut self, tips: EdgeTips) -> Self {
        self.tips = tips;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, node: &str) -> bool {
        self.source == node || self.target == node
    }

    fn joins(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Element handle reported to the canvas auto-sizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagramElement {
    Node(String),
    Connector(String),
}

/// Placed nodes plus the association edges between them. Every mutation
/// recomputes the shapes it invalidates and records a structural change.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    sketcher: Sketcher,
    nodes: BTreeMap<String, BoundingBox>,
    edges: Vec<AssociationEdge>,
    viewport: Viewport,
    changes: Vec<StructuralChange<DiagramElement>>,
}

impl Diagram {
    pub fn new(config: SketchConfig) -> Self {
        Self {
            sketcher: Sketcher::new(config),
            ..Self::default()
        }
    }

    pub fn sketch_config(&self) -> &SketchConfig {
        self.sketcher.config()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn node(&self, id: &str) -> Option<&BoundingBox> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &BoundingBox)> {
        self.nodes.iter().map(|(id, bounds)| (id.as_str(), bounds))
    }

    pub fn edge(&self, id: &str) -> Option<&AssociationEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edges(&self) -> &[AssociationEdge] {
        &self.edges
    }

    /// Place or resize a node. Incident edges are redrawn.
    pub fn set_node(&mut self, id: impl Into<String>, bounds: BoundingBox) -> Result<(), SketchError> {
        let id = id.into();
        let change = if self.nodes.insert(id.clone(), bounds).is_some() {
            StructuralChange::Changed {
                node: DiagramElement::Node(id.clone()),
                attribute: "bounds".to_string(),
            }
        } else {
            StructuralChange::Added(DiagramElement::Node(id.clone()))
        };
        self.changes.push(change);
        self.redraw_incident(&id)
    }

    /// Remove a node along with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<BoundingBox> {
        let removed = self.nodes.remove(id)?;
        self.edges.retain(|edge| !edge.touches(id));
        Some(removed)
    }

    /// Apply a position change (drag delta) to a node and redraw its edges.
    pub fn move_node(&mut self, id: &str, dx: f32, dy: f32) -> Result<Vec<String>, SketchError> {
        let bounds = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| SketchError::UnknownNode(id.to_string()))?;
        *bounds = bounds.translate(dx, dy);
        self.changes.push(StructuralChange::Changed {
            node: DiagramElement::Node(id.to_string()),
            attribute: "transform".to_string(),
        });
        let affected: Vec<String> = self
            .edges
            .iter()
            .filter(|edge| edge.touches(id))
            .map(|edge| edge.id.clone())
            .collect();
        self.redraw_all(&affected)?;
        Ok(affected)
    }

    /// Add an edge and compute its shape. Edges already joining the same two
    /// nodes are redrawn afterwards, since their anchor avoidance changed.
    pub fn connect(&mut self, edge: AssociationEdge) -> Result<Option<&Shape>, SketchError> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(SketchError::UnknownNode(endpoint.clone()));
            }
        }
        let id = edge.id.clone();
        let mut siblings = self.siblings_of(&edge.source, &edge.target, &id);
        // Reusing an id replaces that edge; the pair it used to join lost one.
        if let Some(replaced) = self.edge(&id) {
            for sibling in self.siblings_of(&replaced.source, &replaced.target, &id) {
                if !siblings.contains(&sibling) {
                    siblings.push(sibling);
                }
            }
        }
        self.edges.retain(|existing| existing.id != id);
        self.edges.push(edge);
        self.changes
            .push(StructuralChange::Added(DiagramElement::Connector(id.clone())));

        self.redraw(&id)?;
        self.redraw_all(&siblings)?;
        Ok(self.edge(&id).and_then(|edge| edge.shape.as_ref()))
    }

    /// Remove an edge; remaining edges between the same nodes are redrawn.
    pub fn disconnect(&mut self, id: &str) -> Result<AssociationEdge, SketchError> {
        let idx = self
            .edges
            .iter()
            .position(|edge| edge.id == id)
            .ok_or_else(|| SketchError::UnknownEdge(id.to_string()))?;
        let removed = self.edges.remove(idx);
        let siblings = self.siblings_of(&removed.source, &removed.target, id);
        self.redraw_all(&siblings)?;
        Ok(removed)
    }

    /// Recompute one edge's shape against the current boxes.
    pub fn redraw(&mut self, id: &str) -> Result<Option<&Shape>, SketchError> {
        let idx = self
            .edges
            .iter()
            .position(|edge| edge.id == id)
            .ok_or_else(|| SketchError::UnknownEdge(id.to_string()))?;

        let result = {
            let edge = &self.edges[idx];
            let source = self
                .nodes
                .get(&edge.source)
                .ok_or_else(|| SketchError::UnknownNode(edge.source.clone()))?;
            let target = self
                .nodes
                .get(&edge.target)
                .ok_or_else(|| SketchError::UnknownNode(edge.target.clone()))?;
            let others: Vec<&LineShape> = self
                .edges
                .iter()
                .filter(|other| other.id != edge.id)
                .filter_map(|other| other.shape.as_ref().map(|shape| &shape.line))
                .collect();
            self.sketcher.sketch_edge(&EdgeRequest {
                line_type: edge.line_type,
                source,
                target,
                self_loop: edge.is_self_loop(),
                others: &others,
                tips: edge.tips,
                label: edge.label.as_deref(),
            })
        };

        let edge = &mut self.edges[idx];
        match result {
            Ok(Some(sketch)) => {
                edge.directions = Some(sketch.directions);
                edge.shape = Some(sketch.shape);
            }
            Ok(None) => {
                tracing::debug!(edge = %edge.id, "edge not drawable");
                edge.directions = None;
                edge.shape = None;
            }
            Err(err) => {
                edge.directions = None;
                edge.shape = None;
                return Err(err);
            }
        }
        self.changes.push(StructuralChange::Changed {
            node: DiagramElement::Connector(id.to_string()),
            attribute: "d".to_string(),
        });
        Ok(self.edges[idx].shape.as_ref())
    }

    /// Move nodes to laid-out positions (sizes are kept) and redraw every edge.
    /// Positions for nodes the diagram does not show are ignored.
    pub fn apply_layout(&mut self, layout: &LayoutResult) -> Result<(), SketchError> {
        for position in &layout.positions {
            let Some(bounds) = self.nodes.get_mut(&position.id) else {
                continue;
            };
            bounds.x = position.x;
            bounds.y = position.y;
            self.changes.push(StructuralChange::Changed {
                node: DiagramElement::Node(position.id.clone()),
                attribute: "transform".to_string(),
            });
        }
        let ids: Vec<String> = self.edges.iter().map(|edge| edge.id.clone()).collect();
        self.redraw_all(&ids)
    }

    fn redraw_incident(&mut self, node: &str) -> Result<(), SketchError> {
        let ids: Vec<String> = self
            .edges
            .iter()
            .filter(|edge| edge.touches(node))
            .map(|edge| edge.id.clone())
            .collect();
        self.redraw_all(&ids)
    }

    /// Redraw each edge; a failing edge does not stop the others, the first
    /// error is returned at the end.
    fn redraw_all(&mut self, ids: &[String]) -> Result<(), SketchError> {
        let mut first_err = None;
        for id in ids {
            if let Err(err) = self.redraw(id) {
                tracing::warn!(edge = %id, error = %err, "edge shape aborted");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn siblings_of(&self, a: &str, b: &str, except: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|edge| edge.id != except && edge.joins(a, b))
            .map(|edge| edge.id.clone())
            .collect()
    }
}

impl CanvasSurface for Diagram {
    type Node = DiagramElement;

    fn client_rect(&self, node: &DiagramElement) -> Option<BoundingBox> {
        match node {
            DiagramElement::Node(id) => self
                .nodes
                .get(id)
                .map(|bounds| self.viewport.to_client(*bounds)),
            DiagramElement::Connector(_) => None,
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn is_connector(&self, node: &DiagramElement) -> bool {
        matches!(node, DiagramElement::Connector(_))
    }
}

impl StructuralSource for Diagram {
    type Node = DiagramElement;

    fn drain_changes(&mut self) -> Vec<StructuralChange<DiagramElement>> {
        std::mem::take(&mut self.changes)
    }
}
