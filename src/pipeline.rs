use anyhow::{Result, bail};

use crate::canvas::{AutoSizer, CanvasExtent, StructuralSource};
use crate::config::Config;
use crate::diagram::{AssociationEdge, Diagram};
use crate::dump::DiagramDump;
use crate::geometry::BoundingBox;
use crate::layout::DataModelLayout;
use crate::model::DataModel;
use crate::sketch::{EdgeTips, LineType, TipType};

/// A laid-out, connected and auto-sized diagram of a data model.
#[derive(Debug, Clone)]
pub struct CanvasSnapshot {
    pub diagram: Diagram,
    pub canvas: CanvasExtent,
}

impl CanvasSnapshot {
    pub fn dump(&self) -> DiagramDump {
        DiagramDump::from_diagram(&self.diagram, self.canvas)
    }
}

/// Model → layout → diagram → canvas. Entities need a measured size to be
/// placed; edges touching an unplaced node are left out.
pub fn build_canvas(model: &DataModel, config: &Config) -> Result<CanvasSnapshot> {
    if model.entities.is_empty() {
        bail!("no entities in model");
    }
    let Some(layout) = DataModelLayout::new(config.layout.clone()).layout(model, model) else {
        bail!("no entity in the model has a size");
    };

    let mut diagram = Diagram::new(config.sketch.clone());
    for (id, node) in layout.graph.nodes() {
        if node.width <= 0.0 || node.height <= 0.0 {
            tracing::debug!(node = %id, "unsized external node not drawn");
            continue;
        }
        diagram.set_node(id, BoundingBox::new(0.0, 0.0, node.width, node.height))?;
    }
    diagram.apply_layout(&layout)?;

    let line_type = config.sketch.line_type;
    let tipped = |tip: TipType| EdgeTips {
        start: None,
        end: (line_type == LineType::Rectilinear).then_some(tip),
    };
    for entity in &model.entities {
        for parent in &entity.parents {
            let edge = AssociationEdge::new(format!("{}^{}", entity.id, parent), &entity.id, parent)
                .with_line_type(line_type)
                .with_tips(tipped(TipType::Parent));
            connect_placed(&mut diagram, edge)?;
        }
        for association in &entity.associations {
            let Some(target) = association.target.as_deref() else {
                continue;
            };
            let mut edge =
                AssociationEdge::new(format!("{}.{}", entity.id, association.id), &entity.id, target)
                    .with_line_type(line_type)
                    .with_tips(tipped(TipType::Direction));
            if let Some(name) = &association.name {
                edge = edge.with_label(name);
            }
            connect_placed(&mut diagram, edge)?;
        }
    }

    let mut canvas = CanvasExtent::new(config.canvas.initial_width, config.canvas.initial_height);
    let mut sizer = AutoSizer::new(config.canvas.growth_margin);
    let mut ticket = None;
    for change in diagram.drain_changes() {
        if let Some(next) = sizer.notify(&diagram, change) {
            ticket = Some(next);
        }
    }
    if let Some(ticket) = ticket {
        sizer.flush(ticket, &diagram, &mut canvas);
    }

    Ok(CanvasSnapshot { diagram, canvas })
}

fn connect_placed(diagram: &mut Diagram, edge: AssociationEdge) -> Result<()> {
    if diagram.node(&edge.source).is_none() || diagram.node(&edge.target).is_none() {
        tracing::debug!(edge = %edge.id, "endpoint not placed; edge skipped");
        return Ok(());
    }
    diagram.connect(edge)?;
    Ok(())
}
