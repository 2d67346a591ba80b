mod graph;
mod ranker;

pub use graph::{LayoutEdge, LayoutGraph, LayoutNode, WeightBand};
pub use ranker::{DagreRanker, RankedLayout};

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::{DataModel, NodeSizes, Size};

/// Top-left position of one laid-out node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub positions: Vec<NodePosition>,
    pub graph: LayoutGraph,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.positions.iter().find(|position| position.id == id)
    }
}

/// Layered auto-layout for the entities of a data model.
#[derive(Debug, Clone, Default)]
pub struct DataModelLayout<R = DagreRanker> {
    config: LayoutConfig,
    ranker: R,
}

impl DataModelLayout<DagreRanker> {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ranker: DagreRanker,
        }
    }
}

impl<R: RankedLayout> DataModelLayout<R> {
    pub fn with_ranker(config: LayoutConfig, ranker: R) -> Self {
        Self { config, ranker }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Weighted graph of the model. Entities without a measured size are left
    /// out: layout can only run after the first render established sizes.
    pub fn build_graph(&self, model: &DataModel, sizes: &impl NodeSizes) -> LayoutGraph {
        let min_len = self.config.min_len;
        let mut graph = LayoutGraph::new();

        for entity in &model.entities {
            match sizes.size_of(&entity.id) {
                Some(size) => {
                    graph.add_node(&entity.id, node_for(size));
                }
                None => {
                    tracing::debug!(entity = %entity.id, "entity has no measured size; left out of layout");
                }
            }
        }

        for entity in &model.entities {
            if !graph.has_node(&entity.id) {
                continue;
            }
            for parent in &entity.parents {
                if !graph.has_node(parent) && !model.contains(parent) {
                    graph.add_node(parent, external_node(sizes, parent));
                }
                if graph.has_node(parent) {
                    graph.add_edge(&entity.id, parent, min_len, WeightBand::Parent);
                }
            }
            for target in entity.associations.iter().filter_map(|a| a.target.as_deref()) {
                if !graph.has_node(target) && !model.contains(target) {
                    graph.add_node(target, external_node(sizes, target));
                }
            }
        }

        for entity in &model.entities {
            if !graph.has_node(&entity.id) {
                continue;
            }
            for target in entity.associations.iter().filter_map(|a| a.target.as_deref()) {
                if !graph.has_node(target) {
                    continue;
                }
                let band = if target == entity.id {
                    WeightBand::SelfRef
                } else {
                    WeightBand::Internal
                };
                graph.add_edge(&entity.id, target, min_len, band);
            }
        }

        graph
    }

    /// Lay the model out. `None` for a model without entities, or when no
    /// entity has been measured yet.
    pub fn layout(&self, model: &DataModel, sizes: &impl NodeSizes) -> Option<LayoutResult> {
        if model.entities.is_empty() {
            return None;
        }
        let graph = self.build_graph(model, sizes);
        if graph.is_empty() {
            tracing::debug!("no measured entities; layout skipped");
            return None;
        }

        let centers = self.ranker.place(&graph, &self.config);
        let mut positions = Vec::with_capacity(graph.node_count());
        for (id, node) in graph.nodes() {
            let Some(center) = centers.get(id) else {
                tracing::warn!(node = %id, "ranker returned no position");
                continue;
            };
            positions.push(NodePosition {
                id: id.to_string(),
                x: center.x - node.width / 2.0,
                y: center.y - node.height / 2.0,
            });
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edges().len(),
            "data model laid out"
        );

        Some(LayoutResult { positions, graph })
    }
}

fn node_for(size: Size) -> LayoutNode {
    LayoutNode {
        width: size.width.max(0.0),
        height: size.height.max(0.0),
    }
}

/// Parents and targets outside the model are placed too, sized if known.
fn external_node(sizes: &impl NodeSizes, id: &str) -> LayoutNode {
    sizes
        .size_of(id)
        .map(node_for)
        .unwrap_or(LayoutNode {
            width: 0.0,
            height: 0.0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::Entity;
    use std::collections::BTreeMap;

    /// Stacks nodes in insertion order, one rank per node.
    struct StackRanker;

    impl RankedLayout for StackRanker {
        fn place(&self, graph: &LayoutGraph, config: &LayoutConfig) -> BTreeMap<String, Point> {
            graph
                .nodes()
                .enumerate()
                .map(|(idx, (id, node))| {
                    let y = idx as f32 * (100.0 + config.ranksep) + node.height / 2.0;
                    (id.to_string(), Point::new(node.width / 2.0, y))
                })
                .collect()
        }
    }

    fn size(width: f32, height: f32) -> Size {
        Size { width, height }
    }

    fn model(entities: Vec<Entity>) -> DataModel {
        let mut sizes = BTreeMap::new();
        for entity in &entities {
            sizes.insert(entity.id.clone(), size(120.0, 60.0));
        }
        DataModel { entities, sizes }
    }

    fn layout() -> DataModelLayout<StackRanker> {
        DataModelLayout::with_ranker(LayoutConfig::default(), StackRanker)
    }

    #[test]
    fn empty_model_has_no_layout() {
        let sizes: BTreeMap<String, Size> = BTreeMap::new();
        assert!(layout().layout(&DataModel::default(), &sizes).is_none());
    }

    #[test]
    fn unmeasured_model_has_no_layout() {
        let model = DataModel {
            entities: vec![Entity::new("a")],
            sizes: BTreeMap::new(),
        };
        assert!(layout().layout(&model, &model).is_none());
    }

    #[test]
    fn self_association_adds_a_self_band_edge() {
        let model = model(vec![Entity::new("e").with_association("loop", "e")]);
        let graph = layout().build_graph(&model, &model);
        assert_eq!(graph.node_count(), 1);
        let edges: Vec<_> = graph.edges_between("e", "e").collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].band, WeightBand::SelfRef);
    }

    #[test]
    fn parents_and_associations_get_their_bands() {
        let model = model(vec![
            Entity::new("order").with_association("buyer", "customer"),
            Entity::new("customer").with_parent("party"),
        ]);
        let graph = layout().build_graph(&model, &model);
        // the external parent becomes a node too
        assert!(graph.has_node("party"));
        assert_eq!(graph.node("party").unwrap().width, 0.0);
        let parent_edge = graph.edges_between("customer", "party").next().unwrap();
        assert_eq!(parent_edge.band, WeightBand::Parent);
        let assoc_edge = graph.edges_between("order", "customer").next().unwrap();
        assert_eq!(assoc_edge.band, WeightBand::Internal);
        assert!(graph.edges().iter().all(|edge| edge.band != WeightBand::External));
    }

    #[test]
    fn parent_inside_model_is_not_duplicated() {
        let model = model(vec![
            Entity::new("base"),
            Entity::new("derived").with_parent("base"),
        ]);
        let graph = layout().build_graph(&model, &model);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn unmeasured_entities_are_skipped() {
        let mut model = model(vec![
            Entity::new("a").with_association("x", "b"),
            Entity::new("b"),
        ]);
        model.sizes.remove("b");
        let graph = layout().build_graph(&model, &model);
        assert!(graph.has_node("a"));
        assert!(!graph.has_node("b"));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn external_target_uses_known_size() {
        let mut model = model(vec![Entity::new("a").with_association("x", "remote")]);
        model.sizes.insert("remote".to_string(), size(80.0, 40.0));
        let graph = layout().build_graph(&model, &model);
        assert_eq!(graph.node("remote").unwrap().width, 80.0);
        assert_eq!(graph.edges()[0].band, WeightBand::Internal);
    }

    #[test]
    fn centers_become_top_left_positions() {
        let model = model(vec![Entity::new("a"), Entity::new("b")]);
        let result = layout().layout(&model, &model).unwrap();
        let a = result.position("a").unwrap();
        assert_eq!((a.x, a.y), (0.0, 0.0));
        let b = result.position("b").unwrap();
        assert_eq!((b.x, b.y), (0.0, 150.0));
        assert_eq!(result.graph.node_count(), 2);
    }
}
