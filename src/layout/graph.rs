use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relative importance of a layout edge. Only the ordering matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightBand {
    /// Edge into another model's graph. Not produced by the data-model builder yet.
    External,
    Internal,
    Parent,
    #[serde(rename = "self")]
    SelfRef,
}

impl WeightBand {
    pub fn weight(self) -> f32 {
        match self {
            WeightBand::External => 1.0,
            WeightBand::Internal => 2.0,
            WeightBand::Parent => 4.0,
            WeightBand::SelfRef => 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub min_len: f32,
    pub band: WeightBand,
}

impl LayoutEdge {
    pub fn weight(&self) -> f32 {
        self.band.weight()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Directed graph handed to the ranker. Node iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    order: Vec<String>,
    nodes: BTreeMap<String, LayoutNode>,
    edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the node already existed (its size is kept).
    pub fn add_node(&mut self, id: &str, node: LayoutNode) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.order.push(id.to_string());
        self.nodes.insert(id.to_string(), node);
        true
    }

    pub fn add_edge(&mut self, source: &str, target: &str, min_len: f32, band: WeightBand) {
        self.edges.push(LayoutEdge {
            source: source.to_string(),
            target: target.to_string(),
            min_len,
            band,
        });
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &LayoutNode)> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|node| (id.as_str(), node)))
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn edges_between<'a>(
        &'a self,
        source: &'a str,
        target: &'a str,
    ) -> impl Iterator<Item = &'a LayoutEdge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source == source && edge.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered() {
        assert!(WeightBand::External < WeightBand::Internal);
        assert!(WeightBand::Internal < WeightBand::Parent);
        assert!(WeightBand::Parent < WeightBand::SelfRef);
        assert!(WeightBand::External.weight() < WeightBand::SelfRef.weight());
    }

    #[test]
    fn nodes_keep_insertion_order_and_first_size() {
        let mut graph = LayoutGraph::new();
        assert!(graph.add_node("b", LayoutNode { width: 10.0, height: 10.0 }));
        assert!(graph.add_node("a", LayoutNode { width: 20.0, height: 20.0 }));
        assert!(!graph.add_node("b", LayoutNode { width: 99.0, height: 99.0 }));
        let ids: Vec<&str> = graph.nodes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(graph.node("b").unwrap().width, 10.0);
    }

    #[test]
    fn self_band_serializes_as_self() {
        assert_eq!(serde_json::to_string(&WeightBand::SelfRef).unwrap(), "\"self\"");
    }
}
