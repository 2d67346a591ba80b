use std::collections::{BTreeMap, HashMap};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::config::LayoutConfig;
use crate::geometry::Point;

use super::LayoutGraph;

/// Layered layout backend: assigns a center point to every graph node.
pub trait RankedLayout {
    fn place(&self, graph: &LayoutGraph, config: &LayoutConfig) -> BTreeMap<String, Point>;
}

/// Sugiyama-style layout through `dagre_rust`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreRanker;

impl RankedLayout for DagreRanker {
    fn place(&self, graph: &LayoutGraph, config: &LayoutConfig) -> BTreeMap<String, Point> {
        let mut centers = BTreeMap::new();
        if graph.is_empty() {
            return centers;
        }

        let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some(config.rankdir.as_str().to_string());
        graph_config.align = config.align.map(|align| align.as_str().to_string());
        graph_config.ranker = Some(config.ranker.as_str().to_string());
        graph_config.acyclicer = config.acyclicer.map(|acyclicer| acyclicer.as_str().to_string());
        graph_config.nodesep = Some(config.nodesep);
        graph_config.edgesep = Some(config.edgesep);
        graph_config.ranksep = Some(config.ranksep);
        graph_config.marginx = Some(config.marginx);
        graph_config.marginy = Some(config.marginy);
        dagre_graph.set_graph(graph_config);

        for (id, layout_node) in graph.nodes() {
            let mut node = DagreNode::default();
            node.width = layout_node.width;
            node.height = layout_node.height;
            dagre_graph.set_node(id.to_string(), Some(node));
        }

        // Parallel edges collapse into one, keeping the strongest constraint.
        // Self loops carry no rank constraint.
        let mut merged: Vec<(String, String, f32, f32)> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        for edge in graph.edges() {
            if edge.is_self_loop() {
                continue;
            }
            if !graph.has_node(&edge.source) || !graph.has_node(&edge.target) {
                continue;
            }
            let key = (edge.source.clone(), edge.target.clone());
            if let Some(&slot) = index.get(&key) {
                let entry = &mut merged[slot];
                entry.2 = entry.2.max(edge.min_len);
                entry.3 = entry.3.max(edge.weight());
                continue;
            }
            index.insert(key, merged.len());
            merged.push((edge.source.clone(), edge.target.clone(), edge.min_len, edge.weight()));
        }

        for (from, to, min_len, weight) in merged {
            let mut edge_label = DagreEdge::default();
            edge_label.minlen = Some(min_len);
            edge_label.weight = Some(weight);
            let _ = dagre_graph.set_edge(&from, &to, Some(edge_label), None);
        }

        dagre_layout::run_layout(&mut dagre_graph);

        for (id, _) in graph.nodes() {
            let Some(dagre_node) = dagre_graph.node(&id.to_string()) else {
                continue;
            };
            centers.insert(id.to_string(), Point::new(dagre_node.x, dagre_node.y));
        }
        centers
    }
}
