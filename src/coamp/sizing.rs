use super::graph::{CoampGraph, Edge, Node};

pub const BASE_RADIUS: f64 = 40.0;

const QUERY_SCALE: f64 = 1.5;
const MIN_SCALE: f64 = 0.8;

pub fn node_size<'a>(
    node: &Node,
    query_gene: &str,
    query_id: Option<&str>,
    incident_edges: impl IntoIterator<Item = &'a Edge>,
) -> f64 {
    if node.label == query_gene {
        return BASE_RADIUS * QUERY_SCALE;
    }

    let weight_to_query = query_id.map_or(0.0, |query_id| {
        incident_edges
            .into_iter()
            .filter(|edge| edge.connects(&node.id, query_id))
            .filter_map(|edge| edge.weight)
            .sum::<f64>()
    });

    BASE_RADIUS * (MIN_SCALE + weight_to_query)
}

pub fn node_sizes(graph: &CoampGraph, query_gene: &str) -> Vec<f64> {
    let query_id = graph.node_by_label(query_gene).map(|node| node.id.as_str());
    graph
        .nodes()
        .iter()
        .map(|node| node_size(node, query_gene, query_id, graph.incident_edges(&node.id)))
        .collect()
}

pub fn ideal_edge_length(source_size: f64, target_size: f64) -> f64 {
    100.0 - source_size.min(target_size) * 0.5
}

pub fn node_repulsion(size: f64) -> f64 {
    4500.0 - size * 50.0
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutParams {
    pub sizes: Vec<f64>,
    pub repulsion: Vec<f64>,
    pub edge_lengths: Vec<f64>,
}

impl LayoutParams {
    pub fn compute(graph: &CoampGraph, query_gene: &str) -> Self {
        let sizes = node_sizes(graph, query_gene);
        let repulsion = sizes.iter().copied().map(node_repulsion).collect();
        let edge_lengths = graph
            .edges()
            .iter()
            .map(|edge| {
                let size_of = |id: &str| {
                    graph
                        .node_index(id)
                        .map_or(BASE_RADIUS * MIN_SCALE, |index| sizes[index])
                };
                ideal_edge_length(size_of(&edge.source), size_of(&edge.target))
            })
            .collect();

        Self {
            sizes,
            repulsion,
            edge_lengths,
        }
    }
}
