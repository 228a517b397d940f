use std::collections::HashSet;

use super::graph::{CoampGraph, Edge, weight_desc};
use super::session::QueryContext;

pub fn select(graph: &CoampGraph, limit: usize) -> CoampGraph {
    induced(graph, top_edges(graph, limit), None)
}

pub fn select_pinned(graph: &CoampGraph, limit: usize, query_gene: &str) -> CoampGraph {
    match graph.node_by_label(query_gene) {
        Some(query) => induced(graph, top_edges(graph, limit), Some(query.id.as_str())),
        None => select(graph, limit),
    }
}

fn induced(graph: &CoampGraph, edges: Vec<&Edge>, pinned: Option<&str>) -> CoampGraph {
    let mut keep = edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect::<HashSet<_>>();
    keep.extend(pinned);

    let nodes = graph
        .nodes()
        .iter()
        .filter(|node| keep.contains(node.id.as_str()))
        .cloned()
        .collect();

    CoampGraph::new(nodes, edges.into_iter().cloned().collect())
}

fn top_edges(graph: &CoampGraph, limit: usize) -> Vec<&Edge> {
    let mut ranked = graph.edges().iter().collect::<Vec<_>>();
    // sort_by is stable, so equal weights stay in fetch order
    ranked.sort_by(|a, b| weight_desc(a.weight, b.weight));
    ranked.truncate(limit);
    ranked
}

pub fn apply_filters(graph: &CoampGraph, context: &QueryContext) -> CoampGraph {
    let query_id = graph
        .node_by_label(&context.gene)
        .map(|node| node.id.as_str());
    let is_oncogene_or_query = |id: &str| {
        Some(id) == query_id || graph.node(id).is_some_and(|node| node.oncogene)
    };

    let edges = graph
        .edges()
        .iter()
        .filter(|edge| match edge.weight {
            Some(weight) => weight >= context.min_weight,
            None => context.min_weight <= 0.0,
        })
        .filter(|edge| edge.union.len() as f64 >= context.min_samples)
        .filter(|edge| {
            !context.oncogenes_only
                || (is_oncogene_or_query(&edge.source) && is_oncogene_or_query(&edge.target))
        })
        .collect::<Vec<_>>();

    induced(graph, edges, query_id)
}

#[cfg(test)]
mod tests {
    use super::super::graph::fixtures::graph;
    use super::*;

    fn ranked_graph() -> CoampGraph {
        graph(
            &["Q", "A", "B", "C"],
            &[("Q", "A", 0.9), ("Q", "B", 0.5), ("Q", "C", 0.7)],
        )
    }

    fn weights(graph: &CoampGraph) -> Vec<f64> {
        graph.edges().iter().filter_map(|edge| edge.weight).collect()
    }

    fn ids(graph: &CoampGraph) -> Vec<&str> {
        graph.nodes().iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn zero_limit_yields_empty_graph() {
        let selected = select(&ranked_graph(), 0);
        assert_eq!(selected.edge_count(), 0);
        assert_eq!(selected.node_count(), 0);
        assert!(selected.is_empty());
    }

    #[test]
    fn full_limit_keeps_every_edge_in_weight_order() {
        let graph = ranked_graph();
        let selected = select(&graph, graph.edge_count());
        assert_eq!(weights(&selected), vec![0.9, 0.7, 0.5]);
        assert_eq!(selected.node_count(), 4);

        let oversized = select(&graph, 100);
        assert_eq!(weights(&oversized), vec![0.9, 0.7, 0.5]);
    }

    #[test]
    fn keeps_heaviest_edges_and_their_nodes() {
        let selected = select(&ranked_graph(), 2);
        assert_eq!(weights(&selected), vec![0.9, 0.7]);
        assert_eq!(ids(&selected), vec!["Q", "A", "C"]);
    }

    #[test]
    fn ties_keep_fetch_order() {
        let graph = graph(
            &["Q", "A", "B", "C"],
            &[("Q", "A", 0.4), ("Q", "B", 0.4), ("Q", "C", 0.4)],
        );
        let selected = select(&graph, 2);
        let targets = selected
            .edges()
            .iter()
            .map(|edge| edge.target.as_str())
            .collect::<Vec<_>>();
        assert_eq!(targets, vec!["A", "B"]);
    }

    #[test]
    fn not_applicable_weight_ranks_below_zero() {
        let mut edges = graph(
            &["Q", "A", "B"],
            &[("Q", "A", 0.0), ("Q", "B", 0.0)],
        )
        .edges()
        .to_vec();
        edges[0].weight = None;
        let graph = CoampGraph::new(ranked_graph().nodes().to_vec(), edges);

        let selected = select(&graph, 1);
        assert_eq!(ids(&selected), vec!["Q", "B"]);

        let mut context = QueryContext::new("Q").unwrap();
        assert_eq!(apply_filters(&graph, &context).edge_count(), 2);
        context.min_weight = 0.01;
        assert_eq!(apply_filters(&graph, &context).edge_count(), 0);
    }

    #[test]
    fn unpinned_selection_can_drop_the_query_node() {
        let graph = graph(
            &["Q", "A", "B", "C"],
            &[("Q", "A", 0.1), ("B", "C", 0.8)],
        );
        assert_eq!(ids(&select(&graph, 1)), vec!["B", "C"]);
        assert_eq!(ids(&select_pinned(&graph, 1, "Q")), vec!["Q", "B", "C"]);
        assert_eq!(ids(&select_pinned(&graph, 0, "Q")), vec!["Q"]);
    }

    #[test]
    fn pinned_selection_tolerates_unknown_query() {
        let selected = select_pinned(&ranked_graph(), 1, "NOPE");
        assert_eq!(ids(&selected), vec!["Q", "A"]);
    }

    #[test]
    fn filters_by_weight_samples_and_oncogenes() {
        let mut graph = ranked_graph();
        let mut nodes = graph.nodes().to_vec();
        nodes[3].oncogene = true;
        let mut edges = graph.edges().to_vec();
        edges[0].union = vec!["s1".into(), "s2".into()];
        edges[2].union = vec!["s1".into(), "s2".into(), "s3".into()];
        graph = CoampGraph::new(nodes, edges);

        let mut context = QueryContext::new("q").unwrap();
        context.min_weight = 0.6;
        let filtered = apply_filters(&graph, &context);
        assert_eq!(weights(&filtered), vec![0.9, 0.7]);

        context.min_samples = 3.0;
        let filtered = apply_filters(&graph, &context);
        assert_eq!(weights(&filtered), vec![0.7]);
        assert_eq!(ids(&filtered), vec!["Q", "C"]);

        context.min_weight = 0.0;
        context.min_samples = 0.0;
        context.oncogenes_only = true;
        let filtered = apply_filters(&graph, &context);
        assert_eq!(weights(&filtered), vec![0.7]);
    }

    #[test]
    fn filtering_keeps_isolated_query_node() {
        let mut context = QueryContext::new("Q").unwrap();
        context.min_weight = 0.95;
        let filtered = apply_filters(&ranked_graph(), &context);
        assert_eq!(filtered.edge_count(), 0);
        assert_eq!(ids(&filtered), vec!["Q"]);
    }
}
