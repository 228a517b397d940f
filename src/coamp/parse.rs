use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::{CoampError, CoampResult};
use super::graph::{CoampGraph, Edge, Location, Node, TestName, TestStats};

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<Element<RawNode>>,
    #[serde(default)]
    edges: Vec<Element<RawEdge>>,
}

#[derive(Debug, Deserialize)]
struct Element<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    oncogene: Option<Value>,
    #[serde(default)]
    location: Option<Value>,
    #[serde(default, alias = "samples")]
    features: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    inter: Vec<String>,
    #[serde(default)]
    union: Vec<String>,
    #[serde(default)]
    distance: Option<Value>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

pub fn parse_graph(raw: &str) -> CoampResult<CoampGraph> {
    graph_from_value(serde_json::from_str(raw)?)
}

pub fn graph_from_value(value: Value) -> CoampResult<CoampGraph> {
    let parsed = RawGraph::deserialize(value)?;
    build_graph(parsed)
}

pub fn canonical_label(label: &str) -> String {
    label.trim().to_ascii_uppercase()
}

fn build_graph(raw: RawGraph) -> CoampResult<CoampGraph> {
    let mut nodes = Vec::with_capacity(raw.nodes.len());
    let mut seen = HashSet::with_capacity(raw.nodes.len());

    for Element { data } in raw.nodes {
        let label = canonical_label(&data.label);
        let id = data
            .id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| label.clone());
        if id.is_empty() {
            warn!("skipping node without id or label");
            continue;
        }
        if !seen.insert(id.clone()) {
            warn!(node = %id, "duplicate node id; keeping the first occurrence");
            continue;
        }

        nodes.push(Node {
            id,
            label,
            oncogene: data.oncogene.as_ref().is_some_and(parse_flag),
            location: data.location.as_ref().and_then(parse_location),
            samples: data.features,
        });
    }

    let mut edges = Vec::with_capacity(raw.edges.len());
    for Element { mut data } in raw.edges {
        data.source = data.source.trim().to_owned();
        data.target = data.target.trim().to_owned();
        if !seen.contains(&data.source) || !seen.contains(&data.target) {
            warn!(
                source = %data.source,
                target = %data.target,
                "dropping edge with an unknown endpoint"
            );
            continue;
        }
        edges.push(build_edge(data)?);
    }

    Ok(CoampGraph::new(nodes, edges))
}

fn build_edge(raw: RawEdge) -> CoampResult<Edge> {
    let weight = match raw.weight {
        Some(weight) if !weight.is_finite() => {
            return Err(CoampError::InvalidGraph(format!(
                "edge {} -- {} has a non-finite weight",
                raw.source, raw.target
            )));
        }
        Some(weight) if weight < 0.0 => None,
        Some(weight) if weight > 1.0 => {
            warn!(source = %raw.source, target = %raw.target, weight, "edge weight above 1; clamping");
            Some(1.0)
        }
        weight => weight,
    };

    let union = raw.union.iter().collect::<HashSet<_>>();
    if raw.inter.iter().any(|sample| !union.contains(sample)) {
        warn!(
            source = %raw.source,
            target = %raw.target,
            "intersection samples are not a subset of the union"
        );
    }

    let mut edge = Edge {
        weight,
        distance_bp: applicable(raw.distance.as_ref()).map(|distance| distance.round() as u64),
        tests: [TestStats::default(); 3],
        source: raw.source,
        target: raw.target,
        inter: raw.inter,
        union: raw.union,
    };

    for test in TestName::ALL {
        let field = |prefix: &str| raw.extra.get(&format!("{prefix}_{}", test.key()));
        *edge.stats_mut(test) = TestStats {
            p_value: applicable(field("pval")),
            q_value: applicable(field("qval")),
            odds_ratio: applicable(field("odds_ratio")),
        };
    }

    Ok(edge)
}

/// `-1` marks "not computed"; any negative or non-numeric value becomes `None`.
fn applicable(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|number| number.is_finite() && *number >= 0.0)
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn parse_location(value: &Value) -> Option<Location> {
    let location = match value {
        Value::String(text) => {
            let text = text.trim().trim_matches('\'');
            let (chromosome, range) = text.rsplit_once(':')?;
            let (start, end) = range.split_once('-')?;
            Some(Location {
                chromosome: chromosome.trim().to_owned(),
                start: start.trim().parse().ok()?,
                end: end.trim().parse().ok()?,
            })
        }
        Value::Array(parts) => match parts.as_slice() {
            [chromosome, start, end] => Some(Location {
                chromosome: chromosome.as_str()?.to_owned(),
                start: start.as_u64()?,
                end: end.as_u64()?,
            }),
            _ => None,
        },
        _ => None,
    };
    location.filter(|location| !location.chromosome.is_empty() && location.start <= location.end)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_payload() -> Value {
        json!({
            "nodes": [
                {"data": {"id": "MYC", "label": "myc", "oncogene": "True",
                          "location": "chr8:127735434-127742951",
                          "features": ["s1_amplicon1", "s2_amplicon1"]}},
                {"data": {"id": "PVT1", "label": "PVT1", "oncogene": "False",
                          "location": ["chr8", 127794533, 128101253],
                          "features": ["s1_amplicon1"]}},
                {"data": {"id": "CCAT1", "label": "CCAT1", "oncogene": false}}
            ],
            "edges": [
                {"data": {"source": "MYC", "target": "PVT1", "weight": 0.5,
                          "inter": ["s1"], "union": ["s1", "s2"], "distance": 51582,
                          "pval_single_interval": 0.001, "qval_single_interval": 0.004,
                          "odds_ratio_single_interval": 12.5,
                          "pval_multi_interval": -1, "qval_multi_interval": -1,
                          "odds_ratio_multi_interval": -1}},
                {"data": {"source": "MYC", "target": "CCAT1", "weight": 0.25,
                          "inter": ["s2"], "union": ["s2"], "distance": -1}}
            ]
        })
    }

    #[test]
    fn parses_nodes_with_canonical_labels_and_flags() {
        let graph = graph_from_value(sample_payload()).unwrap();

        let myc = graph.node("MYC").unwrap();
        assert_eq!(myc.label, "MYC");
        assert!(myc.oncogene);
        assert_eq!(myc.samples.len(), 2);
        assert_eq!(
            myc.location.as_ref().map(ToString::to_string).as_deref(),
            Some("chr8:127735434-127742951")
        );

        let pvt1 = graph.node("PVT1").unwrap();
        assert!(!pvt1.oncogene);
        assert_eq!(pvt1.location.as_ref().map(|l| l.start), Some(127_794_533));

        assert!(graph.node("CCAT1").unwrap().location.is_none());
    }

    #[test]
    fn sentinels_become_not_applicable() {
        let graph = graph_from_value(sample_payload()).unwrap();
        let edge = &graph.edges()[0];

        assert_eq!(edge.distance_bp, Some(51_582));
        let single = edge.stats(TestName::SingleInterval);
        assert_eq!(single.q_value, Some(0.004));
        assert_eq!(single.odds_ratio, Some(12.5));

        let multi = edge.stats(TestName::MultiInterval);
        assert_eq!(multi, &TestStats::default());
        // absent fields behave exactly like the sentinel
        assert_eq!(edge.stats(TestName::MultiChromosomal), &TestStats::default());

        assert_eq!(graph.edges()[1].distance_bp, None);
    }

    #[test]
    fn drops_edges_with_unknown_endpoints() {
        let graph = graph_from_value(json!({
            "nodes": [{"data": {"id": "A", "label": "A"}}],
            "edges": [{"data": {"source": "A", "target": "B", "weight": 0.4}}]
        }))
        .unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn missing_or_sentinel_weight_is_not_applicable() {
        let graph = graph_from_value(json!({
            "nodes": [
                {"data": {"id": "A", "label": "A"}},
                {"data": {"id": "B", "label": "B"}},
                {"data": {"id": "C", "label": "C"}}
            ],
            "edges": [
                {"data": {"source": "A", "target": "B"}},
                {"data": {"source": "A", "target": "C", "weight": -1}}
            ]
        }))
        .unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().iter().all(|edge| edge.weight.is_none()));
    }

    #[test]
    fn out_of_range_weight_is_clamped() {
        let graph = graph_from_value(json!({
            "nodes": [{"data": {"id": "A", "label": "A"}}, {"data": {"id": "B", "label": "B"}}],
            "edges": [{"data": {"source": "A", "target": "B", "weight": 1.25}}]
        }))
        .unwrap();
        assert_eq!(graph.edges()[0].weight, Some(1.0));
    }

    #[test]
    fn edge_endpoints_are_trimmed_like_node_ids() {
        let graph = graph_from_value(json!({
            "nodes": [
                {"data": {"id": " MYC ", "label": "MYC"}},
                {"data": {"id": "PVT1", "label": "PVT1"}}
            ],
            "edges": [{"data": {"source": " MYC ", "target": "PVT1 ", "weight": 0.5}}]
        }))
        .unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_between("MYC", "PVT1").is_some());
    }

    #[test]
    fn node_id_falls_back_to_label() {
        let graph = parse_graph(r#"{"nodes": [{"data": {"label": " erbb2 "}}], "edges": []}"#)
            .unwrap();
        assert_eq!(graph.nodes()[0].id, "ERBB2");
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_graph("{\"nodes\": ["),
            Err(CoampError::InvalidGraph(_))
        ));
    }
}
