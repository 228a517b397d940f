use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestName {
    SingleInterval,
    MultiInterval,
    MultiChromosomal,
}

impl TestName {
    pub const ALL: [TestName; 3] = [
        TestName::SingleInterval,
        TestName::MultiInterval,
        TestName::MultiChromosomal,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::SingleInterval => "single_interval",
            Self::MultiInterval => "multi_interval",
            Self::MultiChromosomal => "multi_chromosomal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SingleInterval => "Single Interval",
            Self::MultiInterval => "Multi Interval",
            Self::MultiChromosomal => "Multi Chromosomal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|test| test.key() == key)
    }

    pub fn index(self) -> usize {
        match self {
            Self::SingleInterval => 0,
            Self::MultiInterval => 1,
            Self::MultiChromosomal => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TestStats {
    pub p_value: Option<f64>,
    pub q_value: Option<f64>,
    pub odds_ratio: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub oncogene: bool,
    pub location: Option<Location>,
    pub samples: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
    pub inter: Vec<String>,
    pub union: Vec<String>,
    pub distance_bp: Option<u64>,
    pub tests: [TestStats; 3],
}

impl Edge {
    pub fn stats(&self, test: TestName) -> &TestStats {
        &self.tests[test.index()]
    }

    pub fn stats_mut(&mut self, test: TestName) -> &mut TestStats {
        &mut self.tests[test.index()]
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CoampGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
    id_by_label: HashMap<String, String>,
}

impl CoampGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        let mut id_by_label = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.entry(node.id.clone()).or_insert(index);
            id_by_label
                .entry(node.label.clone())
                .or_insert_with(|| node.id.clone());
        }

        Self {
            nodes,
            edges,
            index_by_id,
            id_by_label,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        self.id_by_label.get(label).and_then(|id| self.node(id))
    }

    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.connects(a, b))
    }

    pub fn incident_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(id))
    }

    pub fn max_union_samples(&self) -> usize {
        self.edges
            .iter()
            .map(|edge| edge.union.len())
            .max()
            .unwrap_or(0)
    }
}

/// Descending by weight; a not-applicable weight sorts after every real one.
pub fn weight_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// O(1) lookup of "the edge between a and b", keyed by both orientations.
/// The first edge in graph order wins when a pair has several edges.
pub struct EdgeLookup<'a> {
    by_pair: HashMap<(&'a str, &'a str), &'a Edge>,
}

impl<'a> EdgeLookup<'a> {
    pub fn new(graph: &'a CoampGraph) -> Self {
        let mut by_pair = HashMap::with_capacity(graph.edge_count() * 2);
        for edge in graph.edges() {
            by_pair
                .entry((edge.source.as_str(), edge.target.as_str()))
                .or_insert(edge);
            by_pair
                .entry((edge.target.as_str(), edge.source.as_str()))
                .or_insert(edge);
        }
        Self { by_pair }
    }

    pub fn between(&self, a: &str, b: &str) -> Option<&'a Edge> {
        self.by_pair.get(&(a, b)).copied()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn node(label: &str) -> Node {
        Node {
            id: label.to_owned(),
            label: label.to_owned(),
            oncogene: false,
            location: None,
            samples: Vec::new(),
        }
    }

    pub(crate) fn edge(source: &str, target: &str, weight: f64) -> Edge {
        Edge {
            source: source.to_owned(),
            target: target.to_owned(),
            weight: Some(weight),
            inter: Vec::new(),
            union: Vec::new(),
            distance_bp: None,
            tests: [TestStats::default(); 3],
        }
    }

    pub(crate) fn graph(labels: &[&str], edges: &[(&str, &str, f64)]) -> CoampGraph {
        CoampGraph::new(
            labels.iter().map(|label| node(label)).collect(),
            edges
                .iter()
                .map(|&(source, target, weight)| edge(source, target, weight))
                .collect(),
        )
    }
}
