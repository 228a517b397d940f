use std::sync::Arc;

use super::error::{CoampError, CoampResult};
use super::graph::CoampGraph;
use super::parse::canonical_label;
use super::select::{apply_filters, select_pinned};
use super::significance::TestSelector;

pub const DEFAULT_LIMIT: usize = 50;
pub const DEFAULT_Q_THRESHOLD: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryControls {
    pub min_weight: f64,
    pub min_samples: f64,
    pub oncogenes_only: bool,
    pub limit: usize,
    pub test: TestSelector,
    pub q_threshold: f64,
}

impl Default for QueryControls {
    fn default() -> Self {
        Self {
            min_weight: 0.0,
            min_samples: 0.0,
            oncogenes_only: false,
            limit: DEFAULT_LIMIT,
            test: TestSelector::Any,
            q_threshold: DEFAULT_Q_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryContext {
    pub gene: String,
    pub min_weight: f64,
    pub min_samples: f64,
    pub oncogenes_only: bool,
    pub limit: usize,
    pub test: TestSelector,
    pub q_threshold: f64,
}

impl QueryContext {
    pub fn new(gene: &str) -> CoampResult<Self> {
        Self::with_controls(gene, QueryControls::default())
    }

    pub fn with_controls(gene: &str, controls: QueryControls) -> CoampResult<Self> {
        let gene = canonical_label(gene);
        if gene.is_empty() {
            return Err(CoampError::InputInvalid(
                "Please enter a gene name.".to_owned(),
            ));
        }

        let context = Self {
            gene,
            min_weight: controls.min_weight,
            min_samples: controls.min_samples,
            oncogenes_only: controls.oncogenes_only,
            limit: controls.limit,
            test: controls.test,
            q_threshold: controls.q_threshold,
        };
        Ok(context.normalized())
    }

    pub fn normalized(mut self) -> Self {
        self.min_weight = finite_or(self.min_weight, 0.0).clamp(0.0, 1.0);
        self.min_samples = finite_or(self.min_samples, 0.0).max(0.0);
        self.q_threshold = finite_or(self.q_threshold, DEFAULT_Q_THRESHOLD).clamp(0.0, 1.0);
        self
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn dispatch(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        request_id != 0 && request_id == self.latest
    }
}

#[derive(Clone, Debug)]
pub struct GraphSession {
    pub request_id: u64,
    pub context: QueryContext,
    pub graph: Arc<CoampGraph>,
    pub filtered: CoampGraph,
    pub displayed: CoampGraph,
}

impl GraphSession {
    pub fn new(request_id: u64, context: QueryContext, fetched: CoampGraph) -> Self {
        let graph = Arc::new(fetched);
        let filtered = apply_filters(&graph, &context);
        let displayed = select_pinned(&filtered, context.limit, &context.gene);
        Self {
            request_id,
            context,
            graph,
            filtered,
            displayed,
        }
    }

    pub fn refilter(&self, context: QueryContext) -> Self {
        let filtered = apply_filters(&self.graph, &context);
        let displayed = select_pinned(&filtered, context.limit, &context.gene);
        Self {
            request_id: self.request_id,
            context,
            graph: Arc::clone(&self.graph),
            filtered,
            displayed,
        }
    }

    pub fn query_in_graph(&self) -> bool {
        self.displayed.node_by_label(&self.context.gene).is_some()
    }
}
