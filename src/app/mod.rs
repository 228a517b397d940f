use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{debug, info, warn};

use crate::LaunchOptions;
use crate::coamp::{
    CoampGraph, CoampResult, GraphSession, GraphSource, LayoutParams, QueryContext,
    QueryControls, RequestSequence, TestSelector, write_export,
};

mod gene_table;
mod graph;
mod physics;
mod render_utils;
mod ui;

use gene_table::GeneTable;

type FetchResponse = (u64, Result<CoampGraph, String>);

pub struct CoampApp {
    source: Arc<dyn GraphSource>,
    export_dir: PathBuf,
    form: QueryForm,
    requests: RequestSequence,
    responses_tx: Sender<FetchResponse>,
    responses_rx: Receiver<FetchResponse>,
    in_flight: Option<QueryContext>,
    last_context: Option<QueryContext>,
    state: AppState,
    status: Option<StatusLine>,
}

enum AppState {
    Idle,
    Loading { gene: String },
    Ready(Box<ViewModel>),
    Error(String),
}

struct QueryForm {
    gene: String,
    controls: QueryControls,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControlAction {
    Load,
    ApplyFilters,
    Export,
}

struct StatusLine {
    text: String,
    is_error: bool,
}

struct ViewModel {
    session: GraphSession,
    layout: LayoutParams,
    selected: Option<String>,
    search: String,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    spring_scale: f32,
    repulsion_scale: f32,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    significance_cache: Option<SignificanceCache>,
    gene_table: GeneTable,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct SignificanceCache {
    graph_revision: u64,
    test: TestSelector,
    threshold_bits: u64,
    flags: Arc<[bool]>,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
    query_index: Option<usize>,
    view_scratch: ViewScratch,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

struct RenderNode {
    id: String,
    label: String,
    oncogene: bool,
    world_pos: Vec2,
    velocity: Vec2,
    radius: f32,
    repulsion: f32,
}

struct RenderEdge {
    /// Index into `session.displayed.edges()`.
    edge: usize,
    source: usize,
    target: usize,
    ideal_length: f32,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    spring_scale: f32,
    repulsion_scale: f32,
    delta_seconds: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hovered {
    Node(usize),
    Edge(usize),
}

impl QueryForm {
    fn from_options(options: &LaunchOptions) -> Self {
        let mut controls = options.controls;
        controls.min_weight = controls.min_weight.clamp(0.0, 1.0);
        controls.min_samples = controls.min_samples.max(0.0);
        controls.q_threshold = controls.q_threshold.clamp(0.0, 1.0);
        Self {
            gene: options.gene.clone(),
            controls,
        }
    }

    fn context(&self) -> CoampResult<QueryContext> {
        self.context_for(&self.gene)
    }

    fn context_for(&self, gene: &str) -> CoampResult<QueryContext> {
        QueryContext::with_controls(gene, self.controls)
    }
}

impl CoampApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: LaunchOptions) -> Self {
        let mut app = Self::with_options(&options);
        if !app.form.gene.trim().is_empty() {
            app.request_load();
        }
        app
    }

    fn with_options(options: &LaunchOptions) -> Self {
        let (responses_tx, responses_rx) = mpsc::channel();
        Self {
            source: options.source.clone(),
            export_dir: options.export_dir.clone(),
            form: QueryForm::from_options(options),
            requests: RequestSequence::default(),
            responses_tx,
            responses_rx,
            in_flight: None,
            last_context: None,
            state: AppState::Idle,
            status: None,
        }
    }

    fn request_load(&mut self) {
        match self.form.context() {
            Ok(context) => {
                self.form.gene = context.gene.clone();
                self.dispatch(context);
            }
            Err(error) => self.set_status(error.to_string(), true),
        }
    }

    fn dispatch(&mut self, context: QueryContext) {
        let request_id = self.requests.dispatch();
        info!(request = request_id, gene = %context.gene, "dispatching graph fetch");

        let source = Arc::clone(&self.source);
        let tx = self.responses_tx.clone();
        let worker_context = context.clone();
        thread::spawn(move || {
            let result = source
                .fetch(&worker_context)
                .map_err(|error| error.to_string());
            let _ = tx.send((request_id, result));
        });

        if !matches!(self.state, AppState::Ready(_)) {
            self.state = AppState::Loading {
                gene: context.gene.clone(),
            };
        }
        self.last_context = Some(context.clone());
        self.in_flight = Some(context);
        self.status = None;
    }

    fn poll_responses(&mut self) {
        while let Ok((request_id, result)) = self.responses_rx.try_recv() {
            if !self.requests.is_current(request_id) {
                debug!(
                    request = request_id,
                    latest = self.requests.latest(),
                    "discarding stale graph response"
                );
                continue;
            }
            let Some(context) = self.in_flight.take() else {
                continue;
            };

            self.state = match result {
                Ok(graph) => {
                    info!(
                        request = request_id,
                        gene = %context.gene,
                        nodes = graph.node_count(),
                        edges = graph.edge_count(),
                        "graph loaded"
                    );
                    let session = GraphSession::new(request_id, context, graph);
                    if !session.query_in_graph() {
                        warn!(gene = %session.context.gene, "query gene is missing from the fetched graph");
                    }
                    AppState::Ready(Box::new(ViewModel::new(session)))
                }
                Err(error) => {
                    warn!(request = request_id, %error, "graph fetch failed");
                    AppState::Error(error)
                }
            };
        }
    }

    fn apply_filters(&mut self) {
        let AppState::Ready(model) = &mut self.state else {
            self.set_status("Load a graph before applying filters.".to_owned(), true);
            return;
        };

        match self.form.context_for(&model.session.context.gene) {
            Ok(context) => model.apply_context(context),
            Err(error) => self.set_status(error.to_string(), true),
        }
    }

    fn export(&mut self) {
        let AppState::Ready(model) = &self.state else {
            self.set_status(
                "No graph data available. Please load a graph first.".to_owned(),
                true,
            );
            return;
        };

        let session = &model.session;
        match write_export(&self.export_dir, &session.displayed, &session.context.gene) {
            Ok(path) => self.set_status(format!("Exported {}", path.display()), false),
            Err(error) => {
                warn!(%error, "export failed");
                self.set_status(error.to_string(), true);
            }
        }
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(StatusLine { text, is_error });
    }
}

impl eframe::App for CoampApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_responses();
        if self.in_flight.is_some() {
            ctx.request_repaint();
        }

        self.draw_top_bar(ctx);

        let action = egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui))
            .inner;

        let mut retry = false;
        let test = self.form.controls.test;
        let q_threshold = self.form.controls.q_threshold;
        match &mut self.state {
            AppState::Idle => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Enter a gene and press Load graph");
                    });
                });
            }
            AppState::Loading { gene } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading co-amplification graph for {gene}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load co-amplification graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => model.show(ctx, test, q_threshold),
        }

        if retry && let Some(context) = self.last_context.clone() {
            self.dispatch(context);
        }

        match action {
            Some(ControlAction::Load) => self.request_load(),
            Some(ControlAction::ApplyFilters) => self.apply_filters(),
            Some(ControlAction::Export) => self.export(),
            None => {}
        }
    }
}
