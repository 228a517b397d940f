use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Vec2};
use tracing::debug;

use crate::coamp::{GraphSession, LayoutParams, QueryContext, TestSelector};

use super::super::gene_table::GeneTable;
use super::super::{AppState, CoampApp, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(session: GraphSession) -> Self {
        let layout = LayoutParams::compute(&session.displayed, &session.context.gene);
        let gene_table = GeneTable::build(&session);

        Self {
            session,
            layout,
            selected: None,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            spring_scale: 1.0,
            repulsion_scale: 1.0,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            significance_cache: None,
            gene_table,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, test: TestSelector, q_threshold: f64) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui, test, q_threshold));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui, test, q_threshold));
    }

    pub(in crate::app) fn apply_context(&mut self, context: QueryContext) {
        debug!(
            limit = context.limit,
            min_weight = context.min_weight,
            min_samples = context.min_samples,
            oncogenes_only = context.oncogenes_only,
            "re-applying filters"
        );
        self.session = self.session.refilter(context);
        self.gene_table = GeneTable::build(&self.session);
        if let Some(selected) = &self.selected
            && self.session.displayed.node(selected).is_none()
        {
            self.selected = None;
        }
        self.graph_dirty = true;
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }
}

impl CoampApp {
    pub(in crate::app) fn draw_top_bar(&self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("coamp-graph");
                    ui.separator();
                    ui.label(format!("source: {}", self.source.describe()));

                    if let AppState::Ready(model) = &self.state {
                        let session = &model.session;
                        ui.label(format!("gene: {}", session.context.gene));
                        ui.label(format!(
                            "showing {} genes / {} edges ({} pass filters, {} fetched)",
                            session.displayed.node_count(),
                            session.displayed.edge_count(),
                            session.filtered.edge_count(),
                            session.graph.edge_count()
                        ));
                    }

                    if let Some(context) = &self.in_flight {
                        ui.spinner();
                        ui.label(format!("loading {}...", context.gene));
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(status) = &self.status {
                            let color = if status.is_error {
                                Color32::from_rgb(200, 40, 50)
                            } else {
                                Color32::from_rgb(30, 130, 60)
                            };
                            ui.label(RichText::new(status.text.as_str()).color(color));
                        }
                    });
                });
            });
    }
}
