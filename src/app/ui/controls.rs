use eframe::egui::{self, Key, Ui, Vec2};

use crate::coamp::TestSelector;

use super::super::{AppState, CoampApp, ControlAction, ViewModel};

const IDLE_SAMPLE_MAX: f64 = 50.0;
const IDLE_LIMIT_MAX: usize = 200;

impl CoampApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) -> Option<ControlAction> {
        let mut action = None;

        ui.heading("Query");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Gene");
        let gene_response = ui
            .text_edit_singleline(&mut self.form.gene)
            .on_hover_text("Gene symbol, e.g. MYC. Press Enter to load.");
        if gene_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
            action = Some(ControlAction::Load);
        }

        let (sample_max, limit_max) = match &self.state {
            AppState::Ready(model) => (
                (model.session.graph.max_union_samples() as f64).max(1.0),
                model.session.graph.edge_count().max(1),
            ),
            _ => (IDLE_SAMPLE_MAX, IDLE_LIMIT_MAX.max(self.form.controls.limit)),
        };

        ui.add(egui::Slider::new(&mut self.form.controls.min_weight, 0.0..=1.0).text("Min frequency"))
            .on_hover_text("Drop edges whose co-amplification frequency is below this value.");
        ui.add(
            egui::Slider::new(&mut self.form.controls.min_samples, 0.0..=sample_max)
                .step_by(1.0)
                .text("Min samples"),
        )
        .on_hover_text("Drop edges seen in fewer ecDNA samples than this.");
        ui.checkbox(&mut self.form.controls.oncogenes_only, "Oncogenes only")
            .on_hover_text("Keep only edges between oncogenes and the query gene.");
        ui.add(egui::Slider::new(&mut self.form.controls.limit, 0..=limit_max).text("Display limit"))
            .on_hover_text("Number of heaviest edges to draw and export.");

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let loading = self.in_flight.is_some();
            if ui
                .add_enabled(!loading, egui::Button::new("Load graph"))
                .clicked()
            {
                action = Some(ControlAction::Load);
            }
            if ui.button("Apply filters").clicked() {
                action = Some(ControlAction::ApplyFilters);
            }
        });

        ui.separator();
        ui.heading("Significance");
        egui::ComboBox::from_label("Test")
            .selected_text(self.form.controls.test.label())
            .show_ui(ui, |ui| {
                for selector in TestSelector::ALL {
                    ui.selectable_value(&mut self.form.controls.test, selector, selector.label());
                }
            });
        ui.add(
            egui::Slider::new(&mut self.form.controls.q_threshold, 0.0..=1.0)
                .logarithmic(true)
                .smallest_positive(0.0001)
                .text("q-value threshold"),
        )
        .on_hover_text("Edges with a q-value at or below this are drawn highlighted.");

        ui.separator();
        if ui
            .add_enabled(
                matches!(self.state, AppState::Ready(_)),
                egui::Button::new("Export CSV"),
            )
            .on_hover_text(format!("Write the displayed genes to {}", self.export_dir.display()))
            .clicked()
        {
            action = Some(ControlAction::Export);
        }

        if let AppState::Ready(model) = &mut self.state {
            ui.separator();
            model.draw_view_controls(ui);
        }

        action
    }
}

impl ViewModel {
    fn draw_view_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.label("Search genes")
            .on_hover_text("Fuzzy-highlight matching genes without changing the graph.");
        ui.text_edit_singleline(&mut self.search);

        ui.checkbox(&mut self.live_physics, "Live layout")
            .on_hover_text("Keep running the spring layout while viewing the graph.");

        ui.collapsing("Layout tuning", |ui| {
            ui.add(
                egui::Slider::new(&mut self.spring_scale, 0.2..=3.0)
                    .text("Spring")
                    .clamping(egui::SliderClamping::Always),
            );
            ui.add(
                egui::Slider::new(&mut self.repulsion_scale, 0.2..=3.0)
                    .text("Repulsion")
                    .clamping(egui::SliderClamping::Always),
            );
        });

        if ui.button("Reset view").clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
        }
    }
}
