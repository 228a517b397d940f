use eframe::egui::{self, RichText, Ui};

use crate::coamp::TestSelector;
use crate::util::format_optional;

use super::super::ViewModel;
use super::super::gene_table::SortColumn;
use super::super::graph::node_details;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, test: TestSelector, q_threshold: f64) {
        ui.heading("Selection");
        ui.add_space(4.0);
        self.draw_selection(ui);

        ui.separator();
        let flags = self.significance_flags(test, q_threshold);
        let significant = flags.iter().filter(|flag| **flag).count();
        ui.label(format!(
            "Significant edges ({}, q <= {q_threshold:.4}): {significant} of {}",
            test.label(),
            flags.len()
        ));

        ui.separator();
        ui.heading("Genes");
        self.draw_gene_table(ui);
    }

    fn draw_selection(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a gene in the graph or the table.");
            return;
        };
        let graph = &self.session.displayed;
        let Some(index) = graph.node_index(&selected_id) else {
            ui.label("The selected gene is no longer displayed.");
            return;
        };

        let mut lines = node_details(graph, index, &self.session.context.gene).into_iter();
        if let Some(title) = lines.next() {
            ui.label(RichText::new(title).strong());
        }
        for line in lines {
            ui.label(line);
        }

        if ui.button("Clear selection").clicked() {
            self.set_selected(None);
        }
    }

    fn draw_gene_table(&mut self, ui: &mut Ui) {
        if let Some(message) = self.gene_table.message() {
            ui.label(message);
            return;
        }

        let (active_column, descending) = self.gene_table.sorted_by();
        let mut clicked_column = None;
        let mut clicked_gene = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("gene_table")
                    .striped(true)
                    .num_columns(SortColumn::ALL.len())
                    .show(ui, |ui| {
                        for column in SortColumn::ALL {
                            let arrow = match (column == active_column, descending) {
                                (true, false) => " ^",
                                (true, true) => " v",
                                (false, _) => "",
                            };
                            if ui
                                .button(RichText::new(format!("{}{arrow}", column.title())).strong())
                                .clicked()
                            {
                                clicked_column = Some(column);
                            }
                        }
                        ui.end_row();

                        for row in self.gene_table.rows() {
                            let is_selected =
                                row.id.is_some() && row.id.as_deref() == self.selected.as_deref();
                            ui.label(row.rank.to_string());
                            if ui.selectable_label(is_selected, row.gene.as_str()).clicked() {
                                clicked_gene = Some(row.id.clone());
                            }
                            ui.label(if row.oncogene { "True" } else { "False" });
                            ui.label(format_optional(row.weight));
                            ui.end_row();
                        }
                    });
            });

        if let Some(column) = clicked_column {
            self.gene_table.toggle(column);
        }
        if let Some(id) = clicked_gene {
            self.set_selected(id);
        }
    }
}
