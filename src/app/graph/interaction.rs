use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_utils::{circle_visible, distance_to_segment, screen_to_world};
use super::super::{Hovered, RenderGraph, ViewModel};

const EDGE_HOVER_DISTANCE: f32 = 4.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible: &mut Vec<usize>,
    ) {
        visible.clear();
        visible.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    /// Nodes win over edges; among nodes the closest centre wins.
    pub(in crate::app) fn hovered_element(ui: &Ui, cache: &RenderGraph) -> Option<Hovered> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        let scratch = &cache.view_scratch;

        let node = scratch
            .visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = scratch.screen_positions[index].distance(pointer);
                (distance <= scratch.screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = node {
            return Some(Hovered::Node(index));
        }

        cache
            .edges
            .iter()
            .filter_map(|edge| {
                let start = *scratch.screen_positions.get(edge.source)?;
                let end = *scratch.screen_positions.get(edge.target)?;
                let distance = distance_to_segment(pointer, start, end);
                (distance <= EDGE_HOVER_DISTANCE).then_some((edge.edge, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(edge, _)| Hovered::Edge(edge))
    }
}
