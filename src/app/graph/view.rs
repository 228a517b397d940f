use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::coamp::{CoampGraph, TestName, TestSelector, recompute_classification};
use crate::util::format_optional;

use super::super::physics::step_physics;
use super::super::render_utils::{
    EDGE_COLOR, HIGHLIGHT_COLOR, NODE_COLOR, ONCOGENE_COLOR, SEARCH_COLOR,
    SIGNIFICANT_EDGE_COLOR, blend_color, dim_color, draw_background, edge_visible,
    world_to_screen,
};
use super::super::{
    Hovered, PhysicsConfig, RenderGraph, SearchMatchCache, SignificanceCache, ViewModel,
};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

pub(in crate::app) fn node_details(graph: &CoampGraph, index: usize, query_gene: &str) -> Vec<String> {
    let Some(node) = graph.nodes().get(index) else {
        return Vec::new();
    };

    let mut lines = vec![
        node.label.clone(),
        format!("Oncogene: {}", if node.oncogene { "yes" } else { "no" }),
        format!(
            "Location: {}",
            node.location
                .as_ref()
                .map_or_else(|| "N/A".to_owned(), ToString::to_string)
        ),
        format!("ecDNA samples: {}", node.samples.len()),
    ];

    if node.label != query_gene {
        let weight = graph
            .node_by_label(query_gene)
            .and_then(|query| graph.edge_between(&node.id, &query.id))
            .and_then(|edge| edge.weight);
        lines.push(format!(
            "Co-amplification with {query_gene}: {}",
            format_optional(weight)
        ));
    }
    let mut linked = graph
        .incident_edges(&node.id)
        .filter_map(|edge| edge.other_end(&node.id))
        .filter_map(|id| graph.node(id))
        .map(|neighbour| neighbour.label.as_str())
        .collect::<Vec<_>>();
    linked.sort_unstable();
    linked.dedup();
    lines.push(format!("Linked genes in view: {}", linked.len()));
    if !linked.is_empty() {
        lines.push(format!("  {}", linked.join(", ")));
    }

    lines
}

pub(in crate::app) fn edge_details(graph: &CoampGraph, edge_index: usize, significant: bool) -> Vec<String> {
    let Some(edge) = graph.edges().get(edge_index) else {
        return Vec::new();
    };
    let label_of = |id: &str| {
        graph
            .node(id)
            .map_or_else(|| id.to_owned(), |node| node.label.clone())
    };

    let mut lines = vec![
        format!("{} - {}", label_of(&edge.source), label_of(&edge.target)),
        format!("Co-amplification frequency: {}", format_optional(edge.weight)),
        format!(
            "Intersection / union samples: {} / {}",
            edge.inter.len(),
            edge.union.len()
        ),
        format!(
            "Distance: {}",
            edge.distance_bp
                .map_or_else(|| "N/A".to_owned(), |distance| format!("{distance} bp"))
        ),
    ];
    for test in TestName::ALL {
        let stats = edge.stats(test);
        lines.push(format!(
            "{}: p {}  q {}  OR {}",
            test.label(),
            format_optional(stats.p_value),
            format_optional(stats.q_value),
            format_optional(stats.odds_ratio)
        ));
    }
    if significant {
        lines.push("Significant under the selected test".to_owned());
    }

    lines
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for render_node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, render_node.world_pos));
            scratch
                .screen_radii
                .push((render_node.radius * zoom).clamp(3.0, 90.0));
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, &node.label, search_query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn significance_flags(
        &mut self,
        test: TestSelector,
        threshold: f64,
    ) -> Arc<[bool]> {
        let threshold_bits = threshold.to_bits();
        if let Some(cached) = &self.significance_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.test == test
            && cached.threshold_bits == threshold_bits
        {
            return Arc::clone(&cached.flags);
        }

        let flags: Arc<[bool]> =
            recompute_classification(&self.session.displayed, test, threshold).into();
        self.significance_cache = Some(SignificanceCache {
            graph_revision: self.render_graph_revision,
            test,
            threshold_bits,
            flags: Arc::clone(&flags),
        });
        flags
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, test: TestSelector, q_threshold: f64) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.cached_search_matches();
        let significant = self.significance_flags(test, q_threshold);
        let pan = self.pan;
        let zoom = self.zoom;
        let physics = PhysicsConfig {
            spring_scale: self.spring_scale,
            repulsion_scale: self.repulsion_scale,
            delta_seconds: ui
                .ctx()
                .input(|input| input.stable_dt)
                .clamp(1.0 / 240.0, 1.0 / 20.0),
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No genes passed the current filters.",
                FontId::proportional(15.0),
                Color32::from_gray(90),
            );
            return;
        };

        let physics_moving = self.live_physics && step_physics(cache, physics);
        if physics_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, cache);
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );

        let hovered = Self::hovered_element(ui, cache);
        if matches!(hovered, Some(Hovered::Node(_))) {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let pending_selection = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| match hovered {
                Some(Hovered::Node(index)) => cache.nodes.get(index).map(|node| node.id.clone()),
                _ => None,
            });

        let selected_index = self
            .selected
            .as_ref()
            .and_then(|id| cache.index_by_id.get(id).copied());
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let zoom_sqrt = zoom.sqrt();

        for edge in &cache.edges {
            let start = cache.view_scratch.screen_positions[edge.source];
            let end = cache.view_scratch.screen_positions[edge.target];
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let is_significant = significant.get(edge.edge).copied().unwrap_or(false);
            let touches_selected = selected_index
                .is_some_and(|index| index == edge.source || index == edge.target);
            let is_hovered = matches!(hovered, Some(Hovered::Edge(index)) if index == edge.edge);

            let (width, color) = if touches_selected {
                (3.0, HIGHLIGHT_COLOR)
            } else if is_significant {
                (3.0, SIGNIFICANT_EDGE_COLOR)
            } else if selected_index.is_some() {
                (1.0, dim_color(EDGE_COLOR, 0.6))
            } else {
                (1.0, EDGE_COLOR)
            };
            let width = (width * zoom_sqrt).clamp(0.6, 6.0) + if is_hovered { 1.5 } else { 0.0 };

            painter.line_segment([start, end], Stroke::new(width, color));
        }

        // query gene on top, then oncogenes, then the rest
        let mut draw_order = cache.view_scratch.visible_indices.clone();
        draw_order.sort_by_key(|&index| {
            (
                Some(index) == cache.query_index,
                cache.nodes[index].oncogene,
            )
        });

        let mut selection_animating = false;
        for index in draw_order {
            let render_node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_query = Some(index) == cache.query_index;
            let is_selected = selected_index == Some(index);
            let is_hovered = matches!(hovered, Some(Hovered::Node(hovered)) if hovered == index);
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = if is_query || render_node.oncogene {
                ONCOGENE_COLOR
            } else {
                NODE_COLOR
            };
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.3)
            } else if is_search_match {
                blend_color(base_color, SEARCH_COLOR, 0.6)
            } else if search_active {
                dim_color(base_color, 0.55)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("gene-selection", render_node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }
            let color = blend_color(unselected_color, HIGHLIGHT_COLOR, selection_mix);

            painter.circle_filled(position, radius, color);
            let outline = if is_query {
                Stroke::new(3.0, Color32::from_rgb(120, 20, 30))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(40, 40, 40, 160))
            };
            painter.circle_stroke(position, radius, outline);

            if is_query || is_selected || is_hovered || radius >= 10.0 {
                let (font, text_color) = if is_query || render_node.oncogene {
                    (
                        FontId::proportional(if is_query { 14.0 } else { 12.0 }),
                        Color32::WHITE,
                    )
                } else {
                    (FontId::proportional(12.0), Color32::from_gray(40))
                };
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    &render_node.label,
                    font,
                    text_color,
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        let details = match hovered {
            Some(Hovered::Node(index)) => {
                node_details(&self.session.displayed, index, &self.session.context.gene)
            }
            Some(Hovered::Edge(edge)) => edge_details(
                &self.session.displayed,
                edge,
                significant.get(edge).copied().unwrap_or(false),
            ),
            None => Vec::new(),
        };
        if !details.is_empty() {
            let galley = painter.layout_no_wrap(
                details.join("\n"),
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
            let box_rect = Rect::from_min_size(
                rect.left_top() + vec2(10.0, 10.0),
                galley.size() + vec2(16.0, 12.0),
            );
            painter.rect_filled(box_rect, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 235));
            painter.rect_stroke(
                box_rect,
                4.0,
                Stroke::new(1.0, Color32::from_gray(190)),
                StrokeKind::Inside,
            );
            painter.galley(box_rect.min + vec2(8.0, 6.0), galley, Color32::from_gray(30));
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
    }
}
