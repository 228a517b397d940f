use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::coamp::{LayoutParams, Node};
use crate::util::stable_pair;

use super::super::{RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch};

const INITIAL_SPREAD: f32 = 140.0;

impl ViewModel {
    fn make_render_node(node: &Node, index: usize, size: f64, repulsion: f64, is_query: bool) -> RenderNode {
        let world_pos = if is_query {
            Vec2::ZERO
        } else {
            let (jx, jy) = stable_pair(&node.id);
            let mut direction = vec2(jx, jy);
            if direction.length_sq() <= 0.0001 {
                let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
                direction = vec2(angle.cos(), angle.sin());
            }
            direction * INITIAL_SPREAD
        };

        RenderNode {
            id: node.id.clone(),
            label: node.label.clone(),
            oncogene: node.oncogene,
            world_pos,
            velocity: Vec2::ZERO,
            radius: (size * 0.5) as f32,
            repulsion: repulsion as f32,
        }
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.significance_cache = None;

        let graph = &self.session.displayed;
        self.layout = LayoutParams::compute(graph, &self.session.context.gene);

        if graph.is_empty() {
            self.graph_cache = None;
            self.graph_dirty = false;
            return;
        }

        let query_index = graph
            .node_by_label(&self.session.context.gene)
            .and_then(|node| graph.node_index(&node.id));

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let mut index_by_id = HashMap::with_capacity(graph.node_count());
        let mut nodes = Vec::with_capacity(graph.node_count());
        for (index, node) in graph.nodes().iter().enumerate() {
            let size = self.layout.sizes[index];
            let repulsion = self.layout.repulsion[index];
            let render_node = match prior_nodes.remove(&node.id) {
                Some(mut prior) => {
                    prior.radius = (size * 0.5) as f32;
                    prior.repulsion = repulsion as f32;
                    prior
                }
                None => Self::make_render_node(
                    node,
                    index,
                    size,
                    repulsion,
                    query_index == Some(index),
                ),
            };
            index_by_id.insert(node.id.clone(), index);
            nodes.push(render_node);
        }

        let edges = graph
            .edges()
            .iter()
            .zip(&self.layout.edge_lengths)
            .enumerate()
            .filter_map(|(edge_index, (edge, length))| {
                Some(RenderEdge {
                    edge: edge_index,
                    source: *index_by_id.get(&edge.source)?,
                    target: *index_by_id.get(&edge.target)?,
                    ideal_length: *length as f32,
                })
            })
            .collect();

        self.graph_cache = Some(RenderGraph {
            nodes,
            edges,
            index_by_id,
            query_index,
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
            },
        });
        self.graph_dirty = false;
    }
}
