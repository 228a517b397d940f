use eframe::egui::{Vec2, vec2};

use super::{PhysicsConfig, RenderGraph};

const REPULSION_GAIN: f32 = 4.0;
const SOFTENING: f32 = 400.0;
const SPRING_STIFFNESS: f32 = 0.045;
const CENTER_PULL: f32 = 0.004;
const QUERY_PULL: f32 = 0.03;
const DAMPING: f32 = 0.86;
const MAX_SPEED: f32 = 14.0;

pub(super) fn step_physics(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count < 2 {
        return false;
    }

    let mut forces = vec![Vec2::ZERO; node_count];
    let repulsion_gain = REPULSION_GAIN * config.repulsion_scale.clamp(0.2, 3.0);
    let spring_stiffness = SPRING_STIFFNESS * config.spring_scale.clamp(0.2, 3.0);
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = cache.nodes[i].world_pos - cache.nodes[j].world_pos;
            let distance_sq = delta.length_sq();
            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                let angle =
                    ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin())
            };

            let repulsion = (cache.nodes[i].repulsion + cache.nodes[j].repulsion) * 0.5;
            let push = direction * (repulsion.max(0.0) * repulsion_gain / (distance_sq + SOFTENING));
            forces[i] += push;
            forces[j] -= push;

            let min_distance = cache.nodes[i].radius + cache.nodes[j].radius;
            if distance < min_distance {
                let overlap = direction * ((min_distance - distance) * 0.5);
                forces[i] += overlap;
                forces[j] -= overlap;
            }
        }
    }

    for edge in &cache.edges {
        let (from, to) = (edge.source, edge.target);
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = cache.nodes[from].world_pos - cache.nodes[to].world_pos;
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }
        let correction = (delta / distance) * ((distance - edge.ideal_length) * spring_stiffness);
        forces[from] -= correction;
        forces[to] += correction;
    }

    for (index, force) in forces.iter_mut().enumerate() {
        let position = cache.nodes[index].world_pos;
        *force -= position * CENTER_PULL;
        if Some(index) == cache.query_index {
            *force -= position * QUERY_PULL;
        }
    }

    let damping = DAMPING.powf(time_step_scale);
    let mut any_motion = false;
    for (node, force) in cache.nodes.iter_mut().zip(&forces) {
        let mut velocity = (node.velocity + *force * time_step_scale) * damping;
        let speed = velocity.length();
        if speed > MAX_SPEED {
            velocity *= MAX_SPEED / speed;
        }
        if velocity.length_sq() < 0.0004 && force.length_sq() < 0.0064 {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        any_motion |= velocity != Vec2::ZERO;
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::super::{RenderEdge, RenderNode, ViewScratch};
    use super::*;

    fn node(id: &str, x: f32) -> RenderNode {
        RenderNode {
            id: id.to_owned(),
            label: id.to_owned(),
            oncogene: false,
            world_pos: vec2(x, 0.0),
            velocity: Vec2::ZERO,
            radius: 16.0,
            repulsion: 2900.0,
        }
    }

    fn pair(distance: f32) -> RenderGraph {
        RenderGraph {
            nodes: vec![node("A", -distance * 0.5), node("B", distance * 0.5)],
            edges: vec![RenderEdge {
                edge: 0,
                source: 0,
                target: 1,
                ideal_length: 84.0,
            }],
            index_by_id: HashMap::new(),
            query_index: None,
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
            },
        }
    }

    fn separation(cache: &RenderGraph) -> f32 {
        (cache.nodes[0].world_pos - cache.nodes[1].world_pos).length()
    }

    fn settle(cache: &mut RenderGraph) {
        let config = PhysicsConfig {
            spring_scale: 1.0,
            repulsion_scale: 1.0,
            delta_seconds: 1.0 / 60.0,
        };
        for _ in 0..2000 {
            step_physics(cache, config);
        }
    }

    #[test]
    fn stretched_edge_contracts_and_compressed_edge_expands() {
        let mut stretched = pair(400.0);
        settle(&mut stretched);
        assert!(separation(&stretched) < 200.0);

        let mut compressed = pair(10.0);
        settle(&mut compressed);
        assert!(separation(&compressed) > 60.0);
    }

    #[test]
    fn single_node_never_moves() {
        let mut cache = pair(100.0);
        cache.nodes.truncate(1);
        cache.edges.clear();
        let config = PhysicsConfig {
            spring_scale: 1.0,
            repulsion_scale: 1.0,
            delta_seconds: 1.0 / 60.0,
        };
        assert!(!step_physics(&mut cache, config));
    }
}
