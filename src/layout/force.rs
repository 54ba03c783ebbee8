//! Force-directed layout as a bounded simulation

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::FlatTree;

use super::{Extent, Placement, Point, Rect, radial};

/// Simulation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    /// Strength of the inverse-square repulsion between every pair of nodes.
    pub repulsion: f64,
    /// Spring constant along parent-child edges.
    pub spring: f64,
    /// Base rest length of an edge; scaled up by the target's file count.
    pub link_distance: f64,
    /// Largest move a node may make in the first iteration. Cools linearly
    /// to zero over `max_iterations`.
    pub max_step: f64,
    /// Converged once no node moves farther than this in one iteration.
    pub threshold: f64,
    pub max_iterations: usize,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            repulsion: 800.0,
            spring: 0.05,
            link_distance: 30.0,
            max_step: 12.0,
            threshold: 0.5,
            max_iterations: 300,
        }
    }
}

/// Result of running the simulation.
pub(super) struct Simulation {
    pub positions: Vec<Point>,
    pub iterations: usize,
    pub converged: bool,
}

pub(super) fn place(flat: &FlatTree<'_>, area: Rect, params: &ForceParams) -> Vec<Placement> {
    // Start from the radial layout: deterministic and already untangled
    let initial = radial::place(flat, area);
    let start: Vec<Point> = initial.iter().map(|p| p.position).collect();
    let radius = initial.first().map_or(4.0, |p| match p.extent {
        Extent::Radius { radius } => radius,
        _ => 4.0,
    });

    let sim = simulate(flat, start, area.inset(radius), params);
    debug!(iterations = sim.iterations, converged = sim.converged, "force simulation finished");

    sim.positions
        .into_iter()
        .map(|p| Placement::circle(p, radius))
        .collect()
}

pub(super) fn simulate(
    flat: &FlatTree<'_>,
    mut positions: Vec<Point>,
    bounds: Rect,
    params: &ForceParams,
) -> Simulation {
    let springs: Vec<(usize, usize, f64)> = flat
        .edges()
        .map(|(p, c)| {
            let files = flat.node(c).file_count as f64;
            (p, c, params.link_distance * (1.0 + (1.0 + files).ln()))
        })
        .collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < params.max_iterations {
        let temperature =
            params.max_step * (1.0 - iterations as f64 / params.max_iterations as f64);
        iterations += 1;

        // Every node reads the same snapshot; positions change only below
        let mut forces: Vec<(f64, f64)> = positions
            .par_iter()
            .enumerate()
            .map(|(i, &pi)| repulsion_on(i, pi, &positions, params.repulsion))
            .collect();

        for &(p, c, rest) in &springs {
            let dx = positions[c].x - positions[p].x;
            let dy = positions[c].y - positions[p].y;
            let dist = dx.hypot(dy).max(0.01);
            let pull = params.spring * (dist - rest);
            let (ux, uy) = (dx / dist, dy / dist);
            forces[p].0 += pull * ux;
            forces[p].1 += pull * uy;
            forces[c].0 -= pull * ux;
            forces[c].1 -= pull * uy;
        }

        let mut max_move = 0.0f64;
        // Index 0 is the root and stays pinned
        for (pos, &(fx, fy)) in positions.iter_mut().zip(&forces).skip(1) {
            let magnitude = fx.hypot(fy);
            let scale = if magnitude > temperature {
                temperature / magnitude
            } else {
                1.0
            };
            let next = Point::new(
                (pos.x + fx * scale).max(bounds.x).min(bounds.right()),
                (pos.y + fy * scale).max(bounds.y).min(bounds.bottom()),
            );
            max_move = max_move.max(next.distance(*pos));
            *pos = next;
        }

        if max_move < params.threshold {
            converged = true;
            break;
        }
    }

    Simulation {
        positions,
        iterations,
        converged,
    }
}

fn repulsion_on(i: usize, pi: Point, positions: &[Point], strength: f64) -> (f64, f64) {
    let mut fx = 0.0;
    let mut fy = 0.0;
    for (j, pj) in positions.iter().enumerate() {
        if i == j {
            continue;
        }
        let mut dx = pi.x - pj.x;
        let mut dy = pi.y - pj.y;
        let mut d2 = dx * dx + dy * dy;
        if d2 < 1e-4 {
            // Coincident nodes: separate them along a direction fixed by index
            dx = if i < j { -0.01 } else { 0.01 };
            dy = 0.0;
            d2 = dx * dx;
        }
        let dist = d2.sqrt();
        let push = strength / d2;
        fx += push * dx / dist;
        fy += push * dy / dist;
    }
    (fx, fy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::sample_tree;
    use crate::layout::{LayoutStrategy, Viewport, layout};

    #[test]
    fn test_simulation_terminates_within_cap() {
        let root = sample_tree();
        let flat = FlatTree::new(&root);
        let params = ForceParams {
            max_iterations: 25,
            threshold: 0.0,
            ..ForceParams::default()
        };
        let start = vec![Point::new(100.0, 100.0); flat.len()];
        let sim = simulate(&flat, start, Rect::new(0.0, 0.0, 400.0, 400.0), &params);
        assert_eq!(sim.iterations, 25);
        assert!(!sim.converged);
    }

    #[test]
    fn test_root_stays_pinned() {
        let root = sample_tree();
        let flat = FlatTree::new(&root);
        let start: Vec<Point> = (0..flat.len())
            .map(|i| Point::new(200.0 + i as f64, 200.0 - i as f64))
            .collect();
        let sim = simulate(&flat, start.clone(), Rect::new(0.0, 0.0, 400.0, 400.0), &ForceParams::default());
        assert_eq!(sim.positions[0], start[0]);
    }

    #[test]
    fn test_coincident_nodes_are_separated() {
        let root = sample_tree();
        let flat = FlatTree::new(&root);
        let start = vec![Point::new(200.0, 200.0); flat.len()];
        let sim = simulate(&flat, start, Rect::new(0.0, 0.0, 400.0, 400.0), &ForceParams::default());
        let spread = sim
            .positions
            .iter()
            .skip(1)
            .any(|p| p.distance(Point::new(200.0, 200.0)) > 1.0);
        assert!(spread);
    }

    #[test]
    fn test_force_layout_is_deterministic_and_in_viewport() {
        let root = sample_tree();
        let viewport = Viewport::new(640.0, 480.0);
        let a = layout(&root, LayoutStrategy::Force, viewport).unwrap();
        let b = layout(&root, LayoutStrategy::Force, viewport).unwrap();
        for node in root.walk() {
            let g = a.get(&node.id).unwrap();
            assert_eq!(Some(g), b.get(&node.id));
            assert!(viewport.rect().contains_point(g.position));
        }
    }
}
