//! Galaxy layout: nodes strung along logarithmic spiral arms

use std::f64::consts::TAU;

use crate::tree::FlatTree;

use super::{Placement, Rect};

/// Angle advanced per step along an arm, in radians.
const TURN: f64 = 0.45;
/// Growth rate of the spiral `r = a * e^(b * theta)`.
const GROWTH: f64 = 0.18;

/// Place the root at the center and node `i` (pre-order, root excluded) on
/// arm `i % arm_count`, one step further out every `arm_count` nodes. Purely a
/// function of the traversal order, so repeated layouts are identical.
pub(super) fn place(flat: &FlatTree<'_>, area: Rect, arm_count: usize) -> Vec<Placement> {
    let arms = arm_count.max(1);
    let center = area.center();
    let max_radius = area.width.min(area.height) / 2.0;
    let node_radius = (max_radius * 0.02).clamp(2.0, 8.0);
    let dir_radius = node_radius * 1.5;

    let steps = (flat.len().saturating_sub(1)).div_ceil(arms);
    let spiral = |step: usize| (GROWTH * step as f64 * TURN).exp();
    let outermost = spiral(steps.saturating_sub(1));

    let inner = max_radius * 0.1;
    let reach = (max_radius - dir_radius - inner).max(0.0);

    flat.iter()
        .enumerate()
        .map(|(idx, entry)| {
            let r = if entry.node.is_dir() { dir_radius } else { node_radius };
            if idx == 0 {
                return Placement::circle(center, dir_radius);
            }
            let i = idx - 1;
            let arm = i % arms;
            let step = i / arms;

            let t = if outermost > 1.0 {
                (spiral(step) - 1.0) / (outermost - 1.0)
            } else {
                0.0
            };
            let angle = TAU * arm as f64 / arms as f64 + step as f64 * TURN;
            Placement::circle(center.polar(inner + reach * t, angle), r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::layout::test_support::sample_tree;
    use crate::layout::{LayoutEngine, LayoutOptions, LayoutStrategy, Viewport};

    fn engine(arm_count: usize) -> LayoutEngine {
        LayoutEngine::new(LayoutOptions {
            arm_count,
            ..LayoutOptions::default()
        })
    }

    #[test]
    fn test_root_at_center() {
        let root = sample_tree();
        let map = engine(3)
            .layout(&root, LayoutStrategy::Galaxy, Viewport::new(500.0, 500.0))
            .unwrap();
        let g = map.get(&root.id).unwrap();
        assert!(g.position.distance(map.center) < 1e-9);
    }

    #[test]
    fn test_same_input_same_output() {
        let root = sample_tree();
        let viewport = Viewport::new(500.0, 400.0);
        let a = engine(4).layout(&root, LayoutStrategy::Galaxy, viewport).unwrap();
        let b = engine(4).layout(&root, LayoutStrategy::Galaxy, viewport).unwrap();
        for node in root.walk() {
            assert_eq!(a.get(&node.id), b.get(&node.id));
        }
    }

    #[test]
    fn test_arm_count_changes_placement() {
        let root = sample_tree();
        let viewport = Viewport::new(500.0, 500.0);
        let two = engine(2).layout(&root, LayoutStrategy::Galaxy, viewport).unwrap();
        let five = engine(5).layout(&root, LayoutStrategy::Galaxy, viewport).unwrap();
        let id = &root.children()[1].id;
        assert_ne!(two.get(id).unwrap().position, five.get(id).unwrap().position);
    }

    #[test]
    fn test_nodes_stay_inside_viewport() {
        let root = sample_tree();
        let viewport = Viewport::new(300.0, 300.0);
        let map = engine(1).layout(&root, LayoutStrategy::Galaxy, viewport).unwrap();
        for node in root.walk() {
            let g = map.get(&node.id).unwrap();
            assert!(viewport.rect().contains(&g.shape_bounds(map.center)));
        }
    }
}
