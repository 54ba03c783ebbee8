//! Radial tree: depth maps to radius, leaf slots map to angle

use std::f64::consts::TAU;

use crate::tree::FlatTree;

use super::tree::assign_slots;
use super::{AngleRange, Placement, Rect, sector_bounds, subtree_depths};

pub(super) fn place(flat: &FlatTree<'_>, area: Rect) -> Vec<Placement> {
    let n = flat.len();
    let slots = assign_slots(flat);
    let deepest = subtree_depths(flat);
    let base = flat.node(0).depth;
    let center = area.center();
    let max_radius = area.width.min(area.height) / 2.0;

    let levels = deepest[0] - base;
    let ring = if levels == 0 {
        0.0
    } else {
        max_radius / (levels as f64 + 0.5)
    };
    let node_radius = if levels == 0 {
        0.4 * max_radius
    } else {
        (0.4 * ring).min(24.0)
    };
    let slot_angle = TAU / slots.total;

    // A child's natural range is the angle of the leaf slots it covers; the
    // gaps between siblings are split at their midpoints so sibling ranges
    // tile the parent's range exactly.
    let natural = |idx: usize| {
        let (first, last) = slots.span[idx];
        AngleRange::new(first * slot_angle, (last + 1.0) * slot_angle)
    };
    let mut ranges = vec![AngleRange::FULL; n];
    for idx in 0..n {
        let children = flat.children(idx);
        let parent = ranges[idx];
        let mut start = parent.start;
        for (i, &child) in children.iter().enumerate() {
            let end = match children.get(i + 1) {
                Some(&next) => (natural(child).end + natural(next).start) / 2.0,
                None => parent.end,
            };
            ranges[child] = AngleRange::new(start, end);
            start = end;
        }
    }

    flat.iter()
        .enumerate()
        .map(|(idx, entry)| {
            let level = (entry.node.depth - base) as f64;
            let radius = level * ring;
            let angle = (slots.pos[idx] + 0.5) * slot_angle;
            let position = if idx == 0 {
                center
            } else {
                center.polar(radius, angle)
            };

            let mut placement = Placement::circle(position, node_radius);
            let outer = (deepest[idx] - base) as f64 * ring + node_radius;
            let sector = sector_bounds(center, radius - node_radius, outer, ranges[idx]);
            placement.bounds = placement.bounds.union(&sector);
            placement.angle_range = Some(ranges[idx]);
            placement
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::layout::test_support::sample_tree;
    use crate::layout::{LayoutStrategy, Viewport, layout};

    #[test]
    fn test_sibling_ranges_tile_parent() {
        let root = sample_tree();
        let map = layout(&root, LayoutStrategy::Radial, Viewport::new(600.0, 600.0)).unwrap();

        for parent in root.walk().filter(|n| !n.children().is_empty()) {
            let range = map.get(&parent.id).unwrap().angle_range.unwrap();
            let kids: Vec<_> = parent
                .children()
                .iter()
                .map(|c| map.get(&c.id).unwrap().angle_range.unwrap())
                .collect();

            assert!((kids[0].start - range.start).abs() < 1e-9);
            assert!((kids[kids.len() - 1].end - range.end).abs() < 1e-9);
            for pair in kids.windows(2) {
                assert!((pair[0].end - pair[1].start).abs() < 1e-9);
                assert!(pair[0].start < pair[1].start, "clockwise order");
            }
        }
    }

    #[test]
    fn test_rings_follow_depth() {
        let root = sample_tree();
        let map = layout(&root, LayoutStrategy::Radial, Viewport::new(600.0, 600.0)).unwrap();
        let center = map.center;
        let main = root.find(&"/r/src/main.rs".into()).unwrap();
        let src = root.find(&"/r/src".into()).unwrap();
        let d_main = map.get(&main.id).unwrap().position.distance(center);
        let d_src = map.get(&src.id).unwrap().position.distance(center);
        assert!(d_main > d_src);
        assert!(map.get(&root.id).unwrap().position.distance(center) < 1e-9);
    }
}
