//! Sunburst: concentric rings, angle proportional to weight

use crate::tree::FlatTree;

use super::{AngleRange, Extent, Placement, Rect, sector_bounds, sibling_weights, subtree_depths};

pub(super) fn place(flat: &FlatTree<'_>, area: Rect) -> Vec<Placement> {
    let n = flat.len();
    let deepest = subtree_depths(flat);
    let base = flat.node(0).depth;
    let center = area.center();
    let ring = area.width.min(area.height) / 2.0 / (deepest[0] - base + 1) as f64;

    let mut ranges = vec![AngleRange::FULL; n];
    for idx in 0..n {
        let children = flat.children(idx);
        if children.is_empty() {
            continue;
        }
        let parent = ranges[idx];
        let weights = sibling_weights(flat, children);
        let total: f64 = weights.iter().sum();

        let mut start = parent.start;
        for (i, (&child, weight)) in children.iter().zip(&weights).enumerate() {
            // The last child closes the range exactly
            let end = if i + 1 == children.len() {
                parent.end
            } else {
                start + parent.span() * weight / total
            };
            ranges[child] = AngleRange::new(start, end);
            start = end;
        }
    }

    flat.iter()
        .enumerate()
        .map(|(idx, entry)| {
            let level = (entry.node.depth - base) as f64;
            let inner = level * ring;
            let outer = inner + ring;
            let range = ranges[idx];
            let position = if idx == 0 {
                center
            } else {
                center.polar((inner + outer) / 2.0, range.mid())
            };
            let subtree_outer = ((deepest[idx] - base) as f64 + 1.0) * ring;

            Placement {
                position,
                extent: Extent::Arc {
                    inner_radius: inner,
                    outer_radius: outer,
                },
                bounds: sector_bounds(center, inner, subtree_outer, range),
                angle_range: Some(range),
            }
        })
        .collect()
}
