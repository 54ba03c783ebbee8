//! Top-down tree layout

use crate::tree::FlatTree;

use super::{Placement, Point, Rect, subtree_depths};

/// Horizontal slot assignment shared by the tree and radial layouts.
pub(super) struct Slots {
    /// Slot coordinate of each node; leaves sit on whole slots, parents at the
    /// midpoint of their first and last child.
    pub pos: Vec<f64>,
    /// First and last leaf slot covered by each subtree.
    pub span: Vec<(f64, f64)>,
    /// Number of slots including gaps.
    pub total: f64,
}

/// Assign leaves to consecutive slots in pre-order. Adjacent leaves with the
/// same parent are one slot apart, otherwise two, so separate subtrees get
/// visibly more room between them than siblings do.
pub(super) fn assign_slots(flat: &FlatTree<'_>) -> Slots {
    let n = flat.len();
    let mut pos = vec![0.0; n];
    let mut span = vec![(0.0, 0.0); n];
    let mut last: Option<(f64, Option<usize>)> = None;

    for idx in 0..n {
        if !flat.children(idx).is_empty() {
            continue;
        }
        let parent = flat.parent(idx);
        let slot = match last {
            None => 0.0,
            Some((prev, prev_parent)) if prev_parent == parent => prev + 1.0,
            Some((prev, _)) => prev + 2.0,
        };
        last = Some((slot, parent));
        pos[idx] = slot;
        span[idx] = (slot, slot);
    }

    for idx in (0..n).rev() {
        let children = flat.children(idx);
        if let (Some(&head), Some(&tail)) = (children.first(), children.last()) {
            pos[idx] = (pos[head] + pos[tail]) / 2.0;
            span[idx] = (span[head].0, span[tail].1);
        }
    }

    Slots {
        pos,
        span,
        total: last.map_or(1.0, |(slot, _)| slot + 1.0),
    }
}

pub(super) fn place(flat: &FlatTree<'_>, area: Rect) -> Vec<Placement> {
    let slots = assign_slots(flat);
    let deepest = subtree_depths(flat);
    let base = flat.node(0).depth;

    let levels = (deepest[0] - base + 1) as f64;
    let unit = area.width / slots.total;
    let level_height = area.height / levels;
    let radius = (0.4 * unit).min(0.4 * level_height).min(24.0);

    let row = |depth: usize| area.y + ((depth - base) as f64 + 0.5) * level_height;

    flat.iter()
        .enumerate()
        .map(|(idx, entry)| {
            let x = area.x + (slots.pos[idx] + 0.5) * unit;
            let y = row(entry.node.depth);
            let (first, last) = slots.span[idx];

            let mut placement = Placement::circle(Point::new(x, y), radius);
            placement.bounds = Rect::new(
                area.x + first * unit,
                y - radius,
                (last - first + 1.0) * unit,
                row(deepest[idx]) - y + 2.0 * radius,
            );
            placement
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::sample_tree;
    use crate::layout::{LayoutStrategy, Viewport, layout};
    use crate::tree::NodeId;

    #[test]
    fn test_siblings_closer_than_cousins() {
        let root = sample_tree();
        let flat = FlatTree::new(&root);
        let slots = assign_slots(&flat);

        let slot = |id: &str| slots.pos[flat.index_of(&NodeId::from(id)).unwrap()];
        // lib.rs and main.rs share src/ as parent
        assert_eq!(slot("/r/src/main.rs") - slot("/r/src/lib.rs"), 1.0);
        // util/a.rs comes right before lib.rs but has a different parent
        assert_eq!(slot("/r/src/lib.rs") - slot("/r/src/util/a.rs"), 2.0);
    }

    #[test]
    fn test_sibling_order_is_left_to_right() {
        let root = sample_tree();
        let map = layout(&root, LayoutStrategy::Tree, Viewport::new(800.0, 600.0)).unwrap();
        for parent in root.walk() {
            let xs: Vec<f64> = parent
                .children()
                .iter()
                .map(|c| map.get(&c.id).unwrap().position.x)
                .collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "{}: {:?}", parent.id, xs);
        }
    }

    #[test]
    fn test_depth_increases_downwards() {
        let root = sample_tree();
        let map = layout(&root, LayoutStrategy::Tree, Viewport::new(800.0, 600.0)).unwrap();
        let root_y = map.get(&root.id).unwrap().position.y;
        for child in root.children() {
            assert!(map.get(&child.id).unwrap().position.y > root_y);
        }
    }
}
