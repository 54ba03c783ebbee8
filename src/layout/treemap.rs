//! Squarified treemap

use crate::tree::FlatTree;

use super::{Extent, Placement, Rect, sibling_weights};

pub(super) fn place(flat: &FlatTree<'_>, area: Rect) -> Vec<Placement> {
    let n = flat.len();
    let mut rects = vec![Rect::default(); n];
    rects[0] = area;

    // Pre-order: every parent's rectangle is final before its children split it
    for idx in 0..n {
        let children = flat.children(idx);
        if children.is_empty() {
            continue;
        }
        let weights = sibling_weights(flat, children);
        let items: Vec<(usize, f64)> = children.iter().copied().zip(weights).collect();
        for (child, rect) in squarify(&items, rects[idx]) {
            rects[child] = rect;
        }
    }

    rects
        .into_iter()
        .map(|rect| Placement {
            position: rect.center(),
            extent: Extent::Rect {
                width: rect.width,
                height: rect.height,
            },
            bounds: rect,
            angle_range: None,
        })
        .collect()
}

/// Split `rect` into tiles with areas proportional to the item weights,
/// keeping aspect ratios close to 1. The tiles cover `rect` exactly: the last
/// tile of each row and the last row absorb rounding.
pub(super) fn squarify(items: &[(usize, f64)], rect: Rect) -> Vec<(usize, Rect)> {
    if items.is_empty() {
        return Vec::new();
    }
    let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    let area = rect.area();

    let mut sorted: Vec<(usize, f64)> = items
        .iter()
        .map(|&(id, w)| {
            let share = if total > 0.0 {
                w.max(0.0) / total
            } else {
                1.0 / items.len() as f64
            };
            (id, share * area)
        })
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut out = Vec::with_capacity(items.len());
    let mut remaining = rect;
    let mut start = 0;
    while start < sorted.len() {
        let side = remaining.width.min(remaining.height);
        let mut end = start + 1;
        let mut current = worst_ratio(&sorted[start..end], side);
        while end < sorted.len() {
            let next = worst_ratio(&sorted[start..=end], side);
            if next > current {
                break;
            }
            current = next;
            end += 1;
        }
        remaining = lay_row(&sorted[start..end], remaining, end == sorted.len(), &mut out);
        start = end;
    }
    out
}

/// Worst aspect ratio among a row laid along a side of length `side`.
fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let (min, max) = row
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &(_, a)| (lo.min(a), hi.max(a)));
    if min <= 0.0 {
        return f64::INFINITY;
    }
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Lay one row along the shorter side of `rect` and return what is left.
fn lay_row(row: &[(usize, f64)], rect: Rect, last_row: bool, out: &mut Vec<(usize, Rect)>) -> Rect {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    let vertical = rect.width >= rect.height;
    let (along, across) = if vertical {
        (rect.height, rect.width)
    } else {
        (rect.width, rect.height)
    };

    let thickness = if last_row {
        across
    } else if along > 0.0 {
        (sum / along).min(across)
    } else {
        0.0
    };

    let mut offset = 0.0;
    for (i, &(id, a)) in row.iter().enumerate() {
        let length = if i + 1 == row.len() {
            (along - offset).max(0.0)
        } else if thickness > 0.0 {
            a / thickness
        } else {
            0.0
        };
        let tile = if vertical {
            Rect::new(rect.x, rect.y + offset, thickness, length)
        } else {
            Rect::new(rect.x + offset, rect.y, length, thickness)
        };
        out.push((id, tile));
        offset += length;
    }

    if vertical {
        Rect::new(rect.x + thickness, rect.y, (rect.width - thickness).max(0.0), rect.height)
    } else {
        Rect::new(rect.x, rect.y + thickness, rect.width, (rect.height - thickness).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{sample_tree, zero_size_tree};
    use crate::layout::{LayoutStrategy, Viewport, layout};

    fn area_sum(tiles: &[(usize, Rect)]) -> f64 {
        tiles.iter().map(|(_, r)| r.area()).sum()
    }

    #[test]
    fn test_tiles_cover_rect_exactly() {
        let rect = Rect::new(0.0, 0.0, 600.0, 400.0);
        let items = vec![(0, 6.0), (1, 6.0), (2, 4.0), (3, 3.0), (4, 2.0), (5, 2.0), (6, 1.0)];
        let tiles = squarify(&items, rect);

        assert_eq!(tiles.len(), items.len());
        assert!((area_sum(&tiles) - rect.area()).abs() < 1e-6);
        for (_, tile) in &tiles {
            assert!(rect.contains(tile));
        }
        // Tiles do not overlap
        for (i, (_, a)) in tiles.iter().enumerate() {
            for (_, b) in &tiles[i + 1..] {
                let w = a.right().min(b.right()) - a.x.max(b.x);
                let h = a.bottom().min(b.bottom()) - a.y.max(b.y);
                assert!(w <= 1e-6 || h <= 1e-6, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_area_proportional_to_weight() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let tiles = squarify(&[(0, 3.0), (1, 1.0)], rect);
        let area = |id| tiles.iter().find(|(i, _)| *i == id).unwrap().1.area();
        assert!((area(0) - 7500.0).abs() < 1e-6);
        assert!((area(1) - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn test_children_partition_parent() {
        let root = sample_tree();
        let map = layout(&root, LayoutStrategy::Treemap, Viewport::new(800.0, 600.0)).unwrap();
        for parent in root.walk().filter(|n| !n.children().is_empty()) {
            let parent_area = map.get(&parent.id).unwrap().bounds.area();
            let child_area: f64 = parent
                .children()
                .iter()
                .map(|c| map.get(&c.id).unwrap().bounds.area())
                .sum();
            assert!((parent_area - child_area).abs() < 1e-6, "{}", parent.id);
        }
    }

    #[test]
    fn test_zero_size_tree_has_no_degenerate_tiles() {
        let root = zero_size_tree();
        let map = layout(&root, LayoutStrategy::Treemap, Viewport::new(400.0, 400.0)).unwrap();
        for node in root.walk() {
            assert!(map.get(&node.id).unwrap().bounds.area() > 0.0, "{}", node.id);
        }
    }
}
