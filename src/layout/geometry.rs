//! Geometry types shared by every layout strategy

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

use super::LayoutStrategy;

/// Tolerance for containment checks on floating point coordinates.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `self`, `angle` radians clockwise from 12 o'clock.
    pub fn polar(self, radius: f64, angle: f64) -> Point {
        Point::new(self.x + radius * angle.sin(), self.y - radius * angle.cos())
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn around(center: Point, half_width: f64, half_height: f64) -> Self {
        Self::new(
            center.x - half_width,
            center.y - half_height,
            2.0 * half_width,
            2.0 * half_height,
        )
    }

    /// Smallest rectangle covering all `points`.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in iter {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn inset(&self, margin: f64) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Whether `other` lies within this rectangle, up to [`EPSILON`].
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x - EPSILON
            && p.y >= self.y - EPSILON
            && p.x <= self.right() + EPSILON
            && p.y <= self.bottom() + EPSILON
    }
}

/// Half-open angle interval `[start, end)` in radians, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub start: f64,
    pub end: f64,
}

impl AngleRange {
    pub const FULL: AngleRange = AngleRange { start: 0.0, end: TAU };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn contains(&self, other: &AngleRange) -> bool {
        other.start >= self.start - EPSILON && other.end <= self.end + EPSILON
    }
}

/// Visual footprint of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extent {
    /// Circle centered on the node position.
    Radius { radius: f64 },
    /// Rectangle centered on the node position.
    Rect { width: f64, height: f64 },
    /// Annular sector around the layout center, spanning the node's angle range.
    Arc { inner_radius: f64, outer_radius: f64 },
}

/// Placement of one node under one layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    /// Center of the node's shape (for arcs, the middle of the sector).
    pub position: Point,
    pub extent: Extent,
    /// Region covering this node's shape and its whole subtree.
    pub bounds: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_range: Option<AngleRange>,
}

impl Geometry {
    /// Whether `child` lies entirely inside this node's bounds.
    pub fn contains(&self, child: &Geometry) -> bool {
        self.bounds.contains(&child.bounds)
    }

    /// Bounding box of the node's own shape, excluding descendants.
    pub fn shape_bounds(&self, center: Point) -> Rect {
        match self.extent {
            Extent::Radius { radius } => Rect::around(self.position, radius, radius),
            Extent::Rect { width, height } => Rect::around(self.position, width / 2.0, height / 2.0),
            Extent::Arc {
                inner_radius,
                outer_radius,
            } => sector_bounds(
                center,
                inner_radius,
                outer_radius,
                self.angle_range.unwrap_or(AngleRange::FULL),
            ),
        }
    }
}

/// Bounding box of the annular sector between two radii over `range`.
pub fn sector_bounds(center: Point, inner: f64, outer: f64, range: AngleRange) -> Rect {
    let inner = inner.max(0.0);
    let mut points = Vec::with_capacity(10);
    for angle in [range.start, range.end] {
        points.push(center.polar(inner, angle));
        points.push(center.polar(outer, angle));
    }
    // Extremes on the outer circle fall on the cardinal directions
    let mut quarter = (range.start / FRAC_PI_2).ceil() as i64;
    while quarter as f64 * FRAC_PI_2 <= range.end + EPSILON {
        points.push(center.polar(outer, quarter as f64 * FRAC_PI_2));
        quarter += 1;
    }
    if inner == 0.0 {
        points.push(center);
    }
    Rect::bounding(points).unwrap_or_else(|| Rect::around(center, 0.0, 0.0))
}

/// Per-node geometry for one layout pass, keyed by node id.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryMap {
    pub strategy: LayoutStrategy,
    pub viewport: Viewport,
    /// Center of the radial, sunburst and galaxy layouts.
    pub center: Point,
    entries: HashMap<NodeId, Geometry>,
    /// Parent-child pairs in pre-order of the child.
    pub edges: Vec<(NodeId, NodeId)>,
}

impl GeometryMap {
    pub(super) fn new(strategy: LayoutStrategy, viewport: Viewport, center: Point) -> Self {
        Self {
            strategy,
            viewport,
            center,
            entries: HashMap::new(),
            edges: Vec::new(),
        }
    }

    pub(super) fn insert(&mut self, id: NodeId, geometry: Geometry) {
        self.entries.insert(id, geometry);
    }

    pub fn get(&self, id: &NodeId) -> Option<&Geometry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Geometry)> {
        self.entries.iter()
    }

    /// Drop one entry. Renderers reject maps with missing nodes, so this is
    /// mostly useful for exercising that path.
    pub fn remove(&mut self, id: &NodeId) -> Option<Geometry> {
        self.entries.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_is_clockwise_from_top() {
        let c = Point::new(100.0, 100.0);
        let top = c.polar(10.0, 0.0);
        let right = c.polar(10.0, FRAC_PI_2);
        assert!((top.x - 100.0).abs() < EPSILON && (top.y - 90.0).abs() < EPSILON);
        assert!((right.x - 110.0).abs() < EPSILON && (right.y - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_rect_containment_and_union() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = Rect::new(2.0, 2.0, 3.0, 3.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));

        let u = inner.union(&Rect::new(8.0, 8.0, 4.0, 4.0));
        assert_eq!(u, Rect::new(2.0, 2.0, 10.0, 10.0));
    }

    #[test]
    fn test_sector_bounds_quarter() {
        let c = Point::new(0.0, 0.0);
        let b = sector_bounds(c, 0.0, 10.0, AngleRange::new(0.0, FRAC_PI_2));
        assert!((b.x - 0.0).abs() < EPSILON);
        assert!((b.y + 10.0).abs() < EPSILON);
        assert!((b.width - 10.0).abs() < EPSILON);
        assert!((b.height - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_full_sector_covers_circle() {
        let c = Point::new(50.0, 50.0);
        let b = sector_bounds(c, 5.0, 20.0, AngleRange::FULL);
        assert!(b.contains(&Rect::around(c, 20.0, 20.0)));
    }

    #[test]
    fn test_invalid_viewports() {
        assert!(!Viewport::new(0.0, 10.0).is_valid());
        assert!(!Viewport::new(10.0, -1.0).is_valid());
        assert!(!Viewport::new(f64::NAN, 10.0).is_valid());
        assert!(Viewport::new(1.0, 1.0).is_valid());
    }
}
