//! Connection anchors ("dots") derived from owner geometry.
//!
//! Anchors are never stored on shapes; they are computed from position,
//! size, and rotation on demand. Paths cache theirs, but only through
//! `DrawingPath::refresh_geometry`.

use crate::geometry::{BoundingBox, rotate_point};
use crate::id::ElementId;
use crate::model::{AnchorName, DrawingPath, Shape, ShapeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// A named anchor resolved to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: AnchorName,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

fn anchor_at(name: AnchorName, p: Point) -> Anchor {
    Anchor {
        name,
        x: p.x,
        y: p.y,
    }
}

/// Corners and edge midpoints of `bb`, rotated about its centre.
pub fn box_anchors(bb: &BoundingBox, rotation: f64) -> [Anchor; 8] {
    let center = bb.center();
    AnchorName::ALL.map(|name| {
        let (u, v) = name.unit_position();
        let p = Point::new(bb.min_x + u * bb.width(), bb.min_y + v * bb.height());
        anchor_at(name, rotate_point(p, center, rotation))
    })
}

/// Points on the ellipse inscribed in `bb`: axis extremes for the edge
/// anchors and the 45° parametric points for the corners.
fn ellipse_anchors(bb: &BoundingBox, rotation: f64) -> [Anchor; 8] {
    let center = bb.center();
    let rx = bb.width() / 2.0;
    let ry = bb.height() / 2.0;
    AnchorName::ALL.map(|name| {
        let (u, v) = name.unit_position();
        // map unit coords to the [-1, 1] direction from the centre
        let (mut dx, mut dy) = (u * 2.0 - 1.0, v * 2.0 - 1.0);
        if dx != 0.0 && dy != 0.0 {
            dx *= FRAC_1_SQRT_2;
            dy *= FRAC_1_SQRT_2;
        }
        let p = Point::new(center.x + dx * rx, center.y + dy * ry);
        anchor_at(name, rotate_point(p, center, rotation))
    })
}

/// All eight anchors of a shape under its current geometry.
pub fn shape_anchors(shape: &Shape) -> [Anchor; 8] {
    let bb = shape.bounds();
    match shape.kind {
        ShapeKind::Ellipse => ellipse_anchors(&bb, shape.rotation),
        ShapeKind::Rectangle | ShapeKind::Text => box_anchors(&bb, shape.rotation),
    }
}

/// Pick the anchor nearest to `target`. Ties go to the earlier anchor in
/// clockwise order.
pub fn closest_anchor(anchors: &[Anchor; 8], target: Point) -> Anchor {
    let mut best = anchors[0];
    let mut best_dist = best.point().distance(target);
    for a in &anchors[1..] {
        let d = a.point().distance(target);
        if d < best_dist {
            best = *a;
            best_dist = d;
        }
    }
    best
}

/// Anything an arrow endpoint can bind to.
#[derive(Debug, Clone, Copy)]
pub enum AnchorOwner<'a> {
    Shape(&'a Shape),
    Path(&'a DrawingPath),
}

impl AnchorOwner<'_> {
    pub fn anchors(&self) -> [Anchor; 8] {
        match self {
            AnchorOwner::Shape(s) => shape_anchors(s),
            AnchorOwner::Path(p) => *p.anchors(),
        }
    }

    /// Position of one named anchor.
    pub fn anchor(&self, name: AnchorName) -> Point {
        let anchors = self.anchors();
        anchors
            .iter()
            .find(|a| a.name == name)
            .map(Anchor::point)
            .unwrap_or_else(|| anchors[0].point())
    }

    pub fn closest_anchor(&self, target: Point) -> Anchor {
        closest_anchor(&self.anchors(), target)
    }

    /// Unrotated bounds of the owner.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            AnchorOwner::Shape(s) => s.bounds(),
            AnchorOwner::Path(p) => p.bounds(),
        }
    }
}
