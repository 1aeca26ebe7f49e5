//! Geometry kernel: pure functions over points and boxes.
//!
//! Every containment test here is inclusive of the boundary. Angles are in
//! degrees at the API surface and converted to radians internally.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Box from an origin and size; negative sizes are normalized.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Normalized box spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        point_in_rect(p, self)
    }

    /// Inclusive overlap test: touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.min_x > other.max_x
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.max_y < other.min_y)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.min_x += dx;
        self.max_x += dx;
        self.min_y += dy;
        self.max_y += dy;
    }
}

/// Inclusive axis-aligned containment.
pub fn point_in_rect(p: Point, rect: &BoundingBox) -> bool {
    p.x >= rect.min_x && p.x <= rect.max_x && p.y >= rect.min_y && p.y <= rect.max_y
}

/// Inclusive AABB overlap; shared edges count.
pub fn rects_intersect(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.intersects(b)
}

/// Normalized-distance ellipse containment, boundary inclusive.
/// A degenerate ellipse (either radius zero) contains nothing.
pub fn point_in_ellipse(p: Point, center: Point, rx: f64, ry: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = (p.x - center.x) / rx;
    let dy = (p.y - center.y) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Distance from `p` to the closed segment `a`–`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure to that endpoint. A zero-length segment degrades to a point.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    p.distance(a + seg * t)
}

/// Smallest distance from `p` to any segment of an open polyline.
/// Returns `None` when the polyline has fewer than two points.
pub fn polyline_distance(p: Point, points: &[Point]) -> Option<f64> {
    points
        .windows(2)
        .map(|w| distance_to_segment(p, w[0], w[1]))
        .min_by(f64::total_cmp)
}

/// Bounding box of a point set, or `None` for an empty slice.
pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let (first, rest) = points.split_first()?;
    let mut bb = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in rest {
        bb.min_x = bb.min_x.min(p.x);
        bb.min_y = bb.min_y.min(p.y);
        bb.max_x = bb.max_x.max(p.x);
        bb.max_y = bb.max_y.max(p.y);
    }
    Some(bb)
}

/// Rotate `p` about `center` by `degrees` (positive is clockwise on a
/// y-down canvas).
pub fn rotate_point(p: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    Affine::rotate_about(degrees.to_radians(), center) * p
}

/// Wrap any signed angle into `[0, 360)`.
pub fn normalize_rotation(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Angle of the vector `a → b` in degrees, in `(-180, 180]`.
pub fn angle_between(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}
