//! Hit testing: world point → element lookup.
//!
//! Elements are tested topmost first (reverse insertion order). Rotated
//! elements are tested by un-rotating the query point about the element's
//! centre, so every test runs against unrotated geometry.

use crate::config::EditorConfig;
use eu_core::geometry::{
    BoundingBox, point_in_ellipse, point_in_rect, polyline_distance, rotate_point,
};
use eu_core::{
    Anchor, Arrow, DrawingPath, ElementId, ElementKind, ElementRef, Point, Scene, Shape, ShapeKind,
};

/// Extra slack around the synthetic text box: left, right, top, bottom.
const TEXT_PAD_X: f64 = 4.0;
const TEXT_PAD_TOP: f64 = 2.0;
const TEXT_PAD_BOTTOM: f64 = 4.0;

/// Rotation pivot of any element.
pub fn element_center(scene: &Scene, r: ElementRef) -> Option<Point> {
    match r.kind {
        ElementKind::Shape => scene.shape(r.id).map(Shape::center),
        ElementKind::Arrow => scene.arrow(r.id).map(|a| a.bounds().center()),
        ElementKind::DrawingPath => scene.drawing_path(r.id).map(|p| p.bounds().center()),
    }
}

fn unrotate(p: Point, center: Point, rotation: f64) -> Point {
    rotate_point(p, center, -rotation)
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Kind-specific containment test for one shape.
pub fn shape_contains(shape: &Shape, p: Point) -> bool {
    let bb = shape.bounds();
    let p = unrotate(p, bb.center(), shape.rotation);
    match shape.kind {
        ShapeKind::Rectangle => point_in_rect(p, &bb),
        ShapeKind::Ellipse => point_in_ellipse(p, bb.center(), bb.width() / 2.0, bb.height() / 2.0),
        ShapeKind::Text => {
            let padded = BoundingBox {
                min_x: bb.min_x - TEXT_PAD_X,
                min_y: bb.min_y - TEXT_PAD_TOP,
                max_x: bb.max_x + TEXT_PAD_X,
                max_y: bb.max_y + TEXT_PAD_BOTTOM,
            };
            point_in_rect(p, &padded)
        }
    }
}

pub fn shape_at_point(scene: &Scene, p: Point) -> Option<ElementId> {
    scene
        .shapes()
        .iter()
        .rev()
        .find(|s| shape_contains(s, p))
        .map(|s| s.id)
}

// ─── Arrows ──────────────────────────────────────────────────────────────

pub fn arrow_contains(arrow: &Arrow, p: Point, tolerance: f64) -> bool {
    let p = unrotate(p, arrow.bounds().center(), arrow.rotation);
    polyline_distance(p, &arrow.polyline()).is_some_and(|d| d <= tolerance)
}

pub fn arrow_at_point(scene: &Scene, p: Point, tolerance: f64) -> Option<ElementId> {
    scene
        .arrows()
        .iter()
        .rev()
        .find(|a| arrow_contains(a, p, tolerance))
        .map(|a| a.id)
}

// ─── Freehand paths ──────────────────────────────────────────────────────

pub fn drawing_path_contains(path: &DrawingPath, p: Point, config: &EditorConfig) -> bool {
    let bb = path.bounds();
    let p = unrotate(p, bb.center(), path.rotation());
    if !bb.expanded(config.path_hit_padding).contains(p) {
        return false;
    }
    polyline_distance(p, path.points()).is_some_and(|d| d <= config.path_hit_distance)
}

pub fn drawing_path_at_point(scene: &Scene, p: Point, config: &EditorConfig) -> Option<ElementId> {
    scene
        .drawing_paths()
        .iter()
        .rev()
        .find(|path| drawing_path_contains(path, p, config))
        .map(|path| path.id)
}

// ─── Combined lookups ────────────────────────────────────────────────────

/// The element a click at `p` lands on: arrows first (they are drawn above
/// shapes), then shapes, then freehand paths.
pub fn element_at_point(scene: &Scene, p: Point, config: &EditorConfig) -> Option<ElementRef> {
    arrow_at_point(scene, p, config.arrow_hit_tolerance)
        .map(ElementRef::arrow)
        .or_else(|| shape_at_point(scene, p).map(ElementRef::shape))
        .or_else(|| drawing_path_at_point(scene, p, config).map(ElementRef::drawing_path))
}

/// The nearest connection dot within `radius` of `p`, across all shapes and
/// paths. Returns the owner id with the anchor.
pub fn anchor_at_point(scene: &Scene, p: Point, radius: f64) -> Option<(ElementId, Anchor)> {
    let shapes = scene.shapes().iter().map(|s| s.id);
    let paths = scene.drawing_paths().iter().map(|d| d.id);
    nearest_anchor(scene, shapes.chain(paths), p, radius)
}

/// The nearest dot of `owner` alone within `radius` of `p`.
pub fn owner_anchor_at_point(scene: &Scene, owner: ElementId, p: Point, radius: f64) -> Option<Anchor> {
    nearest_anchor(scene, std::iter::once(owner), p, radius).map(|(_, anchor)| anchor)
}

fn nearest_anchor(
    scene: &Scene,
    owners: impl Iterator<Item = ElementId>,
    p: Point,
    radius: f64,
) -> Option<(ElementId, Anchor)> {
    let mut best: Option<(ElementId, Anchor, f64)> = None;
    for owner in owners {
        let Some(anchors) = scene.anchors_of(owner) else {
            continue;
        };
        for anchor in anchors {
            let d = anchor.point().distance(p);
            if d <= radius && best.is_none_or(|(_, _, bd)| d < bd) {
                best = Some((owner, anchor, d));
            }
        }
    }
    best.map(|(owner, anchor, _)| (owner, anchor))
}

/// A control point of `arrow` within `radius` of `p`.
pub fn control_point_at(arrow: &Arrow, p: Point, radius: f64) -> Option<ElementId> {
    if !arrow.is_curved {
        return None;
    }
    arrow
        .control_points
        .iter()
        .find(|cp| cp.point().distance(p) <= radius)
        .map(|cp| cp.id)
}

/// Every element whose bounds intersect `rect` (boundary inclusive). Text
/// shapes use their synthetic text box.
pub fn elements_in_rect(scene: &Scene, rect: &BoundingBox) -> Vec<ElementRef> {
    let shapes = scene
        .shapes()
        .iter()
        .filter(|s| s.bounds().intersects(rect))
        .map(|s| ElementRef::shape(s.id));
    let arrows = scene
        .arrows()
        .iter()
        .filter(|a| a.bounds().intersects(rect))
        .map(|a| ElementRef::arrow(a.id));
    let paths = scene
        .drawing_paths()
        .iter()
        .filter(|d| d.bounds().intersects(rect))
        .map(|d| ElementRef::drawing_path(d.id));
    shapes.chain(arrows).chain(paths).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eu_core::{AnchorName, NewArrow, NewDrawingPath, NewShape};
    use pretty_assertions::assert_eq;

    #[test]
    fn topmost_shape_wins() {
        let mut scene = Scene::new();
        let below = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0));
        let above = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 50.0, 50.0, 100.0, 100.0));
        assert_eq!(shape_at_point(&scene, Point::new(75.0, 75.0)), Some(above));
        assert_eq!(shape_at_point(&scene, Point::new(25.0, 25.0)), Some(below));
        assert_eq!(shape_at_point(&scene, Point::new(175.0, 175.0)), None);
    }

    #[test]
    fn ellipse_misses_its_corners() {
        let mut scene = Scene::new();
        let e = scene.add_shape(NewShape::new(ShapeKind::Ellipse, 0.0, 0.0, 100.0, 50.0));
        assert_eq!(shape_at_point(&scene, Point::new(50.0, 25.0)), Some(e));
        assert_eq!(shape_at_point(&scene, Point::new(100.0, 25.0)), Some(e));
        assert_eq!(shape_at_point(&scene, Point::new(2.0, 2.0)), None);
    }

    #[test]
    fn text_hit_uses_padded_synthetic_box() {
        let mut scene = Scene::new();
        // "abcd" at 10px: 24 wide, 10 tall above the baseline at y = 100
        let t = scene.add_shape(
            NewShape::new(ShapeKind::Text, 0.0, 100.0, 0.0, 0.0)
                .with_text("abcd")
                .with_font_size(10.0),
        );
        assert_eq!(shape_at_point(&scene, Point::new(-3.9, 88.1)), Some(t));
        assert_eq!(shape_at_point(&scene, Point::new(27.9, 103.9)), Some(t));
        assert_eq!(shape_at_point(&scene, Point::new(28.5, 95.0)), None);
        assert_eq!(shape_at_point(&scene, Point::new(10.0, 104.5)), None);
    }

    #[test]
    fn rotated_rectangle_hit_follows_rotation() {
        let mut scene = Scene::new();
        let s = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 40.0, 100.0, 20.0));
        // unrotated it spans x 0..100; rotated 90° it spans y 0..100 around x 50
        assert_eq!(shape_at_point(&scene, Point::new(5.0, 50.0)), Some(s));
        scene.set_element_rotation(ElementKind::Shape, s, 90.0);
        assert_eq!(shape_at_point(&scene, Point::new(5.0, 50.0)), None);
        assert_eq!(shape_at_point(&scene, Point::new(50.0, 5.0)), Some(s));
    }

    #[test]
    fn arrow_tolerance() {
        let mut scene = Scene::new();
        let a = scene.add_arrow(NewArrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        assert_eq!(arrow_at_point(&scene, Point::new(50.0, 5.0), 5.0), Some(a));
        assert_eq!(arrow_at_point(&scene, Point::new(50.0, 5.1), 5.0), None);
        assert_eq!(arrow_at_point(&scene, Point::new(104.0, 0.0), 5.0), Some(a));
    }

    #[test]
    fn curved_arrow_hit_checks_every_segment() {
        let mut scene = Scene::new();
        let a = scene.add_arrow(NewArrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        scene.convert_arrow_to_curved(a);
        let cp = scene.arrow(a).unwrap().control_points[0].id;
        scene.update_control_point(a, cp, 50.0, 80.0);
        assert_eq!(arrow_at_point(&scene, Point::new(50.0, 0.0), 5.0), None);
        assert_eq!(arrow_at_point(&scene, Point::new(25.0, 40.0), 5.0), Some(a));
    }

    #[test]
    fn path_hit_needs_box_and_segment_distance() {
        let cfg = EditorConfig::default();
        let mut scene = Scene::new();
        let p = scene
            .add_drawing_path(NewDrawingPath::new(vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
            ]))
            .unwrap();
        assert_eq!(drawing_path_at_point(&scene, Point::new(50.0, 15.0), &cfg), Some(p));
        // inside the box but far from both segments
        assert_eq!(drawing_path_at_point(&scene, Point::new(30.0, 70.0), &cfg), None);
        // close to the corner but outside the padded box
        assert_eq!(drawing_path_at_point(&scene, Point::new(-16.0, 0.0), &cfg), None);
    }

    #[test]
    fn anchor_lookup_picks_nearest_dot() {
        let mut scene = Scene::new();
        let s = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0));
        let (owner, anchor) = anchor_at_point(&scene, Point::new(97.0, 24.0), 8.0).unwrap();
        assert_eq!(owner, s);
        assert_eq!(anchor.name, AnchorName::RightCenter);
        assert!(anchor_at_point(&scene, Point::new(75.0, 25.0), 8.0).is_none());
    }

    #[test]
    fn owner_anchor_lookup_ignores_other_owners() {
        let mut scene = Scene::new();
        let a = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 50.0));
        let b = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 104.0, 0.0, 100.0, 50.0));
        let near = Point::new(101.0, 25.0);
        assert_eq!(anchor_at_point(&scene, near, 8.0).map(|(o, _)| o), Some(a));
        let anchor = owner_anchor_at_point(&scene, b, near, 8.0).unwrap();
        assert_eq!(anchor.name, AnchorName::LeftCenter);
        assert!(owner_anchor_at_point(&scene, b, Point::new(50.0, 25.0), 8.0).is_none());
    }

    #[test]
    fn marquee_rect_is_inclusive() {
        let mut scene = Scene::new();
        let a = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 10.0, 10.0));
        let b = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 20.0, 0.0, 10.0, 10.0));
        scene.add_shape(NewShape::new(ShapeKind::Rectangle, 40.0, 0.0, 10.0, 10.0));
        let rect = BoundingBox::from_origin_size(0.0, 0.0, 30.0, 10.0);
        assert_eq!(
            elements_in_rect(&scene, &rect),
            vec![ElementRef::shape(a), ElementRef::shape(b)]
        );
    }

    #[test]
    fn arrows_take_priority_over_shapes() {
        let cfg = EditorConfig::default();
        let mut scene = Scene::new();
        scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0));
        let a = scene.add_arrow(NewArrow::new(Point::new(10.0, 50.0), Point::new(90.0, 50.0)));
        assert_eq!(
            element_at_point(&scene, Point::new(50.0, 51.0), &cfg),
            Some(ElementRef::arrow(a))
        );
    }
}
