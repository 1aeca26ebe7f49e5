//! Drag-to-rotate around an element's centre.

use crate::hit::element_center;
use eu_core::geometry::angle_between;
use eu_core::{ElementRef, Point, Scene};

/// A rotation drag in progress. The element's rotation is always set
/// absolutely from where the drag began, so pointer jitter never
/// accumulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationGesture {
    target: ElementRef,
    center: Point,
    start_angle: f64,
    initial_rotation: f64,
}

impl RotationGesture {
    /// Start rotating `target` with the pointer at `world`. `None` if the
    /// element does not exist.
    pub fn begin(scene: &Scene, target: ElementRef, world: Point) -> Option<Self> {
        let center = element_center(scene, target)?;
        let initial_rotation = scene.rotation_of(target.kind, target.id)?;
        Some(Self {
            target,
            center,
            start_angle: angle_between(center, world),
            initial_rotation,
        })
    }

    pub fn target(&self) -> ElementRef {
        self.target
    }

    /// Rotate so the element turns with the pointer around its centre.
    pub fn update(&self, scene: &mut Scene, world: Point) {
        let delta = angle_between(self.center, world) - self.start_angle;
        scene.set_element_rotation(self.target.kind, self.target.id, self.initial_rotation + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eu_core::{ElementKind, NewShape, ShapeKind};

    #[test]
    fn quarter_turn_drag() {
        let mut scene = Scene::new();
        let s = scene.add_shape(NewShape::new(ShapeKind::Rectangle, 0.0, 0.0, 100.0, 100.0));
        scene.set_element_rotation(ElementKind::Shape, s, 10.0);
        let r = ElementRef::shape(s);
        // pointer starts right of centre (50, 50) and moves below it
        let g = RotationGesture::begin(&scene, r, Point::new(150.0, 50.0)).unwrap();
        g.update(&mut scene, Point::new(50.0, 150.0));
        assert!((scene.shape(s).unwrap().rotation - 100.0).abs() < 1e-9);
        g.update(&mut scene, Point::new(50.0, -50.0));
        assert!((scene.shape(s).unwrap().rotation - 280.0).abs() < 1e-9);
    }

    #[test]
    fn missing_target_does_not_start() {
        let scene = Scene::new();
        let r = ElementRef::arrow(eu_core::ElementId::intern("rotate_missing"));
        assert!(RotationGesture::begin(&scene, r, Point::ORIGIN).is_none());
    }
}
