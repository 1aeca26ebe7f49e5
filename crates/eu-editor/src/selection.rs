//! Click and marquee selection on top of the scene's `Selection`.
//!
//! The scene owns the one selection; this module only decides how a click
//! or a dragged box changes it.

use crate::hit::elements_in_rect;
use crate::input::Modifiers;
use eu_core::geometry::BoundingBox;
use eu_core::{ElementRef, Point, Scene};

/// Click on an element: ctrl/⌘ toggles it, a plain click selects only it.
pub fn click_select(scene: &mut Scene, r: ElementRef, modifiers: Modifiers) {
    if modifiers.cmd() {
        scene.toggle_selection(r);
    } else {
        scene.select(r);
    }
}

/// A rubber-band drag in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub start: Point,
    pub end: Point,
}

impl SelectionBox {
    /// The normalized rectangle spanned by the drag.
    pub fn rect(&self) -> BoundingBox {
        BoundingBox::from_corners(self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarqueeSelection {
    active: Option<SelectionBox>,
}

impl MarqueeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selecting(&self) -> bool {
        self.active.is_some()
    }

    /// The box being dragged, for rendering.
    pub fn current(&self) -> Option<SelectionBox> {
        self.active
    }

    pub fn start_selection_box(&mut self, world: Point) {
        self.active = Some(SelectionBox {
            start: world,
            end: world,
        });
    }

    pub fn update_selection_box(&mut self, world: Point) {
        if let Some(b) = self.active.as_mut() {
            b.end = world;
        }
    }

    /// Add everything the box touches to the selection, keeping what was
    /// already selected. Returns how many elements were newly added.
    pub fn complete_selection_box(&mut self, scene: &mut Scene) -> usize {
        let Some(b) = self.active.take() else {
            return 0;
        };
        let hits = elements_in_rect(scene, &b.rect());
        let before = scene.selection().len();
        for r in hits {
            scene.add_to_selection(r);
        }
        let added = scene.selection().len() - before;
        log::debug!("marquee selected {added} new elements");
        added
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
