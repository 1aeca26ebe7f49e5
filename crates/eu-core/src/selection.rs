//! The single authoritative selection: ordered id lists per entity kind.

use crate::id::ElementId;
use crate::model::{ElementKind, ElementRef};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    shapes: Vec<ElementId>,
    arrows: Vec<ElementId>,
    drawing_paths: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids of one kind, in selection order.
    pub fn ids(&self, kind: ElementKind) -> &[ElementId] {
        match kind {
            ElementKind::Shape => &self.shapes,
            ElementKind::Arrow => &self.arrows,
            ElementKind::DrawingPath => &self.drawing_paths,
        }
    }

    fn ids_mut(&mut self, kind: ElementKind) -> &mut Vec<ElementId> {
        match kind {
            ElementKind::Shape => &mut self.shapes,
            ElementKind::Arrow => &mut self.arrows,
            ElementKind::DrawingPath => &mut self.drawing_paths,
        }
    }

    pub fn shapes(&self) -> &[ElementId] {
        &self.shapes
    }

    pub fn arrows(&self) -> &[ElementId] {
        &self.arrows
    }

    pub fn drawing_paths(&self) -> &[ElementId] {
        &self.drawing_paths
    }

    pub fn contains(&self, r: ElementRef) -> bool {
        self.ids(r.kind).contains(&r.id)
    }

    /// Add `r`; returns false if it was already selected.
    pub fn insert(&mut self, r: ElementRef) -> bool {
        let ids = self.ids_mut(r.kind);
        if ids.contains(&r.id) {
            return false;
        }
        ids.push(r.id);
        true
    }

    /// Remove `r`; returns false if it was not selected.
    pub fn remove(&mut self, r: ElementRef) -> bool {
        let ids = self.ids_mut(r.kind);
        match ids.iter().position(|id| *id == r.id) {
            Some(pos) => {
                ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.arrows.clear();
        self.drawing_paths.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.shapes.len() + self.arrows.len() + self.drawing_paths.len()
    }

    /// Every selected element: shapes, then arrows, then paths.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef> + '_ {
        let shapes = self.shapes.iter().map(|id| ElementRef::shape(*id));
        let arrows = self.arrows.iter().map(|id| ElementRef::arrow(*id));
        let paths = self
            .drawing_paths
            .iter()
            .map(|id| ElementRef::drawing_path(*id));
        shapes.chain(arrows).chain(paths)
    }
}
