//! The diagram scene: single owner of shapes, arrows, and freehand paths.
//!
//! Every public mutation is atomic from the caller's point of view: it
//! either applies fully (including cascades and arrow resync) or does
//! nothing. Lookups by an id that no longer exists are silent no-ops, since
//! ids always come from the scene's own state.
//!
//! Mutations schedule a debounced persistence write; the host drives the
//! write by calling `tick()` from its event loop.

use crate::anchors::{Anchor, AnchorOwner, closest_anchor};
use crate::geometry::normalize_rotation;
use crate::id::ElementId;
use crate::model::*;
use crate::persist::{DiagramStorage, PersistConfig, Persistence, SavedDiagram};
use crate::selection::Selection;
use kurbo::Point;
use std::time::Instant;

/// Origin of a dot-to-dot arrow being drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingConnection {
    pub origin: Point,
    pub owner: ElementId,
    pub anchor: AnchorName,
}

#[derive(Debug, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    arrows: Vec<Arrow>,
    drawing_paths: Vec<DrawingPath>,
    selection: Selection,
    connection: Option<PendingConnection>,
    persistence: Option<Persistence>,
}

impl Scene {
    /// An empty scene without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene backed by `storage`, starting from whatever it holds.
    pub fn with_storage(storage: impl DiagramStorage + 'static, config: &PersistConfig) -> Self {
        let persistence = Persistence::new(Box::new(storage), config);
        let mut scene = Self::new();
        if let Some(data) = persistence.load() {
            log::debug!(
                "restored diagram: {} shapes, {} arrows, {} paths",
                data.shapes.len(),
                data.arrows.len(),
                data.drawing_paths.len()
            );
            scene.replace_contents(data);
        }
        scene.persistence = Some(persistence);
        scene
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn drawing_paths(&self) -> &[DrawingPath] {
        &self.drawing_paths
    }

    pub fn shape(&self, id: ElementId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn arrow(&self, id: ElementId) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.id == id)
    }

    pub fn drawing_path(&self, id: ElementId) -> Option<&DrawingPath> {
        self.drawing_paths.iter().find(|p| p.id == id)
    }

    fn shape_mut(&mut self, id: ElementId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    fn arrow_mut(&mut self, id: ElementId) -> Option<&mut Arrow> {
        self.arrows.iter_mut().find(|a| a.id == id)
    }

    fn drawing_path_mut(&mut self, id: ElementId) -> Option<&mut DrawingPath> {
        self.drawing_paths.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, r: ElementRef) -> bool {
        match r.kind {
            ElementKind::Shape => self.shape(r.id).is_some(),
            ElementKind::Arrow => self.arrow(r.id).is_some(),
            ElementKind::DrawingPath => self.drawing_path(r.id).is_some(),
        }
    }

    /// The shape or path with this id, as an arrow attachment target.
    pub fn owner(&self, id: ElementId) -> Option<AnchorOwner<'_>> {
        self.shape(id)
            .map(AnchorOwner::Shape)
            .or_else(|| self.drawing_path(id).map(AnchorOwner::Path))
    }

    pub fn anchors_of(&self, owner: ElementId) -> Option<[Anchor; 8]> {
        self.owner(owner).map(|o| o.anchors())
    }

    pub fn anchor_position(&self, owner: ElementId, anchor: AnchorName) -> Option<Point> {
        self.owner(owner).map(|o| o.anchor(anchor))
    }

    /// Snapshot of the three collections.
    pub fn to_data(&self) -> DiagramData {
        DiagramData {
            shapes: self.shapes.clone(),
            arrows: self.arrows.clone(),
            drawing_paths: self.drawing_paths.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.arrows.is_empty() && self.drawing_paths.is_empty()
    }

    fn id_in_use(&self, id: ElementId) -> bool {
        self.shape(id).is_some()
            || self.drawing_path(id).is_some()
            || self
                .arrows
                .iter()
                .any(|a| a.id == id || a.control_points.iter().any(|cp| cp.id == id))
    }

    /// A prefixed id that no current element uses, including loaded ones.
    fn fresh_id(&self, prefix: &str) -> ElementId {
        ElementId::fresh(prefix, |id| self.id_in_use(id))
    }

    // ─── Creation ────────────────────────────────────────────────────────

    pub fn add_shape(&mut self, data: NewShape) -> ElementId {
        let id = self.fresh_id("shape");
        let shape = data.into_shape(id, now_millis());
        log::debug!("add {:?} {id}", shape.kind);
        self.shapes.push(shape);
        self.touch();
        id
    }

    /// Add an arrow, binding each endpoint that names an owner.
    ///
    /// A named anchor snaps exactly; otherwise the endpoint snaps to the
    /// closest of the owner's anchors and records that anchor's name.
    /// Unknown owners leave the endpoint free.
    pub fn add_arrow(&mut self, data: NewArrow) -> ElementId {
        let id = self.fresh_id("arrow");
        let start = self.bind_endpoint(data.start, data.start_binding);
        let end = self.bind_endpoint(data.end, data.end_binding);
        log::debug!(
            "add arrow {id} ({} -> {})",
            start.binding.map_or("free", |b| b.owner.as_str()),
            end.binding.map_or("free", |b| b.owner.as_str())
        );
        self.arrows.push(Arrow {
            id,
            start,
            end,
            control_points: Default::default(),
            is_curved: false,
            rotation: 0.0,
            stroke: data.stroke,
            stroke_width: data.stroke_width,
            selected: false,
            created_at: now_millis(),
        });
        self.touch();
        id
    }

    fn bind_endpoint(&self, p: Point, request: Option<Binding>) -> ArrowEnd {
        let Some(request) = request else {
            return ArrowEnd::free(p);
        };
        let Some(owner) = self.owner(request.owner) else {
            return ArrowEnd::free(p);
        };
        let anchor = match request.anchor {
            Some(name) => {
                let at = owner.anchor(name);
                Anchor {
                    name,
                    x: at.x,
                    y: at.y,
                }
            }
            None => owner.closest_anchor(p),
        };
        ArrowEnd {
            x: anchor.x,
            y: anchor.y,
            binding: Some(Binding {
                owner: request.owner,
                anchor: Some(anchor.name),
            }),
        }
    }

    /// Add a freehand path. Fewer than two points is rejected.
    pub fn add_drawing_path(&mut self, data: NewDrawingPath) -> Option<ElementId> {
        if data.points.len() < 2 {
            log::debug!("rejecting path with {} points", data.points.len());
            return None;
        }
        let id = self.fresh_id("path");
        let path = DrawingPath::new(id, data.points, data.stroke, data.stroke_width, now_millis());
        log::debug!("add path {id} ({} points)", path.points().len());
        self.drawing_paths.push(path);
        self.touch();
        Some(id)
    }

    // ─── Geometry mutations ──────────────────────────────────────────────

    pub fn move_shape(&mut self, id: ElementId, dx: f64, dy: f64) {
        let Some(shape) = self.shape_mut(id) else {
            return;
        };
        shape.x += dx;
        shape.y += dy;
        log::trace!("move shape {id} by ({dx}, {dy})");
        self.update_connected_arrows(id);
        self.touch();
    }

    pub fn move_drawing_path(&mut self, id: ElementId, dx: f64, dy: f64) {
        let Some(path) = self.drawing_path_mut(id) else {
            return;
        };
        path.translate(dx, dy);
        log::trace!("move path {id} by ({dx}, {dy})");
        self.update_connected_arrows(id);
        self.touch();
    }

    /// Re-resolve every arrow endpoint bound to `owner`.
    ///
    /// A recorded anchor name is resolved under the owner's current geometry;
    /// a binding without a name snaps to the anchor closest to the arrow's
    /// other end.
    pub fn update_connected_arrows(&mut self, owner: ElementId) {
        let Some(anchors) = self.anchors_of(owner) else {
            return;
        };
        let resolve = |binding: &Binding, other: Point| -> Point {
            binding
                .anchor
                .and_then(|name| anchors.iter().find(|a| a.name == name))
                .map(Anchor::point)
                .unwrap_or_else(|| closest_anchor(&anchors, other).point())
        };
        for arrow in &mut self.arrows {
            if let Some(b) = arrow.start.binding.filter(|b| b.owner == owner) {
                let p = resolve(&b, arrow.end.point());
                arrow.start.set_point(p);
            }
            if let Some(b) = arrow.end.binding.filter(|b| b.owner == owner) {
                let p = resolve(&b, arrow.start.point());
                arrow.end.set_point(p);
            }
        }
    }

    // ─── Rotation ────────────────────────────────────────────────────────

    pub fn rotation_of(&self, kind: ElementKind, id: ElementId) -> Option<f64> {
        match kind {
            ElementKind::Shape => self.shape(id).map(|s| s.rotation),
            ElementKind::Arrow => self.arrow(id).map(|a| a.rotation),
            ElementKind::DrawingPath => self.drawing_path(id).map(DrawingPath::rotation),
        }
    }

    /// Add `delta` degrees to an element's rotation, wrapped to `[0, 360)`.
    pub fn rotate_element(&mut self, kind: ElementKind, id: ElementId, delta: f64) {
        if let Some(current) = self.rotation_of(kind, id) {
            self.set_element_rotation(kind, id, current + delta);
        }
    }

    /// Set an element's absolute rotation, wrapped to `[0, 360)`.
    pub fn set_element_rotation(&mut self, kind: ElementKind, id: ElementId, angle: f64) {
        let angle = normalize_rotation(angle);
        let found = match kind {
            ElementKind::Shape => self.shape_mut(id).map(|s| s.rotation = angle).is_some(),
            ElementKind::Arrow => self.arrow_mut(id).map(|a| a.rotation = angle).is_some(),
            ElementKind::DrawingPath => self
                .drawing_path_mut(id)
                .map(|p| p.set_rotation(angle))
                .is_some(),
        };
        if !found {
            return;
        }
        if kind != ElementKind::Arrow {
            self.update_connected_arrows(id);
        }
        self.touch();
    }

    // ─── Shape content ───────────────────────────────────────────────────

    pub fn update_shape_text(&mut self, id: ElementId, text: impl Into<String>) {
        let Some(shape) = self.shape_mut(id) else {
            return;
        };
        shape.text = Some(text.into());
        // text boxes grow with their content, so anchors may have moved
        self.update_connected_arrows(id);
        self.touch();
    }

    pub fn update_shape_font_size(&mut self, id: ElementId, font_size: f64) {
        let Some(shape) = self.shape_mut(id) else {
            return;
        };
        shape.font_size = font_size;
        self.update_connected_arrows(id);
        self.touch();
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Remove an owner and every arrow bound to it at either end.
    fn remove_owner(&mut self, r: ElementRef) -> bool {
        let before = self.shapes.len() + self.drawing_paths.len();
        match r.kind {
            ElementKind::Shape => self.shapes.retain(|s| s.id != r.id),
            ElementKind::DrawingPath => self.drawing_paths.retain(|p| p.id != r.id),
            ElementKind::Arrow => return self.remove_arrow(r.id),
        }
        if self.shapes.len() + self.drawing_paths.len() == before {
            return false;
        }
        self.selection.remove(r);
        let mut cascaded = Vec::new();
        self.arrows.retain(|a| {
            let bound = a.is_bound_to(r.id);
            if bound {
                cascaded.push(a.id);
            }
            !bound
        });
        for arrow_id in &cascaded {
            self.selection.remove(ElementRef::arrow(*arrow_id));
        }
        if self.connection.is_some_and(|c| c.owner == r.id) {
            self.connection = None;
        }
        log::debug!(
            "deleted {:?} {} and {} bound arrows",
            r.kind,
            r.id,
            cascaded.len()
        );
        true
    }

    fn remove_arrow(&mut self, id: ElementId) -> bool {
        let before = self.arrows.len();
        self.arrows.retain(|a| a.id != id);
        if self.arrows.len() == before {
            return false;
        }
        self.selection.remove(ElementRef::arrow(id));
        log::debug!("deleted arrow {id}");
        true
    }

    pub fn delete_shape(&mut self, id: ElementId) {
        if self.remove_owner(ElementRef::shape(id)) {
            self.touch();
        }
    }

    pub fn delete_drawing_path(&mut self, id: ElementId) {
        if self.remove_owner(ElementRef::drawing_path(id)) {
            self.touch();
        }
    }

    pub fn delete_arrow(&mut self, id: ElementId) {
        if self.remove_arrow(id) {
            self.touch();
        }
    }

    /// Delete every selected element. Persists once if anything went.
    pub fn delete_selected(&mut self) {
        let targets: Vec<ElementRef> = self.selection.iter().collect();
        let mut deleted = false;
        for r in targets {
            deleted |= self.remove_owner(r);
        }
        self.selection.clear();
        if deleted {
            self.touch();
        }
    }

    pub fn clear_canvas(&mut self) {
        self.shapes.clear();
        self.arrows.clear();
        self.drawing_paths.clear();
        self.selection.clear();
        self.connection = None;
        log::debug!("canvas cleared");
        self.touch();
    }

    /// Replace the whole diagram, e.g. from a share link.
    pub fn load_diagram(&mut self, data: DiagramData) {
        self.replace_contents(data);
        self.touch();
    }

    /// Install loaded data, repairing what a hand-edited or stale document
    /// can get wrong: curved arrows without bend points and bindings to
    /// owners that are not in the document.
    fn replace_contents(&mut self, data: DiagramData) {
        self.shapes = data.shapes;
        self.drawing_paths = data.drawing_paths;
        let mut arrows = data.arrows;
        for arrow in &mut arrows {
            if arrow.is_curved && arrow.control_points.is_empty() {
                arrow.make_straight();
            }
            for end in [&mut arrow.start, &mut arrow.end] {
                if let Some(b) = end.binding
                    && self.owner(b.owner).is_none()
                {
                    log::warn!("arrow {}: dropping binding to missing {}", arrow.id, b.owner);
                    end.binding = None;
                }
            }
        }
        self.arrows = arrows;
        let owners: Vec<ElementId> = self
            .shapes
            .iter()
            .map(|s| s.id)
            .chain(self.drawing_paths.iter().map(|p| p.id))
            .collect();
        for owner in owners {
            self.update_connected_arrows(owner);
        }
        self.selection.clear();
        self.connection = None;
        self.sync_selection_flags();
    }

    // ─── Curved arrows ───────────────────────────────────────────────────

    /// Seed a single control point at the midpoint of a straight arrow.
    pub fn convert_arrow_to_curved(&mut self, id: ElementId) {
        let cp_id = self.fresh_id("cp");
        let Some(arrow) = self.arrow_mut(id) else {
            return;
        };
        if arrow.is_curved && !arrow.control_points.is_empty() {
            return;
        }
        let mid = arrow.start.point().midpoint(arrow.end.point());
        arrow.control_points.clear();
        arrow.control_points.push(ControlPoint {
            id: cp_id,
            x: mid.x,
            y: mid.y,
        });
        arrow.is_curved = true;
        self.touch();
    }

    /// Split one segment of the arrow's polyline at its midpoint.
    ///
    /// `after_index` indexes the polyline vertices (0 = start point, then
    /// each control point); the new point goes between that vertex and the
    /// next one. `None` splits the last segment. A straight arrow becomes
    /// curved. Out-of-range indices are ignored.
    pub fn add_control_point(&mut self, id: ElementId, after_index: Option<usize>) -> Option<ElementId> {
        let cp_id = self.fresh_id("cp");
        let arrow = self.arrow_mut(id)?;
        if !arrow.is_curved {
            arrow.control_points.clear();
        }
        let polyline = arrow.polyline();
        let segments = polyline.len() - 1;
        let seg = after_index.unwrap_or(segments - 1);
        if seg >= segments {
            return None;
        }
        let mid = polyline[seg].midpoint(polyline[seg + 1]);
        arrow.control_points.insert(
            seg,
            ControlPoint {
                id: cp_id,
                x: mid.x,
                y: mid.y,
            },
        );
        arrow.is_curved = true;
        self.touch();
        Some(cp_id)
    }

    pub fn update_control_point(&mut self, id: ElementId, point_id: ElementId, x: f64, y: f64) {
        let Some(cp) = self
            .arrow_mut(id)
            .and_then(|a| a.control_points.iter_mut().find(|cp| cp.id == point_id))
        else {
            return;
        };
        cp.x = x;
        cp.y = y;
        self.touch();
    }

    /// Remove a control point; the last one removed straightens the arrow.
    pub fn remove_control_point(&mut self, id: ElementId, point_id: ElementId) {
        let Some(arrow) = self.arrow_mut(id) else {
            return;
        };
        let Some(pos) = arrow.control_points.iter().position(|cp| cp.id == point_id) else {
            return;
        };
        arrow.control_points.remove(pos);
        if arrow.control_points.is_empty() {
            arrow.make_straight();
        }
        self.touch();
    }

    // ─── Dot-to-dot connections ──────────────────────────────────────────

    pub fn pending_connection(&self) -> Option<&PendingConnection> {
        self.connection.as_ref()
    }

    pub fn start_connection(&mut self, point: Point, owner: ElementId, anchor: AnchorName) {
        self.connection = Some(PendingConnection {
            origin: point,
            owner,
            anchor,
        });
    }

    /// Finish a pending connection with an arrow between the two named
    /// anchors. Ending on the originating owner cancels silently.
    pub fn complete_connection(
        &mut self,
        end_point: Point,
        end_owner: ElementId,
        end_anchor: AnchorName,
    ) -> Option<ElementId> {
        let origin = self.connection.take()?;
        if origin.owner == end_owner {
            log::debug!("connection back onto {end_owner} cancelled");
            return None;
        }
        let arrow = NewArrow::new(origin.origin, end_point)
            .bind_start(origin.owner, Some(origin.anchor))
            .bind_end(end_owner, Some(end_anchor));
        Some(self.add_arrow(arrow))
    }

    pub fn cancel_connection(&mut self) {
        self.connection = None;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, r: ElementRef) -> bool {
        self.selection.contains(r)
    }

    /// Replace the selection with exactly `r`.
    pub fn select(&mut self, r: ElementRef) {
        if !self.contains(r) {
            return;
        }
        self.selection.clear();
        self.selection.insert(r);
        self.sync_selection_flags();
    }

    pub fn select_shape(&mut self, id: ElementId) {
        self.select(ElementRef::shape(id));
    }

    pub fn select_arrow(&mut self, id: ElementId) {
        self.select(ElementRef::arrow(id));
    }

    pub fn select_drawing_path(&mut self, id: ElementId) {
        self.select(ElementRef::drawing_path(id));
    }

    /// Flip membership of `r` without touching the rest of the selection.
    pub fn toggle_selection(&mut self, r: ElementRef) {
        if !self.contains(r) {
            return;
        }
        if !self.selection.remove(r) {
            self.selection.insert(r);
        }
        self.sync_selection_flags();
    }

    pub fn add_to_selection(&mut self, r: ElementRef) {
        if self.contains(r) && self.selection.insert(r) {
            self.sync_selection_flags();
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.sync_selection_flags();
        }
    }

    /// The first selected shape, if any.
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.shapes().first().and_then(|id| self.shape(*id))
    }

    pub fn selected_arrow(&self) -> Option<&Arrow> {
        self.selection.arrows().first().and_then(|id| self.arrow(*id))
    }

    pub fn selected_drawing_path(&self) -> Option<&DrawingPath> {
        self.selection
            .drawing_paths()
            .first()
            .and_then(|id| self.drawing_path(*id))
    }

    /// Mirror the selection into every entity's `selected` flag.
    fn sync_selection_flags(&mut self) {
        let sel = &self.selection;
        for s in &mut self.shapes {
            s.selected = sel.contains(ElementRef::shape(s.id));
        }
        for a in &mut self.arrows {
            a.selected = sel.contains(ElementRef::arrow(a.id));
        }
        for p in &mut self.drawing_paths {
            p.selected = sel.contains(ElementRef::drawing_path(p.id));
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    fn touch(&mut self) {
        self.sync_selection_flags();
        if let Some(p) = self.persistence.as_mut() {
            p.schedule_at(Instant::now());
        }
    }

    pub fn has_pending_write(&self) -> bool {
        self.persistence.as_ref().is_some_and(Persistence::is_pending)
    }

    /// Run the scheduled write if its quiet period has elapsed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// `tick` against an explicit clock reading.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let due = self.persistence.as_ref().is_some_and(|p| p.is_due(now));
        if due {
            self.write_now();
        }
        due
    }

    /// Write any pending change immediately.
    pub fn flush(&mut self) {
        if self.has_pending_write() {
            self.write_now();
        }
    }

    fn write_now(&mut self) {
        if let Some(p) = self.persistence.as_mut() {
            p.write(&SavedDiagram {
                shapes: &self.shapes,
                arrows: &self.arrows,
                drawing_paths: &self.drawing_paths,
                timestamp: now_millis(),
            });
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(scene: &mut Scene, x: f64, y: f64, w: f64, h: f64) -> ElementId {
        scene.add_shape(NewShape::new(ShapeKind::Rectangle, x, y, w, h))
    }

    #[test]
    fn add_arrow_snaps_to_named_anchor() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 100.0, 50.0);
        let a = scene.add_arrow(
            NewArrow::new(Point::new(3.0, 3.0), Point::new(300.0, 300.0))
                .bind_start(s, Some(AnchorName::BottomCenter)),
        );
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.start.point(), Point::new(50.0, 50.0));
        assert_eq!(
            arrow.start.binding,
            Some(Binding {
                owner: s,
                anchor: Some(AnchorName::BottomCenter)
            })
        );
        assert_eq!(arrow.end.binding, None);
    }

    #[test]
    fn add_arrow_snaps_to_closest_anchor_and_records_it() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 100.0, 50.0);
        let a = scene.add_arrow(
            NewArrow::new(Point::new(300.0, 0.0), Point::new(104.0, 20.0)).bind_end(s, None),
        );
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.end.point(), Point::new(100.0, 25.0));
        assert_eq!(
            arrow.end.binding.and_then(|b| b.anchor),
            Some(AnchorName::RightCenter)
        );
    }

    #[test]
    fn add_arrow_with_unknown_owner_stays_free() {
        let mut scene = Scene::new();
        let a = scene.add_arrow(
            NewArrow::new(Point::new(1.0, 2.0), Point::new(30.0, 40.0))
                .bind_start(ElementId::intern("nope"), None),
        );
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.start.binding, None);
        assert_eq!(arrow.start.point(), Point::new(1.0, 2.0));
    }

    #[test]
    fn move_shape_resyncs_to_fresh_anchor() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 100.0, 50.0);
        let a = scene.add_arrow(
            NewArrow::new(Point::ORIGIN, Point::new(400.0, 0.0))
                .bind_start(s, Some(AnchorName::RightCenter)),
        );
        scene.move_shape(s, 10.0, 20.0);
        assert_eq!(scene.arrow(a).unwrap().start.point(), Point::new(110.0, 45.0));
    }

    #[test]
    fn rotation_moves_named_anchor() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 100.0, 50.0);
        let a = scene.add_arrow(
            NewArrow::new(Point::ORIGIN, Point::new(400.0, 0.0))
                .bind_start(s, Some(AnchorName::TopCenter)),
        );
        scene.set_element_rotation(ElementKind::Shape, s, 90.0);
        let p = scene.arrow(a).unwrap().start.point();
        assert!((p.x - 75.0).abs() < 1e-9 && (p.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn unnamed_binding_falls_back_to_closest_to_other_end() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let mut data = scene.to_data();
        data.arrows.push(Arrow {
            id: ElementId::intern("legacy_arrow"),
            start: ArrowEnd {
                x: 0.0,
                y: 0.0,
                binding: Some(Binding {
                    owner: s,
                    anchor: None,
                }),
            },
            end: ArrowEnd::free(Point::new(50.0, 500.0)),
            control_points: Default::default(),
            is_curved: false,
            rotation: 0.0,
            stroke: DEFAULT_LINE_STROKE.into(),
            stroke_width: 2.0,
            selected: false,
            created_at: 0,
        });
        scene.load_diagram(data);
        scene.move_shape(s, 0.0, 0.0);
        let arrow = scene.arrow(ElementId::intern("legacy_arrow")).unwrap();
        assert_eq!(arrow.start.point(), Point::new(50.0, 100.0));
    }

    #[test]
    fn cascade_delete_removes_only_bound_arrows() {
        let mut scene = Scene::new();
        let s1 = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let s2 = rect(&mut scene, 200.0, 0.0, 50.0, 50.0);
        let bound_start = scene.add_arrow(
            NewArrow::new(Point::ORIGIN, Point::new(100.0, 100.0)).bind_start(s1, None),
        );
        let bound_end =
            scene.add_arrow(NewArrow::new(Point::ORIGIN, Point::ORIGIN).bind_start(s2, None).bind_end(s1, None));
        let other = scene.add_arrow(NewArrow::new(Point::ORIGIN, Point::ORIGIN).bind_start(s2, None));
        let free = scene.add_arrow(NewArrow::new(Point::ORIGIN, Point::new(5.0, 5.0)));

        scene.delete_shape(s1);
        assert!(scene.arrow(bound_start).is_none());
        assert!(scene.arrow(bound_end).is_none());
        assert!(scene.arrow(other).is_some());
        assert!(scene.arrow(free).is_some());
        assert_eq!(scene.arrows().len(), 2);

        // idempotent
        scene.delete_shape(s1);
        assert_eq!(scene.arrows().len(), 2);
        assert_eq!(scene.shapes().len(), 1);
    }

    #[test]
    fn delete_clears_selection_of_owner_and_cascaded_arrows() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let a = scene.add_arrow(NewArrow::new(Point::ORIGIN, Point::new(99.0, 0.0)).bind_start(s, None));
        scene.select_shape(s);
        scene.add_to_selection(ElementRef::arrow(a));
        scene.delete_shape(s);
        assert!(scene.selection().is_empty());
        assert!(scene.selected_shape().is_none());
    }

    #[test]
    fn delete_selected_removes_every_selected_kind() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let keep = rect(&mut scene, 100.0, 0.0, 50.0, 50.0);
        let a = scene.add_arrow(NewArrow::new(Point::new(500.0, 0.0), Point::new(600.0, 0.0)));
        let p = scene
            .add_drawing_path(NewDrawingPath::new(vec![Point::ORIGIN, Point::new(9.0, 9.0)]))
            .unwrap();
        scene.select_shape(s);
        scene.toggle_selection(ElementRef::arrow(a));
        scene.toggle_selection(ElementRef::drawing_path(p));
        scene.delete_selected();
        assert_eq!(scene.shapes().len(), 1);
        assert_eq!(scene.shapes()[0].id, keep);
        assert!(scene.arrows().is_empty());
        assert!(scene.drawing_paths().is_empty());
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn rotation_wraps() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.set_element_rotation(ElementKind::Shape, s, 370.0);
        assert_eq!(scene.shape(s).unwrap().rotation, 10.0);
        scene.set_element_rotation(ElementKind::Shape, s, 5.0);
        scene.rotate_element(ElementKind::Shape, s, -10.0);
        assert_eq!(scene.shape(s).unwrap().rotation, 355.0);
    }

    #[test]
    fn rotation_applies_to_every_kind() {
        let mut scene = Scene::new();
        let a = scene.add_arrow(NewArrow::new(Point::ORIGIN, Point::new(10.0, 0.0)));
        let p = scene
            .add_drawing_path(NewDrawingPath::new(vec![Point::ORIGIN, Point::new(10.0, 10.0)]))
            .unwrap();
        scene.rotate_element(ElementKind::Arrow, a, 45.0);
        scene.rotate_element(ElementKind::DrawingPath, p, -90.0);
        assert_eq!(scene.arrow(a).unwrap().rotation, 45.0);
        assert_eq!(scene.drawing_path(p).unwrap().rotation(), 270.0);
        // unknown id is a no-op
        scene.rotate_element(ElementKind::Shape, a, 10.0);
    }

    #[test]
    fn curve_lifecycle() {
        let mut scene = Scene::new();
        let a = scene.add_arrow(NewArrow::new(Point::new(0.0, 0.0), Point::new(100.0, 40.0)));
        scene.convert_arrow_to_curved(a);
        let arrow = scene.arrow(a).unwrap();
        assert!(arrow.is_curved);
        assert_eq!(arrow.control_points.len(), 1);
        assert_eq!(arrow.control_points[0].point(), Point::new(50.0, 20.0));

        // split first segment: start (0,0) .. cp (50,20)
        let cp2 = scene.add_control_point(a, Some(0)).unwrap();
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.control_points.len(), 2);
        assert_eq!(arrow.control_points[0].id, cp2);
        assert_eq!(arrow.control_points[0].point(), Point::new(25.0, 10.0));

        // split last segment: cp (50,20) .. end (100,40)
        let cp3 = scene.add_control_point(a, None).unwrap();
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.control_points[2].id, cp3);
        assert_eq!(arrow.control_points[2].point(), Point::new(75.0, 30.0));
        assert!(scene.add_control_point(a, Some(9)).is_none());

        scene.update_control_point(a, cp3, 1.0, 2.0);
        assert_eq!(scene.arrow(a).unwrap().control_points[2].point(), Point::new(1.0, 2.0));

        let ids: Vec<ElementId> = scene.arrow(a).unwrap().control_points.iter().map(|c| c.id).collect();
        for id in ids {
            assert!(scene.arrow(a).unwrap().is_curved);
            scene.remove_control_point(a, id);
        }
        let arrow = scene.arrow(a).unwrap();
        assert!(!arrow.is_curved);
        assert!(arrow.control_points.is_empty());
    }

    #[test]
    fn connection_between_distinct_owners() {
        let mut scene = Scene::new();
        let s1 = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let s2 = rect(&mut scene, 200.0, 0.0, 50.0, 50.0);
        scene.start_connection(Point::new(50.0, 25.0), s1, AnchorName::RightCenter);
        let a = scene
            .complete_connection(Point::new(200.0, 25.0), s2, AnchorName::LeftCenter)
            .unwrap();
        let arrow = scene.arrow(a).unwrap();
        assert_eq!(arrow.start.binding.unwrap().anchor, Some(AnchorName::RightCenter));
        assert_eq!(arrow.end.point(), Point::new(200.0, 25.0));
        assert!(scene.pending_connection().is_none());
    }

    #[test]
    fn connection_onto_same_owner_is_cancelled() {
        let mut scene = Scene::new();
        let s1 = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        scene.start_connection(Point::new(50.0, 25.0), s1, AnchorName::RightCenter);
        assert!(
            scene
                .complete_connection(Point::new(0.0, 25.0), s1, AnchorName::LeftCenter)
                .is_none()
        );
        assert!(scene.arrows().is_empty());
        assert!(scene.pending_connection().is_none());
        assert!(scene.complete_connection(Point::ORIGIN, s1, AnchorName::TopLeft).is_none());
    }

    #[test]
    fn selection_flags_mirror_selection() {
        let mut scene = Scene::new();
        let s1 = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let s2 = rect(&mut scene, 100.0, 0.0, 50.0, 50.0);
        scene.select_shape(s1);
        assert!(scene.shape(s1).unwrap().selected);
        scene.select_shape(s2);
        assert!(!scene.shape(s1).unwrap().selected);
        assert!(scene.shape(s2).unwrap().selected);
        scene.toggle_selection(ElementRef::shape(s1));
        assert!(scene.shape(s1).unwrap().selected);
        assert_eq!(scene.selected_shape().unwrap().id, s2);
        scene.clear_selection();
        assert!(scene.shapes().iter().all(|s| !s.selected));
    }

    #[test]
    fn fresh_ids_avoid_loaded_ids() {
        let mut scene = Scene::new();
        rect(&mut scene, 0.0, 0.0, 1.0, 1.0);
        let data = scene.to_data();
        let mut other = Scene::new();
        other.load_diagram(data);
        let id = rect(&mut other, 5.0, 5.0, 1.0, 1.0);
        assert_eq!(other.shapes().iter().filter(|s| s.id == id).count(), 1);
    }

    #[test]
    fn short_paths_are_rejected() {
        let mut scene = Scene::new();
        assert!(scene.add_drawing_path(NewDrawingPath::new(vec![Point::ORIGIN])).is_none());
        assert!(scene.drawing_paths().is_empty());
    }

    #[test]
    fn move_path_resyncs_bound_arrows() {
        let mut scene = Scene::new();
        let p = scene
            .add_drawing_path(NewDrawingPath::new(vec![Point::ORIGIN, Point::new(20.0, 10.0)]))
            .unwrap();
        let a = scene.add_arrow(
            NewArrow::new(Point::new(100.0, 100.0), Point::new(200.0, 200.0))
                .bind_start(p, Some(AnchorName::BottomRight)),
        );
        scene.move_drawing_path(p, 5.0, 5.0);
        assert_eq!(scene.arrow(a).unwrap().start.point(), Point::new(25.0, 15.0));
        assert_eq!(scene.drawing_path(p).unwrap().bounds().min_x, 5.0);
    }

    #[test]
    fn update_text_and_font_size() {
        let mut scene = Scene::new();
        let t = scene.add_shape(NewShape::new(ShapeKind::Text, 0.0, 20.0, 0.0, 0.0));
        scene.update_shape_text(t, "hello");
        scene.update_shape_font_size(t, 20.0);
        let shape = scene.shape(t).unwrap();
        assert_eq!(shape.text.as_deref(), Some("hello"));
        assert_eq!(shape.font_size, 20.0);
        scene.update_shape_text(ElementId::intern("missing"), "x");
    }

    #[test]
    fn clear_canvas_empties_everything() {
        let mut scene = Scene::new();
        let s = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        scene.select_shape(s);
        scene.start_connection(Point::ORIGIN, s, AnchorName::TopLeft);
        scene.clear_canvas();
        assert!(scene.is_empty());
        assert!(scene.selection().is_empty());
        assert!(scene.pending_connection().is_none());
    }
}
