//! The editor facade: one scene, one viewport, and the gesture in flight.
//!
//! Hosts feed raw screen-space pointer, wheel, and key events in and render
//! from `scene()` and the preview accessors. Every handler returns whether
//! anything visible changed.

use crate::config::EditorConfig;
use crate::hit::{anchor_at_point, control_point_at, element_at_point, owner_anchor_at_point};
use crate::input::{Modifiers, PointerButton, WheelInput};
use crate::rotate::RotationGesture;
use crate::selection::{MarqueeSelection, SelectionBox, click_select};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{DrawingGesture, ToolKind};
use crate::viewport::{Viewport, WheelAction};
use eu_core::share;
use eu_core::{Anchor, ElementId, ElementKind, ElementRef, Point, Scene, ShareError};

/// Pointer drag owned by the select tool.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    /// Moving the selected shapes and paths.
    Move { last: Point },
    Rotate(RotationGesture),
    ControlPoint { arrow: ElementId, point: ElementId },
    /// Dragging out a dot-to-dot arrow; the origin lives in the scene.
    Connect { current: Point },
}

#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    viewport: Viewport,
    config: EditorConfig,
    tool: ToolKind,
    drawing: DrawingGesture,
    marquee: MarqueeSelection,
    drag: Option<Drag>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Scene::new(), EditorConfig::default())
    }
}

impl Editor {
    pub fn new(scene: Scene, config: EditorConfig) -> Self {
        Self {
            viewport: Viewport::new(&config),
            scene,
            config,
            tool: ToolKind::Select,
            drawing: DrawingGesture::new(),
            marquee: MarqueeSelection::new(),
            drag: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for property panels (text, rotation, curves).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Drops the selection, any pending connection, and any
    /// gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gestures();
        self.scene.clear_selection();
        if tool != self.tool {
            log::debug!("tool {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
        }
    }

    fn cancel_gestures(&mut self) {
        self.drawing.cancel();
        self.marquee.cancel();
        self.drag = None;
        self.scene.cancel_connection();
    }

    // ─── Previews for rendering ──────────────────────────────────────────

    pub fn drawing_preview(&self) -> Option<(ToolKind, Point, Point)> {
        self.drawing.preview()
    }

    pub fn pen_preview(&self) -> &[Point] {
        self.drawing.pen_points()
    }

    pub fn selection_box(&self) -> Option<SelectionBox> {
        self.marquee.current()
    }

    /// Origin and current end of a dot-to-dot arrow being dragged.
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        match (self.scene.pending_connection(), self.drag) {
            (Some(c), Some(Drag::Connect { current })) => Some((c.origin, current)),
            _ => None,
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) -> bool {
        if button == PointerButton::Middle {
            self.viewport.begin_pan(screen);
            return false;
        }
        if button != PointerButton::Primary {
            return false;
        }
        let world = self.viewport.screen_to_world(screen);
        if self.tool.is_drawing_tool() {
            self.drawing.start_drawing(&mut self.scene, world, self.tool);
            return true;
        }
        self.select_pointer_down(world, modifiers)
    }

    fn select_pointer_down(&mut self, world: Point, modifiers: Modifiers) -> bool {
        let radius = self.anchor_radius();

        if let Some(arrow) = self.scene.selected_arrow()
            && let Some(point) = control_point_at(arrow, world, radius)
        {
            self.drag = Some(Drag::ControlPoint {
                arrow: arrow.id,
                point,
            });
            return false;
        }

        let hit = element_at_point(&self.scene, world, &self.config);
        if let Some((owner, anchor)) = self.dot_under_pointer(hit, world, radius) {
            self.scene.start_connection(anchor.point(), owner, anchor.name);
            self.drag = Some(Drag::Connect { current: world });
            return true;
        }

        if let Some(hit) = hit {
            if modifiers.alt {
                self.scene.select(hit);
                self.drag = RotationGesture::begin(&self.scene, hit, world).map(Drag::Rotate);
                return true;
            }
            click_select(&mut self.scene, hit, modifiers);
            if self.scene.is_selected(hit) {
                self.drag = Some(Drag::Move { last: world });
            }
            return true;
        }

        if !modifiers.cmd() {
            self.scene.clear_selection();
        }
        self.marquee.start_selection_box(world);
        true
    }

    /// Dots grab within a fixed screen distance.
    fn anchor_radius(&self) -> f64 {
        self.config.anchor_hit_radius / self.viewport.zoom()
    }

    /// A press inside a shape or path only reaches that element's own dots,
    /// and only once it is selected. Elsewhere any dot in range counts.
    fn dot_under_pointer(
        &self,
        hit: Option<ElementRef>,
        world: Point,
        radius: f64,
    ) -> Option<(ElementId, Anchor)> {
        match hit {
            Some(r) if r.kind == ElementKind::Arrow => anchor_at_point(&self.scene, world, radius),
            Some(r) if self.scene.is_selected(r) => {
                owner_anchor_at_point(&self.scene, r.id, world, radius).map(|a| (r.id, a))
            }
            Some(_) => None,
            None => anchor_at_point(&self.scene, world, radius),
        }
    }

    pub fn pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> bool {
        if self.viewport.update_pan(screen) {
            return true;
        }
        let world = self.viewport.screen_to_world(screen);
        if self.drawing.is_drawing() {
            self.drawing.update_drawing(world, &self.config);
            return true;
        }
        if self.marquee.is_selecting() {
            self.marquee.update_selection_box(world);
            return true;
        }
        match self.drag {
            Some(Drag::Move { last }) => {
                let delta = world - last;
                self.move_selection(delta.x, delta.y);
                self.drag = Some(Drag::Move { last: world });
                true
            }
            Some(Drag::Rotate(gesture)) => {
                gesture.update(&mut self.scene, world);
                true
            }
            Some(Drag::ControlPoint { arrow, point }) => {
                self.scene.update_control_point(arrow, point, world.x, world.y);
                true
            }
            Some(Drag::Connect { .. }) => {
                self.drag = Some(Drag::Connect { current: world });
                true
            }
            None => false,
        }
    }

    fn move_selection(&mut self, dx: f64, dy: f64) {
        let selection = self.scene.selection().clone();
        for id in selection.shapes() {
            self.scene.move_shape(*id, dx, dy);
        }
        for id in selection.drawing_paths() {
            self.scene.move_drawing_path(*id, dx, dy);
        }
    }

    pub fn pointer_up(&mut self, screen: Point, _modifiers: Modifiers) -> bool {
        if self.viewport.is_panning() {
            self.viewport.end_pan();
            return true;
        }
        let world = self.viewport.screen_to_world(screen);
        if self.drawing.is_drawing() {
            let created = self.drawing.complete_drawing(
                &mut self.scene,
                world,
                self.viewport.zoom(),
                &self.config,
            );
            if let Some(r) = created {
                log::debug!("{} created {}", self.tool.name(), r.id);
            }
            return true;
        }
        if self.marquee.is_selecting() {
            self.marquee.update_selection_box(world);
            self.marquee.complete_selection_box(&mut self.scene);
            return true;
        }
        match self.drag.take() {
            Some(Drag::Connect { .. }) => {
                match anchor_at_point(&self.scene, world, self.anchor_radius()) {
                    Some((owner, anchor)) => {
                        self.scene.complete_connection(anchor.point(), owner, anchor.name);
                    }
                    None => self.scene.cancel_connection(),
                }
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    // ─── Wheel and keys ──────────────────────────────────────────────────

    pub fn wheel(&mut self, input: &WheelInput) -> WheelAction {
        self.viewport.handle_wheel(input, &self.config)
    }

    /// Handle a key press. Returns the action it triggered, if any.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        )?;
        self.dispatch(action);
        Some(action)
    }

    pub fn dispatch(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::Tool(tool) => self.set_tool(tool),
            ShortcutAction::Delete => self.scene.delete_selected(),
            ShortcutAction::ClearCanvas => {
                self.cancel_gestures();
                self.scene.clear_canvas();
            }
            ShortcutAction::CurveArrow => {
                let selected: Vec<ElementId> = self.scene.selection().arrows().to_vec();
                for id in selected {
                    self.scene.convert_arrow_to_curved(id);
                }
            }
            ShortcutAction::ZoomIn => self.viewport.zoom_in(),
            ShortcutAction::ZoomOut => self.viewport.zoom_out(),
            ShortcutAction::ZoomReset => self.viewport.reset(),
            ShortcutAction::Cancel => {
                self.cancel_gestures();
                self.scene.clear_selection();
            }
        }
    }

    // ─── Sharing and persistence ─────────────────────────────────────────

    /// A link to `base_url` carrying the whole diagram.
    pub fn share_link(&self, base_url: &str) -> Result<String, ShareError> {
        share::encode(&self.scene.to_data(), base_url)
    }

    /// Replace the diagram with the one carried by `url`. Returns false (and
    /// keeps the current diagram) if the link holds none.
    pub fn open_share_link(&mut self, url: &str) -> bool {
        match share::decode(url) {
            Some(data) => {
                self.cancel_gestures();
                self.scene.load_diagram(data);
                true
            }
            None => false,
        }
    }

    /// Drive debounced persistence; call from the host's frame or timer loop.
    pub fn tick(&mut self) -> bool {
        self.scene.tick()
    }
}
