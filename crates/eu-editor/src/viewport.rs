//! Pan/zoom state and screen ↔ world mapping.
//!
//! `screen = world * zoom + pan`. Zoom is clamped to the configured range
//! on every change.

use crate::config::EditorConfig;
use crate::input::WheelInput;
use eu_core::{Point, Vec2};

/// What a wheel event did to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAction {
    Zoomed,
    Panned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
    /// Last screen position of an active drag-pan.
    pan_anchor: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
            pan_anchor: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.clamp_zoom(self.zoom * self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.clamp_zoom(self.zoom / self.zoom_step);
    }

    /// Back to zoom 1 with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Zoom to `zoom` (clamped) keeping the world point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, zoom: f64) {
        let world = self.screen_to_world(screen);
        self.zoom = self.clamp_zoom(zoom);
        self.pan = Vec2::new(
            screen.x - world.x * self.zoom,
            screen.y - world.y * self.zoom,
        );
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom on ctrl/⌘ or a plain mouse wheel; pan on trackpad scrolls and
    /// shift+wheel.
    pub fn handle_wheel(&mut self, input: &WheelInput, config: &EditorConfig) -> WheelAction {
        let trackpad = input.is_trackpad(config.trackpad_threshold);
        if input.modifiers.cmd() || (!trackpad && !input.modifiers.shift) {
            let factor = if input.delta_y > 0.0 { 0.9 } else { 1.1 };
            self.zoom_at(input.position, self.zoom * factor);
            log::trace!("wheel zoom to {:.3}", self.zoom);
            WheelAction::Zoomed
        } else {
            let speed = if trackpad {
                config.trackpad_pan_speed
            } else {
                config.wheel_pan_speed
            };
            self.pan_by(Vec2::new(-input.delta_x * speed, -input.delta_y * speed));
            WheelAction::Panned
        }
    }

    // ─── Drag panning ────────────────────────────────────────────────────

    pub fn begin_pan(&mut self, screen: Point) {
        self.pan_anchor = Some(screen);
    }

    /// Follow the pointer while a pan drag is active.
    pub fn update_pan(&mut self, screen: Point) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.pan += screen - last;
        self.pan_anchor = Some(screen);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }
}
