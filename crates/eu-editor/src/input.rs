//! Host input events, already stripped of platform details.

use eu_core::Point;

/// Modifier key state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, ⌘ on macOS.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    /// Wheel button: always pans.
    Middle,
    Secondary,
}

/// Units of a wheel delta, as reported by the browser `WheelEvent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// A wheel or trackpad scroll at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Cursor position in screen space, relative to the canvas origin.
    pub position: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: DeltaMode,
    pub modifiers: Modifiers,
}

impl WheelInput {
    pub fn new(position: Point, delta_x: f64, delta_y: f64) -> Self {
        Self {
            position,
            delta_x,
            delta_y,
            delta_mode: DeltaMode::Pixel,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_mode(mut self, mode: DeltaMode) -> Self {
        self.delta_mode = mode;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Small pixel-mode deltas come from a trackpad, big ones from a wheel.
    pub fn is_trackpad(&self, threshold: f64) -> bool {
        self.delta_y.abs() < threshold && self.delta_mode == DeltaMode::Pixel
    }
}
