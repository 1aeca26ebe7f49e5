//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. `key` is the
//! `KeyboardEvent.key` value of the host (e.g. `"r"`, `"Delete"`).

use crate::tools::ToolKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    Tool(ToolKind),

    // ── Edit ──
    Delete,
    /// Remove every element from the canvas.
    ClearCanvas,
    /// Turn the selected straight arrow into a curve.
    CurveArrow,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── UI ──
    /// Drop the gesture in progress, a pending connection, and the selection.
    Cancel,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::Tool(tool) => tool.name(),
            ShortcutAction::Delete => "delete",
            ShortcutAction::ClearCanvas => "clearCanvas",
            ShortcutAction::CurveArrow => "curveArrow",
            ShortcutAction::ZoomIn => "zoomIn",
            ShortcutAction::ZoomOut => "zoomOut",
            ShortcutAction::ZoomReset => "zoomReset",
            ShortcutAction::Cancel => "cancel",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if the combo is unbound.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "Delete" | "Backspace" => Some(ShortcutAction::ClearCanvas),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::Tool(ToolKind::Select)),
            "r" | "R" => Some(ShortcutAction::Tool(ToolKind::Rectangle)),
            "o" | "O" => Some(ShortcutAction::Tool(ToolKind::Ellipse)),
            "t" | "T" => Some(ShortcutAction::Tool(ToolKind::Text)),
            "a" | "A" => Some(ShortcutAction::Tool(ToolKind::Arrow)),
            "p" | "P" => Some(ShortcutAction::Tool(ToolKind::Pen)),
            "c" | "C" => Some(ShortcutAction::CurveArrow),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", false, false, false, false),
            Some(ShortcutAction::Tool(ToolKind::Select))
        );
        assert_eq!(
            ShortcutMap::resolve("R", false, false, false, false),
            Some(ShortcutAction::Tool(ToolKind::Rectangle))
        );
        assert_eq!(
            ShortcutMap::resolve("a", false, false, false, false),
            Some(ShortcutAction::Tool(ToolKind::Arrow))
        );
        assert_eq!(
            ShortcutMap::resolve("p", false, false, false, false),
            Some(ShortcutAction::Tool(ToolKind::Pen))
        );
    }

    #[test]
    fn resolve_delete_and_clear() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Delete", false, true, false, true),
            Some(ShortcutAction::ClearCanvas)
        );
        // ⌘Delete alone is unbound
        assert_eq!(ShortcutMap::resolve("Delete", true, false, false, false), None);
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, true),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", true, false, false, false),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, true),
            Some(ShortcutAction::ZoomReset)
        );
    }

    #[test]
    fn resolve_modifier_precedence() {
        // plain "r" is a tool, ⌘R is left to the host (reload)
        assert_eq!(ShortcutMap::resolve("r", false, false, false, true), None);
        assert_eq!(ShortcutMap::resolve("r", false, true, false, false), None);
    }

    #[test]
    fn resolve_escape() {
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Cancel)
        );
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
    }
}
