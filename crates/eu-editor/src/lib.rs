pub mod config;
pub mod editor;
pub mod hit;
pub mod input;
pub mod rotate;
pub mod selection;
pub mod shortcuts;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use input::{DeltaMode, Modifiers, PointerButton, WheelInput};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{DrawingGesture, ToolKind};
pub use viewport::{Viewport, WheelAction};
