//! Tools and the drawing gesture.
//!
//! The drawing gesture is a small `Idle → Drawing → Idle` machine. A drag
//! only commits when it clears the tool's zoom-compensated minimum size;
//! anything smaller is discarded without touching the scene.
//!
//! | Tool | Commits when | Creates |
//! |------|--------------|---------|
//! | Rectangle / Ellipse / Text | both sides `> min_shape_size / zoom` | shape |
//! | Arrow | length `> min_arrow_length / zoom` | arrow, ends bound by proximity |
//! | Pen | at least two samples | freehand path |

use crate::config::EditorConfig;
use eu_core::geometry::BoundingBox;
use eu_core::{
    Binding, ElementId, ElementRef, NewArrow, NewDrawingPath, NewShape, Point, Scene, ShapeKind,
};

/// The active tool determines how pointer input is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Ellipse,
    Text,
    Arrow,
    Pen,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Text => "text",
            ToolKind::Arrow => "arrow",
            ToolKind::Pen => "pen",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(ToolKind::Select),
            "rectangle" | "rect" => Some(ToolKind::Rectangle),
            "ellipse" => Some(ToolKind::Ellipse),
            "text" => Some(ToolKind::Text),
            "arrow" => Some(ToolKind::Arrow),
            "pen" => Some(ToolKind::Pen),
            _ => None,
        }
    }

    /// Shape kind produced by a box-drawing tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Text => Some(ShapeKind::Text),
            ToolKind::Select | ToolKind::Arrow | ToolKind::Pen => None,
        }
    }

    pub fn is_drawing_tool(self) -> bool {
        self != ToolKind::Select
    }
}

// ─── Drawing gesture ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct Stroke {
    tool: ToolKind,
    start: Point,
    current: Point,
    /// Freehand samples (pen only).
    points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingGesture {
    stroke: Option<Stroke>,
}

impl DrawingGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Tool, start, and current point of the gesture in progress.
    pub fn preview(&self) -> Option<(ToolKind, Point, Point)> {
        self.stroke.as_ref().map(|s| (s.tool, s.start, s.current))
    }

    /// Buffered freehand samples of the gesture in progress.
    pub fn pen_points(&self) -> &[Point] {
        self.stroke
            .as_ref()
            .map(|s| s.points.as_slice())
            .unwrap_or_default()
    }

    /// Begin a drag at `world`. Clears the selection.
    pub fn start_drawing(&mut self, scene: &mut Scene, world: Point, tool: ToolKind) {
        let points = if tool == ToolKind::Pen {
            vec![world]
        } else {
            Vec::new()
        };
        self.stroke = Some(Stroke {
            tool,
            start: world,
            current: world,
            points,
        });
        scene.clear_selection();
    }

    /// Track the pointer. Pen samples closer than the minimum spacing to
    /// the previous sample are dropped.
    pub fn update_drawing(&mut self, world: Point, config: &EditorConfig) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        stroke.current = world;
        if stroke.tool == ToolKind::Pen {
            push_sample(&mut stroke.points, world, config.pen_min_spacing);
        }
    }

    pub fn cancel(&mut self) {
        self.stroke = None;
    }

    /// Finish the drag at `world`. Returns the created element, or `None`
    /// if the gesture was too small (or nothing was being drawn).
    pub fn complete_drawing(
        &mut self,
        scene: &mut Scene,
        world: Point,
        zoom: f64,
        config: &EditorConfig,
    ) -> Option<ElementRef> {
        let mut stroke = self.stroke.take()?;
        stroke.current = world;
        match stroke.tool {
            ToolKind::Select => None,
            ToolKind::Pen => {
                push_sample(&mut stroke.points, world, config.pen_min_spacing);
                if stroke.points.len() < 2 {
                    log::debug!("pen stroke discarded: {} samples", stroke.points.len());
                    return None;
                }
                scene
                    .add_drawing_path(NewDrawingPath::new(stroke.points))
                    .map(ElementRef::drawing_path)
            }
            ToolKind::Arrow => {
                let length = stroke.start.distance(world);
                if length <= config.min_arrow_length / zoom {
                    log::debug!("arrow discarded: length {length:.1} at zoom {zoom}");
                    return None;
                }
                let mut arrow = NewArrow::new(stroke.start, world);
                arrow.start_binding = owner_near(scene, stroke.start, config.bind_margin)
                    .map(|owner| Binding { owner, anchor: None });
                arrow.end_binding = owner_near(scene, world, config.bind_margin)
                    .map(|owner| Binding { owner, anchor: None });
                Some(ElementRef::arrow(scene.add_arrow(arrow)))
            }
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Text => {
                let bb = BoundingBox::from_corners(stroke.start, world);
                let min = config.min_shape_size / zoom;
                if bb.width() <= min || bb.height() <= min {
                    log::debug!(
                        "{} discarded: {:.1}x{:.1} at zoom {zoom}",
                        stroke.tool.name(),
                        bb.width(),
                        bb.height()
                    );
                    return None;
                }
                let kind = stroke.tool.shape_kind()?;
                let shape = NewShape::new(kind, bb.min_x, bb.min_y, bb.width(), bb.height())
                    .with_font_size(config.font_size_for_zoom(zoom));
                Some(ElementRef::shape(scene.add_shape(shape)))
            }
        }
    }
}

fn push_sample(points: &mut Vec<Point>, p: Point, min_spacing: f64) {
    if points.last().is_none_or(|last| last.distance(p) > min_spacing) {
        points.push(p);
    }
}

/// Topmost shape, then topmost path, whose bounds grown by `margin`
/// contain `p`.
pub fn owner_near(scene: &Scene, p: Point, margin: f64) -> Option<ElementId> {
    scene
        .shapes()
        .iter()
        .rev()
        .find(|s| s.bounds().expanded(margin).contains(p))
        .map(|s| s.id)
        .or_else(|| {
            scene
                .drawing_paths()
                .iter()
                .rev()
                .find(|d| d.bounds().expanded(margin).contains(p))
                .map(|d| d.id)
        })
}
