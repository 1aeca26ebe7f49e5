//! Diagram entities: shapes, arrows, freehand paths.
//!
//! Entities are plain serde structs. The only derived state is on
//! `DrawingPath` (bounding box + boundary anchors), which is private and
//! recomputed through `DrawingPath::refresh_geometry` whenever the points or
//! rotation change, including right after deserialization.

use crate::anchors::{Anchor, box_anchors};
use crate::geometry::{BoundingBox, bounding_box, normalize_rotation};
use crate::id::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Default font size for new shapes before zoom compensation.
pub const BASE_FONT_SIZE: f64 = 14.0;
/// Approximate glyph advance as a fraction of the font size.
pub const TEXT_CHAR_WIDTH_RATIO: f64 = 0.6;
/// Character count assumed for empty text when sizing its box.
pub const EMPTY_TEXT_CHARS: usize = 20;

pub const TRANSPARENT: &str = "transparent";
pub const DEFAULT_SHAPE_FILL: &str = "white";
pub const DEFAULT_SHAPE_STROKE: &str = "#cccccc";
pub const DEFAULT_LINE_STROKE: &str = "#333333";
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

fn default_font_size() -> f64 {
    BASE_FONT_SIZE
}

fn default_line_stroke() -> String {
    DEFAULT_LINE_STROKE.to_string()
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ─── Element kinds ───────────────────────────────────────────────────────

/// Discriminator for the three top-level entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Shape,
    Arrow,
    DrawingPath,
}

/// A tagged reference to one entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    pub fn shape(id: ElementId) -> Self {
        Self {
            kind: ElementKind::Shape,
            id,
        }
    }

    pub fn arrow(id: ElementId) -> Self {
        Self {
            kind: ElementKind::Arrow,
            id,
        }
    }

    pub fn drawing_path(id: ElementId) -> Self {
        Self {
            kind: ElementKind::DrawingPath,
            id,
        }
    }
}

// ─── Anchors ─────────────────────────────────────────────────────────────

/// The eight named connection points ("dots") on an owner's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorName {
    TopLeft,
    TopCenter,
    TopRight,
    RightCenter,
    BottomRight,
    BottomCenter,
    BottomLeft,
    LeftCenter,
}

impl AnchorName {
    /// All anchors, clockwise from the top-left corner.
    pub const ALL: [AnchorName; 8] = [
        AnchorName::TopLeft,
        AnchorName::TopCenter,
        AnchorName::TopRight,
        AnchorName::RightCenter,
        AnchorName::BottomRight,
        AnchorName::BottomCenter,
        AnchorName::BottomLeft,
        AnchorName::LeftCenter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorName::TopLeft => "top-left",
            AnchorName::TopCenter => "top-center",
            AnchorName::TopRight => "top-right",
            AnchorName::RightCenter => "right-center",
            AnchorName::BottomRight => "bottom-right",
            AnchorName::BottomCenter => "bottom-center",
            AnchorName::BottomLeft => "bottom-left",
            AnchorName::LeftCenter => "left-center",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Unit-box coordinates of this anchor: (0,0) top-left, (1,1) bottom-right.
    pub fn unit_position(self) -> (f64, f64) {
        match self {
            AnchorName::TopLeft => (0.0, 0.0),
            AnchorName::TopCenter => (0.5, 0.0),
            AnchorName::TopRight => (1.0, 0.0),
            AnchorName::RightCenter => (1.0, 0.5),
            AnchorName::BottomRight => (1.0, 1.0),
            AnchorName::BottomCenter => (0.5, 1.0),
            AnchorName::BottomLeft => (0.0, 1.0),
            AnchorName::LeftCenter => (0.0, 0.5),
        }
    }
}

// ─── Shape ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Text,
}

/// A rectangle, ellipse, or text label.
///
/// `x, y` is the top-left corner, except for text where it is the left end
/// of the baseline and the box extends upwards by one font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub fill: String,
    #[serde(default)]
    pub stroke: String,
    #[serde(default)]
    pub stroke_width: f64,
    /// Mirrors the scene selection; never written out.
    #[serde(default, skip_serializing)]
    pub selected: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Shape {
    /// Synthetic text box size: character count × font metric.
    pub fn text_extent(&self) -> (f64, f64) {
        let chars = match self.text.as_deref() {
            Some(t) if !t.is_empty() => t.chars().count(),
            _ => EMPTY_TEXT_CHARS,
        };
        (
            chars as f64 * self.font_size * TEXT_CHAR_WIDTH_RATIO,
            self.font_size,
        )
    }

    /// Unrotated bounds. Text shapes use their synthetic text box.
    pub fn bounds(&self) -> BoundingBox {
        match self.kind {
            ShapeKind::Text => {
                let (w, h) = self.text_extent();
                BoundingBox::from_origin_size(self.x, self.y - h, w, h)
            }
            ShapeKind::Rectangle | ShapeKind::Ellipse => {
                BoundingBox::from_origin_size(self.x, self.y, self.width, self.height)
            }
        }
    }

    /// Rotation pivot.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

/// Caller-supplied data for `Scene::add_shape`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShape {
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: Option<String>,
    pub font_size: f64,
    pub rotation: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

impl NewShape {
    /// A shape with the default look for its kind: white boxes with a light
    /// outline, or an empty transparent text label.
    pub fn new(kind: ShapeKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        let (fill, stroke, stroke_width, text) = match kind {
            ShapeKind::Text => (TRANSPARENT, TRANSPARENT, 0.0, Some(String::new())),
            ShapeKind::Rectangle | ShapeKind::Ellipse => {
                (DEFAULT_SHAPE_FILL, DEFAULT_SHAPE_STROKE, 1.0, None)
            }
        };
        Self {
            kind,
            x,
            y,
            width,
            height,
            text,
            font_size: BASE_FONT_SIZE,
            rotation: 0.0,
            fill: fill.to_string(),
            stroke: stroke.to_string(),
            stroke_width,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub(crate) fn into_shape(self, id: ElementId, created_at: i64) -> Shape {
        Shape {
            id,
            kind: self.kind,
            x: self.x,
            y: self.y,
            width: self.width.max(0.0),
            height: self.height.max(0.0),
            text: self.text,
            font_size: self.font_size,
            rotation: normalize_rotation(self.rotation),
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            selected: false,
            created_at,
        }
    }
}

// ─── Arrow ───────────────────────────────────────────────────────────────

/// Attachment of an arrow endpoint to an owner's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub owner: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorName>,
}

/// One end of an arrow. When `binding` is set, `x, y` is only a cache of
/// the bound anchor's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowEnd {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

impl ArrowEnd {
    pub fn free(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            binding: None,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_point(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub fn is_bound_to(&self, owner: ElementId) -> bool {
        self.binding.is_some_and(|b| b.owner == owner)
    }
}

/// A bend point of a curved arrow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: ElementId,
    pub start: ArrowEnd,
    pub end: ArrowEnd,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub control_points: SmallVec<[ControlPoint; 2]>,
    #[serde(default)]
    pub is_curved: bool,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_line_stroke")]
    pub stroke: String,
    #[serde(default = "default_line_width")]
    pub stroke_width: f64,
    /// Mirrors the scene selection; never written out.
    #[serde(default, skip_serializing)]
    pub selected: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Arrow {
    /// Start, control points (when curved), end.
    pub fn polyline(&self) -> Vec<Point> {
        let mut pts = Vec::with_capacity(self.control_points.len() + 2);
        pts.push(self.start.point());
        if self.is_curved {
            pts.extend(self.control_points.iter().map(ControlPoint::point));
        }
        pts.push(self.end.point());
        pts
    }

    pub fn bounds(&self) -> BoundingBox {
        let pts = self.polyline();
        // polyline always holds at least the two endpoints
        bounding_box(&pts).unwrap_or_else(|| {
            BoundingBox::from_corners(self.start.point(), self.end.point())
        })
    }

    pub fn is_bound_to(&self, owner: ElementId) -> bool {
        self.start.is_bound_to(owner) || self.end.is_bound_to(owner)
    }

    /// Drop all control points and return to a straight segment.
    pub fn make_straight(&mut self) {
        self.control_points.clear();
        self.is_curved = false;
    }
}

/// Caller-supplied data for `Scene::add_arrow`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrow {
    pub start: Point,
    pub end: Point,
    /// Owner to bind the start to; a missing anchor snaps to the closest one.
    pub start_binding: Option<Binding>,
    pub end_binding: Option<Binding>,
    pub stroke: String,
    pub stroke_width: f64,
}

impl NewArrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            start_binding: None,
            end_binding: None,
            stroke: DEFAULT_LINE_STROKE.to_string(),
            stroke_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn bind_start(mut self, owner: ElementId, anchor: Option<AnchorName>) -> Self {
        self.start_binding = Some(Binding { owner, anchor });
        self
    }

    pub fn bind_end(mut self, owner: ElementId, anchor: Option<AnchorName>) -> Self {
        self.end_binding = Some(Binding { owner, anchor });
        self
    }
}

// ─── Drawing path ────────────────────────────────────────────────────────

/// A freehand stroke with derived bounds and boundary anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredDrawingPath")]
pub struct DrawingPath {
    pub id: ElementId,
    points: Vec<Point>,
    bounds: BoundingBox,
    anchors: [Anchor; 8],
    rotation: f64,
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(skip_serializing)]
    pub selected: bool,
    pub created_at: i64,
}

/// On-disk form: derived fields are ignored and recomputed on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDrawingPath {
    id: ElementId,
    points: Vec<Point>,
    #[serde(default)]
    rotation: f64,
    #[serde(default = "default_line_stroke")]
    stroke: String,
    #[serde(default = "default_line_width")]
    stroke_width: f64,
    #[serde(default)]
    selected: bool,
    #[serde(default)]
    created_at: i64,
}

impl From<StoredDrawingPath> for DrawingPath {
    fn from(s: StoredDrawingPath) -> Self {
        let mut path = DrawingPath::new(s.id, s.points, s.stroke, s.stroke_width, s.created_at);
        path.rotation = normalize_rotation(s.rotation);
        path.selected = s.selected;
        path.refresh_geometry();
        path
    }
}

impl DrawingPath {
    pub fn new(
        id: ElementId,
        points: Vec<Point>,
        stroke: String,
        stroke_width: f64,
        created_at: i64,
    ) -> Self {
        let mut path = Self {
            id,
            points,
            bounds: BoundingBox::from_origin_size(0.0, 0.0, 0.0, 0.0),
            anchors: box_anchors(&BoundingBox::from_origin_size(0.0, 0.0, 0.0, 0.0), 0.0),
            rotation: 0.0,
            stroke,
            stroke_width,
            selected: false,
            created_at,
        };
        path.refresh_geometry();
        path
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn anchors(&self) -> &[Anchor; 8] {
        &self.anchors
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
        self.refresh_geometry();
    }

    pub fn set_rotation(&mut self, angle: f64) {
        self.rotation = normalize_rotation(angle);
        self.refresh_geometry();
    }

    /// Recompute bounds and anchors from `points` and `rotation`.
    fn refresh_geometry(&mut self) {
        if let Some(bb) = bounding_box(&self.points) {
            self.bounds = bb;
        }
        self.anchors = box_anchors(&self.bounds, self.rotation);
    }
}

/// Caller-supplied data for `Scene::add_drawing_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrawingPath {
    pub points: Vec<Point>,
    pub stroke: String,
    pub stroke_width: f64,
}

impl NewDrawingPath {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            stroke: DEFAULT_LINE_STROKE.to_string(),
            stroke_width: DEFAULT_LINE_WIDTH,
        }
    }
}

// ─── Diagram ─────────────────────────────────────────────────────────────

/// The full content of a diagram. Missing collections default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramData {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub arrows: Vec<Arrow>,
    #[serde(default)]
    pub drawing_paths: Vec<DrawingPath>,
}

impl DiagramData {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.arrows.is_empty() && self.drawing_paths.is_empty()
    }
}
