//! Shape definitions for the whiteboard.

mod ellipse;
mod freehand;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use std::fmt;
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let single = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
                Some(Self::new(single(0)?, single(1)?, single(2)?, 255))
            }
            6 => Some(Self::new(pair(0)?, pair(2)?, pair(4)?, 255)),
            8 => Some(Self::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in world units.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
}

impl ShapeStyle {
    /// Create a stroke-only style.
    pub fn new(stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
            fill_color: None,
        }
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill_color: Option<SerializableColor>) -> Self {
        self.fill_color = fill_color;
        self
    }

    /// Whether every numeric field is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.stroke_width.is_finite() && self.stroke_width >= 0.0
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::new(SerializableColor::black(), 2.0)
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);

    /// Whether the geometry holds only finite, non-negative extents.
    fn is_valid(&self) -> bool;
}

/// Enum wrapper for all shape types.
///
/// The position of a shape in [`crate::CanvasDocument`] is its z-order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(Text),
    Freehand(Freehand),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Ellipse(s) => s.id(),
            Shape::Text(s) => s.id(),
            Shape::Freehand(s) => s.id(),
        }
    }

    /// Kind tag used in documents and log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
            Shape::Ellipse(_) => "ellipse",
            Shape::Text(_) => "textbox",
            Shape::Freehand(_) => "path",
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
            Shape::Freehand(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Rectangle(s) => s.hit_test(point, tolerance),
            Shape::Ellipse(s) => s.hit_test(point, tolerance),
            Shape::Text(s) => s.hit_test(point, tolerance),
            Shape::Freehand(s) => s.hit_test(point, tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rectangle(s) => s.to_path(),
            Shape::Ellipse(s) => s.to_path(),
            Shape::Text(s) => s.to_path(),
            Shape::Freehand(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style(),
            Shape::Ellipse(s) => s.style(),
            Shape::Text(s) => s.style(),
            Shape::Freehand(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Ellipse(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
            Shape::Freehand(s) => s.style_mut(),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            Shape::Rectangle(s) => s.transform(affine),
            Shape::Ellipse(s) => s.transform(affine),
            Shape::Text(s) => s.transform(affine),
            Shape::Freehand(s) => s.transform(affine),
        }
    }

    /// Move the shape by a world-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.transform(Affine::translate(delta));
    }

    /// Whether geometry and style are finite and well-formed.
    pub fn is_valid(&self) -> bool {
        let geometry = match self {
            Shape::Rectangle(s) => s.is_valid(),
            Shape::Ellipse(s) => s.is_valid(),
            Shape::Text(s) => s.is_valid(),
            Shape::Freehand(s) => s.is_valid(),
        };
        geometry && self.style().is_valid()
    }

    /// Regenerate the shape's ID with a new unique identifier.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Shape::Rectangle(s) => s.id = new_id,
            Shape::Ellipse(s) => s.id = new_id,
            Shape::Text(s) => s.id = new_id,
            Shape::Freehand(s) => s.id = new_id,
        }
    }

    /// Get the freehand path if this shape is one.
    pub fn as_freehand_mut(&mut self) -> Option<&mut Freehand> {
        match self {
            Shape::Freehand(f) => Some(f),
            _ => None,
        }
    }

    /// Merge a patch into this shape.
    ///
    /// All-or-nothing: returns false and leaves the shape untouched when the
    /// patch carries a non-finite or negative value, or would empty a path.
    pub fn apply_patch(&mut self, patch: &ShapePatch) -> bool {
        if !patch.is_valid() {
            return false;
        }

        match self {
            Shape::Rectangle(rect) => {
                if let Some(position) = patch.position {
                    rect.position = position;
                }
                if let Some(width) = patch.width {
                    rect.width = width;
                }
                if let Some(height) = patch.height {
                    rect.height = height;
                }
            }
            Shape::Ellipse(ellipse) => {
                if let Some(center) = patch.center {
                    ellipse.center = center;
                }
                if let Some(rx) = patch.radius_x {
                    ellipse.radius_x = rx;
                }
                if let Some(ry) = patch.radius_y {
                    ellipse.radius_y = ry;
                }
            }
            Shape::Text(text) => {
                if let Some(position) = patch.position {
                    text.position = position;
                }
                if let Some(width) = patch.width {
                    text.width = width;
                }
                if let Some(content) = &patch.content {
                    text.content = content.clone();
                }
                if let Some(font_size) = patch.font_size {
                    text.font_size = font_size;
                }
            }
            Shape::Freehand(freehand) => {
                if let Some(points) = &patch.points {
                    freehand.points = points.clone();
                }
            }
        }

        let style = self.style_mut();
        if let Some(fill) = patch.fill_color {
            style.fill_color = fill;
        }
        if let Some(stroke) = patch.stroke_color {
            style.stroke_color = stroke;
        }
        if let Some(width) = patch.stroke_width {
            style.stroke_width = width;
        }
        true
    }
}

/// Partial update merged into a shape by [`Shape::apply_patch`].
///
/// Fields that do not apply to the target variant are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    /// Top-left corner (rectangles and text boxes).
    pub position: Option<Point>,
    /// Width (rectangles and text boxes).
    pub width: Option<f64>,
    /// Height (rectangles).
    pub height: Option<f64>,
    /// Center (ellipses).
    pub center: Option<Point>,
    pub radius_x: Option<f64>,
    pub radius_y: Option<f64>,
    /// Text content (text boxes).
    pub content: Option<String>,
    pub font_size: Option<f64>,
    /// Replacement point list (freehand paths).
    pub points: Option<Vec<Point>>,
    /// `Some(None)` removes the fill.
    pub fill_color: Option<Option<SerializableColor>>,
    pub stroke_color: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
}

impl ShapePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_center(mut self, center: Point) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_radii(mut self, radius_x: f64, radius_y: f64) -> Self {
        self.radius_x = Some(radius_x);
        self.radius_y = Some(radius_y);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_fill(mut self, fill: Option<SerializableColor>) -> Self {
        self.fill_color = Some(fill);
        self
    }

    pub fn with_stroke(mut self, color: SerializableColor, width: f64) -> Self {
        self.stroke_color = Some(color);
        self.stroke_width = Some(width);
        self
    }

    fn is_valid(&self) -> bool {
        let finite_point = |p: &Point| p.x.is_finite() && p.y.is_finite();
        let extent = |v: &f64| v.is_finite() && *v >= 0.0;

        self.position.as_ref().is_none_or(finite_point)
            && self.center.as_ref().is_none_or(finite_point)
            && self.width.as_ref().is_none_or(extent)
            && self.height.as_ref().is_none_or(extent)
            && self.radius_x.as_ref().is_none_or(extent)
            && self.radius_y.as_ref().is_none_or(extent)
            && self.stroke_width.as_ref().is_none_or(extent)
            && self.font_size.is_none_or(|s| s.is_finite() && s > 0.0)
            && self
                .points
                .as_ref()
                .is_none_or(|points| !points.is_empty() && points.iter().all(finite_point))
    }
}
