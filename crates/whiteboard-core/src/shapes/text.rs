//! Text box shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// A fixed-width text box. Its height follows from the wrapped content.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Top-left corner of the box.
    pub position: Point,
    /// Box width; content wraps at this width.
    pub width: f64,
    /// The text content.
    pub content: String,
    /// Font size in world units.
    pub font_size: f64,
    /// Style properties. The fill color is the text color.
    pub style: ShapeStyle,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.2;

    /// Average glyph advance as a multiple of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    /// Create a new text box.
    pub fn new(position: Point, width: f64, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    /// Reconstruct a text box with a specific ID (for documents).
    pub(crate) fn reconstruct(
        id: ShapeId,
        position: Point,
        width: f64,
        content: String,
        font_size: f64,
        style: ShapeStyle,
    ) -> Self {
        Self {
            id,
            position,
            width,
            content,
            font_size,
            style,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    fn chars_per_line(&self) -> usize {
        let char_width = self.font_size * Self::CHAR_WIDTH_FACTOR;
        if char_width > 0.0 {
            ((self.width / char_width).floor() as usize).max(1)
        } else {
            usize::MAX
        }
    }

    /// Estimated number of lines once the content is wrapped to the box width.
    pub fn line_count(&self) -> usize {
        let per_line = self.chars_per_line();
        self.content
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }

    /// Content broken into the lines counted by [`Text::line_count`].
    pub fn wrapped_lines(&self) -> Vec<String> {
        let per_line = self.chars_per_line();
        let mut lines = Vec::new();
        for line in self.content.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                lines.push(String::new());
                continue;
            }
            lines.extend(chars.chunks(per_line).map(|chunk| chunk.iter().collect::<String>()));
        }
        lines
    }

    /// Height of the box for the current content.
    pub fn height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height(),
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds().inflate(tolerance, tolerance);
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }

    fn to_path(&self) -> BezPath {
        // Glyphs are laid out by the renderer; the path is the box.
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        self.width *= affine.as_coeffs()[0].abs();
    }

    fn is_valid(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.width.is_finite()
            && self.width >= 0.0
            && self.font_size.is_finite()
            && self.font_size > 0.0
    }
}
