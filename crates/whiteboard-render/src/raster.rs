//! Software renderer built on tiny-skia.
//!
//! [`RasterRenderer`] keeps a retained copy of the scene, fed either through
//! [`RenderSurface`] operations or a full [`RenderContext`], and rasterizes
//! frames into a [`Pixmap`]. Text glyphs come from rusttype outlines when a
//! font is loaded; without one a text box is drawn as its outline only.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, PathEl, Size};
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use whiteboard_core::camera::Camera;
use whiteboard_core::canvas::CanvasDocument;
use whiteboard_core::shapes::{Freehand, SerializableColor, Shape, ShapeId, ShapeTrait, Text};
use whiteboard_core::surface::RenderSurface;

/// Gap between a selected shape and its outline, in screen pixels.
const SELECTION_PADDING: f64 = 4.0;
/// Selection outline width, in screen pixels.
const SELECTION_WIDTH: f32 = 1.5;

/// Parse a TrueType/OpenType font for text rendering.
pub fn load_font(bytes: Vec<u8>) -> RenderResult<Font<'static>> {
    Font::try_from_vec(bytes)
        .ok_or_else(|| RendererError::InitFailed("unreadable font data".to_string()))
}

/// CPU renderer with a retained scene mirror.
pub struct RasterRenderer {
    document: CanvasDocument,
    camera: Camera,
    selection: Option<ShapeId>,
    selection_color: peniko::Color,
    viewport_size: Size,
    font: Option<Font<'static>>,
    frame: Option<Pixmap>,
}

impl RasterRenderer {
    /// Create a renderer for a viewport of the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            document: CanvasDocument::new(),
            camera: Camera::new(),
            selection: None,
            selection_color: peniko::Color::from_rgba8(59, 130, 246, 255),
            viewport_size: Size::new(f64::from(width), f64::from(height)),
            font: None,
            frame: None,
        }
    }

    /// Use a font for text boxes.
    pub fn with_font(mut self, font: Font<'static>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn set_font(&mut self, font: Option<Font<'static>>) {
        self.font = font;
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_size = Size::new(f64::from(width), f64::from(height));
    }

    pub fn set_selection_color(&mut self, color: peniko::Color) {
        self.selection_color = color;
    }

    /// The mirrored scene.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// The mirrored viewport.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The mirrored selection.
    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    /// Rasterize the mirrored scene and keep the result as the current frame.
    pub fn render(&mut self) -> RenderResult<&Pixmap> {
        let ctx = RenderContext::new(&self.document, &self.camera, self.viewport_size)
            .with_selection(self.selection)
            .with_selection_color(self.selection_color);
        let pixmap = rasterize(&ctx, self.font.as_ref())?;
        let frame = self.frame.insert(pixmap);
        Ok(&*frame)
    }

    /// The last rasterized frame.
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    /// Encode the last rasterized frame as PNG.
    pub fn frame_png(&self) -> RenderResult<Vec<u8>> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| RendererError::RenderFailed("no frame rendered yet".to_string()))?;
        crate::export::encode_png(frame)
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        match rasterize(ctx, self.font.as_ref()) {
            Ok(pixmap) => self.frame = Some(pixmap),
            Err(err) => {
                log::error!("Frame failed: {err}");
                self.frame = None;
            }
        }
    }
}

impl RenderSurface for RasterRenderer {
    fn add(&mut self, shape: &Shape) {
        match self.document.get_shape_mut(shape.id()) {
            Some(existing) => *existing = shape.clone(),
            None => {
                self.document.add_shape(shape.clone());
            }
        }
    }

    fn update(&mut self, shape: &Shape) {
        match self.document.get_shape_mut(shape.id()) {
            Some(existing) => *existing = shape.clone(),
            None => log::warn!("Update for unknown shape {}", shape.id()),
        }
    }

    fn remove(&mut self, id: ShapeId) {
        self.document.remove_shape(id);
        if self.selection == Some(id) {
            self.selection = None;
        }
    }

    fn reset(&mut self, document: &CanvasDocument) {
        self.document = document.clone();
    }

    fn set_viewport(&mut self, camera: &Camera) {
        self.camera = camera.clone();
    }

    fn set_selection(&mut self, selection: Option<ShapeId>) {
        self.selection = selection;
    }
}

/// Rasterize one frame of a render context.
pub(crate) fn rasterize(ctx: &RenderContext, font: Option<&Font<'static>>) -> RenderResult<Pixmap> {
    let (width, height) = ctx.pixel_size();
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RendererError::RenderFailed(format!("cannot allocate {width}x{height} pixmap"))
    })?;
    pixmap.fill(skia_color(ctx.background_color.into()));

    let zoom = ctx.camera.zoom;
    let transform = skia_transform(ctx.camera.transform());
    for shape in ctx.document.shapes() {
        draw_shape(&mut pixmap, shape, transform, zoom, font);
    }

    if let Some(shape) = ctx.selection.and_then(|id| ctx.document.get_shape(id)) {
        draw_selection(&mut pixmap, shape, ctx.camera.transform(), ctx.selection_color.into());
    }

    Ok(pixmap)
}

fn draw_shape(
    pixmap: &mut Pixmap,
    shape: &Shape,
    transform: Transform,
    zoom: f64,
    font: Option<&Font<'static>>,
) {
    let style = shape.style();
    match shape {
        Shape::Text(text) => draw_text(pixmap, text, transform, zoom, font),
        Shape::Freehand(stroke) if stroke.len() == 1 => draw_dot(pixmap, stroke, transform),
        _ => {
            let Some(path) = skia_path(&shape.to_path()) else {
                return;
            };
            if let Some(fill) = style.fill_color {
                if !matches!(shape, Shape::Freehand(_)) {
                    pixmap.fill_path(&path, &paint(fill), FillRule::Winding, transform, None);
                }
            }
            if style.stroke_width > 0.0 {
                let stroke = Stroke {
                    width: style.stroke_width as f32,
                    line_cap: LineCap::Round,
                    line_join: LineJoin::Round,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &paint(style.stroke_color), &stroke, transform, None);
            }
        }
    }
}

/// A one-point stroke shows as a disc of the brush width.
fn draw_dot(pixmap: &mut Pixmap, stroke: &Freehand, transform: Transform) {
    let Some(point) = stroke.points.first() else {
        return;
    };
    let radius = (stroke.style.stroke_width / 2.0).max(0.5) as f32;
    if let Some(path) = PathBuilder::from_circle(point.x as f32, point.y as f32, radius) {
        pixmap.fill_path(
            &path,
            &paint(stroke.style.stroke_color),
            FillRule::Winding,
            transform,
            None,
        );
    }
}

fn draw_text(
    pixmap: &mut Pixmap,
    text: &Text,
    transform: Transform,
    zoom: f64,
    font: Option<&Font<'static>>,
) {
    let color = text.style.fill_color.unwrap_or(text.style.stroke_color);

    let Some(font) = font else {
        let bounds = text.bounds();
        let Some(rect) = Rect::from_ltrb(
            bounds.x0 as f32,
            bounds.y0 as f32,
            bounds.x1 as f32,
            bounds.y1 as f32,
        ) else {
            return;
        };
        let stroke = Stroke {
            width: (1.0 / zoom) as f32,
            ..Default::default()
        };
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(&path, &paint(color), &stroke, transform, None);
        return;
    };

    let scale = Scale::uniform(text.font_size as f32);
    let ascent = font.v_metrics(scale).ascent;
    let line_height = (text.font_size * Text::LINE_HEIGHT) as f32;
    let mut builder = GlyphPathBuilder(PathBuilder::new());

    for (row, line) in text.wrapped_lines().iter().enumerate() {
        let start = rt_point(
            text.position.x as f32,
            text.position.y as f32 + ascent + row as f32 * line_height,
        );
        for glyph in font.layout(line, scale, start) {
            glyph.build_outline(&mut builder);
        }
    }

    if let Some(path) = builder.0.finish() {
        pixmap.fill_path(&path, &paint(color), FillRule::Winding, transform, None);
    }
}

fn draw_selection(pixmap: &mut Pixmap, shape: &Shape, camera: Affine, color: SerializableColor) {
    let bounds = camera
        .transform_rect_bbox(shape.bounds())
        .inflate(SELECTION_PADDING, SELECTION_PADDING);
    let Some(rect) = Rect::from_ltrb(
        bounds.x0 as f32,
        bounds.y0 as f32,
        bounds.x1 as f32,
        bounds.y1 as f32,
    ) else {
        return;
    };
    let stroke = Stroke {
        width: SELECTION_WIDTH,
        ..Default::default()
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
}

/// Collects rusttype glyph outlines into a tiny-skia path.
struct GlyphPathBuilder(PathBuilder);

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

fn paint(color: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
