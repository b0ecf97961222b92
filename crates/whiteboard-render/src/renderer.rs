//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use thiserror::Error;
use whiteboard_core::camera::Camera;
use whiteboard_core::canvas::CanvasDocument;
use whiteboard_core::shapes::ShapeId;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The scene to render.
    pub document: &'a CanvasDocument,
    /// World-to-screen mapping.
    pub camera: &'a Camera,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Shape outlined as selected.
    pub selection: Option<ShapeId>,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context. The background comes from the document.
    pub fn new(document: &'a CanvasDocument, camera: &'a Camera, viewport_size: Size) -> Self {
        Self {
            document,
            camera,
            viewport_size,
            background_color: document.background_color.into(),
            selection: None,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }

    /// Set the selected shape.
    pub fn with_selection(mut self, selection: Option<ShapeId>) -> Self {
        self.selection = selection;
        self
    }

    /// Set the selection highlight color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Viewport size in whole pixels, at least 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let to_px = |v: f64| if v.is_finite() { v.round().max(1.0) as u32 } else { 1 };
        (to_px(self.viewport_size.width), to_px(self.viewport_size.height))
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the frame for a render context.
    ///
    /// Called once per frame; prepares every drawing command for the context.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
