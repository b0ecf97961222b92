//! PNG export of the visible scene.

use crate::raster::rasterize;
use crate::renderer::{RenderContext, RenderResult};
use chrono::NaiveDate;
use kurbo::{Point, Size};
use rusttype::Font;
use tiny_skia::Pixmap;
use whiteboard_core::camera::Camera;
use whiteboard_core::canvas::CanvasDocument;

/// Result of PNG rendering - contains the raw RGBA pixel data and dimensions.
#[derive(Debug)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel, not premultiplied).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PngRenderResult {
    fn from_pixmap(pixmap: &Pixmap) -> Self {
        let rgba_data = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let c = pixel.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Self {
            rgba_data,
            width: pixmap.width(),
            height: pixmap.height(),
        }
    }

    /// Encode the pixels as a PNG file.
    pub fn encode(&self) -> RenderResult<Vec<u8>> {
        encode_rgba(&self.rgba_data, self.width, self.height)
    }
}

/// Render the viewport's surface at 1:1 scale.
///
/// The image is `width` x `height` pixels and its top-left corner is the world
/// point under the viewport's top-left corner. The camera's zoom is ignored,
/// so the same scene and viewport origin always give the same pixels.
pub fn export_png(
    document: &CanvasDocument,
    camera: &Camera,
    width: u32,
    height: u32,
    font: Option<&Font<'static>>,
) -> RenderResult<PngRenderResult> {
    let origin = camera.screen_to_world(Point::ZERO);
    let export_camera = Camera {
        offset: -origin.to_vec2(),
        zoom: 1.0,
        ..camera.clone()
    };
    let ctx = RenderContext::new(
        document,
        &export_camera,
        Size::new(f64::from(width), f64::from(height)),
    );
    let pixmap = rasterize(&ctx, font)?;
    log::debug!(
        "Exported {}x{} from ({:.1}, {:.1}), {} shapes",
        pixmap.width(),
        pixmap.height(),
        origin.x,
        origin.y,
        document.len()
    );
    Ok(PngRenderResult::from_pixmap(&pixmap))
}

/// Encode a rasterized frame as PNG.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    PngRenderResult::from_pixmap(pixmap).encode()
}

fn encode_rgba(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

/// Export file name for a given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("whiteboard-{}.png", date.format("%Y-%m-%d"))
}

/// Export file name for today, `whiteboard-YYYY-MM-DD.png`.
pub fn default_export_file_name() -> String {
    export_file_name(chrono::Local::now().date_naive())
}
