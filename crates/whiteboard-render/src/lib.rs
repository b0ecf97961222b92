//! Whiteboard Render Library
//!
//! Renderer abstraction and a software implementation for the whiteboard.
//! Frames are rasterized on the CPU with tiny-skia and exported as PNG.

mod export;
mod raster;
mod renderer;

pub use export::{
    default_export_file_name, encode_png, export_file_name, export_png, PngRenderResult,
};
pub use raster::{load_font, RasterRenderer};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use rusttype::Font;
