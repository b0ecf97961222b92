//! Render surface adapter.
//!
//! A session never draws. It queues [`SurfaceOp`]s describing every scene and
//! viewport change, and a front end replays them into whatever retained
//! surface it renders with.

use crate::camera::Camera;
use crate::canvas::CanvasDocument;
use crate::shapes::{Shape, ShapeId};

/// A retained drawing surface mirroring the scene.
pub trait RenderSurface {
    /// A shape was appended on top.
    fn add(&mut self, shape: &Shape);

    /// A shape changed geometry or style; its z-order is unchanged.
    fn update(&mut self, shape: &Shape);

    /// A shape was removed.
    fn remove(&mut self, id: ShapeId);

    /// The whole scene was replaced (clear, undo/redo, load).
    fn reset(&mut self, document: &CanvasDocument);

    /// The viewport changed.
    fn set_viewport(&mut self, camera: &Camera);

    /// The selection changed. Surfaces that draw no selection ignore this.
    fn set_selection(&mut self, _selection: Option<ShapeId>) {}
}

/// A queued surface change.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Add(Shape),
    Update(Shape),
    Remove(ShapeId),
    Reset(CanvasDocument),
    Viewport(Camera),
    Selection(Option<ShapeId>),
}

impl SurfaceOp {
    /// Replay this operation onto a surface.
    pub fn apply(&self, surface: &mut dyn RenderSurface) {
        match self {
            SurfaceOp::Add(shape) => surface.add(shape),
            SurfaceOp::Update(shape) => surface.update(shape),
            SurfaceOp::Remove(id) => surface.remove(*id),
            SurfaceOp::Reset(document) => surface.reset(document),
            SurfaceOp::Viewport(camera) => surface.set_viewport(camera),
            SurfaceOp::Selection(selection) => surface.set_selection(*selection),
        }
    }
}
