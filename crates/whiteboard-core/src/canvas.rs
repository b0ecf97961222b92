//! Canvas document: the ordered scene of shapes.

use crate::shapes::{SerializableColor, Shape, ShapeId, ShapePatch};
use kurbo::{Point, Rect};

/// A canvas document containing all shapes.
///
/// Shapes are kept back to front; a shape's index is its z-order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDocument {
    /// Color painted behind every shape.
    pub background_color: SerializableColor,
    shapes: Vec<Shape>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document with a white background.
    pub fn new() -> Self {
        Self::with_background(SerializableColor::white())
    }

    /// Create a new empty document with the given background.
    pub fn with_background(background_color: SerializableColor) -> Self {
        Self {
            background_color,
            shapes: Vec::new(),
        }
    }

    /// Assemble a document from already validated shapes.
    pub(crate) fn from_parts(background_color: SerializableColor, shapes: Vec<Shape>) -> Self {
        Self {
            background_color,
            shapes,
        }
    }

    /// Add a shape on top of the scene.
    ///
    /// A shape whose id is already present gets a fresh id. Shapes with
    /// non-finite geometry are rejected.
    pub fn add_shape(&mut self, mut shape: Shape) -> Option<ShapeId> {
        if !shape.is_valid() {
            log::warn!("Rejected {} with invalid geometry", shape.kind_name());
            return None;
        }
        if self.index_of(shape.id()).is_some() {
            let old = shape.id();
            shape.regenerate_id();
            log::warn!("Duplicate shape id {old}, reassigned to {}", shape.id());
        }
        let id = shape.id();
        self.shapes.push(shape);
        Some(id)
    }

    /// Merge a patch into a shape. Returns false when the id is unknown or
    /// the patch is rejected.
    pub fn update_shape(&mut self, id: ShapeId, patch: &ShapePatch) -> bool {
        match self.get_shape_mut(id) {
            Some(shape) => shape.apply_patch(patch),
            None => false,
        }
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        Some(self.shapes.remove(index))
    }

    /// Remove all shapes and restore the white background.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.background_color = SerializableColor::white();
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Shapes in z-order (back to front).
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Z-index of a shape.
    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Get the bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Find shapes at a point (in world coordinates), front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| s.hit_test(point, tolerance))
            .map(Shape::id)
            .collect()
    }

    /// The front-most shape under a point.
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(point, tolerance))
            .map(Shape::id)
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}
