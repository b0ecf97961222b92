//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};

/// Zoom level of an untransformed view.
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.5;
/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

/// Camera manages the view transform for the canvas.
///
/// A world point `w` appears on screen at `w * zoom + offset`. Panning and
/// zooming only change how the scene is presented, never the scene itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with a custom zoom range.
    ///
    /// The bounds are swapped if given in the wrong order.
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: DEFAULT_ZOOM.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        let offset = self.offset + delta;
        if !(offset.x.is_finite() && offset.y.is_finite()) {
            return;
        }
        self.offset = offset;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    ///
    /// The resulting zoom is clamped to `[min_zoom, max_zoom]`. Non-finite or
    /// non-positive factors are ignored.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        if !(screen_point.x.is_finite() && screen_point.y.is_finite()) {
            return;
        }

        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Keep the world point under the anchor fixed
        let ratio = new_zoom / self.zoom;
        let anchor = screen_point.to_vec2();
        self.offset = anchor - (anchor - self.offset) * ratio;
        self.zoom = new_zoom;
    }

    /// Reset camera to identity (no pan, zoom 1, clamped to the range).
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = DEFAULT_ZOOM.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert!((camera.min_zoom - 0.5).abs() < f64::EPSILON);
        assert!((camera.max_zoom - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - 0.5).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - 5.0).abs() < f64::EPSILON);

        // Already at max: further zoom-in changes nothing
        let before = camera.clone();
        camera.zoom_at(Point::new(10.0, 10.0), 2.0);
        assert_eq!(camera, before);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(40.0, -25.0);
        let anchor = Point::new(320.0, 240.0);
        let world_before = camera.screen_to_world(anchor);

        camera.zoom_at(anchor, 1.75);
        let world_after = camera.screen_to_world(anchor);

        assert!((world_before.x - world_after.x).abs() < 1e-9);
        assert!((world_before.y - world_after.y).abs() < 1e-9);
        assert!((camera.zoom - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_ignores_bad_factor() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, f64::NAN);
        camera.zoom_at(Point::ZERO, 0.0);
        camera.zoom_at(Point::ZERO, -2.0);
        assert_eq!(camera, Camera::new());
    }

    #[test]
    fn test_custom_zoom_range() {
        let camera = Camera::with_zoom_range(2.0, 0.25);
        assert!((camera.min_zoom - 0.25).abs() < f64::EPSILON);
        assert!((camera.max_zoom - 2.0).abs() < f64::EPSILON);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_and_reset() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        camera.pan(Vec2::new(f64::INFINITY, 0.0));
        assert_eq!(camera.offset, Vec2::new(10.0, 20.0));
        // Finite deltas that overflow the offset are dropped too
        camera.pan(Vec2::new(f64::MAX, 0.0));
        camera.pan(Vec2::new(f64::MAX, 0.0));
        assert!(camera.offset.x.is_finite());

        camera.zoom_at(Point::new(5.0, 5.0), 2.0);
        camera.reset();
        assert_eq!(camera, Camera::new());
    }
}
