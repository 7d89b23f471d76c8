//! Camera: maps between screen pixels and scene units.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom that shows the scene at 1:1 (percent).
pub const DEFAULT_ZOOM: f64 = 100.0;
/// Lowest zoom the camera accepts (percent).
pub const MIN_ZOOM: f64 = 0.1;
/// Highest zoom the camera accepts (percent).
pub const MAX_ZOOM: f64 = 50000.0;

/// View transform of the design surface.
///
/// `origin` is the scene point shown at the top-left pixel. Zoom is a
/// percentage; the effective scale also folds in the display (DPI) scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Scene coordinates of the top-left screen pixel.
    pub origin: Point,
    /// Zoom in percent (100 = 1:1).
    zoom: f64,
    /// External display scale applied on top of zoom.
    pub display_scale: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            zoom: DEFAULT_ZOOM,
            display_scale: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Camera at the scene origin with 100% zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current zoom in percent.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom, clamped to the allowed range. Returns the applied value.
    /// NaN leaves the zoom unchanged.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.zoom
    }

    /// Pixels per scene unit.
    pub fn scale(&self) -> f64 {
        self.zoom / 100.0 * self.display_scale
    }

    /// Scene-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale()) * Affine::translate(-self.origin.to_vec2())
    }

    /// Convert a screen point into scene coordinates.
    pub fn screen_to_scene(&self, screen_point: Point) -> Point {
        self.origin + screen_point.to_vec2() / self.scale()
    }

    /// Convert a scene point into screen coordinates.
    pub fn scene_to_screen(&self, scene_point: Point) -> Point {
        self.transform() * scene_point
    }

    /// Convert a pixel delta into scene units.
    pub fn screen_delta_to_scene(&self, delta: Vec2) -> Vec2 {
        delta / self.scale()
    }

    /// Convert a screen rectangle into scene coordinates.
    pub fn screen_rect_to_scene(&self, rect: Rect) -> Rect {
        let rect = rect.abs();
        Rect::from_points(
            self.screen_to_scene(Point::new(rect.x0, rect.y0)),
            self.screen_to_scene(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Visible scene rectangle for a physical viewport of `size` pixels.
    pub fn visible_rect(&self, size: Size) -> Rect {
        let scale = self.scale();
        Rect::from_origin_size(self.origin, Size::new(size.width / scale, size.height / scale))
    }

    /// Scroll by a delta in scene units.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    /// Change zoom keeping the scene point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        let anchor = self.screen_to_scene(screen_point);
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        self.zoom = new_zoom;
        self.origin = anchor - screen_point.to_vec2() / self.scale();
    }

    /// Choose zoom and origin so `bounds` fits a viewport of `size` pixels.
    pub fn fit_to_bounds(&mut self, bounds: Rect, size: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.origin = bounds.center() - Vec2::new(size.width, size.height) / (2.0 * self.scale());
            return;
        }

        let padded = Size::new(
            (size.width - padding * 2.0).max(1.0),
            (size.height - padding * 2.0).max(1.0),
        );
        let scale = (padded.width / bounds.width()).min(padded.height / bounds.height());
        self.set_zoom(scale / self.display_scale * 100.0);

        // Center the bounds in the viewport
        let visible = self.visible_rect(size);
        self.origin = bounds.center() - Vec2::new(visible.width() / 2.0, visible.height() / 2.0);
    }
}
