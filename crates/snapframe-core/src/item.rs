//! Spatial items: the positioned, sized and rotatable entities of a template.

use crate::error::{DesignerError, DesignerResult};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// What a template item represents on the printed photo strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemKind {
    /// Slot that receives a captured photo.
    #[default]
    Placeholder,
    /// Static image (logo, background art).
    Image,
    /// Text block.
    Text,
    /// Vector shape (rectangle, ellipse, line).
    Shape,
}

/// Geometry of an item in scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Axis-aligned box before rotation.
    Box {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    /// Open poly-line through the given vertices.
    PolyLine { vertices: Vec<Point> },
}

impl Geometry {
    /// Create box geometry from a rectangle (normalized so width/height are positive).
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Geometry::Box {
            left: rect.x0,
            top: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }

    /// The unrotated layout rectangle.
    pub fn rect(&self) -> Rect {
        match self {
            Geometry::Box {
                left,
                top,
                width,
                height,
            } => Rect::new(*left, *top, left + width, top + height),
            Geometry::PolyLine { vertices } => vertex_bounds(vertices.iter().copied()),
        }
    }

    /// Reject negative or non-finite dimensions.
    pub fn validate(&self) -> DesignerResult<()> {
        match self {
            Geometry::Box {
                left,
                top,
                width,
                height,
            } => {
                if ![*left, *top, *width, *height].iter().all(|v| v.is_finite()) {
                    return Err(DesignerError::InvalidGeometry(
                        "box coordinates must be finite".to_string(),
                    ));
                }
                if *width < 0.0 || *height < 0.0 {
                    return Err(DesignerError::InvalidGeometry(format!(
                        "negative size {}x{}",
                        width, height
                    )));
                }
                Ok(())
            }
            Geometry::PolyLine { vertices } => {
                if vertices.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(DesignerError::InvalidGeometry(
                        "poly-line vertices must be finite".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Bounding rectangle of a set of points; zero rect when empty.
fn vertex_bounds(points: impl Iterator<Item = Point>) -> Rect {
    let mut result: Option<Rect> = None;
    for p in points {
        result = Some(match result {
            Some(r) => r.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }
    result.unwrap_or(Rect::ZERO)
}

/// Rotate `point` around `center` by `degrees`.
fn rotate_point(point: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let angle = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if angle >= 360.0 { 0.0 } else { angle }
}

/// A positioned, sized, rotatable entity on the design surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialItem {
    pub(crate) id: ItemId,
    /// What the item represents.
    pub kind: ItemKind,
    geometry: Geometry,
    /// Rotation in degrees around the layout center, always in `[0, 360)`.
    angle: f64,
    /// Item cannot be dragged or moved by gestures.
    pub locked_position: bool,
    /// Size changes keep `width / height == aspect_ratio`.
    pub locked_aspect_ratio: bool,
    /// Item accepts scale gestures.
    pub resizeable: bool,
    /// Target width/height ratio (0 = unconstrained).
    pub aspect_ratio: f64,
    /// Opaque style payload owned by the template layer.
    #[serde(default)]
    pub style: serde_json::Value,
}

impl SpatialItem {
    /// Create a box item covering `rect`.
    pub fn boxed(kind: ItemKind, rect: Rect) -> Self {
        Self::with_geometry(kind, Geometry::from_rect(rect))
    }

    /// Create a poly-line item.
    pub fn poly_line(kind: ItemKind, vertices: Vec<Point>) -> Self {
        Self::with_geometry(kind, Geometry::PolyLine { vertices })
    }

    /// Create an item from untrusted geometry.
    pub fn from_geometry(kind: ItemKind, geometry: Geometry) -> DesignerResult<Self> {
        geometry.validate()?;
        Ok(Self::with_geometry(kind, geometry))
    }

    fn with_geometry(kind: ItemKind, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            geometry,
            angle: 0.0,
            locked_position: false,
            locked_aspect_ratio: false,
            resizeable: true,
            aspect_ratio: 0.0,
            style: serde_json::Value::Null,
        }
    }

    /// Lock the aspect ratio to `ratio` (width / height).
    pub fn with_locked_aspect(mut self, ratio: f64) -> Self {
        self.lock_aspect(ratio);
        self
    }

    /// Lock the aspect ratio and refit the height to the current width.
    /// A ratio of zero or less unlocks.
    pub fn lock_aspect(&mut self, ratio: f64) {
        self.aspect_ratio = ratio.max(0.0);
        self.locked_aspect_ratio = ratio > 0.0;
        self.fit_aspect();
    }

    /// Derive the height from the width when the aspect ratio is locked.
    pub fn fit_aspect(&mut self) {
        if !(self.locked_aspect_ratio && self.aspect_ratio > 0.0) {
            return;
        }
        let rect = self.layout_rect();
        let height = rect.width() / self.aspect_ratio;
        if (height - rect.height()).abs() > f64::EPSILON * height.max(1.0) {
            self.apply_size(Point::new(rect.x0, rect.y0), rect.width(), height);
        }
    }

    /// Set the rotation angle.
    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.set_angle(degrees);
        self
    }

    /// Stable identity of the item.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Underlying box or poly-line geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Rotation in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Set the rotation, normalized into `[0, 360)`.
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = normalize_angle(degrees);
    }

    /// Add `degrees` to the current rotation.
    pub fn rotate_by(&mut self, degrees: f64) {
        self.set_angle(self.angle + degrees);
    }

    /// Unrotated layout rectangle.
    pub fn layout_rect(&self) -> Rect {
        self.geometry.rect()
    }

    /// Unrotated layout size.
    pub fn size(&self) -> Size {
        self.layout_rect().size()
    }

    /// Axis-aligned bounds of the item after rotation.
    pub fn bounds(&self) -> Rect {
        let rect = self.layout_rect();
        if self.angle == 0.0 {
            return rect;
        }
        let center = rect.center();
        match &self.geometry {
            Geometry::Box { .. } => {
                let corners = [
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    Point::new(rect.x1, rect.y1),
                    Point::new(rect.x0, rect.y1),
                ];
                vertex_bounds(corners.into_iter().map(|p| rotate_point(p, center, self.angle)))
            }
            Geometry::PolyLine { vertices } => vertex_bounds(
                vertices
                    .iter()
                    .map(|&p| rotate_point(p, center, self.angle)),
            ),
        }
    }

    /// Hit test against the rotated shape.
    pub fn contains_point(&self, point: Point) -> bool {
        match &self.geometry {
            Geometry::Box { .. } => {
                let rect = self.layout_rect();
                let local = rotate_point(point, rect.center(), -self.angle);
                local.x >= rect.x0 && local.x <= rect.x1 && local.y >= rect.y0 && local.y <= rect.y1
            }
            Geometry::PolyLine { .. } => {
                let b = self.bounds();
                point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
            }
        }
    }

    /// Move the item by `delta` scene units.
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.geometry {
            Geometry::Box { left, top, .. } => {
                *left += delta.x;
                *top += delta.y;
            }
            Geometry::PolyLine { vertices } => {
                for v in vertices.iter_mut() {
                    *v += delta;
                }
            }
        }
    }

    /// Set the layout size, keeping the top-left corner in place.
    ///
    /// With a locked aspect ratio the height is derived from the width.
    pub fn resize(&mut self, width: f64, height: f64) -> DesignerResult<()> {
        if !(width >= 0.0 && height >= 0.0) {
            return Err(DesignerError::InvalidGeometry(format!(
                "negative size {}x{}",
                width, height
            )));
        }
        let height = if self.locked_aspect_ratio && self.aspect_ratio > 0.0 {
            width / self.aspect_ratio
        } else {
            height
        };
        let rect = self.layout_rect();
        self.apply_size(Point::new(rect.x0, rect.y0), width, height);
        Ok(())
    }

    /// Scale the item around `pivot` by `(sx, sy)`.
    ///
    /// A locked aspect ratio follows the dominant axis (larger `|scale|`), the
    /// other side is recomputed from the ratio. Sides never drop below
    /// `min_size` unless they were zero to begin with.
    pub fn scale_about(&mut self, pivot: Point, sx: f64, sy: f64, min_size: f64) {
        let size = self.size();
        let mut width = size.width * sx.abs();
        let mut height = size.height * sy.abs();

        let locked = self.locked_aspect_ratio && self.aspect_ratio > 0.0;
        if locked {
            if sx.abs() > sy.abs() {
                height = width / self.aspect_ratio;
            } else {
                width = height * self.aspect_ratio;
            }
        }

        if size.width > 0.0 && width < min_size {
            width = min_size;
            if locked {
                height = width / self.aspect_ratio;
            }
        }
        if size.height > 0.0 && height < min_size {
            height = min_size;
            if locked {
                width = height * self.aspect_ratio;
            }
        }

        self.apply_size(pivot, width, height);
    }

    /// Resize to `width` x `height`, keeping `anchor` fixed.
    fn apply_size(&mut self, anchor: Point, width: f64, height: f64) {
        let size = self.size();
        let fx = if size.width > 0.0 { width / size.width } else { 1.0 };
        let fy = if size.height > 0.0 { height / size.height } else { 1.0 };
        let scale = |p: Point| {
            Point::new(
                anchor.x + (p.x - anchor.x) * fx,
                anchor.y + (p.y - anchor.y) * fy,
            )
        };
        match &mut self.geometry {
            Geometry::Box {
                left,
                top,
                width: w,
                height: h,
            } => {
                let origin = scale(Point::new(*left, *top));
                *left = origin.x;
                *top = origin.y;
                *w = width;
                *h = height;
            }
            Geometry::PolyLine { vertices } => {
                for v in vertices.iter_mut() {
                    *v = scale(*v);
                }
            }
        }
    }

    /// Clone this item under a fresh id.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }
}
