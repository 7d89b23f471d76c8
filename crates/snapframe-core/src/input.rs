//! Pointer and manipulation input for the design surface.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Click keeps the existing selection.
    pub fn extends(&self) -> bool {
        self.shift || self.ctrl
    }

    /// Click cycles through overlapping items.
    pub fn cycles(&self) -> bool {
        self.alt
    }

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Identifies one active contact (mouse, finger or pen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Pointer event in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerKind,
    pub phase: PointerPhase,
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Pointer event with no modifiers.
    pub fn new(id: u32, kind: PointerKind, phase: PointerPhase, position: Point) -> Self {
        Self {
            id: PointerId(id),
            kind,
            phase,
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary mouse button event.
    pub fn mouse(phase: PointerPhase, position: Point) -> Self {
        Self::new(0, PointerKind::Mouse, phase, position)
    }

    /// Touch contact event.
    pub fn touch(id: u32, phase: PointerPhase, position: Point) -> Self {
        Self::new(id, PointerKind::Touch, phase, position)
    }

    /// Attach modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Incremental multi-contact transform.
///
/// Translation is in pixels, `scale` per axis (1.0 = unchanged), rotation in
/// degrees, and `pivot` in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManipulationDelta {
    pub translation: Vec2,
    pub scale: Vec2,
    pub rotation: f64,
    pub pivot: Point,
}

impl Default for ManipulationDelta {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            pivot: Point::ZERO,
        }
    }
}

impl ManipulationDelta {
    /// Pure translation in pixels.
    pub fn translate(translation: Vec2) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Pure scale around `pivot`.
    pub fn scale(sx: f64, sy: f64, pivot: Point) -> Self {
        Self {
            scale: Vec2::new(sx, sy),
            pivot,
            ..Self::default()
        }
    }

    /// Pure rotation in degrees around `pivot`.
    pub fn rotate(degrees: f64, pivot: Point) -> Self {
        Self {
            rotation: degrees,
            pivot,
            ..Self::default()
        }
    }

    /// Whether the delta changes size on either axis.
    pub fn has_scale(&self) -> bool {
        (self.scale.x - 1.0).abs() > f64::EPSILON || (self.scale.y - 1.0).abs() > f64::EPSILON
    }

    /// Derive the transform between two snapshots of the same contacts.
    ///
    /// Translation follows the centroid. Scale and rotation come from the
    /// segment between the first two contacts and are neutral with fewer.
    pub fn between(before: &[Point], after: &[Point]) -> Self {
        let n = before.len().min(after.len());
        if n == 0 {
            return Self::default();
        }
        let before = &before[..n];
        let after = &after[..n];
        let c0 = centroid(before);
        let c1 = centroid(after);
        let mut delta = Self {
            translation: c1 - c0,
            pivot: c1,
            ..Self::default()
        };
        if n >= 2 {
            let v0 = before[1] - before[0];
            let v1 = after[1] - after[0];
            let (len0, len1) = (v0.hypot(), v1.hypot());
            if len0 > f64::EPSILON && len1 > f64::EPSILON {
                let ratio = len1 / len0;
                delta.scale = Vec2::new(ratio, ratio);
                let turn = (v1.atan2() - v0.atan2()).to_degrees();
                // Shortest signed turn
                delta.rotation = (turn + 180.0).rem_euclid(360.0) - 180.0;
            }
        }
        delta
    }
}

fn centroid(points: &[Point]) -> Point {
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

/// Active contacts and their last reported positions.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    positions: HashMap<PointerId, Point>,
    /// Contacts in press order.
    order: Vec<PointerId>,
}

impl PointerTracker {
    /// Tracker with no contacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new contact, or move an existing one.
    pub fn press(&mut self, id: PointerId, position: Point) {
        if self.positions.insert(id, position).is_none() {
            self.order.push(id);
        }
    }

    /// Update a contact. Returns the previous position if it was active.
    pub fn move_to(&mut self, id: PointerId, position: Point) -> Option<Point> {
        self.positions.get_mut(&id).map(|p| std::mem::replace(p, position))
    }

    /// Forget a contact, returning its last position.
    pub fn release(&mut self, id: PointerId) -> Option<Point> {
        let released = self.positions.remove(&id);
        if released.is_some() {
            self.order.retain(|&other| other != id);
        }
        released
    }

    /// Last known position of a contact.
    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Positions in press order.
    pub fn positions(&self) -> Vec<Point> {
        self.order.iter().filter_map(|id| self.positions.get(id).copied()).collect()
    }

    /// Whether the contact is down.
    pub fn is_active(&self, id: PointerId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Number of contacts down.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no contact is down.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every contact.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.order.clear();
    }
}
