//! Drag-rectangle selection over empty canvas.

use crate::camera::Camera;
use crate::input::Modifiers;
use crate::selection::CombineMode;
use kurbo::{Point, Rect};

/// Merge mode for a set of modifier keys: ctrl toggles, shift extends.
pub fn combine_mode(modifiers: Modifiers) -> CombineMode {
    if modifiers.ctrl {
        CombineMode::Toggle
    } else if modifiers.shift {
        CombineMode::Extend
    } else {
        CombineMode::Replace
    }
}

/// Result of releasing a rubber band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RubberbandOutcome {
    /// Select what intersects `rect` (scene coordinates).
    Select { rect: Rect, mode: CombineMode },
    /// A plain click on empty canvas.
    ClearSelection,
    /// A modified click that was never promoted.
    Nothing,
}

/// Tracks a rectangle anchored at the pointer-down position.
#[derive(Debug, Clone)]
pub struct RubberbandSelector {
    anchor: Point,
    current: Point,
    threshold: f64,
    promoted: bool,
}

impl RubberbandSelector {
    /// Start tracking at `anchor` (screen pixels).
    pub fn begin(anchor: Point, threshold: f64) -> Self {
        Self {
            anchor,
            current: anchor,
            threshold,
            promoted: false,
        }
    }

    /// Follow the pointer. Returns true on the move that promotes the band.
    pub fn update(&mut self, position: Point) -> bool {
        self.current = position;
        if self.promoted {
            return false;
        }
        let dx = (position.x - self.anchor.x).abs();
        let dy = (position.y - self.anchor.y).abs();
        self.promoted = dx > self.threshold || dy > self.threshold;
        self.promoted
    }

    /// Whether the drag passed the promotion threshold.
    pub fn is_promoted(&self) -> bool {
        self.promoted
    }

    /// Screen point where the band started.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Current band in screen pixels.
    pub fn screen_rect(&self) -> Rect {
        Rect::from_points(self.anchor, self.current)
    }

    /// Finish the band with the modifiers held at release.
    pub fn finish(self, camera: &Camera, modifiers: Modifiers) -> RubberbandOutcome {
        if self.promoted {
            RubberbandOutcome::Select {
                rect: camera.screen_rect_to_scene(self.screen_rect()),
                mode: combine_mode(modifiers),
            }
        } else if modifiers.is_empty() {
            RubberbandOutcome::ClearSelection
        } else {
            RubberbandOutcome::Nothing
        }
    }
}
