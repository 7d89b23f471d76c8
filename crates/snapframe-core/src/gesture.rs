//! Gesture state machine.
//!
//! The controller turns pointer and manipulation input into
//! [`GestureCommand`]s. It only reads scene state; the surface applies the
//! commands, which keeps every mutation in one place.

use crate::camera::Camera;
use crate::collection::ItemCollection;
use crate::config::DesignerConfig;
use crate::input::{ManipulationDelta, PointerEvent, PointerKind, PointerPhase, PointerTracker};
use crate::item::ItemId;
use crate::rubberband::{RubberbandOutcome, RubberbandSelector};
use crate::selection::{CombineMode, SelectionSet, next_in_cycle};
use kurbo::{Point, Rect, Vec2};

/// Current interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Single contact moving one item.
    Dragging(ItemId),
    /// Single contact moving the paper.
    Panning,
    /// Mouse drag over empty canvas.
    Rubberband,
    /// Two or more contacts, or an external manipulation.
    Manipulating,
}

/// What a transaction covers, for undo grouping by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Drag,
    Pan,
    Manipulation,
}

/// Begin/end notification around a continuous edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    Begin(TransactionKind),
    End(TransactionKind),
}

/// A state change decided by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureCommand {
    Transaction(TransactionEvent),
    /// Click-to-select rules on `item`.
    ClickSelect { item: ItemId, extend: bool },
    /// Overlap cycling picked `item`.
    CycleSelect { item: ItemId },
    /// Keep `item` materialized while it is being dragged.
    Pin(ItemId),
    Unpin(ItemId),
    /// Already clamped to the viewport.
    MoveItem { item: ItemId, delta: Vec2 },
    MoveSelection { delta: Vec2 },
    /// Shift every item by `delta` scene units.
    PanAll { delta: Vec2 },
    ScaleSelection { pivot: Point, sx: f64, sy: f64 },
    RotateSelection { degrees: f64 },
    SelectInRect { rect: Rect, mode: CombineMode },
    ClearSelection,
}

/// Read-only view of the scene handed to the controller.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub items: &'a ItemCollection,
    pub selection: &'a SelectionSet,
    pub camera: &'a Camera,
    /// Visible scene rectangle.
    pub viewport: Rect,
    pub config: &'a DesignerConfig,
}

/// Clamp `delta` so that at least `margin` of `bounds` (or all of it, when
/// smaller) stays inside `viewport` on every side.
///
/// The clamp never pushes an item further out than it already is.
pub fn constrain_translation(bounds: Rect, viewport: Rect, delta: Vec2, margin: f64) -> Vec2 {
    let axis = |d: f64, b0: f64, b1: f64, v0: f64, v1: f64| {
        let keep = margin.min(b1 - b0);
        let min = (v0 + keep - b1).min(0.0);
        let max = (v1 - keep - b0).max(0.0);
        d.clamp(min, max)
    };
    Vec2::new(
        axis(delta.x, bounds.x0, bounds.x1, viewport.x0, viewport.x1),
        axis(delta.y, bounds.y0, bounds.y1, viewport.y0, viewport.y1),
    )
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
    pointers: PointerTracker,
    /// Screen position the last applied single-contact delta was measured from.
    last_sample: Option<Point>,
    rubberband: Option<RubberbandSelector>,
    transaction: Option<TransactionKind>,
    /// Rotation below the dead zone, carried to the next delta.
    pending_rotation: f64,
}

impl GestureController {
    /// Idle controller with no contacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Rubber band being tracked, if any.
    pub fn rubberband(&self) -> Option<&RubberbandSelector> {
        self.rubberband.as_ref()
    }

    /// Number of contacts currently down.
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Feed one pointer event and return the commands it produces.
    pub fn handle_pointer(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event, ctx),
            PointerPhase::Move => self.pointer_move(event, ctx),
            PointerPhase::Up => self.pointer_up(event, ctx),
        }
    }

    fn open_transaction(&mut self, kind: TransactionKind, commands: &mut Vec<GestureCommand>) {
        if self.transaction.is_none() {
            self.transaction = Some(kind);
            commands.push(GestureCommand::Transaction(TransactionEvent::Begin(kind)));
        }
    }

    fn close_transaction(&mut self, commands: &mut Vec<GestureCommand>) {
        if let Some(kind) = self.transaction.take() {
            commands.push(GestureCommand::Transaction(TransactionEvent::End(kind)));
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        self.pointers.press(event.id, event.position);

        if self.pointers.len() >= 2 {
            self.escalate(&mut commands);
            return commands;
        }
        if self.state != GestureState::Idle {
            return commands;
        }

        let scene = ctx.camera.screen_to_scene(event.position);
        let target = if event.modifiers.cycles() {
            let candidates = ctx.items.items_at(scene);
            next_in_cycle(&candidates, ctx.selection).inspect(|&item| {
                commands.push(GestureCommand::CycleSelect { item });
            })
        } else {
            ctx.items.topmost_at(scene).inspect(|&item| {
                commands.push(GestureCommand::ClickSelect {
                    item,
                    extend: event.modifiers.extends(),
                });
            })
        };

        match target {
            Some(item) => {
                self.state = GestureState::Dragging(item);
                self.last_sample = Some(event.position);
                commands.push(GestureCommand::Pin(item));
                self.open_transaction(TransactionKind::Drag, &mut commands);
            }
            None if event.kind == PointerKind::Mouse => {
                self.state = GestureState::Rubberband;
                self.rubberband = Some(RubberbandSelector::begin(
                    event.position,
                    ctx.config.rubberband_threshold,
                ));
            }
            None => {
                self.state = GestureState::Panning;
                self.last_sample = Some(event.position);
                self.open_transaction(TransactionKind::Pan, &mut commands);
            }
        }
        commands
    }

    /// A second contact turns any single-contact gesture into a manipulation.
    /// An open drag or pan transaction is closed and a manipulation one opened.
    fn escalate(&mut self, commands: &mut Vec<GestureCommand>) {
        if let GestureState::Dragging(item) = self.state {
            commands.push(GestureCommand::Unpin(item));
        }
        self.rubberband = None;
        self.last_sample = None;
        self.pending_rotation = 0.0;
        self.state = GestureState::Manipulating;
        if self.transaction.is_some_and(|kind| kind != TransactionKind::Manipulation) {
            self.close_transaction(commands);
        }
        self.open_transaction(TransactionKind::Manipulation, commands);
    }

    fn pointer_move(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        if !self.pointers.is_active(event.id) {
            return Vec::new();
        }
        let before = self.pointers.positions();
        self.pointers.move_to(event.id, event.position);

        match self.state {
            GestureState::Dragging(item) => self.drag_to(item, event.position, ctx),
            GestureState::Panning => {
                let Some(last) = self.last_sample.replace(event.position) else {
                    return Vec::new();
                };
                let delta = ctx.camera.screen_delta_to_scene(event.position - last);
                vec![GestureCommand::PanAll { delta }]
            }
            GestureState::Rubberband => {
                if let Some(band) = self.rubberband.as_mut() {
                    band.update(event.position);
                }
                Vec::new()
            }
            GestureState::Manipulating => {
                let after = self.pointers.positions();
                let delta = ManipulationDelta::between(&before, &after);
                self.apply_manipulation(&delta, ctx)
            }
            GestureState::Idle => Vec::new(),
        }
    }

    fn drag_to(&mut self, item: ItemId, position: Point, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        let Some(last) = self.last_sample else {
            return Vec::new();
        };
        let delta = ctx.camera.screen_delta_to_scene(position - last);
        let jitter = ctx.config.jitter_threshold;
        if delta.x.abs() < jitter && delta.y.abs() < jitter {
            return Vec::new();
        }
        self.last_sample = Some(position);

        let Some(target) = ctx.items.get(item) else {
            return Vec::new();
        };
        if target.locked_position {
            return Vec::new();
        }
        let delta = constrain_translation(target.bounds(), ctx.viewport, delta, ctx.config.containment_margin);
        if delta == Vec2::ZERO {
            return Vec::new();
        }
        vec![GestureCommand::MoveItem { item, delta }]
    }

    fn pointer_up(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        if self.pointers.release(event.id).is_none() {
            return Vec::new();
        }
        if !self.pointers.is_empty() {
            return Vec::new();
        }

        let mut commands = Vec::new();
        match std::mem::take(&mut self.state) {
            GestureState::Dragging(item) => commands.push(GestureCommand::Unpin(item)),
            GestureState::Rubberband => {
                if let Some(band) = self.rubberband.take() {
                    match band.finish(ctx.camera, event.modifiers) {
                        RubberbandOutcome::Select { rect, mode } => {
                            commands.push(GestureCommand::SelectInRect { rect, mode });
                        }
                        RubberbandOutcome::ClearSelection => commands.push(GestureCommand::ClearSelection),
                        RubberbandOutcome::Nothing => {}
                    }
                }
            }
            GestureState::Panning | GestureState::Manipulating | GestureState::Idle => {}
        }
        self.last_sample = None;
        self.pending_rotation = 0.0;
        self.close_transaction(&mut commands);
        commands
    }

    /// Start an externally driven manipulation.
    pub fn begin_manipulation(&mut self) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        if self.state != GestureState::Manipulating {
            self.escalate(&mut commands);
        }
        commands
    }

    /// Feed an externally computed manipulation delta.
    pub fn manipulation_delta(
        &mut self,
        delta: &ManipulationDelta,
        ctx: &GestureContext<'_>,
    ) -> Vec<GestureCommand> {
        let mut commands = self.begin_manipulation();
        commands.extend(self.apply_manipulation(delta, ctx));
        commands
    }

    /// Finish an externally driven manipulation. Contacts still down keep
    /// the gesture alive.
    pub fn end_manipulation(&mut self) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        if self.state == GestureState::Manipulating && self.pointers.is_empty() {
            self.state = GestureState::Idle;
            self.pending_rotation = 0.0;
            self.close_transaction(&mut commands);
        }
        commands
    }

    fn apply_manipulation(&mut self, delta: &ManipulationDelta, ctx: &GestureContext<'_>) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        let has_selection = !ctx.selection.is_empty();

        let translation = ctx.camera.screen_delta_to_scene(delta.translation);
        if translation != Vec2::ZERO {
            commands.push(if has_selection {
                GestureCommand::MoveSelection { delta: translation }
            } else {
                GestureCommand::PanAll { delta: translation }
            });
        }

        if has_selection && delta.has_scale() {
            commands.push(GestureCommand::ScaleSelection {
                pivot: ctx.camera.screen_to_scene(delta.pivot),
                sx: delta.scale.x,
                sy: delta.scale.y,
            });
        }

        self.pending_rotation += delta.rotation;
        if self.pending_rotation.abs() >= ctx.config.rotation_dead_zone {
            let degrees = std::mem::take(&mut self.pending_rotation);
            if has_selection {
                commands.push(GestureCommand::RotateSelection { degrees });
            }
        }
        commands
    }

    /// Abandon the current gesture, releasing pins and transactions.
    pub fn cancel(&mut self) -> Vec<GestureCommand> {
        let mut commands = Vec::new();
        if let GestureState::Dragging(item) = self.state {
            commands.push(GestureCommand::Unpin(item));
        }
        self.state = GestureState::Idle;
        self.pointers.clear();
        self.rubberband = None;
        self.last_sample = None;
        self.pending_rotation = 0.0;
        self.close_transaction(&mut commands);
        commands
    }
}
