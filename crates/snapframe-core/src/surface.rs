//! Design surface: owns the scene and routes every mutation through the
//! viewport, container and selection layers.

use crate::camera::Camera;
use crate::collection::{CollectionChange, ItemCollection, QueryMode};
use crate::config::DesignerConfig;
use crate::container::{ContainerId, ContainerPool, ContainerRegistry};
use crate::diagnostics::Tracer;
use crate::dispatch::{IdleQueue, IdleTask};
use crate::error::{DesignerError, DesignerResult};
use crate::gesture::{GestureCommand, GestureContext, GestureController, GestureState, TransactionEvent};
use crate::input::{ManipulationDelta, PointerEvent};
use crate::item::{ItemId, SpatialItem};
use crate::notify::{SubscriptionId, Subscribers};
use crate::selection::{CombineMode, SelectionDelta, SelectionSet, SelectionSync};
use crate::template::ItemTemplate;
use crate::viewport::{SceneContext, ViewportManager, ViewportUpdate};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashSet;

/// Stacking level given to an item's container while it is cycled to.
pub const CYCLE_ELEVATION: i32 = 1000;

/// Coalesced selection notification, raised once per idle tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub added: Vec<ItemId>,
    pub removed: Vec<ItemId>,
    /// Full selection after the change.
    pub selected: Vec<ItemId>,
}

macro_rules! scene {
    ($self:ident) => {
        SceneContext {
            items: &$self.items,
            containers: &mut $self.containers,
            selection: &$self.selection,
        }
    };
}

/// The designer canvas: items, selection, containers and view.
#[derive(Debug)]
pub struct DesignSurface {
    config: DesignerConfig,
    tracer: Tracer,
    items: ItemCollection,
    selection: SelectionSet,
    sync: SelectionSync,
    containers: ContainerRegistry,
    viewport: ViewportManager,
    gestures: GestureController,
    idle: IdleQueue,
    /// Selection changes not yet reported.
    pending_selection: SelectionDelta,
    selection_subscribers: Subscribers<SelectionChanged>,
    transaction_subscribers: Subscribers<TransactionEvent>,
}

impl DesignSurface {
    /// Create an empty surface showing `physical_size` pixels.
    pub fn new(config: DesignerConfig, physical_size: Size) -> DesignerResult<Self> {
        config.validate()?;
        let tracer = config.tracer();
        let mut camera = Camera::new();
        camera.min_zoom = config.min_zoom;
        camera.max_zoom = config.max_zoom;
        camera.display_scale = config.display_scale;
        camera.set_zoom(config.initial_zoom);

        log::debug!(
            "design surface {}x{} at {}%",
            physical_size.width,
            physical_size.height,
            camera.zoom()
        );
        Ok(Self {
            tracer,
            items: ItemCollection::new(),
            selection: SelectionSet::new(),
            sync: SelectionSync::new(),
            containers: ContainerRegistry::new(ContainerPool::new(config.pool_capacity), tracer),
            viewport: ViewportManager::new(camera, physical_size, tracer),
            gestures: GestureController::new(),
            idle: IdleQueue::new(),
            pending_selection: SelectionDelta::default(),
            selection_subscribers: Subscribers::new(),
            transaction_subscribers: Subscribers::new(),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// All items in stacking order.
    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    /// Item with `id`, if present.
    pub fn item(&self, id: ItemId) -> Option<&SpatialItem> {
        self.items.get(id)
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Item to container bindings.
    pub fn containers(&self) -> &ContainerRegistry {
        &self.containers
    }

    /// Viewport and virtualization state.
    pub fn viewport(&self) -> &ViewportManager {
        &self.viewport
    }

    /// Camera of the viewport.
    pub fn camera(&self) -> &Camera {
        self.viewport.camera()
    }

    /// State of the gesture in progress.
    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// True while deferred work waits for [`run_idle`](Self::run_idle).
    pub fn has_idle_work(&self) -> bool {
        !self.idle.is_empty()
    }

    // --- subscriptions ---

    /// Listen for coalesced selection changes.
    pub fn subscribe_selection(&mut self, handler: impl FnMut(&SelectionChanged) + 'static) -> SubscriptionId {
        self.selection_subscribers.subscribe(handler)
    }

    /// Stop listening for selection changes.
    pub fn unsubscribe_selection(&mut self, id: SubscriptionId) -> bool {
        self.selection_subscribers.unsubscribe(id)
    }

    /// Listen for collection changes.
    pub fn subscribe_collection(&mut self, handler: impl FnMut(&CollectionChange) + 'static) -> SubscriptionId {
        self.items.subscribe(handler)
    }

    /// Stop listening for collection changes.
    pub fn unsubscribe_collection(&mut self, id: SubscriptionId) -> bool {
        self.items.unsubscribe(id)
    }

    /// Begin/end hooks around drags, pans and manipulations.
    pub fn subscribe_transactions(&mut self, handler: impl FnMut(&TransactionEvent) + 'static) -> SubscriptionId {
        self.transaction_subscribers.subscribe(handler)
    }

    /// Stop listening for transaction events.
    pub fn unsubscribe_transactions(&mut self, id: SubscriptionId) -> bool {
        self.transaction_subscribers.unsubscribe(id)
    }

    // --- collection ---

    /// Follow a collection change through selection and virtualization.
    fn after_change(&mut self, change: &CollectionChange) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        let update = self.viewport.on_collection_changed(change, &mut scene)?;

        let dropped = match change {
            CollectionChange::Removed { items } => self.selection.remove_many(items),
            CollectionChange::Replaced { old, new } if old != new => self.selection.remove(*old),
            CollectionChange::Reset => {
                let stale: Vec<ItemId> = self
                    .selection
                    .iter()
                    .filter(|&id| !self.items.contains(id))
                    .collect();
                self.selection.remove_many(&stale)
            }
            _ => SelectionDelta::default(),
        };
        self.commit_selection(dropped)?;
        Ok(update)
    }

    /// Append an item on top.
    pub fn add_item(&mut self, item: SpatialItem) -> DesignerResult<ItemId> {
        let id = item.id();
        let change = self.items.add(item)?;
        self.after_change(&change)?;
        Ok(id)
    }

    /// Insert `item` at stacking position `index`.
    pub fn insert_item(&mut self, index: usize, item: SpatialItem) -> DesignerResult<ItemId> {
        let id = item.id();
        let change = self.items.insert_at(index, item)?;
        self.after_change(&change)?;
        Ok(id)
    }

    /// Remove an item, dropping it from the selection.
    pub fn remove_item(&mut self, id: ItemId) -> DesignerResult<SpatialItem> {
        let (item, change) = self.items.remove(id)?;
        self.after_change(&change)?;
        Ok(item)
    }

    /// Swap `old` for `new` at the same stacking position.
    pub fn replace_item(&mut self, old: ItemId, new: SpatialItem) -> DesignerResult<SpatialItem> {
        let (removed, change) = self.items.replace(old, new)?;
        self.after_change(&change)?;
        Ok(removed)
    }

    /// Remove every item.
    pub fn clear(&mut self) -> DesignerResult<()> {
        let change = self.items.clear();
        self.after_change(&change)?;
        Ok(())
    }

    /// Mutate an item in place; bounds changes update the index and view.
    pub fn update_item(&mut self, id: ItemId, f: impl FnOnce(&mut SpatialItem)) -> DesignerResult<()> {
        if let Some(change) = self.items.update(id, f)? {
            self.after_change(&change)?;
        }
        Ok(())
    }

    /// Resize an item's layout box (aspect lock applies).
    pub fn resize_item(&mut self, id: ItemId, width: f64, height: f64) -> DesignerResult<()> {
        let mut result = Ok(());
        self.update_item(id, |item| result = item.resize(width, height))?;
        result
    }

    /// Remove every selected item. Returns them in selection order.
    pub fn delete_selected(&mut self) -> DesignerResult<Vec<SpatialItem>> {
        let ids = self.selection.ids().to_vec();
        let (removed, change) = self.items.remove_many(&ids);
        if let Some(change) = change {
            self.after_change(&change)?;
        }
        log::debug!("deleted {} selected items", removed.len());
        Ok(removed)
    }

    /// Clone the selection on top of the stack, shifted by `offset`, and
    /// select the clones.
    pub fn duplicate_selected(&mut self, offset: Vec2) -> DesignerResult<Vec<ItemId>> {
        let copies: Vec<SpatialItem> = self
            .items
            .iter()
            .filter(|item| self.selection.contains(item.id()))
            .map(|item| {
                let mut copy = item.duplicate();
                copy.translate(offset);
                copy
            })
            .collect();
        let mut ids = Vec::with_capacity(copies.len());
        for copy in copies {
            ids.push(self.add_item(copy)?);
        }
        let delta = self.selection.replace(ids.iter().copied());
        self.commit_selection(delta)?;
        Ok(ids)
    }

    // --- stacking order ---

    fn move_in_stack(&mut self, id: ItemId, index: usize) -> DesignerResult<bool> {
        match self.items.move_to(id, index)? {
            Some(change) => {
                self.after_change(&change)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn stack_position(&self, id: ItemId) -> DesignerResult<usize> {
        self.items.index_of(id).ok_or(DesignerError::ItemNotFound(id))
    }

    /// Move an item to the top of the stack.
    pub fn bring_to_front(&mut self, id: ItemId) -> DesignerResult<bool> {
        let top = self.items.len().saturating_sub(1);
        self.move_in_stack(id, top)
    }

    /// Move an item to the bottom of the stack.
    pub fn send_to_back(&mut self, id: ItemId) -> DesignerResult<bool> {
        self.move_in_stack(id, 0)
    }

    /// Move an item one step up.
    pub fn bring_forward(&mut self, id: ItemId) -> DesignerResult<bool> {
        let index = self.stack_position(id)?;
        self.move_in_stack(id, index + 1)
    }

    /// Move an item one step down.
    pub fn send_backward(&mut self, id: ItemId) -> DesignerResult<bool> {
        let index = self.stack_position(id)?;
        match index.checked_sub(1) {
            Some(below) => self.move_in_stack(id, below),
            None => Ok(false),
        }
    }

    // --- selection ---

    /// Push a delta to containers and schedule the coalesced notification.
    fn commit_selection(&mut self, delta: SelectionDelta) -> DesignerResult<()> {
        if delta.is_empty() {
            return Ok(());
        }
        self.sync.push(&delta, &mut self.containers, &mut self.selection)?;
        self.pending_selection.merge(delta);
        self.idle.post(IdleTask::RaiseSelectionChanged);
        Ok(())
    }

    fn require(&self, id: ItemId) -> DesignerResult<()> {
        if self.items.contains(id) {
            Ok(())
        } else {
            Err(DesignerError::ItemNotFound(id))
        }
    }

    /// Select only `id`.
    pub fn select(&mut self, id: ItemId) -> DesignerResult<()> {
        self.require(id)?;
        let delta = self.selection.replace([id]);
        self.commit_selection(delta)
    }

    /// Add `id` to the selection.
    pub fn extend_selection(&mut self, id: ItemId) -> DesignerResult<()> {
        self.require(id)?;
        let delta = self.selection.add(id);
        self.commit_selection(delta)
    }

    /// Remove `id` from the selection.
    pub fn deselect(&mut self, id: ItemId) -> DesignerResult<()> {
        let delta = self.selection.remove(id);
        self.commit_selection(delta)
    }

    /// Click-to-select rules on `id`.
    pub fn click_item(&mut self, id: ItemId, extend: bool) -> DesignerResult<()> {
        self.require(id)?;
        let delta = self.selection.click(id, extend);
        self.commit_selection(delta)
    }

    /// Select every item in stacking order.
    pub fn select_all(&mut self) -> DesignerResult<()> {
        let delta = self.selection.replace(self.items.ids().iter().copied());
        self.commit_selection(delta)
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) -> DesignerResult<()> {
        let delta = self.selection.clear();
        self.commit_selection(delta)
    }

    /// Select what intersects `rect` (scene coordinates), merged by `mode`.
    pub fn select_in_rect(&mut self, rect: Rect, mode: CombineMode) -> DesignerResult<()> {
        let hit: HashSet<ItemId> = self
            .items
            .query(rect, QueryMode::Intersects)
            .map(|item| item.id())
            .collect();
        let ordered: Vec<ItemId> = self.items.ids().iter().copied().filter(|id| hit.contains(id)).collect();
        let delta = self.selection.combine(&ordered, mode);
        self.commit_selection(delta)
    }

    /// Container-side selection change (for example from the host's own
    /// hit-testing). Reflected into the set unless it echoes a push.
    pub fn set_container_selected(&mut self, container: ContainerId, selected: bool) -> DesignerResult<()> {
        let Some(event) = self.containers.set_selected(container, selected)? else {
            return Ok(());
        };
        if let Some(delta) = self.sync.on_container_event(&event, &mut self.selection)? {
            if !delta.is_empty() {
                self.pending_selection.merge(delta);
                self.idle.post(IdleTask::RaiseSelectionChanged);
            }
        }
        Ok(())
    }

    /// Select `item` and lift its container until the next idle tick.
    fn cycle_to(&mut self, item: ItemId) -> DesignerResult<()> {
        let delta = self.selection.replace([item]);
        self.commit_selection(delta)?;
        if let Some(container) = self.containers.container_from_item(item) {
            self.containers.set_elevation(container, CYCLE_ELEVATION)?;
            self.idle.post(IdleTask::RevertElevation(item));
        }
        Ok(())
    }

    // --- idle work ---

    /// Run deferred work. Returns how many tasks ran.
    pub fn run_idle(&mut self) -> DesignerResult<usize> {
        let tasks = self.idle.drain();
        let count = tasks.len();
        for task in tasks {
            match task {
                IdleTask::RaiseSelectionChanged => {
                    let delta = std::mem::take(&mut self.pending_selection);
                    if delta.is_empty() {
                        continue;
                    }
                    let event = SelectionChanged {
                        added: delta.added,
                        removed: delta.removed,
                        selected: self.selection.ids().to_vec(),
                    };
                    self.selection_subscribers.emit(&event);
                }
                IdleTask::RevertElevation(item) => match self.containers.container_from_item(item) {
                    Some(container) => self.containers.set_elevation(container, 0)?,
                    None => self
                        .tracer
                        .debug(format_args!("elevation revert skipped, {} has no container", item)),
                },
            }
        }
        Ok(count)
    }

    // --- input ---

    /// Route a pointer event through the gesture controller.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> DesignerResult<()> {
        let ctx = GestureContext {
            items: &self.items,
            selection: &self.selection,
            camera: self.viewport.camera(),
            viewport: self.viewport.viewport(),
            config: &self.config,
        };
        let commands = self.gestures.handle_pointer(event, &ctx);
        self.apply_commands(commands)
    }

    /// Start an externally driven manipulation.
    pub fn begin_manipulation(&mut self) -> DesignerResult<()> {
        let commands = self.gestures.begin_manipulation();
        self.apply_commands(commands)
    }

    /// Apply a manipulation delta from the host.
    pub fn manipulation_delta(&mut self, delta: &ManipulationDelta) -> DesignerResult<()> {
        let ctx = GestureContext {
            items: &self.items,
            selection: &self.selection,
            camera: self.viewport.camera(),
            viewport: self.viewport.viewport(),
            config: &self.config,
        };
        let commands = self.gestures.manipulation_delta(delta, &ctx);
        self.apply_commands(commands)
    }

    /// Finish an externally driven manipulation.
    pub fn end_manipulation(&mut self) -> DesignerResult<()> {
        let commands = self.gestures.end_manipulation();
        self.apply_commands(commands)
    }

    /// Abort the current gesture, releasing pins and transactions.
    pub fn cancel_gesture(&mut self) -> DesignerResult<()> {
        let commands = self.gestures.cancel();
        self.apply_commands(commands)
    }

    fn apply_commands(&mut self, commands: Vec<GestureCommand>) -> DesignerResult<()> {
        for command in commands {
            self.apply_command(command)?;
        }
        Ok(())
    }

    fn apply_command(&mut self, command: GestureCommand) -> DesignerResult<()> {
        match command {
            GestureCommand::Transaction(event) => {
                log::debug!("transaction {:?}", event);
                self.transaction_subscribers.emit(&event);
            }
            GestureCommand::ClickSelect { item, extend } => self.click_item(item, extend)?,
            GestureCommand::CycleSelect { item } => self.cycle_to(item)?,
            GestureCommand::Pin(item) => self.viewport.pin(item),
            GestureCommand::Unpin(item) => {
                let mut scene = scene!(self);
                self.viewport.unpin(item, &mut scene)?;
            }
            GestureCommand::MoveItem { item, delta } => {
                self.update_item(item, |i| i.translate(delta))?;
            }
            GestureCommand::MoveSelection { delta } => {
                for id in self.movable_selection() {
                    self.update_item(id, |i| i.translate(delta))?;
                }
            }
            GestureCommand::PanAll { delta } => {
                for id in self.items.ids().to_vec() {
                    self.update_item(id, |i| i.translate(delta))?;
                }
            }
            GestureCommand::ScaleSelection { pivot, sx, sy } => {
                let min_size = self.config.min_item_size;
                let targets: Vec<ItemId> = self
                    .selection
                    .iter()
                    .filter(|&id| self.items.get(id).is_some_and(|i| i.resizeable))
                    .collect();
                for id in targets {
                    self.update_item(id, |i| i.scale_about(pivot, sx, sy, min_size))?;
                }
            }
            GestureCommand::RotateSelection { degrees } => {
                for id in self.selection.ids().to_vec() {
                    self.update_item(id, |i| i.rotate_by(degrees))?;
                }
            }
            GestureCommand::SelectInRect { rect, mode } => self.select_in_rect(rect, mode)?,
            GestureCommand::ClearSelection => self.clear_selection()?,
        }
        Ok(())
    }

    fn movable_selection(&self) -> Vec<ItemId> {
        self.selection
            .iter()
            .filter(|&id| self.items.get(id).is_some_and(|i| !i.locked_position))
            .collect()
    }

    // --- view ---

    /// One wheel notch at `anchor` (screen pixels).
    pub fn wheel_zoom(&mut self, zoom_in: bool, anchor: Point) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.wheel_zoom(zoom_in, anchor, &mut scene)
    }

    /// Set zoom in percent, keeping the viewport origin.
    pub fn set_zoom(&mut self, zoom: f64) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.set_zoom(zoom, &mut scene)
    }

    /// Scroll so `origin` is at the top-left corner.
    pub fn scroll_to(&mut self, origin: Point) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.scroll_to(origin, &mut scene)
    }

    /// Scroll by a delta in scene units.
    pub fn scroll_by(&mut self, delta: Vec2) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.scroll_by(delta, &mut scene)
    }

    /// Show exactly `rect` (scene coordinates) at the current zoom.
    pub fn set_viewport(&mut self, rect: Rect) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.set_viewport(rect, &mut scene)
    }

    /// The physical view was resized.
    pub fn resize(&mut self, size: Size) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.set_physical_size(size, &mut scene)
    }

    /// Zoom and scroll so every item is visible.
    pub fn fit_to_content(&mut self, padding: f64) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.fit_to_extent(padding, &mut scene)
    }

    // --- templates and export ---

    /// Replace the scene with fresh items built from `templates` (back to
    /// front), under a single reset.
    pub fn apply_template(&mut self, templates: &[ItemTemplate]) -> DesignerResult<Vec<ItemId>> {
        let items = templates
            .iter()
            .map(ItemTemplate::to_item)
            .collect::<DesignerResult<Vec<_>>>()?;
        let ids: Vec<ItemId> = items.iter().map(|i| i.id()).collect();
        let change = self.items.reset_with(items)?;
        self.after_change(&change)?;
        log::info!("applied template with {} items", ids.len());
        Ok(ids)
    }

    /// Describe the scene in stacking order.
    pub fn save_template(&self) -> Vec<ItemTemplate> {
        self.items.iter().map(ItemTemplate::from_item).collect()
    }

    /// Materialize every item for a full-scene capture.
    pub fn begin_export(&mut self) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.materialize_all(&mut scene)
    }

    /// Return to viewport culling after a capture.
    pub fn end_export(&mut self) -> DesignerResult<ViewportUpdate> {
        let mut scene = scene!(self);
        self.viewport.restore_culling(&mut scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionChange;
    use crate::gesture::TransactionKind;
    use crate::input::{Modifiers, PointerPhase};
    use crate::item::ItemKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn surface() -> DesignSurface {
        init_logger();
        DesignSurface::new(DesignerConfig::default(), Size::new(400.0, 300.0)).unwrap()
    }

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> SpatialItem {
        SpatialItem::boxed(ItemKind::Image, Rect::new(x, y, x + w, y + h))
    }

    fn mouse(phase: PointerPhase, x: f64, y: f64) -> PointerEvent {
        PointerEvent::mouse(phase, Point::new(x, y))
    }

    #[test]
    fn test_selection_changed_is_coalesced() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 50.0, 50.0)).unwrap();
        let b = surface.add_item(boxed(60.0, 0.0, 50.0, 50.0)).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        surface.subscribe_selection(move |e| sink.borrow_mut().push(e.clone()));

        surface.select(a).unwrap();
        surface.extend_selection(b).unwrap();
        assert!(events.borrow().is_empty());
        assert!(surface.has_idle_work());

        surface.run_idle().unwrap();
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].added, vec![a, b]);
        assert_eq!(events[0].selected, vec![a, b]);
    }

    #[test]
    fn test_selection_flags_reach_containers() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 50.0, 50.0)).unwrap();
        let far = surface.add_item(boxed(5000.0, 0.0, 50.0, 50.0)).unwrap();
        surface.select_all().unwrap();
        assert!(surface.containers().container_for(a).unwrap().is_selected());
        assert!(surface.containers().container_for(far).is_none());

        surface.scroll_to(Point::new(4900.0, 0.0)).unwrap();
        assert!(surface.containers().container_for(far).unwrap().is_selected());
        assert!(surface.containers().container_for(a).is_none());
    }

    #[test]
    fn test_container_selection_feeds_back() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 50.0, 50.0)).unwrap();
        let container = surface.containers().container_from_item(a).unwrap();
        surface.set_container_selected(container, true).unwrap();
        assert!(surface.selection().contains(a));
        assert!(surface.has_idle_work());
    }

    #[test]
    fn test_removal_drops_selection() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 50.0, 50.0)).unwrap();
        let b = surface.add_item(boxed(60.0, 0.0, 50.0, 50.0)).unwrap();
        surface.select_all().unwrap();
        surface.remove_item(a).unwrap();
        assert_eq!(surface.selection().ids(), &[b]);
        assert!(surface.containers().container_from_item(a).is_none());

        let removed = surface.delete_selected().unwrap();
        assert_eq!(removed.len(), 1);
        assert!(surface.selection().is_empty());
        assert!(surface.items().is_empty());
        assert!(surface.containers().is_empty());
    }

    #[test]
    fn test_replace_keeps_selection_for_same_id() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 50.0, 50.0)).unwrap();
        surface.select(a).unwrap();

        let mut edited = surface.item(a).unwrap().clone();
        edited.translate(Vec2::new(10.0, 0.0));
        surface.replace_item(a, edited).unwrap();
        assert!(surface.items().contains(a));
        assert_eq!(surface.selection().ids(), &[a]);
        assert!(surface.containers().container_for(a).unwrap().is_selected());

        let b = boxed(100.0, 0.0, 50.0, 50.0);
        let b_id = b.id();
        surface.replace_item(a, b).unwrap();
        assert!(surface.selection().is_empty());
        assert!(surface.items().contains(b_id));
    }

    #[test]
    fn test_rubberband_toggle_is_symmetric_difference() {
        let mut surface = surface();
        let a = surface.add_item(boxed(10.0, 10.0, 20.0, 20.0)).unwrap();
        let b = surface.add_item(boxed(100.0, 10.0, 20.0, 20.0)).unwrap();
        let c = surface.add_item(boxed(200.0, 10.0, 20.0, 20.0)).unwrap();
        surface.select(a).unwrap();
        surface.extend_selection(b).unwrap();

        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        surface.handle_pointer(&mouse(PointerPhase::Down, 90.0, 100.0)).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Move, 250.0, 0.0)).unwrap();
        surface
            .handle_pointer(&mouse(PointerPhase::Up, 250.0, 0.0).with_modifiers(ctrl))
            .unwrap();

        assert_eq!(surface.selection().len(), 2);
        assert!(surface.selection().contains(a));
        assert!(surface.selection().contains(c));
        assert!(!surface.selection().contains(b));
    }

    #[test]
    fn test_click_empty_canvas_clears_selection() {
        let mut surface = surface();
        let a = surface.add_item(boxed(10.0, 10.0, 20.0, 20.0)).unwrap();
        surface.select(a).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Down, 300.0, 200.0)).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Up, 300.0, 200.0)).unwrap();
        assert!(surface.selection().is_empty());
    }

    #[test]
    fn test_drag_moves_item_and_fires_transaction() {
        let mut surface = surface();
        let a = surface.add_item(boxed(10.0, 10.0, 100.0, 100.0)).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        surface.subscribe_transactions(move |e| sink.borrow_mut().push(*e));

        surface.handle_pointer(&mouse(PointerPhase::Down, 50.0, 50.0)).unwrap();
        assert!(surface.selection().contains(a));
        assert!(surface.viewport().is_pinned(a));
        surface.handle_pointer(&mouse(PointerPhase::Move, 70.0, 60.0)).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Up, 70.0, 60.0)).unwrap();

        assert_eq!(surface.item(a).unwrap().layout_rect(), Rect::new(30.0, 20.0, 130.0, 120.0));
        assert!(!surface.viewport().is_pinned(a));
        assert_eq!(
            *events.borrow(),
            vec![
                TransactionEvent::Begin(TransactionKind::Drag),
                TransactionEvent::End(TransactionKind::Drag)
            ]
        );
    }

    #[test]
    fn test_drag_clamped_at_viewport_edge() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 500.0, 100.0)).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Down, 10.0, 10.0)).unwrap();
        surface.handle_pointer(&mouse(PointerPhase::Move, -990.0, 10.0)).unwrap();
        let rect = surface.item(a).unwrap().layout_rect();
        assert!((rect.x0 + 450.0).abs() < 1e-9);
        assert!((rect.x1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_locked_scale_gesture() {
        let mut surface = surface();
        let a = surface
            .add_item(boxed(0.0, 0.0, 200.0, 100.0).with_locked_aspect(2.0))
            .unwrap();
        surface.select(a).unwrap();
        surface.begin_manipulation().unwrap();
        surface
            .manipulation_delta(&ManipulationDelta::scale(1.5, 1.0, Point::ZERO))
            .unwrap();
        surface.end_manipulation().unwrap();
        let size = surface.item(a).unwrap().size();
        assert!((size.width - 300.0).abs() < 1e-9);
        assert!((size.height - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_touch_pan_moves_every_item() {
        let mut surface = surface();
        let a = surface.add_item(boxed(10.0, 10.0, 20.0, 20.0)).unwrap();
        let mut locked = boxed(300.0, 200.0, 20.0, 20.0);
        locked.locked_position = true;
        let b = surface.add_item(locked).unwrap();

        surface
            .handle_pointer(&PointerEvent::touch(7, PointerPhase::Down, Point::new(200.0, 100.0)))
            .unwrap();
        assert_eq!(surface.gesture_state(), GestureState::Panning);
        surface
            .handle_pointer(&PointerEvent::touch(7, PointerPhase::Move, Point::new(210.0, 90.0)))
            .unwrap();
        surface
            .handle_pointer(&PointerEvent::touch(7, PointerPhase::Up, Point::new(210.0, 90.0)))
            .unwrap();

        assert_eq!(surface.item(a).unwrap().layout_rect().origin(), Point::new(20.0, 0.0));
        assert_eq!(surface.item(b).unwrap().layout_rect().origin(), Point::new(310.0, 190.0));
    }

    #[test]
    fn test_rotation_gesture_normalizes() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 40.0, 40.0).with_angle(350.0)).unwrap();
        surface.select(a).unwrap();
        surface
            .manipulation_delta(&ManipulationDelta::rotate(20.0, Point::ZERO))
            .unwrap();
        assert!((surface.item(a).unwrap().angle() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_alt_click_cycles_and_reverts_elevation() {
        let mut surface = surface();
        let back = surface.add_item(boxed(0.0, 0.0, 100.0, 100.0)).unwrap();
        let front = surface.add_item(boxed(20.0, 20.0, 100.0, 100.0)).unwrap();
        surface.select(front).unwrap();
        let alt = Modifiers {
            alt: true,
            ..Modifiers::default()
        };
        surface
            .handle_pointer(&mouse(PointerPhase::Down, 50.0, 50.0).with_modifiers(alt))
            .unwrap();
        surface
            .handle_pointer(&mouse(PointerPhase::Up, 50.0, 50.0).with_modifiers(alt))
            .unwrap();

        assert_eq!(surface.selection().ids(), &[back]);
        assert_eq!(surface.containers().container_for(back).unwrap().elevation(), CYCLE_ELEVATION);
        assert_eq!(surface.items().ids(), &[back, front]);

        surface.run_idle().unwrap();
        assert_eq!(surface.containers().container_for(back).unwrap().elevation(), 0);
    }

    #[test]
    fn test_elevation_revert_skipped_when_item_gone() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 100.0, 100.0)).unwrap();
        surface.cycle_to(a).unwrap();
        surface.remove_item(a).unwrap();
        assert!(surface.run_idle().is_ok());
    }

    #[test]
    fn test_wheel_zoom_steps() {
        let mut surface = surface();
        surface.wheel_zoom(true, Point::ZERO).unwrap();
        assert!((surface.camera().zoom() - 200.0).abs() < f64::EPSILON);
        surface.wheel_zoom(false, Point::ZERO).unwrap();
        surface.wheel_zoom(false, Point::ZERO).unwrap();
        assert!((surface.camera().zoom() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nan_zoom_rejected_and_wheel_still_works() {
        let mut surface = surface();
        assert!(matches!(surface.set_zoom(f64::NAN), Err(DesignerError::InvalidGeometry(_))));
        assert!(surface.scroll_by(Vec2::new(f64::NAN, 0.0)).is_err());
        assert!((surface.camera().zoom() - 100.0).abs() < f64::EPSILON);
        assert_eq!(surface.viewport().viewport(), Rect::new(0.0, 0.0, 400.0, 300.0));

        surface.wheel_zoom(true, Point::ZERO).unwrap();
        assert!((surface.camera().zoom() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stacking_order_operations() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        let c = surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();

        assert!(surface.bring_to_front(a).unwrap());
        assert_eq!(surface.items().ids(), &[b, c, a]);
        assert!(surface.send_to_back(c).unwrap());
        assert_eq!(surface.items().ids(), &[c, b, a]);
        assert!(surface.bring_forward(c).unwrap());
        assert_eq!(surface.items().ids(), &[b, c, a]);
        assert!(!surface.send_backward(b).unwrap());
        assert!(!surface.bring_forward(a).unwrap());
    }

    #[test]
    fn test_duplicate_selected() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        surface.select(a).unwrap();
        let copies = surface.duplicate_selected(Vec2::new(5.0, 5.0)).unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(surface.selection().ids(), copies.as_slice());
        assert_eq!(
            surface.item(copies[0]).unwrap().layout_rect(),
            Rect::new(5.0, 5.0, 15.0, 15.0)
        );
        assert_eq!(surface.items().len(), 2);
    }

    #[test]
    fn test_template_round_trip_under_single_reset() {
        let mut surface = surface();
        let a = surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        surface.add_item(boxed(5000.0, 0.0, 10.0, 10.0)).unwrap();
        surface.select(a).unwrap();
        let saved = surface.save_template();

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        surface.subscribe_collection(move |c| sink.borrow_mut().push(c.clone()));

        let ids = surface.apply_template(&saved).unwrap();
        assert_eq!(*changes.borrow(), vec![CollectionChange::Reset]);
        assert_eq!(surface.items().ids(), ids.as_slice());
        assert!(surface.selection().is_empty());
        assert_eq!(surface.containers().len(), 1);
        assert_eq!(surface.save_template(), saved);
    }

    #[test]
    fn test_export_materializes_everything() {
        let mut surface = surface();
        surface.add_item(boxed(0.0, 0.0, 10.0, 10.0)).unwrap();
        let far = surface.add_item(boxed(9000.0, 9000.0, 10.0, 10.0)).unwrap();
        surface.begin_export().unwrap();
        assert_eq!(surface.containers().len(), 2);
        surface.end_export().unwrap();
        assert!(surface.containers().container_from_item(far).is_none());
    }

    #[test]
    fn test_pool_bounded_across_scrolling() {
        init_logger();
        let config = DesignerConfig {
            pool_capacity: 4,
            ..DesignerConfig::default()
        };
        let mut surface = DesignSurface::new(config, Size::new(100.0, 100.0)).unwrap();
        for i in 0..50 {
            surface.add_item(boxed(i as f64 * 30.0, 0.0, 20.0, 20.0)).unwrap();
        }
        for step in 0..30 {
            surface.scroll_to(Point::new(step as f64 * 50.0, 0.0)).unwrap();
            assert!(surface.containers().pool().len() <= 4);
        }
    }

    #[test]
    fn test_fit_to_content() {
        let mut surface = surface();
        surface.add_item(boxed(1000.0, 1000.0, 800.0, 600.0)).unwrap();
        surface.fit_to_content(0.0).unwrap();
        assert!((surface.camera().zoom() - 50.0).abs() < 1e-9);
        assert_eq!(surface.containers().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DesignerConfig {
            min_zoom: 10.0,
            max_zoom: 1.0,
            ..DesignerConfig::default()
        };
        assert!(matches!(
            DesignSurface::new(config, Size::new(10.0, 10.0)),
            Err(DesignerError::Config(_))
        ));
    }
}
