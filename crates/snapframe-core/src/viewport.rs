//! Viewport tracking and container virtualization.
//!
//! Only items whose bounds touch the viewport own a container. Every scroll,
//! zoom, resize or bounds change runs a delta pass that looks at the strips
//! of scene space that were just exposed or just covered, so the cost of a
//! frame follows the changed area instead of the item count.

use crate::camera::Camera;
use crate::collection::{CollectionChange, ItemCollection, QueryMode};
use crate::container::{ContainerId, ContainerRegistry};
use crate::diagnostics::Tracer;
use crate::error::{DesignerError, DesignerResult};
use crate::item::ItemId;
use crate::selection::SelectionSet;
use crate::spatial_index::intersects;
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashSet;

/// "Nice" zoom stops (percent) visited by wheel stepping.
pub const ZOOM_STOPS: [f64; 14] = [
    0.1, 1.0, 5.0, 12.5, 25.0, 50.0, 75.0, 100.0, 200.0, 400.0, 800.0, 1200.0, 1600.0, 2000.0,
];

/// Position of `zoom` in [`ZOOM_STOPS`]: `Ok(index)` on an exact stop,
/// `Err(insertion_point)` otherwise.
fn stop_position(zoom: f64) -> Result<usize, usize> {
    ZOOM_STOPS.binary_search_by(|stop| stop.total_cmp(&zoom))
}

/// Next stop above `zoom`. Zooms beyond the last stop stay where they are.
pub fn zoom_step_up(zoom: f64) -> f64 {
    let next = match stop_position(zoom) {
        Ok(index) => index + 1,
        Err(insert) => insert,
    };
    ZOOM_STOPS.get(next).copied().unwrap_or(zoom)
}

/// Next stop below `zoom`. Zooms below the first stop stay where they are.
pub fn zoom_step_down(zoom: f64) -> f64 {
    let index = match stop_position(zoom) {
        Ok(index) | Err(index) => index,
    };
    match index.checked_sub(1) {
        Some(prev) => ZOOM_STOPS[prev],
        None => zoom,
    }
}

/// Reject NaN and infinite view arguments before they reach the camera.
fn ensure_finite(what: &str, values: &[f64]) -> DesignerResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DesignerError::InvalidGeometry(format!("{} must be finite: {:?}", what, values)))
    }
}

/// Parts of `a` not covered by `b`, as up to four strips.
///
/// Strips are closed rectangles, so an item touching the uncovered area
/// always intersects at least one of them.
fn uncovered_strips(a: Rect, b: Rect) -> Vec<Rect> {
    let overlaps = b.x0 < a.x1 && a.x0 < b.x1 && b.y0 < a.y1 && a.y0 < b.y1;
    if !overlaps {
        return vec![a];
    }
    let mut strips = Vec::with_capacity(4);
    if b.x0 > a.x0 {
        strips.push(Rect::new(a.x0, a.y0, b.x0, a.y1));
    }
    if b.x1 < a.x1 {
        strips.push(Rect::new(b.x1, a.y0, a.x1, a.y1));
    }
    let x0 = a.x0.max(b.x0);
    let x1 = a.x1.min(b.x1);
    if b.y0 > a.y0 {
        strips.push(Rect::new(x0, a.y0, x1, b.y0));
    }
    if b.y1 < a.y1 {
        strips.push(Rect::new(x0, b.y1, x1, a.y1));
    }
    strips
}

/// Whether a delta pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportState {
    #[default]
    Idle,
    Updating,
}

/// Items shown and hidden by one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportUpdate {
    pub shown: Vec<ItemId>,
    pub hidden: Vec<ItemId>,
}

impl ViewportUpdate {
    /// True when nothing was shown or hidden.
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty()
    }
}

/// Borrowed scene state a pass operates on.
pub struct SceneContext<'a> {
    pub items: &'a ItemCollection,
    pub containers: &'a mut ContainerRegistry,
    pub selection: &'a SelectionSet,
}

/// Tracks the visible rectangle and keeps containers in step with it.
#[derive(Debug)]
pub struct ViewportManager {
    camera: Camera,
    physical_size: Size,
    viewport: Rect,
    state: ViewportState,
    pinned: HashSet<ItemId>,
    culling_suspended: bool,
    tracer: Tracer,
}

impl ViewportManager {
    /// Viewport over `physical_size` pixels seen through `camera`.
    pub fn new(camera: Camera, physical_size: Size, tracer: Tracer) -> Self {
        let viewport = camera.visible_rect(physical_size);
        Self {
            camera,
            physical_size,
            viewport,
            state: ViewportState::Idle,
            pinned: HashSet::new(),
            culling_suspended: false,
            tracer,
        }
    }

    /// Camera driving the viewport.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Visible scene rectangle.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Viewport size in pixels.
    pub fn physical_size(&self) -> Size {
        self.physical_size
    }

    /// Current zoom in percent.
    pub fn zoom(&self) -> f64 {
        self.camera.zoom()
    }

    /// Whether a delta pass is running.
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// True between `materialize_all` and `restore_culling`.
    pub fn is_culling_suspended(&self) -> bool {
        self.culling_suspended
    }

    /// Whether `item` currently touches the viewport.
    pub fn is_in_view(&self, bounds: Rect) -> bool {
        intersects(bounds, self.viewport)
    }

    /// Move the viewport to `rect` (scene coordinates) and run a delta pass.
    pub fn set_viewport(&mut self, rect: Rect, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        ensure_finite("viewport", &[rect.x0, rect.y0, rect.x1, rect.y1])?;
        let rect = rect.abs();
        self.camera.origin = Point::new(rect.x0, rect.y0);
        self.apply_viewport(rect, ctx)
    }

    /// Resize the physical viewport (pixels).
    pub fn set_physical_size(&mut self, size: Size, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        ensure_finite("viewport size", &[size.width, size.height])?;
        if size.width < 0.0 || size.height < 0.0 {
            return Err(DesignerError::InvalidGeometry(format!("negative viewport size {:?}", size)));
        }
        self.physical_size = size;
        self.refresh(ctx)
    }

    /// Scroll so the top-left of the screen shows `origin`.
    pub fn scroll_to(&mut self, origin: Point, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        ensure_finite("scroll origin", &[origin.x, origin.y])?;
        self.camera.origin = origin;
        self.refresh(ctx)
    }

    /// Scroll by a delta in scene units.
    pub fn scroll_by(&mut self, delta: Vec2, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        ensure_finite("scroll delta", &[delta.x, delta.y])?;
        self.camera.pan(delta);
        self.refresh(ctx)
    }

    /// Set zoom (clamped) keeping the viewport origin.
    pub fn set_zoom(&mut self, zoom: f64, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        ensure_finite("zoom", &[zoom])?;
        self.camera.set_zoom(zoom);
        self.refresh(ctx)
    }

    /// Set zoom keeping the scene point under `screen_point` fixed.
    pub fn zoom_at(
        &mut self,
        screen_point: Point,
        zoom: f64,
        ctx: &mut SceneContext<'_>,
    ) -> DesignerResult<ViewportUpdate> {
        ensure_finite("zoom anchor", &[screen_point.x, screen_point.y, zoom])?;
        self.camera.zoom_at(screen_point, zoom);
        self.refresh(ctx)
    }

    /// One wheel notch: move exactly one zoom stop, anchored at `screen_point`.
    pub fn wheel_zoom(
        &mut self,
        zoom_in: bool,
        screen_point: Point,
        ctx: &mut SceneContext<'_>,
    ) -> DesignerResult<ViewportUpdate> {
        let current = self.camera.zoom();
        let target = if zoom_in {
            zoom_step_up(current)
        } else {
            zoom_step_down(current)
        };
        self.tracer
            .debug(format_args!("wheel zoom {} -> {}", current, target));
        self.zoom_at(screen_point, target, ctx)
    }

    /// Zoom and scroll so the whole extent is visible.
    pub fn fit_to_extent(&mut self, padding: f64, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        match ctx.items.extent() {
            Some(extent) => {
                self.camera.fit_to_bounds(extent, self.physical_size, padding);
                self.refresh(ctx)
            }
            None => Ok(ViewportUpdate::default()),
        }
    }

    fn refresh(&mut self, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        let rect = self.camera.visible_rect(self.physical_size);
        self.apply_viewport(rect, ctx)
    }

    /// Delta pass between the current and the new viewport.
    fn apply_viewport(&mut self, new: Rect, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        let old = self.viewport;
        self.viewport = new;
        if old == new {
            return Ok(ViewportUpdate::default());
        }
        self.state = ViewportState::Updating;
        let result = self.run_delta_pass(old, new, ctx);
        self.state = ViewportState::Idle;
        let update = result?;
        self.tracer.trace(format_args!(
            "viewport {:?} -> {:?}: +{} -{}",
            old,
            new,
            update.shown.len(),
            update.hidden.len()
        ));
        Ok(update)
    }

    fn run_delta_pass(&mut self, old: Rect, new: Rect, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        let mut update = ViewportUpdate::default();

        for strip in uncovered_strips(new, old) {
            let exposed: Vec<ItemId> = ctx
                .items
                .query(strip, QueryMode::Intersects)
                .filter(|item| intersects(item.bounds(), new))
                .map(|item| item.id())
                .collect();
            for id in exposed {
                if ctx.containers.container_from_item(id).is_none() {
                    self.make_visible(id, ctx)?;
                    update.shown.push(id);
                }
            }
        }

        if self.culling_suspended {
            return Ok(update);
        }

        for strip in uncovered_strips(old, new) {
            let covered: Vec<ItemId> = ctx
                .items
                .query(strip, QueryMode::Intersects)
                .filter(|item| !intersects(item.bounds(), new))
                .map(|item| item.id())
                .collect();
            for id in covered {
                if self.make_hidden(id, ctx.containers)? {
                    update.hidden.push(id);
                }
            }
        }

        Ok(update)
    }

    /// React to a collection change with the minimum container work.
    pub fn on_collection_changed(
        &mut self,
        change: &CollectionChange,
        ctx: &mut SceneContext<'_>,
    ) -> DesignerResult<ViewportUpdate> {
        self.state = ViewportState::Updating;
        let result = self.handle_change(change, ctx);
        self.state = ViewportState::Idle;
        result
    }

    fn handle_change(&mut self, change: &CollectionChange, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        let mut update = ViewportUpdate::default();
        match change {
            CollectionChange::Added { items, .. } => {
                for &id in items {
                    if self.wants_container(id, ctx.items) {
                        self.make_visible(id, ctx)?;
                        update.shown.push(id);
                    }
                }
            }
            CollectionChange::Removed { items } => {
                for &id in items {
                    self.pinned.remove(&id);
                    if let Some(container) = ctx.containers.container_from_item(id) {
                        ctx.containers.recycle(container)?;
                        update.hidden.push(id);
                    }
                }
            }
            CollectionChange::Replaced { old, new } => {
                if old != new {
                    self.pinned.remove(old);
                }
                if let Some(container) = ctx.containers.container_from_item(*old) {
                    ctx.containers.recycle(container)?;
                    update.hidden.push(*old);
                }
                if self.wants_container(*new, ctx.items) {
                    self.make_visible(*new, ctx)?;
                    update.shown.push(*new);
                }
            }
            CollectionChange::Moved { .. } => {}
            CollectionChange::Reset => {
                let recycled = ctx.containers.recycle_all();
                self.pinned.retain(|id| ctx.items.contains(*id));
                let visible: Vec<ItemId> = if self.culling_suspended {
                    ctx.items.ids().to_vec()
                } else {
                    ctx.items
                        .query(self.viewport, QueryMode::Intersects)
                        .map(|item| item.id())
                        .collect()
                };
                for id in visible {
                    self.make_visible(id, ctx)?;
                    update.shown.push(id);
                }
                self.tracer.debug(format_args!(
                    "reset: recycled {}, materialized {}",
                    recycled,
                    update.shown.len()
                ));
            }
            CollectionChange::BoundsChanged { item, new, .. } => {
                let realized = ctx.containers.container_from_item(*item).is_some();
                let in_view = intersects(*new, self.viewport);
                if !realized && (in_view || self.culling_suspended) {
                    self.make_visible(*item, ctx)?;
                    update.shown.push(*item);
                } else if realized && !in_view && !self.culling_suspended && self.make_hidden(*item, ctx.containers)? {
                    update.hidden.push(*item);
                }
            }
        }
        Ok(update)
    }

    fn wants_container(&self, id: ItemId, items: &ItemCollection) -> bool {
        self.culling_suspended || items.bounds_of(id).is_some_and(|b| intersects(b, self.viewport))
    }

    /// Materialize a container for `item` (reusing an existing one) and apply
    /// its selection flag.
    pub fn make_visible(&mut self, item: ItemId, ctx: &mut SceneContext<'_>) -> DesignerResult<ContainerId> {
        if let Some(existing) = ctx.containers.container_from_item(item) {
            return Ok(existing);
        }
        let kind = ctx
            .items
            .get(item)
            .map(|i| i.kind)
            .ok_or(DesignerError::ItemNotFound(item))?;
        let container = ctx.containers.create_container(item, kind)?;
        if ctx.selection.contains(item) {
            ctx.containers.set_selected(container, true)?;
        }
        Ok(container)
    }

    /// Recycle the container of `item` unless the item is pinned.
    ///
    /// Returns true if a container was released.
    pub fn make_hidden(&mut self, item: ItemId, containers: &mut ContainerRegistry) -> DesignerResult<bool> {
        if self.pinned.contains(&item) {
            return Ok(false);
        }
        match containers.container_from_item(item) {
            Some(container) => {
                containers.recycle(container)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Keep `item` materialized regardless of the viewport.
    pub fn pin(&mut self, item: ItemId) {
        self.pinned.insert(item);
    }

    /// Release a pin and hide the item if it is out of view.
    pub fn unpin(&mut self, item: ItemId, ctx: &mut SceneContext<'_>) -> DesignerResult<bool> {
        if !self.pinned.remove(&item) || self.culling_suspended {
            return Ok(false);
        }
        match ctx.items.bounds_of(item) {
            Some(bounds) if intersects(bounds, self.viewport) => Ok(false),
            _ => self.make_hidden(item, ctx.containers),
        }
    }

    /// Whether `item` is pinned.
    pub fn is_pinned(&self, item: ItemId) -> bool {
        self.pinned.contains(&item)
    }

    /// Materialize every item, bypassing culling (for full-scene capture).
    pub fn materialize_all(&mut self, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        self.culling_suspended = true;
        let mut update = ViewportUpdate::default();
        for &id in ctx.items.ids() {
            if ctx.containers.container_from_item(id).is_none() {
                self.make_visible(id, ctx)?;
                update.shown.push(id);
            }
        }
        self.tracer
            .debug(format_args!("culling suspended, materialized {}", update.shown.len()));
        Ok(update)
    }

    /// Resume culling and release containers outside the viewport.
    pub fn restore_culling(&mut self, ctx: &mut SceneContext<'_>) -> DesignerResult<ViewportUpdate> {
        self.culling_suspended = false;
        let mut update = ViewportUpdate::default();
        let outside: Vec<ItemId> = ctx
            .items
            .iter()
            .filter(|item| !intersects(item.bounds(), self.viewport))
            .map(|item| item.id())
            .collect();
        for id in outside {
            if self.make_hidden(id, ctx.containers)? {
                update.hidden.push(id);
            }
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerPool;
    use crate::item::{ItemKind, SpatialItem};

    struct Fixture {
        items: ItemCollection,
        containers: ContainerRegistry,
        selection: SelectionSet,
        viewport: ViewportManager,
    }

    impl Fixture {
        fn new(width: f64, height: f64) -> Self {
            Self {
                items: ItemCollection::new(),
                containers: ContainerRegistry::new(ContainerPool::new(16), Tracer::disabled()),
                selection: SelectionSet::new(),
                viewport: ViewportManager::new(Camera::new(), Size::new(width, height), Tracer::disabled()),
            }
        }

        fn add(&mut self, x: f64, y: f64, w: f64, h: f64) -> ItemId {
            let item = SpatialItem::boxed(ItemKind::Image, Rect::new(x, y, x + w, y + h));
            let id = item.id();
            let change = self.items.add(item).unwrap();
            let mut ctx = SceneContext {
                items: &self.items,
                containers: &mut self.containers,
                selection: &self.selection,
            };
            self.viewport.on_collection_changed(&change, &mut ctx).unwrap();
            id
        }

        fn scroll_to(&mut self, x: f64, y: f64) -> ViewportUpdate {
            let mut ctx = SceneContext {
                items: &self.items,
                containers: &mut self.containers,
                selection: &self.selection,
            };
            self.viewport.scroll_to(Point::new(x, y), &mut ctx).unwrap()
        }

        fn realized(&self, id: ItemId) -> bool {
            self.containers.container_from_item(id).is_some()
        }
    }

    #[test]
    fn test_zoom_stops_from_exact_stop() {
        assert!((zoom_step_up(100.0) - 200.0).abs() < f64::EPSILON);
        assert!((zoom_step_down(100.0) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_stops_from_off_table_value() {
        assert!((zoom_step_up(150.0) - 200.0).abs() < f64::EPSILON);
        assert!((zoom_step_down(150.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_stops_at_table_ends() {
        assert!((zoom_step_down(0.1) - 0.1).abs() < f64::EPSILON);
        assert!((zoom_step_up(2000.0) - 2000.0).abs() < f64::EPSILON);
        assert!((zoom_step_down(5000.0) - 2000.0).abs() < f64::EPSILON);
        assert!((zoom_step_up(0.5) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_uncovered_strips() {
        let old = Rect::new(0.0, 0.0, 100.0, 100.0);
        let new = Rect::new(20.0, 10.0, 120.0, 110.0);
        let exposed = uncovered_strips(new, old);
        assert_eq!(
            exposed,
            vec![Rect::new(100.0, 10.0, 120.0, 110.0), Rect::new(20.0, 100.0, 100.0, 110.0)]
        );
        let hidden = uncovered_strips(old, new);
        assert_eq!(
            hidden,
            vec![Rect::new(0.0, 0.0, 20.0, 100.0), Rect::new(20.0, 0.0, 100.0, 10.0)]
        );
        // Disjoint viewports expose the whole new rect
        let far = Rect::new(500.0, 500.0, 600.0, 600.0);
        assert_eq!(uncovered_strips(far, old), vec![far]);
    }

    #[test]
    fn test_added_items_realized_only_in_view() {
        let mut fx = Fixture::new(400.0, 300.0);
        let visible = fx.add(10.0, 10.0, 50.0, 50.0);
        let offscreen = fx.add(1000.0, 1000.0, 50.0, 50.0);
        assert!(fx.realized(visible));
        assert!(!fx.realized(offscreen));
    }

    #[test]
    fn test_scroll_shows_and_hides_by_delta() {
        let mut fx = Fixture::new(400.0, 300.0);
        let left = fx.add(10.0, 10.0, 50.0, 50.0);
        let right = fx.add(500.0, 10.0, 50.0, 50.0);
        let spanning = fx.add(300.0, 10.0, 300.0, 50.0);

        let update = fx.scroll_to(250.0, 0.0);
        assert_eq!(update.shown, vec![right]);
        assert_eq!(update.hidden, vec![left]);
        assert!(fx.realized(spanning));
        assert!(!fx.realized(left));

        let update = fx.scroll_to(250.0, 0.0);
        assert!(update.is_empty());
    }

    #[test]
    fn test_zoom_out_exposes_more() {
        let mut fx = Fixture::new(400.0, 300.0);
        let far = fx.add(700.0, 500.0, 50.0, 50.0);
        assert!(!fx.realized(far));
        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        fx.viewport.set_zoom(25.0, &mut ctx).unwrap();
        assert_eq!(fx.viewport.viewport(), Rect::new(0.0, 0.0, 1600.0, 1200.0));
        assert!(fx.realized(far));
    }

    #[test]
    fn test_bounds_change_moves_item_out_and_back() {
        let mut fx = Fixture::new(400.0, 300.0);
        let id = fx.add(10.0, 10.0, 50.0, 50.0);
        let change = fx
            .items
            .update(id, |item| item.translate(Vec2::new(2000.0, 0.0)))
            .unwrap()
            .unwrap();
        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        let update = fx.viewport.on_collection_changed(&change, &mut ctx).unwrap();
        assert_eq!(update.hidden, vec![id]);
        assert!(!fx.realized(id));
    }

    #[test]
    fn test_pinned_item_survives_scroll() {
        let mut fx = Fixture::new(400.0, 300.0);
        let id = fx.add(10.0, 10.0, 50.0, 50.0);
        fx.viewport.pin(id);
        fx.scroll_to(5000.0, 0.0);
        assert!(fx.realized(id));

        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        assert!(fx.viewport.unpin(id, &mut ctx).unwrap());
        assert!(!fx.realized(id));
    }

    #[test]
    fn test_reset_materializes_visible_items() {
        let mut fx = Fixture::new(400.0, 300.0);
        fx.add(10.0, 10.0, 50.0, 50.0);
        let near = SpatialItem::boxed(ItemKind::Text, Rect::new(100.0, 100.0, 120.0, 120.0));
        let far = SpatialItem::boxed(ItemKind::Text, Rect::new(900.0, 900.0, 920.0, 920.0));
        let (near_id, far_id) = (near.id(), far.id());
        let change = fx.items.reset_with(vec![near, far]).unwrap();
        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        let update = fx.viewport.on_collection_changed(&change, &mut ctx).unwrap();
        assert_eq!(update.shown, vec![near_id]);
        assert_eq!(fx.containers.len(), 1);
        assert!(!fx.realized(far_id));
    }

    #[test]
    fn test_materialize_all_then_restore() {
        let mut fx = Fixture::new(400.0, 300.0);
        let near = fx.add(10.0, 10.0, 50.0, 50.0);
        let far = fx.add(3000.0, 3000.0, 50.0, 50.0);
        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        let update = fx.viewport.materialize_all(&mut ctx).unwrap();
        assert_eq!(update.shown, vec![far]);
        assert!(fx.viewport.is_culling_suspended());

        let update = fx.viewport.restore_culling(&mut ctx).unwrap();
        assert_eq!(update.hidden, vec![far]);
        assert!(fx.realized(near));
        assert!(!fx.realized(far));
    }

    #[test]
    fn test_selected_item_gets_selected_container() {
        let mut fx = Fixture::new(400.0, 300.0);
        let item = SpatialItem::boxed(ItemKind::Image, Rect::new(800.0, 0.0, 850.0, 50.0));
        let id = item.id();
        fx.items.add(item).unwrap();
        fx.selection.add(id);
        fx.scroll_to(600.0, 0.0);
        let container = fx.containers.container_for(id).unwrap();
        assert!(container.is_selected());
    }

    #[test]
    fn test_non_finite_view_arguments_rejected() {
        let mut fx = Fixture::new(400.0, 300.0);
        let before = fx.viewport.viewport();
        let mut ctx = SceneContext {
            items: &fx.items,
            containers: &mut fx.containers,
            selection: &fx.selection,
        };
        assert!(matches!(
            fx.viewport.set_zoom(f64::NAN, &mut ctx),
            Err(DesignerError::InvalidGeometry(_))
        ));
        assert!(fx.viewport.zoom_at(Point::new(f64::INFINITY, 0.0), 200.0, &mut ctx).is_err());
        assert!(fx.viewport.scroll_to(Point::new(f64::NAN, 0.0), &mut ctx).is_err());
        assert!(fx.viewport.scroll_by(Vec2::new(0.0, f64::NEG_INFINITY), &mut ctx).is_err());
        assert!(fx.viewport.set_physical_size(Size::new(-1.0, 300.0), &mut ctx).is_err());
        assert!(fx.viewport.set_viewport(Rect::new(0.0, 0.0, f64::NAN, 10.0), &mut ctx).is_err());

        assert!((fx.viewport.zoom() - 100.0).abs() < f64::EPSILON);
        assert_eq!(fx.viewport.viewport(), before);
        fx.viewport.wheel_zoom(true, Point::ZERO, &mut ctx).unwrap();
        assert!((fx.viewport.zoom() - 200.0).abs() < f64::EPSILON);
    }
}
