//! Ordered, observable item collection with spatial queries.

use crate::error::{DesignerError, DesignerResult};
use crate::item::{ItemId, SpatialItem};
use crate::notify::{SubscriptionId, Subscribers};
use crate::spatial_index::SpatialIndex;
use kurbo::{Point, Rect};
use std::collections::{HashMap, HashSet};

/// How a range query matches item bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Bounds overlap the query rectangle (edges inclusive).
    #[default]
    Intersects,
    /// Bounds lie entirely inside the query rectangle.
    FullyContains,
}

/// Structured change notification. One is emitted per mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange {
    /// Items inserted starting at `index`.
    Added { items: Vec<ItemId>, index: usize },
    /// Items removed.
    Removed { items: Vec<ItemId> },
    /// `old` was swapped for `new` at the same stacking position.
    Replaced { old: ItemId, new: ItemId },
    /// Stacking position of `item` changed.
    Moved { item: ItemId, from: usize, to: usize },
    /// Contents replaced wholesale (clear or bulk load).
    Reset,
    /// Bounds of a member changed.
    BoundsChanged { item: ItemId, old: Rect, new: Rect },
}

/// Scene items in stacking order (back to front).
#[derive(Debug, Default)]
pub struct ItemCollection {
    items: HashMap<ItemId, SpatialItem>,
    order: Vec<ItemId>,
    index: SpatialIndex,
    extent: Option<Rect>,
    subscribers: Subscribers<CollectionChange>,
}

/// True if `inner` reaches any edge of `outer`.
fn touches_edge(outer: Rect, inner: Rect) -> bool {
    inner.x0 <= outer.x0 || inner.y0 <= outer.y0 || inner.x1 >= outer.x1 || inner.y1 >= outer.y1
}

impl ItemCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change handler.
    pub fn subscribe(&mut self, handler: impl FnMut(&CollectionChange) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(handler)
    }

    /// Drop a change handler. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn emit(&mut self, change: CollectionChange) -> CollectionChange {
        self.subscribers.emit(&change);
        change
    }

    /// Append an item on top of the stack.
    pub fn add(&mut self, item: SpatialItem) -> DesignerResult<CollectionChange> {
        let index = self.order.len();
        self.insert_at(index, item)
    }

    /// Insert an item at stacking position `index` (clamped to the end).
    pub fn insert_at(&mut self, index: usize, item: SpatialItem) -> DesignerResult<CollectionChange> {
        let id = item.id();
        if self.items.contains_key(&id) {
            return Err(DesignerError::DuplicateItem(id));
        }
        let index = index.min(self.order.len());
        self.attach(item);
        self.order.insert(index, id);
        Ok(self.emit(CollectionChange::Added {
            items: vec![id],
            index,
        }))
    }

    /// Wire a new member: index its bounds and grow the extent.
    fn attach(&mut self, item: SpatialItem) {
        let id = item.id();
        let bounds = item.bounds();
        self.index.insert(id, bounds);
        self.extent = Some(match self.extent {
            Some(extent) => extent.union(bounds),
            None => bounds,
        });
        self.items.insert(id, item);
    }

    /// Remove an item, returning it.
    pub fn remove(&mut self, id: ItemId) -> DesignerResult<(SpatialItem, CollectionChange)> {
        let item = self.items.remove(&id).ok_or(DesignerError::ItemNotFound(id))?;
        self.order.retain(|&other| other != id);
        self.index.remove(id);
        self.recompute_extent();
        let change = self.emit(CollectionChange::Removed { items: vec![id] });
        Ok((item, change))
    }

    /// Remove several items with a single notification. Unknown ids are skipped.
    pub fn remove_many(&mut self, ids: &[ItemId]) -> (Vec<SpatialItem>, Option<CollectionChange>) {
        let mut removed = Vec::new();
        for id in ids {
            if let Some(item) = self.items.remove(id) {
                self.index.remove(*id);
                removed.push(item);
            }
        }
        if removed.is_empty() {
            return (removed, None);
        }
        let gone: HashSet<ItemId> = removed.iter().map(|i| i.id()).collect();
        self.order.retain(|id| !gone.contains(id));
        self.recompute_extent();
        let change = self.emit(CollectionChange::Removed {
            items: removed.iter().map(|i| i.id()).collect(),
        });
        (removed, Some(change))
    }

    /// Swap `old` for `new` at the same stacking position.
    pub fn replace(&mut self, old: ItemId, new: SpatialItem) -> DesignerResult<(SpatialItem, CollectionChange)> {
        let new_id = new.id();
        if new_id != old && self.items.contains_key(&new_id) {
            return Err(DesignerError::DuplicateItem(new_id));
        }
        let position = self.index_of(old).ok_or(DesignerError::ItemNotFound(old))?;
        let previous = self
            .items
            .remove(&old)
            .ok_or(DesignerError::ItemNotFound(old))?;
        self.index.remove(old);
        self.attach(new);
        self.order[position] = new_id;
        self.recompute_extent();
        let change = self.emit(CollectionChange::Replaced { old, new: new_id });
        Ok((previous, change))
    }

    /// Remove everything.
    pub fn clear(&mut self) -> CollectionChange {
        self.items.clear();
        self.order.clear();
        self.index.clear();
        self.extent = None;
        self.emit(CollectionChange::Reset)
    }

    /// Replace the contents with `items` (in stacking order) under one Reset.
    pub fn reset_with(&mut self, items: Vec<SpatialItem>) -> DesignerResult<CollectionChange> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(DesignerError::DuplicateItem(item.id()));
            }
        }
        self.order = items.iter().map(|i| i.id()).collect();
        self.index.rebuild(items.iter().map(|i| (i.id(), i.bounds())));
        self.items = items.into_iter().map(|i| (i.id(), i)).collect();
        self.recompute_extent();
        Ok(self.emit(CollectionChange::Reset))
    }

    /// Mutate an item in place.
    ///
    /// Emits `BoundsChanged` (and returns it) when the bounds moved.
    pub fn update(
        &mut self,
        id: ItemId,
        f: impl FnOnce(&mut SpatialItem),
    ) -> DesignerResult<Option<CollectionChange>> {
        let item = self.items.get_mut(&id).ok_or(DesignerError::ItemNotFound(id))?;
        let old = item.bounds();
        f(item);
        item.id = id;
        let new = item.bounds();
        if old == new {
            return Ok(None);
        }
        self.index.insert(id, new);
        match self.extent {
            Some(extent) if !touches_edge(extent, old) => self.extent = Some(extent.union(new)),
            _ => self.recompute_extent(),
        }
        Ok(Some(self.emit(CollectionChange::BoundsChanged { item: id, old, new })))
    }

    /// Move an item to stacking position `index` (clamped).
    pub fn move_to(&mut self, id: ItemId, index: usize) -> DesignerResult<Option<CollectionChange>> {
        let from = self.index_of(id).ok_or(DesignerError::ItemNotFound(id))?;
        let to = index.min(self.order.len() - 1);
        if from == to {
            return Ok(None);
        }
        self.order.remove(from);
        self.order.insert(to, id);
        Ok(Some(self.emit(CollectionChange::Moved { item: id, from, to })))
    }

    fn recompute_extent(&mut self) {
        self.extent = self
            .items
            .values()
            .map(|i| i.bounds())
            .reduce(|acc, b| acc.union(b));
    }

    /// Item with `id`, if present.
    pub fn get(&self, id: ItemId) -> Option<&SpatialItem> {
        self.items.get(&id)
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Stacking position of an item.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Items in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Ids in stacking order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Union of all member bounds, `None` when empty.
    pub fn extent(&self) -> Option<Rect> {
        self.extent
    }

    /// Bounds of a member as last indexed.
    pub fn bounds_of(&self, id: ItemId) -> Option<Rect> {
        self.index.bounds_of(id)
    }

    /// Lazily yield the items whose bounds match `rect` under `mode`.
    ///
    /// Results come in index order, not stacking order.
    pub fn query(&self, rect: Rect, mode: QueryMode) -> impl Iterator<Item = &SpatialItem> + '_ {
        let ids: Box<dyn Iterator<Item = ItemId> + '_> = match mode {
            QueryMode::Intersects => Box::new(self.index.intersecting(rect)),
            QueryMode::FullyContains => Box::new(self.index.contained_in(rect)),
        };
        ids.filter_map(move |id| self.items.get(&id))
    }

    /// Items whose shape contains `point`, back to front.
    pub fn items_at(&self, point: Point) -> Vec<ItemId> {
        let hits: HashSet<ItemId> = self
            .index
            .at_point(point)
            .filter(|id| self.items.get(id).is_some_and(|i| i.contains_point(point)))
            .collect();
        if hits.is_empty() {
            return Vec::new();
        }
        self.order.iter().copied().filter(|id| hits.contains(id)).collect()
    }

    /// Frontmost item containing `point`.
    pub fn topmost_at(&self, point: Point) -> Option<ItemId> {
        self.items_at(point).last().copied()
    }
}
