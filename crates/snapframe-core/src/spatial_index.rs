//! R-tree index over item bounds for range queries and hit testing.

use crate::item::ItemId;
use kurbo::{Point, Rect};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// Bounds of one item as stored in the tree.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    pub item_id: ItemId,
    pub bounds: Rect,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bounds.x0, self.bounds.y0], [self.bounds.x1, self.bounds.y1])
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.item_id == other.item_id
    }
}

/// Inclusive overlap test matching the index's query semantics.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

fn envelope_of(rect: Rect) -> AABB<[f64; 2]> {
    let rect = rect.abs();
    AABB::from_corners([rect.x0, rect.y0], [rect.x1, rect.y1])
}

/// Spatial index keyed by item id.
///
/// Edges are inclusive: an item touching the query rectangle intersects it.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
    entries: HashMap<ItemId, IndexEntry>,
}

impl SpatialIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bounds recorded for `item_id`.
    pub fn insert(&mut self, item_id: ItemId, bounds: Rect) {
        if let Some(old) = self.entries.remove(&item_id) {
            self.tree.remove(&old);
        }
        let entry = IndexEntry { item_id, bounds };
        self.tree.insert(entry);
        self.entries.insert(item_id, entry);
    }

    /// Remove an entry. Returns false if it was not indexed.
    pub fn remove(&mut self, item_id: ItemId) -> bool {
        match self.entries.remove(&item_id) {
            Some(entry) => {
                self.tree.remove(&entry);
                true
            }
            None => false,
        }
    }

    /// Bounds currently recorded for an item.
    pub fn bounds_of(&self, item_id: ItemId) -> Option<Rect> {
        self.entries.get(&item_id).map(|e| e.bounds)
    }

    /// Items whose bounds overlap `rect`.
    pub fn intersecting(&self, rect: Rect) -> impl Iterator<Item = ItemId> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&envelope_of(rect))
            .map(|e| e.item_id)
    }

    /// Items whose bounds lie entirely inside `rect`.
    pub fn contained_in(&self, rect: Rect) -> impl Iterator<Item = ItemId> + '_ {
        self.tree
            .locate_in_envelope(&envelope_of(rect))
            .map(|e| e.item_id)
    }

    /// Items whose bounds contain `point`.
    pub fn at_point(&self, point: Point) -> impl Iterator<Item = ItemId> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|e| e.item_id)
    }

    /// Replace the whole index in one bulk load.
    pub fn rebuild<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (ItemId, Rect)>,
    {
        let entries: Vec<IndexEntry> = items
            .into_iter()
            .map(|(item_id, bounds)| IndexEntry { item_id, bounds })
            .collect();
        self.entries = entries.iter().map(|e| (e.item_id, *e)).collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
