//! Selection set and its synchronization with container visual state.

use crate::container::{ContainerEvent, ContainerRegistry};
use crate::error::{DesignerError, DesignerResult};
use crate::item::ItemId;
use std::collections::HashSet;

/// How a batch of hits is merged into the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Selection becomes exactly the hits.
    #[default]
    Replace,
    /// Symmetric difference: hits already selected are dropped, others added.
    Toggle,
    /// Union.
    Extend,
}

/// Items that entered and left the selection in one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    pub added: Vec<ItemId>,
    pub removed: Vec<ItemId>,
}

impl SelectionDelta {
    /// True when nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Fold a later delta into this one.
    pub fn merge(&mut self, later: SelectionDelta) {
        for id in later.removed {
            if let Some(pos) = self.added.iter().position(|&a| a == id) {
                self.added.remove(pos);
            } else {
                self.removed.push(id);
            }
        }
        for id in later.added {
            if let Some(pos) = self.removed.iter().position(|&r| r == id) {
                self.removed.remove(pos);
            } else {
                self.added.push(id);
            }
        }
    }
}

/// Ordered, duplicate-free set of selected item ids.
///
/// Holds ids only; the collection owns the items.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<ItemId>,
    members: HashSet<ItemId>,
}

impl SelectionSet {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: ItemId) -> bool {
        self.members.contains(&id)
    }

    /// Number of selected items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Selected ids in selection order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.order.iter().copied()
    }

    /// Most recently selected item.
    pub fn primary(&self) -> Option<ItemId> {
        self.order.last().copied()
    }

    /// Select `id`, keeping existing entries.
    pub fn add(&mut self, id: ItemId) -> SelectionDelta {
        let mut delta = SelectionDelta::default();
        if self.members.insert(id) {
            self.order.push(id);
            delta.added.push(id);
        }
        delta
    }

    /// Deselect `id`.
    pub fn remove(&mut self, id: ItemId) -> SelectionDelta {
        let mut delta = SelectionDelta::default();
        if self.members.remove(&id) {
            self.order.retain(|&other| other != id);
            delta.removed.push(id);
        }
        delta
    }

    /// Add or remove `id` depending on `selected`.
    pub fn set(&mut self, id: ItemId, selected: bool) -> SelectionDelta {
        if selected { self.add(id) } else { self.remove(id) }
    }

    /// Flip the membership of `id`.
    pub fn toggle(&mut self, id: ItemId) -> SelectionDelta {
        let selected = self.contains(id);
        self.set(id, !selected)
    }

    /// Deselect everything.
    pub fn clear(&mut self) -> SelectionDelta {
        let removed = std::mem::take(&mut self.order);
        self.members.clear();
        SelectionDelta {
            added: Vec::new(),
            removed,
        }
    }

    /// Make the selection exactly `ids` (duplicates ignored).
    pub fn replace(&mut self, ids: impl IntoIterator<Item = ItemId>) -> SelectionDelta {
        let next: Vec<ItemId> = {
            let mut seen = HashSet::new();
            ids.into_iter().filter(|id| seen.insert(*id)).collect()
        };
        let next_set: HashSet<ItemId> = next.iter().copied().collect();
        let removed: Vec<ItemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !next_set.contains(id))
            .collect();
        let added: Vec<ItemId> = next
            .iter()
            .copied()
            .filter(|id| !self.members.contains(id))
            .collect();
        self.order = next;
        self.members = next_set;
        SelectionDelta { added, removed }
    }

    /// Drop every id in `ids` from the selection.
    pub fn remove_many(&mut self, ids: &[ItemId]) -> SelectionDelta {
        let mut delta = SelectionDelta::default();
        for &id in ids {
            delta.merge(self.remove(id));
        }
        delta
    }

    /// Merge `hits` into the selection according to `mode`.
    pub fn combine(&mut self, hits: &[ItemId], mode: CombineMode) -> SelectionDelta {
        match mode {
            CombineMode::Replace => self.replace(hits.iter().copied()),
            CombineMode::Extend => {
                let mut delta = SelectionDelta::default();
                for &id in hits {
                    delta.merge(self.add(id));
                }
                delta
            }
            CombineMode::Toggle => {
                let mut delta = SelectionDelta::default();
                let mut seen = HashSet::new();
                for &id in hits {
                    if seen.insert(id) {
                        delta.merge(self.toggle(id));
                    }
                }
                delta
            }
        }
    }

    /// Click-to-select on `id`.
    ///
    /// A selected item keeps the current selection. Otherwise the item is
    /// added, after clearing everything else unless `extend` is held.
    pub fn click(&mut self, id: ItemId, extend: bool) -> SelectionDelta {
        if self.contains(id) {
            return SelectionDelta::default();
        }
        if extend {
            self.add(id)
        } else {
            self.replace([id])
        }
    }
}

/// Next item to select when cycling through `candidates` (collection
/// order). Starts after the first candidate already selected and wraps.
pub fn next_in_cycle(candidates: &[ItemId], selection: &SelectionSet) -> Option<ItemId> {
    if candidates.is_empty() {
        return None;
    }
    let next = match candidates.iter().position(|&id| selection.contains(id)) {
        Some(current) => (current + 1) % candidates.len(),
        None => 0,
    };
    Some(candidates[next])
}

/// Pushes selection changes onto containers and pulls container changes
/// back into the set, refusing to recurse into itself.
#[derive(Debug, Default)]
pub struct SelectionSync {
    syncing: bool,
    suppressed: usize,
}

impl SelectionSync {
    /// Sync with no pending echoes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a push is in progress.
    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Container events swallowed because they arrived mid-push.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    fn begin(&mut self) -> DesignerResult<()> {
        if self.syncing {
            return Err(DesignerError::ReentrantSelectionSync);
        }
        self.syncing = true;
        Ok(())
    }

    /// Apply `delta` to the containers of realized items.
    ///
    /// Items without a container are skipped; they pick up their flag when
    /// materialized. Returns the number of containers whose flag flipped.
    pub fn push(
        &mut self,
        delta: &SelectionDelta,
        containers: &mut ContainerRegistry,
        selection: &mut SelectionSet,
    ) -> DesignerResult<usize> {
        self.begin()?;
        let result = self.push_flags(delta, containers, selection);
        self.syncing = false;
        result
    }

    fn push_flags(
        &mut self,
        delta: &SelectionDelta,
        containers: &mut ContainerRegistry,
        selection: &mut SelectionSet,
    ) -> DesignerResult<usize> {
        let changes = delta
            .removed
            .iter()
            .map(|&id| (id, false))
            .chain(delta.added.iter().map(|&id| (id, true)));
        let mut flipped = 0;
        for (item, selected) in changes {
            let Some(container) = containers.container_from_item(item) else {
                continue;
            };
            if let Some(event) = containers.set_selected(container, selected)? {
                flipped += 1;
                // The flag change echoes back through the container channel
                self.on_container_event(&event, selection)?;
            }
        }
        Ok(flipped)
    }

    /// Reflect a container-side selection change into the set.
    ///
    /// Returns `None` when the event is an echo of an in-progress push.
    pub fn on_container_event(
        &mut self,
        event: &ContainerEvent,
        selection: &mut SelectionSet,
    ) -> DesignerResult<Option<SelectionDelta>> {
        if self.syncing {
            self.suppressed += 1;
            return Ok(None);
        }
        let ContainerEvent::SelectionChanged { item, selected, .. } = *event;
        self.begin()?;
        let delta = selection.set(item, selected);
        self.syncing = false;
        Ok(Some(delta))
    }
}
