//! Two-way item/container mapping backed by the pool.

use super::pool::ContainerPool;
use super::visual::{ContainerId, VisualContainer};
use crate::diagnostics::Tracer;
use crate::error::{DesignerError, DesignerResult};
use crate::item::{ItemId, ItemKind};
use std::collections::HashMap;

/// Raised when a container's visual selection flag actually flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    SelectionChanged {
        container: ContainerId,
        item: ItemId,
        selected: bool,
    },
}

/// Live containers and the item each one is bound to.
///
/// At most one container exists per item. A container missing from the
/// registry is either idle in the pool or was never created.
#[derive(Debug)]
pub struct ContainerRegistry {
    pool: ContainerPool,
    live: HashMap<ContainerId, VisualContainer>,
    by_item: HashMap<ItemId, ContainerId>,
    next_id: u64,
    tracer: Tracer,
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        Self::new(ContainerPool::default(), Tracer::disabled())
    }
}

impl ContainerRegistry {
    /// Registry drawing fresh containers from `pool`.
    pub fn new(pool: ContainerPool, tracer: Tracer) -> Self {
        Self {
            pool,
            live: HashMap::new(),
            by_item: HashMap::new(),
            next_id: 1,
            tracer,
        }
    }

    /// Bind a container (pooled or new) to `item`.
    pub fn create_container(&mut self, item: ItemId, kind: ItemKind) -> DesignerResult<ContainerId> {
        if self.by_item.contains_key(&item) {
            return Err(DesignerError::ContainerExists(item));
        }
        let mut container = match self.pool.pop() {
            Some(container) => container,
            None => {
                let id = ContainerId(self.next_id);
                self.next_id += 1;
                self.tracer.trace(format_args!("allocated container {}", id));
                VisualContainer::new(id)
            }
        };
        container.bind(item, kind);
        let id = container.id();
        self.by_item.insert(item, id);
        self.live.insert(id, container);
        Ok(id)
    }

    /// Unbind a container and return it to the pool (or drop it when full).
    ///
    /// Returns the item it was bound to.
    pub fn recycle(&mut self, container: ContainerId) -> DesignerResult<ItemId> {
        let mut visual = self
            .live
            .remove(&container)
            .ok_or(DesignerError::ContainerNotBound(container))?;
        let item = visual
            .unbind()
            .ok_or(DesignerError::ContainerNotBound(container))?;
        self.by_item.remove(&item);
        if !self.pool.push(visual) {
            self.tracer
                .trace(format_args!("pool full, discarded container {}", container));
        }
        Ok(item)
    }

    /// Recycle every live container. Returns how many were unbound.
    pub fn recycle_all(&mut self) -> usize {
        let count = self.live.len();
        self.by_item.clear();
        for (_, mut visual) in self.live.drain() {
            visual.unbind();
            self.pool.push(visual);
        }
        self.tracer.debug(format_args!("recycled {} containers", count));
        count
    }

    /// Container bound to `item`, if realized.
    pub fn container_from_item(&self, item: ItemId) -> Option<ContainerId> {
        self.by_item.get(&item).copied()
    }

    /// Item bound to `container`, if any.
    pub fn item_from_container(&self, container: ContainerId) -> Option<ItemId> {
        self.live.get(&container).and_then(|c| c.item())
    }

    /// Look up a live container.
    pub fn container(&self, container: ContainerId) -> Option<&VisualContainer> {
        self.live.get(&container)
    }

    /// Container currently bound to `item`.
    pub fn container_for(&self, item: ItemId) -> Option<&VisualContainer> {
        self.container_from_item(item).and_then(|id| self.live.get(&id))
    }

    /// Live containers in no particular order.
    pub fn containers(&self) -> impl Iterator<Item = &VisualContainer> {
        self.live.values()
    }

    /// Set a container's selection flag.
    pub fn set_selected(
        &mut self,
        container: ContainerId,
        selected: bool,
    ) -> DesignerResult<Option<ContainerEvent>> {
        let visual = self
            .live
            .get_mut(&container)
            .ok_or(DesignerError::UnknownContainer(container))?;
        let item = visual
            .item()
            .ok_or(DesignerError::ContainerNotBound(container))?;
        if !visual.set_selected(selected) {
            return Ok(None);
        }
        Ok(Some(ContainerEvent::SelectionChanged {
            container,
            item,
            selected,
        }))
    }

    /// Temporarily raise (or reset with 0) a container's stacking level.
    pub fn set_elevation(&mut self, container: ContainerId, elevation: i32) -> DesignerResult<()> {
        let visual = self
            .live
            .get_mut(&container)
            .ok_or(DesignerError::UnknownContainer(container))?;
        visual.set_elevation(elevation);
        Ok(())
    }

    /// Pool of recycled containers.
    pub fn pool(&self) -> &ContainerPool {
        &self.pool
    }

    /// Number of live (bound) containers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True when no container is bound.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
