//! Bounded free list of idle containers.

use super::visual::VisualContainer;

/// Default number of idle containers kept for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Free list of unbound containers. Never holds more than `capacity`.
#[derive(Debug, Clone)]
pub struct ContainerPool {
    free: Vec<VisualContainer>,
    capacity: usize,
    discarded: usize,
}

impl Default for ContainerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl ContainerPool {
    /// Pool keeping at most `capacity` idle containers.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity.min(DEFAULT_POOL_CAPACITY)),
            capacity,
            discarded: 0,
        }
    }

    /// Take an idle container, most recently returned first.
    pub fn pop(&mut self) -> Option<VisualContainer> {
        self.free.pop()
    }

    /// Return an unbound container. Returns false when the pool is full and
    /// the container was dropped instead.
    pub fn push(&mut self, container: VisualContainer) -> bool {
        debug_assert!(!container.is_bound(), "pooled containers must be unbound");
        if self.free.len() >= self.capacity {
            self.discarded += 1;
            return false;
        }
        self.free.push(container);
        true
    }

    /// Idle containers currently held.
    pub fn idle(&self) -> impl Iterator<Item = &VisualContainer> {
        self.free.iter()
    }

    /// Idle containers waiting for reuse.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// True when no idle container is available.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Upper bound on idle containers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Containers dropped because the pool was full.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}
