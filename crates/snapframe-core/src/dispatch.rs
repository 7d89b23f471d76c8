//! Idle-tick task queue.
//!
//! Stands in for "run this once the message loop is otherwise idle": work is
//! posted during a gesture and drained by the host at the end of the tick.

use crate::item::ItemId;
use std::collections::VecDeque;

/// Work deferred to the next idle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTask {
    /// Raise the coalesced selection-changed notification.
    RaiseSelectionChanged,
    /// Drop the temporary stacking elevation of an item's container.
    RevertElevation(ItemId),
}

/// FIFO of pending idle tasks. Posting a task that is already queued is a no-op.
#[derive(Debug, Clone, Default)]
pub struct IdleQueue {
    tasks: VecDeque<IdleTask>,
}

impl IdleQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task. Returns false if an identical task was already pending.
    pub fn post(&mut self, task: IdleTask) -> bool {
        if self.tasks.contains(&task) {
            return false;
        }
        self.tasks.push_back(task);
        true
    }

    /// Take every pending task, oldest first.
    pub fn drain(&mut self) -> Vec<IdleTask> {
        self.tasks.drain(..).collect()
    }

    /// Whether `task` is already queued.
    pub fn is_pending(&self, task: IdleTask) -> bool {
        self.tasks.contains(&task)
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
