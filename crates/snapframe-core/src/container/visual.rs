//! The container type itself.

use crate::item::{ItemId, ItemKind};
use std::fmt;

/// Identifier of a visual container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// On-screen representation bound to at most one item.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualContainer {
    id: ContainerId,
    item: Option<ItemId>,
    /// Visual template applied for the bound item's kind.
    template: Option<ItemKind>,
    is_selected: bool,
    /// Temporary stacking boost above the item's natural position.
    elevation: i32,
    /// Incremented on every bind.
    generation: u32,
}

impl VisualContainer {
    pub(crate) fn new(id: ContainerId) -> Self {
        Self {
            id,
            item: None,
            template: None,
            is_selected: false,
            elevation: 0,
            generation: 0,
        }
    }

    /// Stable container id.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Item currently bound, if any.
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// Item kind the container was last prepared for.
    pub fn template(&self) -> Option<ItemKind> {
        self.template
    }

    /// Whether the container shows the selection state.
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Current elevation (z boost).
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Bumped every time the container is rebound.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether an item is currently bound.
    pub fn is_bound(&self) -> bool {
        self.item.is_some()
    }

    pub(crate) fn bind(&mut self, item: ItemId, kind: ItemKind) {
        self.item = Some(item);
        self.template = Some(kind);
        self.is_selected = false;
        self.elevation = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop every piece of item-specific state.
    pub(crate) fn unbind(&mut self) -> Option<ItemId> {
        self.template = None;
        self.is_selected = false;
        self.elevation = 0;
        self.item.take()
    }

    /// Returns true if the flag changed.
    pub(crate) fn set_selected(&mut self, selected: bool) -> bool {
        let changed = self.is_selected != selected;
        self.is_selected = selected;
        changed
    }

    pub(crate) fn set_elevation(&mut self, elevation: i32) {
        self.elevation = elevation;
    }
}
