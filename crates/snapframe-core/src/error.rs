//! Error types for the designer core.

use crate::container::ContainerId;
use crate::item::ItemId;
use thiserror::Error;

/// Contract violations raised by the designer core.
///
/// Lookups that simply find nothing return `Option`/empty iterators instead;
/// these variants are reserved for callers breaking an invariant.
#[derive(Debug, Error)]
pub enum DesignerError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Item already in collection: {0}")]
    DuplicateItem(ItemId),
    #[error("Item {0} already has a container")]
    ContainerExists(ItemId),
    #[error("Container {0} is not bound to any item")]
    ContainerNotBound(ContainerId),
    #[error("Unknown container: {0}")]
    UnknownContainer(ContainerId),
    #[error("Selection synchronization re-entered while already in progress")]
    ReentrantSelectionSync,
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for designer operations.
pub type DesignerResult<T> = Result<T, DesignerError>;
