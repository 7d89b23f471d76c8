//! Visual containers and their recycling.
//!
//! Items stay pure data. A container is the on-screen stand-in for one item
//! while that item is materialized:
//! - `ContainerPool` keeps a bounded free list of idle containers
//! - `ContainerRegistry` binds containers to items in both directions

mod pool;
mod registry;
mod visual;

pub use pool::{ContainerPool, DEFAULT_POOL_CAPACITY};
pub use registry::{ContainerEvent, ContainerRegistry};
pub use visual::{ContainerId, VisualContainer};
