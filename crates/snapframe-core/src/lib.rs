//! Snapframe Core Library
//!
//! Canvas item model, viewport virtualization, selection and gesture
//! handling for the Snapframe photo-strip template designer. Rendering and
//! persistence live with the host; this crate decides what exists, where it
//! is, what is selected and which items need a visual container.

pub mod camera;
pub mod collection;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod input;
pub mod item;
pub mod notify;
pub mod rubberband;
pub mod selection;
pub mod spatial_index;
pub mod surface;
pub mod template;
pub mod viewport;

pub use camera::Camera;
pub use collection::{CollectionChange, ItemCollection, QueryMode};
pub use config::DesignerConfig;
pub use container::{ContainerEvent, ContainerId, ContainerPool, ContainerRegistry, VisualContainer};
pub use diagnostics::Tracer;
pub use dispatch::{IdleQueue, IdleTask};
pub use error::{DesignerError, DesignerResult};
pub use gesture::{GestureCommand, GestureController, GestureState, TransactionEvent, TransactionKind};
pub use input::{ManipulationDelta, Modifiers, PointerEvent, PointerId, PointerKind, PointerPhase};
pub use item::{Geometry, ItemId, ItemKind, SpatialItem};
pub use notify::SubscriptionId;
pub use rubberband::RubberbandSelector;
pub use selection::{CombineMode, SelectionDelta, SelectionSet, SelectionSync};
pub use surface::{DesignSurface, SelectionChanged};
pub use template::ItemTemplate;
pub use viewport::{ViewportManager, ViewportUpdate, ZOOM_STOPS};
