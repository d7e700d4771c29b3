//! Floor Plan Core Library
//!
//! Data structures and logic for the restaurant floor plan designer: the element
//! model, the layout store, pointer-driven dragging, a render snapshot, and the
//! repositories plans are persisted through.

pub mod config;
pub mod drag;
pub mod element;
pub mod factory;
pub mod layout;
pub mod panel;
pub mod render;
pub mod repository;
pub mod store;
pub mod viewport;

pub use config::EditorConfig;
pub use drag::{DragController, DragSession, PointerEvent};
pub use element::{Element, ElementId, ElementKind, ElementPatch, ElementType};
pub use factory::ElementFactory;
pub use layout::{DEFAULT_CANVAS, Layout};
pub use panel::{EditorError, FloorPlanPanel, PlanForm};
pub use render::{Scene, SceneItem, scene};
pub use repository::{FloorPlan, FloorPlanRepository, MemoryRepository, RepositoryError};
pub use store::{LayoutStore, Snapshot, SubscriptionId};
pub use viewport::Viewport;
