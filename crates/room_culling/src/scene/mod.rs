//! # Scene Module
//!
//! The host-facing side of the crate: opaque handles, the [`SceneHost`]
//! query trait, and the room registry built from it.
//!
//! ## Organization
//!
//! - **Handles**: node, renderable and light handles issued by the host
//! - **Host**: the trait engines query, plus an in-memory implementation
//! - **Cells**: one record per room and the registry that owns them

pub mod cell;
pub mod handles;
pub mod host;
pub mod memory;
pub mod registry;

pub use cell::{Cell, CellId, CellState};
pub use handles::{LightHandle, NodeHandle, RenderableHandle};
pub use host::{LightSample, SceneHost};
pub use memory::MemoryScene;
pub use registry::CellRegistry;
