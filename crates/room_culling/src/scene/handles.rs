//! Opaque handles into the host's scene
//!
//! The host issues these; the crate only stores and compares them. A handle
//! may outlive the object it names, so every lookup goes through
//! [`SceneHost`](super::SceneHost) and can fail.

use serde::{Deserialize, Serialize};

/// A node of the host hierarchy (rooms are the children of a root node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// A renderable surface owned by a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderableHandle(pub u64);

/// A light source owned by a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightHandle(pub u64);
