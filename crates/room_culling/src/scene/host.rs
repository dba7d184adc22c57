//! Interface to the host scene hierarchy
//!
//! Following the pluggable scene graph pattern: the engines only need a
//! handful of queries, so any hierarchy (an ECS world, an editor scene, a
//! test fixture) can drive them by implementing [`SceneHost`].

use crate::foundation::math::{Vec3, AABB};
use crate::render::ShadowMode;
use super::{LightHandle, NodeHandle, RenderableHandle};

/// Current state of a host light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// World-space position
    pub position: Vec3,
    /// Current intensity
    pub intensity: f32,
    /// Current shadow mode
    pub shadows: ShadowMode,
}

/// Read-only view of the host hierarchy
///
/// Lookups return `None` (or an empty list) for handles that no longer
/// resolve; callers skip those silently.
pub trait SceneHost {
    /// Direct children of `node`, in hierarchy order
    fn children(&self, node: NodeHandle, include_inactive: bool) -> Vec<NodeHandle>;

    /// World-space position of a node
    fn node_position(&self, node: NodeHandle) -> Option<Vec3>;

    /// Renderables on `node` and all of its descendants
    fn renderables_under(&self, node: NodeHandle, include_inactive: bool) -> Vec<RenderableHandle>;

    /// Lights on `node` and all of its descendants
    fn lights_under(&self, node: NodeHandle, include_inactive: bool) -> Vec<LightHandle>;

    /// World-space bounds of a renderable
    fn renderable_bounds(&self, renderable: RenderableHandle) -> Option<AABB>;

    /// Current state of a light
    fn light(&self, light: LightHandle) -> Option<LightSample>;

    /// Proxy volume (e.g. a box collider) standing in for a room without renderables
    fn proxy_bounds(&self, _node: NodeHandle, _include_inactive: bool) -> Option<AABB> {
        None
    }

    /// Channel bitmask currently set on a renderable
    fn renderable_channel_mask(&self, _renderable: RenderableHandle) -> Option<u32> {
        None
    }

    /// Whether a renderable handle still resolves
    fn renderable_exists(&self, renderable: RenderableHandle) -> bool {
        self.renderable_bounds(renderable).is_some()
    }
}
