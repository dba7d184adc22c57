//! Room records
//!
//! A cell is one child of the rooms root: the renderables and lights found
//! under it plus the cached geometry used for distance checks.

use crate::foundation::collections::new_key_type;
use crate::foundation::math::{Vec3, AABB};
use crate::render::{RenderCommand, RenderCommandBatch};
use super::{LightHandle, NodeHandle, RenderableHandle, SceneHost};

new_key_type! {
    /// Stable arena key of a cell inside a [`CellRegistry`](super::CellRegistry)
    pub struct CellId;
}

/// Visibility state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Renderables hidden, lights zeroed
    #[default]
    Off,
    /// Renderables shown, lights driven by distance
    On,
}

/// One room
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    anchor: NodeHandle,
    renderables: Vec<RenderableHandle>,
    lights: Vec<LightHandle>,
    center: Vec3,
    bounds: AABB,
    has_renderable_bounds: bool,
    state: CellState,
}

impl Cell {
    pub(crate) fn new(
        id: CellId,
        anchor: NodeHandle,
        renderables: Vec<RenderableHandle>,
        lights: Vec<LightHandle>,
    ) -> Self {
        Self {
            id,
            anchor,
            renderables,
            lights,
            center: Vec3::zeros(),
            bounds: AABB::around_point(Vec3::zeros(), 0.0),
            has_renderable_bounds: false,
            state: CellState::Off,
        }
    }

    /// Arena key
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Host node the cell was built from
    pub fn anchor(&self) -> NodeHandle {
        self.anchor
    }

    /// Renderables collected at rebuild time
    pub fn renderables(&self) -> &[RenderableHandle] {
        &self.renderables
    }

    /// Lights collected at rebuild time
    pub fn lights(&self) -> &[LightHandle] {
        &self.lights
    }

    /// Whether the cell owns any renderable
    pub fn has_renderables(&self) -> bool {
        !self.renderables.is_empty()
    }

    /// Cached center used for visibility distance checks
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Cached bounding volume used for conflict checks
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Whether the bounds came from live renderables (not a proxy or the anchor)
    pub fn has_renderable_bounds(&self) -> bool {
        self.has_renderable_bounds
    }

    /// Current visibility state
    pub fn state(&self) -> CellState {
        self.state
    }

    /// Whether the cell is on
    pub fn is_on(&self) -> bool {
        self.state == CellState::On
    }

    pub(crate) fn set_geometry(&mut self, center: Vec3, bounds: AABB, from_renderables: bool) {
        self.center = center;
        self.bounds = bounds;
        self.has_renderable_bounds = from_renderables;
    }

    pub(crate) fn set_state(&mut self, state: CellState) {
        self.state = state;
    }

    /// Show or hide every live renderable of the cell and record the new state
    pub(crate) fn set_enabled(&mut self, enabled: bool, host: &dyn SceneHost, out: &mut RenderCommandBatch) {
        for &renderable in &self.renderables {
            if host.renderable_exists(renderable) {
                out.push(RenderCommand::SetRenderableVisible { renderable, visible: enabled });
            }
        }
        self.state = if enabled { CellState::On } else { CellState::Off };
    }
}
