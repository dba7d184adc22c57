//! In-memory scene host
//!
//! Simple list-based hierarchy (no spatial optimization). Used by the
//! walkthrough demo and the test suites, and sufficient for hosts that
//! mirror their scene into plain data each frame.

use std::collections::HashSet;

use crate::foundation::math::{Vec3, AABB};
use crate::render::{RenderCommand, RenderCommandBatch, ShadowMode, ShadowResolution};
use super::{LightHandle, LightSample, NodeHandle, RenderableHandle, SceneHost};

#[derive(Debug, Clone)]
struct NodeRecord {
    children: Vec<NodeHandle>,
    position: Vec3,
    active: bool,
    proxy: Option<AABB>,
}

#[derive(Debug, Clone)]
struct RenderableRecord {
    node: NodeHandle,
    bounds: AABB,
    visible: bool,
    channel_mask: u32,
}

#[derive(Debug, Clone)]
struct LightRecord {
    node: NodeHandle,
    position: Vec3,
    intensity: f32,
    shadows: ShadowMode,
    resolution: ShadowResolution,
    channel_mask: u32,
}

/// Hierarchy of nodes, renderables and lights stored in flat lists
///
/// Handle values are list indices. Removed objects leave a hole so stale
/// handles keep failing to resolve instead of aliasing new objects.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: Vec<Option<NodeRecord>>,
    renderables: Vec<Option<RenderableRecord>>,
    lights: Vec<Option<LightRecord>>,
}

impl MemoryScene {
    /// Create a scene containing only a root node at the origin
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(NodeRecord {
                children: Vec::new(),
                position: Vec3::zeros(),
                active: true,
                proxy: None,
            })],
            renderables: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// The root node
    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    /// Add a node under `parent`. Returns `None` if the parent does not exist.
    pub fn add_node(&mut self, parent: NodeHandle, position: Vec3) -> Option<NodeHandle> {
        let handle = NodeHandle(self.nodes.len() as u64);
        self.node_mut(parent)?.children.push(handle);
        self.nodes.push(Some(NodeRecord {
            children: Vec::new(),
            position,
            active: true,
            proxy: None,
        }));
        Some(handle)
    }

    /// Add a renderable to `node`
    pub fn add_renderable(&mut self, node: NodeHandle, bounds: AABB) -> Option<RenderableHandle> {
        self.node(node)?;
        let handle = RenderableHandle(self.renderables.len() as u64);
        self.renderables.push(Some(RenderableRecord {
            node,
            bounds,
            visible: true,
            channel_mask: 0,
        }));
        Some(handle)
    }

    /// Add a light to `node`
    pub fn add_light(
        &mut self,
        node: NodeHandle,
        position: Vec3,
        intensity: f32,
        shadows: ShadowMode,
    ) -> Option<LightHandle> {
        self.node(node)?;
        let handle = LightHandle(self.lights.len() as u64);
        self.lights.push(Some(LightRecord {
            node,
            position,
            intensity,
            shadows,
            resolution: ShadowResolution::Medium,
            channel_mask: 0,
        }));
        Some(handle)
    }

    /// Give a node a proxy volume
    pub fn set_proxy_bounds(&mut self, node: NodeHandle, bounds: AABB) {
        if let Some(record) = self.node_mut(node) {
            record.proxy = Some(bounds);
        }
    }

    /// Activate or deactivate a node (and, implicitly, its subtree)
    pub fn set_node_active(&mut self, node: NodeHandle, active: bool) {
        if let Some(record) = self.node_mut(node) {
            record.active = active;
        }
    }

    /// Move a light
    pub fn set_light_position(&mut self, light: LightHandle, position: Vec3) {
        if let Some(record) = self.light_mut(light) {
            record.position = position;
        }
    }

    /// Overwrite a renderable's channel mask, as an editor would
    pub fn set_renderable_channel_mask(&mut self, renderable: RenderableHandle, mask: u32) {
        if let Some(record) = self.renderable_mut(renderable) {
            record.channel_mask = mask;
        }
    }

    /// Destroy a light; its handle stops resolving
    pub fn remove_light(&mut self, light: LightHandle) {
        if let Some(slot) = self.lights.get_mut(light.0 as usize) {
            *slot = None;
        }
    }

    /// Destroy a renderable; its handle stops resolving
    pub fn remove_renderable(&mut self, renderable: RenderableHandle) {
        if let Some(slot) = self.renderables.get_mut(renderable.0 as usize) {
            *slot = None;
        }
    }

    /// Whether a renderable is currently shown
    pub fn renderable_visible(&self, renderable: RenderableHandle) -> Option<bool> {
        self.renderable(renderable).map(|r| r.visible)
    }

    /// Current channel mask of a renderable
    pub fn renderable_channel(&self, renderable: RenderableHandle) -> Option<u32> {
        self.renderable(renderable).map(|r| r.channel_mask)
    }

    /// Current intensity of a light
    pub fn light_intensity(&self, light: LightHandle) -> Option<f32> {
        self.light_record(light).map(|l| l.intensity)
    }

    /// Current shadow mode of a light
    pub fn light_shadows(&self, light: LightHandle) -> Option<ShadowMode> {
        self.light_record(light).map(|l| l.shadows)
    }

    /// Current shadow resolution of a light
    pub fn light_resolution(&self, light: LightHandle) -> Option<ShadowResolution> {
        self.light_record(light).map(|l| l.resolution)
    }

    /// Current channel mask of a light
    pub fn light_channel(&self, light: LightHandle) -> Option<u32> {
        self.light_record(light).map(|l| l.channel_mask)
    }

    /// Apply a command batch. Commands for destroyed objects are ignored.
    pub fn apply(&mut self, batch: &RenderCommandBatch) {
        for command in batch {
            match *command {
                RenderCommand::SetRenderableVisible { renderable, visible } => {
                    if let Some(r) = self.renderable_mut(renderable) {
                        r.visible = visible;
                    }
                }
                RenderCommand::SetLightIntensity { light, intensity } => {
                    if let Some(l) = self.light_mut(light) {
                        l.intensity = intensity;
                    }
                }
                RenderCommand::SetLightShadows { light, mode } => {
                    if let Some(l) = self.light_mut(light) {
                        l.shadows = mode;
                    }
                }
                RenderCommand::SetShadowResolution { light, resolution } => {
                    if let Some(l) = self.light_mut(light) {
                        l.resolution = resolution;
                    }
                }
                RenderCommand::SetRenderableChannel { renderable, mask } => {
                    if let Some(r) = self.renderable_mut(renderable) {
                        r.channel_mask = mask;
                    }
                }
                RenderCommand::SetLightChannel { light, mask } => {
                    if let Some(l) = self.light_mut(light) {
                        l.channel_mask = mask;
                    }
                }
            }
        }
    }

    fn node(&self, node: NodeHandle) -> Option<&NodeRecord> {
        self.nodes.get(node.0 as usize)?.as_ref()
    }

    fn node_mut(&mut self, node: NodeHandle) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(node.0 as usize)?.as_mut()
    }

    fn renderable(&self, renderable: RenderableHandle) -> Option<&RenderableRecord> {
        self.renderables.get(renderable.0 as usize)?.as_ref()
    }

    fn renderable_mut(&mut self, renderable: RenderableHandle) -> Option<&mut RenderableRecord> {
        self.renderables.get_mut(renderable.0 as usize)?.as_mut()
    }

    fn light_record(&self, light: LightHandle) -> Option<&LightRecord> {
        self.lights.get(light.0 as usize)?.as_ref()
    }

    fn light_mut(&mut self, light: LightHandle) -> Option<&mut LightRecord> {
        self.lights.get_mut(light.0 as usize)?.as_mut()
    }

    /// `node` and every descendant reachable through active nodes
    fn subtree(&self, node: NodeHandle, include_inactive: bool) -> HashSet<NodeHandle> {
        let mut visited = HashSet::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            let Some(record) = self.node(current) else {
                continue;
            };
            if !include_inactive && !record.active {
                continue;
            }
            if visited.insert(current) {
                stack.extend(record.children.iter().copied());
            }
        }

        visited
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for MemoryScene {
    fn children(&self, node: NodeHandle, include_inactive: bool) -> Vec<NodeHandle> {
        self.node(node)
            .map(|record| {
                record
                    .children
                    .iter()
                    .copied()
                    .filter(|child| {
                        self.node(*child)
                            .is_some_and(|c| include_inactive || c.active)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn node_position(&self, node: NodeHandle) -> Option<Vec3> {
        self.node(node).map(|record| record.position)
    }

    fn renderables_under(&self, node: NodeHandle, include_inactive: bool) -> Vec<RenderableHandle> {
        let nodes = self.subtree(node, include_inactive);
        self.renderables
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let record = slot.as_ref()?;
                nodes
                    .contains(&record.node)
                    .then_some(RenderableHandle(index as u64))
            })
            .collect()
    }

    fn lights_under(&self, node: NodeHandle, include_inactive: bool) -> Vec<LightHandle> {
        let nodes = self.subtree(node, include_inactive);
        self.lights
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let record = slot.as_ref()?;
                nodes.contains(&record.node).then_some(LightHandle(index as u64))
            })
            .collect()
    }

    fn renderable_bounds(&self, renderable: RenderableHandle) -> Option<AABB> {
        self.renderable(renderable).map(|r| r.bounds)
    }

    fn light(&self, light: LightHandle) -> Option<LightSample> {
        self.light_record(light).map(|l| LightSample {
            position: l.position,
            intensity: l.intensity,
            shadows: l.shadows,
        })
    }

    fn proxy_bounds(&self, node: NodeHandle, include_inactive: bool) -> Option<AABB> {
        let nodes = self.subtree(node, include_inactive);
        let mut ordered: Vec<_> = nodes.into_iter().collect();
        ordered.sort();
        ordered
            .into_iter()
            .find_map(|n| self.node(n).and_then(|record| record.proxy))
    }

    fn renderable_channel_mask(&self, renderable: RenderableHandle) -> Option<u32> {
        self.renderable_channel(renderable)
    }
}
