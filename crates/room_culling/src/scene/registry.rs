//! Ordered room collection
//!
//! Cells live in a slot map so engines can hold [`CellId`]s, while `order`
//! keeps the host's child order for time-slicing and graph indexing.

use crate::foundation::collections::SlotMap;
use crate::foundation::math::{union_all, Vec3, AABB};
use super::{Cell, CellId, NodeHandle, SceneHost};

/// Edge length of the box placed at the anchor of a room with no geometry
pub const ANCHOR_BOUNDS_SIZE: f32 = 0.01;

/// Collects and indexes rooms; computes and refreshes their geometry
#[derive(Debug, Default)]
pub struct CellRegistry {
    cells: SlotMap<CellId, Cell>,
    order: Vec<CellId>,
    include_inactive: bool,
}

impl CellRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and rebuild from the children of `root`
    pub fn rebuild(&mut self, host: &dyn SceneHost, root: NodeHandle, include_inactive: bool) {
        self.cells.clear();
        self.order.clear();
        self.include_inactive = include_inactive;

        for node in host.children(root, include_inactive) {
            let renderables = host.renderables_under(node, include_inactive);
            let lights = host.lights_under(node, include_inactive);
            let id = self
                .cells
                .insert_with_key(|id| Cell::new(id, node, renderables, lights));
            self.order.push(id);
        }

        self.refresh_centers(host);
        log::debug!("CellRegistry: rebuilt {} cells under {:?}", self.order.len(), root);
    }

    /// Recompute center and bounds of every cell
    ///
    /// Bounds are the union of live renderable bounds, falling back to the
    /// node's proxy volume and finally to a tiny box at the anchor. The
    /// center is the renderable bounds center, otherwise the anchor position.
    pub fn refresh_centers(&mut self, host: &dyn SceneHost) {
        let include_inactive = self.include_inactive;
        for cell in self.cells.values_mut() {
            let anchor_position = host.node_position(cell.anchor()).unwrap_or_else(Vec3::zeros);
            let renderable_bounds: Vec<AABB> = cell
                .renderables()
                .iter()
                .filter_map(|r| host.renderable_bounds(*r))
                .collect();

            match union_all(&renderable_bounds) {
                Some(bounds) => cell.set_geometry(bounds.center(), bounds, true),
                None => {
                    let bounds = host
                        .proxy_bounds(cell.anchor(), include_inactive)
                        .unwrap_or_else(|| AABB::around_point(anchor_position, ANCHOR_BOUNDS_SIZE));
                    cell.set_geometry(anchor_position, bounds, false);
                }
            }
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry has no cells
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up a cell
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Look up a cell mutably
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id)
    }

    /// Key of the cell at a position in host order
    pub fn id_at(&self, index: usize) -> Option<CellId> {
        self.order.get(index).copied()
    }

    /// Keys in host order
    pub fn ids(&self) -> &[CellId] {
        &self.order
    }

    /// Cells in host order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.order.iter().filter_map(move |id| self.cells.get(*id))
    }

    /// Visit every cell mutably, in host order
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Cell)) {
        for id in &self.order {
            if let Some(cell) = self.cells.get_mut(*id) {
                f(cell);
            }
        }
    }
}
