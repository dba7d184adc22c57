//! Spatial conflict graph between rooms
//!
//! Two rooms conflict when the gap between their bounding boxes is strictly
//! smaller than `min_separation`. They are proximate when the gap is below
//! `min_separation * proximity_factor`; proximity is disabled entirely when
//! `min_separation` is zero.

use crate::foundation::math::AABB;

/// Symmetric adjacency over room indices
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    bounds: Vec<AABB>,
    neighbors: Vec<Vec<usize>>,
    proximity_threshold: Option<f32>,
}

impl ConflictGraph {
    /// Build the graph for rooms with the given bounds
    pub fn build(bounds: Vec<AABB>, min_separation: f32, proximity_factor: f32) -> Self {
        let min_separation = min_separation.max(0.0);
        let count = bounds.len();
        let mut neighbors = vec![Vec::new(); count];

        for a in 0..count {
            for b in (a + 1)..count {
                if bounds[a].distance_to_aabb(&bounds[b]) < min_separation {
                    neighbors[a].push(b);
                    neighbors[b].push(a);
                }
            }
        }

        let proximity_threshold =
            (min_separation > 0.0).then(|| min_separation * proximity_factor.max(0.0));

        Self { bounds, neighbors, proximity_threshold }
    }

    /// Number of rooms
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the graph has no rooms
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Bounds of a room
    pub fn bounds(&self, index: usize) -> Option<&AABB> {
        self.bounds.get(index)
    }

    /// Number of conflicting rooms
    pub fn degree(&self, index: usize) -> usize {
        self.neighbors.get(index).map_or(0, Vec::len)
    }

    /// Conflicting rooms, in index order
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether two rooms conflict
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Whether two distinct rooms are within the proximity threshold
    pub fn is_proximate(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        match (self.proximity_threshold, self.bounds.get(a), self.bounds.get(b)) {
            (Some(threshold), Some(first), Some(second)) => first.distance_to_aabb(second) < threshold,
            _ => false,
        }
    }

    /// All room indices, most conflicted first (ties keep index order)
    pub fn order_by_degree(&self) -> Vec<usize> {
        self.order_by_degree_among(&(0..self.len()).collect::<Vec<_>>())
    }

    /// `indices` reordered most conflicted first (ties keep their order)
    pub fn order_by_degree_among(&self, indices: &[usize]) -> Vec<usize> {
        let mut order = indices.to_vec();
        order.sort_by_key(|index| std::cmp::Reverse(self.degree(*index)));
        order
    }
}
