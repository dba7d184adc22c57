//! Math utilities and types
//!
//! Provides the vector type and axis-aligned bounding boxes used for
//! room distance checks and spatial conflict tests.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create a cube of edge length `size` around a point
    pub fn around_point(point: Vec3, size: f32) -> Self {
        let half = size.max(0.0) * 0.5;
        Self::from_center_extents(point, Vec3::new(half, half, half))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow this box so it also covers `other`
    pub fn encapsulate(&mut self, other: &AABB) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Smallest box covering both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        let mut merged = *self;
        merged.encapsulate(other);
        merged
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Point on or inside the box nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Euclidean distance from a point to the box (0 when inside)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        (self.closest_point(point) - point).magnitude()
    }

    /// Euclidean gap between two boxes (0 when they touch or overlap)
    pub fn distance_to_aabb(&self, other: &AABB) -> f32 {
        let dx = (self.min.x - other.max.x).max(other.min.x - self.max.x).max(0.0);
        let dy = (self.min.y - other.max.y).max(other.min.y - self.max.y).max(0.0);
        let dz = (self.min.z - other.max.z).max(other.min.z - self.max.z).max(0.0);
        dx.mul_add(dx, dy.mul_add(dy, dz * dz)).sqrt()
    }
}

/// Merge an iterator of boxes, `None` when it is empty
pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a AABB>) -> Option<AABB> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(*b),
        Some(merged) => Some(merged.union(b)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_distance_to_point() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));

        assert_eq!(aabb.distance_to_point(Vec3::new(1.0, 1.0, 1.0)), 0.0);
        assert_relative_eq!(aabb.distance_to_point(Vec3::new(5.0, 1.0, 1.0)), 3.0);
        assert_relative_eq!(aabb.distance_to_point(Vec3::new(5.0, 6.0, 1.0)), 5.0);
    }

    #[test]
    fn test_distance_between_boxes() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        let overlapping = AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(2.0, 2.0, 2.0));

        assert_relative_eq!(a.distance_to_aabb(&b), 2.0);
        assert_relative_eq!(b.distance_to_aabb(&a), 2.0);
        assert_eq!(a.distance_to_aabb(&overlapping), 0.0);
    }

    #[test]
    fn test_union_all() {
        let boxes = [
            AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)),
            AABB::new(Vec3::new(-2.0, 0.5, 0.0), Vec3::new(0.0, 3.0, 0.5)),
        ];

        let merged = union_all(&boxes).unwrap();
        assert_eq!(merged.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(merged.max, Vec3::new(1.0, 3.0, 1.0));
        assert!(union_all(&[] as &[AABB]).is_none());
    }
}
