//! Distance-based light falloff

use crate::core::CullingConfig;
use crate::foundation::math::Vec3;
use crate::render::{RenderCommandBatch, ShadowMode};
use crate::scene::{Cell, SceneHost};
use super::LightCache;

/// Falloff curve from full intensity to zero between two distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIntensityModel {
    /// Lights keep their original intensity inside this distance
    pub max_intensity_distance: f32,
    /// Lights are zero at and beyond this distance
    pub disable_distance: f32,
    /// Exponent of the curve between the two distances
    pub falloff_power: f32,
}

impl LightIntensityModel {
    /// Create a model, clamping distances and exponent
    pub fn new(max_intensity_distance: f32, disable_distance: f32, falloff_power: f32) -> Self {
        let inner = max_intensity_distance.max(0.0);
        Self {
            max_intensity_distance: inner,
            disable_distance: disable_distance.max(inner),
            falloff_power: falloff_power.max(1.0),
        }
    }

    /// Model for a culling configuration
    pub fn from_config(config: &CullingConfig) -> Self {
        Self::new(
            config.light_max_intensity_distance,
            config.light_disable_distance,
            config.inner_falloff_power,
        )
    }

    /// Intensity for a light of authored intensity `max_intensity` at `distance`
    pub fn target_intensity(&self, max_intensity: f32, distance: f32) -> f32 {
        let inner = self.max_intensity_distance;
        let outer = self.disable_distance;

        if distance <= inner {
            return max_intensity;
        }
        if distance >= outer {
            return 0.0;
        }

        // t runs 0 -> 1 from inner to outer
        let t = (distance - inner) / (outer - inner);
        max_intensity * (1.0 - t.powf(self.falloff_power))
    }

    /// Drive every light of an on cell by its distance to `observer`
    pub fn apply(
        &self,
        cell: &Cell,
        host: &dyn SceneHost,
        observer: Vec3,
        lights: &mut LightCache,
        out: &mut RenderCommandBatch,
    ) {
        if !cell.is_on() {
            return;
        }

        for &light in cell.lights() {
            let Some(sample) = host.light(light) else {
                continue;
            };
            lights.ensure_cached(light, &sample);

            let max_intensity = lights.original_intensity(light, &sample);
            let distance = (sample.position - observer).norm();
            let target = self.target_intensity(max_intensity, distance);

            lights.set_intensity(light, &sample, target, out);
            if target <= 0.0 {
                lights.set_shadows(light, &sample, ShadowMode::None, out);
            }
        }
    }

    /// Zero intensity and shadows of every light of a cell
    pub fn zero_all(
        cell: &Cell,
        host: &dyn SceneHost,
        lights: &mut LightCache,
        out: &mut RenderCommandBatch,
    ) {
        for &light in cell.lights() {
            let Some(sample) = host.light(light) else {
                continue;
            };
            lights.ensure_cached(light, &sample);
            lights.set_intensity(light, &sample, 0.0, out);
            lights.set_shadows(light, &sample, ShadowMode::None, out);
        }
    }
}

impl Default for LightIntensityModel {
    fn default() -> Self {
        Self::from_config(&CullingConfig::default())
    }
}
