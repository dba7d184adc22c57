//! Original and applied light state
//!
//! Originals are captured the first time a light is seen and never change,
//! so zeroing a light never loses its authored intensity. Applied state is
//! the last value emitted for each light; setters only emit a command when
//! the value changes.

use std::collections::HashMap;

use crate::render::{RenderCommand, RenderCommandBatch, ShadowMode, ShadowResolution};
use crate::scene::{LightHandle, LightSample};

#[derive(Debug, Clone, Copy)]
struct OriginalLight {
    intensity: f32,
    had_shadows: bool,
}

#[derive(Debug, Clone, Copy)]
struct AppliedLight {
    intensity: f32,
    shadows: ShadowMode,
    resolution: Option<ShadowResolution>,
}

/// Per-light originals and last emitted values
#[derive(Debug, Clone, Default)]
pub struct LightCache {
    originals: HashMap<LightHandle, OriginalLight>,
    applied: HashMap<LightHandle, AppliedLight>,
}

impl LightCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Record originals and applied state from `sample` if `light` is new
    pub fn ensure_cached(&mut self, light: LightHandle, sample: &LightSample) {
        self.originals.entry(light).or_insert(OriginalLight {
            intensity: sample.intensity,
            had_shadows: sample.shadows.casts(),
        });
        self.applied.entry(light).or_insert(AppliedLight {
            intensity: sample.intensity,
            shadows: sample.shadows,
            resolution: None,
        });
    }

    /// Whether `light` has been seen
    pub fn contains(&self, light: LightHandle) -> bool {
        self.originals.contains_key(&light)
    }

    /// Authored intensity, or the sample's if the light was never cached
    pub fn original_intensity(&self, light: LightHandle, sample: &LightSample) -> f32 {
        self.originals
            .get(&light)
            .map_or(sample.intensity, |original| original.intensity)
    }

    /// Whether the light cast shadows when first seen
    pub fn had_original_shadows(&self, light: LightHandle, sample: &LightSample) -> bool {
        self.originals
            .get(&light)
            .map_or(sample.shadows.casts(), |original| original.had_shadows)
    }

    /// Last emitted intensity, or the sample's
    pub fn current_intensity(&self, light: LightHandle, sample: &LightSample) -> f32 {
        self.applied
            .get(&light)
            .map_or(sample.intensity, |applied| applied.intensity)
    }

    /// Last emitted shadow mode, or the sample's
    pub fn current_shadows(&self, light: LightHandle, sample: &LightSample) -> ShadowMode {
        self.applied
            .get(&light)
            .map_or(sample.shadows, |applied| applied.shadows)
    }

    /// Emit a new intensity if it differs from the last one
    #[allow(clippy::float_cmp)]
    pub fn set_intensity(
        &mut self,
        light: LightHandle,
        sample: &LightSample,
        intensity: f32,
        out: &mut RenderCommandBatch,
    ) {
        let applied = self.applied_mut(light, sample);
        if applied.intensity != intensity {
            applied.intensity = intensity;
            out.push(RenderCommand::SetLightIntensity { light, intensity });
        }
    }

    /// Emit a new shadow mode if it differs from the last one
    pub fn set_shadows(
        &mut self,
        light: LightHandle,
        sample: &LightSample,
        mode: ShadowMode,
        out: &mut RenderCommandBatch,
    ) {
        let applied = self.applied_mut(light, sample);
        if applied.shadows != mode {
            applied.shadows = mode;
            out.push(RenderCommand::SetLightShadows { light, mode });
        }
    }

    /// Emit a new shadow resolution if it differs from the last one
    pub fn set_resolution(
        &mut self,
        light: LightHandle,
        sample: &LightSample,
        resolution: ShadowResolution,
        out: &mut RenderCommandBatch,
    ) {
        let applied = self.applied_mut(light, sample);
        if applied.resolution != Some(resolution) {
            applied.resolution = Some(resolution);
            out.push(RenderCommand::SetShadowResolution { light, resolution });
        }
    }

    /// Drop applied state so the next setters re-emit from fresh samples.
    /// Originals are kept.
    pub fn forget_applied(&mut self) {
        self.applied.clear();
    }

    fn applied_mut(&mut self, light: LightHandle, sample: &LightSample) -> &mut AppliedLight {
        self.ensure_cached(light, sample);
        self.applied.entry(light).or_insert(AppliedLight {
            intensity: sample.intensity,
            shadows: sample.shadows,
            resolution: None,
        })
    }
}
