//! Global shadow budget
//!
//! Every tick the lights of all on rooms are re-ranked by distance to the
//! observer and only the nearest `count` keep their shadows. Enter and exit
//! distances differ so a light sitting on a threshold does not toggle.

use crate::core::CullingConfig;
use crate::foundation::math::Vec3;
use crate::render::{RenderCommandBatch, ShadowMode, ShadowResolution};
use crate::scene::{Cell, LightHandle, LightSample, SceneHost};
use super::LightCache;

/// Extra distance a soft light may drift past `soft_enter` before turning hard
pub const SOFT_EXIT_MARGIN: f32 = 1.0;

/// Extra distance a shadowed light may drift past `max_enter` before losing shadows
pub const MAX_EXIT_MARGIN: f32 = 2.0;

/// Derived shadow thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowBudget {
    /// Soft shadows at or inside this distance
    pub soft_enter: f32,
    /// Soft lights stay soft up to this distance
    pub soft_exit: f32,
    /// Hard shadows at or inside this distance
    pub max_enter: f32,
    /// Shadowed lights keep competing up to this distance
    pub max_exit: f32,
    /// Number of lights allowed to cast shadows
    pub count: usize,
    /// Drop selected lights to low resolution
    pub force_low_resolution: bool,
}

impl ShadowBudget {
    /// Thresholds for a culling configuration
    pub fn from_config(config: &CullingConfig) -> Self {
        let soft_enter = config.soft_shadow_distance.max(0.0);
        let max_enter = soft_enter.max(config.max_shadow_distance);
        Self {
            soft_enter,
            soft_exit: soft_enter + SOFT_EXIT_MARGIN,
            max_enter,
            max_exit: max_enter + MAX_EXIT_MARGIN,
            count: config.shadows_count,
            force_low_resolution: config.force_low_shadow_resolution,
        }
    }

    /// Mode a light at `distance` competes with, given its current mode
    ///
    /// Returns `None` when the light must not cast shadows at all.
    pub fn desired_mode(&self, distance: f32, current: ShadowMode) -> Option<ShadowMode> {
        if distance > self.max_exit {
            return None;
        }
        if distance <= self.soft_enter {
            return Some(ShadowMode::Soft);
        }
        let keeps_soft = current == ShadowMode::Soft && distance <= self.soft_exit;
        if distance <= self.max_enter {
            return Some(if keeps_soft { ShadowMode::Soft } else { ShadowMode::Hard });
        }

        // Exit band: only lights already casting keep competing
        if current.casts() {
            Some(if keeps_soft { ShadowMode::Soft } else { ShadowMode::Hard })
        } else {
            None
        }
    }
}

impl Default for ShadowBudget {
    fn default() -> Self {
        Self::from_config(&CullingConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    light: LightHandle,
    sample: LightSample,
    distance: f32,
    mode: ShadowMode,
}

/// Ranks shadow candidates across rooms and enforces the budget
#[derive(Debug, Default)]
pub struct ShadowBudgetSelector {
    candidates: Vec<Candidate>,
}

impl ShadowBudgetSelector {
    /// Create a selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign shadow modes to the lights of `cells_on`
    ///
    /// Only lights that originally cast shadows are considered. Intensity is
    /// read from the applied state so the falloff pass of the same tick is
    /// taken into account.
    pub fn apply(
        &mut self,
        cells_on: &[&Cell],
        host: &dyn SceneHost,
        observer: Vec3,
        budget: &ShadowBudget,
        lights: &mut LightCache,
        out: &mut RenderCommandBatch,
    ) {
        self.candidates.clear();

        for cell in cells_on.iter().filter(|cell| cell.is_on()) {
            for &light in cell.lights() {
                let Some(sample) = host.light(light) else {
                    continue;
                };
                lights.ensure_cached(light, &sample);
                if !lights.had_original_shadows(light, &sample) {
                    continue;
                }

                if lights.current_intensity(light, &sample) <= 0.0 {
                    lights.set_shadows(light, &sample, ShadowMode::None, out);
                    continue;
                }

                let distance = (sample.position - observer).norm();
                let current = lights.current_shadows(light, &sample);
                match budget.desired_mode(distance, current) {
                    Some(mode) => self.candidates.push(Candidate { light, sample, distance, mode }),
                    None => lights.set_shadows(light, &sample, ShadowMode::None, out),
                }
            }
        }

        // Stable: equal distances keep room/light order
        self.candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let allowed = budget.count.min(self.candidates.len());
        for (rank, candidate) in self.candidates.iter().enumerate() {
            let Candidate { light, sample, mode, .. } = *candidate;
            if rank < allowed {
                if budget.force_low_resolution {
                    lights.set_resolution(light, &sample, ShadowResolution::Low, out);
                }
                lights.set_shadows(light, &sample, mode, out);
            } else {
                lights.set_shadows(light, &sample, ShadowMode::None, out);
            }
        }

        log::trace!(
            "ShadowBudgetSelector: {} candidates, {} shadowed",
            self.candidates.len(),
            allowed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::AABB;
    use crate::render::RenderCommand;
    use crate::scene::{CellRegistry, MemoryScene};

    struct Fixture {
        scene: MemoryScene,
        registry: CellRegistry,
        lights: LightCache,
    }

    impl Fixture {
        fn with_lights(positions: &[f32], shadows: ShadowMode) -> (Self, Vec<LightHandle>) {
            let mut scene = MemoryScene::new();
            let room = scene.add_node(scene.root(), Vec3::zeros()).unwrap();
            scene.add_renderable(room, AABB::around_point(Vec3::zeros(), 1.0)).unwrap();
            let handles = positions
                .iter()
                .map(|x| scene.add_light(room, Vec3::new(*x, 0.0, 0.0), 1.0, shadows).unwrap())
                .collect();

            let mut registry = CellRegistry::new();
            registry.rebuild(&scene, scene.root(), false);
            let id = registry.id_at(0).unwrap();
            registry.get_mut(id).unwrap().set_enabled(true, &scene, &mut RenderCommandBatch::new());

            (Self { scene, registry, lights: LightCache::new() }, handles)
        }

        fn run(&mut self, observer: Vec3, budget: &ShadowBudget) -> RenderCommandBatch {
            let mut out = RenderCommandBatch::new();
            let cells: Vec<&Cell> = self.registry.iter().collect();
            ShadowBudgetSelector::new().apply(&cells, &self.scene, observer, budget, &mut self.lights, &mut out);
            self.scene.apply(&out);
            out
        }
    }

    fn budget(count: usize) -> ShadowBudget {
        ShadowBudget::from_config(&CullingConfig::default().with_shadows(count, 3.0, 60.0))
    }

    #[test]
    fn test_budget_of_one_picks_nearest() {
        let (mut fixture, handles) = Fixture::with_lights(&[10.0, 5.0], ShadowMode::Hard);
        fixture.run(Vec3::zeros(), &budget(1));

        assert_eq!(fixture.scene.light_shadows(handles[1]), Some(ShadowMode::Hard));
        assert_eq!(fixture.scene.light_shadows(handles[0]), Some(ShadowMode::None));
        assert_eq!(fixture.scene.light_resolution(handles[1]), Some(ShadowResolution::Low));
    }

    #[test]
    fn test_zero_budget_disables_all() {
        let (mut fixture, handles) = Fixture::with_lights(&[1.0, 2.0, 3.0], ShadowMode::Soft);
        fixture.run(Vec3::zeros(), &budget(0));

        for handle in handles {
            assert_eq!(fixture.scene.light_shadows(handle), Some(ShadowMode::None));
        }
    }

    #[test]
    fn test_rerun_is_stable() {
        let (mut fixture, _) = Fixture::with_lights(&[4.0, 4.0, 8.0, 12.0], ShadowMode::Hard);
        fixture.run(Vec3::zeros(), &budget(2));
        let second = fixture.run(Vec3::zeros(), &budget(2));
        assert!(second.is_empty());
    }

    #[test]
    fn test_soft_inside_soft_distance() {
        let (mut fixture, handles) = Fixture::with_lights(&[2.0, 20.0], ShadowMode::Hard);
        fixture.run(Vec3::zeros(), &budget(4));

        assert_eq!(fixture.scene.light_shadows(handles[0]), Some(ShadowMode::Soft));
        assert_eq!(fixture.scene.light_shadows(handles[1]), Some(ShadowMode::Hard));
    }

    #[test]
    fn test_exit_band_keeps_shadowed_lights_only() {
        let budget = budget(4);
        assert_eq!(budget.desired_mode(61.0, ShadowMode::Hard), Some(ShadowMode::Hard));
        assert_eq!(budget.desired_mode(61.0, ShadowMode::None), None);
        assert_eq!(budget.desired_mode(62.5, ShadowMode::Hard), None);
        assert_eq!(budget.desired_mode(3.5, ShadowMode::Soft), Some(ShadowMode::Soft));
        assert_eq!(budget.desired_mode(3.5, ShadowMode::Hard), Some(ShadowMode::Hard));
        assert_eq!(budget.desired_mode(4.5, ShadowMode::Soft), Some(ShadowMode::Hard));
    }

    #[test]
    fn test_lights_without_original_shadows_are_ignored() {
        let (mut fixture, handles) = Fixture::with_lights(&[1.0], ShadowMode::None);
        let out = fixture.run(Vec3::zeros(), &budget(4));

        assert!(out.is_empty());
        assert_eq!(fixture.scene.light_shadows(handles[0]), Some(ShadowMode::None));
    }

    #[test]
    fn test_dark_lights_lose_shadows() {
        let (mut fixture, handles) = Fixture::with_lights(&[1.0], ShadowMode::Hard);
        let sample = fixture.scene.light(handles[0]).unwrap();
        fixture.lights.set_intensity(handles[0], &sample, 0.0, &mut RenderCommandBatch::new());

        let out = fixture.run(Vec3::zeros(), &budget(4));
        assert!(out.iter().any(|c| matches!(
            c,
            RenderCommand::SetLightShadows { mode: ShadowMode::None, .. }
        )));
    }
}
