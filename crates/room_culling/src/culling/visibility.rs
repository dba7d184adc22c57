//! Room visibility state machine
//!
//! Rooms switch on inside `room_enable_distance` and off beyond
//! `room_disable_distance`, measured from the observer to the room center.
//! Only a slice of the rooms is re-checked each tick; after the slice the
//! light falloff and shadow budget run over every room.

use crate::config::Config;
use crate::core::CullingConfig;
use crate::foundation::math::Vec3;
use crate::render::{RenderCommandBatch, ShadowDistanceSink};
use crate::scene::{Cell, CellId, CellRegistry, CellState, NodeHandle, SceneHost};
use super::{
    LightCache,
    LightIntensityModel,
    ShadowBudget,
    ShadowBudgetSelector,
    TimeSliceScheduler,
};

/// Per-room on/off culling with light falloff and shadow budgeting
pub struct VisibilityEngine {
    config: CullingConfig,
    registry: CellRegistry,
    scheduler: TimeSliceScheduler,
    lights: LightCache,
    intensity: LightIntensityModel,
    budget: ShadowBudget,
    shadows: ShadowBudgetSelector,
    enabled: Vec<CellId>,
    enable_sqr: f32,
    disable_sqr: f32,
    shadow_sink: Option<Box<dyn ShadowDistanceSink>>,
}

impl std::fmt::Debug for VisibilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityEngine")
            .field("config", &self.config)
            .field("cells", &self.registry.len())
            .field("enabled", &self.enabled.len())
            .field("has_shadow_sink", &self.shadow_sink.is_some())
            .finish()
    }
}

impl VisibilityEngine {
    /// Create an engine with no rooms
    pub fn new(config: CullingConfig) -> Self {
        let mut engine = Self {
            config,
            registry: CellRegistry::new(),
            scheduler: TimeSliceScheduler::new(),
            lights: LightCache::new(),
            intensity: LightIntensityModel::default(),
            budget: ShadowBudget::default(),
            shadows: ShadowBudgetSelector::new(),
            enabled: Vec::new(),
            enable_sqr: 0.0,
            disable_sqr: 0.0,
            shadow_sink: None,
        };
        engine.config.validate_values();
        engine.recompute_thresholds();
        engine
    }

    /// Attach the render pipeline's shadow distance setting
    ///
    /// The current `max_shadow_distance` is pushed immediately when
    /// `apply_max_shadow_distance_to_pipeline` is set.
    pub fn with_shadow_distance_sink(mut self, sink: impl ShadowDistanceSink + 'static) -> Self {
        self.shadow_sink = Some(Box::new(sink));
        self.push_shadow_distance();
        self
    }

    /// Collect rooms under `root`, switch everything off, then prime around `observer`
    pub fn initiate(
        &mut self,
        host: &dyn SceneHost,
        root: NodeHandle,
        include_inactive: bool,
        observer: Vec3,
    ) -> RenderCommandBatch {
        let mut out = RenderCommandBatch::new();

        self.registry.rebuild(host, root, include_inactive);
        self.lights.forget_applied();
        self.enabled.clear();
        let lights = &mut self.lights;
        self.registry.for_each_mut(|cell| {
            LightIntensityModel::zero_all(cell, host, lights, &mut out);
            cell.set_enabled(false, host, &mut out);
        });
        self.scheduler.start_full_sweep();

        self.prime(host, observer, &mut out);
        log::info!(
            "VisibilityEngine: initiated {} rooms, {} on",
            self.registry.len(),
            self.enabled.len()
        );
        out
    }

    /// Advance one frame
    pub fn tick(&mut self, host: &dyn SceneHost, observer: Vec3) -> RenderCommandBatch {
        let mut out = RenderCommandBatch::new();
        let total = self.registry.len();
        if total == 0 {
            return out;
        }

        let iterations = self.scheduler.iterations(total, self.config.checks_per_frame);
        for _ in 0..iterations {
            let index = self.scheduler.next(total);
            if let Some(id) = self.registry.id_at(index) {
                self.check_cell(id, host, observer, &mut out);
            }
        }
        self.scheduler.end_tick();

        self.apply_lighting(host, observer, &mut out);
        log::debug!(
            "VisibilityEngine: checked {} of {} rooms, {} on, {} commands",
            iterations,
            total,
            self.enabled.len(),
            out.len()
        );
        out
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: CullingConfig) {
        self.config = config;
        self.on_config_changed();
    }

    /// Re-validate the configuration after it was edited in place
    pub fn on_config_changed(&mut self) {
        self.config.validate_values();
        self.recompute_thresholds();
        self.scheduler.start_full_sweep();
        log::info!(
            "VisibilityEngine: config changed (enable {}, disable {})",
            self.config.room_enable_distance,
            self.config.room_disable_distance
        );
    }

    /// Hide every room and zero its lights
    pub fn force_all_off(&mut self, host: &dyn SceneHost) -> RenderCommandBatch {
        let mut out = RenderCommandBatch::new();
        let lights = &mut self.lights;
        self.registry.for_each_mut(|cell| {
            LightIntensityModel::zero_all(cell, host, lights, &mut out);
            cell.set_enabled(false, host, &mut out);
        });
        out
    }

    /// Show every room; intensities follow on the next tick
    pub fn force_all_on(&mut self, host: &dyn SceneHost) -> RenderCommandBatch {
        let mut out = RenderCommandBatch::new();
        self.registry.for_each_mut(|cell| cell.set_enabled(true, host, &mut out));
        out
    }

    /// Recompute room centers after the host moved geometry
    pub fn refresh_centers(&mut self, host: &dyn SceneHost) {
        self.registry.refresh_centers(host);
    }

    /// Rooms that were on during the last lighting pass
    pub fn enabled_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.enabled.iter().filter_map(move |id| self.registry.get(*id))
    }

    /// State of one room
    pub fn cell_state(&self, id: CellId) -> Option<CellState> {
        self.registry.get(id).map(Cell::state)
    }

    /// Room collection
    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    fn outside_vertical_band(&self, center: Vec3, observer: Vec3) -> bool {
        self.config.vertical_tolerance > 0.0
            && (center.y - observer.y).abs() > self.config.vertical_tolerance
    }

    fn check_cell(
        &mut self,
        id: CellId,
        host: &dyn SceneHost,
        observer: Vec3,
        out: &mut RenderCommandBatch,
    ) {
        let outside_band = match self.registry.get(id) {
            Some(cell) => self.outside_vertical_band(cell.center(), observer),
            None => return,
        };
        let (enable_sqr, disable_sqr) = (self.enable_sqr, self.disable_sqr);
        let Some(cell) = self.registry.get_mut(id) else {
            return;
        };

        if !cell.has_renderables() {
            cell.set_state(CellState::Off);
            return;
        }

        if outside_band {
            if cell.is_on() {
                log::trace!("VisibilityEngine: {:?} off (vertical band)", cell.anchor());
                cell.set_enabled(false, host, out);
            }
            return;
        }

        let distance_sqr = (cell.center() - observer).norm_squared();
        match cell.state() {
            CellState::Off if distance_sqr <= enable_sqr => {
                log::trace!("VisibilityEngine: {:?} on", cell.anchor());
                cell.set_enabled(true, host, out);
            }
            CellState::On if distance_sqr >= disable_sqr => {
                log::trace!("VisibilityEngine: {:?} off", cell.anchor());
                cell.set_enabled(false, host, out);
                LightIntensityModel::zero_all(cell, host, &mut self.lights, out);
            }
            _ => {}
        }

        if !cell.is_on() {
            LightIntensityModel::zero_all(cell, host, &mut self.lights, out);
        }
    }

    fn prime(&mut self, host: &dyn SceneHost, observer: Vec3, out: &mut RenderCommandBatch) {
        if self.registry.is_empty() {
            return;
        }

        for index in 0..self.registry.len() {
            let Some(id) = self.registry.id_at(index) else {
                continue;
            };
            let on = match self.registry.get(id) {
                Some(cell) => {
                    !self.outside_vertical_band(cell.center(), observer)
                        && (cell.center() - observer).norm_squared() <= self.enable_sqr
                }
                None => continue,
            };
            if let Some(cell) = self.registry.get_mut(id) {
                cell.set_enabled(on, host, out);
                if !on {
                    LightIntensityModel::zero_all(cell, host, &mut self.lights, out);
                }
            }
        }

        self.apply_lighting(host, observer, out);
    }

    fn apply_lighting(&mut self, host: &dyn SceneHost, observer: Vec3, out: &mut RenderCommandBatch) {
        self.enabled.clear();
        for cell in self.registry.iter() {
            if cell.is_on() {
                self.enabled.push(cell.id());
                self.intensity.apply(cell, host, observer, &mut self.lights, out);
            } else {
                LightIntensityModel::zero_all(cell, host, &mut self.lights, out);
            }
        }

        let cells_on: Vec<&Cell> = self
            .enabled
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .collect();
        self.shadows
            .apply(&cells_on, host, observer, &self.budget, &mut self.lights, out);
    }

    fn recompute_thresholds(&mut self) {
        self.enable_sqr = self.config.room_enable_distance * self.config.room_enable_distance;
        self.disable_sqr = self.config.room_disable_distance * self.config.room_disable_distance;
        self.intensity = LightIntensityModel::from_config(&self.config);
        self.budget = ShadowBudget::from_config(&self.config);
        self.push_shadow_distance();
    }

    fn push_shadow_distance(&mut self) {
        if !self.config.apply_max_shadow_distance_to_pipeline {
            return;
        }
        if let Some(sink) = self.shadow_sink.as_mut() {
            sink.set_shadow_distance(self.config.max_shadow_distance);
        }
    }
}

impl Default for VisibilityEngine {
    fn default() -> Self {
        Self::new(CullingConfig::default())
    }
}
