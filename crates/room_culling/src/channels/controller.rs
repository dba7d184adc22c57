//! Tick-interval driver for the channel engine

use crate::config::Config;
use crate::core::ChannelConfig;
use crate::foundation::math::Vec3;
use crate::render::RenderCommandBatch;
use crate::scene::{NodeHandle, SceneHost};
use super::{
    AssignOutcome,
    AssignmentInput,
    ChannelAssignmentEngine,
    ChannelPalette,
    SkipReason,
};

/// Shortest allowed interval between two dynamic passes
pub const MIN_TICK_INTERVAL: f32 = 0.01;

/// Owns the channel configuration and runs the engine at a fixed cadence
#[derive(Debug)]
pub struct ChannelController {
    config: ChannelConfig,
    engine: ChannelAssignmentEngine,
    next_tick: Option<f64>,
}

impl ChannelController {
    /// Create a controller; the first `update` runs immediately
    pub fn new(mut config: ChannelConfig) -> Self {
        config.validate_values();
        let engine = ChannelAssignmentEngine::new(ChannelPalette::from_config(&config));
        Self {
            config,
            engine,
            next_tick: None,
        }
    }

    /// Run a dynamic pass around `observer` if dynamic mode is on and the
    /// tick interval has elapsed
    pub fn update(
        &mut self,
        host: &dyn SceneHost,
        root: NodeHandle,
        observer: Vec3,
        now: f64,
        out: &mut RenderCommandBatch,
    ) -> AssignOutcome {
        if !self.config.dynamic_mode {
            return AssignOutcome::Skipped(SkipReason::DynamicModeDisabled);
        }
        if self.next_tick.is_some_and(|next| now < next) {
            return AssignOutcome::Skipped(SkipReason::NotDue);
        }
        self.next_tick = Some(now + f64::from(self.config.tick_interval.max(MIN_TICK_INTERVAL)));

        let input = AssignmentInput::from_config(&self.config).with_observer(observer, now);
        self.engine.assign(host, root, &input, out)
    }

    /// Run a single static pass over every room
    pub fn assign_once(
        &mut self,
        host: &dyn SceneHost,
        root: NodeHandle,
        out: &mut RenderCommandBatch,
    ) -> AssignOutcome {
        let input = AssignmentInput::from_config(&self.config);
        self.engine.assign(host, root, &input, out)
    }

    /// Replace the configuration
    ///
    /// A different channel range discards the applied state, since stored
    /// channels may no longer be valid.
    pub fn set_config(&mut self, mut config: ChannelConfig) {
        config.validate_values();
        let palette = ChannelPalette::from_config(&config);
        if palette != *self.engine.palette() {
            log::info!(
                "ChannelController: palette changed to {} channels from bit {}",
                palette.color_count(),
                palette.first_bit()
            );
            self.engine = ChannelAssignmentEngine::new(palette);
        }
        self.config = config;
        self.next_tick = None;
    }

    /// Active configuration
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The underlying engine
    pub fn engine(&self) -> &ChannelAssignmentEngine {
        &self.engine
    }
}

impl Default for ChannelController {
    fn default() -> Self {
        Self::new(ChannelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::AABB;
    use crate::scene::MemoryScene;

    fn two_rooms() -> MemoryScene {
        let mut scene = MemoryScene::new();
        let root = scene.root();
        for x in [0.0, 2.0] {
            let room = scene.add_node(root, Vec3::new(x, 0.0, 0.0)).unwrap();
            scene
                .add_renderable(room, AABB::around_point(Vec3::new(x, 0.0, 0.0), 1.0))
                .unwrap();
        }
        scene
    }

    #[test]
    fn test_update_respects_tick_interval() {
        let scene = two_rooms();
        let mut controller = ChannelController::new(ChannelConfig {
            tick_interval: 0.25,
            move_gate: 0.0,
            ..ChannelConfig::default()
        });
        let mut out = RenderCommandBatch::new();

        assert!(matches!(
            controller.update(&scene, scene.root(), Vec3::zeros(), 0.0, &mut out),
            AssignOutcome::Applied { .. }
        ));
        assert_eq!(
            controller.update(&scene, scene.root(), Vec3::zeros(), 0.1, &mut out),
            AssignOutcome::Skipped(SkipReason::NotDue)
        );
        assert!(matches!(
            controller.update(&scene, scene.root(), Vec3::zeros(), 0.25, &mut out),
            AssignOutcome::Applied { .. }
        ));
    }

    #[test]
    fn test_update_requires_dynamic_mode() {
        let scene = two_rooms();
        let mut controller = ChannelController::new(ChannelConfig {
            dynamic_mode: false,
            ..ChannelConfig::default()
        });
        let mut out = RenderCommandBatch::new();

        assert_eq!(
            controller.update(&scene, scene.root(), Vec3::zeros(), 0.0, &mut out),
            AssignOutcome::Skipped(SkipReason::DynamicModeDisabled)
        );
        assert_eq!(
            controller.assign_once(&scene, scene.root(), &mut out),
            AssignOutcome::Applied { writes: 2 }
        );
    }

    #[test]
    fn test_palette_change_resets_state() {
        let scene = two_rooms();
        let mut controller = ChannelController::default();
        let mut out = RenderCommandBatch::new();
        controller.assign_once(&scene, scene.root(), &mut out);
        let room = scene.children(scene.root(), false)[0];
        assert_ne!(controller.engine().current_channel(room), 0);

        controller.set_config(ChannelConfig {
            first_bit: 8,
            ..ChannelConfig::default()
        });
        assert_eq!(controller.engine().current_channel(room), 0);
        assert_eq!(controller.engine().palette().first(), 1 << 8);
    }
}
