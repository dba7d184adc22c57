//! Walkthrough demo application
//!
//! Builds a synthetic two-storey floor plan in memory, walks an observer
//! through it and drives room culling and channel assignment every frame.
//!
//! Usage: `walkthrough [config.toml|config.ron]`

use room_culling::foundation::logging;
use room_culling::prelude::*;

/// Rooms per side on each floor
const GRID_SIZE: usize = 8;
/// Room edge length
const ROOM_SIZE: f32 = 8.0;
/// Wall thickness between rooms
const WALL_GAP: f32 = 1.0;
/// Height of one storey
const STOREY_HEIGHT: f32 = 12.0;
/// Simulated frames
const FRAME_COUNT: usize = 1800;
/// Simulated frame time
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Observer speed in units per second
const WALK_SPEED: f32 = 6.0;

/// Application errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The config file could not be loaded
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    /// The floor plan produced no rooms
    #[error("Floor plan is empty")]
    EmptyFloorPlan,
}

#[derive(Debug, Default)]
struct WalkStats {
    culling_commands: usize,
    channel_writes: usize,
    channel_passes: usize,
    peak_visible: usize,
}

pub struct WalkthroughApp {
    scene: MemoryScene,
    rooms_root: NodeHandle,
    culling: VisibilityEngine,
    channels: ChannelController,
    waypoints: Vec<Vec3>,
    stats: WalkStats,
}

impl WalkthroughApp {
    pub fn new(config: RoomSystemConfig) -> Result<Self, AppError> {
        let mut scene = MemoryScene::new();
        let rooms_root = scene.add_node(scene.root(), Vec3::zeros()).ok_or(AppError::EmptyFloorPlan)?;
        build_floor_plan(&mut scene, rooms_root);

        if scene.children(rooms_root, true).is_empty() {
            return Err(AppError::EmptyFloorPlan);
        }

        let culling = VisibilityEngine::new(config.culling).with_shadow_distance_sink(|distance: f32| {
            log::info!("Pipeline shadow distance set to {distance}");
        });

        Ok(Self {
            scene,
            rooms_root,
            culling,
            channels: ChannelController::new(config.channels),
            waypoints: walk_path(),
            stats: WalkStats::default(),
        })
    }

    pub fn initialize(&mut self) {
        let start = self.waypoints.first().copied().unwrap_or_else(Vec3::zeros);
        let include_inactive = self.channels.config().include_inactive_children;
        let batch = self.culling.initiate(&self.scene, self.rooms_root, include_inactive, start);
        self.stats.culling_commands += batch.len();
        self.scene.apply(&batch);

        let mut batch = RenderCommandBatch::new();
        if let AssignOutcome::Applied { writes } =
            self.channels.assign_once(&self.scene, self.rooms_root, &mut batch)
        {
            self.stats.channel_writes += writes;
        }
        self.scene.apply(&batch);

        log::info!(
            "Initialized {} rooms, {} visible",
            self.culling.registry().len(),
            self.culling.enabled_cells().count()
        );
    }

    pub fn run(&mut self) {
        let mut now = 0.0_f64;
        for frame in 0..FRAME_COUNT {
            now += FRAME_TIME;
            let observer = self.observer_at(now as f32);

            let mut batch = self.culling.tick(&self.scene, observer);
            self.stats.culling_commands += batch.len();

            match self.channels.update(&self.scene, self.rooms_root, observer, now, &mut batch) {
                AssignOutcome::Applied { writes } => {
                    self.stats.channel_passes += 1;
                    self.stats.channel_writes += writes;
                }
                AssignOutcome::Skipped(reason) => log::trace!("Channel pass skipped: {reason:?}"),
            }
            self.scene.apply(&batch);

            let visible = self.culling.enabled_cells().count();
            self.stats.peak_visible = self.stats.peak_visible.max(visible);

            if frame % 120 == 0 {
                log::info!(
                    "Frame {frame}: observer {:.1} {:.1} {:.1}, {visible} rooms visible, {} shadowed lights",
                    observer.x,
                    observer.y,
                    observer.z,
                    self.shadowed_lights()
                );
            }
        }
    }

    pub fn report(&self) {
        log::info!(
            "Walk finished: {} culling commands, {} channel passes, {} channel writes, peak {} visible of {}",
            self.stats.culling_commands,
            self.stats.channel_passes,
            self.stats.channel_writes,
            self.stats.peak_visible,
            self.culling.registry().len()
        );
    }

    fn shadowed_lights(&self) -> usize {
        self.culling
            .enabled_cells()
            .flat_map(|cell| cell.lights().iter())
            .filter(|light| self.scene.light_shadows(**light).is_some_and(ShadowMode::casts))
            .count()
    }

    /// Position along the closed waypoint loop after `time` seconds
    fn observer_at(&self, time: f32) -> Vec3 {
        let segments: Vec<(Vec3, Vec3, f32)> = self
            .waypoints
            .iter()
            .zip(self.waypoints.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b, (b - a).norm()))
            .collect();
        let total: f32 = segments.iter().map(|segment| segment.2).sum();
        if total <= 0.0 {
            return self.waypoints.first().copied().unwrap_or_else(Vec3::zeros);
        }

        let mut travelled = (time * WALK_SPEED) % total;
        for (from, to, length) in segments {
            if travelled <= length {
                return from + (to - from) * (travelled / length.max(f32::EPSILON));
            }
            travelled -= length;
        }
        self.waypoints.first().copied().unwrap_or_else(Vec3::zeros)
    }
}

/// Two storeys of `GRID_SIZE` x `GRID_SIZE` rooms, each with a floor, a
/// couple of props and a ceiling lamp; every third lamp casts shadows
fn build_floor_plan(scene: &mut MemoryScene, rooms_root: NodeHandle) {
    let pitch = ROOM_SIZE + WALL_GAP;
    let mut lamp_index = 0;

    for storey in 0..2 {
        for row in 0..GRID_SIZE {
            for column in 0..GRID_SIZE {
                let min = Vec3::new(
                    column as f32 * pitch,
                    storey as f32 * STOREY_HEIGHT,
                    row as f32 * pitch,
                );
                let center = min + Vec3::new(ROOM_SIZE * 0.5, 0.0, ROOM_SIZE * 0.5);
                let Some(room) = scene.add_node(rooms_root, center) else {
                    continue;
                };

                scene.add_renderable(room, AABB::new(min, min + Vec3::new(ROOM_SIZE, 0.2, ROOM_SIZE)));
                scene.add_renderable(room, AABB::around_point(center + Vec3::new(1.5, 0.5, -1.0), 1.0));
                scene.add_renderable(room, AABB::around_point(center + Vec3::new(-2.0, 1.0, 2.0), 2.0));

                let shadows = if lamp_index % 3 == 0 { ShadowMode::Soft } else { ShadowMode::None };
                scene.add_light(room, center + Vec3::new(0.0, 3.5, 0.0), 1.5, shadows);
                lamp_index += 1;
            }
        }
    }
}

/// Loop around the ground floor with a detour through the middle
fn walk_path() -> Vec<Vec3> {
    let pitch = ROOM_SIZE + WALL_GAP;
    let far = (GRID_SIZE as f32 - 0.5) * pitch;
    let near = 0.5 * pitch;
    let middle = GRID_SIZE as f32 * 0.5 * pitch;
    let eye = 1.7;

    vec![
        Vec3::new(near, eye, near),
        Vec3::new(far, eye, near),
        Vec3::new(far, eye, middle),
        Vec3::new(middle, eye, middle),
        Vec3::new(middle, eye, far),
        Vec3::new(near, eye, far),
    ]
}

fn load_config() -> Result<RoomSystemConfig, AppError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            Ok(RoomSystemConfig::load_from_file(&path)?)
        }
        None => Ok(RoomSystemConfig::default()),
    }
}

fn main() -> Result<(), AppError> {
    logging::init();

    log::info!("Starting room culling walkthrough");

    let config = load_config()?;
    let mut app = WalkthroughApp::new(config)?;
    app.initialize();
    app.run();
    app.report();

    Ok(())
}
