//! # Room Culling
//!
//! Visibility and rendering-budget management for scenes split into rooms.
//!
//! ## Features
//!
//! - **Room Culling**: time-sliced on/off checks with distance hysteresis
//! - **Light Falloff**: distance-driven intensity restored from authored values
//! - **Shadow Budget**: only the nearest lights cast shadows
//! - **Render Channels**: nearby rooms get distinct render-layer bits
//!
//! The crate never touches a renderer. The host describes its hierarchy
//! through [`scene::SceneHost`] and applies the returned
//! [`render::RenderCommandBatch`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use room_culling::prelude::*;
//!
//! let mut scene = MemoryScene::new();
//! let room = scene.add_node(scene.root(), Vec3::zeros()).unwrap();
//! scene.add_renderable(room, AABB::around_point(Vec3::zeros(), 4.0));
//!
//! let mut culling = VisibilityEngine::new(CullingConfig::default());
//! let batch = culling.initiate(&scene, scene.root(), false, Vec3::zeros());
//! scene.apply(&batch);
//!
//! let mut channels = ChannelController::new(ChannelConfig::default());
//! let mut batch = culling.tick(&scene, Vec3::new(1.0, 0.0, 0.0));
//! channels.update(&scene, scene.root(), Vec3::new(1.0, 0.0, 0.0), 0.016, &mut batch);
//! scene.apply(&batch);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Configuration
pub mod config;
pub mod core;

pub mod foundation;
pub mod scene;
pub mod render;

// Engines
pub mod culling;
pub mod channels;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        channels::{AssignOutcome, AssignmentInput, ChannelAssignmentEngine, ChannelController, SkipReason},
        config::Config,
        core::{ChannelConfig, ConfigError, CullingConfig, RoomSystemConfig},
        culling::VisibilityEngine,
        foundation::math::{Vec3, AABB},
        render::{RenderCommand, RenderCommandBatch, ShadowDistanceSink, ShadowMode, ShadowResolution},
        scene::{CellId, CellState, LightHandle, MemoryScene, NodeHandle, RenderableHandle, SceneHost},
    };
}
