//! Render state commands produced by the culling and channel engines
//!
//! The engines never touch renderer state directly. Each call returns (or
//! appends to) a [`RenderCommandBatch`] describing the state changes the host
//! should apply to its renderables and lights.
//!
//! # Design Philosophy
//!
//! - Commands are deltas: a value is only emitted when it differs from the
//!   last value the engine emitted for the same object
//! - Commands carry host handles only, never renderer objects
//! - Handles that no longer resolve are the host's to ignore

use serde::{Deserialize, Serialize};

use crate::scene::{LightHandle, RenderableHandle};

/// Shadow casting mode of a light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowMode {
    /// No shadows
    #[default]
    None,
    /// Hard shadows
    Hard,
    /// Soft (filtered) shadows
    Soft,
}

impl ShadowMode {
    /// Whether the mode casts any shadow
    pub fn casts(self) -> bool {
        self != Self::None
    }
}

/// Shadow map resolution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowResolution {
    /// Lowest tier
    Low,
    /// Medium tier
    Medium,
    /// High tier
    High,
    /// Highest tier
    VeryHigh,
}

/// A single state change for the host to apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Show or hide a renderable
    SetRenderableVisible {
        /// Target renderable
        renderable: RenderableHandle,
        /// New visibility
        visible: bool,
    },
    /// Set a light's intensity
    SetLightIntensity {
        /// Target light
        light: LightHandle,
        /// New intensity
        intensity: f32,
    },
    /// Set a light's shadow mode
    SetLightShadows {
        /// Target light
        light: LightHandle,
        /// New shadow mode
        mode: ShadowMode,
    },
    /// Set a light's shadow map resolution
    SetShadowResolution {
        /// Target light
        light: LightHandle,
        /// New resolution tier
        resolution: ShadowResolution,
    },
    /// Set the channel bitmask of a renderable
    SetRenderableChannel {
        /// Target renderable
        renderable: RenderableHandle,
        /// Single channel bit, or 0
        mask: u32,
    },
    /// Set the channel bitmask of a light
    SetLightChannel {
        /// Target light
        light: LightHandle,
        /// Single channel bit, or 0
        mask: u32,
    },
}

/// Ordered batch of render commands for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCommandBatch {
    /// Commands in the order they were produced
    pub commands: Vec<RenderCommand>,
}

impl RenderCommandBatch {
    /// Create a new empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Move all commands of `other` to the end of this batch
    pub fn append(&mut self, other: &mut RenderCommandBatch) {
        self.commands.append(&mut other.commands);
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over the commands
    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    /// Remove all commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl<'a> IntoIterator for &'a RenderCommandBatch {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Receiver for the render pipeline's global shadow distance
pub trait ShadowDistanceSink {
    /// Set the pipeline shadow distance
    fn set_shadow_distance(&mut self, distance: f32);
}

impl<F: FnMut(f32)> ShadowDistanceSink for F {
    fn set_shadow_distance(&mut self, distance: f32) {
        self(distance);
    }
}
