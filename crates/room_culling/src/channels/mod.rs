//! # Channels Module
//!
//! Exclusive render-layer channels for rooms. Rooms that are spatially close
//! get different channels so per-channel lighting does not bleed between
//! them.
//!
//! ## Organization
//!
//! - **Palette**: the usable channel bits
//! - **Conflict graph**: which rooms are too close to share a channel
//! - **Assignment**: static and observer-driven coloring with cooldowns
//! - **Controller**: runs the assignment at a fixed tick interval

pub mod assignment;
pub mod conflict_graph;
pub mod controller;
pub mod palette;

pub use assignment::{
    AssignOutcome,
    AssignmentInput,
    ChannelAssignmentEngine,
    SkipReason,
    MIN_COOLDOWN_SECONDS,
};
pub use conflict_graph::ConflictGraph;
pub use controller::ChannelController;
pub use palette::{ChannelPalette, UNASSIGNED};
