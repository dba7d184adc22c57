//! Render-facing outputs
//!
//! Everything the engines want changed on the renderer side is expressed as
//! commands in this module; the host owns the actual renderer.

pub mod commands;

pub use commands::{
    RenderCommand,
    RenderCommandBatch,
    ShadowDistanceSink,
    ShadowMode,
    ShadowResolution,
};
