//! # Culling Module
//!
//! Distance-driven room visibility with time-sliced checks, light falloff
//! and a global shadow budget.
//!
//! ## Organization
//!
//! - **Scheduler**: spreads room checks over ticks
//! - **Light cache**: authored light values and last emitted state
//! - **Intensity**: falloff curve applied to lights of visible rooms
//! - **Shadows**: nearest-first shadow budget with hysteresis
//! - **Visibility**: the engine tying the pieces together

pub mod intensity;
pub mod light_cache;
pub mod scheduler;
pub mod shadows;
pub mod visibility;

pub use intensity::LightIntensityModel;
pub use light_cache::LightCache;
pub use scheduler::TimeSliceScheduler;
pub use shadows::{ShadowBudget, ShadowBudgetSelector};
pub use visibility::VisibilityEngine;
