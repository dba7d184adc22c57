//! # Unified Configuration
//!
//! Tuning records for the culling engine and the channel assignment engine.
//! Every record clamps itself through [`Config::validate_values`]; the
//! engines call it again whenever a record is handed to them, so a
//! hand-built record with inverted thresholds is repaired rather than
//! rejected.
//!
//! ## Configuration Categories
//!
//! - **Culling**: room hysteresis, light falloff, shadow budget
//! - **Channels**: channel bit range, conflict separation, dynamic re-coloring

use serde::{Deserialize, Deserializer, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Culling Configuration
///
/// Distances are world units measured from the observer. Room distances are
/// measured to the room center, light distances to the light position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Rooms at or inside this distance switch on
    pub room_enable_distance: f32,
    /// Rooms at or beyond this distance switch off
    pub room_disable_distance: f32,
    /// Lower bound for `light_disable_distance`
    pub light_enable_distance: f32,
    /// Lights reach zero intensity at this distance
    pub light_disable_distance: f32,
    /// Lights keep their original intensity inside this distance
    pub light_max_intensity_distance: f32,
    /// Exponent of the falloff curve between the two light distances
    pub inner_falloff_power: f32,
    /// Rooms whose center differs in height by more than this are off.
    /// Zero disables the vertical band.
    pub vertical_tolerance: f32,
    /// Rooms re-evaluated per tick
    #[serde(deserialize_with = "floored_usize")]
    pub checks_per_frame: usize,
    /// Maximum number of shadow-casting lights
    #[serde(deserialize_with = "floored_usize")]
    pub shadows_count: usize,
    /// Lights beyond this distance never gain shadows
    pub max_shadow_distance: f32,
    /// Lights inside this distance get soft shadows
    pub soft_shadow_distance: f32,
    /// Push `max_shadow_distance` to the render pipeline on config change
    pub apply_max_shadow_distance_to_pipeline: bool,
    /// Force low shadow resolution on every selected light
    pub force_low_shadow_resolution: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            room_enable_distance: 80.0,
            room_disable_distance: 100.0,
            light_enable_distance: 30.0,
            light_disable_distance: 40.0,
            light_max_intensity_distance: 20.0,
            inner_falloff_power: 1.0,
            vertical_tolerance: 10.0,
            checks_per_frame: 64,
            shadows_count: 12,
            max_shadow_distance: 60.0,
            soft_shadow_distance: 50.0,
            apply_max_shadow_distance_to_pipeline: true,
            force_low_shadow_resolution: true,
        }
    }
}

impl Config for CullingConfig {
    fn validate_values(&mut self) {
        self.checks_per_frame = self.checks_per_frame.max(1);

        self.room_enable_distance = self.room_enable_distance.max(0.0);
        self.room_disable_distance = self.room_disable_distance.max(self.room_enable_distance);

        self.light_enable_distance = self.light_enable_distance.max(0.0);
        self.light_disable_distance = self.light_disable_distance.max(self.light_enable_distance);

        self.light_max_intensity_distance = self.light_max_intensity_distance.max(0.0);
        self.light_disable_distance = self.light_disable_distance.max(self.light_max_intensity_distance);

        self.inner_falloff_power = self.inner_falloff_power.max(1.0);

        self.vertical_tolerance = self.vertical_tolerance.max(0.0);

        self.soft_shadow_distance = self.soft_shadow_distance.max(0.0);
        self.max_shadow_distance = self.max_shadow_distance.max(self.soft_shadow_distance);
    }
}

impl CullingConfig {
    /// Set room hysteresis distances
    pub fn with_room_distances(mut self, enable: f32, disable: f32) -> Self {
        self.room_enable_distance = enable;
        self.room_disable_distance = disable;
        self
    }

    /// Set light falloff distances and exponent
    pub fn with_light_falloff(mut self, max_intensity: f32, disable: f32, power: f32) -> Self {
        self.light_max_intensity_distance = max_intensity;
        self.light_disable_distance = disable;
        self.inner_falloff_power = power;
        self
    }

    /// Set shadow budget and distances
    pub fn with_shadows(mut self, count: usize, soft: f32, max: f32) -> Self {
        self.shadows_count = count;
        self.soft_shadow_distance = soft;
        self.max_shadow_distance = max;
        self
    }

    /// Set the vertical band (0 disables it)
    pub fn with_vertical_tolerance(mut self, tolerance: f32) -> Self {
        self.vertical_tolerance = tolerance;
        self
    }

    /// Set the per-tick room budget
    pub fn with_checks_per_frame(mut self, checks: usize) -> Self {
        self.checks_per_frame = checks;
        self
    }
}

/// Highest usable channel bit
pub const MAX_CHANNEL_BIT: u32 = 31;

/// # Channel Configuration
///
/// Controls which render-layer bits are handed out and how rooms compete
/// for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Lowest channel bit (1..=31)
    #[serde(deserialize_with = "floored_u32")]
    pub first_bit: u32,
    /// Number of channels handed out
    #[serde(deserialize_with = "floored_u32")]
    pub color_count: u32,
    /// Number of light layers the render pipeline exposes
    #[serde(deserialize_with = "floored_u32")]
    pub configured_layers: u32,
    /// Rooms closer than this must not share a channel
    pub min_separation: f32,
    /// Multiple of `min_separation` inside which rooms count as nearby
    pub proximity_factor: f32,
    /// Include inactive nodes when collecting rooms
    pub include_inactive_children: bool,
    /// Re-color around the observer every tick interval
    pub dynamic_mode: bool,
    /// Rooms at or inside this distance are re-colored first
    pub radius_in: f32,
    /// Rooms at or inside this distance only change on collision
    pub radius_out: f32,
    /// Observer displacement that triggers a recompute
    pub move_gate: f32,
    /// Minimum seconds between two channel writes for one room
    pub cooldown_seconds: f32,
    /// Seconds between dynamic recomputes
    pub tick_interval: f32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            first_bit: 1,
            color_count: 8,
            configured_layers: 8,
            min_separation: 5.0,
            proximity_factor: 3.0,
            include_inactive_children: true,
            dynamic_mode: true,
            radius_in: 25.0,
            radius_out: 75.0,
            move_gate: 0.5,
            cooldown_seconds: 0.5,
            tick_interval: 0.1,
        }
    }
}

impl Config for ChannelConfig {
    fn validate_values(&mut self) {
        self.first_bit = self.first_bit.clamp(1, MAX_CHANNEL_BIT);
        self.configured_layers = self.configured_layers.max(1);
        self.color_count = self.color_count.clamp(1, self.max_usable_colors());

        self.min_separation = self.min_separation.max(0.0);
        self.proximity_factor = self.proximity_factor.max(0.0);
        self.radius_in = self.radius_in.max(0.0);
        self.radius_out = self.radius_out.max(self.radius_in);
        self.move_gate = self.move_gate.max(0.0);
        self.cooldown_seconds = self.cooldown_seconds.max(0.0);
        self.tick_interval = self.tick_interval.max(0.01);
    }
}

impl ChannelConfig {
    /// Channels available above `first_bit`, limited by the pipeline's layer count
    pub fn max_usable_colors(&self) -> u32 {
        let first = self.first_bit.clamp(1, MAX_CHANNEL_BIT);
        let by_bits = (MAX_CHANNEL_BIT + 1 - first).max(1);
        by_bits.min(self.configured_layers.max(1))
    }

    /// Set the channel bit range
    pub fn with_channels(mut self, first_bit: u32, color_count: u32) -> Self {
        self.first_bit = first_bit;
        self.color_count = color_count;
        self
    }

    /// Set the conflict separation and proximity multiple
    pub fn with_separation(mut self, min_separation: f32, proximity_factor: f32) -> Self {
        self.min_separation = min_separation;
        self.proximity_factor = proximity_factor;
        self
    }

    /// Set the dynamic radii
    pub fn with_radii(mut self, radius_in: f32, radius_out: f32) -> Self {
        self.radius_in = radius_in;
        self.radius_out = radius_out;
        self
    }

    /// Set move gate and per-room cooldown
    pub fn with_damping(mut self, move_gate: f32, cooldown_seconds: f32) -> Self {
        self.move_gate = move_gate;
        self.cooldown_seconds = cooldown_seconds;
        self
    }
}

/// Read a count, flooring negative values at zero
fn floored_usize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value.max(0)).unwrap_or(usize::MAX))
}

fn floored_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Combined configuration file for a host application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSystemConfig {
    /// Culling engine settings
    pub culling: CullingConfig,
    /// Channel assignment settings
    pub channels: ChannelConfig,
}

impl Config for RoomSystemConfig {
    fn validate_values(&mut self) {
        self.culling.validate_values();
        self.channels.validate_values();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culling_validation_orders_thresholds() {
        let mut config = CullingConfig::default()
            .with_room_distances(120.0, 50.0)
            .with_light_falloff(45.0, 10.0, 0.2)
            .with_shadows(3, 70.0, 20.0)
            .with_checks_per_frame(0)
            .with_vertical_tolerance(-4.0);
        config.validate_values();

        assert_eq!(config.room_enable_distance, 120.0);
        assert_eq!(config.room_disable_distance, 120.0);
        assert_eq!(config.light_disable_distance, 45.0);
        assert_eq!(config.inner_falloff_power, 1.0);
        assert_eq!(config.max_shadow_distance, 70.0);
        assert_eq!(config.checks_per_frame, 1);
        assert_eq!(config.vertical_tolerance, 0.0);
    }

    #[test]
    fn test_negative_distances_floor_at_zero() {
        let mut config = CullingConfig::default().with_room_distances(-10.0, -5.0);
        config.validate_values();

        assert_eq!(config.room_enable_distance, 0.0);
        assert_eq!(config.room_disable_distance, 0.0);
    }

    #[test]
    fn test_channel_color_count_clamped_to_bit_width() {
        let mut config = ChannelConfig::default().with_channels(30, 8);
        config.configured_layers = 16;
        config.validate_values();

        assert_eq!(config.first_bit, 30);
        assert_eq!(config.color_count, 2);

        let mut config = ChannelConfig::default().with_channels(0, 0);
        config.validate_values();
        assert_eq!(config.first_bit, 1);
        assert_eq!(config.color_count, 1);
    }

    #[test]
    fn test_channel_color_count_clamped_to_layers() {
        let mut config = ChannelConfig::default().with_channels(1, 12);
        config.configured_layers = 4;
        config.validate_values();

        assert_eq!(config.color_count, 4);
    }

    #[test]
    fn test_radius_out_never_below_radius_in() {
        let mut config = ChannelConfig::default().with_radii(40.0, 10.0);
        config.validate_values();

        assert_eq!(config.radius_out, 40.0);
    }

    #[test]
    fn test_system_config_from_partial_toml() {
        let config = RoomSystemConfig::from_toml_str(
            r#"
            [culling]
            room_enable_distance = 150.0
            room_disable_distance = 90.0
            shadows_count = 4

            [channels]
            color_count = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.culling.room_enable_distance, 150.0);
        assert_eq!(config.culling.room_disable_distance, 150.0);
        assert_eq!(config.culling.shadows_count, 4);
        assert_eq!(config.culling.light_disable_distance, 40.0);
        assert_eq!(config.channels.color_count, 8);
    }

    #[test]
    fn test_negative_counts_in_toml_are_floored() {
        let config = RoomSystemConfig::from_toml_str(
            r#"
            [culling]
            checks_per_frame = -3
            shadows_count = -1

            [channels]
            first_bit = -4
            color_count = -2
            "#,
        )
        .unwrap();

        assert_eq!(config.culling.checks_per_frame, 1);
        assert_eq!(config.culling.shadows_count, 0);
        assert_eq!(config.channels.first_bit, 1);
        assert_eq!(config.channels.color_count, 1);
    }

    #[test]
    fn test_negative_counts_in_ron_are_floored() {
        let config = CullingConfig::from_ron_str("(checks_per_frame: -8, shadows_count: 2)").unwrap();

        assert_eq!(config.checks_per_frame, 1);
        assert_eq!(config.shadows_count, 2);
    }

    #[test]
    fn test_system_config_file_round_trip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("room_culling_config_{}.ron", std::process::id()));

        let mut config = RoomSystemConfig::default();
        config.culling.checks_per_frame = 7;
        config.channels.first_bit = 3;
        config.save_to_file(&path).unwrap();

        let loaded = RoomSystemConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = RoomSystemConfig::default().save_to_file("settings.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
