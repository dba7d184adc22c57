//! Channel bit palette
//!
//! A channel is a single bit of a 32-bit render layer mask. The palette
//! hands out `color_count` consecutive bits starting at `first_bit`;
//! 0 means unassigned. Sets of channels (used or banned) are plain masks,
//! the union of their bits.

use crate::core::config::{ChannelConfig, MAX_CHANNEL_BIT};

/// Mask value of a room without a channel
pub const UNASSIGNED: u32 = 0;

/// Range of usable channel bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPalette {
    first_bit: u32,
    color_count: u32,
}

impl ChannelPalette {
    /// Create a palette, clamping to the available bits and layers
    pub fn new(first_bit: u32, color_count: u32, configured_layers: u32) -> Self {
        let first_bit = first_bit.clamp(1, MAX_CHANNEL_BIT);
        let max_by_bits = MAX_CHANNEL_BIT + 1 - first_bit;
        let max_usable = max_by_bits.min(configured_layers.max(1));
        Self {
            first_bit,
            color_count: color_count.clamp(1, max_usable),
        }
    }

    /// Palette for a channel configuration
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.first_bit, config.color_count, config.configured_layers)
    }

    /// Lowest channel bit
    pub fn first_bit(&self) -> u32 {
        self.first_bit
    }

    /// Number of channels
    pub fn color_count(&self) -> u32 {
        self.color_count
    }

    /// Mask of the channel at `index`
    pub fn mask(&self, index: u32) -> Option<u32> {
        (index < self.color_count).then(|| 1 << (self.first_bit + index))
    }

    /// All channel masks, lowest bit first
    pub fn masks(&self) -> impl Iterator<Item = u32> {
        let first_bit = self.first_bit;
        (0..self.color_count).map(move |index| 1 << (first_bit + index))
    }

    /// Union of all channel masks
    pub fn all(&self) -> u32 {
        self.masks().fold(0, |acc, mask| acc | mask)
    }

    /// The lowest channel
    pub fn first(&self) -> u32 {
        1 << self.first_bit
    }

    /// Whether `mask` is exactly one of the palette's channels
    pub fn is_allowed(&self, mask: u32) -> bool {
        mask.is_power_of_two() && mask & self.all() != 0
    }

    /// Position of a channel in the palette
    pub fn index_of(&self, mask: u32) -> Option<u32> {
        self.is_allowed(mask)
            .then(|| mask.trailing_zeros() - self.first_bit)
    }

    /// `prefer` if it is a free channel, otherwise the lowest free channel
    ///
    /// Returns [`UNASSIGNED`] when every channel is banned.
    pub fn choose(&self, banned: u32, prefer: u32) -> u32 {
        if self.is_allowed(prefer) && banned & prefer == 0 {
            return prefer;
        }
        self.masks()
            .find(|mask| banned & mask == 0)
            .unwrap_or(UNASSIGNED)
    }

    /// Keep only palette channels of a mask set
    pub fn restrict(&self, masks: u32) -> u32 {
        masks & self.all()
    }
}

impl Default for ChannelPalette {
    fn default() -> Self {
        Self::from_config(&ChannelConfig::default())
    }
}
