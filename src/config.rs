use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Renderer configuration, fixed for the lifetime of a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Samples per mix buffer per tick
    pub sample_count: u32,
    /// Number of mix buffer slots in the pool
    pub mix_buffer_count: u32,
    /// Share of the tick period a render may take before it counts as late (percent)
    pub rendering_time_limit_percent: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            sample_count: 240,
            mix_buffer_count: 24,
            rendering_time_limit_percent: 80,
        }
    }
}

impl RendererConfig {
    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.sample_count == 0 {
            return Err(ConfigError::ZeroSampleCount);
        }
        if self.mix_buffer_count == 0 {
            return Err(ConfigError::ZeroMixBufferCount);
        }
        if !(1..=100).contains(&self.rendering_time_limit_percent) {
            return Err(ConfigError::InvalidTimeLimit(self.rendering_time_limit_percent));
        }
        Ok(())
    }

    /// Wall-clock length of one tick
    pub fn tick_period(&self) -> Duration {
        let nanos = self.sample_count as u64 * 1_000_000_000;
        Duration::from_nanos(nanos / self.sample_rate.max(1) as u64)
    }

    /// Soft deadline for rendering one tick
    pub fn render_deadline(&self) -> Duration {
        self.tick_period() * self.rendering_time_limit_percent / 100
    }
}
