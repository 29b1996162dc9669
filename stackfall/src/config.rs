//! Configuration for an Engine

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackfallError};

/// Main configuration for an Engine
///
/// Defaults reproduce the classic 10x20 board at 60 ticks per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid width in cells
    pub width: usize,

    /// Grid height in cells
    pub height: usize,

    /// Rows per tick while falling normally
    pub normal_speed: f64,

    /// Rows per tick while soft-dropping
    pub soft_drop_speed: f64,

    /// Ticks a grounded piece waits before it locks
    pub lock_delay_ticks: f64,

    /// Row of the shape origin for a freshly spawned piece
    pub spawn_y: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            normal_speed: 0.1,
            soft_drop_speed: 0.2,
            lock_delay_ticks: 0.5 * 60.0,
            spawn_y: -2.0,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON text and validate it
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the grid size
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the normal fall speed in rows per tick
    pub fn with_normal_speed(mut self, speed: f64) -> Self {
        self.normal_speed = speed;
        self
    }

    /// Set the soft-drop fall speed in rows per tick
    pub fn with_soft_drop_speed(mut self, speed: f64) -> Self {
        self.soft_drop_speed = speed;
        self
    }

    /// Set the lock delay in ticks
    pub fn with_lock_delay_ticks(mut self, ticks: f64) -> Self {
        self.lock_delay_ticks = ticks;
        self
    }

    /// Derive the lock delay from a duration in seconds and a tick rate
    pub fn with_lock_delay_secs(mut self, secs: f64, tick_rate: u32) -> Self {
        self.lock_delay_ticks = secs * f64::from(tick_rate);
        self
    }

    /// Set the spawn row
    pub fn with_spawn_y(mut self, y: f64) -> Self {
        self.spawn_y = y;
        self
    }

    /// Check that the values can drive a simulation
    pub fn validate(&self) -> Result<()> {
        // The widest shape is 4 cells and must fit once centered.
        if self.width < 4 || self.height == 0 {
            return Err(StackfallError::InvalidConfig(format!(
                "grid {}x{} is too small, need at least 4 columns and 1 row",
                self.width, self.height
            )));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(StackfallError::InvalidConfig(format!(
                "grid {}x{} is too large",
                self.width, self.height
            )));
        }
        if !(self.normal_speed.is_finite() && self.normal_speed > 0.0) {
            return Err(StackfallError::InvalidConfig(format!(
                "normal speed must be positive, got {}",
                self.normal_speed
            )));
        }
        if !(self.soft_drop_speed.is_finite() && self.soft_drop_speed > self.normal_speed) {
            return Err(StackfallError::InvalidConfig(format!(
                "soft drop speed {} must be faster than normal speed {}",
                self.soft_drop_speed, self.normal_speed
            )));
        }
        if !(self.lock_delay_ticks.is_finite() && self.lock_delay_ticks >= 0.0) {
            return Err(StackfallError::InvalidConfig(format!(
                "lock delay must be non-negative, got {}",
                self.lock_delay_ticks
            )));
        }
        if !self.spawn_y.is_finite() {
            return Err(StackfallError::InvalidConfig("spawn row must be finite".to_string()));
        }
        Ok(())
    }
}
